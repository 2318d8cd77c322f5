//! In-memory XML element tree and its deterministic writer.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use rust_decimal::Decimal;
use std::io::Cursor;

use crate::core::InvoiceError;
use crate::core::totals::round_amount;

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Leaf element holding `text`.
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut e = Self::new(name);
        e.children.push(Node::Text(text.into()));
        e
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((key.into(), value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append `child` when present.
    pub fn child_opt(mut self, child: Option<Element>) -> Self {
        if let Some(c) = child {
            self.children.push(Node::Element(c));
        }
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children
            .extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// First direct child element with `name`.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|n| match n {
            Node::Element(e) if e.name == name => Some(e),
            _ => None,
        })
    }

    /// Concatenated direct text content.
    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }
}

fn xml_io(e: std::io::Error) -> InvoiceError {
    InvoiceError::Xml(format!("XML write error: {e}"))
}

/// Write `root` as a complete document with a UTF-8 declaration,
/// two-space indentation and no blank lines.
pub fn write_document(root: &Element) -> Result<String, InvoiceError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_io)?;
    write_element(&mut writer, root)?;

    let buf = writer.into_inner().into_inner();
    let xml = String::from_utf8(buf)
        .map_err(|e| InvoiceError::Xml(format!("XML UTF-8 error: {e}")))?;
    Ok(strip_blank_lines(&xml))
}

fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, element: &Element) -> Result<(), InvoiceError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (k, v) in &element.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    writer.write_event(Event::Start(start)).map_err(xml_io)?;

    let has_elements = element
        .children
        .iter()
        .any(|n| matches!(n, Node::Element(_)));
    if has_elements {
        for node in &element.children {
            match node {
                Node::Element(child) => write_element(writer, child)?,
                Node::Text(t) => write_text(writer, t)?,
            }
        }
    } else {
        // An empty text event keeps `<a></a>` on one line.
        write_text(writer, &element.text_content())?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_io)?;
    Ok(())
}

fn write_text(writer: &mut Writer<Cursor<Vec<u8>>>, text: &str) -> Result<(), InvoiceError> {
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(xml_io)?;
    Ok(())
}

fn strip_blank_lines(xml: &str) -> String {
    xml.lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Monetary amount with exactly two fractional digits.
pub fn format_amount(d: Decimal) -> String {
    fixed(d, 2)
}

/// Quantity with exactly four fractional digits.
pub fn format_quantity(d: Decimal) -> String {
    fixed(d, 4)
}

/// Percentage without trailing zeros ("9", "0", "8.5").
pub fn format_percent(d: Decimal) -> String {
    d.normalize().to_string()
}

fn fixed(d: Decimal, dp: u32) -> String {
    let mut r = round_amount(d, dp);
    r.rescale(dp);
    r.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_have_two_places() {
        assert_eq!(format_amount(dec!(100)), "100.00");
        assert_eq!(format_amount(dec!(49.9)), "49.90");
        assert_eq!(format_amount(dec!(1499.995)), "1500.00");
        assert_eq!(format_amount(dec!(-2.5)), "-2.50");
    }

    #[test]
    fn quantities_have_four_places() {
        assert_eq!(format_quantity(dec!(10)), "10.0000");
        assert_eq!(format_quantity(dec!(1.5)), "1.5000");
    }

    #[test]
    fn percent_is_normalized() {
        assert_eq!(format_percent(dec!(9.00)), "9");
        assert_eq!(format_percent(dec!(0)), "0");
        assert_eq!(format_percent(dec!(8.50)), "8.5");
    }

    #[test]
    fn escapes_all_five() {
        let xml = write_document(&Element::text("A", r#"A&B <"x"> 'y'"#)).unwrap();
        assert!(xml.ends_with("<A>A&amp;B &lt;&quot;x&quot;&gt; &apos;y&apos;</A>"));
    }

    #[test]
    fn writes_nested_tree() {
        let root = Element::new("Root")
            .attr("xmlns", "urn:test")
            .child(Element::text("Leaf", "a<b"))
            .child(Element::new("Empty"))
            .child(Element::new("Group").child(Element::text("Inner", "1")));
        let xml = write_document(&root).unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <Root xmlns=\"urn:test\">\n  \
             <Leaf>a&lt;b</Leaf>\n  \
             <Empty></Empty>\n  \
             <Group>\n    \
             <Inner>1</Inner>\n  \
             </Group>\n\
             </Root>"
        );
    }

    #[test]
    fn find_child() {
        let root = Element::new("R").child(Element::text("A", "1"));
        assert_eq!(root.find("A").map(Element::text_content), Some("1".into()));
        assert!(root.find("B").is_none());
    }
}
