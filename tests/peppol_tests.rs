#![cfg(feature = "peppol")]

use chrono::NaiveDate;
use invoicenow::core::*;
use invoicenow::peppol::*;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

const SAMPLE: &str = include_str!("fixtures/sample_invoice.json");

fn sample() -> Invoice {
    normalize(&RawInvoice::from_json(SAMPLE).unwrap())
}

fn sample_with(edit: impl FnOnce(&mut Value)) -> Invoice {
    let mut value: Value = serde_json::from_str(SAMPLE).unwrap();
    edit(&mut value);
    normalize(&serde_json::from_value(value).unwrap())
}

/// Text of the first `<tag ...>text</tag>` occurrence.
fn first_text<'a>(xml: &'a str, tag: &str) -> Option<&'a str> {
    let open = format!("<{tag}");
    let start = xml.find(&open)?;
    let after = &xml[start..];
    let gt = after.find('>')?;
    let close = format!("</{tag}>");
    let end = after.find(&close)?;
    Some(&after[gt + 1..end])
}

#[test]
fn document_header() {
    let xml = serialize(&sample()).unwrap();
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Invoice "));
    assert!(xml.contains(r#"xmlns="urn:oasis:names:specification:ubl:schema:xsd:Invoice-2""#));
    assert!(xml.contains(r#"xmlns:cac="urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2""#));
    assert!(xml.contains(r#"xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2""#));
    assert_eq!(
        first_text(&xml, "cbc:CustomizationID"),
        Some("urn:cen.eu:en16931:2017#conformant#urn:fdc:peppol.eu:2017:poacc:billing:international:sg:3.0")
    );
    assert_eq!(
        first_text(&xml, "cbc:ProfileID"),
        Some("urn:fdc:peppol.eu:2017:poacc:billing:01:1.0")
    );
    assert_eq!(first_text(&xml, "cbc:ID"), Some("INV-2024-0042"));
    assert_eq!(first_text(&xml, "cbc:IssueDate"), Some("2024-03-01"));
    assert_eq!(first_text(&xml, "cbc:DueDate"), Some("2024-03-31"));
    assert_eq!(first_text(&xml, "cbc:InvoiceTypeCode"), Some("380"));
    assert_eq!(first_text(&xml, "cbc:DocumentCurrencyCode"), Some("SGD"));
    assert!(xml.ends_with("</Invoice>"));
}

#[test]
fn header_element_order() {
    let xml = serialize(&sample()).unwrap();
    let pos = |tag: &str| xml.find(tag).unwrap_or_else(|| panic!("{tag} missing"));
    let order = [
        "<cbc:CustomizationID>",
        "<cbc:ProfileID>",
        "<cbc:ID>",
        "<cbc:IssueDate>",
        "<cbc:DueDate>",
        "<cbc:InvoiceTypeCode>",
        "<cbc:DocumentCurrencyCode>",
        "<cbc:BuyerReference>",
        "<cbc:Note>",
        "<cac:AccountingSupplierParty>",
        "<cac:AccountingCustomerParty>",
        "<cac:PaymentMeans>",
        "<cac:TaxTotal>",
        "<cac:LegalMonetaryTotal>",
        "<cac:InvoiceLine>",
    ];
    for pair in order.windows(2) {
        assert!(pos(pair[0]) < pos(pair[1]), "{} should precede {}", pair[0], pair[1]);
    }
}

#[test]
fn serialization_is_deterministic() {
    let inv = sample();
    assert_eq!(serialize(&inv).unwrap(), serialize(&inv).unwrap());
}

#[test]
fn number_is_escaped_verbatim() {
    let inv = sample_with(|v| v["invoice_number"] = json!(r#"INV<1>&"2"'"#));
    let xml = serialize(&inv).unwrap();
    assert!(xml.contains("<cbc:ID>INV&lt;1&gt;&amp;&quot;2&quot;&apos;</cbc:ID>"));
}

#[test]
fn absent_optionals_are_omitted() {
    let inv = sample_with(|v| {
        let obj = v.as_object_mut().unwrap();
        obj.remove("due_date");
        obj.remove("buyer_reference");
        obj.remove("notes");
        obj.remove("payment");
    });
    let xml = serialize(&inv).unwrap();
    assert!(!xml.contains("DueDate"));
    assert!(!xml.contains("BuyerReference"));
    assert!(!xml.contains("cbc:Note"));
    assert!(!xml.contains("PaymentMeans"));
    assert!(!xml.contains("TaxPointDate"));
    assert!(!xml.contains("BillingReference"));
    assert!(!xml.contains("PrepaidAmount"));
    assert!(!xml.contains("AllowanceTotalAmount"));
}

#[test]
fn no_blank_lines() {
    let inv = sample_with(|v| v["notes"] = json!(["first", "", "second"]));
    let xml = serialize(&inv).unwrap();
    assert!(xml.lines().all(|l| !l.trim().is_empty()));
}

#[test]
fn parties() {
    let xml = serialize(&sample()).unwrap();
    assert!(xml.contains(r#"<cbc:EndpointID schemeID="0195">T08GB0001A</cbc:EndpointID>"#));
    assert!(xml.contains(r#"<cbc:EndpointID schemeID="0195">201912345M</cbc:EndpointID>"#));
    assert!(xml.contains("<cbc:CompanyID>M90312345A</cbc:CompanyID>"));
    assert!(xml.contains("<cbc:RegistrationName>Acme Solutions Pte Ltd</cbc:RegistrationName>"));
    assert!(xml.contains("<cbc:ElectronicMail>billing@acme.sg</cbc:ElectronicMail>"));
    // buyer address carries no city; the profile default fills it
    let buyer = &xml[xml.find("<cac:AccountingCustomerParty>").unwrap()..];
    assert_eq!(first_text(buyer, "cbc:CityName"), Some("Singapore"));
    assert_eq!(first_text(buyer, "cbc:IdentificationCode"), Some("SG"));
    // tax scheme only on the seller
    assert!(!buyer[..buyer.find("</cac:AccountingCustomerParty>").unwrap()].contains("PartyTaxScheme"));
}

#[test]
fn totals_and_tax() {
    let xml = serialize(&sample()).unwrap();
    assert!(xml.contains(r#"<cbc:TaxAmount currencyID="SGD">180.00</cbc:TaxAmount>"#));
    assert!(xml.contains(r#"<cbc:TaxableAmount currencyID="SGD">2000.00</cbc:TaxableAmount>"#));
    assert!(xml.contains("<cbc:Percent>9</cbc:Percent>"));
    assert!(xml.contains(r#"<cbc:LineExtensionAmount currencyID="SGD">2000.00</cbc:LineExtensionAmount>"#));
    assert!(xml.contains(r#"<cbc:PayableAmount currencyID="SGD">2180.00</cbc:PayableAmount>"#));
    assert!(xml.contains("<cbc:ID>GST</cbc:ID>"));
}

#[test]
fn lines() {
    let xml = serialize(&sample()).unwrap();
    assert_eq!(xml.matches("<cac:InvoiceLine>").count(), 2);
    assert!(xml.contains(r#"<cbc:InvoicedQuantity unitCode="HUR">10.0000</cbc:InvoicedQuantity>"#));
    assert!(xml.contains(r#"<cbc:PriceAmount currencyID="SGD">150.00</cbc:PriceAmount>"#));
    assert!(xml.contains("<cbc:Description>March retainer</cbc:Description>"));
    assert!(xml.contains("<cbc:Name>Consulting services</cbc:Name>"));
}

#[test]
fn payment_means_block() {
    let xml = serialize(&sample()).unwrap();
    assert_eq!(first_text(&xml, "cbc:PaymentMeansCode"), Some("30"));
    let account = &xml[xml.find("<cac:PayeeFinancialAccount>").unwrap()..];
    assert_eq!(first_text(account, "cbc:ID"), Some("123-456789-001"));
    assert!(account.contains("<cbc:ID>DBSSSGSG</cbc:ID>"));
}

#[test]
fn credit_note_root() {
    let inv = sample_with(|v| {
        v["invoice_type_code"] = json!("381");
        v["preceding_invoice_ref"] = json!("INV-2024-0001");
    });
    let xml = serialize(&inv).unwrap();
    assert!(xml.contains("<CreditNote "));
    assert!(xml.contains(r#"xmlns="urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2""#));
    assert_eq!(first_text(&xml, "cbc:CreditNoteTypeCode"), Some("381"));
    assert!(xml.contains("<cac:CreditNoteLine>"));
    assert!(xml.contains("<cbc:CreditedQuantity"));
    assert!(!xml.contains("InvoiceLine"));
    let billing = &xml[xml.find("<cac:BillingReference>").unwrap()..];
    assert_eq!(first_text(billing, "cbc:ID"), Some("INV-2024-0001"));
}

#[test]
fn other_type_codes_keep_invoice_root() {
    for code in ["383", "384", "386", "389"] {
        let inv = sample_with(|v| v["invoice_type_code"] = json!(code));
        let xml = serialize(&inv).unwrap();
        assert!(xml.contains("<Invoice "), "{code}");
        assert_eq!(first_text(&xml, "cbc:InvoiceTypeCode"), Some(code));
    }
}

#[test]
fn draft_serializes_without_validation() {
    let xml = serialize(&normalize(&RawInvoice::default())).unwrap();
    assert!(xml.contains("<cbc:ID></cbc:ID>"));
    assert!(xml.contains(r#"<cbc:DocumentCurrencyCode>SGD</cbc:DocumentCurrencyCode>"#));
    assert!(xml.contains("<cbc:InvoiceTypeCode>380</cbc:InvoiceTypeCode>"));
}

#[test]
fn checked_serialization_gates_on_errors() {
    assert!(serialize_checked(&sample()).is_ok());

    let broken = sample_with(|v| {
        v.as_object_mut().unwrap().remove("invoice_number");
    });
    let err = serialize_checked(&broken).unwrap_err();
    assert!(matches!(err, InvoiceError::Validation(_)));
}

#[test]
fn custom_profile_identifiers() {
    let profile = Profile::from_json(r#"{ "customization_id": "urn:example:custom" }"#).unwrap();
    let xml = UblWriter::new(profile).write(&sample()).unwrap();
    assert_eq!(first_text(&xml, "cbc:CustomizationID"), Some("urn:example:custom"));
}

#[test]
fn builder_invoice_round_trips_through_serializer() {
    let inv = InvoiceBuilder::new("INV-B-1", NaiveDate::from_ymd_opt(2024, 5, 2).unwrap())
        .seller(
            PartyBuilder::new("Acme Pte Ltd", AddressBuilder::singapore().build())
                .peppol_id("0195:T08GB0001A")
                .gst_registered("M90312345A")
                .build(),
        )
        .buyer(
            PartyBuilder::new("Buyer Pte Ltd", AddressBuilder::singapore().build())
                .peppol_id("0195:201912345M")
                .build(),
        )
        .add_line(
            LineItemBuilder::new("1", "Cables", dec!(3), "pcs", dec!(12.50))
                .add_charge(dec!(2), "Handling")
                .standard_item_id("04012345678901")
                .build(),
        )
        .payment(PaymentDetailsBuilder::credit_transfer("987-654").build())
        .build();
    let xml = serialize_checked(&inv).unwrap();
    assert!(xml.contains(r#"<cbc:LineExtensionAmount currencyID="SGD">39.50</cbc:LineExtensionAmount>"#));
    assert!(xml.contains("<cbc:ChargeIndicator>true</cbc:ChargeIndicator>"));
    assert!(xml.contains(r#"<cbc:ID schemeID="0160">04012345678901</cbc:ID>"#));
}
