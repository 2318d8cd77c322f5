//! Peppol participant identifiers (`<scheme>:<registration-id>`).

use serde::{Deserialize, Serialize};

/// Common ICD schemes seen on Singapore invoices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IcdScheme {
    /// The 4-digit ICD code.
    pub code: &'static str,
    pub description: &'static str,
}

impl IcdScheme {
    /// Singapore UEN.
    pub const SG_UEN: Self = Self {
        code: "0195",
        description: "Singapore UEN",
    };
    /// GS1 GLN.
    pub const GLN: Self = Self {
        code: "0088",
        description: "GS1 GLN",
    };
    /// Dun & Bradstreet DUNS.
    pub const DUNS: Self = Self {
        code: "0060",
        description: "DUNS number",
    };

    pub fn from_code(code: &str) -> Option<Self> {
        [Self::SG_UEN, Self::GLN, Self::DUNS]
            .into_iter()
            .find(|s| s.code == code)
    }
}

/// Peppol document type identifier for SG invoices (directory lookups).
pub const SG_INVOICE_DOCTYPE: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2::Invoice##urn:cen.eu:en16931:2017#conformant#urn:fdc:peppol.eu:2017:poacc:billing:international:sg:3.0::2.1";

/// Peppol document type identifier for SG credit notes.
pub const SG_CREDIT_NOTE_DOCTYPE: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2::CreditNote##urn:cen.eu:en16931:2017#conformant#urn:fdc:peppol.eu:2017:poacc:billing:international:sg:3.0::2.1";

/// A well-formed participant identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParticipantId {
    pub scheme: String,
    pub value: String,
}

impl ParticipantId {
    /// Strict parse: exactly four digits, a colon, then one or more ASCII
    /// alphanumerics.
    pub fn parse(raw: &str) -> Option<Self> {
        let (scheme, value) = raw.trim().split_once(':')?;
        let scheme_ok = scheme.len() == 4 && scheme.chars().all(|c| c.is_ascii_digit());
        let value_ok = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric());
        if scheme_ok && value_ok {
            Some(Self {
                scheme: scheme.to_string(),
                value: value.to_string(),
            })
        } else {
            None
        }
    }

    /// The well-known ICD scheme of this identifier, if any.
    pub fn icd_scheme(&self) -> Option<IcdScheme> {
        IcdScheme::from_code(&self.scheme)
    }

    /// Lenient split used when emitting EndpointID: anything without a
    /// colon is treated as a bare identifier under `default_scheme`.
    pub fn split(raw: &str, default_scheme: &str) -> Self {
        match raw.trim().split_once(':') {
            Some((scheme, value)) if !scheme.is_empty() => Self {
                scheme: scheme.to_string(),
                value: value.to_string(),
            },
            Some((_, value)) => Self {
                scheme: default_scheme.to_string(),
                value: value.to_string(),
            },
            None => Self {
                scheme: default_scheme.to_string(),
                value: raw.trim().to_string(),
            },
        }
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.scheme, self.value)
    }
}

/// Sanity check of a Singapore UEN.
///
/// Accepts the three issued shapes: businesses (`nnnnnnnnX`), local
/// companies (`yyyynnnnnX`) and other entities (`[RST]yyPQnnnnX`).
pub fn is_plausible_uen(uen: &str) -> bool {
    let u = uen.trim();
    let bytes = u.as_bytes();
    if !bytes.iter().all(|b| b.is_ascii_alphanumeric()) {
        return false;
    }
    let Some(last) = bytes.last() else {
        return false;
    };
    if !last.is_ascii_uppercase() {
        return false;
    }
    let body = &bytes[..bytes.len() - 1];
    match bytes.len() {
        9 => body.iter().all(u8::is_ascii_digit),
        10 => {
            let all_digits = body.iter().all(u8::is_ascii_digit);
            let entity = matches!(body[0], b'R' | b'S' | b'T')
                && body[1..3].iter().all(u8::is_ascii_digit)
                && body[3..5].iter().all(u8::is_ascii_uppercase)
                && body[5..].iter().all(u8::is_ascii_digit);
            all_digits || entity
        }
        _ => false,
    }
}
