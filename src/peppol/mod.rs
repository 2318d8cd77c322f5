//! Peppol BIS Billing 3.0 UBL document generation (SG customization).
//!
//! Documents are built as an element tree and written in one pass, so the
//! same invoice always yields byte-identical output.
//!
//! # Example
//!
//! ```ignore
//! use invoicenow::peppol;
//!
//! let xml = peppol::serialize(&invoice)?;
//! let gated = peppol::serialize_checked(&invoice)?;
//! ```

mod ubl;
pub mod xml_tree;

pub use ubl::UblWriter;

use crate::core::{Invoice, InvoiceError, validate};

/// UBL 2.1 Invoice namespace.
pub const INVOICE_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:Invoice-2";

/// UBL 2.1 CreditNote namespace.
pub const CREDIT_NOTE_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:CreditNote-2";

/// Common aggregate components.
pub const CAC_NS: &str =
    "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";

/// Common basic components.
pub const CBC_NS: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";

/// Serialize under the default Singapore profile.
///
/// Not gated on validation: drafts with missing mandatory data still
/// serialize, with the missing elements omitted or empty.
pub fn serialize(invoice: &Invoice) -> Result<String, InvoiceError> {
    UblWriter::default().write(invoice)
}

/// Serialize only when the invoice has no error-severity diagnostics.
pub fn serialize_checked(invoice: &Invoice) -> Result<String, InvoiceError> {
    let result = validate(invoice);
    if !result.can_send {
        return Err(InvoiceError::Validation(result.summary));
    }
    serialize(invoice)
}
