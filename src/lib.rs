//! # invoicenow
//!
//! Compliance engine for Singapore InvoiceNow: turns loosely-structured
//! invoice records into validated Peppol BIS Billing 3.0 (SG) UBL documents.
//!
//! The pipeline is raw record → [`normalize`] → [`validate`] →
//! [`peppol::serialize`]. Business-rule findings are returned as
//! [`Diagnostic`] values; only configuration and writer faults are errors.
//!
//! All monetary values use [`rust_decimal::Decimal`], never floating point.
//!
//! ## Quick Start
//!
//! ```rust
//! use invoicenow::core::*;
//!
//! let raw = RawInvoice::from_json(r#"{
//!     "invoice_number": "INV-2024-001",
//!     "invoice_type_code": "380",
//!     "issue_date": "2024-03-01",
//!     "currency_code": "SGD",
//!     "seller": { "name": "Acme Pte Ltd", "uen": "T08GB0001A", "peppol_id": "0195:T08GB0001A",
//!                 "gst_registered": true, "gst_number": "M90312345A" },
//!     "buyer": { "name": "Buyer Pte Ltd", "peppol_id": "0195:201912345M" },
//!     "items": [
//!         { "name": "Consulting", "quantity": 10, "unit": "hour", "unit_price": "150.00", "line_amount": "1500.00" }
//!     ],
//!     "subtotal": "1500.00", "tax_amount": "135.00", "tax_inclusive_amount": "1635.00",
//!     "payable_amount": "1635.00",
//!     "payment": { "means_code": "30", "account_id": "123-456-789" }
//! }"#).unwrap();
//!
//! let invoice = normalize(&raw);
//! let result = validate(&invoice);
//! assert!(result.can_send, "{:?}", result.errors);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Invoice model, normalizer, calculator, validator |
//! | `peppol` | UBL 2.1 Invoice / CreditNote serializer |
//! | `presend` | Async directory and GST registry checks |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "peppol")]
pub mod peppol;

#[cfg(feature = "presend")]
pub mod presend;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
