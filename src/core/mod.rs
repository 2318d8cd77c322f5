//! Core invoice model, normalization, calculation and validation.
//!
//! This module provides the canonical invoice types for Singapore
//! InvoiceNow (Peppol BIS Billing 3.0) together with the pipeline stages
//! that need no XML: raw input → [`normalize`] → [`validate`].

mod builder;
mod error;
mod normalize;
pub mod participant;
mod profile;
pub mod raw;
pub mod totals;
mod types;
pub mod units;
mod validation;

pub use builder::*;
pub use error::*;
pub use normalize::*;
pub use participant::{IcdScheme, ParticipantId};
pub use profile::*;
pub use raw::RawInvoice;
pub use types::*;
pub use units::{is_known_unit_code, unit_code_for};
pub use validation::*;
