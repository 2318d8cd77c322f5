//! Asynchronous pre-send checks against external services.
//!
//! The synchronous validator only sees the document. Before transmitting,
//! callers may also ask the Peppol directory whether the buyer can receive
//! the document and the GST registry whether the seller's registration is
//! active. Findings are appended to an existing [`ValidationResult`]; a
//! failing or slow service downgrades to a warning rather than blocking.
//!
//! ```ignore
//! use invoicenow::presend::{PreSendValidator, mock::{StaticDirectory, StaticGstRegistry}};
//!
//! let checks = PreSendValidator::new(
//!     StaticDirectory::new().with_participant("0195:201912345M").shared(),
//!     StaticGstRegistry::new().shared(),
//! );
//! let result = checks.run(&invoice, invoicenow::validate(&invoice)).await;
//! ```

pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::participant::{SG_CREDIT_NOTE_DOCTYPE, SG_INVOICE_DOCTYPE};
use crate::core::{Diagnostic, Invoice, InvoiceError, ParticipantId, ValidationResult};

/// Default per-check time budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// What the directory knows about a participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCapabilities {
    /// Whether the participant is registered at all.
    pub registered: bool,
    /// Document type identifiers the participant accepts.
    pub document_types: Vec<String>,
}

impl ParticipantCapabilities {
    pub fn supports(&self, document_type: &str) -> bool {
        self.document_types.iter().any(|d| d == document_type)
    }
}

/// Registry view of a GST registration number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GstRegistrationStatus {
    Active,
    Cancelled,
    NotFound,
}

#[async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn capabilities(
        &self,
        participant: &ParticipantId,
    ) -> Result<ParticipantCapabilities, InvoiceError>;
}

#[async_trait]
pub trait GstRegistryClient: Send + Sync {
    async fn status(&self, gst_number: &str) -> Result<GstRegistrationStatus, InvoiceError>;
}

/// Runs directory and registry checks concurrently, each under a timeout.
#[derive(Clone)]
pub struct PreSendValidator {
    directory: Arc<dyn DirectoryClient>,
    registry: Arc<dyn GstRegistryClient>,
    timeout: Duration,
}

impl PreSendValidator {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        registry: Arc<dyn GstRegistryClient>,
    ) -> Self {
        Self {
            directory,
            registry,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Append pre-send findings to `result`. Existing diagnostics are kept;
    /// counts, verdict and summary are recomputed.
    pub async fn run(&self, invoice: &Invoice, mut result: ValidationResult) -> ValidationResult {
        let (directory, registry) =
            tokio::join!(self.check_buyer(invoice), self.check_seller_gst(invoice));
        result.extend(directory.into_iter().chain(registry));
        tracing::debug!(
            number = %invoice.invoice_number,
            errors = result.error_count,
            warnings = result.warning_count,
            "pre-send checks done"
        );
        result
    }

    async fn check_buyer(&self, invoice: &Invoice) -> Option<Diagnostic> {
        // Missing or malformed IDs are already reported synchronously.
        let participant = invoice
            .buyer
            .peppol_id
            .as_deref()
            .and_then(ParticipantId::parse)?;

        let lookup = tokio::time::timeout(self.timeout, self.directory.capabilities(&participant));
        let caps = match lookup.await {
            Ok(Ok(caps)) => caps,
            Ok(Err(e)) => return Some(unavailable("buyer.peppol_id", "directory lookup", &e.to_string())),
            Err(_) => return Some(unavailable("buyer.peppol_id", "directory lookup", "timed out")),
        };

        let doctype = if invoice.is_credit_note() {
            SG_CREDIT_NOTE_DOCTYPE
        } else {
            SG_INVOICE_DOCTYPE
        };
        if !caps.registered {
            let scheme = participant
                .icd_scheme()
                .map_or("unrecognized scheme", |s| s.description);
            Some(Diagnostic::error(
                "SG-PRE-01",
                "buyer.peppol_id",
                format!("buyer {participant} ({scheme}) is not registered in the Peppol directory"),
            ))
        } else if !caps.supports(doctype) {
            Some(Diagnostic::error(
                "SG-PRE-02",
                "buyer.peppol_id",
                format!("buyer {participant} cannot receive this document type"),
            ))
        } else {
            None
        }
    }

    async fn check_seller_gst(&self, invoice: &Invoice) -> Option<Diagnostic> {
        let number = invoice
            .seller
            .gst_number
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())?;

        let lookup = tokio::time::timeout(self.timeout, self.registry.status(number));
        match lookup.await {
            Ok(Ok(GstRegistrationStatus::Active)) => None,
            Ok(Ok(status)) => Some(Diagnostic::error(
                "SG-PRE-03",
                "seller.gst_number",
                format!("seller GST registration {number} is not active ({status:?})"),
            )),
            Ok(Err(e)) => Some(unavailable("seller.gst_number", "GST registry lookup", &e.to_string())),
            Err(_) => Some(unavailable("seller.gst_number", "GST registry lookup", "timed out")),
        }
    }
}

fn unavailable(field: &str, check: &str, reason: &str) -> Diagnostic {
    tracing::warn!(field, check, reason, "pre-send check unavailable");
    Diagnostic::warning("SG-PRE-04", field, format!("{check} could not be completed: {reason}"))
}
