//! In-memory service doubles for demos and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use super::{DirectoryClient, GstRegistryClient, GstRegistrationStatus, ParticipantCapabilities};
use crate::core::participant::{SG_CREDIT_NOTE_DOCTYPE, SG_INVOICE_DOCTYPE};
use crate::core::{InvoiceError, ParticipantId};

/// Directory answering from a fixed table. Unknown participants are
/// reported as unregistered.
#[derive(Clone, Default)]
pub struct StaticDirectory {
    entries: HashMap<String, ParticipantCapabilities>,
    latency: Option<Duration>,
    fail: bool,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `participant` (`scheme:id`) for SG invoices and credit notes.
    pub fn with_participant(mut self, participant: &str) -> Self {
        self.entries.insert(
            participant.to_string(),
            ParticipantCapabilities {
                registered: true,
                document_types: vec![
                    SG_INVOICE_DOCTYPE.to_string(),
                    SG_CREDIT_NOTE_DOCTYPE.to_string(),
                ],
            },
        );
        self
    }

    pub fn with_capabilities(mut self, participant: &str, caps: ParticipantCapabilities) -> Self {
        self.entries.insert(participant.to_string(), caps);
        self
    }

    /// Delay every answer, e.g. to exercise timeouts.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer every lookup with an error.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl DirectoryClient for StaticDirectory {
    async fn capabilities(
        &self,
        participant: &ParticipantId,
    ) -> Result<ParticipantCapabilities, InvoiceError> {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
        if self.fail {
            return Err(InvoiceError::PreSend("directory unavailable".into()));
        }
        Ok(self
            .entries
            .get(&participant.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

/// GST registry answering from a fixed table. Unknown numbers are `NotFound`.
#[derive(Clone, Default)]
pub struct StaticGstRegistry {
    entries: HashMap<String, GstRegistrationStatus>,
    latency: Option<Duration>,
}

impl StaticGstRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, gst_number: &str, status: GstRegistrationStatus) -> Self {
        self.entries.insert(gst_number.to_string(), status);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl GstRegistryClient for StaticGstRegistry {
    async fn status(&self, gst_number: &str) -> Result<GstRegistrationStatus, InvoiceError> {
        if let Some(latency) = self.latency {
            sleep(latency).await;
        }
        Ok(self
            .entries
            .get(gst_number)
            .copied()
            .unwrap_or(GstRegistrationStatus::NotFound))
    }
}
