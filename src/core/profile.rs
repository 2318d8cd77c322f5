//! National profile configuration.
//!
//! The defaults describe Singapore's Peppol BIS Billing 3.0 customization.
//! Deployments can override individual values from JSON, e.g. when the
//! statutory GST rate changes.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;

/// Singapore Peppol BIS Billing 3.0 customization identifier (BT-24).
pub const SG_CUSTOMIZATION_ID: &str =
    "urn:cen.eu:en16931:2017#conformant#urn:fdc:peppol.eu:2017:poacc:billing:international:sg:3.0";

/// Peppol BIS Billing 3.0 profile identifier (BT-23).
pub const PEPPOL_PROFILE_ID: &str = "urn:fdc:peppol.eu:2017:poacc:billing:01:1.0";

/// ICD scheme for Singapore UEN participant identifiers.
pub const SG_UEN_SCHEME: &str = "0195";

/// Statutory standard GST rate (percent) since 1 January 2024.
pub const SG_STANDARD_GST_RATE: Decimal = dec!(9);

pub const DEFAULT_CURRENCY: &str = "SGD";
pub const DEFAULT_COUNTRY: &str = "SG";
pub const DEFAULT_CITY: &str = "Singapore";

/// Absolute tolerance for every monetary equality check.
pub const AMOUNT_TOLERANCE: Decimal = dec!(0.01);

/// Constants of the national profile used by the normalizer, validator
/// and serializer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub customization_id: String,
    pub profile_id: String,
    /// Participant identifier scheme used when only a UEN is known.
    pub participant_scheme: String,
    pub default_currency: String,
    pub default_country: String,
    /// City emitted when a party address has none.
    pub default_city: String,
    /// Statutory standard GST rate in percent.
    pub standard_gst_rate: Decimal,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            customization_id: SG_CUSTOMIZATION_ID.to_string(),
            profile_id: PEPPOL_PROFILE_ID.to_string(),
            participant_scheme: SG_UEN_SCHEME.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            default_country: DEFAULT_COUNTRY.to_string(),
            default_city: DEFAULT_CITY.to_string(),
            standard_gst_rate: SG_STANDARD_GST_RATE,
        }
    }
}

impl Profile {
    /// Load a profile from JSON. Missing keys keep their Singapore defaults.
    pub fn from_json(json: &str) -> Result<Self, InvoiceError> {
        let profile: Profile = serde_json::from_str(json)
            .map_err(|e| InvoiceError::Config(format!("invalid profile JSON: {e}")))?;
        profile.check()?;
        Ok(profile)
    }

    fn check(&self) -> Result<(), InvoiceError> {
        if self.standard_gst_rate.is_sign_negative() || self.standard_gst_rate > dec!(100) {
            return Err(InvoiceError::Config(format!(
                "standard GST rate must be between 0 and 100, got {}",
                self.standard_gst_rate
            )));
        }
        if self.participant_scheme.len() != 4
            || !self.participant_scheme.chars().all(|c| c.is_ascii_digit())
        {
            return Err(InvoiceError::Config(format!(
                "participant scheme must be a 4-digit ICD code, got '{}'",
                self.participant_scheme
            )));
        }
        Ok(())
    }
}
