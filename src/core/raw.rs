//! Loosely-structured invoice records as produced by form layers.
//!
//! Every field is optional. Amounts accept JSON numbers or numeric strings,
//! flags accept booleans, `"yes"`/`"true"` and `1`. Values that cannot be
//! read are dropped to `None`; the validator reports them as missing.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInvoice {
    #[serde(deserialize_with = "lenient_string")]
    pub invoice_number: Option<String>,
    #[serde(alias = "type_code", deserialize_with = "lenient_string")]
    pub invoice_type_code: Option<String>,
    pub issue_date: Option<String>,
    pub due_date: Option<String>,
    pub tax_point_date: Option<String>,
    pub currency_code: Option<String>,
    pub buyer_reference: Option<String>,
    pub notes: Option<Notes>,
    #[serde(alias = "contract_reference")]
    pub contract_ref: Option<String>,
    pub preceding_invoice_ref: Option<String>,
    pub seller: Option<RawParty>,
    pub buyer: Option<RawParty>,
    pub items: Option<Vec<RawLineItem>>,
    pub tax_subtotals: Option<Vec<RawTaxSubtotal>>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub subtotal: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_exclusive_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_inclusive_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub allowance_total: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub charge_total: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub prepaid_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub rounding_amount: Option<Decimal>,
    #[serde(alias = "total_amount", deserialize_with = "lenient_decimal")]
    pub payable_amount: Option<Decimal>,
    pub payment: Option<RawPayment>,
}

impl RawInvoice {
    /// Parse a raw record from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Notes as a single string or a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notes {
    One(String),
    Many(Vec<String>),
}

impl Notes {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Notes::One(s) => vec![s],
            Notes::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawParty {
    pub name: Option<String>,
    pub trading_name: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub uen: Option<String>,
    pub peppol_id: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub gst_registered: Option<bool>,
    #[serde(alias = "gst_registration_number", deserialize_with = "lenient_string")]
    pub gst_number: Option<String>,
    pub address: Option<RawAddress>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAddress {
    pub street: Option<String>,
    pub additional: Option<String>,
    pub city: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    pub postal_code: Option<String>,
    #[serde(alias = "country")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawLineItem {
    #[serde(deserialize_with = "lenient_string")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub quantity: Option<Decimal>,
    #[serde(alias = "unit")]
    pub unit_code: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub unit_price: Option<Decimal>,
    #[serde(alias = "amount", deserialize_with = "lenient_decimal")]
    pub line_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub discount: Option<Decimal>,
    pub tax_category: Option<String>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_rate: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_amount: Option<Decimal>,
    pub allowances: Option<Vec<RawAllowanceCharge>>,
    pub seller_item_id: Option<String>,
    pub buyer_item_id: Option<String>,
    pub standard_item_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawAllowanceCharge {
    #[serde(deserialize_with = "lenient_bool")]
    pub is_charge: Option<bool>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTaxSubtotal {
    #[serde(alias = "tax_category")]
    pub category: Option<String>,
    #[serde(alias = "tax_rate", deserialize_with = "lenient_decimal")]
    pub rate: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub taxable_amount: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal")]
    pub tax_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawPayment {
    #[serde(alias = "payment_means_code", deserialize_with = "lenient_string")]
    pub means_code: Option<String>,
    pub due_date: Option<String>,
    #[serde(alias = "bank_account", deserialize_with = "lenient_string")]
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    #[serde(alias = "swift_code", alias = "bank_code")]
    pub routing_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Number or numeric string; anything else becomes `None`.
pub(crate) fn lenient_decimal<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        Some(Scalar::Int(i)) => Some(Decimal::from(i)),
        Some(Scalar::Float(f)) => Decimal::from_str(&f.to_string()).ok(),
        Some(Scalar::Text(s)) => {
            let t = s.trim().replace(',', "");
            Decimal::from_str(&t)
                .or_else(|_| Decimal::from_scientific(&t))
                .ok()
        }
        _ => None,
    })
}

/// String or number rendered as a string; blank becomes `None`.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        Some(Scalar::Text(s)) if !s.trim().is_empty() => Some(s),
        Some(Scalar::Int(i)) => Some(i.to_string()),
        Some(Scalar::Float(f)) => Some(f.to_string()),
        _ => None,
    })
}

/// Boolean, `"true"`/`"yes"`/`"y"`/`"1"`, or a number (non-zero is true).
pub(crate) fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
    Ok(match Option::<Scalar>::deserialize(d)? {
        Some(Scalar::Bool(b)) => Some(b),
        Some(Scalar::Int(i)) => Some(i != 0),
        Some(Scalar::Float(f)) => Some(f != 0.0),
        Some(Scalar::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "1" => Some(true),
            "false" | "no" | "n" | "0" | "" => Some(false),
            _ => None,
        },
        _ => None,
    })
}
