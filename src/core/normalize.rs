//! Raw record → canonical [`Invoice`].
//!
//! Normalization fills structural defaults only. Declared amounts and
//! totals are copied as given so the validator can check them; nothing the
//! caller supplied is dropped except values that cannot be parsed at all.

use chrono::{DateTime, NaiveDate};

use super::profile::Profile;
use super::raw::*;
use super::types::*;
use super::units::unit_code_for;

/// Normalizes raw records under a national profile.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    profile: Profile,
}

impl Normalizer {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Build the canonical invoice. Never fails.
    pub fn normalize(&self, raw: &RawInvoice) -> Invoice {
        let items: Vec<LineItem> = raw
            .items
            .iter()
            .flatten()
            .enumerate()
            .map(|(i, item)| self.line(i, item))
            .collect();

        let tax_subtotals = raw
            .tax_subtotals
            .iter()
            .flatten()
            .map(|s| self.subtotal(s))
            .collect();

        let invoice = Invoice {
            invoice_number: text(&raw.invoice_number).unwrap_or_default(),
            type_code: text(&raw.invoice_type_code).unwrap_or_default(),
            issue_date: date("issue_date", &raw.issue_date),
            due_date: date("due_date", &raw.due_date),
            tax_point_date: date("tax_point_date", &raw.tax_point_date),
            currency_code: text(&raw.currency_code)
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_default(),
            buyer_reference: text(&raw.buyer_reference),
            notes: raw
                .notes
                .clone()
                .map(Notes::into_vec)
                .unwrap_or_default()
                .into_iter()
                .filter(|n| !n.trim().is_empty())
                .collect(),
            contract_reference: text(&raw.contract_ref),
            preceding_invoice_ref: text(&raw.preceding_invoice_ref),
            seller: self.party(raw.seller.as_ref()),
            buyer: self.party(raw.buyer.as_ref()),
            items,
            tax_subtotals,
            totals: MonetaryTotals {
                subtotal: raw.subtotal,
                tax_exclusive_amount: raw.tax_exclusive_amount,
                tax_amount: raw.tax_amount,
                tax_inclusive_amount: raw.tax_inclusive_amount,
                allowance_total: raw.allowance_total,
                charge_total: raw.charge_total,
                prepaid_amount: raw.prepaid_amount,
                rounding_amount: raw.rounding_amount,
                payable_amount: raw.payable_amount,
            },
            payment: raw.payment.as_ref().map(|p| PaymentDetails {
                means_code: text(&p.means_code),
                due_date: date("payment.due_date", &p.due_date),
                account_id: text(&p.account_id),
                account_name: text(&p.account_name),
                routing_id: text(&p.routing_id),
            }),
        };

        tracing::debug!(
            number = %invoice.invoice_number,
            items = invoice.items.len(),
            "normalized invoice"
        );
        invoice
    }

    fn party(&self, raw: Option<&RawParty>) -> Party {
        let Some(raw) = raw else {
            return Party {
                address: Address {
                    country_code: self.profile.default_country.clone(),
                    ..Default::default()
                },
                ..Default::default()
            };
        };

        let address = raw.address.clone().unwrap_or_default();
        let contact = Contact {
            name: text(&raw.contact_name),
            phone: text(&raw.phone),
            email: text(&raw.email),
        };

        Party {
            name: text(&raw.name).unwrap_or_default(),
            trading_name: text(&raw.trading_name),
            uen: text(&raw.uen),
            peppol_id: text(&raw.peppol_id),
            gst_registered: raw.gst_registered.unwrap_or(false),
            gst_number: text(&raw.gst_number),
            address: Address {
                street: text(&address.street),
                additional: text(&address.additional),
                city: text(&address.city),
                postal_code: text(&address.postal_code),
                country_code: text(&address.country_code)
                    .map(|c| c.to_ascii_uppercase())
                    .unwrap_or_else(|| self.profile.default_country.clone()),
            },
            contact: (!contact.is_empty()).then_some(contact),
        }
    }

    fn line(&self, index: usize, raw: &RawLineItem) -> LineItem {
        let tax_category = category(&raw.tax_category, &format!("items[{index}].tax_category"));
        let tax_rate = raw.tax_rate.or_else(|| {
            tax_category.map(|c| c.canonical_rate(self.profile.standard_gst_rate))
        });

        LineItem {
            id: text(&raw.id).unwrap_or_else(|| (index + 1).to_string()),
            name: text(&raw.name),
            description: text(&raw.description),
            quantity: raw.quantity,
            unit_code: unit_code_for(raw.unit_code.as_deref().unwrap_or_default()),
            unit_price: raw.unit_price,
            line_amount: raw.line_amount,
            discount: raw.discount,
            tax_category,
            tax_rate,
            tax_amount: raw.tax_amount,
            allowances: raw
                .allowances
                .iter()
                .flatten()
                .map(|ac| AllowanceCharge {
                    is_charge: ac.is_charge.unwrap_or(false),
                    amount: ac.amount.unwrap_or_default(),
                    reason: text(&ac.reason),
                })
                .collect(),
            seller_item_id: text(&raw.seller_item_id),
            buyer_item_id: text(&raw.buyer_item_id),
            standard_item_id: text(&raw.standard_item_id),
        }
    }

    fn subtotal(&self, raw: &RawTaxSubtotal) -> TaxSubtotal {
        let category = category(&raw.category, "tax_subtotals.category");
        TaxSubtotal {
            category,
            rate: raw
                .rate
                .or_else(|| category.map(|c| c.canonical_rate(self.profile.standard_gst_rate)))
                .unwrap_or_default(),
            taxable_amount: raw.taxable_amount.unwrap_or_default(),
            tax_amount: raw.tax_amount.unwrap_or_default(),
        }
    }
}

/// Normalize under the default Singapore profile.
pub fn normalize(raw: &RawInvoice) -> Invoice {
    Normalizer::default().normalize(raw)
}

/// Parse `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    NaiveDate::parse_from_str(v, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(v).ok().map(|dt| dt.date_naive()))
}

fn date(field: &str, raw: &Option<String>) -> Option<NaiveDate> {
    let value = text(raw)?;
    let parsed = parse_date(&value);
    if parsed.is_none() {
        tracing::warn!(field, value = %value, "discarding unparseable date");
    }
    parsed
}

/// Absent or blank categories default to standard-rated; unknown symbols
/// become `None` for the validator to report.
fn category(raw: &Option<String>, field: &str) -> Option<TaxCategory> {
    match text(raw) {
        None => Some(TaxCategory::StandardRated),
        Some(symbol) => {
            let parsed = TaxCategory::from_symbol(&symbol);
            if parsed.is_none() {
                tracing::warn!(field, symbol = %symbol, "unknown tax category");
            }
            parsed
        }
    }
}

fn text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
