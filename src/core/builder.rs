use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::profile::{DEFAULT_COUNTRY, DEFAULT_CURRENCY, SG_STANDARD_GST_RATE};
use super::totals;
use super::types::*;
use super::validation;

/// Builder for invoices assembled in code rather than from raw records.
///
/// ```
/// use invoicenow::core::*;
/// use rust_decimal_macros::dec;
/// use chrono::NaiveDate;
///
/// let invoice = InvoiceBuilder::new("INV-2024-001", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
///     .seller(PartyBuilder::new("Acme Pte Ltd", AddressBuilder::new("Singapore", "018956", "SG").build())
///         .uen("T08GB0001A")
///         .peppol_id("0195:T08GB0001A")
///         .gst_registered("M90312345A")
///         .build())
///     .buyer(PartyBuilder::new("Buyer Pte Ltd", AddressBuilder::new("Singapore", "238801", "SG").build())
///         .peppol_id("0195:201912345M")
///         .build())
///     .add_line(LineItemBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(150.00)).build())
///     .build();
///
/// assert_eq!(invoice.totals.payable_amount, Some(dec!(1635.00)));
/// ```
pub struct InvoiceBuilder {
    number: String,
    issue_date: NaiveDate,
    due_date: Option<NaiveDate>,
    tax_point_date: Option<NaiveDate>,
    type_code: InvoiceTypeCode,
    currency_code: String,
    buyer_reference: Option<String>,
    notes: Vec<String>,
    contract_reference: Option<String>,
    preceding_invoice_ref: Option<String>,
    seller: Party,
    buyer: Party,
    lines: Vec<LineItem>,
    adjustments: totals::Adjustments,
    declared_totals: Option<MonetaryTotals>,
    payment: Option<PaymentDetails>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            number: number.into(),
            issue_date,
            due_date: None,
            tax_point_date: None,
            type_code: InvoiceTypeCode::Invoice,
            currency_code: DEFAULT_CURRENCY.to_string(),
            buyer_reference: None,
            notes: Vec::new(),
            contract_reference: None,
            preceding_invoice_ref: None,
            seller: Party::default(),
            buyer: Party::default(),
            lines: Vec::new(),
            adjustments: totals::Adjustments::default(),
            declared_totals: None,
            payment: None,
        }
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    pub fn tax_point_date(mut self, date: NaiveDate) -> Self {
        self.tax_point_date = Some(date);
        self
    }

    pub fn type_code(mut self, code: InvoiceTypeCode) -> Self {
        self.type_code = code;
        self
    }

    /// Credit note (381) against `preceding` invoice number.
    pub fn credit_note(mut self, preceding: impl Into<String>) -> Self {
        self.type_code = InvoiceTypeCode::CreditNote;
        self.preceding_invoice_ref = Some(preceding.into());
        self
    }

    pub fn currency(mut self, code: impl Into<String>) -> Self {
        self.currency_code = code.into();
        self
    }

    pub fn buyer_reference(mut self, reference: impl Into<String>) -> Self {
        self.buyer_reference = Some(reference.into());
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn contract_reference(mut self, reference: impl Into<String>) -> Self {
        self.contract_reference = Some(reference.into());
        self
    }

    pub fn preceding_invoice(mut self, reference: impl Into<String>) -> Self {
        self.preceding_invoice_ref = Some(reference.into());
        self
    }

    pub fn seller(mut self, party: Party) -> Self {
        self.seller = party;
        self
    }

    pub fn buyer(mut self, party: Party) -> Self {
        self.buyer = party;
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    /// Document-level allowance subtracted before tax.
    pub fn allowance_total(mut self, amount: Decimal) -> Self {
        self.adjustments.allowance_total = amount;
        self
    }

    /// Document-level charge added before tax.
    pub fn charge_total(mut self, amount: Decimal) -> Self {
        self.adjustments.charge_total = amount;
        self
    }

    pub fn prepaid(mut self, amount: Decimal) -> Self {
        self.adjustments.prepaid = amount;
        self
    }

    pub fn rounding(mut self, amount: Decimal) -> Self {
        self.adjustments.rounding = amount;
        self
    }

    /// Use these totals verbatim instead of calculating them.
    pub fn totals(mut self, totals: MonetaryTotals) -> Self {
        self.declared_totals = Some(totals);
        self
    }

    pub fn payment(mut self, payment: PaymentDetails) -> Self {
        self.payment = Some(payment);
        self
    }

    /// Build the invoice. Missing line amounts, the tax breakdown and the
    /// document totals are calculated unless totals were declared. Amounts
    /// outside the decimal range are left empty for the validator to report.
    pub fn build(self) -> Invoice {
        let mut lines = self.lines;
        for line in &mut lines {
            if line.line_amount.is_none() {
                line.line_amount = totals::compute_line_amount(line);
            }
        }

        let (tax_subtotals, monetary) = match self.declared_totals {
            Some(declared) => (Vec::new(), declared),
            None => {
                let computed = totals::compute_tax_subtotals(&lines, SG_STANDARD_GST_RATE)
                    .and_then(|subtotals| {
                        totals::compute_monetary_totals(&lines, &subtotals, self.adjustments)
                            .map(|monetary| (subtotals, monetary))
                    });
                computed.unwrap_or_else(|| {
                    tracing::warn!(invoice = %self.number, "invoice totals exceed the decimal range");
                    (Vec::new(), MonetaryTotals::default())
                })
            }
        };

        Invoice {
            invoice_number: self.number,
            type_code: self.type_code.code().to_string(),
            issue_date: Some(self.issue_date),
            due_date: self.due_date,
            tax_point_date: self.tax_point_date,
            currency_code: self.currency_code,
            buyer_reference: self.buyer_reference,
            notes: self.notes,
            contract_reference: self.contract_reference,
            preceding_invoice_ref: self.preceding_invoice_ref,
            seller: self.seller,
            buyer: self.buyer,
            items: lines,
            tax_subtotals,
            totals: monetary,
            payment: self.payment,
        }
    }

    /// Build and validate. Returns every error-severity finding, not just
    /// the first; warnings do not fail the build.
    pub fn build_checked(self) -> Result<Invoice, InvoiceError> {
        let invoice = self.build();
        let result = validation::validate(&invoice);
        if !result.can_send {
            let msg = result
                .errors
                .iter()
                .filter(|d| d.is_error())
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(InvoiceError::Validation(msg));
        }
        Ok(invoice)
    }
}

/// Builder for Party (seller/buyer).
pub struct PartyBuilder {
    name: String,
    trading_name: Option<String>,
    uen: Option<String>,
    peppol_id: Option<String>,
    gst_number: Option<String>,
    address: Address,
    contact: Option<Contact>,
}

impl PartyBuilder {
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            trading_name: None,
            uen: None,
            peppol_id: None,
            gst_number: None,
            address,
            contact: None,
        }
    }

    pub fn trading_name(mut self, name: impl Into<String>) -> Self {
        self.trading_name = Some(name.into());
        self
    }

    pub fn uen(mut self, uen: impl Into<String>) -> Self {
        self.uen = Some(uen.into());
        self
    }

    /// Participant identifier in `<scheme>:<id>` form.
    pub fn peppol_id(mut self, id: impl Into<String>) -> Self {
        self.peppol_id = Some(id.into());
        self
    }

    /// Mark the party GST-registered under `number`.
    pub fn gst_registered(mut self, number: impl Into<String>) -> Self {
        self.gst_number = Some(number.into());
        self
    }

    pub fn contact(
        mut self,
        name: Option<String>,
        phone: Option<String>,
        email: Option<String>,
    ) -> Self {
        self.contact = Some(Contact { name, phone, email });
        self
    }

    pub fn build(self) -> Party {
        Party {
            name: self.name,
            trading_name: self.trading_name,
            uen: self.uen,
            peppol_id: self.peppol_id,
            gst_registered: self.gst_number.is_some(),
            gst_number: self.gst_number,
            address: self.address,
            contact: self.contact.filter(|c| !c.is_empty()),
        }
    }
}

/// Builder for Address.
pub struct AddressBuilder {
    street: Option<String>,
    additional: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    country_code: String,
}

impl AddressBuilder {
    pub fn new(
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            street: None,
            additional: None,
            city: Some(city.into()),
            postal_code: Some(postal_code.into()),
            country_code: country_code.into(),
        }
    }

    /// Address with only the default country.
    pub fn singapore() -> Self {
        Self {
            street: None,
            additional: None,
            city: None,
            postal_code: None,
            country_code: DEFAULT_COUNTRY.to_string(),
        }
    }

    pub fn street(mut self, street: impl Into<String>) -> Self {
        self.street = Some(street.into());
        self
    }

    pub fn additional(mut self, additional: impl Into<String>) -> Self {
        self.additional = Some(additional.into());
        self
    }

    pub fn build(self) -> Address {
        Address {
            street: self.street,
            additional: self.additional,
            city: self.city,
            postal_code: self.postal_code,
            country_code: self.country_code,
        }
    }
}

/// Builder for LineItem. Defaults to standard-rated at the statutory rate.
pub struct LineItemBuilder {
    id: String,
    name: String,
    description: Option<String>,
    quantity: Decimal,
    unit_code: String,
    unit_price: Decimal,
    line_amount: Option<Decimal>,
    discount: Option<Decimal>,
    tax_category: TaxCategory,
    tax_rate: Decimal,
    tax_amount: Option<Decimal>,
    allowances: Vec<AllowanceCharge>,
    seller_item_id: Option<String>,
    buyer_item_id: Option<String>,
    standard_item_id: Option<String>,
}

impl LineItemBuilder {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        quantity: Decimal,
        unit_code: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            quantity,
            unit_code: unit_code.into(),
            unit_price,
            line_amount: None,
            discount: None,
            tax_category: TaxCategory::StandardRated,
            tax_rate: SG_STANDARD_GST_RATE,
            tax_amount: None,
            allowances: Vec::new(),
            seller_item_id: None,
            buyer_item_id: None,
            standard_item_id: None,
        }
    }

    /// Set the category with its canonical rate.
    pub fn category(mut self, category: TaxCategory) -> Self {
        self.tax_category = category;
        self.tax_rate = category.default_rate();
        self
    }

    pub fn tax(mut self, category: TaxCategory, rate: Decimal) -> Self {
        self.tax_category = category;
        self.tax_rate = rate;
        self
    }

    pub fn tax_amount(mut self, amount: Decimal) -> Self {
        self.tax_amount = Some(amount);
        self
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Declared net amount; computed from quantity and price when unset.
    pub fn line_amount(mut self, amount: Decimal) -> Self {
        self.line_amount = Some(amount);
        self
    }

    pub fn discount(mut self, amount: Decimal) -> Self {
        self.discount = Some(amount);
        self
    }

    pub fn add_allowance(mut self, amount: Decimal, reason: impl Into<String>) -> Self {
        self.allowances.push(AllowanceCharge {
            is_charge: false,
            amount,
            reason: Some(reason.into()),
        });
        self
    }

    pub fn add_charge(mut self, amount: Decimal, reason: impl Into<String>) -> Self {
        self.allowances.push(AllowanceCharge {
            is_charge: true,
            amount,
            reason: Some(reason.into()),
        });
        self
    }

    pub fn seller_item_id(mut self, id: impl Into<String>) -> Self {
        self.seller_item_id = Some(id.into());
        self
    }

    pub fn buyer_item_id(mut self, id: impl Into<String>) -> Self {
        self.buyer_item_id = Some(id.into());
        self
    }

    /// GTIN.
    pub fn standard_item_id(mut self, id: impl Into<String>) -> Self {
        self.standard_item_id = Some(id.into());
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            id: self.id,
            name: Some(self.name),
            description: self.description,
            quantity: Some(self.quantity),
            unit_code: self.unit_code,
            unit_price: Some(self.unit_price),
            line_amount: self.line_amount,
            discount: self.discount,
            tax_category: Some(self.tax_category),
            tax_rate: Some(self.tax_rate),
            tax_amount: self.tax_amount,
            allowances: self.allowances,
            seller_item_id: self.seller_item_id,
            buyer_item_id: self.buyer_item_id,
            standard_item_id: self.standard_item_id,
        }
    }
}

/// Builder for declared document totals.
#[derive(Default)]
pub struct MonetaryTotalsBuilder {
    totals: MonetaryTotals,
}

impl MonetaryTotalsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subtotal(mut self, amount: Decimal) -> Self {
        self.totals.subtotal = Some(amount);
        self
    }

    pub fn tax_exclusive(mut self, amount: Decimal) -> Self {
        self.totals.tax_exclusive_amount = Some(amount);
        self
    }

    pub fn tax(mut self, amount: Decimal) -> Self {
        self.totals.tax_amount = Some(amount);
        self
    }

    pub fn tax_inclusive(mut self, amount: Decimal) -> Self {
        self.totals.tax_inclusive_amount = Some(amount);
        self
    }

    pub fn allowance_total(mut self, amount: Decimal) -> Self {
        self.totals.allowance_total = Some(amount);
        self
    }

    pub fn charge_total(mut self, amount: Decimal) -> Self {
        self.totals.charge_total = Some(amount);
        self
    }

    pub fn prepaid(mut self, amount: Decimal) -> Self {
        self.totals.prepaid_amount = Some(amount);
        self
    }

    pub fn rounding(mut self, amount: Decimal) -> Self {
        self.totals.rounding_amount = Some(amount);
        self
    }

    pub fn payable(mut self, amount: Decimal) -> Self {
        self.totals.payable_amount = Some(amount);
        self
    }

    pub fn build(self) -> MonetaryTotals {
        self.totals
    }
}

/// Builder for payment instructions.
pub struct PaymentDetailsBuilder {
    details: PaymentDetails,
}

impl PaymentDetailsBuilder {
    /// `means_code` is a UNTDID 4461 code, e.g. "30" for credit transfer.
    pub fn new(means_code: impl Into<String>) -> Self {
        Self {
            details: PaymentDetails {
                means_code: Some(means_code.into()),
                ..Default::default()
            },
        }
    }

    /// Credit transfer to `account_id`.
    pub fn credit_transfer(account_id: impl Into<String>) -> Self {
        Self::new("30").account(account_id)
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.details.account_id = Some(account_id.into());
        self
    }

    pub fn account_name(mut self, name: impl Into<String>) -> Self {
        self.details.account_name = Some(name.into());
        self
    }

    /// Bank or branch identifier, e.g. a SWIFT code.
    pub fn routing_id(mut self, id: impl Into<String>) -> Self {
        self.details.routing_id = Some(id.into());
        self
    }

    pub fn due_date(mut self, date: NaiveDate) -> Self {
        self.details.due_date = Some(date);
        self
    }

    pub fn build(self) -> PaymentDetails {
        self.details
    }
}
