use rust_decimal::Decimal;

use super::error::{Diagnostic, ValidationResult};
use super::participant::{ParticipantId, is_plausible_uen};
use super::profile::Profile;
use super::totals::{self, within_tolerance};
use super::types::*;

type RuleGroup = fn(&Invoice, &Profile, &mut Vec<Diagnostic>);

/// Rule groups in reporting order. Every group runs; none short-circuits.
const RULE_GROUPS: [(&str, RuleGroup); 7] = [
    ("mandatory", check_mandatory),
    ("lines", check_lines),
    ("calculations", check_calculations),
    ("participants", check_participants),
    ("gst", check_gst),
    ("credit_note", check_credit_note),
    ("payment", check_payment),
];

/// Runs the business rules of a national profile.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    profile: Profile,
}

impl Validator {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Validate an invoice. Returns every finding, not just the first.
    pub fn validate(&self, invoice: &Invoice) -> ValidationResult {
        let mut diagnostics = Vec::new();
        for (group, rules) in RULE_GROUPS {
            let before = diagnostics.len();
            rules(invoice, &self.profile, &mut diagnostics);
            tracing::debug!(group, found = diagnostics.len() - before, "rule group done");
        }
        let result = ValidationResult::from_diagnostics(diagnostics);
        tracing::debug!(
            number = %invoice.invoice_number,
            errors = result.error_count,
            warnings = result.warning_count,
            "validated invoice"
        );
        result
    }
}

/// Validate under the default Singapore profile.
pub fn validate(invoice: &Invoice) -> ValidationResult {
    Validator::default().validate(invoice)
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn check_mandatory(invoice: &Invoice, _: &Profile, out: &mut Vec<Diagnostic>) {
    // BR-01: Invoice number
    if blank(&invoice.invoice_number) {
        out.push(Diagnostic::error(
            "BR-01",
            "invoice_number",
            "invoice number must not be empty",
        ));
    }

    // BR-02: Issue date
    if invoice.issue_date.is_none() {
        out.push(Diagnostic::error(
            "BR-02",
            "issue_date",
            "issue date is missing or not a valid date",
        ));
    }

    // BR-04: Type code from the closed UNTDID 1001 subset
    if blank(&invoice.type_code) {
        out.push(Diagnostic::error(
            "BR-04",
            "invoice_type_code",
            "invoice type code must not be empty",
        ));
    } else if invoice.document_type().is_none() {
        out.push(Diagnostic::error(
            "BR-04",
            "invoice_type_code",
            format!(
                "invoice type code '{}' is not one of 380, 381, 383, 384, 386, 389",
                invoice.type_code
            ),
        ));
    }

    // BR-05: Currency
    let currency = invoice.currency_code.trim();
    if currency.is_empty() {
        out.push(Diagnostic::error(
            "BR-05",
            "currency_code",
            "currency code must not be empty",
        ));
    } else if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        out.push(Diagnostic::error(
            "BR-05",
            "currency_code",
            format!("currency code '{currency}' must be 3 letters (ISO 4217)"),
        ));
    }

    // BR-06 / BR-07: Party names
    if blank(&invoice.seller.name) {
        out.push(Diagnostic::error(
            "BR-06",
            "seller.name",
            "seller name must not be empty",
        ));
    }
    if blank(&invoice.buyer.name) {
        out.push(Diagnostic::error(
            "BR-07",
            "buyer.name",
            "buyer name must not be empty",
        ));
    }

    // BR-16: At least one line
    if invoice.items.is_empty() {
        out.push(Diagnostic::error(
            "BR-16",
            "items",
            "invoice must have at least one line item",
        ));
    }
}

fn check_lines(invoice: &Invoice, _: &Profile, out: &mut Vec<Diagnostic>) {
    for (i, line) in invoice.items.iter().enumerate() {
        let field = |name: &str| format!("items[{i}].{name}");

        if blank(&line.id) {
            out.push(Diagnostic::error(
                "BR-21",
                field("id"),
                "line identifier must not be empty",
            ));
        }
        if line.quantity.is_none() {
            out.push(Diagnostic::error(
                "BR-22",
                field("quantity"),
                "line quantity is missing",
            ));
        }
        if blank(&line.unit_code) {
            out.push(Diagnostic::warning(
                "BR-23",
                field("unit_code"),
                "line unit of measure is missing",
            ));
        }
        if line.line_amount.is_none() {
            out.push(Diagnostic::error(
                "BR-24",
                field("line_amount"),
                "line net amount is missing",
            ));
        }
        if line.display_name().is_none() {
            out.push(Diagnostic::error(
                "BR-25",
                field("name"),
                "line item must have a name or description",
            ));
        }
        if line.unit_price.is_none() {
            out.push(Diagnostic::error(
                "BR-26",
                field("unit_price"),
                "line unit price is missing",
            ));
        }

        // BR-CO-04: Declared amount = quantity × price − discount ± allowances/charges
        if let (Some(declared), Some(_), Some(_)) = (line.line_amount, line.quantity, line.unit_price)
        {
            match totals::compute_line_amount(line) {
                Some(expected) if !within_tolerance(declared, expected) => {
                    out.push(Diagnostic::error(
                        "BR-CO-04",
                        field("line_amount"),
                        format!("line amount {declared} does not match quantity × unit price ({expected})"),
                    ));
                }
                Some(_) => {}
                None => out.push(out_of_range(
                    "BR-CO-04",
                    field("line_amount"),
                    "quantity × unit price",
                )),
            }
        }
    }
}

/// Error for a derived amount that does not fit the decimal range.
fn out_of_range(code: &str, field: impl Into<String>, what: &str) -> Diagnostic {
    Diagnostic::error(
        code,
        field,
        format!("{what} exceeds the supported numeric range"),
    )
}

/// Compare a declared total against its expected value; `None` means the
/// expected value could not be represented.
fn check_total(
    out: &mut Vec<Diagnostic>,
    code: &str,
    (field, label): (&str, &str),
    declared: Decimal,
    (expected, what): (Option<Decimal>, &str),
) {
    match expected {
        Some(expected) if !within_tolerance(declared, expected) => out.push(Diagnostic::error(
            code,
            field,
            format!("{label} {declared} does not match {what} ({expected})"),
        )),
        Some(_) => {}
        None => out.push(out_of_range(code, field, what)),
    }
}

fn check_calculations(invoice: &Invoice, profile: &Profile, out: &mut Vec<Diagnostic>) {
    let t = &invoice.totals;
    let line_sum = totals::sum_line_amounts(&invoice.items);
    let adjustments = totals::Adjustments::from_totals(t);

    // BR-CO-10: Subtotal = Σ line amounts
    if line_sum.is_none() {
        out.push(out_of_range("BR-CO-10", "items", "sum of line amounts"));
    } else if let Some(subtotal) = t.subtotal {
        check_total(
            out,
            "BR-CO-10",
            ("totals.subtotal", "subtotal"),
            subtotal,
            (line_sum, "sum of line amounts"),
        );
    }

    // BR-CO-13: Tax-exclusive = subtotal − allowances + charges
    if let Some(tax_exclusive) = t.tax_exclusive_amount {
        let expected = t
            .subtotal
            .or(line_sum)
            .and_then(|base| base.checked_sub(adjustments.allowance_total))
            .and_then(|v| v.checked_add(adjustments.charge_total));
        check_total(
            out,
            "BR-CO-13",
            ("totals.tax_exclusive_amount", "tax-exclusive amount"),
            tax_exclusive,
            (expected, "subtotal − allowances + charges"),
        );
    }

    // BR-CO-14: Tax total = Σ breakdown tax amounts
    let breakdown_tax = totals::checked_sum(invoice.tax_subtotals.iter().map(|s| s.tax_amount));
    if let Some(tax) = t.tax_amount {
        if !invoice.tax_subtotals.is_empty() {
            check_total(
                out,
                "BR-CO-14",
                ("totals.tax_amount", "tax amount"),
                tax,
                (breakdown_tax, "sum of tax subtotals"),
            );
        }
    }

    let tax = t.tax_amount.or_else(|| {
        if invoice.tax_subtotals.is_empty() {
            totals::compute_tax_subtotals(&invoice.items, profile.standard_gst_rate)
                .and_then(|subs| totals::checked_sum(subs.iter().map(|s| s.tax_amount)))
        } else {
            breakdown_tax
        }
    });

    // BR-CO-15: Tax-inclusive = tax-exclusive + tax
    let tax_exclusive = t.tax_exclusive_amount.or(t.subtotal).or(line_sum);
    let expected_inclusive = tax_exclusive
        .zip(tax)
        .and_then(|(excl, tax)| excl.checked_add(tax));
    if let Some(tax_inclusive) = t.tax_inclusive_amount {
        check_total(
            out,
            "BR-CO-15",
            ("totals.tax_inclusive_amount", "tax-inclusive amount"),
            tax_inclusive,
            (expected_inclusive, "tax-exclusive amount + tax"),
        );
    }

    // BR-CO-16: Payable = tax-inclusive − prepaid + rounding
    if let Some(payable) = t.payable_amount {
        let expected = t
            .tax_inclusive_amount
            .or(expected_inclusive)
            .and_then(|v| v.checked_sub(adjustments.prepaid))
            .and_then(|v| v.checked_add(adjustments.rounding));
        check_total(
            out,
            "BR-CO-16",
            ("totals.payable_amount", "payable amount"),
            payable,
            (expected, "tax-inclusive amount − prepaid + rounding"),
        );
    }
}

fn check_participants(invoice: &Invoice, _: &Profile, out: &mut Vec<Diagnostic>) {
    for (party, role, missing_code) in [
        (&invoice.seller, "seller", "SG-02"),
        (&invoice.buyer, "buyer", "SG-03"),
    ] {
        let field = format!("{role}.peppol_id");
        match party.peppol_id.as_deref().filter(|id| !blank(id)) {
            None => out.push(Diagnostic::error(
                missing_code,
                field,
                format!("{role} Peppol participant ID is required"),
            )),
            Some(id) if ParticipantId::parse(id).is_none() => out.push(Diagnostic::warning(
                "SG-01",
                field,
                format!("{role} Peppol ID '{id}' should have the form <4-digit scheme>:<identifier>"),
            )),
            Some(_) => {}
        }
    }

    // SG-04: Seller UEN shape
    if let Some(uen) = invoice.seller.uen.as_deref().filter(|u| !blank(u)) {
        if !is_plausible_uen(uen) {
            out.push(Diagnostic::warning(
                "SG-04",
                "seller.uen",
                format!("seller UEN '{uen}' does not look like a Singapore UEN"),
            ));
        }
    }
}

fn check_gst(invoice: &Invoice, profile: &Profile, out: &mut Vec<Diagnostic>) {
    let mut taxable = false;

    for (i, line) in invoice.items.iter().enumerate() {
        let Some(category) = line.tax_category else {
            // SG-GST-05: Unknown category
            out.push(Diagnostic::error(
                "SG-GST-05",
                format!("items[{i}].tax_category"),
                "tax category must be one of SR, ZR, ES, OS, NG",
            ));
            continue;
        };

        let rate = line
            .tax_rate
            .unwrap_or_else(|| category.canonical_rate(profile.standard_gst_rate));
        // Out-of-range amounts are reported by the line and calculation rules.
        let computed_tax = totals::effective_line_amount(line)
            .and_then(|amount| totals::line_tax(amount, rate));

        if category == TaxCategory::StandardRated
            && line
                .tax_amount
                .or(computed_tax)
                .is_some_and(|tax| tax > Decimal::ZERO)
        {
            taxable = true;
        }

        // SG-GST-03: Standard-rated lines at the statutory rate
        if category == TaxCategory::StandardRated && rate != profile.standard_gst_rate {
            out.push(Diagnostic::warning(
                "SG-GST-03",
                format!("items[{i}].tax_rate"),
                format!(
                    "standard-rated line at {rate}% differs from the statutory rate of {}%",
                    profile.standard_gst_rate
                ),
            ));
        }

        // SG-GST-04: Declared line tax = amount × rate / 100
        if let (Some(declared), Some(computed_tax)) = (line.tax_amount, computed_tax) {
            if !within_tolerance(declared, computed_tax) {
                out.push(Diagnostic::warning(
                    "SG-GST-04",
                    format!("items[{i}].tax_amount"),
                    format!(
                        "line tax {declared} does not match line amount × rate ({})",
                        totals::round_amount(computed_tax, 2)
                    ),
                ));
            }
        }
    }

    if taxable {
        // SG-GST-01 / SG-GST-02: Charging GST requires registration
        if !invoice.seller.gst_registered {
            out.push(Diagnostic::error(
                "SG-GST-01",
                "seller.gst_registered",
                "seller charges GST on standard-rated lines but is not GST-registered",
            ));
        }
        if invoice.seller.gst_number.as_deref().is_none_or(blank) {
            out.push(Diagnostic::error(
                "SG-GST-02",
                "seller.gst_number",
                "GST registration number is required when charging GST",
            ));
        }
    }
}

fn check_credit_note(invoice: &Invoice, _: &Profile, out: &mut Vec<Diagnostic>) {
    // BR-55: Credit notes reference the invoice they correct
    if invoice.is_credit_note()
        && invoice.preceding_invoice_ref.as_deref().is_none_or(blank)
    {
        out.push(Diagnostic::error(
            "BR-55",
            "preceding_invoice_ref",
            "credit note must reference the preceding invoice",
        ));
    }
}

fn check_payment(invoice: &Invoice, _: &Profile, out: &mut Vec<Diagnostic>) {
    let means = invoice
        .payment
        .as_ref()
        .and_then(|p| p.means_code.as_deref())
        .filter(|c| !blank(c));
    if means.is_none() {
        out.push(Diagnostic::warning(
            "SG-PAY-01",
            "payment.means_code",
            "payment means code is recommended",
        ));
    }

    // BR-61: Credit transfer needs a payee account
    if let Some(payment) = &invoice.payment {
        if payment.is_credit_transfer() && payment.account_id.as_deref().is_none_or(blank) {
            out.push(Diagnostic::warning(
                "BR-61",
                "payment.account_id",
                "credit transfer should include the payee bank account",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> Invoice {
        InvoiceBuilder::new("INV-001", NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
            .seller(
                PartyBuilder::new("Acme Pte Ltd", AddressBuilder::singapore().build())
                    .uen("T08GB0001A")
                    .peppol_id("0195:T08GB0001A")
                    .gst_registered("M90312345A")
                    .build(),
            )
            .buyer(
                PartyBuilder::new("Buyer Pte Ltd", AddressBuilder::singapore().build())
                    .peppol_id("0195:201912345M")
                    .build(),
            )
            .add_line(LineItemBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(150)).build())
            .add_line(LineItemBuilder::new("2", "Support", dec!(5), "HUR", dec!(100)).build())
            .payment(PaymentDetailsBuilder::credit_transfer("123-456-789").build())
            .build()
    }

    fn codes(result: &ValidationResult) -> Vec<&str> {
        result.errors.iter().map(|d| d.code.as_str()).collect()
    }

    #[test]
    fn built_invoice_is_clean() {
        let result = validate(&sample());
        assert!(result.is_valid, "{:?}", result.errors);
        assert_eq!(result.error_count, 0);
        assert_eq!(result.warning_count, 0);
    }

    #[test]
    fn groups_do_not_short_circuit() {
        let mut inv = sample();
        inv.invoice_number.clear();
        inv.items[0].line_amount = Some(dec!(1));
        inv.buyer.peppol_id = None;
        let result = validate(&inv);
        let c = codes(&result);
        assert!(c.contains(&"BR-01"));
        assert!(c.contains(&"BR-CO-04"));
        assert!(c.contains(&"SG-03"));
    }

    #[test]
    fn unknown_type_code() {
        let mut inv = sample();
        inv.type_code = "999".into();
        assert!(validate(&inv).has_code("BR-04"));
    }

    #[test]
    fn lowercase_currency_rejected() {
        let mut inv = sample();
        inv.currency_code = "sgd".into();
        assert!(validate(&inv).has_code("BR-05"));
    }

    #[test]
    fn statutory_rate_follows_profile() {
        let profile = Profile {
            standard_gst_rate: dec!(8),
            ..Profile::default()
        };
        let result = Validator::new(profile).validate(&sample());
        assert_eq!(result.with_code("SG-GST-03").count(), 2);
        assert!(result.can_send);
    }

    #[test]
    fn zero_rated_only_needs_no_registration() {
        let mut inv = sample();
        inv.seller.gst_registered = false;
        inv.seller.gst_number = None;
        for line in &mut inv.items {
            line.tax_category = Some(TaxCategory::ZeroRated);
            line.tax_rate = Some(dec!(0));
        }
        let result = validate(&inv);
        assert!(!result.has_code("SG-GST-01"));
        assert!(!result.has_code("SG-GST-02"));
    }

    #[test]
    fn missing_payment_block_is_a_warning() {
        let mut inv = sample();
        inv.payment = None;
        let result = validate(&inv);
        assert!(result.has_code("SG-PAY-01"));
        assert!(result.can_send);
    }
}
