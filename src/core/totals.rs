//! Line, tax-breakdown and document total calculation.
//!
//! Absent numeric inputs count as zero. Amounts are rounded half away from
//! zero to two fractional digits. Arithmetic is checked: a result outside
//! the `Decimal` range yields `None` instead of panicking.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::profile::AMOUNT_TOLERANCE;
use super::types::*;

/// Document-level adjustments applied on top of the line subtotal.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Adjustments {
    pub allowance_total: Decimal,
    pub charge_total: Decimal,
    pub prepaid: Decimal,
    pub rounding: Decimal,
}

impl Adjustments {
    /// Adjustments declared on an invoice's totals.
    pub fn from_totals(totals: &MonetaryTotals) -> Self {
        Self {
            allowance_total: totals.allowance_total.unwrap_or_default(),
            charge_total: totals.charge_total.unwrap_or_default(),
            prepaid: totals.prepaid_amount.unwrap_or_default(),
            rounding: totals.rounding_amount.unwrap_or_default(),
        }
    }
}

/// Round to `dp` fractional digits, half away from zero.
pub fn round_amount(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// True when `a` and `b` differ by at most 0.01. A difference too large to
/// represent is never within tolerance.
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    a.checked_sub(b)
        .is_some_and(|diff| diff.abs() <= AMOUNT_TOLERANCE)
}

/// Sum of `values`, `None` when it exceeds the decimal range.
pub fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
}

/// `quantity × unit_price − discount − allowances + charges`.
///
/// `None` when an intermediate result exceeds the decimal range.
pub fn compute_line_amount(line: &LineItem) -> Option<Decimal> {
    let base = line
        .quantity
        .unwrap_or_default()
        .checked_mul(line.unit_price.unwrap_or_default())?;
    let adjustments = checked_sum(
        line.allowances
            .iter()
            .map(|ac| if ac.is_charge { ac.amount } else { -ac.amount }),
    )?;
    let amount = base
        .checked_sub(line.discount.unwrap_or_default())?
        .checked_add(adjustments)?;
    Some(round_amount(amount, 2))
}

/// Declared line amount, or the computed one when the caller gave none.
pub fn effective_line_amount(line: &LineItem) -> Option<Decimal> {
    line.line_amount.or_else(|| compute_line_amount(line))
}

/// Sum of effective line amounts.
pub fn sum_line_amounts(items: &[LineItem]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(effective_line_amount(line)?))
}

/// Tax a line contributes: `line_amount × rate / 100`, unrounded.
pub fn line_tax(line_amount: Decimal, rate: Decimal) -> Option<Decimal> {
    line_amount.checked_mul(rate)?.checked_div(dec!(100))
}

/// Group lines by (category, rate) in first-appearance order. Lines without
/// a rate use their category's canonical rate under `standard_rate`.
pub fn compute_tax_subtotals(items: &[LineItem], standard_rate: Decimal) -> Option<Vec<TaxSubtotal>> {
    let mut subtotals: Vec<TaxSubtotal> = Vec::new();

    for line in items {
        let rate = line
            .tax_rate
            .or_else(|| line.tax_category.map(|c| c.canonical_rate(standard_rate)))
            .unwrap_or_default();
        let amount = effective_line_amount(line)?;
        let tax = line_tax(amount, rate)?;

        match subtotals
            .iter_mut()
            .find(|s| s.category == line.tax_category && s.rate == rate)
        {
            Some(group) => {
                group.taxable_amount = group.taxable_amount.checked_add(amount)?;
                group.tax_amount = group.tax_amount.checked_add(tax)?;
            }
            None => subtotals.push(TaxSubtotal {
                category: line.tax_category,
                rate,
                taxable_amount: amount,
                tax_amount: tax,
            }),
        }
    }

    for s in &mut subtotals {
        s.taxable_amount = round_amount(s.taxable_amount, 2);
        s.tax_amount = round_amount(s.tax_amount, 2);
    }
    Some(subtotals)
}

/// Chain subtotal → tax-exclusive → tax-inclusive → payable.
pub fn compute_monetary_totals(
    items: &[LineItem],
    subtotals: &[TaxSubtotal],
    adjustments: Adjustments,
) -> Option<MonetaryTotals> {
    let subtotal = sum_line_amounts(items)?;
    let tax_exclusive = subtotal
        .checked_sub(adjustments.allowance_total)?
        .checked_add(adjustments.charge_total)?;
    let tax = checked_sum(subtotals.iter().map(|s| s.tax_amount))?;
    let tax_inclusive = tax_exclusive.checked_add(tax)?;
    let payable = tax_inclusive
        .checked_sub(adjustments.prepaid)?
        .checked_add(adjustments.rounding)?;

    let optional = |v: Decimal| (!v.is_zero()).then_some(v);

    Some(MonetaryTotals {
        subtotal: Some(round_amount(subtotal, 2)),
        tax_exclusive_amount: Some(round_amount(tax_exclusive, 2)),
        tax_amount: Some(round_amount(tax, 2)),
        tax_inclusive_amount: Some(round_amount(tax_inclusive, 2)),
        allowance_total: optional(adjustments.allowance_total),
        charge_total: optional(adjustments.charge_total),
        prepaid_amount: optional(adjustments.prepaid),
        rounding_amount: optional(adjustments.rounding),
        payable_amount: Some(round_amount(payable, 2)),
    })
}

/// Subtotals and totals derived from an invoice's lines and declared
/// adjustments, leaving the invoice untouched. `None` when an amount
/// exceeds the decimal range.
pub fn recompute(invoice: &Invoice, standard_rate: Decimal) -> Option<(Vec<TaxSubtotal>, MonetaryTotals)> {
    let subtotals = compute_tax_subtotals(&invoice.items, standard_rate)?;
    let totals = compute_monetary_totals(
        &invoice.items,
        &subtotals,
        Adjustments::from_totals(&invoice.totals),
    )?;
    Some((subtotals, totals))
}
