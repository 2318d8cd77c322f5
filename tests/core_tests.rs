use chrono::NaiveDate;
use invoicenow::core::totals::*;
use invoicenow::core::*;
use rust_decimal_macros::dec;

const SAMPLE: &str = include_str!("fixtures/sample_invoice.json");

fn sample() -> Invoice {
    normalize(&RawInvoice::from_json(SAMPLE).unwrap())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// --- Normalizer ---

#[test]
fn sample_normalizes_completely() {
    let inv = sample();
    assert_eq!(inv.invoice_number, "INV-2024-0042");
    assert_eq!(inv.type_code, "380");
    assert_eq!(inv.issue_date, Some(date(2024, 3, 1)));
    assert_eq!(inv.due_date, Some(date(2024, 3, 31)));
    assert_eq!(inv.notes, vec!["Thank you for your business".to_string()]);
    assert_eq!(inv.items.len(), 2);
    assert_eq!(inv.items[0].id, "1");
    assert_eq!(inv.items[0].unit_code, "HUR");
    assert_eq!(inv.tax_subtotals.len(), 1);
    assert_eq!(inv.tax_subtotals[0].category, Some(TaxCategory::StandardRated));
    assert_eq!(inv.buyer.address.country_code, "SG");
    assert_eq!(inv.buyer.address.city, None);
    let payment = inv.payment.as_ref().unwrap();
    assert_eq!(payment.routing_id.as_deref(), Some("DBSSSGSG"));
    assert!(payment.is_credit_transfer());
}

#[test]
fn normalize_never_fails_on_garbage() {
    let raw = RawInvoice::from_json(
        r#"{ "items": [ { "quantity": "lots", "unit_price": [], "discount": {} } ],
             "issue_date": "next tuesday", "seller": null }"#,
    )
    .unwrap();
    let inv = normalize(&raw);
    assert_eq!(inv.items[0].quantity, None);
    assert_eq!(inv.items[0].unit_price, None);
    assert_eq!(inv.items[0].discount, None);
    assert_eq!(inv.issue_date, None);
    assert!(inv.seller.name.is_empty());
    assert_eq!(inv.seller.address.country_code, "SG");
}

#[test]
fn normalize_is_pure() {
    let raw = RawInvoice::from_json(SAMPLE).unwrap();
    assert_eq!(normalize(&raw), normalize(&raw));
}

#[test]
fn normalizer_with_profile_sets_country() {
    let profile = Profile::from_json(r#"{ "default_country": "MY" }"#).unwrap();
    let inv = Normalizer::new(profile).normalize(&RawInvoice::default());
    assert_eq!(inv.seller.address.country_code, "MY");
}

// --- Calculator ---

#[test]
fn sample_totals_recompute_within_tolerance() {
    let inv = sample();
    let (subtotals, totals) = recompute(&inv, SG_STANDARD_GST_RATE).unwrap();

    assert!(within_tolerance(
        totals.subtotal.unwrap(),
        inv.totals.subtotal.unwrap()
    ));
    assert!(within_tolerance(
        totals.tax_amount.unwrap(),
        inv.totals.tax_amount.unwrap()
    ));
    assert_eq!(subtotals.len(), 1);
    assert_eq!(subtotals[0].taxable_amount, dec!(2000.00));
    assert_eq!(subtotals[0].tax_amount, dec!(180.00));
    assert_eq!(totals.payable_amount, Some(dec!(2180.00)));
}

#[test]
fn adjustments_flow_through_chain() {
    let items = vec![
        LineItemBuilder::new("1", "A", dec!(1), "EA", dec!(1000)).build(),
    ];
    let subtotals = compute_tax_subtotals(&items, SG_STANDARD_GST_RATE).unwrap();
    let totals = compute_monetary_totals(
        &items,
        &subtotals,
        Adjustments {
            allowance_total: dec!(100),
            charge_total: dec!(50),
            prepaid: dec!(200),
            rounding: dec!(-0.01),
        },
    )
    .unwrap();
    assert_eq!(totals.tax_exclusive_amount, Some(dec!(950.00)));
    // tax is computed on line amounts only
    assert_eq!(totals.tax_amount, Some(dec!(90.00)));
    assert_eq!(totals.tax_inclusive_amount, Some(dec!(1040.00)));
    assert_eq!(totals.payable_amount, Some(dec!(839.99)));
}

#[test]
fn declared_line_amount_wins_for_breakdown() {
    let mut line = LineItemBuilder::new("1", "A", dec!(2), "EA", dec!(10)).build();
    line.line_amount = Some(dec!(25));
    let subtotals = compute_tax_subtotals(&[line], SG_STANDARD_GST_RATE).unwrap();
    assert_eq!(subtotals[0].taxable_amount, dec!(25));
    assert_eq!(subtotals[0].tax_amount, dec!(2.25));
}

#[test]
fn rounding_is_half_away_from_zero() {
    assert_eq!(round_amount(dec!(2.345), 2), dec!(2.35));
    assert_eq!(round_amount(dec!(-2.345), 2), dec!(-2.35));
    assert_eq!(round_amount(dec!(2.344), 2), dec!(2.34));
}

// --- Builder ---

#[test]
fn builder_calculates_totals() {
    let inv = InvoiceBuilder::new("INV-1", date(2024, 3, 1))
        .seller(
            PartyBuilder::new("Acme Pte Ltd", AddressBuilder::singapore().build())
                .gst_registered("M90312345A")
                .build(),
        )
        .buyer(PartyBuilder::new("Buyer", AddressBuilder::singapore().build()).build())
        .add_line(LineItemBuilder::new("1", "Consulting", dec!(10), "HUR", dec!(150)).build())
        .add_line(
            LineItemBuilder::new("2", "Export freight", dec!(1), "EA", dec!(200))
                .category(TaxCategory::ZeroRated)
                .build(),
        )
        .prepaid(dec!(35))
        .build();

    assert_eq!(inv.type_code, "380");
    assert_eq!(inv.currency_code, "SGD");
    assert_eq!(inv.items[0].line_amount, Some(dec!(1500.00)));
    assert_eq!(inv.tax_subtotals.len(), 2);
    assert_eq!(inv.totals.subtotal, Some(dec!(1700.00)));
    assert_eq!(inv.totals.tax_amount, Some(dec!(135.00)));
    assert_eq!(inv.totals.payable_amount, Some(dec!(1800.00)));
    assert!(inv.seller.gst_registered);
}

#[test]
fn builder_keeps_declared_totals() {
    let declared = MonetaryTotalsBuilder::new()
        .subtotal(dec!(1))
        .payable(dec!(1))
        .build();
    let inv = InvoiceBuilder::new("INV-2", date(2024, 3, 1))
        .add_line(LineItemBuilder::new("1", "A", dec!(1), "EA", dec!(100)).build())
        .totals(declared.clone())
        .build();
    assert_eq!(inv.totals, declared);
    assert!(inv.tax_subtotals.is_empty());
}

#[test]
fn builder_leaves_out_of_range_amounts_to_the_validator() {
    let huge = rust_decimal::Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
    let inv = InvoiceBuilder::new("INV-3", date(2024, 3, 1))
        .add_line(LineItemBuilder::new("1", "A", huge, "EA", huge).build())
        .build();
    assert_eq!(inv.items[0].line_amount, None);
    assert!(inv.tax_subtotals.is_empty());
    assert_eq!(inv.totals, MonetaryTotals::default());
    assert!(!validate(&inv).can_send);
}

#[test]
fn build_checked_reports_all_errors() {
    let err = InvoiceBuilder::new("", date(2024, 3, 1))
        .credit_note("")
        .build_checked()
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("BR-01"), "{msg}");
    assert!(msg.contains("BR-16"), "{msg}");
    assert!(msg.contains("BR-55"), "{msg}");
    assert!(!msg.contains("SG-PAY-01"), "warnings must not appear: {msg}");
}

#[test]
fn payment_builder() {
    let p = PaymentDetailsBuilder::credit_transfer("123")
        .account_name("Acme")
        .routing_id("DBSSSGSG")
        .due_date(date(2024, 4, 1))
        .build();
    assert_eq!(p.means_code.as_deref(), Some("30"));
    assert!(p.is_credit_transfer());
}

// --- Profile ---

#[test]
fn profile_rejects_negative_rate() {
    let err = Profile::from_json(r#"{ "standard_gst_rate": "-1" }"#).unwrap_err();
    assert!(matches!(err, InvoiceError::Config(_)));
}
