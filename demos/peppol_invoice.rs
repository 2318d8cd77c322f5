use chrono::NaiveDate;
use invoicenow::core::*;
use invoicenow::peppol;
use rust_decimal_macros::dec;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Local supplier invoicing a local buyer over InvoiceNow
    let invoice = InvoiceBuilder::new("INV-2024-0107", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
        .due_date(NaiveDate::from_ymd_opt(2024, 7, 15).unwrap())
        .buyer_reference("PO-2024-4711")
        .seller(
            PartyBuilder::new(
                "Acme Solutions Pte Ltd",
                AddressBuilder::new("Singapore", "048616", "SG")
                    .street("1 Raffles Place")
                    .build(),
            )
            .uen("T08GB0001A")
            .peppol_id("0195:T08GB0001A")
            .gst_registered("M90312345A")
            .build(),
        )
        .buyer(
            PartyBuilder::new(
                "Lion City Trading",
                AddressBuilder::new("Singapore", "609601", "SG").build(),
            )
            .uen("201912345M")
            .peppol_id("0195:201912345M")
            .build(),
        )
        .add_line(
            LineItemBuilder::new("1", "Consulting services", dec!(20), "HUR", dec!(150)).build(),
        )
        .add_line(
            LineItemBuilder::new("2", "Export freight", dec!(1), "EA", dec!(500))
                .category(TaxCategory::ZeroRated)
                .build(),
        )
        .payment(
            PaymentDetailsBuilder::credit_transfer("123-456789-001")
                .routing_id("DBSSSGSG")
                .build(),
        )
        .build();

    println!("=== Validation ===\n");
    let result = validate(&invoice);
    println!("  {}", result.summary);
    for d in &result.errors {
        println!("  {d}");
    }

    println!("\n=== Totals ===\n");
    for sub in &invoice.tax_subtotals {
        println!(
            "  {} @ {}%: taxable {} tax {}",
            sub.category.map_or("?", |c| c.symbol()),
            sub.rate.normalize(),
            sub.taxable_amount,
            sub.tax_amount
        );
    }
    if let Some(payable) = invoice.totals.payable_amount {
        println!("  payable: {payable} {}", invoice.currency_code);
    }

    match peppol::serialize_checked(&invoice) {
        Ok(xml) => {
            println!("\n=== UBL XML (first 20 lines) ===\n");
            for line in xml.lines().take(20) {
                println!("{line}");
            }
            println!("...");
        }
        Err(e) => println!("\nnot sent: {e}"),
    }
}
