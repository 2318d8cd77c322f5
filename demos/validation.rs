use invoicenow::core::*;

const RECORD: &str = r#"{
    "invoice_number": "INV-2024-0099",
    "invoice_type_code": "381",
    "issue_date": "2024-06-15",
    "currency_code": "sgd",
    "seller": {
        "name": "Acme Solutions Pte Ltd",
        "uen": "ACME-123",
        "peppol_id": "T08GB0001A",
        "gst_registered": "yes"
    },
    "buyer": { "name": "Lion City Trading", "peppol_id": "0195:201912345M" },
    "items": [
        { "name": "Refund: consulting", "quantity": "2", "unit": "hours",
          "unit_price": "150", "line_amount": "310.00", "tax_rate": 8 }
    ],
    "payment": { "means_code": "30" }
}"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("invoicenow=debug"))
        .init();

    let raw = match RawInvoice::from_json(RECORD) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("unreadable record: {e}");
            return;
        }
    };
    let invoice = normalize(&raw);
    println!(
        "normalized: {} ({}) in {}, {} line(s)",
        invoice.invoice_number,
        invoice.type_code,
        invoice.currency_code,
        invoice.items.len()
    );

    let result = validate(&invoice);
    println!("\n{}\n", result.summary);
    for severity in [Severity::Error, Severity::Warning, Severity::Info] {
        for d in result.errors.iter().filter(|d| d.severity == severity) {
            println!("  {d}");
        }
    }

    println!("\nas JSON:");
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("{e}"),
    }
}
