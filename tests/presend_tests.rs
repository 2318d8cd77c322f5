#![cfg(feature = "presend")]

use std::time::Duration;

use invoicenow::core::participant::SG_INVOICE_DOCTYPE;
use invoicenow::core::*;
use invoicenow::presend::mock::{StaticDirectory, StaticGstRegistry};
use invoicenow::presend::*;

const SAMPLE: &str = include_str!("fixtures/sample_invoice.json");
const BUYER: &str = "0195:201912345M";
const SELLER_GST: &str = "M90312345A";

fn sample() -> Invoice {
    normalize(&RawInvoice::from_json(SAMPLE).unwrap())
}

fn healthy() -> PreSendValidator {
    PreSendValidator::new(
        StaticDirectory::new().with_participant(BUYER).shared(),
        StaticGstRegistry::new()
            .with_status(SELLER_GST, GstRegistrationStatus::Active)
            .shared(),
    )
}

#[tokio::test]
async fn healthy_services_add_nothing() {
    let inv = sample();
    let result = healthy().run(&inv, validate(&inv)).await;
    assert!(result.can_send, "{:#?}", result.errors);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn unknown_buyer() {
    let inv = sample();
    let checks = PreSendValidator::new(
        StaticDirectory::new().shared(),
        StaticGstRegistry::new()
            .with_status(SELLER_GST, GstRegistrationStatus::Active)
            .shared(),
    );
    let result = checks.run(&inv, validate(&inv)).await;
    assert!(result.has_code("SG-PRE-01"));
    assert!(!result.can_send);
    assert_eq!(result.error_count, 1);
    let d = result.with_code("SG-PRE-01").next().unwrap();
    assert!(d.message.contains("0195:201912345M (Singapore UEN)"), "{}", d.message);
}

#[tokio::test]
async fn buyer_cannot_receive_credit_notes() {
    let mut inv = sample();
    inv.type_code = "381".into();
    inv.preceding_invoice_ref = Some("INV-2024-0001".into());
    let directory = StaticDirectory::new().with_capabilities(
        BUYER,
        ParticipantCapabilities {
            registered: true,
            document_types: vec![SG_INVOICE_DOCTYPE.to_string()],
        },
    );
    let checks = PreSendValidator::new(
        directory.shared(),
        StaticGstRegistry::new()
            .with_status(SELLER_GST, GstRegistrationStatus::Active)
            .shared(),
    );
    let result = checks.run(&inv, validate(&inv)).await;
    assert!(result.has_code("SG-PRE-02"));
    assert!(!result.has_code("SG-PRE-01"));
}

#[tokio::test]
async fn cancelled_gst_registration() {
    let inv = sample();
    let checks = PreSendValidator::new(
        StaticDirectory::new().with_participant(BUYER).shared(),
        StaticGstRegistry::new()
            .with_status(SELLER_GST, GstRegistrationStatus::Cancelled)
            .shared(),
    );
    let result = checks.run(&inv, validate(&inv)).await;
    let d = result.with_code("SG-PRE-03").next().unwrap();
    assert_eq!(d.severity, Severity::Error);
    assert_eq!(d.field, "seller.gst_number");
}

#[tokio::test(start_paused = true)]
async fn slow_service_times_out_as_warning() {
    let inv = sample();
    let checks = PreSendValidator::new(
        StaticDirectory::new()
            .with_participant(BUYER)
            .with_latency(Duration::from_secs(30))
            .shared(),
        StaticGstRegistry::new()
            .with_status(SELLER_GST, GstRegistrationStatus::Active)
            .shared(),
    )
    .with_timeout(Duration::from_secs(2));
    let result = checks.run(&inv, validate(&inv)).await;
    let d = result.with_code("SG-PRE-04").next().unwrap();
    assert_eq!(d.severity, Severity::Warning);
    assert!(d.message.contains("timed out"));
    assert!(result.can_send);
}

#[tokio::test]
async fn failing_directory_is_a_warning() {
    let inv = sample();
    let checks = PreSendValidator::new(
        StaticDirectory::new().failing().shared(),
        StaticGstRegistry::new()
            .with_status(SELLER_GST, GstRegistrationStatus::Active)
            .shared(),
    );
    let result = checks.run(&inv, validate(&inv)).await;
    assert!(result.has_code("SG-PRE-04"));
    assert!(result.can_send);
}

#[tokio::test]
async fn existing_diagnostics_are_kept() {
    let mut inv = sample();
    inv.invoice_number.clear();
    let sync = validate(&inv);
    assert!(sync.has_code("BR-01"));

    let checks = PreSendValidator::new(
        StaticDirectory::new().shared(),
        StaticGstRegistry::new().shared(),
    );
    let result = checks.run(&inv, sync.clone()).await;
    assert_eq!(result.errors[..sync.errors.len()], sync.errors[..]);
    assert!(result.has_code("SG-PRE-01"));
    assert!(result.has_code("SG-PRE-03"));
    assert_eq!(result.error_count, sync.error_count + 2);
    assert_eq!(
        result.summary,
        format!("Invoice cannot be sent: {} error(s)", result.error_count)
    );
}

#[tokio::test]
async fn malformed_buyer_id_skips_directory() {
    let mut inv = sample();
    inv.buyer.peppol_id = Some("201912345M".into());
    let checks = PreSendValidator::new(
        StaticDirectory::new().shared(),
        StaticGstRegistry::new()
            .with_status(SELLER_GST, GstRegistrationStatus::Active)
            .shared(),
    );
    let result = checks.run(&inv, validate(&inv)).await;
    assert!(!result.has_code("SG-PRE-01"));
    assert!(result.has_code("SG-01"));
}
