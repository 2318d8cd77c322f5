#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Raw record → normalize → validate → serialize must not panic at any step.
        if let Ok(raw) = invoicenow::RawInvoice::from_json(s) {
            let invoice = invoicenow::normalize(&raw);
            let result = invoicenow::validate(&invoice);
            assert_eq!(result.can_send, result.error_count == 0);
            // Only amounts beyond the decimal range may stop the serializer.
            match invoicenow::peppol::serialize(&invoice) {
                Ok(xml) => assert!(!xml.lines().any(|l| l.trim().is_empty())),
                Err(invoicenow::InvoiceError::AmountOverflow(_)) => {}
                Err(e) => panic!("serializer failed: {e}"),
            }
        }
    }
});
