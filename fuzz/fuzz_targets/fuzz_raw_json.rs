#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Lenient deserialization must reject or accept, never panic.
    let _ = serde_json::from_slice::<invoicenow::RawInvoice>(data);
});
