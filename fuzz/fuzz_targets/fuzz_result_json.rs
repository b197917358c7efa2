#![no_main]
use libfuzzer_sys::fuzz_target;

/// Fuzz the reload path for previously written JSON results.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(results) = serde_json::from_str::<odis_compare::ComparisonResults>(s) {
            let _ = odis_compare::diff::statistics(&results);
            let _ = results.split_by_ecu();
        }
    }
});
