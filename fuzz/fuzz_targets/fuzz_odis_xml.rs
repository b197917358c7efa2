#![no_main]
use libfuzzer_sys::fuzz_target;
use odis_compare::parsers::parse_odis_str;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz the ODIS XML loader.
///
/// Raw input exercises the document-level paths; wrapping the input in an
/// `ecu` envelope reaches the record and value-node conversion code.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = parse_odis_str(s);

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<protocol><vehicle><communications type="x"><ecus type="y">
  <ecu><ecu_id>0001</ecu_id>{s}</ecu>
</ecus></communications></vehicle></protocol>"#,
            );
            if let Ok(protocol) = parse_odis_str(&wrapped) {
                // Key derivation must not panic on arbitrary records.
                for ecu in protocol.ecus(&odis_compare::model::EcuSelector::default()).values() {
                    let _ = ecu.masters.keys().count();
                    let _ = ecu.subsystems.keys().count();
                }
            }
        }
    }
});
