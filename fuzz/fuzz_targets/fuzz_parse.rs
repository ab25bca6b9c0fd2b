#![no_main]

use libfuzzer_sys::fuzz_target;
use owm_core::ParserConfig;
use owm_parser::parse_with_config;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };

    let config = ParserConfig {
        max_input_bytes: 64 * 1024,
        max_line_chars: 512,
    };
    let report = parse_with_config(input, &config);
    assert_eq!(report.map.warnings.len(), report.diagnostics.len());

    let encoded = serde_json::to_string(&report.map).expect("map serializes");
    let _ = serde_json::from_str::<owm_core::WardleyMap>(&encoded);
});
