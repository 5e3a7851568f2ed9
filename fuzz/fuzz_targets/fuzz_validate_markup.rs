#![no_main]

use libbcf::config::BcfConfig;
use libbcf::parser::{parse_markup, parse_visualization_info};
use libbcf::schema::{SchemaKind, SchemaSet, validate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Validator and parsers must never panic on arbitrary bytes
    let schemas = SchemaSet::bcf_2_1();
    let config = BcfConfig::new();

    if let Some(schema) = schemas.get(SchemaKind::Markup) {
        let violations = validate(data, schema);
        let _ = parse_markup("fuzz/markup.bcf", data, &violations, &config);
    }
    if let Some(schema) = schemas.get(SchemaKind::VisualizationInfo) {
        let violations = validate(data, schema);
        let _ = parse_visualization_info("fuzz/viewpoint.bcfv", data, &violations, &config);
    }
});
