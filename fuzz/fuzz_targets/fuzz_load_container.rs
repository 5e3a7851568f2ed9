#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

fuzz_target!(|data: &[u8]| {
    // Whole pipeline: ZIP extraction -> validation -> parsing -> graph, then save
    let Ok(mut file) = libbcf::BcfFile::from_reader(Cursor::new(data), libbcf::BcfConfig::new())
    else {
        return;
    };
    let _ = file.to_writer(Cursor::new(Vec::new()));
});
