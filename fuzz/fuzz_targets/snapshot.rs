#![no_main]

use libfuzzer_sys::fuzz_target;

use article_enricher::snapshot::{repair_and_parse, repair_publish_info};

fuzz_target!(|data: &[u8]| {
    // Neither the text repair nor the whole-file path may panic on any input
    let literal = String::from_utf8_lossy(data);
    let _ = repair_publish_info(&literal);
    let _ = repair_and_parse(data);
});
