#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use netlog_pipeline::{classifier, kv, tokenizer};

fuzz_target!(|data: &[u8]| {
    let mut reader = Cursor::new(data);
    let Ok(mode) = classifier::classify(Some("log"), &mut reader) else {
        return;
    };

    for record in tokenizer::records(mode, reader).flatten() {
        let _ = kv::parse_tokens(&record);
    }
});
