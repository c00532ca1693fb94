#![no_main]

use libfuzzer_sys::fuzz_target;
use netlog_pipeline::tokenizer::{SyslogTokenizer, Tokenizer};

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);
    let _ = SyslogTokenizer::new().tokenize(&line);
});
