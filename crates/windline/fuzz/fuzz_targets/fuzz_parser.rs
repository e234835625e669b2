//! Fuzz target for the delimited-text parser.
//!
//! Parsing must never panic, whatever the delimiter detection picks.

#![no_main]

use libfuzzer_sys::fuzz_target;
use windline::Parser;

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = Parser::new().parse_str(text);
    }
});
