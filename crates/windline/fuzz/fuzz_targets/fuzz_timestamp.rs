//! Fuzz target for timestamp and number coercion.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use windline::Value;
use windline::transform::coerce::{DEFAULT_TIMEZONE, to_iso_timestamp, to_numeric};

#[derive(Arbitrary, Debug)]
enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
}

fuzz_target!(|cell: Cell| {
    let value = match cell {
        Cell::Text(s) => Value::Text(s),
        Cell::Integer(i) => Value::Integer(i),
        Cell::Float(f) => Value::Float(f),
    };

    if let Ok(ts) = to_iso_timestamp(&value, DEFAULT_TIMEZONE) {
        assert!(ts.ends_with('Z'));
    }
    let _ = to_numeric(&value);
});
