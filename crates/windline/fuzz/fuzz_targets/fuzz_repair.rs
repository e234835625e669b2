//! Fuzz target for delimiter repair followed by normalization.

#![no_main]

use libfuzzer_sys::fuzz_target;
use windline::{Pipeline, Table, Value};

fuzz_target!(|input: (String, Vec<String>)| {
    let (header, rows) = input;
    if rows.len() > 1_000 {
        return;
    }

    let rows = rows.into_iter().map(|r| vec![Value::Text(r)]).collect();
    if let Ok(table) = Table::with_rows(vec![header], rows) {
        let _ = Pipeline::new().run(&table);
    }
});
