#![no_main]

use campusdb_core::query::parse;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parser works on text; skip invalid UTF-8
    if let Ok(sql) = std::str::from_utf8(data) {
        if sql.len() > 10_000 {
            return;
        }

        // Should never panic
        if let Ok(statement) = parse(sql) {
            let _ = statement.placeholder_count();
            let _ = statement.to_string();
        }
    }
});
