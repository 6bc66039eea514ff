#![no_main]

use campusdb_storage::file::{decode_slot, encode_slot};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1_000_000 {
        return;
    }

    // Arbitrary bytes must decode or fail cleanly
    if let Ok(payload) = decode_slot("fuzz", data) {
        assert_eq!(encode_slot(&payload).ok().as_deref(), Some(data));
    }
});
