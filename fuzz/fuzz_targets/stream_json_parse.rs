//! Fuzz target for annotation stream parsing.
//!
//! This fuzzer feeds arbitrary strings to the detection and segmentation
//! stream parsers, checking for panics, crashes, or hangs.

#![no_main]

use imgvis::ir::io_json::{from_json_str, DetectionRecord, SegmentationRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    let _ = from_json_str::<DetectionRecord>(json);
    let _ = from_json_str::<SegmentationRecord>(json);
});
