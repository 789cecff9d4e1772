#![no_main]

use libfuzzer_sys::fuzz_target;
use vulnscout_engine::parse_manifest;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        let _ = parse_manifest(content, "fuzz/Gemfile");
        let _ = parse_manifest(content, "fuzz/Gemfile.lock");
    }
});
