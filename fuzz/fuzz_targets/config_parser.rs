#![no_main]

use libfuzzer_sys::fuzz_target;
use perfguard::config::DegradationConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        // Malformed configuration must surface as an error, never a panic
        let _ = DegradationConfig::from_toml_str(input);
    }
});
