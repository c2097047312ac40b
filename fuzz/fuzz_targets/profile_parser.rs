#![no_main]

use libfuzzer_sys::fuzz_target;
use perfguard::pairing::{degradation_between_files, MethodSelector};
use perfguard::profile::Profile;
use perfguard::strategy::StrategyRegistry;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(profile) = Profile::from_json_str(input) else {
        return;
    };

    // Any parsed profile compared with itself must classify without panicking
    let registry = StrategyRegistry::default();
    let _ = degradation_between_files(&registry, &profile, &profile, "fuzz", MethodSelector::All);
});
