#![no_main]

use libfuzzer_sys::fuzz_target;
use loam_automata::RuleSet;
use loam_automata::presets::falling_water_alphabet;

fuzz_target!(|data: &[u8]| {
    // rule compilation should never panic on any input
    if let Ok(text) = std::str::from_utf8(data) {
        let alphabet = falling_water_alphabet();
        let _ = RuleSet::compile(&alphabet, text);
    }
});
