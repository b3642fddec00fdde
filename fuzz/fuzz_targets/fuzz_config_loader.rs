#![no_main]

use std::path::Path;

use cheatcode::config::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml_str) = std::str::from_utf8(data) {
        // Any outcome but a panic is fine
        let _ = ConfigLoader::with_defaults().load_str(yaml_str, Path::new("fuzz.yaml"));
    }
});
