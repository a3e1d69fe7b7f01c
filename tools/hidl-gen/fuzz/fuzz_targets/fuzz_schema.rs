// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Fuzz target for the hidl-gen pipeline
//!
//! Arbitrary bytes are parsed as a YAML schema. Anything that lowers into an
//! arena is analyzed and rendered through every backend. Rejections and
//! parse errors are fine; panics and hangs are not.

#![no_main]

use hidl_gen::{Generator, GeneratorConfig, Schema};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(schema) = Schema::from_yaml(text) else {
        return;
    };
    let Ok(model) = schema.build(None) else {
        return;
    };

    // Must not panic: only validated compounds reach layout and emission.
    if let Ok(generator) = Generator::new(GeneratorConfig::default()) {
        let _ = generator.render(&model, "fuzz.yaml");
    }
});
