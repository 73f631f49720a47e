// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for pipeline crash safety.
//!
//! Feeds arbitrary text through tokenize, parse, AST building and Python
//! generation. Any input must produce either output or an error with a
//! location; a panic is a bug.
//!
//! ```bash
//! cargo +nightly fuzz run transpile_arbitrary
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use sona_core::codegen::python::CodegenOptions;
use sona_core::transpiler::Transpiler;

fuzz_target!(|data: &[u8]| {
    // The pipeline takes text; byte-level validity is the caller's concern.
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let mut transpiler = Transpiler::new(CodegenOptions::new());
    match transpiler.transpile(source, "fuzz.sona") {
        Ok(output) => {
            if let Some(map) = output.source_map {
                assert_eq!(map.mappings.len(), output.stats.mapping_count);
            }
        }
        Err(error) => assert!(error.line_column().is_some(), "{error:?}"),
    }
});
