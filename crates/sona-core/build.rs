// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Build script to generate the keyword table from `grammar/sona.ebnf`.
//!
//! The grammar file is the single source of truth for the keyword set. Every
//! `NAME = "word" ;` declaration becomes an arm mapping `word` to
//! `TokenKind::Name`, so a keyword added to the grammar without a matching
//! token variant fails to compile.

use std::env;
use std::fs;
use std::path::Path;

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let grammar_path = Path::new(&manifest_dir).join("grammar").join("sona.ebnf");

    println!("cargo:rerun-if-changed={}", grammar_path.display());

    let grammar = fs::read_to_string(&grammar_path).unwrap_or_else(|err| {
        panic!(
            "Cannot read grammar file '{}': {err}",
            grammar_path.display()
        )
    });

    let keywords = keyword_declarations(&grammar);
    assert!(
        !keywords.is_empty(),
        "No keyword declarations found in '{}'",
        grammar_path.display()
    );

    let arms = keywords
        .iter()
        .map(|(variant, word)| format!("        \"{word}\" => Some(TokenKind::{variant}),"))
        .collect::<Vec<_>>()
        .join("\n");

    let names = keywords
        .iter()
        .map(|(_, word)| format!("    \"{word}\""))
        .collect::<Vec<_>>()
        .join(",\n");

    let code = format!(
        "/// Auto-generated from `grammar/sona.ebnf`; do not edit manually.\n\
         pub const KEYWORDS: &[&str] = &[\n{names}\n];\n\n\
         /// Maps a lowercased word to its keyword token, if it is one.\n\
         fn keyword_from_lowercase(word: &str) -> Option<TokenKind> {{\n\
         \x20   match word {{\n{arms}\n        _ => None,\n    }}\n}}\n"
    );

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR not set");
    let dest_path = Path::new(&out_dir).join("keywords.rs");
    fs::write(dest_path, code).expect("Failed to write keywords.rs");
}

/// Extracts `(VariantName, word)` pairs from lines shaped `WORD = "word" ;`.
fn keyword_declarations(grammar: &str) -> Vec<(String, String)> {
    let mut keywords = Vec::new();
    for line in grammar.lines() {
        let Some((lhs, rhs)) = line.split_once('=') else {
            continue;
        };
        let name = lhs.trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_uppercase()) {
            continue;
        }
        let Some(quoted) = rhs.trim().strip_suffix(';') else {
            continue;
        };
        let Some(word) = quoted
            .trim()
            .strip_prefix('"')
            .and_then(|w| w.strip_suffix('"'))
        else {
            continue;
        };
        if word.is_empty() || !word.chars().all(|c| c.is_ascii_lowercase()) {
            continue;
        }
        let mut variant = String::with_capacity(name.len());
        variant.push_str(&name[..1]);
        variant.push_str(&name[1..].to_ascii_lowercase());
        keywords.push((variant, word.to_string()));
    }
    keywords
}
