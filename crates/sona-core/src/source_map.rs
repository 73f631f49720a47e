// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Correspondence between generated Python and Sona source positions.
//!
//! **DDD Context:** Compilation
//!
//! The [`SourceMapper`] keeps a cursor over the generated text. The code
//! generator calls [`SourceMapper::record`] right before it writes text that
//! originates at a source position, and [`SourceMapper::advance`] with every
//! piece of text it writes, so the cursor always points at the next
//! generated character.
//!
//! Generated lines are 1-based and generated columns 0-based; source lines
//! and columns are both 1-based.
//!
//! ```
//! use sona_core::source_map::SourceMapper;
//!
//! let mut mapper = SourceMapper::new();
//! let file = mapper.add_file("main.sona");
//! mapper.advance("# header\n");
//! mapper.record(1, 1, file, Some("x"));
//! mapper.advance("x = 42\n");
//!
//! let entry = mapper.nearest_source_for(2, 4).unwrap();
//! assert_eq!((entry.source.line, entry.source.column), (1, 1));
//! ```

use std::cmp::Reverse;
use std::collections::BTreeSet;

use ecow::EcoString;
use serde::Serialize;

/// Identifies a source file registered with [`SourceMapper::add_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FileId(u32);

impl FileId {
    /// The id as an index into [`SourceMap::files`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A position in generated text: 1-based line, 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GeneratedPosition {
    /// 1-based line.
    pub line: u32,
    /// 0-based column, in characters.
    pub column: u32,
}

/// A position in Sona source: 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourcePosition {
    /// 1-based line.
    pub line: u32,
    /// 1-based column, in characters.
    pub column: u32,
}

/// One generated ↔ source correspondence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Where the generated text starts.
    pub generated: GeneratedPosition,
    /// Where it came from.
    pub source: SourcePosition,
    /// The source file.
    pub file: FileId,
    /// The symbol defined or referenced there, if any.
    pub name: Option<EcoString>,
}

/// Summary counts for a mapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceMapStats {
    /// Number of entries.
    pub entries: usize,
    /// Distinct generated lines with at least one entry.
    pub generated_lines: usize,
    /// Distinct source lines with at least one entry.
    pub source_lines: usize,
}

/// One exported mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mapping {
    /// Generated position.
    pub generated: GeneratedPosition,
    /// Source position.
    pub source: SourcePosition,
    /// Index into [`SourceMap::files`].
    pub file: FileId,
    /// Symbol name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// The exported, serializable form of a mapper: every mapping in the order
/// it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SourceMap {
    /// Registered source files.
    pub files: Vec<String>,
    /// Mappings in generated order.
    pub mappings: Vec<Mapping>,
}

impl SourceMap {
    /// Renders the map as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; none is expected for this shape.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Records generated ↔ source correspondences while code is emitted.
#[derive(Debug, Clone)]
pub struct SourceMapper {
    files: Vec<EcoString>,
    entries: Vec<MappingEntry>,
    cursor: GeneratedPosition,
}

impl SourceMapper {
    /// Creates an empty mapper with the cursor at line 1, column 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            entries: Vec::new(),
            cursor: GeneratedPosition { line: 1, column: 0 },
        }
    }

    /// Registers a source file, returning its id. Registering the same name
    /// twice returns the same id.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "more than 4 billion source files are not supported"
    )]
    pub fn add_file(&mut self, name: &str) -> FileId {
        if let Some(index) = self.files.iter().position(|file| file == name) {
            return FileId(index as u32);
        }
        self.files.push(name.into());
        FileId((self.files.len() - 1) as u32)
    }

    /// Name of a registered file.
    #[must_use]
    pub fn file_name(&self, file: FileId) -> Option<&str> {
        self.files.get(file.index()).map(EcoString::as_str)
    }

    /// Associates the current generated cursor with a source position.
    pub fn record(&mut self, source_line: u32, source_column: u32, file: FileId, name: Option<&str>) {
        self.entries.push(MappingEntry {
            generated: self.cursor,
            source: SourcePosition {
                line: source_line,
                column: source_column,
            },
            file,
            name: name.map(EcoString::from),
        });
    }

    /// Moves the cursor past `text`.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "generated files over 4GB are not supported"
    )]
    pub fn advance(&mut self, text: &str) {
        match text.rfind('\n') {
            None => self.cursor.column += text.chars().count() as u32,
            Some(last_newline) => {
                self.cursor.line += text.matches('\n').count() as u32;
                self.cursor.column = text[last_newline + 1..].chars().count() as u32;
            }
        }
    }

    /// The current generated position.
    #[must_use]
    pub fn cursor(&self) -> GeneratedPosition {
        self.cursor
    }

    /// All entries in recording order.
    #[must_use]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// The entry with the closest generated position not after
    /// (`line`, `column`). Ties go to the smallest line distance, then the
    /// smallest column distance, then the earliest entry.
    #[must_use]
    pub fn nearest_source_for(&self, line: u32, column: u32) -> Option<&MappingEntry> {
        let query = GeneratedPosition { line, column };
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.generated <= query)
            .min_by_key(|(index, entry)| {
                let line_delta = line - entry.generated.line;
                // On an earlier line, the later column is the closer one.
                let column_delta = if entry.generated.line == line {
                    column - entry.generated.column
                } else {
                    u32::MAX - entry.generated.column
                };
                (line_delta, column_delta, *index)
            })
            .map(|(_, entry)| entry)
    }

    /// Reverse lookup: the generated position of the entry for source
    /// (`line`, `column`). An exact match wins; otherwise the entry on the
    /// same source line with the greatest column not after `column`.
    #[must_use]
    pub fn generated_for_source(&self, line: u32, column: u32) -> Option<GeneratedPosition> {
        self.entries
            .iter()
            .filter(|entry| entry.source.line == line && entry.source.column <= column)
            .min_by_key(|entry| (column - entry.source.column, Reverse(entry.generated)))
            .map(|entry| entry.generated)
    }

    /// Entry and line counts.
    #[must_use]
    pub fn stats(&self) -> SourceMapStats {
        let generated_lines: BTreeSet<u32> = self.entries.iter().map(|e| e.generated.line).collect();
        let source_lines: BTreeSet<u32> = self.entries.iter().map(|e| e.source.line).collect();
        SourceMapStats {
            entries: self.entries.len(),
            generated_lines: generated_lines.len(),
            source_lines: source_lines.len(),
        }
    }

    /// Clears entries and files and moves the cursor back to the start.
    pub fn reset(&mut self) {
        self.files.clear();
        self.entries.clear();
        self.cursor = GeneratedPosition { line: 1, column: 0 };
    }

    /// Exports the recorded mappings.
    #[must_use]
    pub fn to_source_map(&self) -> SourceMap {
        SourceMap {
            files: self.files.iter().map(ToString::to_string).collect(),
            mappings: self
                .entries
                .iter()
                .map(|entry| Mapping {
                    generated: entry.generated,
                    source: entry.source,
                    file: entry.file,
                    name: entry.name.as_ref().map(ToString::to_string),
                })
                .collect(),
        }
    }
}

impl Default for SourceMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper_with_lines() -> (SourceMapper, FileId) {
        let mut mapper = SourceMapper::new();
        let file = mapper.add_file("main.sona");
        mapper.record(1, 1, file, Some("x"));
        mapper.advance("x = 1\n");
        mapper.record(2, 1, file, None);
        mapper.advance("if x:\n    ");
        mapper.record(3, 5, file, None);
        mapper.advance("print(x)\n");
        (mapper, file)
    }

    #[test]
    fn advance_tracks_lines_and_columns() {
        let mut mapper = SourceMapper::new();
        mapper.advance("abc");
        assert_eq!(mapper.cursor(), GeneratedPosition { line: 1, column: 3 });
        mapper.advance("de\nfg\nhij");
        assert_eq!(mapper.cursor(), GeneratedPosition { line: 3, column: 3 });
        mapper.advance("\n");
        assert_eq!(mapper.cursor(), GeneratedPosition { line: 4, column: 0 });
    }

    #[test]
    fn advance_counts_characters() {
        let mut mapper = SourceMapper::new();
        mapper.advance("\"héllo\"");
        assert_eq!(mapper.cursor().column, 7);
    }

    #[test]
    fn record_uses_cursor() {
        let (mapper, file) = mapper_with_lines();
        let generated: Vec<_> = mapper.entries().iter().map(|e| e.generated).collect();
        assert_eq!(
            generated,
            [
                GeneratedPosition { line: 1, column: 0 },
                GeneratedPosition { line: 2, column: 0 },
                GeneratedPosition { line: 3, column: 4 },
            ]
        );
        assert_eq!(mapper.file_name(file), Some("main.sona"));
    }

    #[test]
    fn nearest_source_prefers_closest_preceding_entry() {
        let (mapper, _) = mapper_with_lines();
        assert_eq!(mapper.nearest_source_for(3, 10).unwrap().source.line, 3);
        assert_eq!(mapper.nearest_source_for(3, 2).unwrap().source.line, 2);
        assert_eq!(mapper.nearest_source_for(1, 0).unwrap().name.as_deref(), Some("x"));
        assert_eq!(mapper.nearest_source_for(9, 0).unwrap().source.line, 3);
    }

    #[test]
    fn nearest_source_before_any_entry_is_none() {
        let mut mapper = SourceMapper::new();
        let file = mapper.add_file("a.sona");
        mapper.advance("# header\n");
        mapper.record(1, 1, file, None);
        assert!(mapper.nearest_source_for(1, 5).is_none());
    }

    #[test]
    fn reverse_lookup() {
        let (mapper, _) = mapper_with_lines();
        assert_eq!(
            mapper.generated_for_source(3, 5),
            Some(GeneratedPosition { line: 3, column: 4 })
        );
        assert_eq!(
            mapper.generated_for_source(2, 8),
            Some(GeneratedPosition { line: 2, column: 0 })
        );
        assert_eq!(mapper.generated_for_source(7, 1), None);
    }

    #[test]
    fn stats_count_distinct_lines() {
        let (mut mapper, file) = mapper_with_lines();
        mapper.record(3, 9, file, None);
        assert_eq!(
            mapper.stats(),
            SourceMapStats {
                entries: 4,
                generated_lines: 4,
                source_lines: 3,
            }
        );
    }

    #[test]
    fn add_file_is_idempotent() {
        let mut mapper = SourceMapper::new();
        let a = mapper.add_file("a.sona");
        let b = mapper.add_file("b.sona");
        assert_ne!(a, b);
        assert_eq!(mapper.add_file("a.sona"), a);
    }

    #[test]
    fn reset_clears_everything() {
        let (mut mapper, _) = mapper_with_lines();
        mapper.reset();
        assert!(mapper.entries().is_empty());
        assert_eq!(mapper.cursor(), GeneratedPosition { line: 1, column: 0 });
        assert_eq!(mapper.file_name(FileId(0)), None);
    }

    #[test]
    fn export_serializes_in_order() {
        let (mapper, _) = mapper_with_lines();
        let map = mapper.to_source_map();
        assert_eq!(map.files, ["main.sona"]);
        assert_eq!(map.mappings.len(), 3);

        let json: serde_json::Value = serde_json::from_str(&map.to_json().unwrap()).unwrap();
        assert_eq!(json["mappings"][0]["name"], "x");
        assert_eq!(json["mappings"][2]["generated"]["column"], 4);
        assert!(json["mappings"][1].get("name").is_none());
    }
}
