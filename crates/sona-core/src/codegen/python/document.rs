// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Wadler-Lindig document tree for Python code generation.
//!
//! **DDD Context:** Compilation - Code Generation
//!
//! Expression emitters build `Document` values instead of writing strings
//! directly. A statement line is rendered in one pass: every [`group`] is
//! laid out flat when it fits in the remaining width, otherwise its breaks
//! become newlines at the nested indentation.
//!
//! # Example
//!
//! ```
//! use sona_core::codegen::python::document::{break_, group, join, nest};
//! use sona_core::docvec;
//!
//! let args = join(["first", "second"].map(|a| a.into()), &docvec![",", break_("", " ")]);
//! let doc = docvec![
//!     "call",
//!     group(docvec!["(", nest(4, docvec![break_("", ""), args]), break_(",", ""), ")"]),
//! ];
//! assert_eq!(doc.render(80, 0), "call(first, second)");
//! assert_eq!(doc.render(10, 0), "call(\n    first,\n    second,\n)");
//! ```

/// Default indentation width of generated Python.
pub const INDENT: isize = 4;

/// Default maximum line width used by [`Document::to_pretty_string`].
pub const DEFAULT_WIDTH: usize = 88;

/// A pretty-printable document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document<'a> {
    /// A borrowed string.
    Str(&'a str),
    /// An owned string.
    String(String),
    /// A mandatory newline followed by the current indentation.
    Line,
    /// Increase indentation for nested content.
    Nest(isize, Box<Document<'a>>),
    /// A sequence of documents.
    Vec(Vec<Document<'a>>),
    /// Content laid out flat if it fits, broken otherwise.
    Group(Box<Document<'a>>),
    /// `unbroken` when the enclosing group is flat; `broken` followed by a
    /// newline when it is broken.
    Break {
        /// Text before the newline.
        broken: &'a str,
        /// Text when flat.
        unbroken: &'a str,
    },
    /// Empty document.
    Nil,
}

/// Coerce a value into a `Document`.
pub trait Documentable<'a> {
    /// Performs the conversion.
    fn to_doc(self) -> Document<'a>;
}

impl<'a> Documentable<'a> for &'a str {
    fn to_doc(self) -> Document<'a> {
        Document::Str(self)
    }
}

impl<'a> Documentable<'a> for String {
    fn to_doc(self) -> Document<'a> {
        Document::String(self)
    }
}

impl<'a> Documentable<'a> for ecow::EcoString {
    fn to_doc(self) -> Document<'a> {
        Document::String(self.into())
    }
}

impl<'a> Documentable<'a> for Document<'a> {
    fn to_doc(self) -> Document<'a> {
        self
    }
}

impl<'a> Documentable<'a> for Vec<Document<'a>> {
    fn to_doc(self) -> Document<'a> {
        Document::Vec(self)
    }
}

impl<'a> From<&'a str> for Document<'a> {
    fn from(value: &'a str) -> Self {
        Document::Str(value)
    }
}

/// Concatenates documents into a `Document::Vec`.
///
/// Each element is converted with [`Documentable`]. A leading `Vec` is
/// extended in place rather than nested.
///
/// ```
/// use sona_core::docvec;
///
/// let doc = docvec!["x", " = ", "1"];
/// assert_eq!(doc.to_pretty_string(), "x = 1");
/// ```
#[macro_export]
macro_rules! docvec {
    () => {
        $crate::codegen::python::document::Document::Vec(Vec::new())
    };

    ($first:expr $(,)?) => {
        $crate::codegen::python::document::Document::Vec(
            vec![$crate::codegen::python::document::Documentable::to_doc($first)]
        )
    };

    ($first:expr, $($rest:expr),+ $(,)?) => {
        match $crate::codegen::python::document::Documentable::to_doc($first) {
            $crate::codegen::python::document::Document::Vec(mut vec) => {
                $(
                    vec.push($crate::codegen::python::document::Documentable::to_doc($rest));
                )*
                $crate::codegen::python::document::Document::Vec(vec)
            },
            first => {
                $crate::codegen::python::document::Document::Vec(
                    vec![first, $($crate::codegen::python::document::Documentable::to_doc($rest)),+]
                )
            }
        }
    };
}

/// A mandatory newline.
#[must_use]
pub fn line() -> Document<'static> {
    Document::Line
}

/// An empty document.
#[must_use]
pub fn nil() -> Document<'static> {
    Document::Nil
}

/// Indents the breaks and lines of `doc` by `indent` more columns.
#[must_use]
pub fn nest(indent: isize, doc: Document<'_>) -> Document<'_> {
    Document::Nest(indent, Box::new(doc))
}

/// Lays `doc` out flat when it fits, broken otherwise.
#[must_use]
pub fn group(doc: Document<'_>) -> Document<'_> {
    Document::Group(Box::new(doc))
}

/// A break point: `unbroken` when flat, `broken` plus newline when broken.
#[must_use]
pub fn break_<'a>(broken: &'a str, unbroken: &'a str) -> Document<'a> {
    Document::Break { broken, unbroken }
}

/// Joins documents with a separator between each pair.
#[must_use]
pub fn join<'a>(
    docs: impl IntoIterator<Item = Document<'a>>,
    separator: &Document<'a>,
) -> Document<'a> {
    let mut result = Vec::new();
    for doc in docs {
        if !result.is_empty() {
            result.push(separator.clone());
        }
        result.push(doc);
    }
    if result.is_empty() {
        Document::Nil
    } else {
        Document::Vec(result)
    }
}

/// Concatenates documents without any separator.
#[must_use]
pub fn concat<'a>(docs: impl IntoIterator<Item = Document<'a>>) -> Document<'a> {
    Document::Vec(docs.into_iter().collect())
}

// --- Rendering ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Breaks render as their unbroken string.
    Flat,
    /// Breaks render as newlines.
    Break,
}

type Item<'d, 'a> = (isize, Mode, &'d Document<'a>);

impl Document<'_> {
    /// Renders at [`DEFAULT_WIDTH`] starting in column 0.
    #[must_use]
    pub fn to_pretty_string(&self) -> String {
        self.render(DEFAULT_WIDTH, 0)
    }

    /// Renders the document for a line that starts at column `indent`
    /// (the indentation itself is not emitted). Groups stay flat while the
    /// line fits in `width` columns.
    #[must_use]
    pub fn render(&self, width: usize, indent: isize) -> String {
        let mut output = String::new();
        let mut column = usize::try_from(indent).unwrap_or(0);
        let mut stack: Vec<Item<'_, '_>> = vec![(indent, Mode::Break, self)];

        while let Some((indent, mode, doc)) = stack.pop() {
            match doc {
                Document::Str(s) => push_text(&mut output, &mut column, s),
                Document::String(s) => push_text(&mut output, &mut column, s),
                Document::Nil => {}
                Document::Line => newline(&mut output, &mut column, indent),
                Document::Nest(extra, inner) => stack.push((indent + extra, mode, inner)),
                Document::Vec(docs) => {
                    for inner in docs.iter().rev() {
                        stack.push((indent, mode, inner));
                    }
                }
                Document::Group(inner) => {
                    let remaining = width.saturating_sub(column);
                    let mode = if fits(remaining, (indent, Mode::Flat, inner), &stack) {
                        Mode::Flat
                    } else {
                        Mode::Break
                    };
                    stack.push((indent, mode, inner));
                }
                Document::Break { broken, unbroken } => match mode {
                    Mode::Flat => push_text(&mut output, &mut column, unbroken),
                    Mode::Break => {
                        push_text(&mut output, &mut column, broken);
                        newline(&mut output, &mut column, indent);
                    }
                },
            }
        }
        output
    }
}

/// Does `first`, followed by the rest of the line from `rest`, fit in
/// `remaining` columns? The line ends at the first newline.
fn fits(mut remaining: usize, first: Item<'_, '_>, rest: &[Item<'_, '_>]) -> bool {
    let mut pending = vec![first];
    let mut rest = rest.iter().rev();

    loop {
        let Some((indent, mode, doc)) = pending.pop().or_else(|| rest.next().copied()) else {
            return true;
        };
        match doc {
            Document::Str(s) => match consume(remaining, s) {
                Some(left) => remaining = left,
                None => return false,
            },
            Document::String(s) => match consume(remaining, s) {
                Some(left) => remaining = left,
                None => return false,
            },
            Document::Nil => {}
            Document::Line => return true,
            Document::Nest(extra, inner) => pending.push((indent + extra, mode, inner)),
            Document::Vec(docs) => {
                for inner in docs.iter().rev() {
                    pending.push((indent, mode, inner));
                }
            }
            Document::Group(inner) => pending.push((indent, mode, inner)),
            Document::Break { unbroken, .. } => match mode {
                Mode::Break => return true,
                Mode::Flat => match consume(remaining, unbroken) {
                    Some(left) => remaining = left,
                    None => return false,
                },
            },
        }
    }
}

fn consume(remaining: usize, text: &str) -> Option<usize> {
    remaining.checked_sub(text.chars().count())
}

fn push_text(output: &mut String, column: &mut usize, text: &str) {
    output.push_str(text);
    match text.rfind('\n') {
        Some(last) => *column = text[last + 1..].chars().count(),
        None => *column += text.chars().count(),
    }
}

fn newline(output: &mut String, column: &mut usize, indent: isize) {
    output.push('\n');
    let indent = usize::try_from(indent).unwrap_or(0);
    output.push_str(&" ".repeat(indent));
    *column = indent;
}
