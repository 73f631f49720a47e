// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for Sona source code.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written and fails fast: the first malformed token stops
//! tokenization with a [`LexError`] that carries the exact line and column.
//!
//! # Design Principles
//!
//! - **Restartable**: a [`Lexer`] holds no state outside itself; lexing the
//!   same text twice yields the same tokens
//! - **Greedy operators**: two-character operators (`==`, `&&`, `->`, ...) are
//!   tried before their one-character prefixes
//! - **Line-aware**: newlines are tokens, since they separate statements
//!
//! # Example
//!
//! ```
//! use sona_core::source_analysis::{tokenize, TokenKind};
//!
//! let tokens = tokenize("let x = 42").unwrap();
//! assert_eq!(tokens.len(), 5); // let, x, =, 42, EOF
//! assert_eq!(tokens[0].kind(), &TokenKind::Let);
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::{LexError, Position, Span, Token, TokenKind};

include!(concat!(env!("OUT_DIR"), "/keywords.rs"));

/// A lexer that tokenizes Sona source code.
///
/// Implements [`Iterator`] over `Result<Token, LexError>`. The end-of-input
/// marker is not yielded by the iterator (use [`tokenize`] to get it), and
/// the iterator stops after the first error.
pub struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    offset: usize,
    /// Current 1-based line.
    line: u32,
    /// Current 1-based column, in characters.
    column: u32,
    /// Set once EOF or an error has been produced.
    finished: bool,
}

impl std::fmt::Debug for Lexer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexer")
            .field("line", &self.line)
            .field("column", &self.column)
            .field("remaining", &self.source.get(self.offset..).unwrap_or(""))
            .finish()
    }
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks at the character after the next one.
    fn peek_second(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it, keeping line and column
    /// in step.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.offset = pos + c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn current_offset(&self) -> u32 {
        self.offset as u32
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Creates a span from start to current position.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_offset())
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    /// Skips spaces, tabs, carriage returns and comments. Newlines are
    /// tokens and are left in place.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r') => {
                    self.advance_while(|c| matches!(c, ' ' | '\t' | '\r'));
                }
                Some('/') if self.peek_second() == Some('/') => {
                    self.advance_while(|c| c != '\n');
                }
                Some('/') if self.peek_second() == Some('*') => {
                    self.skip_block_comment()?;
                }
                _ => return Ok(()),
            }
        }
    }

    /// Skips a block comment: `/* ... */`
    fn skip_block_comment(&mut self) -> Result<(), LexError> {
        let start = self.current_offset();
        let position = self.current_position();
        self.advance(); // /
        self.advance(); // *

        loop {
            match self.peek_char() {
                None => {
                    return Err(LexError::unterminated_comment(
                        Span::new(start, start + 2),
                        position,
                    ));
                }
                Some('*') if self.peek_second() == Some('/') => {
                    self.advance(); // *
                    self.advance(); // /
                    return Ok(());
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Lexes the next token, producing [`TokenKind::Eof`] at the end.
    fn lex_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;

        let start = self.current_offset();
        let position = self.current_position();

        let Some(c) = self.peek_char() else {
            return Ok(Token::new(
                TokenKind::Eof,
                "",
                Span::new(start, start),
                position,
            ));
        };

        let kind = match c {
            '\n' => {
                self.advance();
                TokenKind::Newline
            }
            '0'..='9' => self.lex_number(start),
            '"' | '\'' => self.lex_string(start, position)?,
            c if c.is_ascii_alphabetic() || c == '_' => self.lex_identifier(start),
            _ => self.lex_operator(start, position)?,
        };

        let span = self.span_from(start);
        Ok(Token::new(kind, self.text_for(span), span, position))
    }

    /// Lexes an integer or decimal literal. A `.` belongs to the number only
    /// when a digit follows it.
    fn lex_number(&mut self, start: u32) -> TokenKind {
        self.advance_while(|c| c.is_ascii_digit());

        if self.peek_char() == Some('.') && self.peek_second().is_some_and(|c| c.is_ascii_digit())
        {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit());
            let text = self.text_for(self.span_from(start));
            return TokenKind::Decimal(EcoString::from(text));
        }

        let text = self.text_for(self.span_from(start));
        TokenKind::Integer(EcoString::from(text))
    }

    /// Lexes a quoted string, decoding escapes. Strings may not span lines.
    fn lex_string(&mut self, start: u32, position: Position) -> Result<TokenKind, LexError> {
        let Some(quote) = self.advance() else {
            return Err(LexError::unterminated_string(self.span_from(start), position));
        };
        let mut value = EcoString::new();

        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(LexError::unterminated_string(self.span_from(start), position));
                }
                Some('\\') => {
                    self.advance();
                    match self.peek_char() {
                        None | Some('\n') => {
                            return Err(LexError::unterminated_string(
                                self.span_from(start),
                                position,
                            ));
                        }
                        Some(escaped) => {
                            self.advance();
                            match escaped {
                                'n' => value.push('\n'),
                                't' => value.push('\t'),
                                'r' => value.push('\r'),
                                '0' => value.push('\0'),
                                '\\' | '"' | '\'' => value.push(escaped),
                                other => {
                                    value.push('\\');
                                    value.push(other);
                                }
                            }
                        }
                    }
                }
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(TokenKind::String(value));
                }
                Some(c) => {
                    self.advance();
                    value.push(c);
                }
            }
        }
    }

    /// Lexes an identifier or keyword. Keywords match case-insensitively.
    fn lex_identifier(&mut self, start: u32) -> TokenKind {
        self.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = self.text_for(self.span_from(start));
        keyword_from_lowercase(&text.to_ascii_lowercase())
            .unwrap_or_else(|| TokenKind::Identifier(EcoString::from(text)))
    }

    /// Lexes an operator or delimiter, trying two-character forms first.
    fn lex_operator(&mut self, start: u32, position: Position) -> Result<TokenKind, LexError> {
        let Some(first) = self.advance() else {
            return Ok(TokenKind::Eof);
        };

        let pair = match (first, self.peek_char()) {
            ('=', Some('=')) => Some(TokenKind::EqualEqual),
            ('!', Some('=')) => Some(TokenKind::BangEqual),
            ('<', Some('=')) => Some(TokenKind::LessEqual),
            ('>', Some('=')) => Some(TokenKind::GreaterEqual),
            ('&', Some('&')) => Some(TokenKind::And),
            ('|', Some('|')) => Some(TokenKind::Or),
            ('-', Some('>')) => Some(TokenKind::Arrow),
            _ => None,
        };
        if let Some(kind) = pair {
            self.advance();
            return Ok(kind);
        }

        let kind = match first {
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '=' => TokenKind::Assign,
            '<' => TokenKind::Less,
            '>' => TokenKind::Greater,
            '!' => TokenKind::Not,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            ';' => TokenKind::Semicolon,
            ':' => TokenKind::Colon,
            other => {
                return Err(LexError::unexpected_char(
                    other,
                    self.span_from(start),
                    position,
                ));
            }
        };
        Ok(kind)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.lex_token() {
            Ok(token) if token.kind().is_eof() => {
                self.finished = true;
                None
            }
            Ok(token) => Some(Ok(token)),
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// Tokenizes source text into a vector of tokens ending with
/// [`TokenKind::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.lex_token()?;
        let is_eof = token.kind().is_eof();
        tokens.push(token);
        if is_eof {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::LexErrorKind;

    /// Helper to lex and extract just the token kinds (EOF excluded).
    fn lex_kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .map(|token| token.unwrap().into_kind())
            .collect()
    }

    fn lex_error(source: &str) -> LexError {
        tokenize(source).unwrap_err()
    }

    #[test]
    fn lex_empty() {
        assert!(lex_kinds("").is_empty());
        assert!(lex_kinds("   \t").is_empty());
        assert!(lex_kinds("// comment").is_empty());
        assert!(lex_kinds("/* block */").is_empty());
    }

    #[test]
    fn tokenize_appends_eof() {
        let tokens = tokenize("x").unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[1].kind().is_eof());
        assert_eq!(tokens[1].span(), Span::new(1, 1));
    }

    #[test]
    fn lex_identifiers_keep_spelling() {
        assert_eq!(
            lex_kinds("foo Bar _private x1"),
            vec![
                TokenKind::Identifier("foo".into()),
                TokenKind::Identifier("Bar".into()),
                TokenKind::Identifier("_private".into()),
                TokenKind::Identifier("x1".into()),
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            lex_kinds("let LET Let func IF wHiLe"),
            vec![
                TokenKind::Let,
                TokenKind::Let,
                TokenKind::Let,
                TokenKind::Func,
                TokenKind::If,
                TokenKind::While,
            ]
        );
        let tokens = tokenize("LET").unwrap();
        assert_eq!(tokens[0].text(), "LET");
    }

    #[test]
    fn keyword_table_comes_from_grammar() {
        assert!(KEYWORDS.contains(&"let"));
        assert!(KEYWORDS.contains(&"null"));
        assert!(KEYWORDS.contains(&"print"));
        for word in KEYWORDS {
            assert!(keyword_from_lowercase(word).is_some(), "{word}");
        }
    }

    #[test]
    fn word_operators_share_kinds_with_symbols() {
        assert_eq!(
            lex_kinds("a and b && c or d || not e !f"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::And,
                TokenKind::Identifier("b".into()),
                TokenKind::And,
                TokenKind::Identifier("c".into()),
                TokenKind::Or,
                TokenKind::Identifier("d".into()),
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Identifier("e".into()),
                TokenKind::Not,
                TokenKind::Identifier("f".into()),
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            lex_kinds("42 0 3.14 007"),
            vec![
                TokenKind::Integer("42".into()),
                TokenKind::Integer("0".into()),
                TokenKind::Decimal("3.14".into()),
                TokenKind::Integer("007".into()),
            ]
        );
    }

    #[test]
    fn dot_without_digit_is_property_access() {
        assert_eq!(
            lex_kinds("items.len 1.x"),
            vec![
                TokenKind::Identifier("items".into()),
                TokenKind::Dot,
                TokenKind::Identifier("len".into()),
                TokenKind::Integer("1".into()),
                TokenKind::Dot,
                TokenKind::Identifier("x".into()),
            ]
        );
    }

    #[test]
    fn lex_strings_with_both_quotes() {
        assert_eq!(
            lex_kinds(r#""hello" 'world' """#),
            vec![
                TokenKind::String("hello".into()),
                TokenKind::String("world".into()),
                TokenKind::String("".into()),
            ]
        );
    }

    #[test]
    fn string_escapes_are_decoded() {
        assert_eq!(
            lex_kinds(r#""a\"b\'c\nd\te\\f""#),
            vec![TokenKind::String("a\"b'c\nd\te\\f".into())]
        );
    }

    #[test]
    fn unknown_escape_is_kept_verbatim() {
        assert_eq!(lex_kinds(r#""\q""#), vec![TokenKind::String("\\q".into())]);
    }

    #[test]
    fn string_token_keeps_raw_text() {
        let tokens = tokenize(r#"'it\'s'"#).unwrap();
        assert_eq!(tokens[0].text(), r"'it\'s'");
    }

    #[test]
    fn unterminated_string_reports_opening_quote() {
        let err = lex_error("\"abc");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.position, Position::new(1, 1));
        assert_eq!(err.span.start(), 0);
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let err = lex_error("let a = 1\nlet s = 'abc\nprint(s)");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
        assert_eq!(err.position, Position::new(2, 9));
    }

    #[test]
    fn unexpected_character_reports_position() {
        let err = lex_error("x = 1\n  y @ 2");
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('@'));
        assert_eq!(err.position, Position::new(2, 5));
    }

    #[test]
    fn lone_ampersand_is_unexpected() {
        let err = lex_error("a & b");
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('&'));
    }

    #[test]
    fn unterminated_block_comment() {
        let err = lex_error("x /* never closed");
        assert_eq!(err.kind, LexErrorKind::UnterminatedComment);
        assert_eq!(err.position, Position::new(1, 3));
    }

    #[test]
    fn two_character_operators_are_greedy() {
        assert_eq!(
            lex_kinds("== != <= >= -> = < > ! -"),
            vec![
                TokenKind::EqualEqual,
                TokenKind::BangEqual,
                TokenKind::LessEqual,
                TokenKind::GreaterEqual,
                TokenKind::Arrow,
                TokenKind::Assign,
                TokenKind::Less,
                TokenKind::Greater,
                TokenKind::Not,
                TokenKind::Minus,
            ]
        );
    }

    #[test]
    fn delimiters() {
        assert_eq!(
            lex_kinds("( ) { } [ ] , . ; :"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Comma,
                TokenKind::Dot,
                TokenKind::Semicolon,
                TokenKind::Colon,
            ]
        );
    }

    #[test]
    fn newlines_are_tokens_and_comments_are_not() {
        assert_eq!(
            lex_kinds("a // trailing\n/* one\ntwo */ b\r\n"),
            vec![
                TokenKind::Identifier("a".into()),
                TokenKind::Newline,
                TokenKind::Identifier("b".into()),
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = tokenize("let x = 1\n  print(x)").unwrap();
        let positions: Vec<_> = tokens
            .iter()
            .map(|t| (t.line(), t.column()))
            .collect();
        assert_eq!(
            positions,
            vec![
                (1, 1),
                (1, 5),
                (1, 7),
                (1, 9),
                (1, 10),
                (2, 3),
                (2, 8),
                (2, 9),
                (2, 10),
                (2, 11),
            ]
        );
    }

    #[test]
    fn block_comment_advances_lines() {
        let tokens = tokenize("/* a\nb */ x").unwrap();
        assert_eq!(tokens[0].position(), Position::new(2, 6));
    }

    #[test]
    fn columns_count_characters_not_bytes() {
        let tokens = tokenize("'héllo' x").unwrap();
        assert_eq!(tokens[1].column(), 9);
        assert_eq!(tokens[1].span().start(), 9);
    }

    #[test]
    fn iterator_stops_after_error() {
        let results: Vec<_> = Lexer::new("a @ b").collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
    }

    #[test]
    fn lexing_is_restartable() {
        let source = "func f(a) { return a * 2 }";
        assert_eq!(tokenize(source).unwrap(), tokenize(source).unwrap());
    }
}
