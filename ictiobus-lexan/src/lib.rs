//! Source coordinates, tokens and a minimal non-blocking token stream shared
//! across the ictiobus toolkit (C10 and the `TokenStream` capability of §6).
//!
//! The core never performs I/O: hosts build a `Token` sequence (by whatever
//! means they like — a hand lexer, a regex scanner, a saved transcript) and
//! hand the toolkit a `TokenStream`. Peeking and advancing are both O(1).

use std::fmt;

/// A 1-indexed source position. `0` in either field means "unknown", per the
/// data model: synthetic tokens (e.g. an injected `$` end marker with no
/// underlying text) carry `Location::unknown()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    line: usize,
    column: usize,
    source_line: String,
    label: String,
}

impl Location {
    pub fn new(label: &str, line: usize, column: usize, source_line: &str) -> Self {
        Self {
            line,
            column,
            source_line: source_line.to_string(),
            label: label.to_string(),
        }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    pub fn source_line(&self) -> &str {
        &self.source_line
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.label, self.line, self.column)
        }
    }
}

/// A lexeme, its class and the coordinates it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    lexeme: String,
    class: T,
    location: Location,
}

impl<T> Token<T> {
    pub fn new(lexeme: impl Into<String>, class: T, location: Location) -> Self {
        Self {
            lexeme: lexeme.into(),
            class,
            location,
        }
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn class(&self) -> &T {
        &self.class
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

/// A syntax error with enough context to render a caret under the offending
/// column (C10). Never used for control flow: every fallible entry point
/// returns this as an `Err` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    message: String,
    fragment: Option<String>,
    location: Location,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, location: Location) -> Self {
        Self {
            message: message.into(),
            fragment: None,
            location,
        }
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Renders the offending source line with a caret cursor beneath the
    /// reported column, e.g.:
    /// ```text
    /// expected 'id', got '+' at test:1:5.
    ///     x + + y
    ///         ^
    /// ```
    pub fn full_message(&self) -> String {
        let mut out = format!("{} at {}.", self.message, self.location);
        if self.location.column() > 0 && !self.location.source_line().is_empty() {
            out.push('\n');
            out.push_str(self.location.source_line());
            out.push('\n');
            for _ in 1..self.location.column() {
                out.push(' ');
            }
            out.push('^');
        }
        out
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} at {}.", self.message, self.location)
    }
}

impl std::error::Error for SyntaxError {}

/// A sequence of already-lexed tokens. The host is expected to terminate the
/// stream with an end-of-text token (by convention, class `$`) so that
/// `peek`/`next` never run off the end.
#[derive(Debug, Clone)]
pub struct TokenStream<T> {
    tokens: Vec<Token<T>>,
    position: usize,
}

impl<T: Clone> TokenStream<T> {
    pub fn new(tokens: Vec<Token<T>>) -> Self {
        assert!(!tokens.is_empty(), "token stream must carry at least an end marker");
        Self { tokens, position: 0 }
    }

    /// O(1), non-blocking: the token at the current position.
    pub fn peek(&self) -> &Token<T> {
        &self.tokens[self.position]
    }

    /// O(1), non-blocking: returns the current token and advances, unless
    /// already at the final (end-of-text) token.
    pub fn next(&mut self) -> Token<T> {
        let token = self.tokens[self.position].clone();
        if self.position + 1 < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_with_and_without_label() {
        let loc = Location::new("test.tq", 3, 7, "  $FOO + 1");
        assert_eq!(loc.to_string(), "test.tq:3:7");
        assert_eq!(Location::unknown().to_string(), "0:0");
    }

    #[test]
    fn full_message_renders_caret() {
        let loc = Location::new("t", 1, 5, "x + + y");
        let err = SyntaxError::new("unexpected '+'", loc);
        let msg = err.full_message();
        assert!(msg.contains("x + + y"));
        let caret_line = msg.lines().last().unwrap();
        assert_eq!(caret_line, "    ^");
    }

    #[test]
    fn token_stream_peek_next_are_o1_and_stick_at_end() {
        let loc = Location::unknown();
        let tokens = vec![
            Token::new("a", 1, loc.clone()),
            Token::new("b", 2, loc.clone()),
            Token::new("", 0, loc),
        ];
        let mut stream = TokenStream::new(tokens);
        assert_eq!(stream.len(), 3);
        assert_eq!(stream.remaining(), 3);
        assert_eq!(*stream.peek().class(), 1);
        assert_eq!(stream.next().class(), &1);
        assert_eq!(stream.remaining(), 2);
        assert_eq!(stream.next().class(), &2);
        assert_eq!(stream.next().class(), &0);
        // stays put once the end marker is reached
        assert_eq!(stream.next().class(), &0);
        assert_eq!(stream.remaining(), 1);
    }
}
