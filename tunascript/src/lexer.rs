//! Tunascript's lexer (§4.8): a single pass over the input with three modes
//! (`Default`, `Ident` inside `$FOO`, `String` inside `@ ... @`). Operators
//! are matched longest-first; unquoted runs are classified as `Bool` or
//! `Number` after scanning, per the spec's merge-and-reclassify rule.

use ictiobus_lexan::{Location, SyntaxError, Token, TokenStream};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    EqEq,
    NotEq,
    LtEq,
    GtEq,
    Inc,
    Dec,
    AddAssign,
    SubAssign,
    AndAnd,
    OrOr,
    Not,
    Lt,
    Gt,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
    Flag(String),
    QuotedStr(String),
    UnquotedStr(String),
    Number(i64),
    Bool(bool),
    End,
}

/// Operators in longest-match-first order, per §4.8.
const OPERATORS: &[(&str, TokenKind)] = &[
    ("==", TokenKind::EqEq),
    ("!=", TokenKind::NotEq),
    ("<=", TokenKind::LtEq),
    (">=", TokenKind::GtEq),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("+=", TokenKind::AddAssign),
    ("-=", TokenKind::SubAssign),
    ("&&", TokenKind::AndAnd),
    ("||", TokenKind::OrOr),
    ("!", TokenKind::Not),
    ("<", TokenKind::Lt),
    (">", TokenKind::Gt),
    ("=", TokenKind::Assign),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Star),
    ("/", TokenKind::Slash),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    (",", TokenKind::Comma),
];

fn is_bool_text(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// A run of digits classifies as `Number`. Negative numeric literals are
/// not reachable here: `-` is always claimed by the operator scan first,
/// so `-42` lexes as `Minus, Number(42)` and the parser folds the unary
/// minus, same as any other prefix expression.
fn is_number_text(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        trimmed.parse().ok()
    } else {
        None
    }
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    source: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self { chars: source.chars().collect(), pos: 0, line: 1, column: 1, source }
    }

    fn peek_char(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn source_line(&self) -> String {
        self.source.lines().nth(self.line - 1).unwrap_or("").to_string()
    }

    fn location(&self) -> Location {
        Location::new("tunascript", self.line, self.column, &self.source_line())
    }

    fn match_operator(&self) -> Option<(&'static str, TokenKind)> {
        for (text, kind) in OPERATORS {
            let matches = text.chars().enumerate().all(|(i, c)| self.peek_at(i) == Some(c));
            if matches {
                return Some((*text, kind.clone()));
            }
        }
        None
    }

    fn lex_quoted(&mut self) -> Result<Token<TokenKind>, SyntaxError> {
        let start = self.location();
        self.advance(); // opening '@'
        let mut text = String::new();
        loop {
            match self.advance() {
                None => {
                    return Err(SyntaxError::new("unterminated '@ ... @' string", start));
                }
                Some('\\') => match self.advance() {
                    Some(c) => text.push(c),
                    None => return Err(SyntaxError::new("unterminated '@ ... @' string", start)),
                },
                Some('@') => break,
                Some(c) => text.push(c),
            }
        }
        Ok(Token::new(text.clone(), TokenKind::QuotedStr(text), start))
    }

    fn lex_flag(&mut self) -> Result<Token<TokenKind>, SyntaxError> {
        let start = self.location();
        self.advance(); // '$'
        let mut name = String::new();
        while let Some(c) = self.peek_char() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if name.is_empty() {
            return Err(SyntaxError::new("expected an identifier after '$'", start));
        }
        Ok(Token::new(format!("${name}"), TokenKind::Flag(name), start))
    }

    fn lex_unquoted(&mut self) -> Token<TokenKind> {
        let start = self.location();
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == '@' || c == '$' || self.match_operator().is_some() {
                break;
            }
            if c == '\\' {
                self.advance();
                if let Some(escaped) = self.advance() {
                    text.push(escaped);
                }
                continue;
            }
            text.push(c);
            self.advance();
        }
        let kind = if let Some(b) = is_bool_text(&text) {
            TokenKind::Bool(b)
        } else if let Some(n) = is_number_text(&text) {
            TokenKind::Number(n)
        } else {
            TokenKind::UnquotedStr(text.clone())
        };
        Token::new(text, kind, start)
    }

    fn next_token(&mut self) -> Result<Option<Token<TokenKind>>, SyntaxError> {
        // Whitespace at a token boundary is insignificant and never starts a
        // token of its own; whitespace inside a multi-word unquoted run is
        // still picked up by `lex_unquoted`'s own loop below, since that call
        // only begins once a non-whitespace character has been peeked here.
        while self.peek_char().is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
        match self.peek_char() {
            None => Ok(None),
            Some('@') => self.lex_quoted().map(Some),
            Some('$') => self.lex_flag().map(Some),
            Some(_) => {
                if let Some((text, kind)) = self.match_operator() {
                    let start = self.location();
                    for _ in 0..text.chars().count() {
                        self.advance();
                    }
                    Ok(Some(Token::new(text, kind, start)))
                } else {
                    Ok(Some(self.lex_unquoted()))
                }
            }
        }
    }
}

/// Lexes a Tunascript expression, terminating the stream with a synthetic
/// `$` end-of-text token carrying the coordinates just past the input.
pub fn lex(source: &str) -> Result<TokenStream<TokenKind>, SyntaxError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    tokens.push(Token::new("", TokenKind::End, lexer.location()));
    Ok(TokenStream::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut stream = lex(source).unwrap();
        let mut out = Vec::new();
        loop {
            let t = stream.next();
            let done = matches!(t.class(), TokenKind::End);
            out.push(t.class().clone());
            if done {
                break;
            }
        }
        out
    }

    #[test]
    fn lexes_operators_longest_match_first() {
        assert_eq!(
            kinds("$A += 1 == 2"),
            vec![
                TokenKind::Flag("A".to_string()),
                TokenKind::AddAssign,
                TokenKind::Number(1),
                TokenKind::EqEq,
                TokenKind::Number(2),
                TokenKind::End,
            ]
        );
    }

    #[test]
    fn reclassifies_unquoted_runs_as_bool_or_number() {
        assert_eq!(kinds("true"), vec![TokenKind::Bool(true), TokenKind::End]);
        assert_eq!(kinds("off"), vec![TokenKind::Bool(false), TokenKind::End]);
        assert_eq!(kinds("42"), vec![TokenKind::Number(42), TokenKind::End]);
    }

    #[test]
    fn leading_minus_is_an_operator_not_part_of_the_number() {
        assert_eq!(kinds("-42"), vec![TokenKind::Minus, TokenKind::Number(42), TokenKind::End]);
    }

    #[test]
    fn quoted_string_supports_backslash_escapes() {
        assert_eq!(kinds(r"@a\@b@"), vec![TokenKind::QuotedStr("a@b".to_string()), TokenKind::End]);
    }

    #[test]
    fn unterminated_quoted_string_is_a_lex_error() {
        assert!(lex("@abc").is_err());
    }

    #[test]
    fn flag_call_is_lexed_as_flag_then_parens_and_args() {
        assert_eq!(
            kinds("$NOT($GLUB)"),
            vec![
                TokenKind::Flag("NOT".to_string()),
                TokenKind::LParen,
                TokenKind::Flag("GLUB".to_string()),
                TokenKind::RParen,
                TokenKind::End,
            ]
        );
    }
}
