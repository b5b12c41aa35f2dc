//! Table-driven LL(1) parsing (C6): predictive recursive descent over a
//! `Grammar` and a built `ictiobus_lr::LL1Table`, producing a `ParseNode`
//! tree. Logically equivalent to the textbook two-explicit-stack driver --
//! the call stack plays the role of the symbol stack, and the children
//! vectors built up on return play the role of the output stack.

use crate::tree::ParseNode;
use ictiobus_grammar::Grammar;
use ictiobus_lexan::{SyntaxError, Token, TokenStream};
use ictiobus_lr::LL1Table;

pub struct Ll1Parser<'g> {
    grammar: &'g Grammar,
    table: LL1Table,
}

impl<'g> Ll1Parser<'g> {
    pub fn new(grammar: &'g Grammar, table: LL1Table) -> Self {
        Self { grammar, table }
    }

    pub fn parse(&self, tokens: &mut TokenStream<String>) -> Result<ParseNode, SyntaxError> {
        let root = self.parse_non_terminal(self.grammar.start_symbol(), tokens)?;
        let end = tokens.peek();
        if end.class() != "$" {
            return Err(SyntaxError::new(
                format!("expected end of input, found '{}'", end.class()),
                end.location().clone(),
            ));
        }
        Ok(root)
    }

    fn parse_non_terminal(
        &self,
        non_terminal: &str,
        tokens: &mut TokenStream<String>,
    ) -> Result<ParseNode, SyntaxError> {
        let lookahead = tokens.peek().class().clone();
        let alt_index = self.table.predict(non_terminal, &lookahead).ok_or_else(|| {
            SyntaxError::new(
                format!("unexpected '{}' while parsing '{}'", lookahead, non_terminal),
                tokens.peek().location().clone(),
            )
        })?;
        let rule = self.grammar.rule(non_terminal).expect("non-terminal from predict table must exist");
        let production = &rule.alternatives()[alt_index];

        if production.is_epsilon() {
            return Ok(ParseNode::interior(non_terminal, vec![ParseNode::epsilon()]));
        }

        let mut children = Vec::with_capacity(production.symbols().len());
        for symbol in production.symbols() {
            let child = if self.grammar.is_terminal(symbol) {
                self.match_terminal(symbol, tokens)?
            } else {
                self.parse_non_terminal(symbol, tokens)?
            };
            children.push(child);
        }
        Ok(ParseNode::interior(non_terminal, children))
    }

    fn match_terminal(&self, expected: &str, tokens: &mut TokenStream<String>) -> Result<ParseNode, SyntaxError> {
        let token: Token<String> = tokens.peek().clone();
        if token.class() != expected {
            return Err(SyntaxError::new(
                format!("expected '{}', found '{}'", expected, token.class()),
                token.location().clone(),
            ));
        }
        tokens.next();
        Ok(ParseNode::terminal(&token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ictiobus_grammar::text::parse_grammar_text;
    use ictiobus_lexan::Location;
    use ictiobus_lr::build_ll1;

    fn tok(class: &str, lexeme: &str) -> Token<String> {
        Token::new(lexeme, class.to_string(), Location::unknown())
    }

    fn dollar() -> Token<String> {
        tok("$", "")
    }

    /// S -> T X ; T -> lparen S rparen | number Y ; X -> plus S | ; Y -> star T | ;
    /// Parses "number star number" and expects S(T(number,Y(star,T(number,Y()))),X()).
    #[test]
    fn parses_e2_style_arithmetic_grammar() {
        let g = parse_grammar_text(
            "S",
            "S -> T X; T -> lparen S rparen | number Y; X -> plus S | ; Y -> star T | ;",
        )
        .unwrap();
        let table = build_ll1(&g).unwrap();
        let parser = Ll1Parser::new(&g, table);

        let tokens =
            vec![tok("number", "1"), tok("star", "*"), tok("number", "2"), dollar()];
        let mut stream = TokenStream::new(tokens);
        let tree = parser.parse(&mut stream).unwrap();

        let leaves: Vec<&str> = tree.leaves().iter().map(|t| t.class.as_str()).collect();
        assert_eq!(leaves, vec!["number", "star", "number"]);

        match &tree {
            ParseNode::Interior(s) => {
                assert_eq!(s.head, "S");
                assert_eq!(s.children.len(), 2);
            }
            _ => panic!("expected interior node"),
        }
    }

    #[test]
    fn reports_syntax_error_on_unpredicted_token() {
        let g = parse_grammar_text("S", "S -> number;").unwrap();
        let table = build_ll1(&g).unwrap();
        let parser = Ll1Parser::new(&g, table);
        let mut stream = TokenStream::new(vec![tok("plus", "+"), dollar()]);
        assert!(parser.parse(&mut stream).is_err());
    }
}

/// Property test for the parse tree's frontier invariant (§8): for any
/// sentence actually derivable from the grammar, the leaves of the tree
/// `Ll1Parser` builds, read left to right, are exactly the input tokens.
/// Sentences are generated by a bounded-depth random derivation rather than
/// arbitrary token soup, so every generated input is valid by construction.
#[cfg(test)]
mod properties {
    use super::*;
    use ictiobus_grammar::text::parse_grammar_text;
    use ictiobus_lexan::Location;
    use ictiobus_lr::build_ll1;
    use proptest::prelude::*;

    const GRAMMAR_TEXT: &str = "S -> T X; T -> lparen S rparen | number Y; X -> plus S | ; Y -> star T | ;";

    fn tok(class: &str, lexeme: &str) -> Token<String> {
        Token::new(lexeme, class.to_string(), Location::unknown())
    }

    fn dollar() -> Token<String> {
        tok("$", "")
    }

    /// Interprets `choices` as a sequence of binary decisions picking which
    /// alternative to expand at each recursive non-terminal, forcing the
    /// terminating alternative once `depth` passes a bound so every
    /// derivation is finite.
    fn derive(choices: &mut std::slice::Iter<u8>, symbol: &str, depth: u32) -> Vec<(&'static str, &'static str)> {
        let mut pick = |default: u8| {
            if depth > 5 {
                1
            } else {
                choices.next().copied().unwrap_or(default) % 2
            }
        };
        match symbol {
            "S" => {
                let mut out = derive(choices, "T", depth + 1);
                out.extend(derive(choices, "X", depth + 1));
                out
            }
            "T" => {
                if pick(0) == 0 {
                    let mut out = vec![("lparen", "(")];
                    out.extend(derive(choices, "S", depth + 1));
                    out.push(("rparen", ")"));
                    out
                } else {
                    let mut out = vec![("number", "5")];
                    out.extend(derive(choices, "Y", depth + 1));
                    out
                }
            }
            "X" => {
                if pick(1) == 0 {
                    let mut out = vec![("plus", "+")];
                    out.extend(derive(choices, "S", depth + 1));
                    out
                } else {
                    vec![]
                }
            }
            "Y" => {
                if pick(1) == 0 {
                    let mut out = vec![("star", "*")];
                    out.extend(derive(choices, "T", depth + 1));
                    out
                } else {
                    vec![]
                }
            }
            other => unreachable!("no such non-terminal '{other}'"),
        }
    }

    proptest! {
        #[test]
        fn leaves_reproduce_the_derived_sentence(choices in prop::collection::vec(0u8..4, 0..40)) {
            let g = parse_grammar_text("S", GRAMMAR_TEXT).unwrap();
            let table = build_ll1(&g).unwrap();
            let parser = Ll1Parser::new(&g, table);

            let mut iter = choices.iter();
            let terms = derive(&mut iter, "S", 0);
            let mut tokens: Vec<Token<String>> = terms.iter().map(|(c, l)| tok(c, l)).collect();
            tokens.push(dollar());
            let mut stream = TokenStream::new(tokens);

            let tree = parser.parse(&mut stream).unwrap();
            let leaves: Vec<&str> = tree.leaves().iter().map(|t| t.class.as_str()).collect();
            let expected: Vec<&str> = terms.iter().map(|(c, _)| *c).collect();
            prop_assert_eq!(leaves, expected);
        }
    }
}
