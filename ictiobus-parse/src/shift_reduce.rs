//! Table-driven shift-reduce parsing (C6): a state stack plus a parallel
//! parse-tree-node stack, driven by a built `ictiobus_lr::ParseTable`.
//! Grounded on `lalr1/src/lib.rs`'s `ParseStack`/`Parser::parse_text` loop
//! in the teacher, generalised from semantic-attribute stacks to plain
//! parse-tree nodes.

use crate::tree::ParseNode;
use ictiobus_grammar::Grammar;
use ictiobus_lexan::{SyntaxError, Token, TokenStream};
use ictiobus_lr::{prod_len, Action, ParseTable};

pub struct ShiftReduceParser<'g> {
    grammar: &'g Grammar,
    table: ParseTable,
}

impl<'g> ShiftReduceParser<'g> {
    pub fn new(grammar: &'g Grammar, table: ParseTable) -> Self {
        Self { grammar, table }
    }

    pub fn parse(&self, tokens: &mut TokenStream<String>) -> Result<ParseNode, SyntaxError> {
        let mut states: Vec<usize> = vec![self.table.start_state];
        let mut nodes: Vec<ParseNode> = Vec::new();

        loop {
            let state = *states.last().unwrap();
            let lookahead: Token<String> = tokens.peek().clone();
            let class = lookahead.class().clone();

            let action = self.table.action.get(&(state, class.clone())).ok_or_else(|| {
                SyntaxError::new(format!("unexpected '{}' in state {}", class, state), lookahead.location().clone())
            })?;

            match action {
                Action::Shift(to) => {
                    tokens.next();
                    nodes.push(ParseNode::terminal(&lookahead));
                    states.push(*to);
                }
                Action::Reduce(prod) => {
                    let n = prod_len(self.grammar, prod);
                    let children = if n == 0 {
                        vec![ParseNode::epsilon()]
                    } else {
                        let split_at = nodes.len() - n;
                        states.truncate(states.len() - n);
                        nodes.split_off(split_at)
                    };
                    let top = *states.last().unwrap();
                    let next_state = *self.table.goto.get(&(top, prod.head.clone())).ok_or_else(|| {
                        SyntaxError::new(
                            format!("no goto from state {} on '{}'", top, prod.head),
                            lookahead.location().clone(),
                        )
                    })?;
                    nodes.push(ParseNode::interior(&prod.head, children));
                    states.push(next_state);
                }
                Action::Accept => {
                    return Ok(nodes.pop().expect("accept must leave exactly one node"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ictiobus_grammar::text::parse_grammar_text;
    use ictiobus_lexan::Location;
    use ictiobus_lr::{build_parse_table, BuildMethod};

    fn tok(class: &str, lexeme: &str) -> Token<String> {
        Token::new(lexeme, class.to_string(), Location::unknown())
    }

    fn dollar() -> Token<String> {
        tok("$", "")
    }

    fn dragon_book_grammar() -> Grammar {
        parse_grammar_text("E", "E -> E plus T | T; T -> T star F | F; F -> lparen E rparen | id;").unwrap()
    }

    #[test]
    fn shift_reduce_parses_id_plus_id_star_id() {
        let g = dragon_book_grammar();
        let table = build_parse_table(&g, BuildMethod::Slr1).unwrap();
        let parser = ShiftReduceParser::new(&g, table);

        let tokens =
            vec![tok("id", "a"), tok("plus", "+"), tok("id", "b"), tok("star", "*"), tok("id", "c"), dollar()];
        let mut stream = TokenStream::new(tokens);
        let tree = parser.parse(&mut stream).unwrap();

        let leaves: Vec<&str> = tree.leaves().iter().map(|t| t.class.as_str()).collect();
        assert_eq!(leaves, vec!["id", "plus", "id", "star", "id"]);
        match &tree {
            ParseNode::Interior(e) => assert_eq!(e.head, "E"),
            _ => panic!("expected interior root"),
        }
    }

    #[test]
    fn shift_reduce_errors_on_malformed_input() {
        let g = dragon_book_grammar();
        let table = build_parse_table(&g, BuildMethod::Slr1).unwrap();
        let parser = ShiftReduceParser::new(&g, table);
        let mut stream = TokenStream::new(vec![tok("plus", "+"), dollar()]);
        assert!(parser.parse(&mut stream).is_err());
    }

    #[test]
    fn shift_reduce_parses_with_canonical_lr1_table() {
        let g = dragon_book_grammar();
        let table = build_parse_table(&g, BuildMethod::CanonicalLr1).unwrap();
        let parser = ShiftReduceParser::new(&g, table);
        let tokens = vec![tok("lparen", "("), tok("id", "a"), tok("rparen", ")"), dollar()];
        let mut stream = TokenStream::new(tokens);
        let tree = parser.parse(&mut stream).unwrap();
        assert_eq!(tree.leaves().iter().map(|t| t.class.as_str()).collect::<Vec<_>>(), vec!["lparen", "id", "rparen"]);
    }
}
