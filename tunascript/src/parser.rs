//! Tunascript's Pratt parser (§4.8): `nud`/`led` dispatch per token class, a
//! table of left binding powers, and the classical
//! `left = next.nud(); while rbp < peek.lbp { left = next.led(left) }` loop.
//!
//! The spec's own LBP table lists `=`, `&&`, `||` alongside the true
//! terminators (`)`, `,`, `$`) at binding power 0. Taken literally that would
//! make them unreachable from the outer `parse_expr(0)` call, since the main
//! loop only continues while `rbp < peek.lbp`. Assignment and the logical
//! operators are real infix operators here (`$X = 1`, `$A && $B` both parse),
//! so they're given the smallest nonzero powers that preserve the table's
//! relative ordering, and only `)`, `,` and the end marker keep lbp 0.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::lexer::{lex, TokenKind};
use ictiobus_lexan::{Location, SyntaxError, Token, TokenStream};

const UNARY_MINUS_LBP: u32 = 15;
const NOT_LBP: u32 = 9;
const PREFIX_INCDEC_LBP: u32 = 150;

struct Parser<'s> {
    stream: &'s mut TokenStream<TokenKind>,
}

impl Parser<'_> {
    fn lbp(kind: &TokenKind) -> u32 {
        match kind {
            TokenKind::Inc | TokenKind::Dec => 150,
            TokenKind::LParen => 100,
            TokenKind::AddAssign | TokenKind::SubAssign => 90,
            TokenKind::Star | TokenKind::Slash => 20,
            TokenKind::Plus | TokenKind::Minus => 10,
            TokenKind::Not => NOT_LBP,
            TokenKind::EqEq
            | TokenKind::NotEq
            | TokenKind::Lt
            | TokenKind::LtEq
            | TokenKind::Gt
            | TokenKind::GtEq => 5,
            TokenKind::AndAnd | TokenKind::OrOr => 3,
            TokenKind::Assign => 2,
            TokenKind::Comma => 1,
            _ => 0,
        }
    }

    fn parse_expr(&mut self, rbp: u32) -> Result<Expr, SyntaxError> {
        let token = self.stream.next();
        let mut left = self.nud(token)?;
        while rbp < Self::lbp(self.stream.peek().class()) {
            let token = self.stream.next();
            left = self.led(left, token)?;
        }
        Ok(left)
    }

    fn nud(&mut self, token: Token<TokenKind>) -> Result<Expr, SyntaxError> {
        let loc = token.location().clone();
        match token.class().clone() {
            TokenKind::Number(n) => Ok(Expr::Num(n)),
            TokenKind::Bool(b) => Ok(Expr::Bool(b)),
            TokenKind::QuotedStr(s) => Ok(Expr::Str(s)),
            TokenKind::UnquotedStr(s) => Ok(Expr::UnquotedStr(s)),
            TokenKind::Flag(name) => self.flag_or_call(name),
            TokenKind::LParen => self.group(),
            TokenKind::Minus => {
                Ok(Expr::Prefix(UnaryOp::Neg, Box::new(self.parse_expr(UNARY_MINUS_LBP)?)))
            }
            TokenKind::Not => Ok(Expr::Prefix(UnaryOp::Not, Box::new(self.parse_expr(NOT_LBP)?))),
            TokenKind::Inc => self.prefix_incdec(UnaryOp::Inc, loc),
            TokenKind::Dec => self.prefix_incdec(UnaryOp::Dec, loc),
            other => Err(SyntaxError::new(
                format!("'{}' cannot start an expression", token_text(&other)),
                loc,
            )),
        }
    }

    fn led(&mut self, left: Expr, token: Token<TokenKind>) -> Result<Expr, SyntaxError> {
        let loc = token.location().clone();
        match token.class().clone() {
            TokenKind::Plus => self.binary(BinOp::Add, left, 10),
            TokenKind::Minus => self.binary(BinOp::Sub, left, 10),
            TokenKind::Star => self.binary(BinOp::Mul, left, 20),
            TokenKind::Slash => self.binary(BinOp::Div, left, 20),
            TokenKind::EqEq => self.binary(BinOp::Eq, left, 5),
            TokenKind::NotEq => self.binary(BinOp::Ne, left, 5),
            TokenKind::Lt => self.binary(BinOp::Lt, left, 5),
            TokenKind::LtEq => self.binary(BinOp::Le, left, 5),
            TokenKind::Gt => self.binary(BinOp::Gt, left, 5),
            TokenKind::GtEq => self.binary(BinOp::Ge, left, 5),
            TokenKind::AndAnd => self.binary(BinOp::And, left, 3),
            TokenKind::OrOr => self.binary(BinOp::Or, left, 3),
            TokenKind::Assign => self.assignment(BinOp::Assign, left, &loc),
            TokenKind::AddAssign => self.assignment(BinOp::AddAssign, left, &loc),
            TokenKind::SubAssign => self.assignment(BinOp::SubAssign, left, &loc),
            TokenKind::Inc => match left {
                Expr::Flag(_) => Ok(Expr::Postfix(UnaryOp::Inc, Box::new(left))),
                _ => Err(SyntaxError::new("'++' can only be applied to a flag reference", loc)),
            },
            TokenKind::Dec => match left {
                Expr::Flag(_) => Ok(Expr::Postfix(UnaryOp::Dec, Box::new(left))),
                _ => Err(SyntaxError::new("'--' can only be applied to a flag reference", loc)),
            },
            other => Err(SyntaxError::new(
                format!("unexpected '{}' in expression", token_text(&other)),
                loc,
            )),
        }
    }

    fn binary(&mut self, op: BinOp, left: Expr, rbp: u32) -> Result<Expr, SyntaxError> {
        let right = self.parse_expr(rbp)?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn assignment(&mut self, op: BinOp, left: Expr, loc: &Location) -> Result<Expr, SyntaxError> {
        if !matches!(left, Expr::Flag(_)) {
            return Err(SyntaxError::new("assignment target must be a flag reference", loc.clone()));
        }
        let right = self.parse_expr(2)?;
        Ok(Expr::Binary(op, Box::new(left), Box::new(right)))
    }

    fn prefix_incdec(&mut self, op: UnaryOp, loc: Location) -> Result<Expr, SyntaxError> {
        let operand = self.parse_expr(PREFIX_INCDEC_LBP)?;
        if !matches!(operand, Expr::Flag(_)) {
            return Err(SyntaxError::new("'++'/'--' can only be applied to a flag reference", loc));
        }
        Ok(Expr::Prefix(op, Box::new(operand)))
    }

    fn flag_or_call(&mut self, name: String) -> Result<Expr, SyntaxError> {
        if !matches!(self.stream.peek().class(), TokenKind::LParen) {
            return Ok(Expr::Flag(name));
        }
        self.stream.next();
        let mut args = Vec::new();
        if !matches!(self.stream.peek().class(), TokenKind::RParen) {
            loop {
                args.push(self.parse_expr(0)?);
                if matches!(self.stream.peek().class(), TokenKind::Comma) {
                    self.stream.next();
                } else {
                    break;
                }
            }
        }
        let close = self.stream.next();
        if !matches!(close.class(), TokenKind::RParen) {
            return Err(SyntaxError::new("expected ')' to close call", close.location().clone()));
        }
        Ok(Expr::Call(name, args))
    }

    fn group(&mut self) -> Result<Expr, SyntaxError> {
        let inner = self.parse_expr(0)?;
        let close = self.stream.next();
        if !matches!(close.class(), TokenKind::RParen) {
            return Err(SyntaxError::new("expected ')'", close.location().clone()));
        }
        Ok(Expr::Group(Box::new(inner)))
    }
}

fn token_text(kind: &TokenKind) -> String {
    match kind {
        TokenKind::End => "end of expression".to_string(),
        other => format!("{other:?}"),
    }
}

/// Lexes and parses a complete Tunascript expression. Errors if anything is
/// left over once the expression has been parsed.
pub fn parse(source: &str) -> Result<Expr, SyntaxError> {
    let mut stream = lex(source)?;
    let expr = {
        let mut parser = Parser { stream: &mut stream };
        parser.parse_expr(0)?
    };
    let trailing = stream.peek();
    if !matches!(trailing.class(), TokenKind::End) {
        return Err(SyntaxError::new(
            format!("unexpected '{}' after expression", token_text(trailing.class())),
            trailing.location().clone(),
        ));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arithmetic_with_usual_precedence() {
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Expr::Binary(
                BinOp::Add,
                Box::new(Expr::Num(1)),
                Box::new(Expr::Binary(BinOp::Mul, Box::new(Expr::Num(2)), Box::new(Expr::Num(3)))),
            )
        );
    }

    #[test]
    fn unary_minus_binds_tighter_than_addition() {
        assert_eq!(
            parse("-1 + 2").unwrap(),
            Expr::Binary(
                BinOp::Add,
                Box::new(Expr::Prefix(UnaryOp::Neg, Box::new(Expr::Num(1)))),
                Box::new(Expr::Num(2)),
            )
        );
    }

    #[test]
    fn parses_flag_reference_and_call() {
        assert_eq!(parse("$GLUB").unwrap(), Expr::Flag("GLUB".to_string()));
        assert_eq!(
            parse("$NOT($GLUB)").unwrap(),
            Expr::Call("NOT".to_string(), vec![Expr::Flag("GLUB".to_string())])
        );
        assert_eq!(
            parse("$ADD($A, $B, 1)").unwrap(),
            Expr::Call(
                "ADD".to_string(),
                vec![Expr::Flag("A".to_string()), Expr::Flag("B".to_string()), Expr::Num(1)]
            )
        );
    }

    #[test]
    fn not_binds_tighter_than_equality() {
        assert_eq!(
            parse("!$A == $B").unwrap(),
            Expr::Binary(
                BinOp::Eq,
                Box::new(Expr::Prefix(UnaryOp::Not, Box::new(Expr::Flag("A".to_string())))),
                Box::new(Expr::Flag("B".to_string())),
            )
        );
    }

    #[test]
    fn logical_operators_bind_looser_than_comparison() {
        assert_eq!(
            parse("$A == 1 && $B == 2").unwrap(),
            Expr::Binary(
                BinOp::And,
                Box::new(Expr::Binary(
                    BinOp::Eq,
                    Box::new(Expr::Flag("A".to_string())),
                    Box::new(Expr::Num(1)),
                )),
                Box::new(Expr::Binary(
                    BinOp::Eq,
                    Box::new(Expr::Flag("B".to_string())),
                    Box::new(Expr::Num(2)),
                )),
            )
        );
    }

    #[test]
    fn assignment_requires_a_flag_target() {
        assert!(parse("1 = 2").is_err());
        assert_eq!(
            parse("$X = 1").unwrap(),
            Expr::Binary(BinOp::Assign, Box::new(Expr::Flag("X".to_string())), Box::new(Expr::Num(1)))
        );
    }

    #[test]
    fn postfix_increment_requires_a_flag_operand() {
        assert_eq!(
            parse("$X++").unwrap(),
            Expr::Postfix(UnaryOp::Inc, Box::new(Expr::Flag("X".to_string())))
        );
        assert!(parse("1++").is_err());
    }

    #[test]
    fn parenthesised_group_overrides_precedence() {
        assert_eq!(
            parse("(1 + 2) * 3").unwrap(),
            Expr::Binary(
                BinOp::Mul,
                Box::new(Expr::Group(Box::new(Expr::Binary(
                    BinOp::Add,
                    Box::new(Expr::Num(1)),
                    Box::new(Expr::Num(2)),
                )))),
                Box::new(Expr::Num(3)),
            )
        );
    }

    #[test]
    fn trailing_garbage_is_a_syntax_error() {
        assert!(parse("1 2").is_err());
    }
}
