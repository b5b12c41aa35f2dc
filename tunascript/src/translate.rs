//! Operator-to-function-call translation (§8 E6): renders a parsed
//! expression back into Tunascript source, replacing the operators that have
//! a direct builtin equivalent (`!`, `+`, `-`, `*`, `/`, `&&`, `||`) with the
//! canonical `$FUNCTION(args)` call syntax. Operators with no 1:1 builtin
//! (comparisons, assignment, `++`/`--`) keep their operator spelling.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::parser::parse;
use ictiobus_lexan::SyntaxError;

/// Parses `source` and renders it back out with operator syntax translated
/// to canonical function calls where a builtin exists.
pub fn translate_operators(source: &str) -> Result<String, SyntaxError> {
    Ok(render(&parse(source)?))
}

fn render(expr: &Expr) -> String {
    match expr {
        Expr::Str(s) => format!("@{s}@"),
        Expr::UnquotedStr(s) => s.clone(),
        Expr::Num(n) => n.to_string(),
        Expr::Bool(b) => b.to_string(),
        Expr::Flag(name) => format!("${name}"),
        Expr::Call(name, args) => {
            format!("${name}({})", args.iter().map(render).collect::<Vec<_>>().join(", "))
        }
        Expr::Group(inner) => format!("({})", render(inner)),
        Expr::Prefix(UnaryOp::Not, operand) => format!("$NOT({})", render(operand)),
        Expr::Prefix(UnaryOp::Neg, operand) => format!("-{}", render(operand)),
        Expr::Prefix(UnaryOp::Inc, operand) => format!("++{}", render(operand)),
        Expr::Prefix(UnaryOp::Dec, operand) => format!("--{}", render(operand)),
        Expr::Postfix(UnaryOp::Inc, operand) => format!("{}++", render(operand)),
        Expr::Postfix(UnaryOp::Dec, operand) => format!("{}--", render(operand)),
        Expr::Postfix(UnaryOp::Not | UnaryOp::Neg, operand) => render(operand),
        Expr::Binary(op, lhs, rhs) => render_binary(*op, lhs, rhs),
    }
}

fn render_binary(op: BinOp, lhs: &Expr, rhs: &Expr) -> String {
    let (l, r) = (render(lhs), render(rhs));
    match op {
        BinOp::Add => format!("$ADD({l}, {r})"),
        BinOp::Sub => format!("$SUB({l}, {r})"),
        BinOp::Mul => format!("$MULT({l}, {r})"),
        BinOp::Div => format!("$DIV({l}, {r})"),
        BinOp::And => format!("$AND({l}, {r})"),
        BinOp::Or => format!("$OR({l}, {r})"),
        BinOp::Eq => format!("{l} == {r}"),
        BinOp::Ne => format!("{l} != {r}"),
        BinOp::Lt => format!("{l} < {r}"),
        BinOp::Le => format!("{l} <= {r}"),
        BinOp::Gt => format!("{l} > {r}"),
        BinOp::Ge => format!("{l} >= {r}"),
        BinOp::Assign => format!("{l} = {r}"),
        BinOp::AddAssign => format!("{l} += {r}"),
        BinOp::SubAssign => format!("{l} -= {r}"),
    }
}
