//! Tunascript (§4.8): a small flag-expression language with a Pratt-parsed
//! evaluator (C9) and a `$IF`/`$ENDIF` text-expansion front end, built on
//! `ictiobus-lexan` for lexing and error reporting.

mod ast;
mod expand;
mod functions;
mod interpreter;
mod lexer;
mod parser;
mod translate;
mod value;
mod world;

pub mod test_support;

pub use ast::{BinOp, Expr, UnaryOp};
pub use interpreter::Interpreter;
pub use lexer::{lex, TokenKind};
pub use parser::parse;
pub use translate::translate_operators;
pub use value::Value;
pub use world::WorldInterface;

pub use ictiobus_lexan::SyntaxError;
