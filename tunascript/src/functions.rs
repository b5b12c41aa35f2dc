//! Tunascript's builtin function table (§4.8/§6): `ADD`, `SUB`, `MULT`,
//! `DIV`, `AND`, `OR`, `NOT`, the `FLAG_*` predicates, `IN_INVEN`, and the
//! side-effecting mutators (`ENABLE`, `DISABLE`, `TOGGLE`, `INC`, `DEC`,
//! `SET`, `MOVE`, `OUTPUT`).
//!
//! Name-taking functions (`ENABLE($X)`, `SET($X, 1)`, ...) need the literal
//! flag name out of their first argument's AST node, not its evaluated
//! value, so builtins receive unevaluated `Expr` arguments and evaluate
//! only the ones they actually need.

use crate::ast::Expr;
use crate::interpreter::Interpreter;
use crate::value::{self, Value};
use ictiobus_lexan::{Location, SyntaxError};

pub type Builtin = fn(&mut Interpreter, &[Expr], bool) -> Result<Value, SyntaxError>;

/// Looks up a builtin by name, case-insensitively.
pub fn lookup(name: &str) -> Option<Builtin> {
    match name.to_ascii_uppercase().as_str() {
        "ADD" => Some(fn_add),
        "SUB" => Some(fn_sub),
        "MULT" => Some(fn_mult),
        "DIV" => Some(fn_div),
        "AND" => Some(fn_and),
        "OR" => Some(fn_or),
        "NOT" => Some(fn_not),
        "FLAG_IS" => Some(fn_flag_is),
        "FLAG_ENABLED" => Some(fn_flag_enabled),
        "FLAG_DISABLED" => Some(fn_flag_disabled),
        "FLAG_LESS_THAN" => Some(fn_flag_less_than),
        "FLAG_GREATER_THAN" => Some(fn_flag_greater_than),
        "IN_INVEN" => Some(fn_in_inven),
        "ENABLE" => Some(fn_enable),
        "DISABLE" => Some(fn_disable),
        "TOGGLE" => Some(fn_toggle),
        "INC" => Some(fn_inc),
        "DEC" => Some(fn_dec),
        "SET" => Some(fn_set),
        "MOVE" => Some(fn_move),
        "OUTPUT" => Some(fn_output),
        _ => None,
    }
}

/// True for the functions that mutate interpreter or world state, which
/// `Interpreter::eval_expr` refuses to invoke when evaluating in query-only
/// mode.
pub fn is_side_effecting(name: &str) -> bool {
    matches!(
        name.to_ascii_uppercase().as_str(),
        "ENABLE" | "DISABLE" | "TOGGLE" | "INC" | "DEC" | "SET" | "MOVE" | "OUTPUT"
    )
}

fn unknown(message: impl Into<String>) -> SyntaxError {
    SyntaxError::new(message, Location::unknown())
}

fn one(args: &[Expr]) -> Result<&Expr, SyntaxError> {
    match args {
        [a] => Ok(a),
        _ => Err(unknown(format!("expected 1 argument, got {}", args.len()))),
    }
}

fn two(args: &[Expr]) -> Result<(&Expr, &Expr), SyntaxError> {
    match args {
        [a, b] => Ok((a, b)),
        _ => Err(unknown(format!("expected 2 arguments, got {}", args.len()))),
    }
}

fn flag_name(expr: &Expr) -> Result<&str, SyntaxError> {
    match expr {
        Expr::Flag(name) => Ok(name),
        _ => Err(unknown("expected a flag reference ($NAME) here")),
    }
}

fn fn_add(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (a, b) = two(args)?;
    let (a, b) = (interp.eval_expr(a, q)?, interp.eval_expr(b, q)?);
    Ok(value::add(&a, &b))
}

fn fn_sub(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (a, b) = two(args)?;
    let (a, b) = (interp.eval_expr(a, q)?, interp.eval_expr(b, q)?);
    Ok(value::sub(&a, &b))
}

fn fn_mult(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (a, b) = two(args)?;
    let (a, b) = (interp.eval_expr(a, q)?, interp.eval_expr(b, q)?);
    Ok(value::mul(&a, &b))
}

fn fn_div(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (a, b) = two(args)?;
    let (a, b) = (interp.eval_expr(a, q)?, interp.eval_expr(b, q)?);
    Ok(value::div(&a, &b))
}

fn fn_and(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (a, b) = two(args)?;
    let (a, b) = (interp.eval_expr(a, q)?, interp.eval_expr(b, q)?);
    Ok(Value::Bool(a.as_bool() && b.as_bool()))
}

fn fn_or(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (a, b) = two(args)?;
    let (a, b) = (interp.eval_expr(a, q)?, interp.eval_expr(b, q)?);
    Ok(Value::Bool(a.as_bool() || b.as_bool()))
}

fn fn_not(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let a = interp.eval_expr(one(args)?, q)?;
    Ok(Value::Bool(!a.as_bool()))
}

fn fn_flag_is(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (flag, value) = two(args)?;
    let name = flag_name(flag)?.to_string();
    let target = interp.eval_expr(value, q)?;
    Ok(Value::Bool(value::equals(&interp.get_flag(&name), &target)))
}

fn fn_flag_enabled(interp: &mut Interpreter, args: &[Expr], _q: bool) -> Result<Value, SyntaxError> {
    let name = flag_name(one(args)?)?;
    Ok(Value::Bool(interp.get_flag(name).as_bool()))
}

fn fn_flag_disabled(interp: &mut Interpreter, args: &[Expr], _q: bool) -> Result<Value, SyntaxError> {
    let name = flag_name(one(args)?)?;
    Ok(Value::Bool(!interp.get_flag(name).as_bool()))
}

fn fn_flag_less_than(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (flag, value) = two(args)?;
    let name = flag_name(flag)?.to_string();
    let target = interp.eval_expr(value, q)?;
    Ok(Value::Bool(interp.get_flag(&name).as_num() < target.as_num()))
}

fn fn_flag_greater_than(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (flag, value) = two(args)?;
    let name = flag_name(flag)?.to_string();
    let target = interp.eval_expr(value, q)?;
    Ok(Value::Bool(interp.get_flag(&name).as_num() > target.as_num()))
}

fn fn_in_inven(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let label = interp.eval_expr(one(args)?, q)?;
    Ok(Value::Bool(interp.world.in_inventory(&label.to_string())))
}

fn fn_enable(interp: &mut Interpreter, args: &[Expr], _q: bool) -> Result<Value, SyntaxError> {
    let name = flag_name(one(args)?)?.to_string();
    interp.set_flag(&name, Value::Bool(true));
    Ok(Value::Bool(true))
}

fn fn_disable(interp: &mut Interpreter, args: &[Expr], _q: bool) -> Result<Value, SyntaxError> {
    let name = flag_name(one(args)?)?.to_string();
    interp.set_flag(&name, Value::Bool(false));
    Ok(Value::Bool(false))
}

fn fn_toggle(interp: &mut Interpreter, args: &[Expr], _q: bool) -> Result<Value, SyntaxError> {
    let name = flag_name(one(args)?)?.to_string();
    let new = !interp.get_flag(&name).as_bool();
    interp.set_flag(&name, Value::Bool(new));
    Ok(Value::Bool(new))
}

fn fn_inc(interp: &mut Interpreter, args: &[Expr], _q: bool) -> Result<Value, SyntaxError> {
    let name = flag_name(one(args)?)?.to_string();
    let new = interp.get_flag(&name).as_num() + 1;
    interp.set_flag(&name, Value::Num(new));
    Ok(Value::Num(new))
}

fn fn_dec(interp: &mut Interpreter, args: &[Expr], _q: bool) -> Result<Value, SyntaxError> {
    let name = flag_name(one(args)?)?.to_string();
    let new = interp.get_flag(&name).as_num() - 1;
    interp.set_flag(&name, Value::Num(new));
    Ok(Value::Num(new))
}

fn fn_set(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (flag, value) = two(args)?;
    let name = flag_name(flag)?.to_string();
    let value = interp.eval_expr(value, q)?;
    interp.set_flag(&name, value.clone());
    Ok(value)
}

fn fn_move(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let (label, dest) = two(args)?;
    let label = interp.eval_expr(label, q)?.to_string();
    let dest = interp.eval_expr(dest, q)?.to_string();
    Ok(Value::Bool(interp.world.move_item(&label, &dest)))
}

fn fn_output(interp: &mut Interpreter, args: &[Expr], q: bool) -> Result<Value, SyntaxError> {
    let text = interp.eval_expr(one(args)?, q)?.to_string();
    Ok(Value::Bool(interp.world.output(&text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(lookup("flag_is").is_some());
        assert!(lookup("Flag_Is").is_some());
        assert!(lookup("NOSUCHFN").is_none());
    }

    #[test]
    fn side_effecting_set_matches_the_mutators() {
        assert!(is_side_effecting("set"));
        assert!(is_side_effecting("OUTPUT"));
        assert!(!is_side_effecting("ADD"));
        assert!(!is_side_effecting("FLAG_ENABLED"));
    }
}
