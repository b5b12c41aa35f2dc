//! The Tunascript interpreter (§4.8/§6): flag storage, expression
//! evaluation, and the `eval`/`expand` entry points.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::functions::{self, is_side_effecting};
use crate::parser::parse;
use crate::value::{self, Value};
use crate::world::WorldInterface;
use ictiobus_lexan::{Location, SyntaxError};
use std::collections::BTreeMap;

pub struct Interpreter {
    flags: BTreeMap<String, Value>,
    pub(crate) world: Box<dyn WorldInterface>,
}

impl Interpreter {
    pub fn new(world: impl WorldInterface + 'static) -> Self {
        Self { flags: BTreeMap::new(), world: Box::new(world) }
    }

    pub fn add_flag(&mut self, name: impl Into<String>, value: Value) {
        self.flags.insert(name.into().to_ascii_uppercase(), value);
    }

    pub(crate) fn set_flag(&mut self, name: &str, value: Value) {
        self.flags.insert(name.to_ascii_uppercase(), value);
    }

    /// Missing flags read as an empty string, per §4.8.
    pub fn get_flag(&self, name: &str) -> Value {
        self.flags.get(&name.to_ascii_uppercase()).cloned().unwrap_or_else(|| Value::Str(String::new()))
    }

    pub fn list_flags(&self) -> Vec<(String, Value)> {
        self.flags.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Parses and evaluates `text` as a single Tunascript expression,
    /// stringifying the result.
    pub fn eval(&mut self, text: &str) -> Result<String, SyntaxError> {
        let expr = parse(text)?;
        let value = self.eval_expr(&expr, false)?;
        Ok(value.to_string())
    }

    /// Runs `$IF(...)`/`$ENDIF()` text expansion over `text` (§4.8).
    pub fn expand(&mut self, text: &str) -> Result<String, SyntaxError> {
        crate::expand::expand(self, text)
    }

    pub(crate) fn eval_expr(&mut self, expr: &Expr, query_only: bool) -> Result<Value, SyntaxError> {
        match expr {
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::UnquotedStr(s) => Ok(Value::Str(s.clone())),
            Expr::Num(n) => Ok(Value::Num(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Flag(name) => Ok(self.get_flag(name)),
            Expr::Group(inner) => self.eval_expr(inner, query_only),
            Expr::Call(name, args) => self.eval_call(name, args, query_only),
            Expr::Binary(op, lhs, rhs) => self.eval_binary(*op, lhs, rhs, query_only),
            Expr::Prefix(op, operand) => self.eval_prefix(*op, operand, query_only),
            Expr::Postfix(op, operand) => self.eval_postfix(*op, operand, query_only),
        }
    }

    fn eval_call(&mut self, name: &str, args: &[Expr], query_only: bool) -> Result<Value, SyntaxError> {
        if query_only && is_side_effecting(name) {
            return Err(SyntaxError::new(
                format!("'{name}' has side effects and cannot be used here"),
                Location::unknown(),
            ));
        }
        let builtin = functions::lookup(name)
            .ok_or_else(|| SyntaxError::new(format!("unknown function '{name}'"), Location::unknown()))?;
        builtin(self, args, query_only)
    }

    fn eval_binary(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        query_only: bool,
    ) -> Result<Value, SyntaxError> {
        if matches!(op, BinOp::Assign | BinOp::AddAssign | BinOp::SubAssign) {
            return self.eval_assignment(op, lhs, rhs, query_only);
        }
        let left = self.eval_expr(lhs, query_only)?;
        let right = self.eval_expr(rhs, query_only)?;
        Ok(match op {
            BinOp::Add => value::add(&left, &right),
            BinOp::Sub => value::sub(&left, &right),
            BinOp::Mul => value::mul(&left, &right),
            BinOp::Div => value::div(&left, &right),
            BinOp::And => Value::Bool(left.as_bool() && right.as_bool()),
            BinOp::Or => Value::Bool(left.as_bool() || right.as_bool()),
            BinOp::Eq => Value::Bool(value::equals(&left, &right)),
            BinOp::Ne => Value::Bool(!value::equals(&left, &right)),
            BinOp::Lt => Value::Bool(left.as_num() < right.as_num()),
            BinOp::Le => Value::Bool(left.as_num() <= right.as_num()),
            BinOp::Gt => Value::Bool(left.as_num() > right.as_num()),
            BinOp::Ge => Value::Bool(left.as_num() >= right.as_num()),
            BinOp::Assign | BinOp::AddAssign | BinOp::SubAssign => unreachable!("handled above"),
        })
    }

    fn eval_assignment(
        &mut self,
        op: BinOp,
        lhs: &Expr,
        rhs: &Expr,
        query_only: bool,
    ) -> Result<Value, SyntaxError> {
        if query_only {
            return Err(SyntaxError::new("assignment cannot be used here", Location::unknown()));
        }
        let Expr::Flag(name) = lhs else {
            return Err(SyntaxError::new("assignment target must be a flag reference", Location::unknown()));
        };
        let rhs_value = self.eval_expr(rhs, query_only)?;
        let new_value = match op {
            BinOp::Assign => rhs_value,
            BinOp::AddAssign => value::add(&self.get_flag(name), &rhs_value),
            BinOp::SubAssign => value::sub(&self.get_flag(name), &rhs_value),
            _ => unreachable!("caller only dispatches assignment operators here"),
        };
        self.set_flag(name, new_value.clone());
        Ok(new_value)
    }

    fn eval_prefix(&mut self, op: UnaryOp, operand: &Expr, query_only: bool) -> Result<Value, SyntaxError> {
        match op {
            UnaryOp::Not => Ok(Value::Bool(!self.eval_expr(operand, query_only)?.as_bool())),
            UnaryOp::Neg => Ok(Value::Num(-self.eval_expr(operand, query_only)?.as_num())),
            UnaryOp::Inc | UnaryOp::Dec => {
                let (name, new_value) = self.step_flag(operand, op, query_only)?;
                self.set_flag(&name, new_value.clone());
                Ok(new_value)
            }
        }
    }

    fn eval_postfix(&mut self, op: UnaryOp, operand: &Expr, query_only: bool) -> Result<Value, SyntaxError> {
        let (name, new_value) = self.step_flag(operand, op, query_only)?;
        let old_value = self.get_flag(&name);
        self.set_flag(&name, new_value);
        Ok(old_value)
    }

    fn step_flag(&mut self, operand: &Expr, op: UnaryOp, query_only: bool) -> Result<(String, Value), SyntaxError> {
        if query_only {
            return Err(SyntaxError::new("'++'/'--' cannot be used here", Location::unknown()));
        }
        let Expr::Flag(name) = operand else {
            return Err(SyntaxError::new("'++'/'--' can only be applied to a flag reference", Location::unknown()));
        };
        let delta = if op == UnaryOp::Inc { 1 } else { -1 };
        Ok((name.clone(), Value::Num(self.get_flag(name).as_num() + delta)))
    }
}
