// File: src/interpreter/value.rs
//
// Runtime value type for P-Logo.
// Values never coerce between kinds: every operator checks that both operands
// carry the kind it works on and reports a TypeError otherwise.

use crate::builtins::approx_eq;
use crate::errors::{LogoError, SourceLocation};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Str(String),
    Undefined,
}

impl Value {
    /// Name of the value's kind, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Str(_) => "string",
            Value::Undefined => "undefined",
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    fn numbers(&self, other: &Value, op: &str) -> Result<(f64, f64), LogoError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
            _ => Err(LogoError::type_error(
                format!(
                    "'{}' requires two numbers, got {} and {}",
                    op,
                    self.kind_name(),
                    other.kind_name()
                ),
                SourceLocation::unknown(),
            )),
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, LogoError> {
        let (a, b) = self.numbers(other, "add")?;
        Ok(Value::Number(a + b))
    }

    pub fn sub(&self, other: &Value) -> Result<Value, LogoError> {
        let (a, b) = self.numbers(other, "sub")?;
        Ok(Value::Number(a - b))
    }

    pub fn mul(&self, other: &Value) -> Result<Value, LogoError> {
        let (a, b) = self.numbers(other, "mul")?;
        Ok(Value::Number(a * b))
    }

    pub fn div(&self, other: &Value) -> Result<Value, LogoError> {
        let (a, b) = self.numbers(other, "div")?;
        Ok(Value::Number(a / b))
    }

    pub fn rem(&self, other: &Value) -> Result<Value, LogoError> {
        let (a, b) = self.numbers(other, "mod")?;
        Ok(Value::Number(a % b))
    }

    pub fn lt(&self, other: &Value) -> Result<Value, LogoError> {
        let (a, b) = self.numbers(other, "lt")?;
        Ok(Value::Boolean(a < b))
    }

    pub fn lte(&self, other: &Value) -> Result<Value, LogoError> {
        let (a, b) = self.numbers(other, "lte")?;
        Ok(Value::Boolean(a < b || approx_eq(a, b)))
    }

    /// Equality: epsilon-tolerant for numbers, exact for strings and booleans.
    /// Mixed kinds and undefined operands are a TypeError.
    pub fn eq(&self, other: &Value) -> Result<Value, LogoError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Boolean(approx_eq(*a, *b))),
            (Value::Str(a), Value::Str(b)) => Ok(Value::Boolean(a == b)),
            (Value::Boolean(a), Value::Boolean(b)) => Ok(Value::Boolean(a == b)),
            _ => Err(LogoError::type_error(
                format!("'eq' cannot compare {} with {}", self.kind_name(), other.kind_name()),
                SourceLocation::unknown(),
            )),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Undefined => write!(f, "undefined"),
        }
    }
}
