//! Floored modulo and floor division helpers.
//!
//! Both follow floored semantics: the result's sign follows the divisor,
//! so `mod(-7, 3)` is `2` and `floordiv(-7, 3)` is `-3`.

use crate::{
    error::{RunError, RunResult},
    value::{Number, Value},
};

fn numeric_pair(args: Vec<Value>, name: &str) -> RunResult<(Number, Number)> {
    if args.len() != 2 {
        return Err(RunError::value(format!(
            "{name} expects exactly 2 arguments, got {}",
            args.len()
        )));
    }
    match (args[0].as_number(), args[1].as_number()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(RunError::type_error(format!(
            "{name} requires numeric arguments, got {} and {}",
            args[0].type_name(),
            args[1].type_name()
        ))),
    }
}

pub fn modulo(args: Vec<Value>) -> RunResult<Value> {
    let (a, b) = numeric_pair(args, "mod")?;
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if y == 0 {
            return Err(RunError::value("division by zero"));
        }
        return Ok(Value::Int(x - y * floor_div_int(x, y)));
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    if y == 0.0 {
        return Err(RunError::value("division by zero"));
    }
    Ok(Value::Float(x - y * (x / y).floor()))
}

pub fn floordiv(args: Vec<Value>) -> RunResult<Value> {
    let (a, b) = numeric_pair(args, "floordiv")?;
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        if y == 0 {
            return Err(RunError::value("division by zero"));
        }
        return Ok(Value::Int(floor_div_int(x, y)));
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    if y == 0.0 {
        return Err(RunError::value("division by zero"));
    }
    Ok(Value::Float((x / y).floor()))
}

fn floor_div_int(a: i64, b: i64) -> i64 {
    let quotient = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        quotient - 1
    } else {
        quotient
    }
}
