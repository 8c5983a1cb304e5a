//! Type casts and the small introspection/array helpers.

use crate::{
    error::{RunError, RunResult},
    value::{Key, OrderedMap, Value},
};

/// Pulls the single argument a cast expects.
fn expect_one(mut args: Vec<Value>, name: &str) -> RunResult<Value> {
    if args.len() == 1 {
        Ok(args.remove(0))
    } else {
        Err(RunError::value(format!(
            "{name} expects exactly 1 argument, got {}",
            args.len()
        )))
    }
}

/// `b(x)`: truthiness of any value.
pub fn cast_boolean(args: Vec<Value>) -> RunResult<Value> {
    let value = expect_one(args, "b")?;
    Ok(Value::Bool(value.truthy()))
}

/// `i(x)`: integers pass through, booleans widen, floats truncate toward
/// zero, strings parse.
pub fn cast_integer(args: Vec<Value>) -> RunResult<Value> {
    let value = expect_one(args, "i")?;
    match value {
        Value::Int(n) => Ok(Value::Int(n)),
        Value::Bool(b) => Ok(Value::Int(i64::from(b))),
        Value::Float(f) => Ok(Value::Int(f.trunc() as i64)),
        Value::Str(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| RunError::value(format!("Cannot cast \"{s}\" to integer"))),
        other => Err(RunError::type_error(format!(
            "Cannot cast {} to integer",
            other.type_name()
        ))),
    }
}

/// `f(x)`: numbers widen, strings parse.
pub fn cast_float(args: Vec<Value>) -> RunResult<Value> {
    let value = expect_one(args, "f")?;
    match value {
        Value::Float(f) => Ok(Value::Float(f)),
        Value::Int(n) => Ok(Value::Float(n as f64)),
        Value::Bool(b) => Ok(Value::Float(f64::from(u8::from(b)))),
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| RunError::value(format!("Cannot cast \"{s}\" to float"))),
        other => Err(RunError::type_error(format!(
            "Cannot cast {} to float",
            other.type_name()
        ))),
    }
}

/// `s(x)`: the value's rendered text.
pub fn cast_string(args: Vec<Value>) -> RunResult<Value> {
    let value = expect_one(args, "s")?;
    Ok(Value::string(value.render()))
}

/// `h(k1, k2, …)`: a hashtable with the arguments as keys and null values.
pub fn cast_hashtable(args: Vec<Value>) -> RunResult<Value> {
    let mut entries = OrderedMap::default();
    for arg in &args {
        entries.insert(Key::from_value(arg)?, Value::Null);
    }
    Ok(Value::hashtable(entries))
}

/// `stoa(s)`: a string split into an array of one-character strings.
pub fn stoa(args: Vec<Value>) -> RunResult<Value> {
    let value = expect_one(args, "stoa")?;
    match value {
        Value::Str(s) => Ok(Value::array(
            s.chars().map(|c| Value::string(c.to_string())).collect(),
        )),
        other => Err(RunError::type_error(format!(
            "Cannot split {} into an array",
            other.type_name()
        ))),
    }
}

/// `reverse(x)`: a reversed copy of an array or string.
pub fn reverse(args: Vec<Value>) -> RunResult<Value> {
    let value = expect_one(args, "reverse")?;
    match value {
        Value::Array(elements) => {
            let reversed: Vec<Value> = elements.borrow().iter().rev().cloned().collect();
            Ok(Value::array(reversed))
        }
        Value::Str(s) => Ok(Value::string(s.chars().rev().collect::<String>())),
        other => Err(RunError::type_error(format!(
            "Cannot reverse {}",
            other.type_name()
        ))),
    }
}

/// `type(…)`: one argument gives its type name, several give an array of
/// names, none gives null.
pub fn type_of(args: Vec<Value>) -> Value {
    match args.len() {
        0 => Value::Null,
        1 => Value::string(args[0].type_name()),
        _ => Value::array(args.iter().map(|v| Value::string(v.type_name())).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_cast_truncates_toward_zero() {
        let result = cast_integer(vec![Value::Float(-2.9)]).unwrap();
        assert!(matches!(result, Value::Int(-2)));
    }

    #[test]
    fn integer_cast_rejects_null() {
        let err = cast_integer(vec![Value::Null]).unwrap_err();
        assert_eq!(err.message(), "Cannot cast null to integer");
    }

    #[test]
    fn hashtable_cast_rejects_float_keys() {
        let err = cast_hashtable(vec![Value::Float(1.5)]).unwrap_err();
        assert_eq!(err.message(), "Hashtable keys cannot be float, must be integer or string");
    }

    #[test]
    fn stoa_splits_into_single_characters() {
        let result = stoa(vec![Value::string("abc")]).unwrap();
        assert_eq!(result.render(), "[\"a\", \"b\", \"c\"]");
    }
}
