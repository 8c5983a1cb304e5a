//! File read/write built-ins.
//!
//! Handles are opened, used, and released inside each call; there is no
//! open-file state in the interpreter.

use std::fs;

use crate::{
    error::{RunError, RunResult},
    value::Value,
};

/// `fread(path)`: the file's contents as a string.
pub fn fread(args: Vec<Value>) -> RunResult<Value> {
    let [path] = args.as_slice() else {
        return Err(RunError::value(format!(
            "fread expects exactly 1 argument, got {}",
            args.len()
        )));
    };
    let Value::Str(path) = path else {
        return Err(RunError::type_error(format!(
            "fread path must be a string, got {}",
            path.type_name()
        )));
    };
    fs::read_to_string(path.as_ref())
        .map(Value::string)
        .map_err(|_| RunError::value(format!("{path} is not a valid file path")))
}

/// `fwrite(data, path)`: writes a string to the file, replacing its contents.
pub fn fwrite(args: Vec<Value>) -> RunResult<Value> {
    let [data, path] = args.as_slice() else {
        return Err(RunError::value(format!(
            "fwrite expects exactly 2 arguments, got {}",
            args.len()
        )));
    };
    let Value::Str(data) = data else {
        return Err(RunError::type_error(format!(
            "fwrite data must be a string, got {}",
            data.type_name()
        )));
    };
    let Value::Str(path) = path else {
        return Err(RunError::type_error(format!(
            "fwrite path must be a string, got {}",
            path.type_name()
        )));
    };
    fs::write(path.as_ref(), data.as_bytes())
        .map_err(|err| RunError::value(format!("Cannot write {path}: {err}")))?;
    Ok(Value::Null)
}
