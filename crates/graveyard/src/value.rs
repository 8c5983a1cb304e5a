//! Runtime values and operator semantics.
//!
//! Values are a tagged sum over the language's dynamic type domain. Small
//! values are stored inline; containers, instances, and namespaces sit
//! behind `Rc<RefCell<…>>` so that aliases observe mutation (a method
//! writing through `this` must reach the shared instance record). All maps
//! are insertion-ordered, which the language guarantees for hashtable
//! iteration.

use std::{cell::RefCell, fmt::Write as _, rc::Rc};

use indexmap::IndexMap;

use crate::{
    error::{RunError, RunResult},
    node::{BinaryOp, FunctionDef},
};

/// Insertion-ordered map used for scopes, hashtables, and instance records.
pub type OrderedMap<K, V> = IndexMap<K, V, ahash::RandomState>;

/// One scope of the monolith: name to value, in binding order.
pub type Scope = OrderedMap<String, Value>;

/// Shared handle to a scope; namespaces are scopes that double as values.
pub type ScopeRef = Rc<RefCell<Scope>>;

/// A user-defined type's template: evaluated default values and shared
/// method definitions, in declaration order.
#[derive(Debug)]
pub struct TypeTemplate {
    pub name: String,
    pub members: OrderedMap<String, Value>,
}

/// A hashtable key. Keys are strictly integers or strings; the evaluator
/// rejects floats (and everything else) before constructing one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(String),
}

impl Key {
    /// Converts an evaluated key expression into a key.
    ///
    /// # Errors
    /// Returns a type error for float keys and for every non-int, non-string
    /// value.
    pub fn from_value(value: &Value) -> RunResult<Self> {
        match value {
            Value::Int(n) => Ok(Self::Int(*n)),
            Value::Str(s) => Ok(Self::Str(s.to_string())),
            Value::Float(_) => Err(RunError::type_error(
                "Hashtable keys cannot be float, must be integer or string",
            )),
            other => Err(RunError::type_error(format!(
                "Invalid hashtable key type: {}",
                other.type_name()
            ))),
        }
    }

    /// The key as a plain string, used in diagnostics.
    pub fn render(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => s.clone(),
        }
    }

    fn render_repr(&self) -> String {
        match self {
            Self::Int(n) => n.to_string(),
            Self::Str(s) => format!("\"{s}\""),
        }
    }
}

impl From<&Key> for Value {
    fn from(key: &Key) -> Self {
        match key {
            Key::Int(n) => Self::Int(*n),
            Key::Str(s) => Self::Str(Rc::from(s.as_str())),
        }
    }
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
    Hashtable(Rc<RefCell<OrderedMap<Key, Value>>>),
    /// A first-class function; the definition lives in global scope.
    Function(Rc<FunctionDef>),
    /// A user-defined type's template.
    Type(Rc<TypeTemplate>),
    /// An instance record; methods are shared references to definitions.
    Instance(Rc<RefCell<OrderedMap<String, Value>>>),
    /// A namespace record, also pushed as a scope while its body runs.
    Namespace(ScopeRef),
}

/// Containers deeper than this render as an ellipsis, which also keeps
/// self-referential values from recursing forever.
const MAX_RENDER_DEPTH: usize = 32;

impl Value {
    pub fn string(text: impl AsRef<str>) -> Self {
        Self::Str(Rc::from(text.as_ref()))
    }

    pub fn array(elements: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(elements)))
    }

    pub fn hashtable(entries: OrderedMap<Key, Self>) -> Self {
        Self::Hashtable(Rc::new(RefCell::new(entries)))
    }

    /// The language-level type name, as reported by the `type` builtin.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Array(_) => "array",
            Self::Hashtable(_) => "hashtable",
            Self::Function(_) => "function",
            Self::Type(_) => "type",
            Self::Instance(_) => "instance",
            Self::Namespace(_) => "namespace",
        }
    }

    /// Truthiness: null, false, zero, and empty strings/containers are falsy.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(n) => *n != 0,
            Self::Float(f) => *f != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Array(elements) => !elements.borrow().is_empty(),
            Self::Hashtable(entries) => !entries.borrow().is_empty(),
            Self::Function(_) | Self::Type(_) | Self::Instance(_) | Self::Namespace(_) => true,
        }
    }

    /// Structural equality with numeric cross-type comparison (`1 == 1.0`,
    /// `$ == 1`). Functions, types, instances, and namespaces compare by
    /// identity.
    #[must_use]
    pub fn eq_value(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.eq_number(b);
        }
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.eq_value(y))
            }
            (Self::Hashtable(a), Self::Hashtable(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .all(|(key, value)| b.get(key).is_some_and(|other| value.eq_value(other)))
            }
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Type(a), Self::Type(b)) => Rc::ptr_eq(a, b),
            (Self::Instance(a), Self::Instance(b)) => Rc::ptr_eq(a, b),
            (Self::Namespace(a), Self::Namespace(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub(crate) fn as_number(&self) -> Option<Number> {
        match self {
            Self::Bool(b) => Some(Number::Int(i64::from(*b))),
            Self::Int(n) => Some(Number::Int(*n)),
            Self::Float(f) => Some(Number::Float(*f)),
            _ => None,
        }
    }

    /// Renders the value the way `>>` and string coercion see it: strings
    /// bare, everything else in its literal-like form.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Str(s) => s.to_string(),
            other => other.render_repr(),
        }
    }

    /// Renders the value with strings quoted, as used inside containers and
    /// the monolith dump.
    #[must_use]
    pub fn render_repr(&self) -> String {
        let mut out = String::new();
        self.repr_into(&mut out, 0);
        out
    }

    fn repr_into(&self, out: &mut String, depth: usize) {
        if depth > MAX_RENDER_DEPTH {
            out.push_str("...");
            return;
        }
        match self {
            Self::Null => out.push_str("null"),
            Self::Bool(true) => out.push_str("true"),
            Self::Bool(false) => out.push_str("false"),
            Self::Int(n) => {
                let _ = write!(out, "{n}");
            }
            Self::Float(f) => out.push_str(render_float(*f).as_str()),
            Self::Str(s) => {
                let _ = write!(out, "\"{s}\"");
            }
            Self::Array(elements) => {
                out.push('[');
                for (i, element) in elements.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    element.repr_into(out, depth + 1);
                }
                out.push(']');
            }
            Self::Hashtable(entries) => {
                out.push('{');
                for (i, (key, value)) in entries.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&key.render_repr());
                    out.push_str(": ");
                    value.repr_into(out, depth + 1);
                }
                out.push('}');
            }
            Self::Function(def) => {
                let _ = write!(out, "<function {}>", def.name);
            }
            Self::Type(template) => {
                let _ = write!(out, "<type {}>", template.name);
            }
            Self::Instance(record) => {
                out.push('{');
                for (i, (name, value)) in record.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(name);
                    out.push_str(": ");
                    value.repr_into(out, depth + 1);
                }
                out.push('}');
            }
            Self::Namespace(scope) => {
                out.push('{');
                for (i, (name, value)) in scope.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(name);
                    out.push_str(": ");
                    value.repr_into(out, depth + 1);
                }
                out.push('}');
            }
        }
    }
}

/// Formats a float the way the language prints it: shortest round-trip text
/// that keeps a trailing `.0` for whole numbers.
pub(crate) fn render_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_owned();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf".to_owned() } else { "inf".to_owned() };
    }
    ryu::Buffer::new().format(value).to_owned()
}

/// An operand lifted into the numeric domain (booleans count as integers).
#[derive(Debug, Clone, Copy)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Self::Int(n) => n as f64,
            Self::Float(f) => f,
        }
    }

    fn eq_number(self, other: Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

/// Applies a binary operator to two evaluated operands.
///
/// If either operand is a string only `+` (concatenation of the rendered
/// operands), `==`, and `!=` are defined; everything else is reported as an
/// unknown operator. `&&` and `||` evaluate both operands and select one by
/// truthiness. Ordering comparisons are numeric only.
pub(crate) fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> RunResult<Value> {
    if matches!(left, Value::Str(_)) || matches!(right, Value::Str(_)) {
        return match op {
            BinaryOp::Add => Ok(Value::string(format!("{}{}", left.render(), right.render()))),
            BinaryOp::Eq => Ok(Value::Bool(left.eq_value(right))),
            BinaryOp::Ne => Ok(Value::Bool(!left.eq_value(right))),
            _ => Err(RunError::value(format!("Unknown operator: {op}"))),
        };
    }

    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left.eq_value(right))),
        BinaryOp::Ne => return Ok(Value::Bool(!left.eq_value(right))),
        BinaryOp::And => {
            return Ok(if left.truthy() { right.clone() } else { left.clone() });
        }
        BinaryOp::Or => {
            return Ok(if left.truthy() { left.clone() } else { right.clone() });
        }
        _ => {}
    }

    let (Some(a), Some(b)) = (left.as_number(), right.as_number()) else {
        return Err(RunError::type_error(format!(
            "Unsupported operand types for {op}: {} and {}",
            left.type_name(),
            right.type_name()
        )));
    };

    match op {
        BinaryOp::Ge => Ok(Value::Bool(a.as_f64() >= b.as_f64())),
        BinaryOp::Le => Ok(Value::Bool(a.as_f64() <= b.as_f64())),
        BinaryOp::Gt => Ok(Value::Bool(a.as_f64() > b.as_f64())),
        BinaryOp::Lt => Ok(Value::Bool(a.as_f64() < b.as_f64())),
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => arithmetic(op, a, b),
        BinaryOp::Div => divide(a, b),
        BinaryOp::Pow => power(a, b),
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
    }
}

fn arithmetic(op: BinaryOp, a: Number, b: Number) -> RunResult<Value> {
    if let (Number::Int(x), Number::Int(y)) = (a, b) {
        let result = match op {
            BinaryOp::Add => x.checked_add(y),
            BinaryOp::Sub => x.checked_sub(y),
            _ => x.checked_mul(y),
        };
        return result
            .map(Value::Int)
            .ok_or_else(|| RunError::value("Integer overflow"));
    }
    let (x, y) = (a.as_f64(), b.as_f64());
    Ok(Value::Float(match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        _ => x * y,
    }))
}

/// Division always produces a float.
fn divide(a: Number, b: Number) -> RunResult<Value> {
    let divisor = b.as_f64();
    if divisor == 0.0 {
        return Err(RunError::value("division by zero"));
    }
    Ok(Value::Float(a.as_f64() / divisor))
}

/// Exponentiation stays integral for two integers with a non-negative
/// exponent; a negative exponent falls into the float domain.
fn power(a: Number, b: Number) -> RunResult<Value> {
    if let (Number::Int(base), Number::Int(exp)) = (a, b) {
        if exp >= 0 {
            let exp = u32::try_from(exp).map_err(|_| RunError::value("Integer overflow"))?;
            return base
                .checked_pow(exp)
                .map(Value::Int)
                .ok_or_else(|| RunError::value("Integer overflow"));
        }
    }
    Ok(Value::Float(a.as_f64().powf(b.as_f64())))
}
