//! The tree-walking evaluator.
//!
//! Every statement evaluation yields a [`Flow`] outcome so loops and calls
//! can see `break`, `continue`, and `return` deterministically instead of
//! unwinding through the host. Expression evaluation yields plain values.

use std::{cell::RefCell, rc::Rc};

use crate::{
    builtins::{self, Builtin},
    error::{RunError, RunResult},
    io::{PrintWriter, ScanSource},
    monolith::Monolith,
    node::{BinaryOp, FormatPart, FunctionDef, MemberDef, Node, UnaryOp},
    value::{Key, OrderedMap, Scope, TypeTemplate, Value, binary_op},
};

/// How control continues after a statement.
enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

/// A single-threaded interpreter instance.
///
/// Owns the monolith (the scope stack) and borrows the print and scan
/// endpoints for the duration of the run.
pub struct Interpreter<'io, P: PrintWriter, S: ScanSource> {
    monolith: Monolith,
    print: &'io mut P,
    scan: &'io mut S,
}

impl<'io, P: PrintWriter, S: ScanSource> Interpreter<'io, P, S> {
    pub fn new(print: &'io mut P, scan: &'io mut S) -> Self {
        Self {
            monolith: Monolith::new(),
            print,
            scan,
        }
    }

    /// Runs a parsed program to completion.
    ///
    /// A top-level `->` is ignored (there is no call to return from);
    /// top-level `break`/`continue` are errors.
    pub fn run(&mut self, program: &[Node]) -> RunResult<()> {
        for node in program {
            match self.eval_statement(node)? {
                Flow::Normal | Flow::Return(_) => {}
                Flow::Break => return Err(RunError::syntax("` used outside of a loop")),
                Flow::Continue => return Err(RunError::syntax("^ used outside of a loop")),
            }
        }
        Ok(())
    }

    /// Renders the scope stack for the driver's dump mode.
    #[must_use]
    pub fn render_monolith(&self) -> String {
        self.monolith.render()
    }

    fn eval_statement(&mut self, node: &Node) -> RunResult<Flow> {
        match node {
            Node::Assign { name, value } => {
                let value = self.eval(value)?;
                self.monolith.assign(name, value);
                Ok(Flow::Normal)
            }
            Node::CompoundAssign { name, op, value } => {
                let current = self.defined_value(name)?;
                let rhs = self.eval(value)?;
                let updated = binary_op(*op, &current, &rhs)?;
                self.monolith.assign_existing(name, updated);
                Ok(Flow::Normal)
            }
            Node::Increment(name) => self.step_variable(name, BinaryOp::Add),
            Node::Decrement(name) => self.step_variable(name, BinaryOp::Sub),
            Node::ArrayAssign { name, index, value } => {
                let elements = self.array_variable(name)?;
                let index = self.eval(index)?;
                let value = self.eval(value)?;
                let mut elements = elements.borrow_mut();
                let slot = resolve_index(&index, elements.len())?;
                elements[slot] = value;
                Ok(Flow::Normal)
            }
            Node::ArrayAppend { name, value } => {
                let elements = self.array_variable(name)?;
                let value = self.eval(value)?;
                elements.borrow_mut().push(value);
                Ok(Flow::Normal)
            }
            Node::HashtableAssign { name, key, value } => {
                let entries = self.hashtable_variable(name)?;
                let key = Key::from_value(&self.eval(key)?)?;
                let value = self.eval(value)?;
                entries.borrow_mut().insert(key, value);
                Ok(Flow::Normal)
            }
            Node::FunctionDef(def) => {
                self.monolith.define_global(&def.name, Value::Function(Rc::clone(def)));
                Ok(Flow::Normal)
            }
            Node::TypeDef { name, parents, members } => {
                self.define_type(name, parents, members)?;
                Ok(Flow::Normal)
            }
            Node::Instantiate { instance, type_name } => {
                let template = match self.monolith.get(type_name) {
                    Some(Value::Type(template)) => template,
                    _ => {
                        return Err(RunError::type_error(format!("'{type_name}' is not a valid type")));
                    }
                };
                let record = Rc::new(RefCell::new(template.members.clone()));
                self.monolith.define(instance, Value::Instance(record));
                Ok(Flow::Normal)
            }
            Node::MemberAssign { instance, member, value } => {
                let value = self.eval(value)?;
                let record = self.instance_variable(instance)?;
                let mut record = record.borrow_mut();
                let is_method = match record.get(member) {
                    None => {
                        return Err(RunError::name(format!(
                            "'{member}' is not a member of '{instance}'"
                        )));
                    }
                    Some(Value::Function(_)) => true,
                    Some(_) => false,
                };
                if is_method {
                    return Err(RunError::type_error(format!("Cannot re-assign method '{member}'")));
                }
                record.insert(member.clone(), value);
                Ok(Flow::Normal)
            }
            Node::NamespaceDef { name, body } => self.eval_namespace_definition(name, body),
            Node::If { arms, else_body } => self.eval_if(arms, else_body.as_deref()),
            Node::While { condition, body } => self.eval_while(condition, body),
            Node::For { iterator, limit, body } => self.eval_for(iterator, limit, body),
            Node::Break => Ok(Flow::Break),
            Node::Continue => Ok(Flow::Continue),
            Node::Return(value) => {
                let value = self.eval(value)?;
                Ok(Flow::Return(value))
            }
            Node::Print(arguments) => {
                let values = self.eval_arguments(arguments)?;
                builtins::write_line(self.print, &values)?;
                Ok(Flow::Normal)
            }
            Node::Assert(condition) => {
                self.eval_assert(condition)?;
                Ok(Flow::Normal)
            }
            Node::RaiseError(message) => {
                let message = self.eval(message)?;
                Err(RunError::raised(message.render()))
            }
            expression => {
                self.eval(expression)?;
                Ok(Flow::Normal)
            }
        }
    }

    /// Evaluates an expression node to a value.
    fn eval(&mut self, node: &Node) -> RunResult<Value> {
        match node {
            Node::Int(n) => Ok(Value::Int(*n)),
            Node::Float(f) => Ok(Value::Float(*f)),
            Node::Str(s) => Ok(Value::string(s)),
            Node::Bool(b) => Ok(Value::Bool(*b)),
            Node::Null => Ok(Value::Null),
            Node::FormattedStr(parts) => self.eval_formatted_string(parts),
            Node::Array(elements) => {
                let values = self.eval_arguments(elements)?;
                Ok(Value::array(values))
            }
            Node::Hashtable(entries) => {
                let mut table = OrderedMap::default();
                for (key, value) in entries {
                    let key = Key::from_value(&self.eval(key)?)?;
                    let value = self.eval(value)?;
                    table.insert(key, value);
                }
                Ok(Value::hashtable(table))
            }
            Node::Range { start, end } => self.eval_range(start, end),
            Node::Identifier(name) => self.defined_value(name),
            Node::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                binary_op(*op, &left, &right)
            }
            Node::Unary { op, operand } => self.eval_unary(*op, operand),
            Node::ArrayLookup { target, index } => self.eval_array_lookup(target, index),
            Node::HashtableLookup { target, key } => self.eval_hashtable_lookup(target, key),
            Node::Call { name, arguments } => self.call_function(name, arguments),
            Node::MethodCall {
                instance,
                method,
                arguments,
            } => self.call_method(instance, method, arguments),
            Node::MemberLookup { instance, member } => {
                let record = self.instance_variable(instance)?;
                let member_value = record.borrow().get(member).cloned();
                member_value.ok_or_else(|| {
                    RunError::name(format!("'{member}' is not a member of '{instance}'"))
                })
            }
            Node::NamespaceAccess { namespace, name } => self.eval_namespace_access(namespace, name),
            Node::Scan(prompt) => {
                let prompt = match prompt {
                    Some(node) => Some(self.eval(node)?.render()),
                    None => None,
                };
                builtins::scan_line(self.print, self.scan, prompt.as_deref()).map(Value::string)
            }
            other => Err(RunError::value(format!("Unknown primitive: {other:?}"))),
        }
    }

    fn eval_arguments(&mut self, nodes: &[Node]) -> RunResult<Vec<Value>> {
        nodes.iter().map(|node| self.eval(node)).collect()
    }

    /// `++` / `--`: the binding must exist and hold a number.
    fn step_variable(&mut self, name: &str, op: BinaryOp) -> RunResult<Flow> {
        let current = self.defined_value(name)?;
        if current.as_number().is_none() {
            let verb = if op == BinaryOp::Add { "increment" } else { "decrement" };
            return Err(RunError::type_error(format!(
                "Cannot {verb} {}",
                current.type_name()
            )));
        }
        let updated = binary_op(op, &current, &Value::Int(1))?;
        self.monolith.assign_existing(name, updated);
        Ok(Flow::Normal)
    }

    /// Reads a name that must already be bound somewhere on the monolith.
    fn defined_value(&self, name: &str) -> RunResult<Value> {
        self.monolith
            .get(name)
            .ok_or_else(|| RunError::name(format!("Variable '{name}' is not defined")))
    }

    fn eval_formatted_string(&mut self, parts: &[FormatPart]) -> RunResult<Value> {
        let mut out = String::new();
        for part in parts {
            match part {
                FormatPart::Fragment(text) => out.push_str(text),
                FormatPart::Expr(node) => out.push_str(&self.eval(node)?.render()),
            }
        }
        Ok(Value::string(out))
    }

    /// `a...b` is inclusive on both ends; direction follows the endpoints
    /// and non-integer endpoints truncate.
    fn eval_range(&mut self, start: &Node, end: &Node) -> RunResult<Value> {
        let start = self.range_endpoint(start)?;
        let end = self.range_endpoint(end)?;
        let values: Vec<Value> = if start <= end {
            (start..=end).map(Value::Int).collect()
        } else {
            (end..=start).rev().map(Value::Int).collect()
        };
        Ok(Value::array(values))
    }

    fn range_endpoint(&mut self, node: &Node) -> RunResult<i64> {
        let value = self.eval(node)?;
        match value.as_number() {
            Some(number) => Ok(number.as_f64().trunc() as i64),
            None => Err(RunError::type_error(format!(
                "Range endpoints must be numbers, got {}",
                value.type_name()
            ))),
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Node) -> RunResult<Value> {
        let value = self.eval(operand)?;
        match op {
            UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
            UnaryOp::Neg => match value {
                Value::Int(n) => n
                    .checked_neg()
                    .map(Value::Int)
                    .ok_or_else(|| RunError::value("Integer overflow")),
                Value::Float(f) => Ok(Value::Float(-f)),
                Value::Bool(b) => Ok(Value::Int(-i64::from(b))),
                other => Err(RunError::type_error(format!(
                    "Cannot negate non-numeric type {}",
                    other.type_name()
                ))),
            },
        }
    }

    // --- containers ---

    /// Resolves a named variable that must hold an array.
    fn array_variable(&self, name: &str) -> RunResult<Rc<RefCell<Vec<Value>>>> {
        match self.monolith.get(name) {
            Some(Value::Array(elements)) => Ok(elements),
            Some(_) => Err(RunError::type_error(format!("Variable {name} is not an array"))),
            None => Err(RunError::name(format!("Array '{name}' is not defined"))),
        }
    }

    /// Resolves a named variable that must hold a hashtable.
    fn hashtable_variable(&self, name: &str) -> RunResult<Rc<RefCell<OrderedMap<Key, Value>>>> {
        match self.monolith.get(name) {
            Some(Value::Hashtable(entries)) => Ok(entries),
            Some(_) => Err(RunError::type_error(format!("Variable {name} is not a hashtable"))),
            None => Err(RunError::name(format!("Hashtable '{name}' is not defined"))),
        }
    }

    /// Resolves a named variable that must hold an instance record.
    fn instance_variable(&self, name: &str) -> RunResult<Rc<RefCell<OrderedMap<String, Value>>>> {
        match self.monolith.get(name) {
            Some(Value::Instance(record)) => Ok(record),
            Some(_) => Err(RunError::type_error(format!("'{name}' is not an instance"))),
            None => Err(RunError::name(format!("Variable '{name}' is not defined"))),
        }
    }

    fn eval_array_lookup(&mut self, target: &Node, index: &Node) -> RunResult<Value> {
        let elements = match target {
            Node::Identifier(name) => self.array_variable(name)?,
            nested => match self.eval(nested)? {
                Value::Array(elements) => elements,
                other => {
                    return Err(RunError::type_error(format!(
                        "Cannot index into {}",
                        other.type_name()
                    )));
                }
            },
        };
        let index = self.eval(index)?;
        let elements = elements.borrow();
        let slot = resolve_index(&index, elements.len())?;
        Ok(elements[slot].clone())
    }

    fn eval_hashtable_lookup(&mut self, target: &Node, key: &Node) -> RunResult<Value> {
        let entries = match target {
            Node::Identifier(name) => self.hashtable_variable(name)?,
            nested => match self.eval(nested)? {
                Value::Hashtable(entries) => entries,
                other => {
                    return Err(RunError::type_error(format!(
                        "Cannot key into {}",
                        other.type_name()
                    )));
                }
            },
        };
        let key = Key::from_value(&self.eval(key)?)?;
        let value = entries.borrow().get(&key).cloned();
        value.ok_or_else(|| RunError::key(format!("Key {} not found in hashtable", key.render())))
    }

    // --- calls ---

    fn call_function(&mut self, name: &str, arguments: &[Node]) -> RunResult<Value> {
        let args = self.eval_arguments(arguments)?;
        if let Some(builtin) = Builtin::resolve(name) {
            return builtin.call(args, self.print, self.scan);
        }
        match self.monolith.get_global(name) {
            Some(Value::Function(def)) => {
                if def.parameters.len() != args.len() {
                    return Err(RunError::value(format!(
                        "Incorrect number of arguments for function {name}"
                    )));
                }
                self.invoke(&def, args, None)
            }
            Some(_) => Err(RunError::type_error(format!("'{name}' is not a function"))),
            None => Err(RunError::value(format!("Unknown function: {name}"))),
        }
    }

    fn call_method(&mut self, instance: &str, method: &str, arguments: &[Node]) -> RunResult<Value> {
        let args = self.eval_arguments(arguments)?;
        let record = self.instance_variable(instance)?;
        let member = record.borrow().get(method).cloned();
        let Some(member) = member else {
            return Err(RunError::name(format!("'{method}' is not a member of '{instance}'")));
        };
        let Value::Function(def) = member else {
            return Err(RunError::type_error(format!("'{method}' is not a method")));
        };
        if def.parameters.len() != args.len() {
            return Err(RunError::value(format!(
                "Incorrect number of arguments for method '{method}'"
            )));
        }
        self.invoke(&def, args, Some(Value::Instance(record)))
    }

    /// Runs a function or method body in a fresh scope, binding `this`
    /// first when present. The scope is popped on every exit path.
    fn invoke(&mut self, def: &FunctionDef, args: Vec<Value>, this: Option<Value>) -> RunResult<Value> {
        self.monolith.push();
        let result = self.run_call_body(def, args, this);
        self.monolith.pop();
        result
    }

    fn run_call_body(&mut self, def: &FunctionDef, args: Vec<Value>, this: Option<Value>) -> RunResult<Value> {
        if let Some(instance) = this {
            self.monolith.define("this", instance);
        }
        for (parameter, argument) in def.parameters.iter().zip(args) {
            self.monolith.define(parameter, argument);
        }
        match self.run_block(&def.body)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
            Flow::Break => Err(RunError::syntax("` used outside of a loop")),
            Flow::Continue => Err(RunError::syntax("^ used outside of a loop")),
        }
    }

    // --- types and namespaces ---

    fn define_type(&mut self, name: &str, parents: &[String], members: &[(String, MemberDef)]) -> RunResult<()> {
        let mut template: OrderedMap<String, Value> = OrderedMap::default();
        for parent in parents {
            match self.monolith.get(parent) {
                Some(Value::Type(parent_template)) => {
                    for (member, value) in &parent_template.members {
                        template.insert(member.clone(), value.clone());
                    }
                }
                _ => return Err(RunError::type_error(format!("'{parent}' is not a valid type"))),
            }
        }
        for (member, definition) in members {
            let value = match definition {
                MemberDef::Value(node) => self.eval(node)?,
                MemberDef::Method(def) => Value::Function(Rc::clone(def)),
            };
            template.insert(member.clone(), value);
        }
        self.monolith.define_global(
            name,
            Value::Type(Rc::new(TypeTemplate {
                name: name.to_owned(),
                members: template,
            })),
        );
        Ok(())
    }

    fn eval_namespace_definition(&mut self, name: &str, body: &[Node]) -> RunResult<Flow> {
        let global = self.monolith.global();
        let existing = global.borrow().get(name).cloned();
        let scope = match existing {
            Some(Value::Namespace(scope)) => scope,
            Some(_) => {
                return Err(RunError::type_error(format!("'{name}' is not a namespace")));
            }
            None => {
                let scope = Rc::new(RefCell::new(Scope::default()));
                global
                    .borrow_mut()
                    .insert(name.to_owned(), Value::Namespace(Rc::clone(&scope)));
                scope
            }
        };
        self.monolith.push_shared(scope);
        let flow = self.run_block(body);
        self.monolith.pop();
        flow
    }

    fn eval_namespace_access(&self, namespace: &str, name: &str) -> RunResult<Value> {
        if let Some(Value::Namespace(scope)) = self.monolith.get_global(namespace) {
            if let Some(value) = scope.borrow().get(name) {
                return Ok(value.clone());
            }
        }
        Err(RunError::name(format!(
            "'{name}' not found in namespace '{namespace}'"
        )))
    }

    // --- control flow ---

    fn run_block(&mut self, body: &[Node]) -> RunResult<Flow> {
        for node in body {
            match self.eval_statement(node)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    /// Runs a block in a fresh scope, popping it on every exit path.
    fn run_scoped_block(&mut self, body: &[Node]) -> RunResult<Flow> {
        self.monolith.push();
        let flow = self.run_block(body);
        self.monolith.pop();
        flow
    }

    fn eval_if(&mut self, arms: &[(Node, Vec<Node>)], else_body: Option<&[Node]>) -> RunResult<Flow> {
        for (condition, body) in arms {
            if self.eval(condition)?.truthy() {
                return self.run_scoped_block(body);
            }
        }
        match else_body {
            Some(body) => self.run_scoped_block(body),
            None => Ok(Flow::Normal),
        }
    }

    fn eval_while(&mut self, condition: &Node, body: &[Node]) -> RunResult<Flow> {
        while self.eval(condition)?.truthy() {
            match self.run_scoped_block(body)? {
                Flow::Break => break,
                Flow::Normal | Flow::Continue => {}
                returned @ Flow::Return(_) => return Ok(returned),
            }
        }
        Ok(Flow::Normal)
    }

    fn eval_for(&mut self, iterator: &str, limit: &Node, body: &[Node]) -> RunResult<Flow> {
        let limit = self.eval(limit)?;
        // snapshots keep iteration stable while the body mutates the container
        let items: Vec<Value> = match limit {
            Value::Int(n) => (0..n).map(Value::Int).collect(),
            Value::Array(elements) => elements.borrow().clone(),
            Value::Hashtable(entries) => entries.borrow().keys().map(Value::from).collect(),
            other => {
                return Err(RunError::type_error(format!(
                    "Cannot iterate through {}",
                    other.type_name()
                )));
            }
        };
        for item in items {
            self.monolith.push();
            self.monolith.define(iterator, item);
            let flow = self.run_block(body);
            self.monolith.pop();
            match flow? {
                Flow::Break => break,
                Flow::Normal | Flow::Continue => {}
                returned @ Flow::Return(_) => return Ok(returned),
            }
        }
        Ok(Flow::Normal)
    }

    /// `! cond;` — failure renders a comparison's operands, or the value.
    fn eval_assert(&mut self, condition: &Node) -> RunResult<()> {
        if let Node::Binary { op, left, right } = condition {
            let left = self.eval(left)?;
            let right = self.eval(right)?;
            let result = binary_op(*op, &left, &right)?;
            if !result.truthy() {
                return Err(RunError::assertion(format!(
                    "Assertion failed: {} {op} {}",
                    left.render(),
                    right.render()
                )));
            }
            return Ok(());
        }
        let value = self.eval(condition)?;
        if value.truthy() {
            Ok(())
        } else {
            Err(RunError::assertion(format!("Assertion failed: {}", value.render())))
        }
    }
}

/// Resolves an evaluated index against an array length. Negative indices
/// count from the end.
fn resolve_index(index: &Value, len: usize) -> RunResult<usize> {
    let Value::Int(index) = index else {
        return Err(RunError::type_error("Array indices must be integers"));
    };
    let len = len as i64;
    let adjusted = if *index < 0 { index.saturating_add(len) } else { *index };
    if adjusted < 0 || adjusted >= len {
        return Err(RunError::value(format!("Array index {index} out of range")));
    }
    Ok(adjusted as usize)
}
