//! Recursive-descent parser from tokens to syntax tree.
//!
//! Statements are dispatched on the first token plus one- and two-token
//! lookahead; expressions climb the precedence ladder `||` < `&&` < `!` <
//! comparisons < `+ -` < `* /` < `**` < prefix `-` < primaries.
//! Exponentiation is parsed left-associatively: `2 ** 3 ** 2` is
//! `(2 ** 3) ** 2`.

use std::rc::Rc;

use crate::{
    error::{RunError, RunResult},
    lexer::{Token, TokenKind},
    node::{BinaryOp, FormatPart, FunctionDef, MemberDef, Node, UnaryOp},
};

/// Parses a token stream into the program's statement list.
///
/// # Errors
/// Returns a syntax error on any malformed statement or expression.
pub fn parse(tokens: Vec<Token>) -> RunResult<Vec<Node>> {
    let mut parser = Parser { tokens, current: 0 };
    let mut nodes = Vec::new();
    while !parser.at_end() {
        nodes.push(parser.parse_statement()?);
    }
    Ok(nodes)
}

struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current)
    }

    /// Kind of the token `offset` places ahead of the cursor.
    fn predict(&self, offset: usize) -> Option<TokenKind> {
        self.tokens.get(self.current + offset).map(|token| token.kind)
    }

    fn matches(&self, kind: TokenKind) -> bool {
        self.predict(0) == Some(kind)
    }

    fn matches_any(&self, kinds: &[TokenKind]) -> bool {
        self.predict(0).is_some_and(|kind| kinds.contains(&kind))
    }

    /// Consumes the current token, which must be of `kind`, and returns its lexeme.
    fn consume(&mut self, kind: TokenKind) -> RunResult<String> {
        match self.peek() {
            Some(token) if token.kind == kind => {
                let lexeme = token.lexeme.clone();
                self.current += 1;
                Ok(lexeme)
            }
            Some(token) => Err(RunError::syntax(format!(
                "Expected {kind}, found {}",
                describe(token)
            ))),
            None => Err(RunError::syntax(format!("Expected {kind}, found end of input"))),
        }
    }

    fn consume_any(&mut self) -> RunResult<Token> {
        if let Some(token) = self.peek() {
            let token = token.clone();
            self.current += 1;
            Ok(token)
        } else {
            Err(RunError::syntax("Unexpected end of input"))
        }
    }

    fn parse_statement(&mut self) -> RunResult<Node> {
        use TokenKind::*;
        let Some(kind) = self.predict(0) else {
            return Err(RunError::syntax("Unexpected end of input"));
        };
        match kind {
            While => self.parse_while_statement(),
            Not => self.terminated(Self::parse_assert_statement),
            Raise => self.terminated(Self::parse_raise_statement),
            Continue => {
                self.consume(Continue)?;
                self.consume(Semicolon)?;
                Ok(Node::Continue)
            }
            Break => {
                self.consume(Break)?;
                self.consume(Semicolon)?;
                Ok(Node::Break)
            }
            If => self.parse_if_statement(),
            Print => self.terminated(Self::parse_print_statement),
            Namespace => {
                if self.predict(1) == Some(Identifier) && self.predict(2) == Some(LeftBrace) {
                    self.parse_namespace_definition()
                } else {
                    // bare namespace access, e.g. `::Config#debug;`
                    self.terminated(Self::parse_expression)
                }
            }
            Return => self.terminated(Self::parse_return_statement),
            TypeName => self.terminated(Self::parse_type_definition),
            Identifier => self.parse_identifier_statement(),
            _ => {
                let token = self.peek().expect("peeked above");
                Err(RunError::syntax(format!("Unexpected token: {}", describe(token))))
            }
        }
    }

    /// Parses a statement form that must be followed by a semicolon.
    fn terminated(&mut self, inner: fn(&mut Self) -> RunResult<Node>) -> RunResult<Node> {
        let node = inner(self)?;
        self.consume(TokenKind::Semicolon)?;
        Ok(node)
    }

    /// Dispatches the many statement forms that begin with an identifier.
    fn parse_identifier_statement(&mut self) -> RunResult<Node> {
        use TokenKind::*;
        if self.predict(1) == Some(For) {
            return self.parse_for_statement();
        }
        if self.predict(1) == Some(Assign) && self.predict(2) == Some(TypeName) {
            return self.terminated(Self::parse_instantiation);
        }
        match self.predict(1) {
            Some(Assign) => self.terminated(Self::parse_assignment),
            Some(Scan) => self.terminated(Self::parse_scan_assignment),
            Some(Increment) => self.terminated(|p| {
                let name = p.consume(Identifier)?;
                p.consume(Increment)?;
                Ok(Node::Increment(name))
            }),
            Some(Decrement) => self.terminated(|p| {
                let name = p.consume(Identifier)?;
                p.consume(Decrement)?;
                Ok(Node::Decrement(name))
            }),
            Some(AddAssign) => self.terminated(|p| p.parse_compound_assignment(AddAssign, BinaryOp::Add)),
            Some(SubAssign) => self.terminated(|p| p.parse_compound_assignment(SubAssign, BinaryOp::Sub)),
            Some(MulAssign) => self.terminated(|p| p.parse_compound_assignment(MulAssign, BinaryOp::Mul)),
            Some(DivAssign) => self.terminated(|p| p.parse_compound_assignment(DivAssign, BinaryOp::Div)),
            Some(PowAssign) => self.terminated(|p| p.parse_compound_assignment(PowAssign, BinaryOp::Pow)),
            Some(LeftParen) => self.terminated(Self::parse_function_call),
            Some(LeftBracket) => self.terminated(Self::parse_array_assignment),
            Some(Append) => self.terminated(Self::parse_array_append),
            Some(Period) if self.predict(2) == Some(Identifier) && self.predict(3) == Some(LeftParen) => {
                self.terminated(Self::parse_method_call)
            }
            Some(Period) if self.predict(2) == Some(Identifier) => {
                self.terminated(Self::parse_member_statement)
            }
            Some(Reference) => self.terminated(Self::parse_reference_statement),
            Some(Parameter | LeftBrace) => self.parse_function_definition(),
            _ => self.terminated(Self::parse_expression),
        }
    }

    /// A statement starting `ident # …`: either a hashtable store or a bare
    /// lookup-chain expression, decided by whether `=` follows the chain.
    fn parse_reference_statement(&mut self) -> RunResult<Node> {
        let expression = self.parse_expression()?;
        if !self.matches(TokenKind::Assign) {
            return Ok(expression);
        }
        self.consume(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        match expression {
            Node::HashtableLookup { target, key } => match *target {
                Node::Identifier(name) => Ok(Node::HashtableAssign {
                    name,
                    key,
                    value: Box::new(value),
                }),
                _ => Err(RunError::syntax("Hashtable assignment target must be a variable")),
            },
            _ => Err(RunError::syntax("Invalid assignment target")),
        }
    }

    fn parse_assert_statement(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::Not)?;
        let condition = self.parse_expression()?;
        Ok(Node::Assert(Box::new(condition)))
    }

    fn parse_raise_statement(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::Raise)?;
        let message = self.parse_expression()?;
        Ok(Node::RaiseError(Box::new(message)))
    }

    fn parse_print_statement(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::Print)?;
        let mut arguments = vec![self.parse_expression()?];
        while self.matches(TokenKind::Comma) {
            self.consume(TokenKind::Comma)?;
            arguments.push(self.parse_expression()?);
        }
        Ok(Node::Print(arguments))
    }

    fn parse_scan_assignment(&mut self) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Scan)?;
        let prompt = if self.matches(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_expression()?))
        };
        Ok(Node::Assign {
            name,
            value: Box::new(Node::Scan(prompt)),
        })
    }

    fn parse_return_statement(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::Return)?;
        let value = self.parse_expression()?;
        Ok(Node::Return(Box::new(value)))
    }

    fn parse_assignment(&mut self) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        Ok(Node::Assign {
            name,
            value: Box::new(value),
        })
    }

    fn parse_compound_assignment(&mut self, token: TokenKind, op: BinaryOp) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        self.consume(token)?;
        let value = self.parse_expression()?;
        Ok(Node::CompoundAssign {
            name,
            op,
            value: Box::new(value),
        })
    }

    fn parse_array_assignment(&mut self) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::LeftBracket)?;
        let index = self.parse_expression()?;
        self.consume(TokenKind::RightBracket)?;
        self.consume(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        Ok(Node::ArrayAssign {
            name,
            index: Box::new(index),
            value: Box::new(value),
        })
    }

    fn parse_array_append(&mut self) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Append)?;
        let value = self.parse_expression()?;
        Ok(Node::ArrayAppend {
            name,
            value: Box::new(value),
        })
    }

    fn parse_function_definition(&mut self) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        let parameters = self.parse_parameter_list()?;
        let body = self.parse_block()?;
        Ok(Node::FunctionDef(Rc::new(FunctionDef {
            name,
            parameters,
            body,
        })))
    }

    fn parse_parameter_list(&mut self) -> RunResult<Vec<String>> {
        let mut parameters = Vec::new();
        while self.matches(TokenKind::Parameter) {
            self.consume(TokenKind::Parameter)?;
            parameters.push(self.consume(TokenKind::Identifier)?);
        }
        Ok(parameters)
    }

    /// A `{ … }` statement block.
    fn parse_block(&mut self) -> RunResult<Vec<Node>> {
        self.consume(TokenKind::LeftBrace)?;
        let mut body = Vec::new();
        while !self.matches(TokenKind::RightBrace) {
            if self.at_end() {
                return Err(RunError::syntax("Expected }, found end of input"));
            }
            body.push(self.parse_statement()?);
        }
        self.consume(TokenKind::RightBrace)?;
        Ok(body)
    }

    fn parse_function_call(&mut self) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        let arguments = self.parse_argument_list()?;
        Ok(Node::Call { name, arguments })
    }

    fn parse_argument_list(&mut self) -> RunResult<Vec<Node>> {
        self.consume(TokenKind::LeftParen)?;
        let mut arguments = Vec::new();
        if !self.matches(TokenKind::RightParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if self.matches(TokenKind::Comma) {
                    self.consume(TokenKind::Comma)?;
                } else {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen)?;
        Ok(arguments)
    }

    fn parse_if_statement(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::If)?;
        let mut arms = Vec::new();
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        arms.push((condition, body));

        while self.matches(TokenKind::Comma) {
            self.consume(TokenKind::Comma)?;
            let condition = self.parse_expression()?;
            let body = self.parse_block()?;
            arms.push((condition, body));
        }

        let else_body = if self.matches(TokenKind::Colon) {
            self.consume(TokenKind::Colon)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Node::If { arms, else_body })
    }

    fn parse_while_statement(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::While)?;
        let condition = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Node::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_for_statement(&mut self) -> RunResult<Node> {
        let iterator = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::For)?;
        let limit = self.parse_expression()?;
        let body = self.parse_block()?;
        Ok(Node::For {
            iterator,
            limit: Box::new(limit),
            body,
        })
    }

    fn parse_namespace_definition(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::Namespace)?;
        let name = self.consume(TokenKind::Identifier)?;
        let body = self.parse_block()?;
        Ok(Node::NamespaceDef { name, body })
    }

    fn parse_namespace_access(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::Namespace)?;
        let namespace = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Reference)?;
        let name = self.consume(TokenKind::Identifier)?;
        Ok(Node::NamespaceAccess { namespace, name })
    }

    fn parse_type_definition(&mut self) -> RunResult<Node> {
        let name = self.consume_type_name()?;
        let mut parents = Vec::new();
        while self.matches(TokenKind::Parameter) {
            self.consume(TokenKind::Parameter)?;
            parents.push(self.consume_type_name()?);
        }
        self.consume(TokenKind::Assign)?;
        self.consume(TokenKind::LeftBrace)?;

        let mut members = Vec::new();
        while !self.matches(TokenKind::RightBrace) {
            if self.at_end() {
                return Err(RunError::syntax("Expected }, found end of input"));
            }
            let member_name = self.consume(TokenKind::Identifier)?;
            self.consume(TokenKind::Colon)?;
            let member = if self.matches_any(&[TokenKind::LeftBrace, TokenKind::Parameter]) {
                MemberDef::Method(self.parse_method_definition(member_name.clone())?)
            } else {
                MemberDef::Value(self.parse_expression()?)
            };
            members.push((member_name, member));
            if self.matches(TokenKind::Comma) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RightBrace)?;
        Ok(Node::TypeDef { name, parents, members })
    }

    /// Consumes a `<Name>` token and returns the interior name.
    fn consume_type_name(&mut self) -> RunResult<String> {
        let lexeme = self.consume(TokenKind::TypeName)?;
        Ok(lexeme[1..lexeme.len() - 1].to_owned())
    }

    fn parse_method_definition(&mut self, name: String) -> RunResult<Rc<FunctionDef>> {
        let parameters = self.parse_parameter_list()?;
        let body = self.parse_block()?;
        Ok(Rc::new(FunctionDef {
            name,
            parameters,
            body,
        }))
    }

    fn parse_instantiation(&mut self) -> RunResult<Node> {
        let instance = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Assign)?;
        let type_name = self.consume_type_name()?;
        Ok(Node::Instantiate { instance, type_name })
    }

    /// A statement starting `ident . member`: either a member store or a
    /// bare member expression, decided by whether `=` follows.
    fn parse_member_statement(&mut self) -> RunResult<Node> {
        let expression = self.parse_expression()?;
        if !self.matches(TokenKind::Assign) {
            return Ok(expression);
        }
        self.consume(TokenKind::Assign)?;
        let value = self.parse_expression()?;
        match expression {
            Node::MemberLookup { instance, member } => Ok(Node::MemberAssign {
                instance,
                member,
                value: Box::new(value),
            }),
            _ => Err(RunError::syntax("Invalid assignment target")),
        }
    }

    fn parse_member_lookup(&mut self) -> RunResult<Node> {
        let instance = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Period)?;
        let member = self.consume(TokenKind::Identifier)?;
        Ok(Node::MemberLookup { instance, member })
    }

    fn parse_method_call(&mut self) -> RunResult<Node> {
        let instance = self.consume(TokenKind::Identifier)?;
        self.consume(TokenKind::Period)?;
        let method = self.consume(TokenKind::Identifier)?;
        let arguments = self.parse_argument_list()?;
        Ok(Node::MethodCall {
            instance,
            method,
            arguments,
        })
    }

    // --- expression precedence ladder ---

    fn parse_expression(&mut self) -> RunResult<Node> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> RunResult<Node> {
        let mut left = self.parse_and()?;
        while self.matches(TokenKind::Or) {
            self.consume(TokenKind::Or)?;
            let right = self.parse_and()?;
            left = binary(BinaryOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> RunResult<Node> {
        let mut left = self.parse_not()?;
        while self.matches(TokenKind::And) {
            self.consume(TokenKind::And)?;
            let right = self.parse_not()?;
            left = binary(BinaryOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> RunResult<Node> {
        if self.matches(TokenKind::Not) {
            self.consume(TokenKind::Not)?;
            let operand = self.parse_not()?;
            Ok(Node::Unary {
                op: UnaryOp::Not,
                operand: Box::new(operand),
            })
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> RunResult<Node> {
        use TokenKind::*;
        let mut left = self.parse_addition_subtraction()?;
        while self.matches_any(&[Equality, NotEqual, GreaterEqual, LessEqual, Greater, Less]) {
            let op = match self.consume_any()?.kind {
                Equality => BinaryOp::Eq,
                NotEqual => BinaryOp::Ne,
                GreaterEqual => BinaryOp::Ge,
                LessEqual => BinaryOp::Le,
                Greater => BinaryOp::Gt,
                _ => BinaryOp::Lt,
            };
            let right = self.parse_addition_subtraction()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_addition_subtraction(&mut self) -> RunResult<Node> {
        let mut left = self.parse_multiplication_division()?;
        while self.matches_any(&[TokenKind::Plus, TokenKind::Minus]) {
            let op = if self.consume_any()?.kind == TokenKind::Plus {
                BinaryOp::Add
            } else {
                BinaryOp::Sub
            };
            let right = self.parse_multiplication_division()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplication_division(&mut self) -> RunResult<Node> {
        let mut left = self.parse_exponentiation()?;
        while self.matches_any(&[TokenKind::Star, TokenKind::Slash]) {
            let op = if self.consume_any()?.kind == TokenKind::Star {
                BinaryOp::Mul
            } else {
                BinaryOp::Div
            };
            let right = self.parse_exponentiation()?;
            left = binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_exponentiation(&mut self) -> RunResult<Node> {
        let mut left = self.parse_primary()?;
        while self.matches(TokenKind::Pow) {
            self.consume(TokenKind::Pow)?;
            let right = self.parse_primary()?;
            left = binary(BinaryOp::Pow, left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> RunResult<Node> {
        use TokenKind::*;
        let Some(kind) = self.predict(0) else {
            return Err(RunError::syntax("Unexpected end of input"));
        };
        match kind {
            Identifier => self.parse_identifier_primary(),
            Number => self.parse_number(),
            Str => {
                let lexeme = self.consume(Str)?;
                Ok(Node::Str(unescape_string(&lexeme)))
            }
            Formatted => self.parse_formatted_string(),
            Minus => {
                self.consume(Minus)?;
                let operand = self.parse_primary()?;
                Ok(Node::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            LeftParen => {
                self.consume(LeftParen)?;
                let expression = self.parse_expression()?;
                self.consume(RightParen)?;
                Ok(expression)
            }
            LeftBracket => self.parse_array_literal(),
            LeftBrace => self.parse_hashtable_literal(),
            Null => {
                self.consume(Null)?;
                Ok(Node::Null)
            }
            True => {
                self.consume(True)?;
                Ok(Node::Bool(true))
            }
            False => {
                self.consume(False)?;
                Ok(Node::Bool(false))
            }
            Namespace if self.predict(1) == Some(Identifier) && self.predict(2) == Some(Reference) => {
                self.parse_namespace_access()
            }
            _ => {
                let token = self.peek().expect("peeked above");
                Err(RunError::syntax(format!(
                    "Expected number, variable, or parentheses, got {}",
                    describe(token)
                )))
            }
        }
    }

    fn parse_identifier_primary(&mut self) -> RunResult<Node> {
        use TokenKind::*;
        match self.predict(1) {
            Some(LeftBracket | Reference) => self.parse_lookup_chain(),
            Some(Period) if self.predict(2) == Some(Identifier) && self.predict(3) == Some(LeftParen) => {
                self.parse_method_call()
            }
            Some(Period) if self.predict(2) == Some(Identifier) => self.parse_member_lookup(),
            Some(LeftParen) => self.parse_function_call(),
            _ => Ok(Node::Identifier(self.consume(Identifier)?)),
        }
    }

    /// An identifier followed by any mix of `[index]` and `#key` suffixes.
    fn parse_lookup_chain(&mut self) -> RunResult<Node> {
        let name = self.consume(TokenKind::Identifier)?;
        let mut node = Node::Identifier(name);
        loop {
            if self.matches(TokenKind::LeftBracket) {
                self.consume(TokenKind::LeftBracket)?;
                let index = self.parse_expression()?;
                self.consume(TokenKind::RightBracket)?;
                node = Node::ArrayLookup {
                    target: Box::new(node),
                    index: Box::new(index),
                };
            } else if self.matches(TokenKind::Reference) {
                self.consume(TokenKind::Reference)?;
                let key = self.parse_expression()?;
                node = Node::HashtableLookup {
                    target: Box::new(node),
                    key: Box::new(key),
                };
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_number(&mut self) -> RunResult<Node> {
        let lexeme = self.consume(TokenKind::Number)?;
        let start = if lexeme.contains('.') {
            let value: f64 = lexeme
                .parse()
                .map_err(|_| RunError::syntax(format!("Invalid number literal: {lexeme}")))?;
            Node::Float(value)
        } else {
            let value: i64 = lexeme
                .parse()
                .map_err(|_| RunError::syntax(format!("Number literal out of range: {lexeme}")))?;
            Node::Int(value)
        };
        if self.matches(TokenKind::Range) {
            self.consume(TokenKind::Range)?;
            let end = self.parse_primary()?;
            return Ok(Node::Range {
                start: Box::new(start),
                end: Box::new(end),
            });
        }
        Ok(start)
    }

    fn parse_array_literal(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::LeftBracket)?;
        let mut elements = Vec::new();
        if !self.matches(TokenKind::RightBracket) {
            loop {
                elements.push(self.parse_expression()?);
                if self.matches(TokenKind::Comma) {
                    self.consume(TokenKind::Comma)?;
                } else {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightBracket)?;
        Ok(Node::Array(elements))
    }

    fn parse_hashtable_literal(&mut self) -> RunResult<Node> {
        self.consume(TokenKind::LeftBrace)?;
        let mut entries = Vec::new();
        while !self.matches(TokenKind::RightBrace) {
            if self.at_end() {
                return Err(RunError::syntax("Expected }, found end of input"));
            }
            let key = self.parse_expression()?;
            self.consume(TokenKind::Colon)?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.matches(TokenKind::RightBrace) {
                self.consume(TokenKind::Comma)?;
            }
        }
        self.consume(TokenKind::RightBrace)?;
        Ok(Node::Hashtable(entries))
    }

    /// Consecutive fragment tokens and `{ expression }` groups form one
    /// formatted string.
    fn parse_formatted_string(&mut self) -> RunResult<Node> {
        let mut parts = Vec::new();
        while self.matches_any(&[TokenKind::Formatted, TokenKind::LeftBrace]) {
            if self.matches(TokenKind::Formatted) {
                parts.push(FormatPart::Fragment(self.consume(TokenKind::Formatted)?));
            } else {
                self.consume(TokenKind::LeftBrace)?;
                parts.push(FormatPart::Expr(self.parse_expression()?));
                self.consume(TokenKind::RightBrace)?;
            }
        }
        Ok(Node::FormattedStr(parts))
    }
}

fn binary(op: BinaryOp, left: Node, right: Node) -> Node {
    Node::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Strips the surrounding quotes and resolves `\"` escapes.
fn unescape_string(lexeme: &str) -> String {
    lexeme[1..lexeme.len() - 1].replace("\\\"", "\"")
}

fn describe(token: &Token) -> String {
    if token.lexeme.is_empty() {
        token.kind.to_string()
    } else {
        token.lexeme.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> RunResult<Vec<Node>> {
        parse(tokenize(source).unwrap())
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let nodes = parse_source("x = 1 + 2 * 3;").unwrap();
        let Node::Assign { value, .. } = &nodes[0] else {
            panic!("expected assignment, got {nodes:?}");
        };
        let Node::Binary { op: BinaryOp::Add, right, .. } = value.as_ref() else {
            panic!("expected addition at the root, got {value:?}");
        };
        assert!(matches!(right.as_ref(), Node::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn exponentiation_is_left_associative() {
        let nodes = parse_source("x = 2 ** 3 ** 2;").unwrap();
        let Node::Assign { value, .. } = &nodes[0] else {
            panic!("expected assignment");
        };
        let Node::Binary { op: BinaryOp::Pow, left, right } = value.as_ref() else {
            panic!("expected exponentiation at the root");
        };
        assert!(matches!(left.as_ref(), Node::Binary { op: BinaryOp::Pow, .. }));
        assert_eq!(right.as_ref(), &Node::Int(2));
    }

    #[test]
    fn missing_semicolon_is_a_syntax_error() {
        let err = parse_source("x = 1").unwrap_err();
        assert!(err.message().contains("Expected ;"), "got: {}", err.message());
    }

    #[test]
    fn function_definition_keeps_parameter_order() {
        let nodes = parse_source("add &a &b { -> a + b; }").unwrap();
        let Node::FunctionDef(def) = &nodes[0] else {
            panic!("expected function definition");
        };
        assert_eq!(def.parameters, vec!["a", "b"]);
        assert_eq!(def.name, "add");
    }

    #[test]
    fn lookup_chains_nest_left_to_right() {
        let nodes = parse_source(r#"x = m#"grid"[0];"#).unwrap();
        let Node::Assign { value, .. } = &nodes[0] else {
            panic!("expected assignment");
        };
        let Node::ArrayLookup { target, .. } = value.as_ref() else {
            panic!("expected array lookup at the root, got {value:?}");
        };
        assert!(matches!(target.as_ref(), Node::HashtableLookup { .. }));
    }
}
