//! Conversion of resolved source text into a token stream.
//!
//! The lexer drives an ordered table of anchored patterns; the first pattern
//! that matches at the cursor wins, so multi-character operators are listed
//! before their prefixes (`**=` before `**` before `*`). Whitespace is
//! consumed but never emitted. Formatted string literals switch to a
//! sub-lexer that interleaves literal fragments with brace-delimited
//! expression tokens.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RunError, RunResult};

/// The kind of a lexed token.
///
/// The `Display` form is the operator's spelling, or a short description for
/// the token classes that carry a payload; it is used in parser diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Whitespace,
    LibraryPath,
    TypeName,
    Identifier,
    Semicolon,
    Return,
    Number,
    Equality,
    Assign,
    Increment,
    AddAssign,
    Plus,
    SubAssign,
    Decrement,
    Minus,
    PowAssign,
    Pow,
    MulAssign,
    Star,
    DivAssign,
    Slash,
    LeftParen,
    RightParen,
    NotEqual,
    GreaterEqual,
    LessEqual,
    Print,
    Greater,
    Append,
    Scan,
    Less,
    Raise,
    Not,
    And,
    Or,
    Null,
    Comma,
    True,
    False,
    Str,
    Formatted,
    LeftBrace,
    RightBrace,
    Parameter,
    If,
    While,
    Continue,
    Break,
    For,
    LeftBracket,
    RightBracket,
    Namespace,
    Colon,
    Reference,
    Range,
    Period,
}
impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::LibraryPath => "library path",
            TokenKind::TypeName => "type name",
            TokenKind::Identifier => "identifier",
            TokenKind::Semicolon => ";",
            TokenKind::Return => "->",
            TokenKind::Number => "number",
            TokenKind::Equality => "==",
            TokenKind::Assign => "=",
            TokenKind::Increment => "++",
            TokenKind::AddAssign => "+=",
            TokenKind::Plus => "+",
            TokenKind::SubAssign => "-=",
            TokenKind::Decrement => "--",
            TokenKind::Minus => "-",
            TokenKind::PowAssign => "**=",
            TokenKind::Pow => "**",
            TokenKind::MulAssign => "*=",
            TokenKind::Star => "*",
            TokenKind::DivAssign => "/=",
            TokenKind::Slash => "/",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::NotEqual => "!=",
            TokenKind::GreaterEqual => ">=",
            TokenKind::LessEqual => "<=",
            TokenKind::Print => ">>",
            TokenKind::Greater => ">",
            TokenKind::Append => "<-",
            TokenKind::Scan => "<<",
            TokenKind::Less => "<",
            TokenKind::Raise => "!>>",
            TokenKind::Not => "!",
            TokenKind::And => "&&",
            TokenKind::Or => "||",
            TokenKind::Null => "|",
            TokenKind::Comma => ",",
            TokenKind::True => "$",
            TokenKind::False => "%",
            TokenKind::Str => "string",
            TokenKind::Formatted => "formatted string fragment",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Parameter => "&",
            TokenKind::If => "?",
            TokenKind::While => "~",
            TokenKind::Continue => "^",
            TokenKind::Break => "`",
            TokenKind::For => "@",
            TokenKind::LeftBracket => "[",
            TokenKind::RightBracket => "]",
            TokenKind::Namespace => "::",
            TokenKind::Colon => ":",
            TokenKind::Reference => "#",
            TokenKind::Range => "...",
            TokenKind::Period => ".",
        };
        f.write_str(s)
    }
}


/// A lexed token: its kind and the matched source text.
///
/// For `Formatted` tokens the lexeme is the literal fragment, which may be
/// empty (the sub-lexer emits an empty sentinel before an embedded
/// expression and for an empty formatted string).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
        }
    }
}

/// The ordered pattern table. Order is load-bearing: scanning tries each
/// pattern at the cursor in turn and the first match wins.
static TOKEN_PATTERNS: LazyLock<Vec<(TokenKind, Regex)>> = LazyLock::new(|| {
    use TokenKind::*;
    let table: &[(TokenKind, &str)] = &[
        (Whitespace, r"\s+"),
        (
            LibraryPath,
            r"(?:@[a-zA-Z]:[\\/][a-zA-Z0-9_.\\/-]+;|@\.?[\\/][a-zA-Z0-9_.\\/-]+;)",
        ),
        (TypeName, r"<[a-zA-Z_]\w*>"),
        (Identifier, r"[a-zA-Z_]\w*"),
        (Semicolon, r";"),
        (Return, r"->"),
        (Number, r"\d+(?:\.\d+)?"),
        (Equality, r"=="),
        (Assign, r"="),
        (Increment, r"\+\+"),
        (AddAssign, r"\+="),
        (Plus, r"\+"),
        (SubAssign, r"-="),
        (Decrement, r"--"),
        (Minus, r"-"),
        (PowAssign, r"\*\*="),
        (Pow, r"\*\*"),
        (MulAssign, r"\*="),
        (Star, r"\*"),
        (DivAssign, r"/="),
        (Slash, r"/"),
        (LeftParen, r"\("),
        (RightParen, r"\)"),
        (NotEqual, r"!="),
        (GreaterEqual, r">="),
        (LessEqual, r"<="),
        (Print, r">>"),
        (Greater, r">"),
        (Append, r"<-"),
        (Scan, r"<<"),
        (Less, r"<"),
        (Raise, r"!>>"),
        (Not, r"!"),
        (And, r"&&"),
        (Or, r"\|\|"),
        (Null, r"\|"),
        (Comma, r","),
        (True, r"\$"),
        (False, r"%"),
        (Str, r#""(?:\\"|\\|[^"\\\n])*""#),
        (LeftBrace, r"\{"),
        (RightBrace, r"\}"),
        (Parameter, r"&"),
        (If, r"\?"),
        (While, r"~"),
        (Continue, r"\^"),
        (Break, r"`"),
        (For, r"@"),
        (LeftBracket, r"\["),
        (RightBracket, r"\]"),
        (Namespace, r"::"),
        (Colon, r":"),
        (Reference, r"#"),
        (Range, r"\.\.\."),
        (Period, r"\."),
    ];
    table
        .iter()
        .map(|(kind, pattern)| {
            let anchored = format!("^(?:{pattern})");
            (*kind, Regex::new(&anchored).expect("token pattern must compile"))
        })
        .collect()
});

/// Opening delimiter of a formatted string literal.
const FORMATTED_QUOTE: char = '\'';

/// Converts resolved source text into an ordered token sequence.
///
/// # Errors
/// Returns a syntax error for characters no pattern matches and for
/// unterminated formatted strings.
pub fn tokenize(source: &str) -> RunResult<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'src> {
    source: &'src str,
    position: usize,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self { source, position: 0 }
    }

    fn rest(&self) -> &'src str {
        &self.source[self.position..]
    }

    fn run(mut self) -> RunResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while self.position < self.source.len() {
            if self.rest().starts_with(FORMATTED_QUOTE) {
                self.lex_formatted_string(&mut tokens)?;
                continue;
            }
            if !self.lex_table_token(&mut tokens) {
                let unexpected = self.rest().chars().next().unwrap_or_default();
                return Err(RunError::syntax(format!("Unexpected character: {unexpected}")));
            }
        }
        Ok(tokens)
    }

    /// Tries the pattern table at the cursor; pushes the winning token and
    /// advances. Whitespace is consumed without being pushed.
    fn lex_table_token(&mut self, tokens: &mut Vec<Token>) -> bool {
        for (kind, pattern) in TOKEN_PATTERNS.iter() {
            if let Some(found) = pattern.find(self.rest()) {
                if *kind != TokenKind::Whitespace {
                    tokens.push(Token::new(*kind, found.as_str()));
                }
                self.position += found.end();
                return true;
            }
        }
        false
    }

    /// Sub-lexer for a `'…'` formatted string literal.
    ///
    /// Emits interleaved `Formatted` fragment tokens and `{` expression
    /// tokens `}` groups. An embedded expression always gets a preceding
    /// fragment token, empty if nothing was accumulated, and a completely
    /// empty literal emits a single empty fragment so `''` still parses.
    fn lex_formatted_string(&mut self, tokens: &mut Vec<Token>) -> RunResult<()> {
        self.position += FORMATTED_QUOTE.len_utf8();
        let mut buffer = String::new();
        let mut emitted_fragment = false;

        while let Some(current) = self.rest().chars().next() {
            match current {
                '{' => {
                    tokens.push(Token::new(TokenKind::Formatted, std::mem::take(&mut buffer)));
                    emitted_fragment = true;
                    tokens.push(Token::new(TokenKind::LeftBrace, "{"));
                    self.position += 1;
                    self.lex_embedded_expression(tokens)?;
                }
                '}' => {
                    tokens.push(Token::new(TokenKind::RightBrace, "}"));
                    self.position += 1;
                }
                FORMATTED_QUOTE => {
                    if !buffer.is_empty() || !emitted_fragment {
                        tokens.push(Token::new(TokenKind::Formatted, buffer));
                    }
                    self.position += 1;
                    return Ok(());
                }
                other => {
                    buffer.push(other);
                    self.position += other.len_utf8();
                }
            }
        }
        Err(RunError::syntax("Unterminated formatted string"))
    }

    /// Lexes an embedded expression with the general table until the first
    /// unconsumed `}`, which the caller turns into the closing brace token.
    fn lex_embedded_expression(&mut self, tokens: &mut Vec<Token>) -> RunResult<()> {
        while self.position < self.source.len() {
            if self.rest().starts_with('}') {
                return Ok(());
            }
            if !self.lex_table_token(tokens) {
                let unexpected = self.rest().chars().next().unwrap_or_default();
                return Err(RunError::syntax(format!(
                    "Unexpected character in formatted string expression: {unexpected}"
                )));
            }
        }
        Ok(())
    }
}
