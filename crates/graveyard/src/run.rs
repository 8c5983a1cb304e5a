//! Public interface for running Graveyard code.

use std::path::Path;

use crate::{
    error::RunResult,
    interpret::Interpreter,
    io::{PrintWriter, ScanSource},
    lexer::{self, Token},
    node::Node,
    parse,
    prepare,
};

/// Primary interface for running Graveyard code.
///
/// Construction runs the front of the pipeline once — the entry gate,
/// comment stripping, and library ingestion — and keeps the resolved
/// source. The later stages are exposed separately so a driver can stop
/// after any of them.
///
/// # Example
/// ```
/// use graveyard::{CollectStringPrint, NoScan, Runner};
///
/// let runner = Runner::new("::{ >> 1 + 2 * 3; }".to_owned()).unwrap();
/// let mut print = CollectStringPrint::new();
/// runner.execute(&mut print, &mut NoScan).unwrap();
/// assert_eq!(print.output(), "7\n");
/// ```
#[derive(Debug, Clone)]
pub struct Runner {
    resolved: String,
}

impl Runner {
    /// Creates a runner from raw program text.
    ///
    /// The text must be wrapped in the global namespace delimiters
    /// `::{ … }`. Library imports are resolved against the process's
    /// working directory (or the absolute paths they spell).
    ///
    /// # Errors
    /// Returns a syntax error when the global namespace delimiters are
    /// missing and a reference error when an imported library cannot be
    /// loaded.
    pub fn new(source: String) -> RunResult<Self> {
        let body = prepare::strip_global_namespace(&source)?;
        let resolved = prepare::prepare(body)?;
        Ok(Self { resolved })
    }

    /// Creates a runner from a `.graveyard` file on disk.
    ///
    /// # Errors
    /// Returns a value error for a missing file or wrong extension, plus
    /// everything [`Runner::new`] can return.
    pub fn from_file(path: impl AsRef<Path>) -> RunResult<Self> {
        Self::new(prepare::load_program(path.as_ref())?)
    }

    /// The program body after comment stripping and library ingestion.
    #[must_use]
    pub fn resolved_source(&self) -> &str {
        &self.resolved
    }

    /// Lexes the resolved source.
    pub fn tokens(&self) -> RunResult<Vec<Token>> {
        lexer::tokenize(&self.resolved)
    }

    /// Lexes and parses the resolved source.
    pub fn nodes(&self) -> RunResult<Vec<Node>> {
        parse::parse(self.tokens()?)
    }

    /// Runs the program to completion.
    ///
    /// # Errors
    /// Any lex, parse, or evaluation error; all are fatal.
    pub fn execute(&self, print: &mut impl PrintWriter, scan: &mut impl ScanSource) -> RunResult<()> {
        let nodes = self.nodes()?;
        Interpreter::new(print, scan).run(&nodes)
    }

    /// Runs the program, then renders the monolith for inspection.
    pub fn execute_with_dump(
        &self,
        print: &mut impl PrintWriter,
        scan: &mut impl ScanSource,
    ) -> RunResult<String> {
        let nodes = self.nodes()?;
        let mut interpreter = Interpreter::new(print, scan);
        interpreter.run(&nodes)?;
        Ok(interpreter.render_monolith())
    }
}
