//! `calc`: a small expression language evaluated in-process.
//!
//! Programs are sequences of statements separated by newlines or `;`:
//!
//! ```text
//! let width = 80
//! width = width / 2
//! print("half:", width, width > 30 ? "wide" : "narrow")
//! ```
//!
//! The only side effect available to a program is `print`, whose output is
//! captured. Other builtins are `len`, `str` and `num`.

mod eval;
mod lexer;
mod parser;
mod value;

use std::fmt;

use deck::CodeBlock;

use crate::output_lines;
use crate::registry::Executor;

pub use eval::Evaluator;
pub use value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcErrorKind {
    Syntax,
    Runtime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalcError {
    pub kind: CalcErrorKind,
    /// 1-based line in the code block.
    pub line: usize,
    pub message: String,
}

impl CalcError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        CalcError {
            kind: CalcErrorKind::Syntax,
            line,
            message: message.into(),
        }
    }

    pub fn runtime(line: usize, message: impl Into<String>) -> Self {
        CalcError {
            kind: CalcErrorKind::Runtime,
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "calc: line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for CalcError {}

/// Parse and run `source`, writing `print` output to `output`.
///
/// Nothing runs when the program fails to parse.
pub fn run(source: &str, output: &mut dyn std::io::Write) -> Result<(), CalcError> {
    let statements = parser::parse(lexer::tokenize(source)?)?;
    Evaluator::new(output).run(&statements)
}

/// The in-process executor for `calc` code blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Calc;

impl Executor for Calc {
    fn run(&self, block: &CodeBlock) -> Vec<String> {
        let mut captured = Vec::new();
        let result = run(&block.body, &mut captured);

        let mut lines = output_lines(&String::from_utf8_lossy(&captured));
        if let Err(error) = result {
            tracing::debug!(%error, "calc block failed");
            lines.push(error.to_string());
        }
        lines
    }
}
