mod builder;
pub mod error;
pub mod structure;

pub use builder::build_slides;
pub use error::ParseError;
pub use structure::{CommonMark, Grammar, NodeKind, RowSpan, Structure};

use crate::slide::Slide;
use crate::syntax::Syntax;

/// Parser entry point.
pub struct Parser {
    source: String,
    file_id: usize,
    syntax: Syntax,
}

impl Parser {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            syntax: Syntax::plain(),
        }
    }

    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Parse the source Markdown into slides using the CommonMark grammar.
    pub fn parse(&self) -> Result<Vec<Slide>, Vec<ParseError>> {
        self.parse_with(&CommonMark)
    }

    /// Parse the source Markdown into slides using `grammar`.
    pub fn parse_with<G: Grammar>(&self, grammar: &G) -> Result<Vec<Slide>, Vec<ParseError>> {
        let structure = structure::extract(grammar, &self.source, self.file_id)?;
        let lines: Vec<&str> = self.source.lines().collect();
        Ok(build_slides(&lines, &structure, &self.syntax))
    }
}
