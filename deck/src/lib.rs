pub mod parser;
pub mod presentation;
pub mod slide;
pub mod syntax;

pub use parser::{ParseError, Parser};
pub use presentation::Presentation;
pub use slide::{CodeBlock, Slide};
pub use syntax::{Syntax, SyntaxError, SyntaxOptions};
