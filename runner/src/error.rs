use std::io;

/// Why a code block could not be handed to an executor.
///
/// Both variants are informational: the presentation keeps running.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("no executor for language `{}`", display_language(.0))]
    NoExecutor(String),
    /// Carries the 0-based slide index; displayed 1-based.
    #[error("slide {} has no code block", .0 + 1)]
    NoCodeBlock(usize),
}

fn display_language(language: &str) -> &str {
    if language.is_empty() { "<none>" } else { language }
}

/// A failure inside an executor. Executors turn these into output lines.
#[derive(Debug, thiserror::Error)]
pub enum RunFailure {
    #[error("`{program}` not found: {source}")]
    ProgramNotFound {
        program: String,
        #[source]
        source: which::Error,
    },
    #[error("cannot prepare temporary files: {0}")]
    TempFile(#[source] io::Error),
    #[error("cannot run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl RunFailure {
    /// The diagnostic line shown in place of program output.
    pub fn to_line(&self) -> String {
        format!("error: {}", self)
    }
}
