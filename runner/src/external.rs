use std::io::Write;
use std::process::Command;
use std::time::Duration;

use deck::CodeBlock;

use crate::error::RunFailure;
use crate::process::run_captured;
use crate::registry::Executor;

/// Runs a block by writing it to a temporary file and invoking
/// `program [args...] <file>`. Returns the program's standard output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    program: String,
    args: Vec<String>,
    extension: String,
    timeout: Option<Duration>,
}

impl Interpreter {
    pub fn new(program: impl Into<String>, extension: impl Into<String>) -> Self {
        Interpreter {
            program: program.into(),
            args: Vec::new(),
            extension: extension.into(),
            timeout: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn try_run(&self, block: &CodeBlock) -> Result<Vec<String>, RunFailure> {
        let program = which::which(&self.program).map_err(|source| RunFailure::ProgramNotFound {
            program: self.program.clone(),
            source,
        })?;

        let source = write_source(&block.body, &self.extension)?;

        let captured = run_captured(
            Command::new(&program).args(&self.args).arg(source.as_os_str()),
            self.timeout,
        )
        .map_err(|source| RunFailure::Spawn {
            program: self.program.clone(),
            source,
        })?;

        Ok(captured.into_lines(&self.program))
    }
}

impl Executor for Interpreter {
    fn run(&self, block: &CodeBlock) -> Vec<String> {
        self.try_run(block).unwrap_or_else(|failure| {
            tracing::warn!(program = %self.program, %failure, "interpreter failed");
            vec![failure.to_line()]
        })
    }
}

/// Write `body` to a uniquely named temporary file, removed on drop.
pub(crate) fn write_source(body: &str, extension: &str) -> Result<tempfile::TempPath, RunFailure> {
    let mut file = tempfile::Builder::new()
        .prefix("deck-")
        .suffix(&format!(".{}", extension))
        .tempfile()
        .map_err(RunFailure::TempFile)?;
    writeln!(file, "{}", body).map_err(RunFailure::TempFile)?;
    file.flush().map_err(RunFailure::TempFile)?;
    Ok(file.into_temp_path())
}
