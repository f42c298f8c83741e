use std::fs;
use std::process::Command;
use std::time::Duration;

use deck::CodeBlock;

use crate::error::RunFailure;
use crate::output_lines;
use crate::process::run_captured;
use crate::registry::Executor;

/// Compiles a block with `compiler [args...] <src> -o <bin>` and runs the
/// resulting binary.
///
/// A failed compilation returns the compiler's diagnostics instead of
/// program output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    compiler: String,
    args: Vec<String>,
    extension: String,
    timeout: Option<Duration>,
}

impl Compiler {
    pub fn new(compiler: impl Into<String>, extension: impl Into<String>) -> Self {
        Compiler {
            compiler: compiler.into(),
            args: Vec::new(),
            extension: extension.into(),
            timeout: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Applies to the compiler and to the compiled program separately.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn try_run(&self, block: &CodeBlock) -> Result<Vec<String>, RunFailure> {
        let compiler = which::which(&self.compiler).map_err(|source| {
            RunFailure::ProgramNotFound {
                program: self.compiler.clone(),
                source,
            }
        })?;

        let dir = tempfile::Builder::new()
            .prefix("deck-")
            .tempdir()
            .map_err(RunFailure::TempFile)?;
        let source = dir.path().join(format!("main.{}", self.extension));
        let binary = dir
            .path()
            .join(format!("main{}", std::env::consts::EXE_SUFFIX));
        fs::write(&source, format!("{}\n", block.body)).map_err(RunFailure::TempFile)?;

        let compiled = run_captured(
            Command::new(&compiler)
                .args(&self.args)
                .arg(&source)
                .arg("-o")
                .arg(&binary),
            self.timeout,
        )
        .map_err(|source| RunFailure::Spawn {
            program: self.compiler.clone(),
            source,
        })?;

        if !compiled.success() {
            tracing::debug!(compiler = %self.compiler, "compilation failed");
            let mut lines = output_lines(&compiled.stderr);
            lines.extend(output_lines(&compiled.stdout));
            if let Some(limit) = compiled.timed_out {
                lines.push(format!(
                    "error: `{}` timed out after {}s",
                    self.compiler,
                    limit.as_secs_f32()
                ));
            }
            return Ok(lines);
        }

        let program = binary.display().to_string();
        let captured = run_captured(&mut Command::new(&binary), self.timeout).map_err(|source| {
            RunFailure::Spawn {
                program: program.clone(),
                source,
            }
        })?;

        Ok(captured.into_lines("program"))
    }
}

impl Executor for Compiler {
    fn run(&self, block: &CodeBlock) -> Vec<String> {
        self.try_run(block).unwrap_or_else(|failure| {
            tracing::warn!(compiler = %self.compiler, %failure, "compiled executor failed");
            vec![failure.to_line()]
        })
    }
}
