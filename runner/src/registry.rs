use std::collections::HashMap;
use std::fmt;

use deck::{CodeBlock, Presentation};

use crate::calc::Calc;
use crate::compiled::Compiler;
use crate::config::ExecutorsConfig;
use crate::error::ExecError;
use crate::external::Interpreter;

/// Runs a code block and returns its output lines.
///
/// Executors never fail: problems are reported as lines of output.
pub trait Executor {
    fn run(&self, block: &CodeBlock) -> Vec<String>;
}

impl<F> Executor for F
where
    F: Fn(&CodeBlock) -> Vec<String>,
{
    fn run(&self, block: &CodeBlock) -> Vec<String> {
        self(block)
    }
}

/// Executors indexed by code block language.
///
/// Languages are matched case-insensitively; keys are stored lowercased.
#[derive(Default)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Box<dyn Executor>>,
}

impl ExecutorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in executors.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("calc", Calc);

        registry.register("python", Interpreter::new("python3", "py"));
        registry.register("lua", Interpreter::new("lua", "lua"));
        registry.register("javascript", Interpreter::new("node", "js"));
        registry.register("js", Interpreter::new("node", "js"));
        registry.register("ruby", Interpreter::new("ruby", "rb"));
        registry.register("sh", Interpreter::new("sh", "sh"));
        registry.register("bash", Interpreter::new("bash", "sh"));

        registry.register("rust", Compiler::new("rustc", "rs"));
        registry.register("c", Compiler::new("cc", "c"));
        registry
    }

    /// Register `executor` for `language`, replacing any previous entry
    /// that differs only in case.
    pub fn register(&mut self, language: impl Into<String>, executor: impl Executor + 'static) {
        self.insert(language.into(), Box::new(executor));
    }

    fn insert(&mut self, language: String, executor: Box<dyn Executor>) {
        self.executors.insert(language.to_lowercase(), executor);
    }

    /// Merge user configuration over the current entries.
    pub fn apply_config(&mut self, config: &ExecutorsConfig) {
        for (language, spec) in config {
            tracing::debug!(%language, ?spec, "configured executor");
            self.insert(language.clone(), spec.build());
        }
    }

    pub fn lookup(&self, language: &str) -> Option<&dyn Executor> {
        self.executors
            .get(&language.to_lowercase())
            .map(|executor| executor.as_ref())
    }

    /// Registered languages, lowercased and sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut languages: Vec<&str> = self.executors.keys().map(String::as_str).collect();
        languages.sort_unstable();
        languages
    }

    /// Run `block` with the executor registered for its language.
    pub fn execute(&self, block: &CodeBlock) -> Result<Vec<String>, ExecError> {
        let executor = self
            .lookup(&block.language)
            .ok_or_else(|| ExecError::NoExecutor(block.language.clone()))?;
        tracing::debug!(language = %block.language, row = block.start_row, "executing code block");
        Ok(executor.run(block))
    }

    /// Run the first code block of the slide at `index`.
    pub fn execute_slide(
        &self,
        presentation: &Presentation,
        index: usize,
    ) -> Result<Vec<String>, ExecError> {
        let block = presentation
            .first_block_of(index)
            .ok_or(ExecError::NoCodeBlock(index))?;
        self.execute(block)
    }
}

impl fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}
