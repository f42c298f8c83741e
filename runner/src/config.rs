use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::calc::Calc;
use crate::compiled::Compiler;
use crate::external::Interpreter;
use crate::registry::Executor;

/// `[executors.<language>]` tables from the config file.
pub type ExecutorsConfig = BTreeMap<String, ExecutorSpec>;

/// How to run one language, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", deny_unknown_fields)]
pub enum ExecutorSpec {
    /// `program [args...] <file>`
    Interpreter {
        program: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_extension")]
        extension: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    /// `compiler [args...] <src> -o <bin>`, then run `<bin>`.
    Compiler {
        compiler: String,
        #[serde(default)]
        args: Vec<String>,
        extension: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    /// The in-process calc interpreter.
    Calc,
}

fn default_extension() -> String {
    "txt".to_string()
}

impl ExecutorSpec {
    pub fn build(&self) -> Box<dyn Executor> {
        match self {
            ExecutorSpec::Interpreter {
                program,
                args,
                extension,
                timeout_secs,
            } => Box::new(
                Interpreter::new(program.clone(), extension.clone())
                    .with_args(args.clone())
                    .with_timeout(timeout_secs.map(Duration::from_secs)),
            ),
            ExecutorSpec::Compiler {
                compiler,
                args,
                extension,
                timeout_secs,
            } => Box::new(
                Compiler::new(compiler.clone(), extension.clone())
                    .with_args(args.clone())
                    .with_timeout(timeout_secs.map(Duration::from_secs)),
            ),
            ExecutorSpec::Calc => Box::new(Calc),
        }
    }
}
