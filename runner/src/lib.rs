pub mod calc;
pub mod compiled;
pub mod config;
pub mod error;
pub mod external;
mod process;
pub mod registry;

pub use config::{ExecutorSpec, ExecutorsConfig};
pub use error::{ExecError, RunFailure};
pub use registry::{Executor, ExecutorRegistry};

/// Split captured program output into display lines.
pub fn output_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
