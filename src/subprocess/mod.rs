//! Subprocess layer: building, spawning and observing the ansible executables

pub mod builder;
pub mod error;
pub mod mock;
pub mod runner;

#[cfg(test)]
mod tests;

pub use builder::{ProcessBuilder, DEFAULT_PROCESS_TIMEOUT};
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{
    ExitStatus, OutputKind, ProcessCommand, ProcessOutput, ProcessRunner, ProcessStream,
    TokioProcessRunner,
};

use std::sync::Arc;

/// The runner used when no other runner is injected
pub fn production_runner() -> Arc<dyn ProcessRunner> {
    Arc::new(TokioProcessRunner)
}
