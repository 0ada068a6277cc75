use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::subprocess::{ProcessBuilder, ProcessRunner};

pub use crate::subprocess::OutputKind;

/// One line of output delivered to a streaming callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputChunk {
    pub kind: OutputKind,
    pub content: String,
}

impl OutputChunk {
    pub fn new(kind: OutputKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }

    pub fn is_stderr(&self) -> bool {
        self.kind == OutputKind::Stderr
    }
}

/// Callback invoked once per output line, in arrival order
pub type OutputCallback<'a> = &'a mut (dyn FnMut(OutputChunk) + Send);

/// Capabilities shared by the galaxy and playbook facades
#[async_trait]
pub trait AnsibleCommand: Send {
    /// Run to completion; stdout on success, stderr on failure
    async fn execute(&mut self) -> Result<String> {
        self.execute_with_env(&HashMap::new()).await
    }

    /// Like [`execute`](Self::execute) with extra environment overrides for this run only
    async fn execute_with_env(&mut self, env: &HashMap<String, String>) -> Result<String>;

    /// Stream every output line to `callback` and return the exit code
    async fn execute_streaming(&mut self, callback: OutputCallback<'_>) -> Result<i32> {
        let env = HashMap::new();
        self.execute_streaming_with_env(&env, callback).await
    }

    async fn execute_streaming_with_env(
        &mut self,
        env: &HashMap<String, String>,
        callback: OutputCallback<'_>,
    ) -> Result<i32>;

    /// Arguments as handed to the executable
    fn command_line_arguments(&mut self) -> Vec<String>;

    /// Arguments joined by single spaces
    fn command_line(&mut self) -> String {
        self.command_line_arguments().join(" ")
    }
}

/// Pairs a facade's process template with the runner that executes it
///
/// Every run works on a copy of the template, so executing twice never accumulates
/// arguments from an earlier run.
#[derive(Clone)]
pub(crate) struct Executor {
    process: ProcessBuilder,
    runner: Arc<dyn ProcessRunner>,
}

impl Executor {
    pub(crate) fn new(process: ProcessBuilder, runner: Arc<dyn ProcessRunner>) -> Self {
        Self { process, runner }
    }

    pub(crate) fn process(&self) -> &ProcessBuilder {
        &self.process
    }

    pub(crate) fn process_mut(&mut self) -> &mut ProcessBuilder {
        &mut self.process
    }

    fn prepare(&self, arguments: Vec<String>, env: &HashMap<String, String>) -> ProcessBuilder {
        let mut process = self.process.clone();
        process.set_arguments(arguments).envs(env);
        process
    }

    pub(crate) async fn run(
        &self,
        arguments: Vec<String>,
        env: &HashMap<String, String>,
    ) -> Result<String> {
        let command = self.prepare(arguments, env).get_process();
        let output = self.runner.run(command).await?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Ok(output.stderr)
        }
    }

    pub(crate) async fn run_streaming(
        &self,
        arguments: Vec<String>,
        env: &HashMap<String, String>,
        callback: OutputCallback<'_>,
    ) -> Result<i32> {
        let command = self.prepare(arguments, env).get_process();
        let stream = self.runner.run_streaming(command).await?;
        let status = stream
            .drain(|kind, line| callback(OutputChunk::new(kind, line)))
            .await?;

        Ok(status.code().unwrap_or(-1))
    }
}
