use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::subprocess::ProcessCommand;

/// Default wall-clock limit for a process built without an explicit timeout
pub const DEFAULT_PROCESS_TIMEOUT: Duration = Duration::from_secs(900);

/// Collects the executable, its arguments, working directory, timeout and environment
/// overrides before a [`ProcessCommand`] is produced.
///
/// The executable is always the first token; [`set_arguments`](Self::set_arguments) appends
/// after it and never replaces it.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    arguments: Vec<String>,
    working_dir: PathBuf,
    timeout: Duration,
    env: HashMap<String, String>,
}

impl ProcessBuilder {
    pub fn new(command: impl Into<String>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            arguments: vec![command.into()],
            working_dir: working_dir.as_ref().to_path_buf(),
            timeout: DEFAULT_PROCESS_TIMEOUT,
            env: HashMap::new(),
        }
    }

    pub fn set_arguments<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn set_env(&mut self, name: impl Into<String>, value: impl ToString) -> &mut Self {
        self.env.insert(name.into(), value.to_string());
        self
    }

    pub fn envs<I, K, V>(&mut self, vars: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            self.env
                .insert(key.as_ref().to_string(), value.as_ref().to_string());
        }
        self
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Produce the ready-to-run command
    pub fn get_process(&self) -> ProcessCommand {
        let (program, args) = match self.arguments.split_first() {
            Some((program, args)) => (program.clone(), args.to_vec()),
            None => (String::new(), Vec::new()),
        };

        ProcessCommand {
            program,
            args,
            env: self.env.clone(),
            working_dir: Some(self.working_dir.clone()),
            timeout: Some(self.timeout),
        }
    }
}
