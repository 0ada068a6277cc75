use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::arguments::CommandArguments;
use super::execution::{AnsibleCommand, Executor, OutputCallback};
use super::value::ParamValue;
use crate::error::Result;
use crate::subprocess::{production_runner, ProcessBuilder, ProcessRunner};

/// Fluent builder for `ansible-galaxy` invocations
///
/// Sub-verbs (`init`, `install`, `list`, ...) become base options; every other method maps
/// to one CLI flag.
#[derive(Clone)]
pub struct AnsibleGalaxy {
    arguments: CommandArguments,
    executor: Executor,
}

impl AnsibleGalaxy {
    pub fn new(process: ProcessBuilder) -> Self {
        Self::with_runner(process, production_runner())
    }

    pub fn with_runner(process: ProcessBuilder, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            arguments: CommandArguments::new(),
            executor: Executor::new(process, runner),
        }
    }

    pub fn process(&self) -> &ProcessBuilder {
        self.executor.process()
    }

    /// Initialize a new role with base structure
    pub fn init(mut self, role_name: &str) -> Self {
        self.arguments
            .add_base_option("init")
            .add_base_option(role_name);
        self
    }

    /// Show details of a role, optionally pinned to a version
    pub fn info(mut self, role: &str, version: Option<&str>) -> Self {
        let role = match version {
            Some(version) if !version.is_empty() => format!("{},{}", role, version),
            _ => role.to_string(),
        };
        self.arguments.add_base_option("info").add_base_option(role);
        self
    }

    /// Install one or more roles: `role_name[,version]` or `scm+role_repo_url[,version]`
    ///
    /// With no roles only the verb is added, e.g. for use with [`role_file`](Self::role_file).
    pub fn install(mut self, roles: impl Into<ParamValue>) -> Self {
        let roles = roles.into().check_param(" ");
        self.arguments.add_base_option("install");

        if !roles.is_empty() {
            self.arguments.add_base_option(roles);
        }
        self
    }

    /// List installed roles, or a single one
    pub fn modulelist(mut self, role_name: Option<&str>) -> Self {
        self.arguments.add_base_option("list");

        if let Some(role_name) = role_name.filter(|r| !r.is_empty()) {
            self.arguments.add_base_option(role_name);
        }
        self
    }

    /// Remove one or more roles
    pub fn remove(mut self, roles: impl Into<ParamValue>) -> Self {
        let roles = roles.into().check_param(" ");
        self.arguments.add_base_option("remove").add_base_option(roles);
        self
    }

    pub fn help(mut self) -> Self {
        self.arguments.add_parameter("--help");
        self
    }

    /// The path in which the skeleton role will be created
    pub fn init_path(mut self, path: &str) -> Self {
        self.arguments.add_option("--init-path", path);
        self
    }

    /// Don't query the galaxy API when creating roles
    pub fn offline(mut self) -> Self {
        self.arguments.add_parameter("--offline");
        self
    }

    /// The API server destination
    pub fn server(mut self, api_server: &str) -> Self {
        self.arguments.add_option("--server", api_server);
        self
    }

    /// Force overwriting an existing role
    pub fn force(mut self) -> Self {
        self.arguments.add_parameter("--force");
        self
    }

    /// A file containing a list of roles to be imported
    pub fn role_file(mut self, role_file: &str) -> Self {
        self.arguments.add_option("--role-file", role_file);
        self
    }

    /// The directory containing your roles
    pub fn roles_path(mut self, roles_path: &str) -> Self {
        self.arguments.add_option("--roles-path", roles_path);
        self
    }

    /// Ignore errors and continue with the next specified role
    pub fn ignore_errors(mut self) -> Self {
        self.arguments.add_parameter("--ignore-errors");
        self
    }

    /// Don't download roles listed as dependencies
    pub fn no_deps(mut self) -> Self {
        self.arguments.add_parameter("--no-deps");
        self
    }
}

#[async_trait]
impl AnsibleCommand for AnsibleGalaxy {
    async fn execute_with_env(&mut self, env: &HashMap<String, String>) -> Result<String> {
        self.executor
            .run(self.arguments.prepare_arguments(), env)
            .await
    }

    async fn execute_streaming_with_env(
        &mut self,
        env: &HashMap<String, String>,
        callback: OutputCallback<'_>,
    ) -> Result<i32> {
        self.executor
            .run_streaming(self.arguments.prepare_arguments(), env, callback)
            .await
    }

    fn command_line_arguments(&mut self) -> Vec<String> {
        self.arguments.prepare_arguments()
    }
}
