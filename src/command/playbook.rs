use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::arguments::CommandArguments;
use super::execution::{AnsibleCommand, Executor, OutputCallback};
use super::extra_vars::ExtraVars;
use super::value::ParamValue;
use crate::error::{AnsibleError, ErrorCode, Result};
use crate::subprocess::{production_runner, ProcessBuilder, ProcessRunner};

/// Fluent builder for `ansible-playbook` invocations
///
/// Most methods map to one CLI flag. A handful set environment variables on the process
/// instead: [`roles_path`](Self::roles_path), [`host_key_checking`](Self::host_key_checking),
/// [`ssh_pipelining`](Self::ssh_pipelining), [`no_cows`](Self::no_cows),
/// [`colors`](Self::colors) and [`json`](Self::json).
///
/// When neither [`inventory`](Self::inventory) nor [`inventory_file`](Self::inventory_file)
/// was called, the first render derives `--inventory-file` from the play path with `.yml`
/// removed.
#[derive(Clone)]
pub struct AnsiblePlaybook {
    arguments: CommandArguments,
    executor: Executor,
    has_inventory: bool,
}

impl AnsiblePlaybook {
    pub fn new(process: ProcessBuilder) -> Self {
        Self::with_runner(process, production_runner())
    }

    pub fn with_runner(process: ProcessBuilder, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            arguments: CommandArguments::new(),
            executor: Executor::new(process, runner),
            has_inventory: false,
        }
    }

    /// The process template, including environment set by flag methods
    pub fn process(&self) -> &ProcessBuilder {
        self.executor.process()
    }

    /// The playbook to run
    pub fn play(mut self, playbook: &str) -> Self {
        self.arguments.add_base_option(playbook);
        self
    }

    pub fn ask_pass(mut self) -> Self {
        self.arguments.add_parameter("--ask-pass");
        self
    }

    pub fn ask_su_pass(mut self) -> Self {
        self.arguments.add_parameter("--ask-su-pass");
        self
    }

    pub fn ask_sudo_pass(mut self) -> Self {
        self.arguments.add_parameter("--ask-sudo-pass");
        self
    }

    pub fn ask_become_pass(mut self) -> Self {
        self.arguments.add_parameter("--ask-become-pass");
        self
    }

    pub fn ask_vault_pass(mut self) -> Self {
        self.arguments.add_parameter("--ask-vault-pass");
        self
    }

    pub fn r#become(mut self) -> Self {
        self.arguments.add_parameter("--become");
        self
    }

    pub fn become_user(mut self, user: &str) -> Self {
        self.arguments.add_option("--become-user", user);
        self
    }

    /// Don't make any changes, only predict them
    pub fn check(mut self) -> Self {
        self.arguments.add_parameter("--check");
        self
    }

    /// Connection type, e.g. `smart`, `ssh` or `local`
    pub fn connection(mut self, connection: &str) -> Self {
        self.arguments.add_option("--connection", connection);
        self
    }

    pub fn diff(mut self) -> Self {
        self.arguments.add_parameter("--diff");
        self
    }

    /// Pass variables as `key=value` pairs or as a JSON object
    ///
    /// Each call adds its own `--extra-vars` occurrence. Empty input is ignored; a raw
    /// string that is neither a JSON object nor contains `=` is rejected.
    pub fn extra_vars(mut self, extra_vars: impl Into<ExtraVars>) -> Result<Self> {
        if let Some(vars) = extra_vars.into().render()? {
            self.arguments.append_option("--extra-vars", vars);
        }
        Ok(self)
    }

    pub fn force_handlers(mut self) -> Self {
        self.arguments.add_parameter("--force-handlers");
        self
    }

    /// Number of parallel processes
    pub fn forks(mut self, forks: u32) -> Self {
        self.arguments.add_option("--forks", forks);
        self
    }

    pub fn help(mut self) -> Self {
        self.arguments.add_parameter("--help");
        self
    }

    /// Inline host list
    ///
    /// A single host gets a trailing comma so `ansible-playbook` reads the value as a list
    /// rather than an inventory path.
    pub fn inventory<S: AsRef<str>>(mut self, hosts: &[S]) -> Self {
        if hosts.is_empty() {
            return self;
        }

        let mut host_list = hosts
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(", ");

        if hosts.len() == 1 {
            host_list.push(',');
        }

        let value = format!("\"{}\"", host_list);
        self.arguments.add_option("--inventory", value);
        self.has_inventory = true;
        self
    }

    pub fn inventory_file(mut self, inventory: &str) -> Self {
        self.set_inventory_file(inventory);
        self
    }

    fn set_inventory_file(&mut self, inventory: &str) {
        self.arguments.add_option("--inventory-file", inventory);
        self.has_inventory = true;
    }

    /// Restrict the run to a host subset
    pub fn limit(mut self, subset: impl Into<ParamValue>) -> Self {
        let value = subset.into().check_param(",");
        self.arguments.add_option("--limit", value);
        self
    }

    pub fn list_hosts(mut self) -> Self {
        self.arguments.add_parameter("--list-hosts");
        self
    }

    pub fn list_tasks(mut self) -> Self {
        self.arguments.add_parameter("--list-tasks");
        self
    }

    /// Module library paths, joined with `,`
    pub fn module_path<S: AsRef<str>>(mut self, paths: &[S]) -> Self {
        let paths = paths
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        self.arguments.add_option("--module-path", paths);
        self
    }

    pub fn private_key(mut self, file: &str) -> Self {
        self.arguments.add_option("--private-key", file);
        self
    }

    pub fn skip_tags(mut self, tags: impl Into<ParamValue>) -> Self {
        let value = tags.into().check_param(",");
        self.arguments.add_option("--skip-tags", value);
        self
    }

    pub fn start_at_task(mut self, task: &str) -> Self {
        self.arguments.add_option("--start-at-task", task);
        self
    }

    pub fn step(mut self) -> Self {
        self.arguments.add_parameter("--step");
        self
    }

    pub fn su(mut self) -> Self {
        self.arguments.add_parameter("--su");
        self
    }

    pub fn su_user(mut self, user: &str) -> Self {
        self.arguments.add_option("--su-user", user);
        self
    }

    pub fn sudo(mut self) -> Self {
        self.arguments.add_parameter("--sudo");
        self
    }

    pub fn sudo_user(mut self, user: &str) -> Self {
        self.arguments.add_option("--sudo-user", user);
        self
    }

    pub fn syntax_check(mut self) -> Self {
        self.arguments.add_parameter("--syntax-check");
        self
    }

    pub fn tags(mut self, tags: impl Into<ParamValue>) -> Self {
        let value = tags.into().check_param(",");
        self.arguments.add_option("--tags", value);
        self
    }

    /// SSH connection timeout in seconds
    ///
    /// This is the `--timeout` flag of `ansible-playbook`; the wall-clock limit of the
    /// process itself is set on the [`Ansible`](crate::Ansible) factory.
    pub fn timeout(mut self, seconds: u32) -> Self {
        self.arguments.add_option("--timeout", seconds);
        self
    }

    /// Remote user to connect as
    pub fn user(mut self, user: &str) -> Self {
        self.arguments.add_option("--user", user);
        self
    }

    pub fn vault_password_file(mut self, file: &str) -> Self {
        self.arguments.add_option("--vault-password-file", file);
        self
    }

    /// Verbosity as a run of `v`s, rendered as `-<level>`
    pub fn verbose(mut self, level: &str) -> Self {
        self.arguments.add_parameter(format!("-{}", level));
        self
    }

    pub fn version(mut self) -> Self {
        self.arguments.add_parameter("--version");
        self
    }

    /// Clear the fact cache
    pub fn flush_cache(mut self) -> Self {
        self.arguments.add_parameter("--flush-cache");
        self
    }

    pub fn new_vault_id(mut self, vault_id: &str) -> Self {
        self.arguments.add_option("--new-vault-id", vault_id);
        self
    }

    pub fn new_vault_password_file(mut self, file: &str) -> Self {
        self.arguments.add_option("--new-vault-password-file", file);
        self
    }

    pub fn scp_extra_args(mut self, args: impl Into<ParamValue>) -> Self {
        let value = args.into().check_param(",");
        self.arguments.add_option("--scp-extra-args", value);
        self
    }

    pub fn sftp_extra_args(mut self, args: impl Into<ParamValue>) -> Self {
        let value = args.into().check_param(",");
        self.arguments.add_option("--sftp-extra-args", value);
        self
    }

    pub fn ssh_common_args(mut self, args: impl Into<ParamValue>) -> Self {
        let value = args.into().check_param(",");
        self.arguments.add_option("--ssh-common-args", value);
        self
    }

    pub fn ssh_extra_args(mut self, args: impl Into<ParamValue>) -> Self {
        let value = args.into().check_param(",");
        self.arguments.add_option("--ssh-extra-args", value);
        self
    }

    pub fn vault_id(mut self, vault_id: &str) -> Self {
        self.arguments.add_option("--vault-id", vault_id);
        self
    }

    /// Point `ANSIBLE_ROLES_PATH` at an existing directory
    ///
    /// An empty path leaves the environment untouched.
    pub fn roles_path(mut self, path: &str) -> Result<Self> {
        if path.is_empty() {
            return Ok(self);
        }

        if !Path::new(path).exists() {
            return Err(AnsibleError::validation_with_code(
                ErrorCode::VALIDATION_PATH_NOT_FOUND,
                format!("The path \"{}\" does not exist.", path),
                Some("roles_path".to_string()),
            ));
        }

        self.executor
            .process_mut()
            .set_env("ANSIBLE_ROLES_PATH", path);
        Ok(self)
    }

    pub fn host_key_checking(mut self, enable: bool) -> Self {
        self.executor
            .process_mut()
            .set_env("ANSIBLE_HOST_KEY_CHECKING", python_bool(enable));
        self
    }

    pub fn ssh_pipelining(mut self, enable: bool) -> Self {
        self.executor
            .process_mut()
            .set_env("ANSIBLE_SSH_PIPELINING", python_bool(enable));
        self
    }

    /// Disable cowsay output
    pub fn no_cows(mut self) -> Self {
        self.executor.process_mut().set_env("ANSIBLE_NOCOWS", 1);
        self
    }

    pub fn colors(mut self, colors: bool) -> Self {
        self.executor
            .process_mut()
            .set_env("ANSIBLE_FORCE_COLOR", u8::from(colors));
        self
    }

    /// Switch the stdout callback to JSON
    pub fn json(mut self) -> Self {
        self.executor
            .process_mut()
            .set_env("ANSIBLE_STDOUT_CALLBACK", "json");
        self
    }

    fn check_inventory(&mut self) {
        if self.has_inventory {
            return;
        }

        let inventory = self.arguments.base_options().replace(".yml", "");
        debug!("No inventory given, deriving {} from play path", inventory);
        self.set_inventory_file(&inventory);
    }
}

fn python_bool(enable: bool) -> &'static str {
    if enable {
        "True"
    } else {
        "False"
    }
}

#[async_trait]
impl AnsibleCommand for AnsiblePlaybook {
    async fn execute_with_env(&mut self, env: &HashMap<String, String>) -> Result<String> {
        self.check_inventory();
        self.executor
            .run(self.arguments.prepare_arguments(), env)
            .await
    }

    async fn execute_streaming_with_env(
        &mut self,
        env: &HashMap<String, String>,
        callback: OutputCallback<'_>,
    ) -> Result<i32> {
        self.check_inventory();
        self.executor
            .run_streaming(self.arguments.prepare_arguments(), env, callback)
            .await
    }

    fn command_line_arguments(&mut self) -> Vec<String> {
        self.check_inventory();
        self.arguments.prepare_arguments()
    }
}

#[cfg(test)]
#[path = "playbook_tests.rs"]
mod playbook_tests;
