use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::command::{AnsibleGalaxy, AnsiblePlaybook};
use crate::config::AnsibleConfig;
use crate::error::{AnsibleError, ErrorCode, Result};
use crate::subprocess::{production_runner, ProcessBuilder, ProcessRunner};

/// Wall-clock limit applied to every command built by the factory
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub const DEFAULT_PLAYBOOK_COMMAND: &str = "ansible-playbook";
pub const DEFAULT_GALAXY_COMMAND: &str = "ansible-galaxy";

#[cfg(windows)]
const WINDOWS_EXECUTABLE_EXTENSIONS: [&str; 5] = ["exe", "com", "bat", "cmd", "ps1"];

/// Entry point: validates an ansible project and hands out command builders
///
/// All validation happens here, so a constructed factory always points at an existing
/// project directory and at executables that were present at construction time.
#[derive(Clone)]
pub struct Ansible {
    project_dir: PathBuf,
    playbook_command: String,
    galaxy_command: String,
    timeout: Duration,
    runner: Arc<dyn ProcessRunner>,
}

impl fmt::Debug for Ansible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ansible")
            .field("project_dir", &self.project_dir)
            .field("playbook_command", &self.playbook_command)
            .field("galaxy_command", &self.galaxy_command)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Ansible {
    /// Validate the project directory and both executables
    ///
    /// A `None` (or empty) command falls back to the default executable name, which must
    /// then be found on `PATH`.
    pub fn new(
        project_dir: impl AsRef<Path>,
        playbook_command: Option<&Path>,
        galaxy_command: Option<&Path>,
    ) -> Result<Self> {
        let project_dir = check_dir(project_dir.as_ref())?;
        let playbook_command = check_command(playbook_command, DEFAULT_PLAYBOOK_COMMAND)?;
        let galaxy_command = check_command(galaxy_command, DEFAULT_GALAXY_COMMAND)?;

        debug!(
            "Using {} and {} in {}",
            playbook_command,
            galaxy_command,
            project_dir.display()
        );

        Ok(Self {
            project_dir,
            playbook_command,
            galaxy_command,
            timeout: DEFAULT_TIMEOUT,
            runner: production_runner(),
        })
    }

    pub fn from_config(config: &AnsibleConfig) -> Result<Self> {
        let ansible = Self::new(
            &config.project_dir,
            config.playbook_command.as_deref(),
            config.galaxy_command.as_deref(),
        )?;
        Ok(ansible.with_timeout(config.timeout))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn set_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Replace the process runner shared by every builder created afterwards
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    pub fn playbook_command(&self) -> &str {
        &self.playbook_command
    }

    pub fn galaxy_command(&self) -> &str {
        &self.galaxy_command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn playbook(&self) -> AnsiblePlaybook {
        AnsiblePlaybook::with_runner(
            self.create_process(&self.playbook_command),
            Arc::clone(&self.runner),
        )
    }

    pub fn galaxy(&self) -> AnsibleGalaxy {
        AnsibleGalaxy::with_runner(
            self.create_process(&self.galaxy_command),
            Arc::clone(&self.runner),
        )
    }

    fn create_process(&self, command: &str) -> ProcessBuilder {
        let mut process = ProcessBuilder::new(command, &self.project_dir);
        process.set_timeout(self.timeout);
        process
    }
}

fn check_dir(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(AnsibleError::config_with_code(
            ErrorCode::CONFIG_PROJECT_DIR_MISSING,
            format!("Ansible project root {} not found!", dir.display()),
        ));
    }
    Ok(dir.to_path_buf())
}

fn check_command(command: Option<&Path>, default: &str) -> Result<String> {
    let Some(command) = command.filter(|c| !c.as_os_str().is_empty()) else {
        return check_default_command(default);
    };

    if !command.is_file() {
        return Err(AnsibleError::config_with_code(
            ErrorCode::CONFIG_EXECUTABLE_MISSING,
            format!("Command \"{}\" does not exist!", command.display()),
        ));
    }

    if !is_executable(command) {
        return Err(AnsibleError::config_with_code(
            ErrorCode::CONFIG_EXECUTABLE_NOT_EXECUTABLE,
            format!("Command \"{}\" is not executable!", command.display()),
        ));
    }

    Ok(command.to_string_lossy().into_owned())
}

#[cfg(windows)]
fn check_default_command(default: &str) -> Result<String> {
    Ok(default.to_string())
}

#[cfg(not(windows))]
fn check_default_command(default: &str) -> Result<String> {
    if find_in_path(default).is_none() {
        return Err(AnsibleError::config_with_code(
            ErrorCode::CONFIG_EXECUTABLE_NOT_IN_PATH,
            format!("No \"{}\" executable present in PATH!", default),
        ));
    }
    Ok(default.to_string())
}

/// First executable file named `name` in a `PATH` entry
#[cfg(not(windows))]
fn find_in_path(name: &str) -> Option<PathBuf> {
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file() && is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WINDOWS_EXECUTABLE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

#[cfg(not(any(unix, windows)))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
