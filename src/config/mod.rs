use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::ansible::DEFAULT_TIMEOUT;
use crate::error::{AnsibleError, ErrorCode, Result};

/// Settings for building an [`Ansible`](crate::Ansible) factory from a TOML file
///
/// ```toml
/// project_dir = "/srv/ansible"
/// playbook_command = "/usr/local/bin/ansible-playbook"
/// timeout = "10m"
/// ```
///
/// Omitted commands are looked up on `PATH`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsibleConfig {
    pub project_dir: PathBuf,
    #[serde(default)]
    pub playbook_command: Option<PathBuf>,
    #[serde(default)]
    pub galaxy_command: Option<PathBuf>,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

impl AnsibleConfig {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            playbook_command: None,
            galaxy_command: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Read and parse a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ansible config from {}", path.display());

        let content = std::fs::read_to_string(path).map_err(|e| {
            AnsibleError::config_with_code(
                ErrorCode::CONFIG_NOT_FOUND,
                format!("Failed to read config file {}", path.display()),
            )
            .with_source(e)
        })?;

        Self::from_toml_str(&content)
            .map_err(|e| e.with_context(format!("in {}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| {
            AnsibleError::config_with_code(
                ErrorCode::CONFIG_PARSE_ERROR,
                "Failed to serialize config",
            )
            .with_source(e)
        })
    }
}
