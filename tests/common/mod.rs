//! Common test utilities and helpers

#![allow(dead_code)]

use ansible_command::Ansible;
use anyhow::Result;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Prints every argument on its own line, prefixed with its position
pub const ECHO_ARGS: &str = r#"i=1
for arg in "$@"; do
  echo "$i:$arg"
  i=$((i + 1))
done"#;

/// Ansible project directory with fake `ansible-playbook` and `ansible-galaxy` scripts
pub struct TestProject {
    temp_dir: TempDir,
    playbook: PathBuf,
    galaxy: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        Self::with_scripts(ECHO_ARGS, ECHO_ARGS)
    }

    /// Create a project whose executables run the given shell bodies
    pub fn with_scripts(playbook_body: &str, galaxy_body: &str) -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let bin_dir = temp_dir.path().join("bin");
        fs::create_dir(&bin_dir)?;

        let playbook = write_script(&bin_dir, "ansible-playbook", playbook_body)?;
        let galaxy = write_script(&bin_dir, "ansible-galaxy", galaxy_body)?;

        Ok(Self {
            temp_dir,
            playbook,
            galaxy,
        })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn playbook_command(&self) -> &Path {
        &self.playbook
    }

    pub fn galaxy_command(&self) -> &Path {
        &self.galaxy
    }

    pub fn ansible(&self) -> Result<Ansible> {
        Ok(Ansible::new(
            self.path(),
            Some(&self.playbook),
            Some(&self.galaxy),
        )?)
    }

    /// Write a file relative to the project root
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }
}

pub fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body))?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

/// Argument lines printed by [`ECHO_ARGS`], without the position prefix
pub fn echoed_args(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':').map(|(_, arg)| arg.to_string()))
        .collect()
}
