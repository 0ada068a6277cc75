//! # ansible-command
//!
//! Fluent builders for `ansible-playbook` and `ansible-galaxy` command lines, executed as
//! subprocesses with a timeout, buffered or streamed output, and per-run environment.
//!
//! ## Usage
//!
//! ```no_run
//! use ansible_command::{Ansible, AnsibleCommand};
//!
//! # async fn run() -> ansible_command::Result<()> {
//! let ansible = Ansible::new("/srv/ansible", None, None)?;
//! let output = ansible
//!     .playbook()
//!     .play("site.yml")
//!     .inventory(&["web01.example.com"])
//!     .extra_vars([("release", "2024.1")])?
//!     .check()
//!     .execute()
//!     .await?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - `ansible` - Factory validating the project directory and executables
//! - `command` - Playbook and galaxy builders plus the shared argument assembler
//! - `config` - TOML configuration for the factory
//! - `error` - Error type with numeric error codes
//! - `subprocess` - Process builder and runner abstraction, with a mock for tests
pub mod ansible;
pub mod command;
pub mod config;
pub mod error;
pub mod subprocess;

pub use ansible::Ansible;
pub use command::{
    AnsibleCommand, AnsibleGalaxy, AnsiblePlaybook, CommandOption, ExtraVars, OutputChunk,
    OutputKind, ParamValue,
};
pub use config::AnsibleConfig;
pub use error::{AnsibleError, Result};
