//! Fluent builders for `ansible-playbook` and `ansible-galaxy`
//!
//! Each facade accumulates base options, named options and bare parameters in a
//! [`CommandArguments`] and executes through the shared [`AnsibleCommand`] trait.

pub mod arguments;
pub mod execution;
pub mod extra_vars;
pub mod galaxy;
pub mod option;
pub mod playbook;
pub mod value;

pub use arguments::CommandArguments;
pub use execution::{AnsibleCommand, OutputCallback, OutputChunk, OutputKind};
pub use extra_vars::ExtraVars;
pub use galaxy::AnsibleGalaxy;
pub use option::CommandOption;
pub use playbook::AnsiblePlaybook;
pub use value::ParamValue;
