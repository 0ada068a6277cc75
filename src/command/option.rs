use std::fmt;

/// A single `name=value` command-line option
///
/// No escaping is applied when rendering; arguments are handed to the process as an argv
/// array, so quoting only matters for the joined command-line string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOption {
    name: Option<String>,
    value: Option<String>,
}

impl CommandOption {
    pub fn new(name: Option<impl Into<String>>, value: Option<impl Into<String>>) -> Self {
        Self {
            name: name.map(Into::into),
            value: value.map(Into::into),
        }
    }

    /// Shorthand for an option with both parts present
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Structural equality; an absent comparand never matches
    pub fn equals(&self, other: Option<&CommandOption>) -> bool {
        other.is_some_and(|other| self == other)
    }
}

impl fmt::Display for CommandOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={}",
            self.name.as_deref().unwrap_or_default(),
            self.value.as_deref().unwrap_or_default()
        )
    }
}
