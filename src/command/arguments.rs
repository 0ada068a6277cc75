use super::option::CommandOption;

/// Accumulated command-line state shared by the galaxy and playbook facades
///
/// Rendering order is fixed: the base options joined into one token, then the named
/// options, then the bare parameters. Named options are keyed by flag name: setting a flag
/// again replaces its value in place. [`append_option`](Self::append_option) is the
/// exception for flags that may legitimately repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArguments {
    base_options: Vec<String>,
    options: Vec<CommandOption>,
    parameters: Vec<String>,
}

impl CommandArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named option, replacing an earlier value for the same flag
    pub fn add_option(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self
            .options
            .iter_mut()
            .find(|option| option.name() == Some(name))
        {
            Some(existing) => existing.set_value(Some(value)),
            None => self.options.push(CommandOption::named(name, value)),
        }
    }

    /// Add a named option without replacing earlier occurrences
    pub fn append_option(&mut self, name: &str, value: impl ToString) {
        let option = CommandOption::named(name, value.to_string());
        self.options.push(option);
    }

    pub fn add_parameter(&mut self, name: impl Into<String>) {
        self.parameters.push(name.into());
    }

    pub fn add_base_option(&mut self, base_option: impl Into<String>) -> &mut Self {
        self.base_options.push(base_option.into());
        self
    }

    pub fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|option| option.name() == Some(name))
    }

    /// Base options joined by a single space
    pub fn base_options(&self) -> String {
        self.base_options.join(" ")
    }

    pub fn options(&self) -> Vec<String> {
        self.options.iter().map(ToString::to_string).collect()
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Render the argument list handed to the executable
    pub fn prepare_arguments(&self) -> Vec<String> {
        let mut arguments = Vec::with_capacity(1 + self.options.len() + self.parameters.len());
        arguments.push(self.base_options());
        arguments.extend(self.options());
        arguments.extend(self.parameters.iter().cloned());
        arguments
    }

    /// Render the arguments as one space-joined string
    ///
    /// Lossy when a value contains spaces; only meant for display and comparison.
    pub fn prepare_command_line(&self) -> String {
        self.prepare_arguments().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_render_order() {
        let mut args = CommandArguments::new();
        args.add_parameter("--check");
        args.add_option("--user", "deploy");
        args.add_base_option("site.yml");
        args.add_option("--forks", 10);

        assert_eq!(
            args.prepare_arguments(),
            vec!["site.yml", "--user=deploy", "--forks=10", "--check"]
        );
        assert_eq!(
            args.prepare_command_line(),
            "site.yml --user=deploy --forks=10 --check"
        );
    }

    #[test]
    fn test_base_options_join_into_one_token() {
        let mut args = CommandArguments::new();
        args.add_base_option("init").add_base_option("test_role");

        assert_eq!(args.prepare_arguments(), vec!["init test_role"]);
    }

    #[test]
    fn test_empty_base_options_still_render_a_token() {
        let mut args = CommandArguments::new();
        args.add_parameter("--version");

        assert_eq!(args.prepare_arguments(), vec!["", "--version"]);
    }

    #[test]
    fn test_same_flag_replaces_value_in_place() {
        let mut args = CommandArguments::new();
        args.add_option("--limit", "web");
        args.add_option("--user", "deploy");
        args.add_option("--limit", "db");

        assert_eq!(args.options(), vec!["--limit=db", "--user=deploy"]);
        assert!(args.has_option("--limit"));
        assert!(!args.has_option("--tags"));
    }

    #[test]
    fn test_append_option_keeps_every_occurrence() {
        let mut args = CommandArguments::new();
        args.append_option("--extra-vars", "a=b");
        args.append_option("--extra-vars", "c=d");

        assert_eq!(args.options(), vec!["--extra-vars=a=b", "--extra-vars=c=d"]);
    }

    #[test]
    fn test_parameters_keep_duplicates() {
        let mut args = CommandArguments::new();
        args.add_parameter("-v");
        args.add_parameter("--check");
        args.add_parameter("-v");

        assert_eq!(args.parameters(), &["-v", "--check", "-v"]);
    }

    proptest! {
        #[test]
        fn prop_options_keyed_by_first_insertion(
            calls in prop::collection::vec(("--[a-e]", "[a-z0-9]{0,6}"), 0..40),
        ) {
            let mut args = CommandArguments::new();
            for (name, value) in &calls {
                args.add_option(name, value);
            }

            let mut expected: Vec<(String, String)> = Vec::new();
            for (name, value) in &calls {
                match expected.iter_mut().find(|(n, _)| n == name) {
                    Some(entry) => entry.1 = value.clone(),
                    None => expected.push((name.clone(), value.clone())),
                }
            }
            let expected: Vec<String> = expected
                .into_iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect();

            prop_assert_eq!(args.options(), expected);
        }

        #[test]
        fn prop_parameters_render_in_call_order(
            flags in prop::collection::vec("--[a-c]", 0..30),
        ) {
            let mut args = CommandArguments::new();
            for flag in &flags {
                args.add_parameter(flag.clone());
            }

            let rendered = args.prepare_arguments();
            prop_assert_eq!(&rendered[1..], flags.as_slice());
        }
    }
}
