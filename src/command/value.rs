/// A flag value given either as one string or as a list of strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Single(String),
    Many(Vec<String>),
}

impl ParamValue {
    /// Normalize into a single string, joining lists with `glue`
    pub fn check_param(self, glue: &str) -> String {
        match self {
            ParamValue::Single(value) => value,
            ParamValue::Many(values) => values.join(glue),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Single(value) => value.is_empty(),
            ParamValue::Many(values) => values.is_empty(),
        }
    }
}

impl Default for ParamValue {
    fn default() -> Self {
        ParamValue::Single(String::new())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::Single(value.clone())
    }
}

impl<S: Into<String>> From<Vec<S>> for ParamValue {
    fn from(values: Vec<S>) -> Self {
        ParamValue::Many(values.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String> + Clone> From<&[S]> for ParamValue {
    fn from(values: &[S]) -> Self {
        ParamValue::Many(values.iter().cloned().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for ParamValue {
    fn from(values: [S; N]) -> Self {
        ParamValue::Many(values.into_iter().map(Into::into).collect())
    }
}
