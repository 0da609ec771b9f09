//! Launch description handed to environment creation.

use serde::{Deserialize, Serialize};

/// How an environment was launched.
///
/// The bundle is built by the embedder before the environment is created and
/// copied in by value; nothing in this crate parses or rewrites it. Fields are
/// private so a bundle cannot change after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessArguments {
    argument_count: usize,
    arguments: Vec<String>,
    exec_arguments: Vec<String>,
}

impl ProcessArguments {
    /// Create a bundle from its three parts.
    ///
    /// `argument_count` is recorded as given. Embedders commonly report fewer
    /// arguments than `arguments` holds (e.g. only the program name).
    pub fn new(argument_count: usize, arguments: Vec<String>, exec_arguments: Vec<String>) -> Self {
        Self {
            argument_count,
            arguments,
            exec_arguments,
        }
    }

    /// Build a bundle from a plain argument vector with no execution arguments.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let arguments: Vec<String> = argv.into_iter().map(Into::into).collect();
        Self {
            argument_count: arguments.len(),
            arguments,
            exec_arguments: Vec::new(),
        }
    }

    pub fn argument_count(&self) -> usize {
        self.argument_count
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Engine-level arguments (flags consumed by the runtime rather than the program).
    pub fn exec_arguments(&self) -> &[String] {
        &self.exec_arguments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_argv() {
        let args = ProcessArguments::from_argv(["jsenv", "main.js"]);
        assert_eq!(args.argument_count(), 2);
        assert_eq!(args.arguments(), ["jsenv", "main.js"]);
        assert!(args.exec_arguments().is_empty());
    }

    #[test]
    fn test_count_is_kept_as_given() {
        let argv = vec!["jsenv".to_string(), "--flag".to_string()];
        let args = ProcessArguments::new(1, argv.clone(), argv.clone());
        assert_eq!(args.argument_count(), 1);
        assert_eq!(args.arguments(), argv.as_slice());
        assert_eq!(args.exec_arguments(), argv.as_slice());
    }

    #[test]
    fn test_default_is_empty() {
        let args = ProcessArguments::default();
        assert_eq!(args.argument_count(), 0);
        assert!(args.arguments().is_empty());
        assert!(args.exec_arguments().is_empty());
    }

    #[test]
    fn test_json_shape() {
        let args = ProcessArguments::new(
            1,
            vec!["jsenv".to_string()],
            vec!["--expose-gc".to_string()],
        );
        let json = deno_core::serde_json::to_value(&args).unwrap();
        assert_eq!(json["argument_count"], 1);
        assert_eq!(json["arguments"][0], "jsenv");
        assert_eq!(json["exec_arguments"][0], "--expose-gc");

        let parsed: ProcessArguments = deno_core::serde_json::from_value(json).unwrap();
        assert_eq!(parsed, args);
    }
}
