//! Unified error type for policy command invocations.
//!
//! `PolicyError` covers every way an invocation can be rejected before the
//! filtering engine is touched. `kind()` names the category for log output.
//!
//! An engine that answers `false` is not an error: that outcome is reported
//! through the message sink instead.

/// Invocation-level error. Any of these aborts the command before an engine call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// No subcommand token was supplied.
    #[error("Missing subcommand. Cannot complete request.")]
    MissingSubcommand,

    /// The subcommand is not registered with the dispatcher.
    #[error("Unknown subcommand: {0}")]
    UnknownSubcommand(String),

    /// A required `name=value` argument was absent.
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// A token was not of the form `name=value`.
    #[error("Malformed argument: {0:?} (expected name=value)")]
    MalformedArgument(String),

    /// The same argument name was supplied more than once.
    #[error("Duplicate argument: {0}")]
    DuplicateArgument(String),

    /// A value was present but could not be converted to its required type.
    #[error("Invalid value {value:?} for argument {key}: {reason}")]
    Parse {
        key: String,
        value: String,
        reason: String,
    },
}

impl PolicyError {
    /// Returns the error kind as a string matching the variant name.
    pub fn kind(&self) -> &'static str {
        match self {
            PolicyError::MissingSubcommand => "MissingSubcommand",
            PolicyError::UnknownSubcommand(_) => "UnknownSubcommand",
            PolicyError::MissingArgument(_) => "MissingArgument",
            PolicyError::MalformedArgument(_) => "MalformedArgument",
            PolicyError::DuplicateArgument(_) => "DuplicateArgument",
            PolicyError::Parse { .. } => "Parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_returns_correct_variant_name() {
        assert_eq!(PolicyError::MissingSubcommand.kind(), "MissingSubcommand");
        assert_eq!(
            PolicyError::UnknownSubcommand("x".into()).kind(),
            "UnknownSubcommand"
        );
        assert_eq!(
            PolicyError::MissingArgument("port".into()).kind(),
            "MissingArgument"
        );
        assert_eq!(
            PolicyError::MalformedArgument("port".into()).kind(),
            "MalformedArgument"
        );
        assert_eq!(
            PolicyError::DuplicateArgument("lan".into()).kind(),
            "DuplicateArgument"
        );
        let parse = PolicyError::Parse {
            key: "port".into(),
            value: "abc".into(),
            reason: "not a number".into(),
        };
        assert_eq!(parse.kind(), "Parse");
    }

    #[test]
    fn test_missing_subcommand_message() {
        assert_eq!(
            PolicyError::MissingSubcommand.to_string(),
            "Missing subcommand. Cannot complete request."
        );
    }

    #[test]
    fn test_missing_argument_names_the_key() {
        let err = PolicyError::MissingArgument("relay".into());
        assert!(err.to_string().contains("relay"));
    }
}
