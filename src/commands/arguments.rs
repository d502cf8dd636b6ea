//! `name=value` argument table built fresh for each invocation.

use std::collections::HashMap;

use crate::error::PolicyError;

/// Mapping from argument name to its textual value.
///
/// Names are case-sensitive and unique. Lookups of absent names fail with
/// [`PolicyError::MissingArgument`]; interpreting the value is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentTable {
    values: HashMap<String, String>,
}

impl ArgumentTable {
    /// Build a table from `name=value` tokens.
    ///
    /// Each token is split on its first `=`, so values may be empty or contain
    /// further `=` characters.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Self, PolicyError> {
        let mut values = HashMap::with_capacity(tokens.len());

        for token in tokens {
            let token = token.as_ref();
            let (name, value) = token
                .split_once('=')
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| PolicyError::MalformedArgument(token.to_string()))?;

            if values.insert(name.to_string(), value.to_string()).is_some() {
                return Err(PolicyError::DuplicateArgument(name.to_string()));
            }
        }

        Ok(Self { values })
    }

    /// Value of a required argument.
    pub fn get(&self, name: &str) -> Result<&str, PolicyError> {
        self.values
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| PolicyError::MissingArgument(name.to_string()))
    }
}
