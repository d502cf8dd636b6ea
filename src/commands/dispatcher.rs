//! Subcommand registry routing a name plus raw arguments to a handler.

use std::collections::HashMap;

use crate::error::PolicyError;

use super::arguments::ArgumentTable;

/// A registered subcommand handler.
///
/// Handlers own whatever they need (engine handle, message sink) through the
/// closure's captures.
pub enum Handler<T> {
    /// Receives the arguments parsed into an [`ArgumentTable`].
    WithArguments(Box<dyn Fn(&ArgumentTable) -> Result<T, PolicyError> + Send + Sync>),
    /// Takes no arguments; anything supplied is ignored and never parsed.
    Plain(Box<dyn Fn() -> Result<T, PolicyError> + Send + Sync>),
}

impl<T> Handler<T> {
    pub fn with_arguments<F>(f: F) -> Self
    where
        F: Fn(&ArgumentTable) -> Result<T, PolicyError> + Send + Sync + 'static,
    {
        Handler::WithArguments(Box::new(f))
    }

    pub fn plain<F>(f: F) -> Self
    where
        F: Fn() -> Result<T, PolicyError> + Send + Sync + 'static,
    {
        Handler::Plain(Box::new(f))
    }
}

/// Table from exact (case-sensitive) subcommand name to handler.
pub struct SubcommandDispatcher<T> {
    handlers: HashMap<String, Handler<T>>,
}

impl<T> Default for SubcommandDispatcher<T> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<T> SubcommandDispatcher<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous registration.
    pub fn add_subcommand(&mut self, name: impl Into<String>, handler: Handler<T>) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::debug!("Replaced handler for subcommand '{name}'");
        }
    }

    /// Route `name` to its handler. Argument-taking handlers get a freshly
    /// built table; a malformed table fails before the handler runs.
    pub fn dispatch<S: AsRef<str>>(
        &self,
        name: &str,
        raw_arguments: &[S],
    ) -> Result<T, PolicyError> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| PolicyError::UnknownSubcommand(name.to_string()))?;

        match handler {
            Handler::WithArguments(f) => {
                let table = ArgumentTable::from_tokens(raw_arguments)?;
                f(&table)
            }
            Handler::Plain(f) => {
                if !raw_arguments.is_empty() {
                    tracing::debug!(
                        "Ignoring {} argument(s) passed to '{name}'",
                        raw_arguments.len()
                    );
                }
                f()
            }
        }
    }

    /// Registered subcommand names, sorted.
    pub fn subcommands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
