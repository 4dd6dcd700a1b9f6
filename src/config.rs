//! Per-run validation settings.
//!
//! [`Config`] travels alongside every [`Dataset`](crate::Dataset) through a
//! run. It is read-only during validation and cheap to clone.

use std::sync::Arc;

use crate::message::{Message, MessageCatalog};

/// Settings for one validation run.
///
/// - `lang` selects the message locale.
/// - `abort_early` stops the whole run, across nested schemas, at the first
///   issue.
/// - `abort_pipe_early` stops only the current pipeline's remaining actions;
///   composite parents still check sibling values.
/// - `message` overrides every issue message that has no more specific
///   override.
/// - `catalog` supplies global, schema-level and per-check messages.
///
/// # Example
///
/// ```rust
/// use sluice::{Config, MessageCatalog};
/// use std::sync::Arc;
///
/// let catalog = Arc::new(MessageCatalog::new());
/// let config = Config::new()
///     .with_lang("de")
///     .with_abort_pipe_early(true)
///     .with_catalog(catalog);
///
/// assert_eq!(config.lang(), Some("de"));
/// assert!(!config.abort_early());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    lang: Option<String>,
    abort_early: bool,
    abort_pipe_early: bool,
    message: Option<Message>,
    catalog: Option<Arc<MessageCatalog>>,
}

impl Config {
    /// Creates a config with every flag off and no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message locale.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Stops the entire run at the first issue.
    pub fn with_abort_early(mut self, abort: bool) -> Self {
        self.abort_early = abort;
        self
    }

    /// Stops each pipeline at its first issue.
    pub fn with_abort_pipe_early(mut self, abort: bool) -> Self {
        self.abort_pipe_early = abort;
        self
    }

    /// Sets the config-level message override.
    pub fn with_message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches a message catalog.
    pub fn with_catalog(mut self, catalog: Arc<MessageCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Returns the message locale.
    pub fn lang(&self) -> Option<&str> {
        self.lang.as_deref()
    }

    /// Returns whether the whole run stops at the first issue.
    pub fn abort_early(&self) -> bool {
        self.abort_early
    }

    /// Returns whether pipelines stop at their first issue.
    pub fn abort_pipe_early(&self) -> bool {
        self.abort_pipe_early
    }

    /// Returns the config-level message override.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Returns the attached message catalog.
    pub fn catalog(&self) -> Option<&MessageCatalog> {
        self.catalog.as_deref()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Config>();
    assert_sync::<Config>();
};
