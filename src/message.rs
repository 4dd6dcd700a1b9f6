//! Message overrides and the message catalog.
//!
//! This module provides [`Message`], a static or computed issue message, and
//! [`MessageCatalog`], the side-table consulted by every issue creation.
//! A catalog is populated once (typically at startup) and then shared
//! read-only through [`Config::with_catalog`](crate::Config::with_catalog).

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Issue;

/// A message override: fixed text or a function of the issue.
#[derive(Clone)]
pub enum Message {
    /// Fixed text.
    Static(String),
    /// Text computed from the issue being reported.
    Dynamic(Arc<dyn Fn(&Issue) -> String + Send + Sync>),
}

impl Message {
    /// Creates a message computed from the issue.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sluice::Message;
    ///
    /// let message = Message::from_fn(|issue| format!("bad value: {}", issue.received));
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&Issue) -> String + Send + Sync + 'static,
    {
        Message::Dynamic(Arc::new(f))
    }

    /// Renders the message for an issue.
    pub fn render(&self, issue: &Issue) -> String {
        match self {
            Message::Static(text) => text.clone(),
            Message::Dynamic(f) => f(issue),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Static(text) => f.debug_tuple("Static").field(text).finish(),
            Message::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Static(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Static(text)
    }
}

/// Messages keyed by language; `None` is the language-neutral entry.
type LangMap = HashMap<Option<String>, Message>;

/// A thread-safe table of message overrides.
///
/// Three tables are kept:
/// - **global** messages apply to every issue,
/// - **schema** messages apply to schema (type/shape) issues only,
/// - **specific** messages apply to one check, keyed by its code
///   (e.g. `min_length`).
///
/// Each table is keyed by language. Lookups try the exact language first and
/// fall back to the language-neutral entry.
///
/// # Example
///
/// ```rust
/// use sluice::MessageCatalog;
///
/// let catalog = MessageCatalog::new();
/// catalog.set_global_message("Something is wrong", None);
/// catalog.set_specific_message("min_length", "Zu kurz", Some("de"));
///
/// assert!(catalog.specific_message("min_length", Some("de")).is_some());
/// assert!(catalog.specific_message("min_length", Some("en")).is_none());
/// assert!(catalog.global_message(Some("fr")).is_some());
/// ```
#[derive(Debug, Default)]
pub struct MessageCatalog {
    global: RwLock<LangMap>,
    schema: RwLock<LangMap>,
    specific: RwLock<HashMap<String, LangMap>>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message used for every issue in `lang`.
    pub fn set_global_message(&self, message: impl Into<Message>, lang: Option<&str>) {
        self.global
            .write()
            .insert(lang.map(str::to_string), message.into());
    }

    /// Returns the global message for `lang`.
    pub fn global_message(&self, lang: Option<&str>) -> Option<Message> {
        lookup(&self.global.read(), lang)
    }

    /// Removes the global message for `lang`.
    pub fn delete_global_message(&self, lang: Option<&str>) {
        self.global.write().remove(&lang.map(str::to_string));
    }

    /// Sets the message used for schema issues in `lang`.
    pub fn set_schema_message(&self, message: impl Into<Message>, lang: Option<&str>) {
        self.schema
            .write()
            .insert(lang.map(str::to_string), message.into());
    }

    /// Returns the schema message for `lang`.
    pub fn schema_message(&self, lang: Option<&str>) -> Option<Message> {
        lookup(&self.schema.read(), lang)
    }

    /// Removes the schema message for `lang`.
    pub fn delete_schema_message(&self, lang: Option<&str>) {
        self.schema.write().remove(&lang.map(str::to_string));
    }

    /// Sets the message used for issues reported by `reference` in `lang`.
    pub fn set_specific_message(
        &self,
        reference: impl Into<String>,
        message: impl Into<Message>,
        lang: Option<&str>,
    ) {
        self.specific
            .write()
            .entry(reference.into())
            .or_default()
            .insert(lang.map(str::to_string), message.into());
    }

    /// Returns the message registered for `reference` in `lang`.
    pub fn specific_message(&self, reference: &str, lang: Option<&str>) -> Option<Message> {
        self.specific
            .read()
            .get(reference)
            .and_then(|messages| lookup(messages, lang))
    }

    /// Removes the message registered for `reference` in `lang`.
    pub fn delete_specific_message(&self, reference: &str, lang: Option<&str>) {
        if let Some(messages) = self.specific.write().get_mut(reference) {
            messages.remove(&lang.map(str::to_string));
        }
    }
}

fn lookup(messages: &LangMap, lang: Option<&str>) -> Option<Message> {
    lang.and_then(|l| messages.get(&Some(l.to_string())))
        .or_else(|| messages.get(&None))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;

    fn issue() -> Issue {
        Issue::new(IssueKind::Validation, "email", "").with_received("\"x\"")
    }

    #[test]
    fn test_static_and_dynamic_render() {
        assert_eq!(Message::from("fixed").render(&issue()), "fixed");

        let dynamic = Message::from_fn(|i| format!("got {}", i.received));
        assert_eq!(dynamic.render(&issue()), "got \"x\"");
    }

    #[test]
    fn test_lang_fallback() {
        let catalog = MessageCatalog::new();
        catalog.set_schema_message("neutral", None);
        catalog.set_schema_message("deutsch", Some("de"));

        let render = |m: Option<Message>| m.map(|m| m.render(&issue()));
        assert_eq!(render(catalog.schema_message(Some("de"))), Some("deutsch".to_string()));
        assert_eq!(render(catalog.schema_message(Some("fr"))), Some("neutral".to_string()));
        assert_eq!(render(catalog.schema_message(None)), Some("neutral".to_string()));
    }

    #[test]
    fn test_delete_messages() {
        let catalog = MessageCatalog::new();
        catalog.set_global_message("g", None);
        catalog.set_specific_message("email", "s", None);

        catalog.delete_global_message(None);
        catalog.delete_specific_message("email", None);

        assert!(catalog.global_message(None).is_none());
        assert!(catalog.specific_message("email", None).is_none());
    }

    #[test]
    fn test_specific_is_per_reference() {
        let catalog = MessageCatalog::new();
        catalog.set_specific_message("email", "bad email", None);

        assert!(catalog.specific_message("email", None).is_some());
        assert!(catalog.specific_message("url", None).is_none());
    }

    #[test]
    fn test_debug_hides_closure() {
        let message = Message::from_fn(|_| String::new());
        assert_eq!(format!("{:?}", message), "Dynamic(..)");
    }
}
