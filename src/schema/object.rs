//! Object schema validation.
//!
//! This module provides [`ObjectSchema`] for validating JSON objects with
//! required, optional and defaulted entries, plus a policy for keys the
//! schema does not declare.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{add_issue, IssueContext, IssueDetail, IssueKind};
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::path::{ContainerType, IssuePath, PathItem, PathKey};

use super::traits::{SchemaInfo, SchemaLike};
use super::type_issue;

/// Whether an entry must be present.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Presence {
    Required,
    Optional,
    Default(Value),
}

/// Definition of an entry within an object schema.
struct EntryDef {
    schema: Box<dyn SchemaLike>,
    presence: Presence,
}

/// How to handle keys not declared in the schema.
pub enum UnknownKeys {
    /// Drop unknown keys from the output (default).
    Strip,
    /// Copy unknown keys to the output unchecked.
    Passthrough,
    /// Report a schema issue for the first unknown key.
    Reject,
    /// Validate every unknown value against a schema.
    Rest(Box<dyn SchemaLike>),
}

/// A schema for validating JSON objects.
///
/// Every declared entry is checked, and issues from all of them are
/// collected, unless `abort_early` is set. Entry issues carry a path item
/// pointing at the entry's key.
///
/// # Example
///
/// ```rust
/// use sluice::action::min_length;
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let schema = Schema::object()
///     .entry("name", Schema::pipe(Schema::string()).action(min_length(1)))
///     .entry("age", Schema::number())
///     .optional("email", Schema::string())
///     .default("role", Schema::string(), json!("user"));
///
/// let result = safe_parse(&schema, json!({"name": "Alice", "age": 30}));
/// assert_eq!(
///     result.into_result().unwrap(),
///     json!({"name": "Alice", "age": 30, "role": "user"})
/// );
///
/// let issues = safe_parse(&schema, json!({"name": "", "age": "x"})).into_result().unwrap_err();
/// assert_eq!(issues.len(), 2);
/// ```
pub struct ObjectSchema {
    entries: IndexMap<String, EntryDef>,
    unknown_keys: UnknownKeys,
    message: Option<Message>,
}

impl ObjectSchema {
    /// Creates an object schema with no entries that strips unknown keys.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            unknown_keys: UnknownKeys::Strip,
            message: None,
        }
    }

    fn insert<S>(mut self, key: impl Into<String>, schema: S, presence: Presence) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.entries.insert(
            key.into(),
            EntryDef {
                schema: Box::new(schema),
                presence,
            },
        );
        self
    }

    /// Adds a required entry.
    pub fn entry<S>(self, key: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.insert(key, schema, Presence::Required)
    }

    /// Adds an entry that may be absent.
    pub fn optional<S>(self, key: impl Into<String>, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.insert(key, schema, Presence::Optional)
    }

    /// Adds an entry that takes `default` when absent.
    ///
    /// The default is copied to the output as given; it is not validated.
    pub fn default<S>(self, key: impl Into<String>, schema: S, default: Value) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.insert(key, schema, Presence::Default(default))
    }

    /// Copies unknown keys to the output unchecked.
    pub fn loose(self) -> Self {
        self.unknown_keys(UnknownKeys::Passthrough)
    }

    /// Reports an issue when the input has a key the schema does not declare.
    pub fn strict(self) -> Self {
        self.unknown_keys(UnknownKeys::Reject)
    }

    /// Validates the values of unknown keys against `schema`.
    pub fn rest<S>(self, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.unknown_keys(UnknownKeys::Rest(Box::new(schema)))
    }

    /// Sets the unknown-key policy.
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }

    /// Sets the message used when the value is not an object.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the schema of a declared entry.
    pub fn entry_schema(&self, key: &str) -> Option<&dyn SchemaLike> {
        self.entries.get(key).map(|entry| entry.schema.as_ref())
    }

    /// Returns the declared keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for ObjectSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports a declared key that is absent from the input.
pub(crate) fn missing_key_issue(
    dataset: &mut Dataset,
    code: &str,
    container: &Arc<Value>,
    key: &str,
    config: &Config,
) {
    let expected = format!("\"{}\"", key);
    let item = entry_item(container, key).on_key();
    add_issue(
        dataset,
        IssueContext::new(IssueKind::Schema, code),
        "key",
        config,
        IssueDetail::new()
            .missing()
            .expected(expected)
            .path(IssuePath::from_item(item)),
    );
}

/// Reports an undeclared key under a strict policy.
pub(crate) fn unknown_key_issue(
    dataset: &mut Dataset,
    code: &str,
    container: &Arc<Value>,
    key: &str,
    config: &Config,
) {
    let item = entry_item(container, key).on_key();
    add_issue(
        dataset,
        IssueContext::new(IssueKind::Schema, code),
        "key",
        config,
        IssueDetail::new()
            .input(Value::from(key))
            .expected("never")
            .path(IssuePath::from_item(item)),
    );
}

/// Path item for an entry value.
pub(crate) fn entry_item(container: &Arc<Value>, key: &str) -> PathItem {
    PathItem::new(ContainerType::Object, Arc::clone(container), PathKey::field(key))
}

/// JSON Schema for an object with the given entries and unknown-key policy.
pub(crate) fn object_json_schema<'a>(
    entries: impl Iterator<Item = (&'a String, Value, &'a Presence)>,
    additional: Option<Value>,
) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (key, mut schema, presence) in entries {
        match presence {
            Presence::Required => required.push(Value::from(key.as_str())),
            Presence::Default(default) => {
                if let Value::Object(fields) = &mut schema {
                    fields.insert("default".to_string(), default.clone());
                }
            }
            Presence::Optional => {}
        }
        properties.insert(key.clone(), schema);
    }

    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = Value::Array(required);
    }
    if let Some(additional) = additional {
        schema["additionalProperties"] = additional;
    }
    schema
}

impl ToJsonSchema for ObjectSchema {
    fn to_json_schema(&self) -> Value {
        let additional = match &self.unknown_keys {
            UnknownKeys::Strip | UnknownKeys::Passthrough => None,
            UnknownKeys::Reject => Some(Value::Bool(false)),
            UnknownKeys::Rest(schema) => Some(schema.to_json_schema()),
        };
        object_json_schema(
            self.entries
                .iter()
                .map(|(key, entry)| (key, entry.schema.to_json_schema(), &entry.presence)),
            additional,
        )
    }
}

impl SchemaInfo for ObjectSchema {
    fn code(&self) -> &str {
        match self.unknown_keys {
            UnknownKeys::Strip => "object",
            UnknownKeys::Passthrough => "loose_object",
            UnknownKeys::Reject => "strict_object",
            UnknownKeys::Rest(_) => "object_with_rest",
        }
    }

    fn expects(&self) -> String {
        "Object".to_string()
    }
}

impl SchemaLike for ObjectSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_object() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        dataset.typed = true;
        let mut output = Map::new();

        for (key, entry) in &self.entries {
            let Some(value) = container.get(key.as_str()) else {
                match &entry.presence {
                    Presence::Required => {
                        missing_key_issue(&mut dataset, self.code(), &container, key, config);
                        dataset.typed = false;
                        if config.abort_early() {
                            break;
                        }
                    }
                    Presence::Optional => {}
                    Presence::Default(default) => {
                        output.insert(key.clone(), default.clone());
                    }
                }
                continue;
            };

            let child = entry.schema.run(Dataset::new(value.clone()), config);
            if child.has_issues() {
                dataset.merge_issues(child.issues, &entry_item(&container, key));
                if config.abort_early() {
                    tracing::trace!(key = %key, "object stopped early");
                    dataset.typed = false;
                    break;
                }
            }
            dataset.typed &= child.typed;
            output.insert(key.clone(), child.value);
        }

        if !(config.abort_early() && dataset.has_issues()) {
            for (key, value) in container.as_object().into_iter().flatten() {
                if self.entries.contains_key(key) {
                    continue;
                }
                match &self.unknown_keys {
                    UnknownKeys::Strip => {}
                    UnknownKeys::Passthrough => {
                        output.insert(key.clone(), value.clone());
                    }
                    UnknownKeys::Reject => {
                        unknown_key_issue(&mut dataset, self.code(), &container, key, config);
                        dataset.typed = false;
                        break;
                    }
                    UnknownKeys::Rest(schema) => {
                        let child = schema.run(Dataset::new(value.clone()), config);
                        if child.has_issues() {
                            dataset.merge_issues(child.issues, &entry_item(&container, key));
                            if config.abort_early() {
                                dataset.typed = false;
                                break;
                            }
                        }
                        dataset.typed &= child.typed;
                        output.insert(key.clone(), child.value);
                    }
                }
            }
        }

        dataset.value = Value::Object(output);
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathOrigin;
    use crate::schema::Schema;

    fn run(schema: &ObjectSchema, value: Value) -> Dataset {
        schema.run(Dataset::new(value), &Config::new())
    }

    #[test]
    fn test_strips_unknown_keys_by_default() {
        let schema = ObjectSchema::new().entry("a", Schema::number());
        let result = run(&schema, json!({"a": 1, "b": 2}));
        assert!(result.typed);
        assert_eq!(result.value, json!({"a": 1}));
    }

    #[test]
    fn test_loose_keeps_unknown_keys() {
        let schema = ObjectSchema::new().entry("a", Schema::number()).loose();
        let result = run(&schema, json!({"a": 1, "b": 2}));
        assert_eq!(result.value, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_strict_rejects_unknown_key() {
        let schema = ObjectSchema::new().entry("a", Schema::number()).strict();
        let result = run(&schema, json!({"a": 1, "b": 2}));
        assert!(!result.typed);

        let issue = &result.issues[0];
        assert_eq!(issue.code, "strict_object");
        assert_eq!(issue.expected.as_deref(), Some("never"));
        assert_eq!(issue.received, "\"b\"");
        assert_eq!(issue.path.dot_path(), "b");
        assert_eq!(issue.path.items().next().map(|i| i.origin), Some(PathOrigin::Key));
    }

    #[test]
    fn test_rest_validates_unknown_values() {
        let schema = ObjectSchema::new().rest(Schema::number());
        let result = run(&schema, json!({"x": 1, "y": "two"}));
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].path.dot_path(), "y");
        assert!(!result.typed);
    }

    #[test]
    fn test_missing_required_key() {
        let schema = ObjectSchema::new().entry("name", Schema::string());
        let result = run(&schema, json!({}));

        let issue = &result.issues[0];
        assert_eq!(issue.code, "object");
        assert_eq!(issue.input, None);
        assert_eq!(issue.received, "missing");
        assert_eq!(issue.message, "Invalid key: Expected \"name\" but received missing");

        let item = issue.path.last().unwrap();
        assert_eq!(item.origin, PathOrigin::Key);
        assert_eq!(item.value(), None);
        assert!(!result.typed);
    }

    #[test]
    fn test_entry_issues_share_one_container() {
        let schema = ObjectSchema::new()
            .entry("a", Schema::string())
            .entry("b", Schema::string())
            .entry("c", Schema::string());
        let result = run(&schema, json!({"a": 1, "b": 2}));
        assert_eq!(result.issues.len(), 3);

        let first = &result.issues[0].path.last().unwrap().input;
        for issue in &result.issues[1..] {
            assert!(Arc::ptr_eq(first, &issue.path.last().unwrap().input));
        }
    }

    #[test]
    fn test_child_failure_keeps_outer_shape_typed() {
        let inner = Schema::pipe(Schema::string()).action(crate::action::min_length(3));
        let schema = ObjectSchema::new().entry("name", inner);
        let result = run(&schema, json!({"name": "ab"}));
        assert!(result.typed);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_abort_early_stops_at_first_entry() {
        let schema = ObjectSchema::new()
            .entry("a", Schema::string())
            .entry("b", Schema::string());
        let config = Config::new().with_abort_early(true);
        let result = schema.run(Dataset::new(json!({"a": 1, "b": 2})), &config);
        assert_eq!(result.issues.len(), 1);
        assert!(!result.typed);
    }

    #[test]
    fn test_non_object_input() {
        let result = run(&ObjectSchema::new(), json!([1]));
        assert_eq!(result.issues[0].expected.as_deref(), Some("Object"));
        assert_eq!(result.value, json!([1]));
    }
}
