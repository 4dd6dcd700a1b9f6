//! Async object schemas.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::schema::{
    entry_item, missing_key_issue, object_json_schema, type_issue, unknown_key_issue, Presence,
    Schema, SchemaInfo,
};

use super::AsyncSchemaLike;

struct AsyncEntry {
    schema: Box<dyn AsyncSchemaLike>,
    presence: Presence,
}

enum AsyncUnknownKeys {
    Strip,
    Passthrough,
    Reject,
    Rest(Box<dyn AsyncSchemaLike>),
}

/// An object schema whose entries may be async.
///
/// Entry schemas are awaited concurrently and merged in declaration order.
/// With `abort_early`, entries are awaited one at a time so that the run
/// can stop at the first failing entry. Unknown keys are dropped unless
/// [`loose`](Self::loose), [`strict`](Self::strict) or [`rest`](Self::rest)
/// says otherwise, with the same codes as [`ObjectSchema`](crate::ObjectSchema).
///
/// # Example
///
/// ```rust
/// use sluice::effect::check_async;
/// use sluice::{safe_parse_async, Schema};
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let schema = Schema::object_async()
///     .entry("id", Schema::number())
///     .entry("handle", Schema::pipe_async(Schema::string()).action(check_async(|h| async move { h != "root" })));
///
/// let issues = safe_parse_async(&schema, json!({"id": "x", "handle": "root"}))
///     .await
///     .into_result()
///     .unwrap_err();
/// let paths: Vec<_> = issues.iter().map(|i| i.path.dot_path()).collect();
/// assert_eq!(paths, vec!["id", "handle"]);
/// # });
/// ```
pub struct ObjectSchemaAsync {
    entries: IndexMap<String, AsyncEntry>,
    unknown_keys: AsyncUnknownKeys,
    message: Option<Message>,
}

impl ObjectSchemaAsync {
    /// Creates an async object schema with no entries.
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            unknown_keys: AsyncUnknownKeys::Strip,
            message: None,
        }
    }

    fn insert<S>(mut self, key: impl Into<String>, schema: S, presence: Presence) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.entries.insert(
            key.into(),
            AsyncEntry {
                schema: Box::new(schema),
                presence,
            },
        );
        self
    }

    /// Adds a required entry.
    pub fn entry<S>(self, key: impl Into<String>, schema: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.insert(key, schema, Presence::Required)
    }

    /// Adds an entry that may be absent.
    pub fn optional<S>(self, key: impl Into<String>, schema: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.insert(key, schema, Presence::Optional)
    }

    /// Adds an entry that takes `default` when absent.
    pub fn default<S>(self, key: impl Into<String>, schema: S, default: Value) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.insert(key, schema, Presence::Default(default))
    }

    /// Copies unknown keys to the output unchecked.
    pub fn loose(mut self) -> Self {
        self.unknown_keys = AsyncUnknownKeys::Passthrough;
        self
    }

    /// Reports an issue when the input has a key the schema does not declare.
    pub fn strict(mut self) -> Self {
        self.unknown_keys = AsyncUnknownKeys::Reject;
        self
    }

    /// Validates the values of unknown keys against `schema`.
    pub fn rest<S>(mut self, schema: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.unknown_keys = AsyncUnknownKeys::Rest(Box::new(schema));
        self
    }

    /// Sets the message used when the value is not an object.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Returns the schema of a declared entry.
    pub fn entry_schema(&self, key: &str) -> Option<&dyn AsyncSchemaLike> {
        self.entries.get(key).map(|entry| entry.schema.as_ref())
    }

    /// Merges one entry's outcome. Returns false when the run must stop.
    #[allow(clippy::too_many_arguments)]
    fn merge_entry(
        &self,
        dataset: &mut Dataset,
        output: &mut Map<String, Value>,
        container: &Arc<Value>,
        key: &str,
        presence: &Presence,
        child: Option<Dataset>,
        config: &Config,
    ) -> bool {
        let Some(child) = child else {
            match presence {
                Presence::Required => {
                    missing_key_issue(dataset, self.code(), container, key, config);
                    dataset.typed = false;
                    if config.abort_early() {
                        return false;
                    }
                }
                Presence::Optional => {}
                Presence::Default(default) => {
                    output.insert(key.to_string(), default.clone());
                }
            }
            return true;
        };

        if child.has_issues() {
            dataset.merge_issues(child.issues, &entry_item(container, key));
            if config.abort_early() {
                dataset.typed = false;
                return false;
            }
        }
        dataset.typed &= child.typed;
        output.insert(key.to_string(), child.value);
        true
    }

    async fn merge_unknown_keys(
        &self,
        dataset: &mut Dataset,
        output: &mut Map<String, Value>,
        container: &Arc<Value>,
        config: &Config,
    ) {
        let unknown: Vec<(&String, &Value)> = container
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(key, _)| !self.entries.contains_key(key.as_str()))
            .collect();

        match &self.unknown_keys {
            AsyncUnknownKeys::Strip => {}
            AsyncUnknownKeys::Passthrough => {
                for (key, value) in unknown {
                    output.insert(key.clone(), value.clone());
                }
            }
            AsyncUnknownKeys::Reject => {
                if let Some((key, _)) = unknown.first() {
                    unknown_key_issue(dataset, self.code(), container, key, config);
                    dataset.typed = false;
                }
            }
            AsyncUnknownKeys::Rest(schema) => {
                if config.abort_early() {
                    for (key, value) in unknown {
                        let child = schema.run_async(Dataset::new(value.clone()), config).await;
                        if !self.merge_entry(dataset, output, container, key, &Presence::Optional, Some(child), config) {
                            break;
                        }
                    }
                } else {
                    let children = join_all(
                        unknown
                            .iter()
                            .map(|(_, value)| schema.run_async(Dataset::new((*value).clone()), config)),
                    )
                    .await;
                    for ((key, _), child) in unknown.into_iter().zip(children) {
                        self.merge_entry(dataset, output, container, key, &Presence::Optional, Some(child), config);
                    }
                }
            }
        }
    }
}

impl Default for ObjectSchemaAsync {
    fn default() -> Self {
        Self::new()
    }
}

impl ToJsonSchema for ObjectSchemaAsync {
    fn to_json_schema(&self) -> Value {
        let additional = match &self.unknown_keys {
            AsyncUnknownKeys::Strip | AsyncUnknownKeys::Passthrough => None,
            AsyncUnknownKeys::Reject => Some(Value::Bool(false)),
            AsyncUnknownKeys::Rest(schema) => Some(schema.to_json_schema()),
        };
        object_json_schema(
            self.entries
                .iter()
                .map(|(key, entry)| (key, entry.schema.to_json_schema(), &entry.presence)),
            additional,
        )
    }
}

impl SchemaInfo for ObjectSchemaAsync {
    fn code(&self) -> &str {
        match self.unknown_keys {
            AsyncUnknownKeys::Strip => "object",
            AsyncUnknownKeys::Passthrough => "loose_object",
            AsyncUnknownKeys::Reject => "strict_object",
            AsyncUnknownKeys::Rest(_) => "object_with_rest",
        }
    }

    fn expects(&self) -> String {
        "Object".to_string()
    }
}

#[async_trait]
impl AsyncSchemaLike for ObjectSchemaAsync {
    async fn run_async(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_object() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        dataset.typed = true;
        let mut output = Map::new();

        if config.abort_early() {
            for (key, entry) in &self.entries {
                let child = match container.get(key.as_str()) {
                    Some(value) => Some(entry.schema.run_async(Dataset::new(value.clone()), config).await),
                    None => None,
                };
                if !self.merge_entry(&mut dataset, &mut output, &container, key, &entry.presence, child, config) {
                    tracing::trace!(key = %key, "async object stopped early");
                    break;
                }
            }
        } else {
            let children = join_all(self.entries.iter().map(|(key, entry)| {
                let value = container.get(key.as_str()).cloned();
                async move {
                    match value {
                        Some(value) => Some(entry.schema.run_async(Dataset::new(value), config).await),
                        None => None,
                    }
                }
            }))
            .await;
            for ((key, entry), child) in self.entries.iter().zip(children) {
                self.merge_entry(&mut dataset, &mut output, &container, key, &entry.presence, child, config);
            }
        }

        if !(config.abort_early() && dataset.has_issues()) {
            self.merge_unknown_keys(&mut dataset, &mut output, &container, config).await;
        }

        dataset.value = Value::Object(output);
        dataset
    }
}

impl Schema {
    /// Creates an async object schema with no entries.
    pub fn object_async() -> ObjectSchemaAsync {
        ObjectSchemaAsync::new()
    }
}
