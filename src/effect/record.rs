//! Async record schemas.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::schema::{insert_record_entry, record_item, type_issue, Schema, SchemaInfo};

use super::AsyncSchemaLike;

/// A record schema whose key and value schemas may be async.
///
/// Entries are awaited concurrently and merged in input key order, or one at
/// a time under `abort_early`. Within an entry, key issues come before value
/// issues.
pub struct RecordSchemaAsync {
    key: Box<dyn AsyncSchemaLike>,
    value: Box<dyn AsyncSchemaLike>,
    message: Option<Message>,
}

impl RecordSchemaAsync {
    /// Creates an async record schema.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: AsyncSchemaLike + 'static,
        V: AsyncSchemaLike + 'static,
    {
        Self {
            key: Box::new(key),
            value: Box::new(value),
            message: None,
        }
    }

    /// Sets the message used when the value is not an object.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    async fn run_entry(&self, key: &str, value: &Value, config: &Config) -> (Dataset, Dataset) {
        futures::join!(
            self.key.run_async(Dataset::new(Value::from(key)), config),
            self.value.run_async(Dataset::new(value.clone()), config),
        )
    }
}

impl ToJsonSchema for RecordSchemaAsync {
    fn to_json_schema(&self) -> Value {
        json!({
            "type": "object",
            "propertyNames": self.key.to_json_schema(),
            "additionalProperties": self.value.to_json_schema(),
        })
    }
}

impl SchemaInfo for RecordSchemaAsync {
    fn code(&self) -> &str {
        "record"
    }

    fn expects(&self) -> String {
        "Object".to_string()
    }
}

#[async_trait]
impl AsyncSchemaLike for RecordSchemaAsync {
    async fn run_async(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_object() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        let entries: Vec<(&String, &Value)> = container.as_object().into_iter().flatten().collect();
        dataset.typed = true;
        let mut output = Map::new();

        if config.abort_early() {
            for (key, value) in entries {
                let mut key_result = self.key.run_async(Dataset::new(Value::from(key.as_str())), config).await;
                if key_result.has_issues() {
                    let issues = std::mem::take(&mut key_result.issues);
                    dataset.merge_issues(issues, &record_item(&container, key).on_key());
                    dataset.typed = false;
                    tracing::trace!(key = %key, "async record stopped early");
                    break;
                }

                let mut value_result = self.value.run_async(Dataset::new(value.clone()), config).await;
                if value_result.has_issues() {
                    let issues = std::mem::take(&mut value_result.issues);
                    dataset.merge_issues(issues, &record_item(&container, key));
                    dataset.typed = false;
                    tracing::trace!(key = %key, "async record stopped early");
                    break;
                }

                insert_record_entry(&mut dataset, &mut output, key_result, value_result);
            }
        } else {
            let results = join_all(
                entries
                    .iter()
                    .map(|(key, value)| self.run_entry(key.as_str(), value, config)),
            )
            .await;
            for ((key, _), (mut key_result, mut value_result)) in entries.into_iter().zip(results) {
                if key_result.has_issues() {
                    let issues = std::mem::take(&mut key_result.issues);
                    dataset.merge_issues(issues, &record_item(&container, key).on_key());
                }
                if value_result.has_issues() {
                    let issues = std::mem::take(&mut value_result.issues);
                    dataset.merge_issues(issues, &record_item(&container, key));
                }
                insert_record_entry(&mut dataset, &mut output, key_result, value_result);
            }
        }

        dataset.value = Value::Object(output);
        dataset
    }
}

impl Schema {
    /// Creates an async record schema.
    pub fn record_async<K, V>(key: K, value: V) -> RecordSchemaAsync
    where
        K: AsyncSchemaLike + 'static,
        V: AsyncSchemaLike + 'static,
    {
        RecordSchemaAsync::new(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{min_length, to_upper_case};
    use crate::effect::{check_async, PipeAsync};
    use crate::path::{ContainerType, PathOrigin};
    use std::time::Duration;

    #[tokio::test]
    async fn test_key_issues_precede_value_issues() {
        let slow_key = PipeAsync::new(Schema::string())
            .action(min_length(2))
            .action(check_async(|_| async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                true
            }));
        let schema = RecordSchemaAsync::new(slow_key, Schema::number());

        let result = schema
            .run_async(Dataset::new(json!({"a": "x", "bb": 2})), &Config::new())
            .await;
        assert!(!result.typed);
        assert_eq!(result.issues.len(), 2);

        let key_item = result.issues[0].path.last().unwrap();
        assert_eq!(key_item.origin, PathOrigin::Key);
        assert_eq!(key_item.container, ContainerType::Record);
        assert_eq!(result.issues[0].code, "min_length");

        let value_item = result.issues[1].path.last().unwrap();
        assert_eq!(value_item.origin, PathOrigin::Value);
        assert_eq!(value_item.value(), Some(&json!("x")));
        assert_eq!(result.value, json!({"bb": 2}));
    }

    #[tokio::test]
    async fn test_transformed_keys() {
        let schema = RecordSchemaAsync::new(
            crate::Pipe::new(Schema::string()).action(to_upper_case()),
            Schema::number(),
        );
        let result = schema
            .run_async(Dataset::new(json!({"a": 1, "b": 2})), &Config::new())
            .await;
        assert!(result.typed);
        assert_eq!(result.value, json!({"A": 1, "B": 2}));
    }

    #[tokio::test]
    async fn test_abort_early_stops_at_first_entry() {
        let schema = RecordSchemaAsync::new(Schema::string(), Schema::number());
        let config = Config::new().with_abort_early(true);
        let result = schema
            .run_async(Dataset::new(json!({"a": "x", "b": "y"})), &config)
            .await;
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].path.dot_path(), "a");
    }
}
