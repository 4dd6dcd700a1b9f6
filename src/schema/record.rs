//! Map-like objects with validated keys and values.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::path::{ContainerType, PathItem, PathKey};

use super::traits::{SchemaInfo, SchemaLike};
use super::type_issue;

/// A schema for objects used as maps: every key is checked against a key
/// schema and every value against a value schema.
///
/// Issues from the key schema carry a path item with
/// [`PathOrigin::Key`](crate::PathOrigin::Key); issues from the value schema
/// carry [`PathOrigin::Value`](crate::PathOrigin::Value).
///
/// # Example
///
/// ```rust
/// use sluice::action::regex;
/// use sluice::{safe_parse, PathOrigin, Schema};
/// use serde_json::json;
///
/// let scores = Schema::record(
///     Schema::pipe(Schema::string()).action(regex("^[a-z]+$").unwrap()),
///     Schema::number(),
/// );
///
/// let issues = safe_parse(&scores, json!({"Bob": 1})).into_result().unwrap_err();
/// assert_eq!(issues.first().path.last().unwrap().origin, PathOrigin::Key);
/// ```
pub struct RecordSchema {
    key: Box<dyn SchemaLike>,
    value: Box<dyn SchemaLike>,
    message: Option<Message>,
}

impl RecordSchema {
    /// Creates a record schema.
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: SchemaLike + 'static,
        V: SchemaLike + 'static,
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
}

impl ToJsonSchema for RecordSchema {
    fn to_json_schema(&self) -> Value {
        json!({
            "type": "object",
            "propertyNames": self.key.to_json_schema(),
            "additionalProperties": self.value.to_json_schema(),
        })
    }
}

impl SchemaInfo for RecordSchema {
    fn code(&self) -> &str {
        "record"
    }

    fn expects(&self) -> String {
        "Object".to_string()
    }
}

/// Path item for a record entry.
pub(crate) fn record_item(container: &Arc<Value>, key: &str) -> PathItem {
    PathItem::new(ContainerType::Record, Arc::clone(container), PathKey::field(key))
}

/// Copies a checked entry to the output when both its key and its value
/// came back typed.
pub(crate) fn insert_record_entry(
    dataset: &mut Dataset,
    output: &mut Map<String, Value>,
    key: Dataset,
    value: Dataset,
) {
    // A key schema may transform the key; only string output can be a key.
    let output_key = match key.value {
        Value::String(k) if key.typed => Some(k),
        _ => None,
    };
    match output_key {
        Some(k) if value.typed => {
            output.insert(k, value.value);
        }
        _ => dataset.typed = false,
    }
}

impl SchemaLike for RecordSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_object() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        dataset.typed = true;
        let mut output = Map::new();

        for (key, value) in container.as_object().into_iter().flatten() {
            let mut key_result = self.key.run(Dataset::new(Value::from(key.as_str())), config);
            if key_result.has_issues() {
                let issues = std::mem::take(&mut key_result.issues);
                dataset.merge_issues(issues, &record_item(&container, key).on_key());
                if config.abort_early() {
                    dataset.typed = false;
                    break;
                }
            }

            let mut value_result = self.value.run(Dataset::new(value.clone()), config);
            if value_result.has_issues() {
                let issues = std::mem::take(&mut value_result.issues);
                dataset.merge_issues(issues, &record_item(&container, key));
                if config.abort_early() {
                    dataset.typed = false;
                    break;
                }
            }

            insert_record_entry(&mut dataset, &mut output, key_result, value_result);
        }

        dataset.value = Value::Object(output);
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{min_length, to_upper_case};
    use crate::path::PathOrigin;
    use crate::schema::Schema;

    #[test]
    fn test_key_and_value_issues_have_origins() {
        let schema = RecordSchema::new(
            Schema::pipe(Schema::string()).action(min_length(2)),
            Schema::number(),
        );
        let result = schema.run(Dataset::new(json!({"a": "x"})), &Config::new());
        assert_eq!(result.issues.len(), 2);
        assert!(!result.typed);

        let key_item = result.issues[0].path.last().unwrap();
        assert_eq!(key_item.origin, PathOrigin::Key);
        assert_eq!(key_item.container, ContainerType::Record);
        assert_eq!(result.issues[0].code, "min_length");

        let value_item = result.issues[1].path.last().unwrap();
        assert_eq!(value_item.origin, PathOrigin::Value);
        assert_eq!(value_item.value(), Some(&json!("x")));
    }

    #[test]
    fn test_transformed_keys() {
        let schema = RecordSchema::new(
            Schema::pipe(Schema::string()).action(to_upper_case()),
            Schema::number(),
        );
        let result = schema.run(Dataset::new(json!({"a": 1, "b": 2})), &Config::new());
        assert!(result.typed);
        assert_eq!(result.value, json!({"A": 1, "B": 2}));
    }
}
