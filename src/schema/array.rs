//! Array schema validation.
//!
//! This module provides [`ArraySchema`] for validating arrays whose items
//! all share one schema.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::path::{ContainerType, PathItem, PathKey};

use super::traits::{SchemaInfo, SchemaLike};
use super::type_issue;

/// A schema for validating arrays.
///
/// Each item is validated against the item schema; issues carry a path item
/// with the item's index. Length and other whole-array constraints are
/// expressed as pipeline actions.
///
/// # Example
///
/// ```rust
/// use sluice::action::{max_length, min_length};
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let tags = Schema::pipe(Schema::array(Schema::pipe(Schema::string()).action(min_length(1))))
///     .action(max_length(3));
///
/// assert!(safe_parse(&tags, json!(["a", "b"])).is_success());
///
/// let issues = safe_parse(&tags, json!(["a", ""])).into_result().unwrap_err();
/// assert_eq!(issues.first().path.dot_path(), "1");
/// ```
pub struct ArraySchema {
    item: Box<dyn SchemaLike>,
    parallel: bool,
    message: Option<Message>,
}

impl ArraySchema {
    /// Creates an array schema with the given item schema.
    pub fn new<S>(item: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        Self {
            item: Box::new(item),
            parallel: false,
            message: None,
        }
    }

    /// Validates items on the rayon thread pool.
    ///
    /// Only takes effect when `abort_early` is off, since stopping at the
    /// first failing item requires visiting items in order. Issues are
    /// merged in index order either way.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Sets the message used when the value is not an array.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn run_item(&self, item: &Value, config: &Config) -> Dataset {
        self.item.run(Dataset::new(item.clone()), config)
    }
}

/// Path item for the array element at `index`.
pub(crate) fn index_item(kind: ContainerType, container: &Arc<Value>, index: usize) -> PathItem {
    PathItem::new(kind, Arc::clone(container), PathKey::index(index))
}

/// Items of a shared array container.
pub(crate) fn array_items(container: &Value) -> &[Value] {
    container.as_array().map_or(&[][..], Vec::as_slice)
}

impl ToJsonSchema for ArraySchema {
    fn to_json_schema(&self) -> Value {
        json!({ "type": "array", "items": self.item.to_json_schema() })
    }
}

impl SchemaInfo for ArraySchema {
    fn code(&self) -> &str {
        "array"
    }

    fn expects(&self) -> String {
        "Array".to_string()
    }
}

impl SchemaLike for ArraySchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_array() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        let input = array_items(&container);
        dataset.typed = true;
        let mut output = Vec::with_capacity(input.len());

        if self.parallel && !config.abort_early() {
            tracing::trace!(items = input.len(), "validating array items in parallel");
            let children: Vec<Dataset> = input
                .par_iter()
                .map(|item| self.run_item(item, config))
                .collect();
            for (index, child) in children.into_iter().enumerate() {
                if child.has_issues() {
                    dataset.merge_issues(child.issues, &index_item(ContainerType::Array, &container, index));
                }
                dataset.typed &= child.typed;
                output.push(child.value);
            }
        } else {
            for (index, item) in input.iter().enumerate() {
                let child = self.run_item(item, config);
                if child.has_issues() {
                    dataset.merge_issues(child.issues, &index_item(ContainerType::Array, &container, index));
                    if config.abort_early() {
                        tracing::trace!(index, "array stopped early");
                        dataset.typed = false;
                        break;
                    }
                }
                dataset.typed &= child.typed;
                output.push(child.value);
            }
        }

        dataset.value = Value::Array(output);
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_all_items_checked() {
        let schema = ArraySchema::new(Schema::number());
        let result = schema.run(Dataset::new(json!([1, "a", 2, "b"])), &Config::new());
        assert!(!result.typed);

        let paths: Vec<_> = result.issues.iter().map(|i| i.path.dot_path()).collect();
        assert_eq!(paths, vec!["1", "3"]);

        let item = result.issues[0].path.last().unwrap();
        assert_eq!(*item.input, json!([1, "a", 2, "b"]));
        assert_eq!(item.value(), Some(&json!("a")));
    }

    #[test]
    fn test_failing_items_share_one_container() {
        let input: Vec<Value> = (0..500).map(Value::from).collect();
        for schema in [ArraySchema::new(Schema::string()), ArraySchema::new(Schema::string()).parallel()] {
            let result = schema.run(Dataset::new(Value::Array(input.clone())), &Config::new());
            assert_eq!(result.issues.len(), 500);

            let first = &result.issues[0].path.last().unwrap().input;
            assert!(result
                .issues
                .iter()
                .all(|issue| Arc::ptr_eq(first, &issue.path.last().unwrap().input)));
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input: Vec<Value> = (0..200)
            .map(|i| if i % 7 == 0 { json!("x") } else { json!(i) })
            .collect();
        let sequential = ArraySchema::new(Schema::number())
            .run(Dataset::new(Value::Array(input.clone())), &Config::new());
        let parallel = ArraySchema::new(Schema::number())
            .parallel()
            .run(Dataset::new(Value::Array(input)), &Config::new());
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_abort_early_stops_at_first_item() {
        let schema = ArraySchema::new(Schema::number()).parallel();
        let config = Config::new().with_abort_early(true);
        let result = schema.run(Dataset::new(json!(["a", "b"])), &config);
        assert_eq!(result.issues.len(), 1);
    }

    #[test]
    fn test_empty_array_is_typed() {
        let result = ArraySchema::new(Schema::string()).run(Dataset::new(json!([])), &Config::new());
        assert!(result.typed);
        assert_eq!(result.value, json!([]));
    }
}
