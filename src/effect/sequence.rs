//! Async array and tuple schemas.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::path::ContainerType;
use crate::schema::{
    array_items, extra_item_issue, index_item, missing_item_issue, type_issue, Schema, SchemaInfo,
};

use super::AsyncSchemaLike;

/// An array schema whose item schema may be async.
///
/// Items are awaited concurrently and merged in index order, or one at a
/// time under `abort_early`.
pub struct ArraySchemaAsync {
    item: Box<dyn AsyncSchemaLike>,
    message: Option<Message>,
}

impl ArraySchemaAsync {
    /// Creates an async array schema.
    pub fn new<S>(item: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        Self {
            item: Box::new(item),
            message: None,
        }
    }

    /// Sets the message used when the value is not an array.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ToJsonSchema for ArraySchemaAsync {
    fn to_json_schema(&self) -> Value {
        json!({ "type": "array", "items": self.item.to_json_schema() })
    }
}

impl SchemaInfo for ArraySchemaAsync {
    fn code(&self) -> &str {
        "array"
    }

    fn expects(&self) -> String {
        "Array".to_string()
    }
}

#[async_trait]
impl AsyncSchemaLike for ArraySchemaAsync {
    async fn run_async(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_array() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        let input = array_items(&container);
        dataset.typed = true;
        let mut output = Vec::with_capacity(input.len());

        if config.abort_early() {
            for (index, item) in input.iter().enumerate() {
                let child = self.item.run_async(Dataset::new(item.clone()), config).await;
                if child.has_issues() {
                    dataset.merge_issues(child.issues, &index_item(ContainerType::Array, &container, index));
                    dataset.typed = false;
                    tracing::trace!(index, "async array stopped early");
                    break;
                }
                dataset.typed &= child.typed;
                output.push(child.value);
            }
        } else {
            let children = join_all(
                input
                    .iter()
                    .map(|item| self.item.run_async(Dataset::new(item.clone()), config)),
            )
            .await;
            for (index, child) in children.into_iter().enumerate() {
                if child.has_issues() {
                    dataset.merge_issues(child.issues, &index_item(ContainerType::Array, &container, index));
                }
                dataset.typed &= child.typed;
                output.push(child.value);
            }
        }

        dataset.value = Value::Array(output);
        dataset
    }
}

enum AsyncTupleRest {
    Ignore,
    Reject,
    Rest(Box<dyn AsyncSchemaLike>),
}

/// A tuple schema whose positional schemas may be async.
///
/// Declared positions and rest items are awaited concurrently and merged
/// in index order, or one at a time under `abort_early`. Extra items follow
/// the same policies as [`TupleSchema`](crate::TupleSchema).
///
/// # Example
///
/// ```rust
/// use sluice::{safe_parse_async, Schema};
/// use serde_json::json;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let pair = Schema::tuple_async().item(Schema::string()).item(Schema::number());
///
/// let issues = safe_parse_async(&pair, json!(["a"])).await.into_result().unwrap_err();
/// assert_eq!(issues.first().received, "missing");
/// assert_eq!(issues.first().path.dot_path(), "1");
/// # });
/// ```
pub struct TupleSchemaAsync {
    items: Vec<Box<dyn AsyncSchemaLike>>,
    rest: AsyncTupleRest,
    message: Option<Message>,
}

impl TupleSchemaAsync {
    /// Creates an empty async tuple schema.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            rest: AsyncTupleRest::Ignore,
            message: None,
        }
    }

    /// Appends a positional item schema.
    pub fn item<S>(mut self, schema: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.items.push(Box::new(schema));
        self
    }

    /// Reports an issue when the input has more items than declared.
    pub fn strict(mut self) -> Self {
        self.rest = AsyncTupleRest::Reject;
        self
    }

    /// Validates items past the declared positions against `schema`.
    pub fn rest<S>(mut self, schema: S) -> Self
    where
        S: AsyncSchemaLike + 'static,
    {
        self.rest = AsyncTupleRest::Rest(Box::new(schema));
        self
    }

    /// Sets the message used when the value is not an array.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Every checked position with its schema, in index order.
    fn positions(&self, len: usize) -> Vec<(usize, &dyn AsyncSchemaLike)> {
        let mut positions: Vec<(usize, &dyn AsyncSchemaLike)> = Vec::with_capacity(len);
        for (index, schema) in self.items.iter().enumerate() {
            positions.push((index, schema.as_ref()));
        }
        if let AsyncTupleRest::Rest(rest) = &self.rest {
            for index in self.items.len()..len {
                positions.push((index, rest.as_ref()));
            }
        }
        positions
    }

    /// Merges one position's outcome. Returns false when the run must stop.
    #[allow(clippy::too_many_arguments)]
    fn merge_item(
        &self,
        dataset: &mut Dataset,
        output: &mut Vec<Value>,
        container: &Arc<Value>,
        index: usize,
        schema: &dyn AsyncSchemaLike,
        child: Option<Dataset>,
        config: &Config,
    ) -> bool {
        let Some(child) = child else {
            missing_item_issue(dataset, self.code(), container, index, schema.expects(), config);
            return !config.abort_early();
        };

        if child.has_issues() {
            dataset.merge_issues(child.issues, &index_item(ContainerType::Tuple, container, index));
            if config.abort_early() {
                dataset.typed = false;
                return false;
            }
        }
        dataset.typed &= child.typed;
        output.push(child.value);
        true
    }
}

impl Default for TupleSchemaAsync {
    fn default() -> Self {
        Self::new()
    }
}

impl ToJsonSchema for TupleSchemaAsync {
    fn to_json_schema(&self) -> Value {
        let prefix: Vec<Value> = self.items.iter().map(|s| s.to_json_schema()).collect();
        let mut schema = json!({
            "type": "array",
            "prefixItems": prefix,
            "minItems": self.items.len(),
        });
        match &self.rest {
            AsyncTupleRest::Ignore => {}
            AsyncTupleRest::Reject => schema["items"] = Value::Bool(false),
            AsyncTupleRest::Rest(rest) => schema["items"] = rest.to_json_schema(),
        }
        schema
    }
}

impl SchemaInfo for TupleSchemaAsync {
    fn code(&self) -> &str {
        match self.rest {
            AsyncTupleRest::Ignore => "tuple",
            AsyncTupleRest::Reject => "strict_tuple",
            AsyncTupleRest::Rest(_) => "tuple_with_rest",
        }
    }

    fn expects(&self) -> String {
        "Array".to_string()
    }
}

#[async_trait]
impl AsyncSchemaLike for TupleSchemaAsync {
    async fn run_async(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_array() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        let input = array_items(&container);
        dataset.typed = true;
        let mut output = Vec::with_capacity(input.len());
        let positions = self.positions(input.len());
        let mut aborted = false;

        if config.abort_early() {
            for (index, schema) in positions {
                let child = match input.get(index) {
                    Some(value) => Some(schema.run_async(Dataset::new(value.clone()), config).await),
                    None => None,
                };
                if !self.merge_item(&mut dataset, &mut output, &container, index, schema, child, config) {
                    tracing::trace!(index, "async tuple stopped early");
                    aborted = true;
                    break;
                }
            }
        } else {
            let children = join_all(positions.iter().map(|&(index, schema)| {
                let value = input.get(index).cloned();
                async move {
                    match value {
                        Some(value) => Some(schema.run_async(Dataset::new(value), config).await),
                        None => None,
                    }
                }
            }))
            .await;
            for ((index, schema), child) in positions.into_iter().zip(children) {
                self.merge_item(&mut dataset, &mut output, &container, index, schema, child, config);
            }
        }

        if !aborted && input.len() > self.items.len() {
            if let AsyncTupleRest::Reject = self.rest {
                extra_item_issue(&mut dataset, self.code(), &container, self.items.len(), config);
            }
        }

        dataset.value = Value::Array(output);
        dataset
    }
}

impl Schema {
    /// Creates an async array schema.
    pub fn array_async<S>(item: S) -> ArraySchemaAsync
    where
        S: AsyncSchemaLike + 'static,
    {
        ArraySchemaAsync::new(item)
    }

    /// Creates an empty async tuple schema.
    pub fn tuple_async() -> TupleSchemaAsync {
        TupleSchemaAsync::new()
    }
}
