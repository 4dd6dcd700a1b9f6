//! Fixed-position array schemas.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{add_issue, IssueContext, IssueDetail, IssueKind};
use crate::interop::ToJsonSchema;
use crate::message::Message;
use crate::path::{ContainerType, IssuePath};

use super::array::{array_items, index_item};
use super::traits::{SchemaInfo, SchemaLike};
use super::type_issue;

/// How to handle items past the declared positions.
pub enum TupleRest {
    /// Drop extra items from the output (default).
    Ignore,
    /// Report a schema issue for the first extra item.
    Reject,
    /// Validate every extra item against a schema.
    Rest(Box<dyn SchemaLike>),
}

/// A schema for arrays with one schema per position.
///
/// # Example
///
/// ```rust
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let point = Schema::tuple().item(Schema::number()).item(Schema::number());
///
/// assert!(safe_parse(&point, json!([1, 2])).is_success());
///
/// let issues = safe_parse(&point, json!([1])).into_result().unwrap_err();
/// assert_eq!(issues.first().received, "missing");
/// assert_eq!(issues.first().path.dot_path(), "1");
/// ```
pub struct TupleSchema {
    items: Vec<Box<dyn SchemaLike>>,
    rest: TupleRest,
    message: Option<Message>,
}

impl TupleSchema {
    /// Creates an empty tuple schema.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            rest: TupleRest::Ignore,
            message: None,
        }
    }

    /// Appends a positional item schema.
    pub fn item<S>(mut self, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.items.push(Box::new(schema));
        self
    }

    /// Reports an issue when the input has more items than declared.
    pub fn strict(mut self) -> Self {
        self.rest = TupleRest::Reject;
        self
    }

    /// Validates items past the declared positions against `schema`.
    pub fn rest<S>(mut self, schema: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        self.rest = TupleRest::Rest(Box::new(schema));
        self
    }

    /// Sets the message used when the value is not an array.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Default for TupleSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl ToJsonSchema for TupleSchema {
    fn to_json_schema(&self) -> Value {
        let prefix: Vec<Value> = self.items.iter().map(|s| s.to_json_schema()).collect();
        let mut schema = json!({
            "type": "array",
            "prefixItems": prefix,
            "minItems": self.items.len(),
        });
        match &self.rest {
            TupleRest::Ignore => {}
            TupleRest::Reject => schema["items"] = Value::Bool(false),
            TupleRest::Rest(rest) => schema["items"] = rest.to_json_schema(),
        }
        schema
    }
}

impl SchemaInfo for TupleSchema {
    fn code(&self) -> &str {
        match self.rest {
            TupleRest::Ignore => "tuple",
            TupleRest::Reject => "strict_tuple",
            TupleRest::Rest(_) => "tuple_with_rest",
        }
    }

    fn expects(&self) -> String {
        "Array".to_string()
    }
}

/// Reports a declared position that is absent from the input.
pub(crate) fn missing_item_issue(
    dataset: &mut Dataset,
    code: &str,
    container: &Arc<Value>,
    index: usize,
    expects: String,
    config: &Config,
) {
    add_issue(
        dataset,
        IssueContext::new(IssueKind::Schema, code),
        "type",
        config,
        IssueDetail::new()
            .missing()
            .expected(expects)
            .path(IssuePath::from_item(index_item(ContainerType::Tuple, container, index))),
    );
    dataset.typed = false;
}

/// Reports the first item past the declared positions under a strict policy.
pub(crate) fn extra_item_issue(
    dataset: &mut Dataset,
    code: &str,
    container: &Arc<Value>,
    index: usize,
    config: &Config,
) {
    let input = array_items(container).get(index).cloned().unwrap_or(Value::Null);
    add_issue(
        dataset,
        IssueContext::new(IssueKind::Schema, code),
        "type",
        config,
        IssueDetail::new()
            .input(input)
            .expected("never")
            .path(IssuePath::from_item(index_item(ContainerType::Tuple, container, index))),
    );
    dataset.typed = false;
}

impl SchemaLike for TupleSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.value.is_array() {
            type_issue(&mut dataset, self, self.message.as_ref(), config);
            return dataset;
        }

        let container = Arc::new(std::mem::take(&mut dataset.value));
        let input = array_items(&container);
        dataset.typed = true;
        let mut output = Vec::with_capacity(input.len());
        let mut aborted = false;

        for (index, schema) in self.items.iter().enumerate() {
            let Some(value) = input.get(index) else {
                missing_item_issue(&mut dataset, self.code(), &container, index, schema.expects(), config);
                if config.abort_early() {
                    aborted = true;
                    break;
                }
                continue;
            };

            let child = schema.run(Dataset::new(value.clone()), config);
            if child.has_issues() {
                dataset.merge_issues(child.issues, &index_item(ContainerType::Tuple, &container, index));
                if config.abort_early() {
                    dataset.typed = false;
                    aborted = true;
                    break;
                }
            }
            dataset.typed &= child.typed;
            output.push(child.value);
        }

        if !aborted && input.len() > self.items.len() {
            match &self.rest {
                TupleRest::Ignore => {}
                TupleRest::Reject => {
                    extra_item_issue(&mut dataset, self.code(), &container, self.items.len(), config);
                }
                TupleRest::Rest(rest) => {
                    for (index, value) in input.iter().enumerate().skip(self.items.len()) {
                        let child = rest.run(Dataset::new(value.clone()), config);
                        if child.has_issues() {
                            dataset.merge_issues(
                                child.issues,
                                &index_item(ContainerType::Tuple, &container, index),
                            );
                            if config.abort_early() {
                                dataset.typed = false;
                                break;
                            }
                        }
                        dataset.typed &= child.typed;
                        output.push(child.value);
                    }
                }
            }
        }

        dataset.value = Value::Array(output);
        dataset
    }
}
