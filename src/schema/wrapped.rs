//! Schemas that wrap another schema.

use std::fmt;

use serde_json::{json, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;

use super::traits::{SchemaInfo, SchemaLike};

/// Accepts `null` in addition to what the wrapped schema accepts.
///
/// With a default, `null` is replaced by the default, which is then
/// validated by the wrapped schema.
///
/// # Example
///
/// ```rust
/// use sluice::{parse, Schema};
/// use serde_json::json;
///
/// let name = Schema::nullable(Schema::string());
/// assert_eq!(parse(&name, json!(null)).unwrap(), json!(null));
///
/// let with_default = Schema::nullable(Schema::string()).default(json!("anonymous"));
/// assert_eq!(parse(&with_default, json!(null)).unwrap(), json!("anonymous"));
/// ```
pub struct NullableSchema {
    wrapped: Box<dyn SchemaLike>,
    default: Option<Value>,
}

impl NullableSchema {
    /// Wraps a schema.
    pub fn new<S>(wrapped: S) -> Self
    where
        S: SchemaLike + 'static,
    {
        Self {
            wrapped: Box::new(wrapped),
            default: None,
        }
    }

    /// Replaces `null` input with `default`.
    pub fn default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

impl ToJsonSchema for NullableSchema {
    fn to_json_schema(&self) -> Value {
        let mut schema = json!({ "anyOf": [self.wrapped.to_json_schema(), { "type": "null" }] });
        if let Some(default) = &self.default {
            schema["default"] = default.clone();
        }
        schema
    }
}

impl SchemaInfo for NullableSchema {
    fn code(&self) -> &str {
        "nullable"
    }

    fn expects(&self) -> String {
        format!("({} | null)", self.wrapped.expects())
    }
}

impl SchemaLike for NullableSchema {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if dataset.value.is_null() {
            if let Some(default) = &self.default {
                dataset.value = default.clone();
            }
            if dataset.value.is_null() {
                dataset.typed = true;
                return dataset;
            }
        }
        self.wrapped.run(dataset, config)
    }
}

/// A schema resolved on every run from the input, which allows recursion.
///
/// # Example
///
/// ```rust
/// use sluice::{is, ObjectSchema, Schema};
/// use serde_json::json;
///
/// fn tree() -> ObjectSchema {
///     Schema::object()
///         .entry("value", Schema::number())
///         .entry("children", Schema::array(Schema::lazy(|_| tree())))
/// }
///
/// let input = json!({"value": 1, "children": [{"value": 2, "children": []}]});
/// assert!(is(&tree(), input));
/// ```
pub struct LazySchema<F> {
    getter: F,
}

impl<F> LazySchema<F> {
    pub(crate) fn new(getter: F) -> Self {
        Self { getter }
    }
}

impl<F> fmt::Debug for LazySchema<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazySchema").finish_non_exhaustive()
    }
}

impl<F> ToJsonSchema for LazySchema<F> {
    fn to_json_schema(&self) -> Value {
        // Expanding the getter could recurse without end.
        json!({})
    }
}

impl<F, S> SchemaInfo for LazySchema<F>
where
    F: Fn(&Value) -> S + Send + Sync,
    S: SchemaLike,
{
    fn code(&self) -> &str {
        "lazy"
    }

    fn expects(&self) -> String {
        (self.getter)(&Value::Null).expects()
    }
}

impl<F, S> SchemaLike for LazySchema<F>
where
    F: Fn(&Value) -> S + Send + Sync,
    S: SchemaLike,
{
    fn run(&self, dataset: Dataset, config: &Config) -> Dataset {
        let schema = (self.getter)(&dataset.value);
        schema.run(dataset, config)
    }
}
