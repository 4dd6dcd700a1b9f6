//! Traits for schema polymorphism.
//!
//! [`SchemaInfo`] carries what a schema says about itself; [`SchemaLike`]
//! runs it. Composite schemas store their children as `Box<dyn SchemaLike>`
//! so that any schema, including user-defined ones, can be nested.

use crate::config::Config;
use crate::dataset::Dataset;
use crate::interop::ToJsonSchema;

/// Static metadata shared by sync and async schemas.
pub trait SchemaInfo: ToJsonSchema + Send + Sync {
    /// Stable identifier of the schema (e.g. `string`, `strict_object`).
    fn code(&self) -> &str;

    /// Description of the accepted shape, used as an issue's `expected`.
    fn expects(&self) -> String;
}

/// A schema that validates a [`Dataset`] synchronously.
///
/// `run` performs the schema's own type check and, for composites, runs
/// each child and merges its issues with a path item prepended. It sets
/// `typed` to whether the value conforms to the output shape.
///
/// The `Send + Sync` bounds (through [`SchemaInfo`]) allow schemas to be
/// shared across threads and stored as `Box<dyn SchemaLike>`.
///
/// # Example
///
/// ```rust
/// use sluice::interop::ToJsonSchema;
/// use sluice::{add_issue, Config, Dataset, IssueContext, IssueDetail, IssueKind};
/// use sluice::{SchemaInfo, SchemaLike};
/// use serde_json::{json, Value};
///
/// /// Accepts even integers.
/// struct Even;
///
/// impl ToJsonSchema for Even {
///     fn to_json_schema(&self) -> Value {
///         json!({"type": "integer", "multipleOf": 2})
///     }
/// }
///
/// impl SchemaInfo for Even {
///     fn code(&self) -> &str { "even" }
///     fn expects(&self) -> String { "even".to_string() }
/// }
///
/// impl SchemaLike for Even {
///     fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
///         if dataset.value.as_i64().is_some_and(|n| n % 2 == 0) {
///             dataset.typed = true;
///         } else {
///             let context = IssueContext::new(IssueKind::Schema, "even").expects(Some("even"));
///             add_issue(&mut dataset, context, "type", config, IssueDetail::new());
///         }
///         dataset
///     }
/// }
///
/// assert!(sluice::is(&Even, json!(4)));
/// ```
pub trait SchemaLike: SchemaInfo {
    /// Runs the schema over a dataset and returns it.
    fn run(&self, dataset: Dataset, config: &Config) -> Dataset;
}
