//! Schema definitions for validation.
//!
//! A schema checks the shape of a value and, for containers, runs a child
//! schema for every entry or item. Issues from all children are collected
//! rather than stopping at the first failure, unless `abort_early` is set.
//! Constraints beyond the shape are attached as actions with
//! [`Schema::pipe`].
//!
//! # Example
//!
//! ```rust
//! use sluice::action::{email, min_value};
//! use sluice::{safe_parse, Schema};
//! use serde_json::json;
//!
//! let user = Schema::object()
//!     .entry("email", Schema::pipe(Schema::string()).action(email()))
//!     .entry("age", Schema::pipe(Schema::number()).action(min_value(0.0)));
//!
//! let issues = safe_parse(&user, json!({"email": "nope", "age": -1}))
//!     .into_result()
//!     .unwrap_err();
//! assert_eq!(issues.len(), 2);
//! ```

mod array;
mod literal;
mod object;
mod pipe;
mod primitive;
mod record;
mod traits;
mod tuple;
mod union;
mod wrapped;

pub use array::ArraySchema;
pub use literal::{LiteralSchema, PicklistSchema};
pub use object::{ObjectSchema, UnknownKeys};
pub use pipe::Pipe;
pub use primitive::PrimitiveSchema;
pub use record::RecordSchema;
pub use traits::{SchemaInfo, SchemaLike};
pub use tuple::{TupleRest, TupleSchema};
pub use union::{UnionSchema, VariantSchema};
pub use wrapped::{LazySchema, NullableSchema};

#[cfg(feature = "effect")]
pub(crate) use array::{array_items, index_item};
#[cfg(feature = "effect")]
pub(crate) use object::{
    entry_item, missing_key_issue, object_json_schema, unknown_key_issue, Presence,
};
#[cfg(feature = "effect")]
pub(crate) use pipe::should_stop;
#[cfg(feature = "effect")]
pub(crate) use record::{insert_record_entry, record_item};
#[cfg(feature = "effect")]
pub(crate) use tuple::{extra_item_issue, missing_item_issue};
#[cfg(feature = "effect")]
pub(crate) use union::{adopt, join_expects, union_issue, variant_issue};

use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{add_issue, IssueContext, IssueDetail, IssueKind};
use crate::message::Message;

/// Reports that a value does not have the schema's type.
///
/// The issue expects `schema.expects()` and is labelled `type`. The dataset
/// is marked untyped.
pub(crate) fn type_issue(
    dataset: &mut Dataset,
    schema: &dyn SchemaInfo,
    message: Option<&Message>,
    config: &Config,
) {
    let expects = schema.expects();
    let context = IssueContext::new(IssueKind::Schema, schema.code())
        .expects(Some(&expects))
        .message(message);
    add_issue(dataset, context, "type", config, IssueDetail::new());
    dataset.typed = false;
}

/// Entry point for creating validation schemas.
///
/// # Example
///
/// ```rust
/// use sluice::{is, Schema};
/// use serde_json::json;
///
/// let point = Schema::tuple().item(Schema::number()).item(Schema::number());
/// let points = Schema::array(point);
///
/// assert!(is(&points, json!([[0, 0], [1, 2.5]])));
/// assert!(!is(&points, json!([[0, "0"]])));
/// ```
pub struct Schema;

impl Schema {
    /// Accepts any value.
    pub fn any() -> PrimitiveSchema {
        PrimitiveSchema::any()
    }

    /// Accepts strings.
    pub fn string() -> PrimitiveSchema {
        PrimitiveSchema::string()
    }

    /// Accepts numbers, integral or not.
    pub fn number() -> PrimitiveSchema {
        PrimitiveSchema::number()
    }

    /// Accepts `true` and `false`.
    pub fn boolean() -> PrimitiveSchema {
        PrimitiveSchema::boolean()
    }

    /// Accepts `null`.
    pub fn null() -> PrimitiveSchema {
        PrimitiveSchema::null()
    }

    /// Accepts exactly `value`.
    pub fn literal(value: impl Into<Value>) -> LiteralSchema {
        LiteralSchema::new(value.into())
    }

    /// Accepts any of `options`.
    pub fn picklist<I>(options: I) -> PicklistSchema
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        PicklistSchema::new(options.into_iter().map(Into::into).collect())
    }

    /// Accepts `null` or whatever `schema` accepts.
    pub fn nullable<S>(schema: S) -> NullableSchema
    where
        S: SchemaLike + 'static,
    {
        NullableSchema::new(schema)
    }

    /// Resolves the schema from the input on every run.
    pub fn lazy<F, S>(getter: F) -> LazySchema<F>
    where
        F: Fn(&Value) -> S + Send + Sync,
        S: SchemaLike,
    {
        LazySchema::new(getter)
    }

    /// Creates an object schema with no entries.
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// Creates an array schema whose items all match `item`.
    pub fn array<S>(item: S) -> ArraySchema
    where
        S: SchemaLike + 'static,
    {
        ArraySchema::new(item)
    }

    /// Creates a tuple schema with no positions.
    pub fn tuple() -> TupleSchema {
        TupleSchema::new()
    }

    /// Creates a record schema.
    pub fn record<K, V>(key: K, value: V) -> RecordSchema
    where
        K: SchemaLike + 'static,
        V: SchemaLike + 'static,
    {
        RecordSchema::new(key, value)
    }

    /// Creates a union with no options.
    pub fn union() -> UnionSchema {
        UnionSchema::new()
    }

    /// Creates a discriminated union keyed by `key`.
    pub fn variant(key: impl Into<String>) -> VariantSchema {
        VariantSchema::new(key)
    }

    /// Attaches an action pipeline to `schema`.
    pub fn pipe<S>(schema: S) -> Pipe
    where
        S: SchemaLike + 'static,
    {
        Pipe::new(schema)
    }
}
