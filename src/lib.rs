//! # Sluice
//!
//! Composable validation pipelines that collect every issue, each with the
//! full path to the value that caused it.
//!
//! ## Overview
//!
//! A [`Schema`] checks the shape of a value. Small [actions](action) attach
//! to a schema with [`Schema::pipe`] to check further constraints or to
//! rewrite the value. Composite schemas (objects, arrays, tuples, records,
//! unions) run a child schema for every entry and merge the children's
//! issues with a path item prepended, so an issue deep in the input reports
//! a path such as `users[0].email`.
//!
//! Every schema and action follows one protocol: it takes a [`Dataset`] by
//! value and returns it, having possibly rewritten the value, changed the
//! typed flag, or appended [`Issue`]s. Issues are collected rather than
//! returned at the first failure, unless [`Config`] asks to abort early.
//!
//! ## Core Types
//!
//! - [`Dataset`]: the value, its typed flag, and the issues so far
//! - [`Issue`]: one problem, with its code, expected/received renderings,
//!   message and [`IssuePath`]
//! - [`Issues`]: a non-empty collection of issues
//! - [`Config`]: per-run flags, locale and message overrides
//! - [`MessageCatalog`]: global, schema-level and per-check messages
//!
//! ## Example
//!
//! ```rust
//! use sluice::action::{email, min_length, to_trimmed};
//! use sluice::{safe_parse, Schema};
//! use serde_json::json;
//!
//! let signup = Schema::object()
//!     .entry("name", Schema::pipe(Schema::string()).action(to_trimmed()).action(min_length(1)))
//!     .entry("emails", Schema::array(Schema::pipe(Schema::string()).action(email())));
//!
//! let result = safe_parse(&signup, json!({"name": " Ada ", "emails": ["ada@example.com"]}));
//! assert_eq!(
//!     result.into_result().unwrap(),
//!     json!({"name": "Ada", "emails": ["ada@example.com"]})
//! );
//!
//! let issues = safe_parse(&signup, json!({"name": "", "emails": ["nope"]}))
//!     .into_result()
//!     .unwrap_err();
//! let paths: Vec<_> = issues.iter().map(|i| i.path.to_string()).collect();
//! assert_eq!(paths, vec!["name", "emails[0]"]);
//! ```

pub mod action;
pub mod config;
pub mod dataset;
pub mod error;
pub mod interop;
pub mod message;
pub mod parse;
pub mod path;
pub mod schema;

#[cfg(feature = "effect")]
pub mod effect;

pub use action::{Action, ActionInfo, ActionKind};
pub use config::Config;
pub use dataset::Dataset;
pub use error::{
    add_issue, stringify, FlatIssues, Issue, IssueContext, IssueDetail, IssueKind, Issues,
    ValiError,
};
pub use message::{Message, MessageCatalog};
pub use parse::{is, parse, parse_with, safe_parse, safe_parse_with};
pub use path::{ContainerType, IssuePath, PathItem, PathKey, PathOrigin};
pub use schema::{
    ArraySchema, LazySchema, LiteralSchema, NullableSchema, ObjectSchema, PicklistSchema, Pipe,
    PrimitiveSchema, RecordSchema, Schema, SchemaInfo, SchemaLike, TupleRest, TupleSchema,
    UnionSchema, UnknownKeys, VariantSchema,
};

#[cfg(feature = "effect")]
pub use effect::{AsyncAction, AsyncSchemaLike};
#[cfg(feature = "effect")]
pub use parse::{parse_async, parse_async_with, safe_parse_async, safe_parse_async_with};

/// Type alias for validation results using [`Issues`].
pub type ValidationResult<T> = stillwater::Validation<T, Issues>;
