//! Asynchronous validation.
//!
//! This module provides the async counterparts of [`Action`] and
//! [`SchemaLike`], for checks that must await something (a database
//! lookup, a remote call). Every sync action and schema is also an async
//! one, so async pipelines and composites accept both.
//!
//! Within one pipeline, actions run strictly one after another. Async
//! object, array, tuple and record schemas await their children
//! concurrently unless `abort_early` is set, and always merge results in
//! declaration order. Unions and variants try their options one at a time.
//!
//! # Feature Flag
//!
//! This module is only available when the `effect` feature is enabled.
//!
//! # Example
//!
//! ```rust
//! use sluice::effect::check_async;
//! use sluice::{safe_parse_async, Schema};
//! use serde_json::json;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let available = check_async(|name| async move { name != "admin" }).message("name is taken");
//! let schema = Schema::pipe_async(Schema::string()).action(available);
//!
//! let result = safe_parse_async(&schema, json!("admin")).await;
//! assert_eq!(result.into_result().unwrap_err().first().message, "name is taken");
//! # });
//! ```

mod actions;
mod object;
mod pipe;
mod record;
mod sequence;
mod union;

use async_trait::async_trait;

use crate::action::{Action, ActionInfo};
use crate::config::Config;
use crate::dataset::Dataset;
use crate::schema::{SchemaInfo, SchemaLike};

pub use actions::{check_async, transform_async, AsyncCheckAction, AsyncTransformAction};
pub use object::ObjectSchemaAsync;
pub use pipe::PipeAsync;
pub use record::RecordSchemaAsync;
pub use sequence::{ArraySchemaAsync, TupleSchemaAsync};
pub use union::{UnionSchemaAsync, VariantSchemaAsync};

/// A pipeline stage that may await.
#[async_trait]
pub trait AsyncAction: ActionInfo {
    /// Runs the action over a dataset and returns it.
    async fn run_async(&self, dataset: Dataset, config: &Config) -> Dataset;
}

#[async_trait]
impl<A: Action> AsyncAction for A {
    async fn run_async(&self, dataset: Dataset, config: &Config) -> Dataset {
        self.run(dataset, config)
    }
}

/// A schema that may await while validating.
#[async_trait]
pub trait AsyncSchemaLike: SchemaInfo {
    /// Runs the schema over a dataset and returns it.
    async fn run_async(&self, dataset: Dataset, config: &Config) -> Dataset;
}

#[async_trait]
impl<S: SchemaLike> AsyncSchemaLike for S {
    async fn run_async(&self, dataset: Dataset, config: &Config) -> Dataset {
        self.run(dataset, config)
    }
}
