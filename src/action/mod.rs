//! Pipeline actions: validations and transformations.
//!
//! An action is one stage of a [`Pipe`](crate::schema::Pipe). Validation
//! actions check a value and report issues; transformation actions rewrite
//! it. All of them follow the same contract:
//!
//! - a **validation** action passes an untyped dataset through untouched,
//! - a **transformation** action runs regardless of the typed flag and marks
//!   the dataset untyped when it cannot produce its output,
//! - failures are reported through [`add_issue`](crate::add_issue),
//! - the dataset given to `run` is the dataset returned.
//!
//! # Example
//!
//! ```rust
//! use sluice::action::{email, max_length, to_trimmed};
//! use sluice::{parse, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::pipe(Schema::string())
//!     .action(to_trimmed())
//!     .action(email())
//!     .action(max_length(64));
//!
//! assert_eq!(parse(&schema, json!("  jane@example.com ")).unwrap(), json!("jane@example.com"));
//! ```

mod bytes;
mod check;
mod checksum;
mod json;
mod length;
mod pattern;
mod transform;
mod value;

use serde_json::{Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{add_issue, IssueContext, IssueDetail, IssueKind};
use crate::message::Message;

pub use bytes::{bytes, max_bytes, min_bytes, BytesAction};
pub use check::{check, CheckAction};
pub use checksum::{credit_card, isbn, ChecksumAction};
pub use json::{parse_json, stringify_json, ParseJsonAction, StringifyJsonAction};
pub use length::{length, max_length, min_length, non_empty, LengthAction};
pub use pattern::{email, ends_with, includes, regex, starts_with, PatternAction};
pub use transform::{
    to_lower_case, to_trimmed, to_upper_case, transform, try_transform, StringTransformAction,
    TransformAction, TryTransformAction,
};
pub use value::{integer, max_value, min_value, ValueAction};

/// Whether an action checks or rewrites values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Validation,
    Transformation,
}

impl ActionKind {
    /// Returns the issue kind this action reports.
    pub fn issue_kind(&self) -> IssueKind {
        match self {
            ActionKind::Validation => IssueKind::Validation,
            ActionKind::Transformation => IssueKind::Transformation,
        }
    }
}

/// Static metadata shared by sync and async actions.
pub trait ActionInfo: Send + Sync {
    /// Whether this action validates or transforms.
    fn kind(&self) -> ActionKind;

    /// Stable identifier of the check (e.g. `min_length`).
    fn code(&self) -> &str;

    /// Human-readable description of the requirement, if it has one.
    fn expects(&self) -> Option<String> {
        None
    }

    /// The raw constraint value, if it has one.
    fn requirement(&self) -> Option<Value> {
        None
    }

    /// Adds this action's constraint to a JSON Schema object.
    ///
    /// The default contributes nothing.
    fn json_schema(&self, _schema: &mut Map<String, Value>) {}
}

/// A synchronous pipeline stage.
///
/// # Example
///
/// ```rust
/// use sluice::action::{ActionInfo, ActionKind};
/// use sluice::{Action, Config, Dataset};
/// use serde_json::Value;
///
/// /// Replaces nulls with zero.
/// struct ZeroIfNull;
///
/// impl ActionInfo for ZeroIfNull {
///     fn kind(&self) -> ActionKind { ActionKind::Transformation }
///     fn code(&self) -> &str { "zero_if_null" }
/// }
///
/// impl Action for ZeroIfNull {
///     fn run(&self, mut dataset: Dataset, _config: &Config) -> Dataset {
///         if dataset.value.is_null() {
///             dataset.value = Value::from(0);
///         }
///         dataset
///     }
/// }
/// ```
pub trait Action: ActionInfo {
    /// Runs the action over a dataset and returns it.
    fn run(&self, dataset: Dataset, config: &Config) -> Dataset;
}

/// Reports an issue on behalf of an action using its own metadata.
pub(crate) fn report(
    dataset: &mut Dataset,
    action: &dyn ActionInfo,
    message: Option<&Message>,
    label: &str,
    config: &Config,
    detail: IssueDetail,
) {
    let expects = action.expects();
    let mut context = IssueContext::new(action.kind().issue_kind(), action.code())
        .expects(expects.as_deref())
        .message(message);
    context.requirement = action.requirement();
    add_issue(dataset, context, label, config, detail);
}

/// Sets a JSON Schema keyword depending on whether the target is an array.
pub(crate) fn set_for_type(
    schema: &mut Map<String, Value>,
    array_key: &str,
    string_key: &str,
    value: Value,
) {
    let key = match schema.get("type").and_then(Value::as_str) {
        Some("array") => array_key,
        _ => string_key,
    };
    schema.insert(key.to_string(), value);
}
