//! Issue types for validation failures.
//!
//! This module provides the issue record, the non-empty issue collection,
//! the shared [`add_issue`] helper every check reports through, and the
//! [`ValiError`] returned by the throwing entry points.

mod issue;
mod report;
mod vali_error;

pub use issue::{FlatIssues, Issue, IssueKind, Issues};
pub use report::{add_issue, stringify, IssueContext, IssueDetail};
pub use vali_error::ValiError;
