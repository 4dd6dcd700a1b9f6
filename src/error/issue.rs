//! Issue types for validation failures.
//!
//! This module provides [`Issue`] for single validation failures and
//! [`Issues`] for the non-empty collection returned by a failed run.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde_json::Value;
use stillwater::prelude::*;

use crate::path::IssuePath;

/// The category of a reported problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// The input's type or container shape did not match.
    Schema,
    /// A value of the right shape failed an additional constraint.
    Validation,
    /// A transformation could not produce its output.
    Transformation,
}

impl IssueKind {
    /// Returns the lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::Schema => "schema",
            IssueKind::Validation => "validation",
            IssueKind::Transformation => "transformation",
        }
    }
}

/// A single validation failure with full context.
///
/// `Issue` captures everything known about a failure:
/// - **kind** / **code**: what category of check failed and which one
/// - **input**: the offending value (`None` when a key or item was missing)
/// - **expected** / **received**: human-oriented renderings of the mismatch
/// - **requirement**: the raw constraint that was checked, when it has one
/// - **path**: how to reach the offending value from the root
/// - **issues**: sub-issues, used by union schemas
///
/// Issues are created through [`add_issue`](crate::add_issue) so that
/// message resolution is applied consistently. The builder below is mostly
/// useful in tests.
///
/// # Example
///
/// ```rust
/// use sluice::{Issue, IssueKind};
///
/// let issue = Issue::new(IssueKind::Validation, "email", "Invalid email")
///     .with_expected("email address")
///     .with_received("\"nope\"");
///
/// assert_eq!(issue.code, "email");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    /// The issue category.
    pub kind: IssueKind,
    /// Machine-readable identifier of the failed check (e.g. `min_length`).
    pub code: String,
    /// The value that failed, or `None` when it was missing.
    pub input: Option<Value>,
    /// Description of what was expected.
    pub expected: Option<String>,
    /// Description of what was received.
    pub received: String,
    /// Resolved human-readable message.
    pub message: String,
    /// The raw constraint value that was checked against.
    pub requirement: Option<Value>,
    /// Location of the failing value, outermost first.
    pub path: IssuePath,
    /// Nested issues, e.g. one list per union option.
    pub issues: Option<Vec<Issue>>,
    /// Locale the message was resolved for.
    pub lang: Option<String>,
    /// Echo of the run's `abort_early` flag.
    pub abort_early: bool,
    /// Echo of the run's `abort_pipe_early` flag.
    pub abort_pipe_early: bool,
}

impl Issue {
    /// Creates a new issue at the root path with the given message.
    pub fn new(kind: IssueKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            input: None,
            expected: None,
            received: String::new(),
            message: message.into(),
            requirement: None,
            path: IssuePath::root(),
            issues: None,
            lang: None,
            abort_early: false,
            abort_pipe_early: false,
        }
    }

    /// Sets the offending input and returns self for chaining.
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Sets the "expected" field and returns self for chaining.
    pub fn with_expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Sets the "received" field and returns self for chaining.
    pub fn with_received(mut self, received: impl Into<String>) -> Self {
        self.received = received.into();
        self
    }

    /// Sets the path and returns self for chaining.
    pub fn with_path(mut self, path: IssuePath) -> Self {
        self.path = path;
        self
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_root() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };

        write!(f, "{}: {}", path_str, self.message)?;

        if let Some(ref expected) = self.expected {
            write!(f, " (expected: {})", expected)?;
        }
        if !self.received.is_empty() {
            write!(f, " (received: {})", self.received)?;
        }

        Ok(())
    }
}

impl std::error::Error for Issue {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issue>();
    assert_sync::<Issue>();
};

/// A non-empty collection of issues.
///
/// `Issues` wraps a `NonEmptyVec<Issue>` so that a failed run always carries
/// at least one issue. Collections from independent runs combine through
/// `Semigroup`:
///
/// ```rust
/// use sluice::{Issue, IssueKind, Issues};
/// use stillwater::prelude::*;
///
/// let a = Issues::single(Issue::new(IssueKind::Schema, "string", "Invalid type"));
/// let b = Issues::single(Issue::new(IssueKind::Validation, "email", "Invalid email"));
///
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issues(NonEmptyVec<Issue>);

impl Issues {
    /// Creates an `Issues` containing a single issue.
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    /// Creates an `Issues` from a `NonEmptyVec` of issues.
    pub fn from_non_empty(issues: NonEmptyVec<Issue>) -> Self {
        Self(issues)
    }

    /// Creates an `Issues` from a vec, or `None` if the vec is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    /// Returns the number of issues in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained issues in encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Returns the primary (first reported) issue.
    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    /// Returns all issues whose dot path equals `dot_path`.
    pub fn at_dot_path(&self, dot_path: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.path.dot_path() == dot_path).collect()
    }

    /// Returns all issues with the specified code.
    pub fn with_code(&self, code: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.code == code).collect()
    }

    /// Converts this collection into a `Vec<Issue>`.
    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    /// Returns a reference to the underlying `NonEmptyVec`.
    pub fn as_non_empty_vec(&self) -> &NonEmptyVec<Issue> {
        &self.0
    }

    /// Groups messages by dot path.
    ///
    /// Issues at the root path go to `root`; every other message is listed
    /// under its dot path in first-seen order.
    pub fn flatten(&self) -> FlatIssues {
        let mut flat = FlatIssues::default();
        for issue in self.iter() {
            if issue.path.is_root() {
                flat.root.push(issue.message.clone());
            } else {
                flat.nested
                    .entry(issue.path.dot_path())
                    .or_default()
                    .push(issue.message.clone());
            }
        }
        flat
    }
}

impl Semigroup for Issues {
    fn combine(self, other: Self) -> Self {
        Issues(self.0.combine(other.0))
    }
}

impl Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} issue(s):", self.len())?;
        for (i, issue) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for Issues {}

impl IntoIterator for Issues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issues>();
    assert_sync::<Issues>();
};

/// Messages grouped by where they occurred, produced by [`Issues::flatten`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatIssues {
    /// Messages of issues reported on the root value.
    pub root: Vec<String>,
    /// Messages keyed by the dot path of the failing value.
    pub nested: IndexMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::{ContainerType, PathItem, PathKey};
    use serde_json::json;

    fn at(field: &str, message: &str) -> Issue {
        Issue::new(IssueKind::Validation, "check", message).with_path(IssuePath::from_item(
            PathItem::new(ContainerType::Object, json!({}), PathKey::field(field)),
        ))
    }

    #[test]
    fn test_issue_creation() {
        let issue = Issue::new(IssueKind::Schema, "string", "Invalid type");

        assert_eq!(issue.kind, IssueKind::Schema);
        assert_eq!(issue.code, "string");
        assert!(issue.path.is_root());
        assert!(issue.expected.is_none());
        assert!(issue.issues.is_none());
    }

    #[test]
    fn test_issue_display() {
        let issue = at("email", "Invalid email")
            .with_expected("email address")
            .with_received("\"x\"");

        let display = issue.to_string();
        assert!(display.contains("email: Invalid email"));
        assert!(display.contains("expected: email address"));
        assert!(display.contains("received: \"x\""));
    }

    #[test]
    fn test_issue_display_root() {
        let issue = Issue::new(IssueKind::Schema, "null", "value is null");
        assert!(issue.to_string().contains("(root): value is null"));
    }

    #[test]
    fn test_issues_from_empty_vec() {
        assert!(Issues::from_vec(Vec::new()).is_none());
        assert_eq!(Issues::from_vec(vec![at("a", "x")]).map(|i| i.len()), Some(1));
    }

    #[test]
    fn test_issues_combine_keeps_order() {
        let combined = Issues::single(at("a", "first")).combine(Issues::single(at("b", "second")));

        let messages: Vec<_> = combined.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(combined.first().message, "first");
    }

    #[test]
    fn test_issues_at_dot_path_and_code() {
        let issues = Issues::single(at("a", "1"))
            .combine(Issues::single(at("a", "2")))
            .combine(Issues::single(Issue::new(IssueKind::Schema, "object", "3")));

        assert_eq!(issues.at_dot_path("a").len(), 2);
        assert_eq!(issues.at_dot_path("").len(), 1);
        assert_eq!(issues.with_code("check").len(), 2);
    }

    #[test]
    fn test_flatten() {
        let issues = Issues::single(Issue::new(IssueKind::Schema, "object", "bad root"))
            .combine(Issues::single(at("name", "too short")))
            .combine(Issues::single(at("name", "not allowed")))
            .combine(Issues::single(at("age", "too young")));

        let flat = issues.flatten();
        assert_eq!(flat.root, vec!["bad root"]);
        assert_eq!(flat.nested["name"], vec!["too short", "not allowed"]);
        assert_eq!(flat.nested.keys().collect::<Vec<_>>(), vec!["name", "age"]);
    }

    #[test]
    fn test_issues_display() {
        let issues = Issues::single(at("name", "required")).combine(Issues::single(at("email", "invalid")));
        let display = issues.to_string();

        assert!(display.contains("2 issue(s)"));
        assert!(display.contains("name: required"));
        assert!(display.contains("email: invalid"));
    }
}
