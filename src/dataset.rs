//! The value carrier threaded through a validation run.

use serde_json::Value;
use stillwater::Validation;

use crate::error::{Issue, Issues};
use crate::path::PathItem;
use crate::ValidationResult;

/// A value plus its typed flag and the issues collected so far.
///
/// Every schema and action takes a `Dataset` by value and hands it back,
/// possibly with a rewritten `value`, a changed `typed` flag, or appended
/// issues. Issues are only ever appended (or path-prefixed by an ancestor
/// container), never removed.
///
/// `typed` means the value conforms to the shape the current stage expects.
/// A dataset can be typed and still carry issues: an object whose field
/// failed a length check is still structurally an object. Validation actions
/// consult `typed`, not the issue list, before reading the value.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// The current value. Starts as the raw input.
    pub value: Value,
    /// True iff `value` conforms to the current output shape.
    pub typed: bool,
    /// Issues in encounter order. Empty means none were reported.
    pub issues: Vec<Issue>,
}

impl Dataset {
    /// Creates an untyped dataset holding a raw input.
    pub fn new(value: Value) -> Self {
        Self {
            value,
            typed: false,
            issues: Vec::new(),
        }
    }

    /// Returns true if any stage reported an issue.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Adopts a child's issues, prefixing each path with `item`.
    pub fn merge_issues(&mut self, issues: Vec<Issue>, item: &PathItem) {
        for mut issue in issues {
            issue.path.prepend(item.clone());
            self.issues.push(issue);
        }
    }

    /// Converts the finished dataset into a success or failure result.
    pub fn into_validation(self) -> ValidationResult<Value> {
        match Issues::from_vec(self.issues) {
            Some(issues) => Validation::Failure(issues),
            None => Validation::Success(self.value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;
    use crate::path::{ContainerType, PathKey};
    use serde_json::json;

    #[test]
    fn test_new_dataset_is_untyped_and_clean() {
        let dataset = Dataset::new(json!("raw"));
        assert!(!dataset.typed);
        assert!(!dataset.has_issues());
    }

    #[test]
    fn test_merge_issues_prefixes_paths() {
        let mut parent = Dataset::new(json!({"a": 1}));
        let child = vec![
            Issue::new(IssueKind::Schema, "string", "first"),
            Issue::new(IssueKind::Validation, "min_length", "second"),
        ];
        let item = PathItem::new(ContainerType::Object, json!({"a": 1}), PathKey::field("a"));

        parent.merge_issues(child, &item);

        assert_eq!(parent.issues.len(), 2);
        assert!(parent.issues.iter().all(|i| i.path.dot_path() == "a"));
        assert_eq!(parent.issues[0].message, "first");
    }

    #[test]
    fn test_into_validation() {
        let ok = Dataset::new(json!(1)).into_validation();
        assert!(ok.is_success());

        let mut failed = Dataset::new(json!(1));
        failed.issues.push(Issue::new(IssueKind::Schema, "string", "bad"));
        let failed = failed.into_validation();
        assert!(failed.is_failure());
    }
}
