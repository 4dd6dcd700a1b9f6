//! The error returned by [`parse`](crate::parse) on failure.

use crate::error::Issues;

/// Validation failed; carries every collected issue.
///
/// Displays the primary (first) issue's message. Use [`ValiError::issues`]
/// to enumerate all of them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", .issues.first().message)]
pub struct ValiError {
    issues: Issues,
}

impl ValiError {
    /// Wraps a collection of issues.
    pub fn new(issues: Issues) -> Self {
        Self { issues }
    }

    /// Returns all issues.
    pub fn issues(&self) -> &Issues {
        &self.issues
    }

    /// Consumes the error, returning its issues.
    pub fn into_issues(self) -> Issues {
        self.issues
    }
}

impl From<Issues> for ValiError {
    fn from(issues: Issues) -> Self {
        Self::new(issues)
    }
}
