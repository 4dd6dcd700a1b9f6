//! String content checks: regular expressions, email, and substrings.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::{stringify, IssueDetail};
use crate::message::Message;

use super::{report, Action, ActionInfo, ActionKind};

#[derive(Debug, Clone)]
enum PatternCheck {
    Regex(Regex),
    Email,
    Includes(String),
    StartsWith(String),
    EndsWith(String),
}

/// Validates the content of a string.
#[derive(Debug, Clone)]
pub struct PatternAction {
    check: PatternCheck,
    message: Option<Message>,
}

impl PatternAction {
    fn new(check: PatternCheck) -> Self {
        Self {
            check,
            message: None,
        }
    }

    /// Sets the call-site message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn accepts(&self, s: &str) -> bool {
        match &self.check {
            PatternCheck::Regex(re) => re.is_match(s),
            PatternCheck::Email => email_regex().is_match(s),
            PatternCheck::Includes(needle) => s.contains(needle.as_str()),
            PatternCheck::StartsWith(prefix) => s.starts_with(prefix.as_str()),
            PatternCheck::EndsWith(suffix) => s.ends_with(suffix.as_str()),
        }
    }

    fn label(&self) -> &'static str {
        match &self.check {
            PatternCheck::Regex(_) => "format",
            PatternCheck::Email => "email",
            PatternCheck::Includes(_) => "content",
            PatternCheck::StartsWith(_) => "start",
            PatternCheck::EndsWith(_) => "end",
        }
    }
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"(?i)^[\w+-]+(?:\.[\w+-]+)*@[\da-z]+(?:[.-][\da-z]+)*\.[a-z]{2,}$")
            .expect("valid email pattern")
    })
}

/// Requires a string matching `pattern`.
///
/// Returns an error if the pattern does not compile.
///
/// # Example
///
/// ```rust
/// use sluice::action::regex;
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let schema = Schema::pipe(Schema::string()).action(regex(r"^[a-z]+$").unwrap());
/// assert!(safe_parse(&schema, json!("abc")).is_success());
/// assert!(safe_parse(&schema, json!("ABC")).is_failure());
/// ```
pub fn regex(pattern: &str) -> Result<PatternAction, regex::Error> {
    Ok(PatternAction::new(PatternCheck::Regex(Regex::new(pattern)?)))
}

/// Requires a plausible email address.
pub fn email() -> PatternAction {
    PatternAction::new(PatternCheck::Email)
}

/// Requires a string containing `needle`.
pub fn includes(needle: impl Into<String>) -> PatternAction {
    PatternAction::new(PatternCheck::Includes(needle.into()))
}

/// Requires a string beginning with `prefix`.
pub fn starts_with(prefix: impl Into<String>) -> PatternAction {
    PatternAction::new(PatternCheck::StartsWith(prefix.into()))
}

/// Requires a string ending with `suffix`.
pub fn ends_with(suffix: impl Into<String>) -> PatternAction {
    PatternAction::new(PatternCheck::EndsWith(suffix.into()))
}

impl ActionInfo for PatternAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Validation
    }

    fn code(&self) -> &str {
        match &self.check {
            PatternCheck::Regex(_) => "regex",
            PatternCheck::Email => "email",
            PatternCheck::Includes(_) => "includes",
            PatternCheck::StartsWith(_) => "starts_with",
            PatternCheck::EndsWith(_) => "ends_with",
        }
    }

    fn expects(&self) -> Option<String> {
        match &self.check {
            PatternCheck::Regex(re) => Some(format!("/{}/", re.as_str())),
            PatternCheck::Email => None,
            PatternCheck::Includes(s) | PatternCheck::StartsWith(s) | PatternCheck::EndsWith(s) => {
                Some(stringify(&Value::from(s.as_str())))
            }
        }
    }

    fn requirement(&self) -> Option<Value> {
        match &self.check {
            PatternCheck::Regex(re) => Some(Value::from(re.as_str())),
            PatternCheck::Email => Some(Value::from(email_regex().as_str())),
            PatternCheck::Includes(s) | PatternCheck::StartsWith(s) | PatternCheck::EndsWith(s) => {
                Some(Value::from(s.as_str()))
            }
        }
    }

    fn json_schema(&self, schema: &mut Map<String, Value>) {
        match &self.check {
            PatternCheck::Regex(re) => {
                schema.insert("pattern".to_string(), Value::from(re.as_str()));
            }
            PatternCheck::Email => {
                schema.insert("format".to_string(), Value::from("email"));
            }
            _ => {}
        }
    }
}

impl Action for PatternAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.typed {
            return dataset;
        }

        let ok = dataset.value.as_str().is_some_and(|s| self.accepts(s));
        if !ok {
            let mut detail = IssueDetail::new();
            // Substring checks describe what the string lacks.
            if let (Some(expected), Some(_)) = (self.expects(), dataset.value.as_str()) {
                if !matches!(self.check, PatternCheck::Regex(_)) {
                    detail = detail.received(format!("!{}", expected));
                }
            }
            report(
                &mut dataset,
                self,
                self.message.as_ref(),
                self.label(),
                config,
                detail,
            );
        }
        dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn typed(value: Value) -> Dataset {
        Dataset {
            typed: true,
            ..Dataset::new(value)
        }
    }

    #[test]
    fn test_regex_reports_pattern() {
        let action = regex(r"^\d+$").unwrap();
        assert!(!action.run(typed(json!("123")), &Config::new()).has_issues());

        let result = action.run(typed(json!("12a")), &Config::new());
        let issue = &result.issues[0];
        assert_eq!(issue.code, "regex");
        assert_eq!(issue.expected.as_deref(), Some(r"/^\d+$/"));
        assert_eq!(issue.received, "\"12a\"");
    }

    #[test]
    fn test_invalid_regex_is_an_error() {
        assert!(regex("(unclosed").is_err());
    }

    #[test]
    fn test_email() {
        let config = Config::new();
        for ok in ["jane@example.com", "first.last+tag@sub.example.co"] {
            assert!(!email().run(typed(json!(ok)), &config).has_issues(), "{}", ok);
        }
        for bad in ["jane", "jane@", "@example.com", "jane@example", "a b@example.com"] {
            assert!(email().run(typed(json!(bad)), &config).has_issues(), "{}", bad);
        }

        let result = email().run(typed(json!("nope")), &config);
        assert_eq!(result.issues[0].message, "Invalid email: Received \"nope\"");
    }

    #[test]
    fn test_substring_checks() {
        let config = Config::new();
        assert!(!includes("lo w").run(typed(json!("hello world")), &config).has_issues());
        assert!(!starts_with("he").run(typed(json!("hello")), &config).has_issues());
        assert!(!ends_with("lo").run(typed(json!("hello")), &config).has_issues());

        let result = starts_with("x").run(typed(json!("hello")), &config);
        let issue = &result.issues[0];
        assert_eq!(issue.code, "starts_with");
        assert_eq!(issue.expected.as_deref(), Some("\"x\""));
        assert_eq!(issue.received, "!\"x\"");
    }

    #[test]
    fn test_non_string_fails() {
        let result = includes("a").run(typed(json!(1)), &Config::new());
        assert_eq!(result.issues[0].received, "1");
    }
}
