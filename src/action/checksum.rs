//! Checksummed identifiers: payment card numbers and ISBNs.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::config::Config;
use crate::dataset::Dataset;
use crate::error::IssueDetail;
use crate::message::Message;

use super::{report, Action, ActionInfo, ActionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Checksum {
    CreditCard,
    Isbn,
}

/// Validates a string carrying a check digit.
#[derive(Debug, Clone)]
pub struct ChecksumAction {
    checksum: Checksum,
    message: Option<Message>,
}

impl ChecksumAction {
    fn new(checksum: Checksum) -> Self {
        Self {
            checksum,
            message: None,
        }
    }

    /// Sets the call-site message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Requires a card number from a known provider that passes the Luhn check.
///
/// Digits may be grouped with single spaces or hyphens.
///
/// # Example
///
/// ```rust
/// use sluice::action::credit_card;
/// use sluice::{safe_parse, Schema};
/// use serde_json::json;
///
/// let schema = Schema::pipe(Schema::string()).action(credit_card());
/// assert!(safe_parse(&schema, json!("4539 1488 0343 6467")).is_success());
/// assert!(safe_parse(&schema, json!("4539 1488 0343 6468")).is_failure());
/// ```
pub fn credit_card() -> ChecksumAction {
    ChecksumAction::new(Checksum::CreditCard)
}

/// Requires an ISBN-10 or ISBN-13 with a valid check digit.
///
/// Hyphens and spaces are ignored.
pub fn isbn() -> ChecksumAction {
    ChecksumAction::new(Checksum::Isbn)
}

struct CardPatterns {
    format: Regex,
    providers: Vec<Regex>,
}

fn card_patterns() -> &'static CardPatterns {
    static PATTERNS: OnceLock<CardPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |p: &str| Regex::new(p).expect("valid card pattern");
        CardPatterns {
            format: compile(r"^(?:\d{14,19}|\d{4}(?: \d{3,6}){2,4}|\d{4}(?:-\d{3,6}){2,4})$"),
            providers: [
                // American Express
                r"^3[47]\d{13}$",
                // Diners Club
                r"^3(?:0[0-5]|[68]\d)\d{11,13}$",
                // Discover
                r"^6(?:011|5\d{2})\d{12,15}$",
                // JCB
                r"^(?:2131|1800|35\d{3})\d{11}$",
                // Mastercard
                r"^(?:5[1-5]\d{2}|222[1-9]|22[3-9]\d|2[3-6]\d{2}|27[01]\d|2720)\d{12}$",
                // UnionPay
                r"^(?:6[27]\d{14,17}|81\d{14,17})$",
                // Visa
                r"^4\d{12}(?:\d{3,6})?$",
            ]
            .into_iter()
            .map(compile)
            .collect(),
        }
    })
}

fn is_credit_card(input: &str) -> bool {
    let patterns = card_patterns();
    if !patterns.format.is_match(input) {
        return false;
    }
    let digits: String = input.chars().filter(|c| *c != ' ' && *c != '-').collect();
    patterns.providers.iter().any(|p| p.is_match(&digits)) && luhn(&digits)
}

/// Luhn mod-10 over an all-digit string.
fn luhn(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

fn is_isbn(input: &str) -> bool {
    let compact: Vec<char> = input.chars().filter(|c| *c != '-' && *c != ' ').collect();
    match compact.len() {
        10 => is_isbn10(&compact),
        13 => is_isbn13(&compact),
        _ => false,
    }
}

fn is_isbn10(chars: &[char]) -> bool {
    let mut sum = 0;
    for (i, c) in chars.iter().enumerate() {
        let d = match c.to_digit(10) {
            Some(d) => d,
            None if i == 9 && (*c == 'X' || *c == 'x') => 10,
            None => return false,
        };
        sum += d * (10 - i as u32);
    }
    sum % 11 == 0
}

fn is_isbn13(chars: &[char]) -> bool {
    let mut sum = 0;
    for (i, c) in chars.iter().enumerate() {
        let Some(d) = c.to_digit(10) else {
            return false;
        };
        sum += if i % 2 == 0 { d } else { d * 3 };
    }
    sum % 10 == 0
}

impl ActionInfo for ChecksumAction {
    fn kind(&self) -> ActionKind {
        ActionKind::Validation
    }

    fn code(&self) -> &str {
        match self.checksum {
            Checksum::CreditCard => "credit_card",
            Checksum::Isbn => "isbn",
        }
    }
}

impl Action for ChecksumAction {
    fn run(&self, mut dataset: Dataset, config: &Config) -> Dataset {
        if !dataset.typed {
            return dataset;
        }

        let (ok, label) = match self.checksum {
            Checksum::CreditCard => (
                dataset.value.as_str().is_some_and(is_credit_card),
                "credit card",
            ),
            Checksum::Isbn => (dataset.value.as_str().is_some_and(is_isbn), "ISBN"),
        };
        if !ok {
            report(
                &mut dataset,
                self,
                self.message.as_ref(),
                label,
                config,
                IssueDetail::new(),
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
    fn test_luhn() {
        assert!(luhn("4539148803436467"));
        assert!(!luhn("4539148803436468"));
        assert!(!luhn("45391488034364a7"));
    }

    #[test]
    fn test_credit_card_formats() {
        assert!(is_credit_card("4539148803436467"));
        assert!(is_credit_card("4539 1488 0343 6467"));
        assert!(is_credit_card("4539-1488-0343-6467"));
        // Mixed separators.
        assert!(!is_credit_card("4539 1488-0343 6467"));
        // Passes Luhn but matches no provider.
        assert!(!is_credit_card("0000000000000000"));
    }

    #[test]
    fn test_credit_card_issue() {
        let result = credit_card().run(typed(json!("1234")), &Config::new());
        let issue = &result.issues[0];
        assert_eq!(issue.code, "credit_card");
        assert_eq!(issue.message, "Invalid credit card: Received \"1234\"");
    }

    #[test]
    fn test_isbn() {
        let config = Config::new();
        for ok in [
            "978-4-87311-873-4",
            "9780306406157",
            "0306406152",
            "020530902X",
            "0-205-30902-x",
        ] {
            assert!(!isbn().run(typed(json!(ok)), &config).has_issues(), "{}", ok);
        }
        for bad in ["4873118736", "9780306406158", "12345", "X205309020"] {
            assert!(isbn().run(typed(json!(bad)), &config).has_issues(), "{}", bad);
        }

        let result = isbn().run(typed(json!("12345")), &config);
        assert_eq!(result.issues[0].message, "Invalid ISBN: Received \"12345\"");
    }
}
