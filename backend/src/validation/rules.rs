use form_common::model::answer::Answer;
use form_common::model::field_type::FieldType;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-]+(\.[A-Za-z0-9_'+\-]+)*@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

// Month and day ranges only; 2024-02-31 is accepted.
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{4}-(0[1-9]|1[0-2])-(0[1-9]|[12][0-9]|3[01])$")
        .expect("date pattern compiles")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9])?$").expect("time pattern compiles")
});

/// How a string answer is cleaned up before it is checked and stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    Keep,
    Trim,
    TrimLowercase,
}

impl Normalize {
    pub fn apply(&self, raw: &str) -> String {
        match self {
            Normalize::Keep => raw.to_string(),
            Normalize::Trim => raw.trim().to_string(),
            Normalize::TrimLowercase => raw.trim().to_lowercase(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Check {
    /// Single string of at least this many characters.
    MinChars(usize),
    /// Single string matching the pattern.
    Pattern(&'static LazyLock<Regex>),
    /// Single string that parses as an absolute URL.
    Url,
    /// List of strings with at least one entry.
    NonEmptyList,
}

/// Validation rule attached to a field type.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub normalize: Normalize,
    pub check: Check,
    pub message: &'static str,
}

/// The rule every answer to a field of `field_type` must satisfy.
pub fn rule_for(field_type: FieldType) -> FieldRule {
    let (normalize, check, message) = match field_type {
        FieldType::Text => (
            Normalize::Trim,
            Check::MinChars(2),
            "Name must be at least 2 characters long.",
        ),
        FieldType::Email => (
            Normalize::TrimLowercase,
            Check::Pattern(&EMAIL_RE),
            "Please enter a valid email address.",
        ),
        FieldType::Checkbox => (
            Normalize::Keep,
            Check::NonEmptyList,
            "Please select at least one option.",
        ),
        FieldType::Radio | FieldType::Dropdown => {
            (Normalize::Trim, Check::MinChars(1), "Please select an option.")
        }
        FieldType::File => (
            Normalize::Keep,
            Check::Url,
            "Invalid file URL. Please upload a file.",
        ),
        FieldType::Date => (
            Normalize::Trim,
            Check::Pattern(&DATE_RE),
            "Invalid date format. Please use YYYY-MM-DD.",
        ),
        FieldType::Time => (
            Normalize::Trim,
            Check::Pattern(&TIME_RE),
            "Invalid time format. Please use HH:MM or HH:MM:SS.",
        ),
    };
    FieldRule {
        normalize,
        check,
        message,
    }
}

impl FieldRule {
    /// Checks `answer` and returns it normalized, or the rule's message.
    ///
    /// A list answer to a single-value rule (or the reverse) fails like any
    /// other content error.
    pub fn apply(&self, answer: &Answer) -> Result<Answer, &'static str> {
        match (self.check, answer) {
            (Check::NonEmptyList, Answer::Many(values)) if !values.is_empty() => {
                Ok(Answer::Many(values.clone()))
            }
            (Check::NonEmptyList, _) | (_, Answer::Many(_)) | (_, Answer::Other(_)) => {
                Err(self.message)
            }
            (Check::MinChars(min), Answer::Single(raw)) => {
                let value = self.normalize.apply(raw);
                if value.chars().count() >= min {
                    Ok(Answer::Single(value))
                } else {
                    Err(self.message)
                }
            }
            (Check::Pattern(pattern), Answer::Single(raw)) => {
                let value = self.normalize.apply(raw);
                if pattern.is_match(&value) {
                    Ok(Answer::Single(value))
                } else {
                    Err(self.message)
                }
            }
            (Check::Url, Answer::Single(raw)) => {
                let value = self.normalize.apply(raw);
                match Url::parse(&value) {
                    Ok(_) => Ok(Answer::Single(value)),
                    Err(_) => Err(self.message),
                }
            }
        }
    }
}
