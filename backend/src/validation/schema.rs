//! # Dynamic Form Schema
//!
//! A `FormSchema` is built per request from the stored field definitions of one
//! form. It pairs every field id with the rule of its type (see
//! `validation::rules`) and, for choice fields, the ids of the options the
//! field owns.
//!
//! Validation is all-or-nothing: every field of the form is required, each
//! answer must satisfy its rule, and choice answers may only reference the
//! field's own options. All failures are collected, in field order, so a
//! client can mark every offending input at once.

use super::rules::{rule_for, FieldRule};
use form_common::model::answer::Answer;
use form_common::model::field_type::FieldType;
use form_common::model::form::FieldDefinition;
use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

const REQUIRED_MESSAGE: &str = "This field is required.";
const UNKNOWN_OPTION_MESSAGE: &str = "Unknown option selected.";

#[derive(Debug, Clone)]
struct FieldSchema {
    field_id: String,
    field_type: FieldType,
    rule: FieldRule,
    /// Empty for non-choice fields.
    option_ids: Vec<String>,
}

impl FieldSchema {
    fn knows_option(&self, option_id: &str) -> bool {
        self.option_ids.iter().any(|id| id == option_id)
    }

    fn validate(&self, answer: Option<&Answer>) -> Result<Answer, &'static str> {
        let answer = answer.ok_or(REQUIRED_MESSAGE)?;
        let normalized = self.rule.apply(answer)?;
        if self.field_type.is_choice() {
            let all_known = match &normalized {
                Answer::Single(option_id) => self.knows_option(option_id),
                Answer::Many(option_ids) => option_ids.iter().all(|id| self.knows_option(id)),
                Answer::Other(_) => false,
            };
            if !all_known {
                return Err(UNKNOWN_OPTION_MESSAGE);
            }
        }
        Ok(normalized)
    }
}

#[derive(Debug, Clone)]
pub struct FormSchema {
    fields: Vec<FieldSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field_id: String,
    pub message: String,
}

/// Every field that failed validation, in form order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }

    pub fn field_ids(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|error| error.field_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field_id, error.message)?;
        }
        Ok(())
    }
}

/// Normalized answers keyed by field id; one entry per field of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedResponses(HashMap<String, Answer>);

impl ValidatedResponses {
    pub fn get(&self, field_id: &str) -> Option<&Answer> {
        self.0.get(field_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FormSchema {
    pub fn build(fields: &[FieldDefinition]) -> Self {
        let mut fields: Vec<&FieldDefinition> = fields.iter().collect();
        fields.sort_by_key(|field| field.position);
        let fields = fields
            .into_iter()
            .map(|field| FieldSchema {
                field_id: field.id.clone(),
                field_type: field.field_type,
                rule: rule_for(field.field_type),
                option_ids: field.options.iter().map(|option| option.id.clone()).collect(),
            })
            .collect();
        Self { fields }
    }

    pub fn validate(
        &self,
        submitted: &HashMap<String, Answer>,
    ) -> Result<ValidatedResponses, ValidationErrors> {
        let mut valid = HashMap::with_capacity(self.fields.len());
        let mut errors = Vec::new();

        for field in &self.fields {
            match field.validate(submitted.get(&field.field_id)) {
                Ok(answer) => {
                    valid.insert(field.field_id.clone(), answer);
                }
                Err(message) => errors.push(FieldError {
                    field_id: field.field_id.clone(),
                    message: message.to_string(),
                }),
            }
        }

        for key in submitted.keys() {
            if !self.fields.iter().any(|field| &field.field_id == key) {
                debug!("ignoring answer for unknown field {}", key);
            }
        }

        if errors.is_empty() {
            Ok(ValidatedResponses(valid))
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_common::model::form::FieldOption;

    fn field(id: &str, position: i64, field_type: FieldType, options: &[&str]) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            form_id: "form".to_string(),
            position,
            text: id.to_string(),
            field_type,
            options: options
                .iter()
                .enumerate()
                .map(|(i, option_id)| FieldOption {
                    id: option_id.to_string(),
                    field_id: id.to_string(),
                    position: i as i64,
                    text: option_id.to_uppercase(),
                })
                .collect(),
        }
    }

    fn schema() -> FormSchema {
        FormSchema::build(&[
            field("country", 2, FieldType::Dropdown, &["us", "ca"]),
            field("name", 0, FieldType::Text, &[]),
            field("jobs", 1, FieldType::Checkbox, &["dev", "design"]),
        ])
    }

    fn submission(entries: &[(&str, Answer)]) -> HashMap<String, Answer> {
        entries
            .iter()
            .map(|(id, answer)| (id.to_string(), answer.clone()))
            .collect()
    }

    #[test]
    fn complete_valid_submission_is_normalized() {
        let validated = schema()
            .validate(&submission(&[
                ("name", Answer::from("  Grace ")),
                ("jobs", Answer::Many(vec!["dev".to_string()])),
                ("country", Answer::from("ca")),
                ("stray", Answer::from("ignored")),
            ]))
            .unwrap();

        assert_eq!(validated.len(), 3);
        assert_eq!(validated.get("name"), Some(&Answer::from("Grace")));
        assert!(validated.get("stray").is_none());
    }

    #[test]
    fn missing_fields_are_reported_in_form_order() {
        let errors = schema()
            .validate(&submission(&[("jobs", Answer::Many(vec!["dev".to_string()]))]))
            .unwrap_err();

        assert_eq!(errors.field_ids().collect::<Vec<_>>(), vec!["name", "country"]);
        assert!(errors
            .as_slice()
            .iter()
            .all(|error| error.message == REQUIRED_MESSAGE));
    }

    #[test]
    fn single_choice_must_name_a_known_option() {
        let base = [
            ("name", Answer::from("Grace")),
            ("jobs", Answer::Many(vec!["dev".to_string()])),
        ];

        for bad in [
            Answer::from("mx"),
            Answer::from(""),
            Answer::Many(vec!["us".to_string()]),
        ] {
            let mut entries = base.to_vec();
            entries.push(("country", bad));
            let errors = schema().validate(&submission(&entries)).unwrap_err();
            assert_eq!(errors.field_ids().collect::<Vec<_>>(), vec!["country"]);
        }
    }

    #[test]
    fn checkbox_rejects_strings_empty_lists_and_foreign_options() {
        for bad in [
            Answer::from("dev"),
            Answer::Many(Vec::new()),
            Answer::Many(vec!["dev".to_string(), "us".to_string()]),
        ] {
            let errors = schema()
                .validate(&submission(&[
                    ("name", Answer::from("Grace")),
                    ("jobs", bad),
                    ("country", Answer::from("us")),
                ]))
                .unwrap_err();
            assert_eq!(errors.field_ids().collect::<Vec<_>>(), vec!["jobs"]);
        }
    }

    #[test]
    fn errors_render_as_one_line() {
        let errors = schema().validate(&HashMap::new()).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.to_string().starts_with("name: This field is required."));
    }
}
