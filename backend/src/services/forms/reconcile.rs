//! # Response Reconciliation
//!
//! Turns a validated submission into the writes that make the stored answers
//! match it. For every field of the form the reconciler decides two things:
//!
//! - **Storage shape**: radio and dropdown answers become a one-element option
//!   set, checkbox answers become the submitted option set, every other type is
//!   stored as a scalar string.
//! - **Create or update**: a caller who already answered the field gets the
//!   existing row rewritten in place; otherwise a new row is planned.
//!
//! The result is a list of [`PersistIntent`]s. Nothing is written here;
//! `lifecycle::submit_form` applies the whole list in one transaction.

use crate::error::FormError;
use crate::validation::ValidatedResponses;
use form_common::model::answer::Answer;
use form_common::model::field_type::FieldType;
use form_common::model::form::{FieldDefinition, StoredResponse};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistIntent {
    CreateScalar {
        field_id: String,
        value: String,
    },
    UpdateScalar {
        response_id: String,
        value: String,
    },
    CreateOptionSet {
        field_id: String,
        option_ids: Vec<String>,
    },
    UpdateOptionSet {
        response_id: String,
        option_ids: Vec<String>,
    },
}

enum StorageShape {
    Scalar(String),
    OptionSet(Vec<String>),
}

fn storage_shape(field: &FieldDefinition, answer: &Answer) -> Result<StorageShape, FormError> {
    let invalid = || FormError::InvalidResponse {
        field_id: field.id.clone(),
    };
    match field.field_type {
        FieldType::Radio | FieldType::Dropdown => {
            let option_id = answer.as_single().ok_or_else(invalid)?;
            Ok(StorageShape::OptionSet(vec![option_id.to_string()]))
        }
        FieldType::Checkbox => {
            let option_ids = answer.as_many().ok_or_else(invalid)?;
            let mut unique: Vec<String> = Vec::with_capacity(option_ids.len());
            for option_id in option_ids {
                if !unique.contains(option_id) {
                    unique.push(option_id.clone());
                }
            }
            Ok(StorageShape::OptionSet(unique))
        }
        FieldType::Text | FieldType::Email | FieldType::File | FieldType::Date | FieldType::Time => {
            let value = answer.as_single().ok_or_else(invalid)?;
            Ok(StorageShape::Scalar(value.to_string()))
        }
    }
}

/// Rejects the first submitted answer whose JSON shape cannot be stored for its
/// field, before any content rule runs. Keys that name no field are skipped.
pub fn check_shapes(
    fields: &[FieldDefinition],
    submitted: &HashMap<String, Answer>,
) -> Result<(), FormError> {
    for field in fields {
        if let Some(answer) = submitted.get(&field.id) {
            storage_shape(field, answer)?;
        }
    }
    Ok(())
}

/// Plans one write per field, in the order of `fields`.
///
/// `existing` must hold only the submitting user's responses.
pub fn reconcile(
    fields: &[FieldDefinition],
    existing: &[StoredResponse],
    answers: &ValidatedResponses,
) -> Result<Vec<PersistIntent>, FormError> {
    fields
        .iter()
        .map(|field| {
            let answer = answers
                .get(&field.id)
                .ok_or_else(|| FormError::InvalidResponse {
                    field_id: field.id.clone(),
                })?;
            let current = existing.iter().find(|response| response.field_id == field.id);

            let intent = match (storage_shape(field, answer)?, current) {
                (StorageShape::Scalar(value), Some(response)) => PersistIntent::UpdateScalar {
                    response_id: response.id.clone(),
                    value,
                },
                (StorageShape::Scalar(value), None) => PersistIntent::CreateScalar {
                    field_id: field.id.clone(),
                    value,
                },
                (StorageShape::OptionSet(option_ids), Some(response)) => {
                    PersistIntent::UpdateOptionSet {
                        response_id: response.id.clone(),
                        option_ids,
                    }
                }
                (StorageShape::OptionSet(option_ids), None) => PersistIntent::CreateOptionSet {
                    field_id: field.id.clone(),
                    option_ids,
                },
            };
            Ok(intent)
        })
        .collect()
}
