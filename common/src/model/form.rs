use crate::model::field_type::FieldType;
use serde::{Deserialize, Serialize};

/// A form owned by one user. Timestamps are milliseconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub id: String, // UUID
    pub name: String,
    pub owner_id: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
}

/// One configurable input of a form.
///
/// `options` is only populated for choice-based types (see
/// [`FieldType::is_choice`]); it is empty for every other field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,
    pub form_id: String,
    /// Zero-based position inside the form.
    pub position: i64,
    pub text: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub options: Vec<FieldOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub id: String,
    pub field_id: String,
    pub position: i64,
    pub text: String,
}

/// One user's stored answer to one field.
///
/// Scalar fields keep the answer in `value`; choice fields keep it in
/// `option_ids` and leave `value` empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    pub id: String,
    pub field_id: String,
    pub user_id: String,
    pub value: Option<String>,
    #[serde(default)]
    pub option_ids: Vec<String>,
    pub updated_at_ms: i64,
}

/// Everything a client needs to render a form and prefill the caller's answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDetail {
    #[serde(flatten)]
    pub form: Form,
    pub fields: Vec<FieldDefinition>,
    /// Only the requesting user's responses.
    pub responses: Vec<StoredResponse>,
}
