use crate::model::answer::Answer;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request payload for `POST /api/forms`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFormRequest {
    pub name: String,
}

/// Request payload for `POST /api/forms/{form_id}/responses`.
/// Maps field id to the submitted answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitFormRequest {
    pub responses: HashMap<String, Answer>,
}
