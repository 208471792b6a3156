//! Answer validation: the per-type rule registry and the per-form schema built
//! from it.

mod rules;
mod schema;

pub use schema::{FieldError, FormSchema, ValidatedResponses, ValidationErrors};
