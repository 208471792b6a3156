//! Storage port of the form service.
//!
//! Operations never touch a database handle directly: they receive a
//! [`FormStore`] for reads and run every multi-row write through
//! [`FormStore::write`], which hands out a [`FormWriter`] bound to a single
//! transaction. The work closure returning `Err` rolls the whole unit back.

mod error;
mod sqlite;

pub use error::StoreError;
pub use sqlite::{SqliteStore, TABLES};

use form_common::model::form::{FieldDefinition, FieldOption, Form, StoredResponse};

pub trait FormStore {
    /// Forms owned by `owner_id`, most recently updated first.
    fn list_forms(&self, owner_id: &str) -> Result<Vec<Form>, StoreError>;

    fn find_form(&self, form_id: &str) -> Result<Option<Form>, StoreError>;

    /// Field definitions of a form in position order, options preloaded.
    fn find_fields(&self, form_id: &str) -> Result<Vec<FieldDefinition>, StoreError>;

    /// Responses of `user_id` to any field of the form, option links preloaded.
    fn find_responses(
        &self,
        form_id: &str,
        user_id: &str,
    ) -> Result<Vec<StoredResponse>, StoreError>;

    /// Runs `work` inside one transaction, committing only when it returns `Ok`.
    fn write<T, E>(
        &mut self,
        work: impl FnOnce(&mut dyn FormWriter) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<StoreError>;
}

pub trait FormWriter {
    fn insert_form(&mut self, form: &Form) -> Result<(), StoreError>;

    fn insert_field(&mut self, field: &FieldDefinition) -> Result<(), StoreError>;

    fn insert_option(&mut self, option: &FieldOption) -> Result<(), StoreError>;

    /// Inserts the response row and, for choice answers, its option links.
    fn insert_response(&mut self, response: &StoredResponse) -> Result<(), StoreError>;

    fn update_response_value(
        &mut self,
        response_id: &str,
        value: &str,
        updated_at_ms: i64,
    ) -> Result<(), StoreError>;

    /// Replaces every option link of the response with `option_ids`.
    fn replace_response_options(
        &mut self,
        response_id: &str,
        option_ids: &[String],
        updated_at_ms: i64,
    ) -> Result<(), StoreError>;

    fn touch_form(&mut self, form_id: &str, updated_at_ms: i64) -> Result<(), StoreError>;

    /// Removes every response (and its option links) to a field of the form.
    fn delete_responses_for_form(&mut self, form_id: &str) -> Result<usize, StoreError>;

    fn delete_options_for_form(&mut self, form_id: &str) -> Result<usize, StoreError>;

    fn delete_fields_for_form(&mut self, form_id: &str) -> Result<usize, StoreError>;

    fn delete_form(&mut self, form_id: &str) -> Result<usize, StoreError>;
}
