//! # Form Lifecycle
//!
//! The five operations of the form service, written against the storage port
//! so they can run on any [`FormStore`]:
//!
//! - `create_form`: a new form plus the fixed template fields, in one write.
//! - `delete_form`: cascading delete, owner only, in one write.
//! - `get_form_list` / `get_form_data`: read-only projections.
//! - `submit_form`: validate, reconcile, then apply every planned write and the
//!   form timestamp refresh in one write.
//!
//! HTTP handlers in the sibling modules are thin wrappers around these.

use super::reconcile::{check_shapes, reconcile, PersistIntent};
use super::template;
use crate::auth::Caller;
use crate::error::FormError;
use crate::store::{FormStore, FormWriter, StoreError};
use crate::validation::FormSchema;
use form_common::model::answer::Answer;
use form_common::model::form::{Form, FormDetail, StoredResponse};
use log::{info, warn};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

pub fn get_form_list<S: FormStore>(store: &S, caller: &Caller) -> Result<Vec<Form>, FormError> {
    Ok(store.list_forms(caller.user_id())?)
}

/// Any authenticated user may load a form to fill it in; only their own
/// responses are included.
pub fn get_form_data<S: FormStore>(
    store: &S,
    caller: &Caller,
    form_id: &str,
) -> Result<Option<FormDetail>, FormError> {
    let Some(form) = store.find_form(form_id)? else {
        return Ok(None);
    };
    let fields = store.find_fields(&form.id)?;
    let responses = store.find_responses(&form.id, caller.user_id())?;
    Ok(Some(FormDetail {
        form,
        fields,
        responses,
    }))
}

pub fn create_form<S: FormStore>(
    store: &mut S,
    caller: &Caller,
    name: &str,
) -> Result<Form, FormError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FormError::BadRequest("form name must not be empty".to_string()));
    }

    let now = now_ms();
    let form = Form {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        owner_id: caller.user_id().to_string(),
        created_at_ms: now,
        updated_at_ms: now,
    };
    let fields = template::instantiate(&form.id);

    store.write(|writer| -> Result<(), StoreError> {
        writer.insert_form(&form)?;
        for field in &fields {
            writer.insert_field(field)?;
            for option in &field.options {
                writer.insert_option(option)?;
            }
        }
        Ok(())
    })?;

    info!(
        "Form {} created by {} with {} fields",
        form.id,
        form.owner_id,
        fields.len()
    );
    Ok(form)
}

pub fn delete_form<S: FormStore>(
    store: &mut S,
    caller: &Caller,
    form_id: &str,
) -> Result<(), FormError> {
    let form = store.find_form(form_id)?.ok_or(FormError::NotFound("form"))?;
    if form.owner_id != caller.user_id() {
        warn!(
            "{} attempted to delete form {} owned by {}",
            caller.user_id(),
            form.id,
            form.owner_id
        );
        return Err(FormError::Unauthorized);
    }

    let responses = store.write(|writer| -> Result<usize, StoreError> {
        let responses = writer.delete_responses_for_form(&form.id)?;
        writer.delete_options_for_form(&form.id)?;
        writer.delete_fields_for_form(&form.id)?;
        writer.delete_form(&form.id)?;
        Ok(responses)
    })?;

    info!("Form {} deleted along with {} responses", form.id, responses);
    Ok(())
}

pub fn submit_form<S: FormStore>(
    store: &mut S,
    caller: &Caller,
    form_id: &str,
    submitted: &HashMap<String, Answer>,
) -> Result<(), FormError> {
    let form = store.find_form(form_id)?.ok_or(FormError::NotFound("form"))?;
    let fields = store.find_fields(&form.id)?;

    check_shapes(&fields, submitted).inspect_err(|e| {
        warn!("Rejected submission to form {} by {}: {}", form.id, caller.user_id(), e)
    })?;
    let answers = FormSchema::build(&fields).validate(submitted).map_err(|errors| {
        warn!(
            "Rejected submission to form {} by {}: {}",
            form.id,
            caller.user_id(),
            errors
        );
        FormError::Validation(errors)
    })?;

    let existing = store.find_responses(&form.id, caller.user_id())?;
    let intents = reconcile(&fields, &existing, &answers)?;

    let now = now_ms();
    store.write(|writer| -> Result<(), StoreError> {
        for intent in &intents {
            apply_intent(writer, caller.user_id(), intent, now)?;
        }
        writer.touch_form(&form.id, now)
    })?;

    info!(
        "Form {} submitted by {} ({} fields)",
        form.id,
        caller.user_id(),
        intents.len()
    );
    Ok(())
}

fn apply_intent(
    writer: &mut dyn FormWriter,
    user_id: &str,
    intent: &PersistIntent,
    now: i64,
) -> Result<(), StoreError> {
    match intent {
        PersistIntent::CreateScalar { field_id, value } => writer.insert_response(&StoredResponse {
            id: Uuid::new_v4().to_string(),
            field_id: field_id.clone(),
            user_id: user_id.to_string(),
            value: Some(value.clone()),
            option_ids: Vec::new(),
            updated_at_ms: now,
        }),
        PersistIntent::UpdateScalar { response_id, value } => {
            writer.update_response_value(response_id, value, now)
        }
        PersistIntent::CreateOptionSet {
            field_id,
            option_ids,
        } => writer.insert_response(&StoredResponse {
            id: Uuid::new_v4().to_string(),
            field_id: field_id.clone(),
            user_id: user_id.to_string(),
            value: None,
            option_ids: option_ids.clone(),
            updated_at_ms: now,
        }),
        PersistIntent::UpdateOptionSet {
            response_id,
            option_ids,
        } => writer.replace_response_options(response_id, option_ids, now),
    }
}
