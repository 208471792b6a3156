use super::lifecycle;
use crate::auth::Caller;
use crate::error::FormError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use form_common::requests::SubmitFormRequest;

/// Actix web handler for `POST /api/forms/{form_id}/responses`.
///
/// Every field of the form must be answered. On success all answers are
/// stored (created or overwritten) and the form's timestamp is refreshed.
///
/// # Returns
/// - `204 No Content` on success.
/// - `404 Not Found` if the form does not exist.
/// - `400 Bad Request` listing each failing field otherwise.
pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    form_id: web::Path<String>,
    payload: web::Json<SubmitFormRequest>,
) -> Result<HttpResponse, FormError> {
    let mut store = state.store.lock().await;
    lifecycle::submit_form(&mut *store, &caller, &form_id, &payload.responses)?;
    Ok(HttpResponse::NoContent().finish())
}
