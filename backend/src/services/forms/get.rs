use super::lifecycle;
use crate::auth::Caller;
use crate::error::FormError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

/// Actix web handler for `GET /api/forms/{form_id}`.
///
/// # Returns
/// - `200 OK` with the `FormDetail` as JSON.
/// - `404 Not Found` if no form has this id.
pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    form_id: web::Path<String>,
) -> Result<HttpResponse, FormError> {
    let store = state.store.lock().await;
    match lifecycle::get_form_data(&*store, &caller, &form_id)? {
        Some(detail) => Ok(HttpResponse::Ok().json(detail)),
        None => Err(FormError::NotFound("form")),
    }
}
