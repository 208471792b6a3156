use super::lifecycle;
use crate::auth::Caller;
use crate::error::FormError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use form_common::requests::CreateFormRequest;

/// Actix web handler for `POST /api/forms`.
///
/// # Returns
/// - `201 Created` with the new `Form` as JSON.
/// - `400 Bad Request` if the name is blank.
pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    payload: web::Json<CreateFormRequest>,
) -> Result<HttpResponse, FormError> {
    let mut store = state.store.lock().await;
    let form = lifecycle::create_form(&mut *store, &caller, &payload.name)?;
    Ok(HttpResponse::Created().json(form))
}
