use super::lifecycle;
use crate::auth::Caller;
use crate::error::FormError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(
    state: web::Data<AppState>,
    caller: Caller,
    form_id: web::Path<String>,
) -> Result<HttpResponse, FormError> {
    let mut store = state.store.lock().await;
    lifecycle::delete_form(&mut *store, &caller, &form_id)?;
    Ok(HttpResponse::NoContent().finish())
}
