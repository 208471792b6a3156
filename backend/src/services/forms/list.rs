use super::lifecycle;
use crate::auth::Caller;
use crate::error::FormError;
use crate::state::AppState;
use actix_web::{web, HttpResponse};

pub async fn process(state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, FormError> {
    let store = state.store.lock().await;
    let forms = lifecycle::get_form_list(&*store, &caller)?;
    Ok(HttpResponse::Ok().json(forms))
}
