//! # Form Service Module
//!
//! Routes every request under `/api/forms` to its handler. All routes require
//! the caller identity header (see `auth::Caller`).
//!
//! ## Sub-modules:
//! - `list`, `get`, `create`, `delete`, `submit`: one HTTP handler each.
//! - `lifecycle`: the operations the handlers delegate to.
//! - `reconcile`: create-vs-update planning for submitted answers.
//! - `template`: the fields every new form starts with.

mod create;
mod delete;
mod get;
pub mod lifecycle;
mod list;
pub mod reconcile;
mod submit;
pub mod template;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

/// The base path for all form-related API endpoints.
const API_PATH: &str = "/api/forms";

/// Configures and returns the Actix `Scope` for all form routes.
///
/// # Registered Routes:
///
/// *   **`GET /`** → `list::process`: forms owned by the caller.
/// *   **`POST /`** → `create::process`: creates a form from the fixed
///     template. Body: `CreateFormRequest`.
/// *   **`GET /{form_id}`** → `get::process`: the form with its fields,
///     options and the caller's own responses.
/// *   **`DELETE /{form_id}`** → `delete::process`: cascading delete, owner
///     only.
/// *   **`POST /{form_id}/responses`** → `submit::process`: validates and
///     stores the caller's answers. Body: `SubmitFormRequest`.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list::process))
        .route("", post().to(create::process))
        .route("/{form_id}", get().to(get::process))
        .route("/{form_id}", delete().to(delete::process))
        .route("/{form_id}/responses", post().to(submit::process))
}
