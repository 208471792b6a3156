//! Shared application state handed to every handler as `web::Data<AppState>`.
//!
//! The SQLite connection is not `Sync`, so the store sits behind an async
//! mutex. Each request holds the lock for the duration of one operation, which
//! also serializes concurrent submissions in this process.

use crate::store::SqliteStore;
use tokio::sync::Mutex;

pub struct AppState {
    pub store: Mutex<SqliteStore>,
}

impl AppState {
    pub fn new(store: SqliteStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }
}
