use actix_web::{web, App, HttpServer};
use env_logger::Env;
use form_backend::config::AppConfig;
use form_backend::error::json_config;
use form_backend::services;
use form_backend::state::AppState;
use form_backend::store::SqliteStore;
use log::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let config = AppConfig::from_env();

    let store = SqliteStore::open(&config.database_path).map_err(|e| {
        error!(
            "Cannot open database {}: {}",
            config.database_path.display(),
            e
        );
        std::io::Error::other(e.to_string())
    })?;
    let state = web::Data::new(AppState::new(store));

    info!(
        "Server running at http://{}:{} (database: {})",
        config.host,
        config.port,
        config.database_path.display()
    );

    let json_limit = config.json_limit;
    HttpServer::new(move || {
        App::new()
            .app_data(json_config(json_limit))
            .app_data(state.clone())
            .service(services::forms::configure_routes())
    })
    .bind(config.bind_address())?
    .run()
    .await
}
