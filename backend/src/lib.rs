pub mod auth;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod store;
pub mod validation;
