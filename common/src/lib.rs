//! Data models shared between the form service and its clients.
//!
//! Everything in this crate is plain serde data: the backend owns the
//! validation and persistence rules, clients only need the shapes.

pub mod model;
pub mod requests;
