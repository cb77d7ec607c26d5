//! Middleware for the Web API.

pub mod cors;
pub mod identity;

pub use cors::create_cors_layer;
pub use identity::{client_identity, SHARED_IDENTITY};
