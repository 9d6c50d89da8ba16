//! Middleware for the web API.

pub mod auth;

pub use auth::{AdminSession, Authorized, ReviewerSession};
