//! API handlers.

pub mod admin;
pub mod auth;
pub mod password_link;
pub mod settings;

pub use admin::*;
pub use auth::*;
pub use password_link::*;
pub use settings::*;
