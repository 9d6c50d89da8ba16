//! Web API module for MODULIST.
//!
//! JSON endpoints for login, logout, account administration, personal
//! settings and password links. Sessions travel in the `Token` cookie.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
