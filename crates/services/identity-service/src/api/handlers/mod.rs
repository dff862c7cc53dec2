//! HTTP request handlers.

pub mod change_password_handler;
pub mod health_handler;

pub use change_password_handler::change_password_routes;
pub use health_handler::health;
