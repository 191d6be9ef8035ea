//! HTTP route handlers.

pub mod chat;
pub mod health;

pub use chat::{chat_handler, ChatRequest, ChatResponse};
pub use health::{health, health_routes, HealthResponse};
