//! WebSafe Server
//!
//! HTTP API in front of the phishing detector: single and batch prediction,
//! health and service info, and Prometheus metrics.

pub mod config;
pub mod routes;
pub mod state;

pub use config::{ConfigOverrides, ServerConfig};
pub use routes::create_router;
pub use state::AppState;
