//! OpenRouter Proxy Library
//! 
//! Keeps the OpenRouter API key server-side and exposes validated chat,
//! model listing and resume parsing endpoints

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod transport;
pub mod utils;

// Re-export common types
pub use config::{DeploymentMode, Settings};
pub use handlers::{build_router, create_router, AppState};
pub use services::{FixedWindowRateLimiter, OpenRouterClient, RateLimiter, Upstream};
pub use transport::FunctionHandler;
pub use utils::error::{AppError, AppResult, ErrorCode, UpstreamError};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
