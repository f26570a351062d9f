//! Service layer module
//!
//! Contains the upstream client, request validation, response reshaping and rate limiting

pub mod client;
pub mod prompts;
pub mod rate_limiter;
pub mod reshaper;
pub mod validator;

pub use client::{OpenRouterClient, Upstream};
pub use rate_limiter::{FixedWindowRateLimiter, RateDecision, RateLimiter};
