//! Data models module
//!
//! Defines the proxy's client-facing structures and the upstream OpenRouter structures

pub mod api;
pub mod openrouter;
