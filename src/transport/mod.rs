//! Transport adapters
//!
//! The same router hosted either as a long-running listener or per invocation

pub mod function;
pub mod server;

pub use function::{invoke, FunctionHandler};
pub use server::{serve, serve_on};
