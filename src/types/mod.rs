//! Core types for the tools crate.
//!
//! This module provides foundational types used throughout the system:
//! - **IDs**: Per-invocation call identifiers
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for context, web services and limits

mod config;
mod errors;
mod ids;

pub use config::{
    Config, ContextConfig, ObservabilityConfig, ToolLimits, WebConfig, WebServiceConfig,
};
pub use errors::{Error, Result};
pub use ids::CallId;
