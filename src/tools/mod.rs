//! Tool catalog, registry, gating wrapper and backends.
//!
//! Descriptors and selection are pure data over [`registry::REGISTRY`]; the
//! [`Tool`] wrapper binds a descriptor to its backend and enforces approval
//! before any backend runs.

pub mod catalog;
pub mod file;
pub mod gate;
pub mod output;
pub mod registry;
pub mod shell;
pub mod toolset;
pub mod utility;
pub mod web;

pub use catalog::{ApprovalGate, DescribeFn, GatedCall, ParamDef, ParamType, ToolCategory, ToolDescriptor};
pub use gate::{BackendResult, Tool, ToolBackend};
pub use output::{
    format_error, format_rejection, format_success, truncate_output, Denial, FailureKind,
    ToolFailure, ToolOutput, ToolSuccess,
};
pub use registry::{
    all_tools, descriptor, descriptors, file_tools, safe_tools, shell_tools, tools_in,
    utility_tools, web_tools,
};
pub use toolset::ToolSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Deserialize validated call arguments into a backend's typed form.
pub(crate) fn parse_args<T: DeserializeOwned>(args: Value) -> Result<T, ToolFailure> {
    serde_json::from_value(args).map_err(|e| {
        ToolFailure::new(FailureKind::InvalidArguments, format!("Invalid arguments: {}", e))
    })
}
