//! Approval for gated tool calls.
//!
//! Three independent override mechanisms live on the [`ToolContext`]: yolo
//! mode, the auto-approved action list and an optional callback. The
//! [`resolve`] function combines them with a fixed precedence; nothing here
//! holds state of its own, so concurrent calls against one context never
//! interfere.
//!
//! [`ToolContext`]: crate::context::ToolContext

mod callback;
mod resolver;

pub use callback::{approval_fn, ApprovalCallback, ApprovalFn, CallbackError, CallbackResult};
pub use resolver::resolve;

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a gated tool is about to do, as shown to the approver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Registered name of the tool asking.
    pub tool_name: String,
    /// Short label matched against the auto-approved list ("run command").
    pub action: String,
    /// Human-readable detail ("Run command `ls -la`").
    pub description: String,
}

impl ApprovalRequest {
    pub fn new(
        tool_name: impl Into<String>,
        action: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            action: action.into(),
            description: description.into(),
        }
    }
}

/// Why a gated call was refused. Echoed back to the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No yolo mode, no allow-list match and no callback.
    NoApprovalMechanism,
    /// The callback answered `false`.
    RejectedByCallback,
    /// The callback returned an error or panicked.
    CallbackFailed,
}

impl DenialReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialReason::NoApprovalMechanism => "no approval mechanism configured",
            DenialReason::RejectedByCallback => "rejected by approval callback",
            DenialReason::CallbackFailed => "approval callback failed",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of the approval resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Denied(DenialReason),
}

impl ApprovalDecision {
    pub fn is_approved(self) -> bool {
        matches!(self, ApprovalDecision::Approved)
    }

    /// Denial reason, `None` when approved.
    pub fn denial_reason(self) -> Option<DenialReason> {
        match self {
            ApprovalDecision::Approved => None,
            ApprovalDecision::Denied(reason) => Some(reason),
        }
    }
}
