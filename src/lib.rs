//! # Jeeves Tools - Approval-Gated Agent Tools
//!
//! File, shell and web tools for Jeeves agents, with dangerous operations
//! gated behind an approval decision:
//! - Static descriptor registry with selection helpers (all, safe, per category)
//! - Explicit [`ToolContext`] carrying the approval policy for one agent run
//! - Approval resolution: yolo mode, then the auto-approved action list, then
//!   an optional async callback, otherwise deny
//! - A gating wrapper returning success, structured failure or denial
//!
//! ## Architecture
//!
//! ```text
//!   agent ──▶ ToolSet::invoke(name, ctx, args)
//!                  │
//!                  ▼
//!            ┌───────────┐  validate args   ┌─────────────┐
//!            │   Tool    │ ───────────────▶ │ descriptor  │
//!            │ (gate.rs) │                  └─────────────┘
//!            │           │  gated?          ┌─────────────┐
//!            │           │ ───────────────▶ │  resolver   │──▶ Denied
//!            │           │                  └─────────────┘
//!            │           │  approved        ┌─────────────┐
//!            │           │ ───────────────▶ │  backend    │──▶ Success / Failure
//!            └───────────┘                  └─────────────┘
//! ```

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod approval;
pub mod context;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use approval::{approval_fn, ApprovalCallback, ApprovalDecision, ApprovalRequest, DenialReason};
pub use context::ToolContext;
pub use tools::{Tool, ToolOutput, ToolSet};
pub use types::{Config, Error, Result};
