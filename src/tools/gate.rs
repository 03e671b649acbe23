//! Invocation wrapper binding a descriptor, a backend and the context.
//!
//! Order inside [`Tool::invoke`]: validate arguments, resolve approval (gated
//! tools only), then run the backend. A denied or invalid call never reaches
//! the backend, and a backend fault (error or panic) comes back as a
//! structured failure.

use crate::approval::{self, ApprovalDecision};
use crate::context::ToolContext;
use crate::tools::catalog::{ToolCategory, ToolDescriptor};
use crate::tools::output::{Denial, FailureKind, ToolFailure, ToolOutput, ToolSuccess};
use crate::types::CallId;
use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

/// Result a backend hands back to the wrapper.
pub type BackendResult = std::result::Result<ToolSuccess, ToolFailure>;

/// The I/O side of a tool: runs once approval (if any) is settled.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult;
}

/// A callable tool: static descriptor plus the backend that does the work.
#[derive(Clone)]
pub struct Tool {
    descriptor: &'static ToolDescriptor,
    backend: Arc<dyn ToolBackend>,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.descriptor.name)
            .field("category", &self.descriptor.category)
            .field("requires_approval", &self.descriptor.requires_approval())
            .finish()
    }
}

impl Tool {
    pub fn new(descriptor: &'static ToolDescriptor, backend: Arc<dyn ToolBackend>) -> Self {
        Self {
            descriptor,
            backend,
        }
    }

    /// Same descriptor, different backend. Used to stub I/O in tests.
    pub fn with_backend(&self, backend: Arc<dyn ToolBackend>) -> Self {
        Self::new(self.descriptor, backend)
    }

    pub fn descriptor(&self) -> &'static ToolDescriptor {
        self.descriptor
    }

    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    pub fn category(&self) -> ToolCategory {
        self.descriptor.category
    }

    pub fn requires_approval(&self) -> bool {
        self.descriptor.requires_approval()
    }

    /// Invoke the tool against `ctx`.
    pub async fn invoke(&self, ctx: &ToolContext, args: Value) -> ToolOutput {
        let call_id = CallId::new();
        let span = tracing::info_span!("tool_call", tool = self.name(), call_id = %call_id);
        self.invoke_inner(ctx, args).instrument(span).await
    }

    async fn invoke_inner(&self, ctx: &ToolContext, args: Value) -> ToolOutput {
        let args = if args.is_null() {
            Value::Object(Default::default())
        } else {
            args
        };

        let errors = self.descriptor.validate_args(&args);
        if !errors.is_empty() {
            tracing::debug!(errors = ?errors, "invalid arguments");
            return ToolOutput::Failure(ToolFailure::new(
                FailureKind::InvalidArguments,
                format!("Invalid arguments for {}: {}", self.name(), errors.join("; ")),
            ));
        }

        let request = match self.descriptor.approval_request(ctx, &args) {
            Ok(request) => request,
            Err(err) => {
                tracing::debug!(error = %err, "call cannot be put up for approval");
                return ToolOutput::Failure(err.into());
            }
        };
        if let Some(request) = request {
            if let ApprovalDecision::Denied(reason) = approval::resolve(ctx, &request).await {
                return ToolOutput::Denied(Denial { reason });
            }
        }

        let started = std::time::Instant::now();
        let outcome = AssertUnwindSafe(self.backend.execute(ctx, args))
            .catch_unwind()
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(success)) => {
                tracing::debug!(elapsed_ms, "tool succeeded");
                ToolOutput::Success(success)
            }
            Ok(Err(failure)) => {
                tracing::debug!(elapsed_ms, kind = ?failure.kind, message = %failure.message, "tool failed");
                ToolOutput::Failure(failure)
            }
            Err(_) => {
                tracing::error!(elapsed_ms, "tool backend panicked");
                ToolOutput::Failure(ToolFailure::new(
                    FailureKind::Internal,
                    format!("{} backend panicked", self.name()),
                ))
            }
        }
    }
}
