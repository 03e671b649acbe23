//! The approval callback capability.
//!
//! Interactive prompts, remote policy services and static rules are all just
//! different values for one slot: an `Arc<dyn ApprovalCallback>`.

use super::ApprovalRequest;
use async_trait::async_trait;
use std::fmt;
use std::future::Future;

/// Error a callback may return instead of a decision.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one callback invocation.
pub type CallbackResult = std::result::Result<bool, CallbackError>;

/// Decides a single approval request.
///
/// Must be safe to call repeatedly and concurrently. Returning `Err` (or
/// panicking) denies the request.
#[async_trait]
pub trait ApprovalCallback: Send + Sync {
    async fn approve(&self, request: &ApprovalRequest) -> CallbackResult;
}

/// Adapter turning an async closure into an [`ApprovalCallback`].
pub struct ApprovalFn<F> {
    f: F,
}

impl<F> fmt::Debug for ApprovalFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApprovalFn").finish_non_exhaustive()
    }
}

#[async_trait]
impl<F, Fut> ApprovalCallback for ApprovalFn<F>
where
    F: Fn(ApprovalRequest) -> Fut + Send + Sync,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    async fn approve(&self, request: &ApprovalRequest) -> CallbackResult {
        (self.f)(request.clone()).await
    }
}

/// Wrap an async closure as an approval callback.
///
/// ```
/// use jeeves_tools::approval::approval_fn;
///
/// let only_readme = approval_fn(|req| async move {
///     Ok(req.description.contains("README.md"))
/// });
/// # let _ = only_readme;
/// ```
pub fn approval_fn<F, Fut>(f: F) -> ApprovalFn<F>
where
    F: Fn(ApprovalRequest) -> Fut + Send + Sync,
    Fut: Future<Output = CallbackResult> + Send + 'static,
{
    ApprovalFn { f }
}
