//! Approval resolution.
//!
//! Precedence, evaluated in order and short-circuiting:
//! 1. yolo mode → approved
//! 2. action on the auto-approved list → approved
//! 3. callback present → its answer (error or panic → denied)
//! 4. otherwise → denied, no approval mechanism configured

use super::{ApprovalDecision, ApprovalRequest, DenialReason};
use crate::context::ToolContext;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Decide one approval request against `ctx`.
///
/// The callback await is the only suspension point. Nothing is cached: every
/// gated call comes through here again.
pub async fn resolve(ctx: &ToolContext, request: &ApprovalRequest) -> ApprovalDecision {
    if ctx.yolo_mode() {
        tracing::debug!(
            tool = %request.tool_name,
            action = %request.action,
            "approved: yolo mode"
        );
        return ApprovalDecision::Approved;
    }

    if ctx.is_auto_approved(&request.action) {
        tracing::debug!(
            tool = %request.tool_name,
            action = %request.action,
            "approved: auto-approved action"
        );
        return ApprovalDecision::Approved;
    }

    let Some(callback) = ctx.approval_callback() else {
        let reason = DenialReason::NoApprovalMechanism;
        tracing::info!(tool = %request.tool_name, action = %request.action, %reason, "denied");
        return ApprovalDecision::Denied(reason);
    };

    let outcome = AssertUnwindSafe(callback.approve(request))
        .catch_unwind()
        .await;

    let decision = match outcome {
        Ok(Ok(true)) => ApprovalDecision::Approved,
        Ok(Ok(false)) => ApprovalDecision::Denied(DenialReason::RejectedByCallback),
        Ok(Err(e)) => {
            tracing::warn!(
                tool = %request.tool_name,
                action = %request.action,
                error = %e,
                "approval callback returned an error"
            );
            ApprovalDecision::Denied(DenialReason::CallbackFailed)
        }
        Err(_) => {
            tracing::warn!(
                tool = %request.tool_name,
                action = %request.action,
                "approval callback panicked"
            );
            ApprovalDecision::Denied(DenialReason::CallbackFailed)
        }
    };

    match decision {
        ApprovalDecision::Approved => {
            tracing::debug!(tool = %request.tool_name, action = %request.action, "approved: callback")
        }
        ApprovalDecision::Denied(reason) => {
            tracing::info!(tool = %request.tool_name, action = %request.action, %reason, "denied")
        }
    }
    decision
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::{approval_fn, ApprovalCallback, CallbackError, CallbackResult};
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_test::traced_test;

    /// Callback that counts calls and answers a fixed value.
    #[derive(Debug, Default)]
    struct Counting {
        calls: AtomicUsize,
        answer: bool,
    }

    #[async_trait]
    impl ApprovalCallback for Counting {
        async fn approve(&self, _request: &ApprovalRequest) -> CallbackResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer)
        }
    }

    /// Callback that must never be reached.
    #[derive(Debug)]
    struct Unreachable;

    #[async_trait]
    impl ApprovalCallback for Unreachable {
        async fn approve(&self, request: &ApprovalRequest) -> CallbackResult {
            panic!("callback invoked for {}", request.action);
        }
    }

    fn ctx() -> (tempfile::TempDir, ToolContext) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::new(dir.path()).unwrap();
        (dir, ctx)
    }

    fn request(action: &str) -> ApprovalRequest {
        ApprovalRequest::new("shell", action, format!("{action} something"))
    }

    #[tokio::test]
    async fn test_yolo_overrides_denying_callback() {
        let (_dir, ctx) = ctx();
        let counting = Arc::new(Counting::default());
        let ctx = ctx
            .with_yolo_mode(true)
            .with_shared_approval_callback(counting.clone());

        let decision = resolve(&ctx, &request("run command")).await;
        assert_eq!(decision, ApprovalDecision::Approved);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_auto_approved_skips_callback() {
        let (_dir, ctx) = ctx();
        let ctx = ctx
            .with_auto_approved_actions(["run command"])
            .with_approval_callback(Unreachable);

        let decision = resolve(&ctx, &request("run command")).await;
        assert_eq!(decision, ApprovalDecision::Approved);
    }

    #[tokio::test]
    async fn test_no_mechanism_denies() {
        let (_dir, ctx) = ctx();
        let ctx = ctx.with_auto_approved_actions(["run command"]);

        let decision = resolve(&ctx, &request("write file")).await;
        assert_eq!(
            decision,
            ApprovalDecision::Denied(DenialReason::NoApprovalMechanism)
        );
        assert_eq!(
            decision.denial_reason().unwrap().to_string(),
            "no approval mechanism configured"
        );
    }

    #[tokio::test]
    async fn test_callback_answer_is_decision() {
        for answer in [true, false] {
            let (_dir, ctx) = ctx();
            let counting = Arc::new(Counting {
                calls: AtomicUsize::new(0),
                answer,
            });
            let ctx = ctx.with_shared_approval_callback(counting.clone());

            let decision = resolve(&ctx, &request("write file")).await;
            assert_eq!(decision.is_approved(), answer);
            assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_every_call_reevaluates() {
        let (_dir, ctx) = ctx();
        let counting = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            answer: true,
        });
        let ctx = ctx.with_shared_approval_callback(counting.clone());

        for _ in 0..3 {
            assert!(resolve(&ctx, &request("edit file")).await.is_approved());
        }
        assert_eq!(counting.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_callback_error_denies() {
        let (_dir, ctx) = ctx();
        let ctx = ctx.with_approval_callback(approval_fn(|_req| async move {
            Err::<bool, CallbackError>("policy service unreachable".into())
        }));

        let decision = resolve(&ctx, &request("run command")).await;
        assert_eq!(decision, ApprovalDecision::Denied(DenialReason::CallbackFailed));
        assert!(logs_contain("policy service unreachable"));
    }

    #[tokio::test]
    async fn test_callback_panic_denies() {
        let (_dir, ctx) = ctx();
        let ctx = ctx.with_approval_callback(Unreachable);

        let decision = resolve(&ctx, &request("run command")).await;
        assert_eq!(decision, ApprovalDecision::Denied(DenialReason::CallbackFailed));
    }

    #[tokio::test]
    async fn test_concurrent_resolution_is_independent() {
        let (_dir, ctx) = ctx();
        let ctx = Arc::new(ctx.with_approval_callback(approval_fn(|req| async move {
            tokio::task::yield_now().await;
            Ok(req.action.ends_with("even"))
        })));

        let mut handles = Vec::new();
        for i in 0..16 {
            let ctx = ctx.clone();
            handles.push(tokio::spawn(async move {
                let parity = if i % 2 == 0 { "even" } else { "odd" };
                let decision = resolve(&ctx, &request(&format!("action {parity}"))).await;
                (i, decision)
            }));
        }
        for handle in handles {
            let (i, decision) = handle.await.unwrap();
            assert_eq!(decision.is_approved(), i % 2 == 0);
        }
    }

    proptest! {
        #[test]
        fn prop_yolo_always_approves(
            action in "[a-z ]{1,16}",
            allow in proptest::collection::vec("[a-z ]{1,16}", 0..4),
            has_callback in any::<bool>(),
        ) {
            let (_dir, ctx) = ctx();
            let mut ctx = ctx.with_yolo_mode(true).with_auto_approved_actions(allow);
            if has_callback {
                ctx = ctx.with_approval_callback(approval_fn(|_req| async move { Ok(false) }));
            }
            let decision = tokio_test::block_on(resolve(&ctx, &request(&action)));
            prop_assert_eq!(decision, ApprovalDecision::Approved);
        }

        #[test]
        fn prop_allow_listed_never_consults_callback(
            action in "[a-z ]{1,16}",
            extra in proptest::collection::vec("[a-z ]{1,16}", 0..4),
        ) {
            let (_dir, ctx) = ctx();
            let ctx = ctx
                .with_auto_approved_actions(extra)
                .with_auto_approved_actions([action.clone()])
                .with_approval_callback(Unreachable);
            let decision = tokio_test::block_on(resolve(&ctx, &request(&action)));
            prop_assert_eq!(decision, ApprovalDecision::Approved);
        }
    }
}
