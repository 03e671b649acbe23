//! `think` and `set_todo_list` backends. Neither touches the filesystem.

use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::ToolSuccess;
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct ThinkArgs {
    thought: String,
}

/// `think` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Think;

#[async_trait]
impl ToolBackend for Think {
    async fn execute(&self, _ctx: &ToolContext, args: Value) -> BackendResult {
        let args: ThinkArgs = parse_args(args)?;
        tracing::debug!(thought = %args.thought, "thought");
        Ok(ToolSuccess::new("").with_message("Thought logged"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TodoStatus {
    Pending,
    InProgress,
    Done,
}

impl TodoStatus {
    fn marker(self) -> &'static str {
        match self {
            TodoStatus::Pending => "[ ]",
            TodoStatus::InProgress => "[>]",
            TodoStatus::Done => "[x]",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Todo {
    title: String,
    status: TodoStatus,
}

#[derive(Debug, Deserialize)]
struct TodoArgs {
    todos: Vec<Todo>,
}

/// `set_todo_list` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct SetTodoList;

#[async_trait]
impl ToolBackend for SetTodoList {
    async fn execute(&self, _ctx: &ToolContext, args: Value) -> BackendResult {
        let args: TodoArgs = parse_args(args)?;
        if args.todos.iter().any(|t| t.title.trim().is_empty()) {
            return Err(Error::validation("todo titles must not be empty").into());
        }

        let rendered = args
            .todos
            .iter()
            .map(|t| format!("- {} {}", t.status.marker(), t.title))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(ToolSuccess::new(rendered)
            .with_message("Todo list updated")
            .with_data(json!({ "todos": args.todos })))
    }
}

#[cfg(test)]
mod tests {
    use crate::context::ToolContext;
    use crate::tools::output::FailureKind;
    use crate::tools::registry;
    use serde_json::json;

    #[tokio::test]
    async fn test_think_has_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::new(dir.path()).unwrap();

        let out = registry::tool("think")
            .unwrap()
            .invoke(&ctx, json!({"thought": "check the tests first"}))
            .await;
        let success = out.success().unwrap();
        assert!(success.output.is_empty());
        assert_eq!(success.message.as_deref(), Some("Thought logged"));
    }

    #[tokio::test]
    async fn test_todo_list_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::new(dir.path()).unwrap();

        let out = registry::tool("set_todo_list")
            .unwrap()
            .invoke(
                &ctx,
                json!({"todos": [
                    {"title": "write tests", "status": "done"},
                    {"title": "fix bug", "status": "in_progress"},
                    {"title": "release", "status": "pending"},
                ]}),
            )
            .await;
        assert_eq!(
            out.success().unwrap().output,
            "- [x] write tests\n- [>] fix bug\n- [ ] release"
        );
    }

    #[tokio::test]
    async fn test_todo_list_rejects_bad_items() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::new(dir.path()).unwrap();
        let tool = registry::tool("set_todo_list").unwrap();

        let out = tool
            .invoke(&ctx, json!({"todos": [{"title": "", "status": "done"}]}))
            .await;
        assert_eq!(out.failure().unwrap().kind, FailureKind::InvalidArguments);

        let out = tool
            .invoke(&ctx, json!({"todos": [{"title": "x", "status": "blocked"}]}))
            .await;
        assert_eq!(out.failure().unwrap().kind, FailureKind::InvalidArguments);
    }
}
