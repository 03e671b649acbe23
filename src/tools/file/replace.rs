use super::{io_failure, write_target};
use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::ToolSuccess;
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
struct Edit {
    old: String,
    new: String,
    #[serde(default)]
    replace_all: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Edits {
    One(Edit),
    Many(Vec<Edit>),
}

impl Edits {
    fn into_vec(self) -> Vec<Edit> {
        match self {
            Edits::One(edit) => vec![edit],
            Edits::Many(edits) => edits,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Args {
    path: String,
    edit: Edits,
}

/// Apply edits in order, returning the new content and replacement count.
fn apply_edits(content: &str, edits: &[Edit]) -> (String, usize) {
    let mut current = content.to_string();
    let mut replacements = 0;
    for edit in edits {
        let found = current.matches(edit.old.as_str()).count();
        if found == 0 {
            continue;
        }
        if edit.replace_all {
            current = current.replace(edit.old.as_str(), &edit.new);
            replacements += found;
        } else {
            current = current.replacen(edit.old.as_str(), &edit.new, 1);
            replacements += 1;
        }
    }
    (current, replacements)
}

/// `str_replace_file` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrReplaceFile;

#[async_trait]
impl ToolBackend for StrReplaceFile {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let args: Args = parse_args(args)?;
        let edits = args.edit.into_vec();
        if edits.is_empty() {
            return Err(Error::validation("at least one edit is required").into());
        }
        if edits.iter().any(|e| e.old.is_empty()) {
            return Err(Error::validation("`old` must not be empty").into());
        }

        let path = write_target(ctx, &args.path)?.path;
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| io_failure(&args.path, e))?;

        let (updated, replacements) = apply_edits(&content, &edits);
        if replacements == 0 || updated == content {
            return Err(Error::validation(
                "No replacements were made. The old string was not found in the file.",
            )
            .into());
        }

        tokio::fs::write(&path, updated.as_bytes())
            .await
            .map_err(|e| io_failure(&args.path, e))?;

        tracing::debug!(path = %path.display(), edits = edits.len(), replacements, "file edited");
        Ok(ToolSuccess::new("")
            .with_message(format!(
                "File successfully edited. Applied {} edit(s) with {} total replacement(s).",
                edits.len(),
                replacements
            ))
            .with_data(json!({
                "path": path.display().to_string(),
                "replacements": replacements,
            })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::output::FailureKind;
    use crate::tools::registry;

    #[test]
    fn test_apply_edits_first_vs_all() {
        let edits = vec![
            Edit {
                old: "a".into(),
                new: "b".into(),
                replace_all: false,
            },
            Edit {
                old: "x".into(),
                new: "y".into(),
                replace_all: true,
            },
        ];
        let (out, count) = apply_edits("a a x x x", &edits);
        assert_eq!(out, "b a y y y");
        assert_eq!(count, 4);
    }

    fn setup() -> (tempfile::TempDir, ToolContext) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn old() {}\nfn old_two() {}\n").unwrap();
        let ctx = ToolContext::new(dir.path()).unwrap().with_yolo_mode(true);
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_single_edit() {
        let (dir, ctx) = setup();
        let tool = registry::tool("str_replace_file").unwrap();

        let out = tool
            .invoke(
                &ctx,
                json!({"path": "lib.rs", "edit": {"old": "fn old()", "new": "fn renamed()"}}),
            )
            .await;
        assert!(out.is_success(), "{:?}", out);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
            "fn renamed() {}\nfn old_two() {}\n"
        );
    }

    #[tokio::test]
    async fn test_edit_list_with_replace_all() {
        let (dir, ctx) = setup();
        let tool = registry::tool("str_replace_file").unwrap();

        let out = tool
            .invoke(
                &ctx,
                json!({"path": "lib.rs", "edit": [
                    {"old": "old", "new": "new", "replace_all": true},
                    {"old": "{}", "new": "{ }"}
                ]}),
            )
            .await;
        let success = out.success().unwrap();
        assert_eq!(success.data.as_ref().unwrap()["replacements"], 3);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
            "fn new() { }\nfn new_two() {}\n"
        );
    }

    #[tokio::test]
    async fn test_no_match_fails_and_leaves_file() {
        let (dir, ctx) = setup();
        let tool = registry::tool("str_replace_file").unwrap();

        let out = tool
            .invoke(&ctx, json!({"path": "lib.rs", "edit": {"old": "missing", "new": "x"}}))
            .await;
        let failure = out.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::InvalidArguments);
        assert!(failure.message.starts_with("No replacements were made"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("lib.rs")).unwrap(),
            "fn old() {}\nfn old_two() {}\n"
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (_dir, ctx) = setup();
        let tool = registry::tool("str_replace_file").unwrap();

        let out = tool
            .invoke(&ctx, json!({"path": "gone.rs", "edit": {"old": "a", "new": "b"}}))
            .await;
        assert_eq!(out.failure().unwrap().kind, FailureKind::NotFound);
    }
}
