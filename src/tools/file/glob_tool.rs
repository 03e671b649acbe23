use super::{display_relative, io_failure, run_blocking};
use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::{ToolFailure, ToolSuccess};
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct Args {
    pattern: String,
    directory: Option<String>,
    include_dirs: Option<bool>,
}

/// `glob_tool` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobFiles;

#[async_trait]
impl ToolBackend for GlobFiles {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let args: Args = parse_args(args)?;
        if args.pattern.starts_with("**") {
            return Err(Error::validation(format!(
                "Pattern `{}` starts with '**', which is not allowed because it can match \
                 too many files. Use a narrower pattern such as `src/**/*.rs`.",
                args.pattern
            ))
            .into());
        }

        let shown_dir = args.directory.clone().unwrap_or_else(|| ".".to_string());
        let dir = ctx.resolve_path(&shown_dir);
        let meta = tokio::fs::metadata(&dir)
            .await
            .map_err(|e| io_failure(&shown_dir, e))?;
        if !meta.is_dir() {
            return Err(Error::validation(format!("`{}` is not a directory", shown_dir)).into());
        }

        let include_dirs = args.include_dirs.unwrap_or(true);
        let max = ctx.limits().max_glob_matches;
        let full_pattern = format!(
            "{}/{}",
            ::glob::Pattern::escape(&dir.to_string_lossy()),
            args.pattern
        );

        let search_dir = dir.clone();
        let mut matches = run_blocking(move || {
            let paths = ::glob::glob(&full_pattern).map_err(|e| {
                ToolFailure::from(Error::validation(format!("invalid glob pattern: {}", e)))
            })?;
            let mut found: Vec<PathBuf> = Vec::new();
            for entry in paths.flatten() {
                if !include_dirs && entry.is_dir() {
                    continue;
                }
                found.push(entry);
            }
            found.sort();
            Ok(found
                .iter()
                .map(|p| display_relative(p, &search_dir))
                .collect::<Vec<String>>())
        })
        .await?;

        let total = matches.len();
        let mut message = if total == 0 {
            format!("No matches found for pattern `{}`.", args.pattern)
        } else {
            format!("Found {} matches for pattern `{}`.", total, args.pattern)
        };
        if total > max {
            matches.truncate(max);
            message.push_str(&format!(" Only the first {} matches are returned.", max));
        }

        Ok(ToolSuccess::new(matches.join("\n"))
            .with_message(message)
            .with_data(json!({ "paths": matches, "total": total })))
    }
}

#[cfg(test)]
mod tests {
    use crate::context::ToolContext;
    use crate::tools::output::FailureKind;
    use crate::tools::registry;
    use crate::types::ToolLimits;
    use serde_json::json;

    fn setup() -> (tempfile::TempDir, ToolContext) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/nested")).unwrap();
        std::fs::write(root.join("src/lib.rs"), "").unwrap();
        std::fs::write(root.join("src/nested/mod.rs"), "").unwrap();
        std::fs::write(root.join("README.md"), "").unwrap();
        let ctx = ToolContext::new(root).unwrap();
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_recursive_pattern() {
        let (_dir, ctx) = setup();
        let tool = registry::tool("glob_tool").unwrap();

        let out = tool.invoke(&ctx, json!({"pattern": "src/**/*.rs"})).await;
        let success = out.success().unwrap();
        assert_eq!(success.output, "src/lib.rs\nsrc/nested/mod.rs");
    }

    #[tokio::test]
    async fn test_directory_and_exclude_dirs() {
        let (_dir, ctx) = setup();
        let tool = registry::tool("glob_tool").unwrap();

        let out = tool
            .invoke(&ctx, json!({"pattern": "*", "directory": "src", "include_dirs": false}))
            .await;
        assert_eq!(out.success().unwrap().output, "lib.rs");
    }

    #[tokio::test]
    async fn test_leading_double_star_rejected() {
        let (_dir, ctx) = setup();
        let tool = registry::tool("glob_tool").unwrap();

        let out = tool.invoke(&ctx, json!({"pattern": "**/*.rs"})).await;
        assert_eq!(out.failure().unwrap().kind, FailureKind::InvalidArguments);
    }

    #[tokio::test]
    async fn test_match_cap() {
        let (_dir, ctx) = setup();
        let ctx = ctx.with_limits(ToolLimits {
            max_glob_matches: 1,
            ..ToolLimits::default()
        });
        let tool = registry::tool("glob_tool").unwrap();

        let out = tool.invoke(&ctx, json!({"pattern": "src/**/*.rs"})).await;
        let success = out.success().unwrap();
        assert_eq!(success.output, "src/lib.rs");
        assert!(success
            .message
            .as_deref()
            .unwrap()
            .contains("Only the first 1 matches"));
    }
}
