use super::{io_failure, write_target};
use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::ToolSuccess;
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum WriteMode {
    #[default]
    Overwrite,
    Append,
}

#[derive(Debug, Deserialize)]
struct Args {
    path: String,
    content: String,
    mode: Option<WriteMode>,
}

/// `write_file` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteFile;

#[async_trait]
impl ToolBackend for WriteFile {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let args: Args = parse_args(args)?;
        let path = write_target(ctx, &args.path)?.path;

        let parent_ok = match path.parent() {
            Some(parent) => tokio::fs::metadata(parent)
                .await
                .map(|m| m.is_dir())
                .unwrap_or(false),
            None => false,
        };
        if !parent_ok {
            return Err(Error::not_found(format!(
                "parent directory of `{}` does not exist",
                args.path
            ))
            .into());
        }
        if let Ok(meta) = tokio::fs::metadata(&path).await {
            if meta.is_dir() {
                return Err(Error::validation(format!("`{}` is a directory", args.path)).into());
            }
        }

        let mode = args.mode.unwrap_or_default();
        match mode {
            WriteMode::Overwrite => tokio::fs::write(&path, args.content.as_bytes())
                .await
                .map_err(|e| io_failure(&args.path, e))?,
            WriteMode::Append => {
                let mut file = tokio::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .await
                    .map_err(|e| io_failure(&args.path, e))?;
                file.write_all(args.content.as_bytes())
                    .await
                    .map_err(|e| io_failure(&args.path, e))?;
                file.flush().await.map_err(|e| io_failure(&args.path, e))?;
            }
        }

        let size = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_failure(&args.path, e))?
            .len();
        let verb = match mode {
            WriteMode::Overwrite => "overwritten",
            WriteMode::Append => "appended to",
        };

        tracing::debug!(path = %path.display(), size, ?mode, "file written");
        Ok(ToolSuccess::new("")
            .with_message(format!(
                "File successfully {}. Current size: {} bytes.",
                verb, size
            ))
            .with_data(json!({"path": path.display().to_string(), "size": size})))
    }
}
