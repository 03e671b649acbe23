use super::io_failure;
use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::ToolSuccess;
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Args {
    path: String,
}

fn mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "tif" | "tiff" => "image/tiff",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        _ => return None,
    };
    Some(mime)
}

/// `read_media_file` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadMediaFile;

#[async_trait]
impl ToolBackend for ReadMediaFile {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let args: Args = parse_args(args)?;
        let path = ctx.resolve_path(&args.path);

        let mime = mime_type(&path).ok_or_else(|| {
            Error::validation(format!(
                "`{}` is not a supported image or video file",
                args.path
            ))
        })?;

        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_failure(&args.path, e))?;
        if !meta.is_file() {
            return Err(Error::validation(format!("`{}` is not a file", args.path)).into());
        }
        let max = ctx.limits().max_media_bytes;
        if meta.len() > max {
            return Err(Error::validation(format!(
                "`{}` is {} bytes, larger than the {} byte limit",
                args.path,
                meta.len(),
                max
            ))
            .into());
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| io_failure(&args.path, e))?;
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(&bytes));
        let kind = if mime.starts_with("video/") { "video" } else { "image" };

        Ok(ToolSuccess::new(format!(
            "Loaded {} file `{}` ({}, {} bytes).",
            kind,
            args.path,
            mime,
            bytes.len()
        ))
        .with_data(json!({
            "mime_type": mime,
            "size": bytes.len(),
            "data_url": data_url,
        })))
    }
}
