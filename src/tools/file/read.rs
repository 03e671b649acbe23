use super::{io_failure, looks_binary};
use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::ToolSuccess;
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::Cursor;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};

/// Bytes inspected to decide whether a file is binary.
const SNIFF_BYTES: u64 = 32;

#[derive(Debug, Deserialize)]
struct Args {
    path: String,
    line_offset: Option<i64>,
    n_lines: Option<i64>,
}

/// Why reading stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    Requested,
    MaxLines,
    MaxBytes,
    Eof,
}

/// Read one line, keeping at most `keep` bytes of it. `None` at end of file.
async fn next_line<R>(reader: &mut R, keep: usize) -> std::io::Result<Option<Vec<u8>>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = Vec::new();
    let mut any = false;
    loop {
        let chunk = reader.fill_buf().await?;
        if chunk.is_empty() {
            return Ok(any.then_some(line));
        }
        any = true;
        let (used, done) = match chunk.iter().position(|b| *b == b'\n') {
            Some(idx) => (idx + 1, true),
            None => (chunk.len(), false),
        };
        let room = keep.saturating_sub(line.len());
        line.extend_from_slice(&chunk[..used.min(room)]);
        reader.consume(used);
        if done {
            return Ok(Some(line));
        }
    }
}

fn cap_line(line: &str, max_chars: usize) -> Option<String> {
    if line.chars().count() <= max_chars {
        return None;
    }
    let mut cut: String = line.chars().take(max_chars.saturating_sub(3)).collect();
    cut.push_str("...");
    Some(cut)
}

/// `read_file` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadFile;

#[async_trait]
impl ToolBackend for ReadFile {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let args: Args = parse_args(args)?;
        let limits = ctx.limits();

        let line_offset = args.line_offset.unwrap_or(1);
        if line_offset < 1 {
            return Err(Error::validation("line_offset must be at least 1").into());
        }
        let max_lines = limits.max_read_lines;
        let (n_lines, capped) = match args.n_lines {
            Some(n) if n < 1 => {
                return Err(Error::validation("n_lines must be at least 1").into())
            }
            Some(n) => ((n as usize).min(max_lines), n as usize > max_lines),
            None => (max_lines, false),
        };

        let path = ctx.resolve_path(&args.path);
        let meta = tokio::fs::metadata(&path)
            .await
            .map_err(|e| io_failure(&args.path, e))?;
        if meta.is_dir() {
            return Err(Error::validation(format!("`{}` is a directory", args.path)).into());
        }

        let mut file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| io_failure(&args.path, e))?;
        let mut header = Vec::with_capacity(SNIFF_BYTES as usize);
        (&mut file)
            .take(SNIFF_BYTES)
            .read_to_end(&mut header)
            .await
            .map_err(|e| io_failure(&args.path, e))?;
        if looks_binary(&header) {
            return Err(Error::validation(format!(
                "`{}` appears to be a binary file. Use read_media_file for images and \
                 videos, or shell commands for other binary formats.",
                args.path
            ))
            .into());
        }
        let mut reader = BufReader::new(Cursor::new(header).chain(file));

        // A kept line longer than this is always over the character cap.
        let keep = limits.max_line_length.saturating_mul(4).saturating_add(4);
        let start = line_offset as usize;
        let mut output = String::new();
        let mut lines_read = 0usize;
        let mut bytes_read = 0usize;
        let mut truncated_lines = Vec::new();
        let mut line_no = 0usize;
        let mut stop = Stop::Eof;

        while let Some(raw) = next_line(&mut reader, keep)
            .await
            .map_err(|e| io_failure(&args.path, e))?
        {
            line_no += 1;
            if line_no < start {
                continue;
            }
            let text = String::from_utf8_lossy(&raw);
            let line = text.trim_end_matches(['\n', '\r']);
            let shown = match cap_line(line, limits.max_line_length) {
                Some(cut) => {
                    truncated_lines.push(line_no);
                    cut
                }
                None => line.to_string(),
            };
            bytes_read += shown.len() + 1;
            output.push_str(&format!("{:>6}\t{}\n", line_no, shown));
            lines_read += 1;

            if lines_read >= n_lines {
                stop = if capped { Stop::MaxLines } else { Stop::Requested };
                break;
            }
            if bytes_read >= limits.max_read_bytes {
                stop = Stop::MaxBytes;
                break;
            }
        }

        let eof = match stop {
            Stop::Eof => true,
            _ => reader
                .fill_buf()
                .await
                .map(|rest| rest.is_empty())
                .unwrap_or(false),
        };

        let mut message = if lines_read == 0 {
            "No lines read from file.".to_string()
        } else {
            format!(
                "{} lines read from file starting from line {}.",
                lines_read, start
            )
        };
        match stop {
            _ if eof => message.push_str(" End of file reached."),
            Stop::MaxLines => message.push_str(&format!(" Max {} lines reached.", max_lines)),
            Stop::MaxBytes => {
                message.push_str(&format!(" Max {} bytes reached.", limits.max_read_bytes))
            }
            Stop::Requested | Stop::Eof => {}
        }
        if !truncated_lines.is_empty() {
            message.push_str(&format!(" Lines {:?} were truncated.", truncated_lines));
        }

        tracing::debug!(path = %path.display(), lines_read, bytes_read, ?stop, "file read");
        Ok(ToolSuccess::new(output)
            .with_message(message)
            .with_data(json!({
                "path": path.display().to_string(),
                "start_line": start,
                "lines_read": lines_read,
                "eof": eof,
            })))
    }
}
