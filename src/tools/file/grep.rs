use super::{display_relative, io_failure, looks_binary, run_blocking};
use crate::context::ToolContext;
use crate::tools::gate::{BackendResult, ToolBackend};
use crate::tools::output::ToolSuccess;
use crate::tools::parse_args;
use crate::types::Error;
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Leading bytes inspected to decide a file is binary.
const BINARY_SNIFF_BYTES: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum OutputMode {
    #[default]
    FilesWithMatches,
    Content,
    CountMatches,
}

#[derive(Debug, Deserialize)]
struct Args {
    pattern: String,
    path: Option<String>,
    glob: Option<String>,
    ignore_case: Option<bool>,
    output_mode: Option<OutputMode>,
    head_limit: Option<i64>,
}

struct Search {
    regex: Regex,
    name_filter: Option<::glob::Pattern>,
    mode: OutputMode,
    limit: Option<usize>,
    max_file_bytes: u64,
    display_base: PathBuf,
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}

fn candidate_files(root: &Path) -> Vec<PathBuf> {
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
        .collect()
}

impl Search {
    /// Returns the matched entries and whether the limit cut the list short.
    fn run(&self, root: &Path) -> (Vec<String>, bool) {
        let mut entries = Vec::new();
        for file in candidate_files(root) {
            if let Some(filter) = &self.name_filter {
                let name = file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if !filter.matches(&name) {
                    continue;
                }
            }
            match std::fs::metadata(&file) {
                Ok(meta) if meta.len() <= self.max_file_bytes => {}
                Ok(meta) => {
                    tracing::debug!(file = %file.display(), size = meta.len(), "skipping large file");
                    continue;
                }
                Err(_) => continue,
            }
            let Ok(bytes) = std::fs::read(&file) else {
                continue;
            };
            if looks_binary(&bytes[..bytes.len().min(BINARY_SNIFF_BYTES)]) {
                continue;
            }
            let text = String::from_utf8_lossy(&bytes);
            let shown = display_relative(&file, &self.display_base);

            match self.mode {
                OutputMode::FilesWithMatches => {
                    if self.regex.is_match(&text) {
                        entries.push(shown);
                    }
                }
                OutputMode::Content => {
                    for (idx, line) in text.lines().enumerate() {
                        if self.regex.is_match(line) {
                            entries.push(format!("{}:{}:{}", shown, idx + 1, line));
                            if self.limit_reached(&entries) {
                                break;
                            }
                        }
                    }
                }
                OutputMode::CountMatches => {
                    let count = text.lines().filter(|l| self.regex.is_match(l)).count();
                    if count > 0 {
                        entries.push(format!("{}:{}", shown, count));
                    }
                }
            }

            if self.limit_reached(&entries) {
                break;
            }
        }

        match self.limit {
            Some(limit) if entries.len() > limit => {
                entries.truncate(limit);
                (entries, true)
            }
            _ => (entries, false),
        }
    }

    // One past the limit so the caller can tell the list was cut.
    fn limit_reached(&self, entries: &[String]) -> bool {
        self.limit.map_or(false, |limit| entries.len() > limit)
    }
}

/// `grep` backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grep;

#[async_trait]
impl ToolBackend for Grep {
    async fn execute(&self, ctx: &ToolContext, args: Value) -> BackendResult {
        let args: Args = parse_args(args)?;

        let regex = RegexBuilder::new(&args.pattern)
            .case_insensitive(args.ignore_case.unwrap_or(false))
            .build()
            .map_err(|e| Error::validation(format!("invalid regex: {}", e)))?;
        let name_filter = args
            .glob
            .as_deref()
            .map(::glob::Pattern::new)
            .transpose()
            .map_err(|e| Error::validation(format!("invalid glob: {}", e)))?;
        let limit = match args.head_limit {
            Some(n) if n < 1 => {
                return Err(Error::validation("head_limit must be at least 1").into())
            }
            Some(n) => Some(n as usize),
            None => None,
        };

        let shown_path = args.path.clone().unwrap_or_else(|| ".".to_string());
        let root = ctx.resolve_path(&shown_path);
        tokio::fs::metadata(&root)
            .await
            .map_err(|e| io_failure(&shown_path, e))?;

        let mode = args.output_mode.unwrap_or_default();
        let search = Search {
            regex,
            name_filter,
            mode,
            limit,
            max_file_bytes: ctx.limits().max_grep_file_bytes,
            display_base: ctx.work_dir().to_path_buf(),
        };
        let (entries, limited) = run_blocking(move || Ok(search.run(&root))).await?;

        let message = if entries.is_empty() {
            "No matches found.".to_string()
        } else if limited {
            format!("Results limited to the first {} entries.", entries.len())
        } else {
            String::new()
        };

        let mut success = ToolSuccess::new(entries.join("\n")).with_data(json!({
            "entries": entries,
            "limited": limited,
        }));
        if !message.is_empty() {
            success = success.with_message(message);
        }
        Ok(success)
    }
}
