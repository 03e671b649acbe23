//! Static tool registry and selection helpers.
//!
//! Declaration order here is the order tools are exposed to a model, so it is
//! part of the contract: every helper preserves it.

use crate::context::ToolContext;
use crate::tools::catalog::{
    arg_str, ApprovalGate, GatedCall, ParamDef, ParamType, ToolCategory, ToolDescriptor,
};
use crate::tools::gate::{Tool, ToolBackend};
use crate::tools::toolset::ToolSet;
use crate::tools::{file, shell, utility, web};
use crate::types::Result;
use serde_json::Value;
use std::sync::Arc;

/// Registered tool names.
pub mod names {
    pub const READ_FILE: &str = "read_file";
    pub const WRITE_FILE: &str = "write_file";
    pub const STR_REPLACE_FILE: &str = "str_replace_file";
    pub const GLOB: &str = "glob_tool";
    pub const GREP: &str = "grep";
    pub const READ_MEDIA_FILE: &str = "read_media_file";
    pub const SHELL: &str = "shell";
    pub const SEARCH_WEB: &str = "search_web";
    pub const FETCH_URL: &str = "fetch_url";
    pub const THINK: &str = "think";
    pub const SET_TODO_LIST: &str = "set_todo_list";
}

/// Action labels reported by gated tools.
pub mod actions {
    pub const WRITE_FILE: &str = "write file";
    pub const WRITE_FILE_OUTSIDE: &str = "write file outside working directory";
    pub const EDIT_FILE: &str = "edit file";
    pub const EDIT_FILE_OUTSIDE: &str = "edit file outside working directory";
    pub const RUN_COMMAND: &str = "run command";
}

fn describe_write(ctx: &ToolContext, args: &Value) -> Result<GatedCall> {
    let target = file::write_target(ctx, arg_str(args, "path"))?;
    let mode = args
        .get("mode")
        .and_then(Value::as_str)
        .unwrap_or("overwrite");
    Ok(GatedCall {
        action: if target.outside_work_dir {
            actions::WRITE_FILE_OUTSIDE
        } else {
            actions::WRITE_FILE
        },
        description: format!("Write file `{}` (mode: {})", target.path.display(), mode),
    })
}

fn describe_edit(ctx: &ToolContext, args: &Value) -> Result<GatedCall> {
    let target = file::write_target(ctx, arg_str(args, "path"))?;
    Ok(GatedCall {
        action: if target.outside_work_dir {
            actions::EDIT_FILE_OUTSIDE
        } else {
            actions::EDIT_FILE
        },
        description: format!("Edit file `{}`", target.path.display()),
    })
}

fn describe_command(_ctx: &ToolContext, args: &Value) -> Result<GatedCall> {
    Ok(GatedCall {
        action: actions::RUN_COMMAND,
        description: format!("Run command `{}`", arg_str(args, "command")),
    })
}

const GREP_OUTPUT_MODES: &[&str] = &["files_with_matches", "content", "count_matches"];
const WRITE_MODES: &[&str] = &["overwrite", "append"];

/// Every tool, in declaration order.
pub static REGISTRY: [ToolDescriptor; 11] = [
    ToolDescriptor {
        name: names::READ_FILE,
        description: "Read a text file. Lines come back numbered; use line_offset and n_lines to page through large files.",
        category: ToolCategory::File,
        parameters: &[
            ParamDef::required("path", ParamType::String, "File path, absolute or relative to the working directory"),
            ParamDef::optional("line_offset", ParamType::Int, "1-based line to start reading from"),
            ParamDef::optional("n_lines", ParamType::Int, "Number of lines to read"),
        ],
        gate: ApprovalGate::Ungated,
    },
    ToolDescriptor {
        name: names::WRITE_FILE,
        description: "Write content to a file, overwriting or appending. Writing outside the working directory needs an absolute path.",
        category: ToolCategory::File,
        parameters: &[
            ParamDef::required("path", ParamType::String, "File path; absolute when outside the working directory"),
            ParamDef::required("content", ParamType::String, "Content to write"),
            ParamDef::optional("mode", ParamType::Enum(WRITE_MODES), "overwrite (default) or append"),
        ],
        gate: ApprovalGate::Required {
            action: actions::WRITE_FILE,
            describe: describe_write,
        },
    },
    ToolDescriptor {
        name: names::STR_REPLACE_FILE,
        description: "Replace exact strings in an existing file. `edit` is one {old, new, replace_all?} object or a list of them.",
        category: ToolCategory::File,
        parameters: &[
            ParamDef::required("path", ParamType::String, "File path; absolute when outside the working directory"),
            ParamDef::required("edit", ParamType::Json, "Edit or list of edits to apply in order"),
        ],
        gate: ApprovalGate::Required {
            action: actions::EDIT_FILE,
            describe: describe_edit,
        },
    },
    ToolDescriptor {
        name: names::GLOB,
        description: "Find files and directories by glob pattern, e.g. `src/**/*.rs`.",
        category: ToolCategory::File,
        parameters: &[
            ParamDef::required("pattern", ParamType::String, "Glob pattern; may not start with `**`"),
            ParamDef::optional("directory", ParamType::String, "Directory to search, defaults to the working directory"),
            ParamDef::optional("include_dirs", ParamType::Bool, "Include directories in the results (default true)"),
        ],
        gate: ApprovalGate::Ungated,
    },
    ToolDescriptor {
        name: names::GREP,
        description: "Search file contents with a regular expression.",
        category: ToolCategory::File,
        parameters: &[
            ParamDef::required("pattern", ParamType::String, "Regular expression"),
            ParamDef::optional("path", ParamType::String, "File or directory to search, defaults to the working directory"),
            ParamDef::optional("glob", ParamType::String, "Only search files whose name matches this glob"),
            ParamDef::optional("ignore_case", ParamType::Bool, "Case-insensitive matching"),
            ParamDef::optional("output_mode", ParamType::Enum(GREP_OUTPUT_MODES), "What to report (default files_with_matches)"),
            ParamDef::optional("head_limit", ParamType::Int, "Report at most this many entries"),
        ],
        gate: ApprovalGate::Ungated,
    },
    ToolDescriptor {
        name: names::READ_MEDIA_FILE,
        description: "Read an image or video file and return it as a base64 data URL.",
        category: ToolCategory::File,
        parameters: &[ParamDef::required("path", ParamType::String, "Media file path")],
        gate: ApprovalGate::Ungated,
    },
    ToolDescriptor {
        name: names::SHELL,
        description: "Run a shell command in the working directory and return its output.",
        category: ToolCategory::Shell,
        parameters: &[
            ParamDef::required("command", ParamType::String, "Command line passed to the shell"),
            ParamDef::optional("timeout", ParamType::Int, "Timeout in seconds"),
        ],
        gate: ApprovalGate::Required {
            action: actions::RUN_COMMAND,
            describe: describe_command,
        },
    },
    ToolDescriptor {
        name: names::SEARCH_WEB,
        description: "Search the web.",
        category: ToolCategory::Web,
        parameters: &[
            ParamDef::required("query", ParamType::String, "Search query"),
            ParamDef::optional("limit", ParamType::Int, "Maximum results (default 5)"),
            ParamDef::optional("include_content", ParamType::Bool, "Include page content in results"),
        ],
        gate: ApprovalGate::Ungated,
    },
    ToolDescriptor {
        name: names::FETCH_URL,
        description: "Fetch a web page and return its main text content.",
        category: ToolCategory::Web,
        parameters: &[ParamDef::required("url", ParamType::String, "URL to fetch")],
        gate: ApprovalGate::Ungated,
    },
    ToolDescriptor {
        name: names::THINK,
        description: "Think out loud. Records the thought without side effects.",
        category: ToolCategory::Utility,
        parameters: &[ParamDef::required("thought", ParamType::String, "The thought")],
        gate: ApprovalGate::Ungated,
    },
    ToolDescriptor {
        name: names::SET_TODO_LIST,
        description: "Replace the todo list. Each item is {title, status} with status pending, in_progress or done.",
        category: ToolCategory::Utility,
        parameters: &[ParamDef::required("todos", ParamType::Json, "List of todo items")],
        gate: ApprovalGate::Ungated,
    },
];

/// All registered descriptors, in declaration order.
pub fn descriptors() -> &'static [ToolDescriptor] {
    &REGISTRY
}

/// Look up a descriptor by name.
pub fn descriptor(name: &str) -> Option<&'static ToolDescriptor> {
    REGISTRY.iter().find(|d| d.name == name)
}

fn default_backend(name: &str) -> Option<Arc<dyn ToolBackend>> {
    let backend: Arc<dyn ToolBackend> = match name {
        names::READ_FILE => Arc::new(file::ReadFile),
        names::WRITE_FILE => Arc::new(file::WriteFile),
        names::STR_REPLACE_FILE => Arc::new(file::StrReplaceFile),
        names::GLOB => Arc::new(file::GlobFiles),
        names::GREP => Arc::new(file::Grep),
        names::READ_MEDIA_FILE => Arc::new(file::ReadMediaFile),
        names::SHELL => Arc::new(shell::Shell),
        names::SEARCH_WEB => Arc::new(web::SearchWeb),
        names::FETCH_URL => Arc::new(web::FetchUrl),
        names::THINK => Arc::new(utility::Think),
        names::SET_TODO_LIST => Arc::new(utility::SetTodoList),
        _ => return None,
    };
    Some(backend)
}

/// A registered tool bound to its default backend.
pub fn tool(name: &str) -> Option<Tool> {
    let descriptor = descriptor(name)?;
    default_backend(name).map(|backend| Tool::new(descriptor, backend))
}

fn select(keep: impl Fn(&ToolDescriptor) -> bool) -> ToolSet {
    REGISTRY
        .iter()
        .filter(|d| keep(d))
        .filter_map(|d| default_backend(d.name).map(|backend| Tool::new(d, backend)))
        .collect()
}

/// Every registered tool.
pub fn all_tools() -> ToolSet {
    select(|_| true)
}

/// Tools that never ask for approval.
pub fn safe_tools() -> ToolSet {
    select(|d| !d.requires_approval())
}

/// Tools in one category.
pub fn tools_in(category: ToolCategory) -> ToolSet {
    select(|d| d.category == category)
}

pub fn file_tools() -> ToolSet {
    tools_in(ToolCategory::File)
}

pub fn shell_tools() -> ToolSet {
    tools_in(ToolCategory::Shell)
}

pub fn web_tools() -> ToolSet {
    tools_in(ToolCategory::Web)
}

pub fn utility_tools() -> ToolSet {
    tools_in(ToolCategory::Utility)
}
