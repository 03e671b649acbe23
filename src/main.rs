//! Jeeves tools CLI - run registered tools from a terminal.
//!
//! Subcommands:
//! - `list`: registered tools with their category and approval gate
//! - `prompt`: the tool section handed to a model
//! - `run TOOL ARGS_JSON`: invoke one tool; gated calls prompt on the terminal
//!
//! Exit status: 0 success, 1 failure, 2 denied.

use clap::{Parser, Subcommand};
use jeeves_tools::approval::{approval_fn, ApprovalRequest, CallbackResult};
use jeeves_tools::tools::{registry, ToolCategory, ToolOutput};
use jeeves_tools::{Config, Error, Result, ToolContext};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "jeeves-tools", version, about = "Approval-gated agent tools")]
struct Cli {
    /// Working directory for file and shell tools (defaults to the cwd)
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// JSON configuration file; JEEVES_TOOLS_* variables override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Approve every gated call without asking
    #[arg(long, global = true)]
    yolo: bool,

    /// Auto-approve an action label, e.g. "run command" (repeatable)
    #[arg(long = "approve", value_name = "ACTION", global = true)]
    approve: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List registered tools
    List {
        /// Only tools that never need approval
        #[arg(long, conflicts_with = "category")]
        safe: bool,

        /// Only tools in this category (file, shell, web, utility)
        #[arg(long)]
        category: Option<ToolCategory>,
    },
    /// Print the tool prompt section
    Prompt {
        /// Only tools that never need approval
        #[arg(long)]
        safe: bool,
    },
    /// Invoke a tool
    Run {
        /// Registered tool name
        tool: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

async fn prompt_terminal(request: ApprovalRequest) -> CallbackResult {
    let answer = tokio::task::spawn_blocking(move || -> std::io::Result<String> {
        let mut stderr = std::io::stderr().lock();
        writeln!(stderr, "[{}] {}", request.tool_name, request.description)?;
        write!(stderr, "Allow {}? [y/N] ", request.action)?;
        stderr.flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    })
    .await??;

    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    config.apply_lookup(|key| std::env::var(key).ok())?;

    if let Some(dir) = &cli.work_dir {
        config.context.work_dir = Some(dir.clone());
    }
    if cli.yolo {
        config.context.yolo_mode = true;
    }
    config
        .context
        .auto_approved_actions
        .extend(cli.approve.iter().cloned());
    Ok(config)
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    jeeves_tools::observability::init_tracing_with(&config.observability);

    match cli.command {
        Command::List { safe, category } => {
            let tools = match (safe, category) {
                (true, _) => registry::safe_tools(),
                (false, Some(category)) => registry::tools_in(category),
                (false, None) => registry::all_tools(),
            };
            for tool in &tools {
                let gate = if tool.requires_approval() {
                    "approval"
                } else {
                    "-"
                };
                println!("{:<18} {:<8} {}", tool.name(), tool.category().as_str(), gate);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Prompt { safe } => {
            let tools = if safe {
                registry::safe_tools()
            } else {
                registry::all_tools()
            };
            println!("{}", tools.generate_prompt());
            Ok(ExitCode::SUCCESS)
        }
        Command::Run { tool, args } => {
            let args: serde_json::Value = serde_json::from_str(&args)
                .map_err(|e| Error::validation(format!("ARGS_JSON is not valid JSON: {}", e)))?;

            let mut ctx = ToolContext::from_config(&config)?;
            if !ctx.yolo_mode() {
                ctx = ctx.with_approval_callback(approval_fn(prompt_terminal));
            }

            let output = registry::all_tools().invoke(&tool, &ctx, args).await;
            println!("{}", output.to_agent_text(ctx.limits()));
            Ok(match output {
                ToolOutput::Success(_) => ExitCode::SUCCESS,
                ToolOutput::Failure(_) => ExitCode::from(1),
                ToolOutput::Denied(_) => ExitCode::from(2),
            })
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("jeeves-tools: {}", err);
            ExitCode::from(1)
        }
    }
}
