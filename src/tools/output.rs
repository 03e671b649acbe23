//! Tool outcomes and their rendering for the agent.
//!
//! Every invocation ends in exactly one of three shapes: success, structured
//! failure, or approval denial. Callers branch on the variant, never on text.

use crate::approval::DenialReason;
use crate::types::{Error, ToolLimits};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Category of a structured failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Configuration,
    InvalidArguments,
    NotFound,
    PermissionDenied,
    Io,
    CommandFailed,
    Timeout,
    Network,
    Internal,
}

/// Successful tool payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSuccess {
    /// Main text shown to the agent.
    pub output: String,
    /// Short explanatory note appended after the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Tool-specific structured payload (exit code, matched paths, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolSuccess {
    pub fn new(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            message: None,
            data: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Structured failure: the backend ran (or could not start) and failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Partial output produced before the failure, e.g. a failing command's stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            output: None,
        }
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

impl From<Error> for ToolFailure {
    fn from(err: Error) -> Self {
        let kind = err.failure_kind();
        let message = match err {
            Error::Config(msg)
            | Error::Validation(msg)
            | Error::NotFound(msg)
            | Error::PermissionDenied(msg)
            | Error::CommandFailed(msg)
            | Error::Timeout(msg)
            | Error::Network(msg)
            | Error::Internal(msg) => msg,
            other => other.to_string(),
        };
        Self::new(kind, message)
    }
}

/// A gated call the resolver refused. Not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Denial {
    pub reason: DenialReason,
}

/// Result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutput {
    Success(ToolSuccess),
    Failure(ToolFailure),
    Denied(Denial),
}

impl ToolOutput {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutput::Success(_))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, ToolOutput::Denied(_))
    }

    pub fn success(&self) -> Option<&ToolSuccess> {
        match self {
            ToolOutput::Success(s) => Some(s),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ToolFailure> {
        match self {
            ToolOutput::Failure(f) => Some(f),
            _ => None,
        }
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            ToolOutput::Denied(d) => Some(d),
            _ => None,
        }
    }

    /// Render the outcome as the text handed back to the model.
    pub fn to_agent_text(&self, limits: &ToolLimits) -> String {
        match self {
            ToolOutput::Success(s) => {
                let (output, truncated) = truncate_output(
                    &s.output,
                    limits.max_output_chars,
                    Some(limits.max_line_length),
                );
                let message = match (&s.message, truncated) {
                    (Some(m), true) => format!("{m} Output is truncated to fit in the message."),
                    (Some(m), false) => m.clone(),
                    (None, true) => "Output is truncated to fit in the message.".to_string(),
                    (None, false) => String::new(),
                };
                format_success(&output, &message)
            }
            ToolOutput::Failure(f) => {
                let error = format_error(&f.message);
                match f.output.as_deref().filter(|o| !o.is_empty()) {
                    Some(output) => {
                        let (output, _) = truncate_output(
                            output,
                            limits.max_output_chars,
                            Some(limits.max_line_length),
                        );
                        format!("{output}\n\n{error}")
                    }
                    None => error,
                }
            }
            ToolOutput::Denied(d) => format_rejection(d.reason),
        }
    }
}

/// Format a successful tool result.
pub fn format_success(output: &str, message: &str) -> String {
    match (output.is_empty(), message.is_empty()) {
        (true, true) => "Operation completed successfully.".to_string(),
        (false, true) => output.to_string(),
        (true, false) => message.to_string(),
        (false, false) => format!("{output}\n\n[{message}]"),
    }
}

/// Format an error message.
pub fn format_error(message: &str) -> String {
    format!("Error: {message}")
}

/// Format the text returned when approval is denied.
pub fn format_rejection(reason: DenialReason) -> String {
    format!(
        "Error: The tool call is rejected ({reason}). \
         Please follow the new instructions from the user."
    )
}

/// Truncate output to fit within limits.
///
/// Lines longer than `max_line_length` are cut and end in `...`; once the
/// running total reaches `max_chars` the rest is dropped. When anything was
/// cut, `[...truncated]` is appended on its own line. Counts are in chars.
pub fn truncate_output(
    output: &str,
    max_chars: usize,
    max_line_length: Option<usize>,
) -> (String, bool) {
    if output.is_empty() {
        return (String::new(), false);
    }

    let has_newline = output.contains('\n');
    let mut truncated = false;
    let mut result = String::new();
    let mut total = 0usize;

    for raw in output.split_inclusive('\n') {
        if total >= max_chars {
            truncated = true;
            break;
        }

        let mut line = Cow::Borrowed(raw);
        if let Some(limit) = max_line_length {
            if line.chars().count() > limit {
                let mut cut = take_chars(&line, limit.saturating_sub(3));
                cut.push_str("...");
                if has_newline && !cut.ends_with('\n') {
                    cut.push('\n');
                }
                line = Cow::Owned(cut);
                truncated = true;
            }
        }

        let len = line.chars().count();
        if total + len > max_chars {
            let remaining = max_chars - total;
            truncated = true;
            if remaining <= 3 {
                break;
            }
            let mut cut = take_chars(&line, remaining - 3);
            cut.push_str("...");
            line = Cow::Owned(cut);
        }

        total += line.chars().count();
        result.push_str(&line);
    }

    if truncated {
        if !result.ends_with('\n') {
            result.push('\n');
        }
        result.push_str("[...truncated]");
    }

    (result, truncated)
}

fn take_chars(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_success_variants() {
        assert_eq!(format_success("", ""), "Operation completed successfully.");
        assert_eq!(format_success("out", ""), "out");
        assert_eq!(format_success("", "msg"), "msg");
        assert_eq!(format_success("out", "msg"), "out\n\n[msg]");
    }

    #[test]
    fn test_format_error_and_rejection() {
        assert_eq!(format_error("boom"), "Error: boom");
        assert_eq!(
            format_rejection(DenialReason::NoApprovalMechanism),
            "Error: The tool call is rejected (no approval mechanism configured). \
             Please follow the new instructions from the user."
        );
    }

    #[test]
    fn test_truncate_untouched() {
        assert_eq!(truncate_output("", 10, Some(5)), (String::new(), false));
        assert_eq!(
            truncate_output("a\nb\n", 100, Some(100)),
            ("a\nb\n".to_string(), false)
        );
    }

    #[test]
    fn test_truncate_long_line() {
        let (out, truncated) = truncate_output("short\nabcdefghijkl\nend\n", 1000, Some(8));
        assert!(truncated);
        assert_eq!(out, "short\nabcde...\nend\n[...truncated]");
    }

    #[test]
    fn test_truncate_total() {
        let (out, truncated) = truncate_output("0123456789ABCDEF", 10, None);
        assert!(truncated);
        assert_eq!(out, "0123456...\n[...truncated]");
    }

    #[test]
    fn test_truncate_drops_remaining_lines() {
        let (out, truncated) = truncate_output("aaaa\nbbbb\ncccc\n", 10, None);
        assert!(truncated);
        assert_eq!(out, "aaaa\nbbbb\n[...truncated]");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let (out, truncated) = truncate_output("ééééé", 5, None);
        assert!(!truncated);
        assert_eq!(out, "ééééé");
    }

    #[test]
    fn test_failure_from_error_keeps_message() {
        let failure = ToolFailure::from(Error::config("fetch service is not configured"));
        assert_eq!(failure.kind, FailureKind::Configuration);
        assert_eq!(failure.message, "fetch service is not configured");
    }

    #[test]
    fn test_agent_text_for_each_shape() {
        let limits = ToolLimits::default();

        let ok = ToolOutput::Success(ToolSuccess::new("hello").with_message("1 line read"));
        assert_eq!(ok.to_agent_text(&limits), "hello\n\n[1 line read]");

        let failed = ToolOutput::Failure(
            ToolFailure::new(FailureKind::CommandFailed, "Command failed with exit code 2")
                .with_output("oops"),
        );
        assert_eq!(
            failed.to_agent_text(&limits),
            "oops\n\nError: Command failed with exit code 2"
        );

        let denied = ToolOutput::Denied(Denial {
            reason: DenialReason::RejectedByCallback,
        });
        assert!(denied
            .to_agent_text(&limits)
            .contains("rejected by approval callback"));
    }

    #[test]
    fn test_output_shapes_are_tagged() {
        let denied = ToolOutput::Denied(Denial {
            reason: DenialReason::NoApprovalMechanism,
        });
        let value = serde_json::to_value(&denied).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"status": "denied", "reason": "no_approval_mechanism"})
        );
    }
}
