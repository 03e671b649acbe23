//! Static tool descriptors, parameter validation and prompt generation.
//!
//! Descriptors are plain `'static` data: name, category, parameter list and
//! the approval gate. Whether a tool is gated is visible here, never inferred
//! from its implementation.

use crate::approval::ApprovalRequest;
use crate::context::ToolContext;
use crate::types;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

// =============================================================================
// Categories
// =============================================================================

/// Tool category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    File,
    Shell,
    Web,
    Utility,
}

impl ToolCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolCategory::File => "file",
            ToolCategory::Shell => "shell",
            ToolCategory::Web => "web",
            ToolCategory::Utility => "utility",
        }
    }
}

impl std::str::FromStr for ToolCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(ToolCategory::File),
            "shell" => Ok(ToolCategory::Shell),
            "web" => Ok(ToolCategory::Web),
            "utility" => Ok(ToolCategory::Utility),
            other => Err(format!(
                "unknown category '{}', expected one of: file, shell, web, utility",
                other
            )),
        }
    }
}

// =============================================================================
// Parameter types
// =============================================================================

/// Parameter type for tool inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Int,
    Bool,
    StringList,
    Enum(&'static [&'static str]),
    /// Structured JSON checked by the backend itself.
    Json,
}

impl ParamType {
    /// Validate a JSON value against this parameter type.
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            ParamType::String => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err(format!("expected string, got {}", value_type_name(value)))
                }
            }
            ParamType::Int => {
                if value.is_i64() || value.is_u64() {
                    Ok(())
                } else {
                    Err(format!("expected integer, got {}", value_type_name(value)))
                }
            }
            ParamType::Bool => {
                if value.is_boolean() {
                    Ok(())
                } else {
                    Err(format!("expected boolean, got {}", value_type_name(value)))
                }
            }
            ParamType::StringList => {
                if let Some(arr) = value.as_array() {
                    for (i, item) in arr.iter().enumerate() {
                        if !item.is_string() {
                            return Err(format!(
                                "expected string at index {}, got {}",
                                i,
                                value_type_name(item)
                            ));
                        }
                    }
                    Ok(())
                } else {
                    Err(format!("expected array, got {}", value_type_name(value)))
                }
            }
            ParamType::Enum(variants) => {
                if let Some(s) = value.as_str() {
                    if variants.iter().any(|v| *v == s) {
                        Ok(())
                    } else {
                        Err(format!(
                            "invalid enum value '{}', expected one of: {}",
                            s,
                            variants.join(", ")
                        ))
                    }
                } else {
                    Err(format!("expected string for enum, got {}", value_type_name(value)))
                }
            }
            ParamType::Json => Ok(()),
        }
    }

    /// Human-readable type name for prompt generation.
    pub fn display_name(&self) -> String {
        match self {
            ParamType::String => "string".to_string(),
            ParamType::Int => "integer".to_string(),
            ParamType::Bool => "boolean".to_string(),
            ParamType::StringList => "string[]".to_string(),
            ParamType::Enum(variants) => format!("enum({})", variants.join("|")),
            ParamType::Json => "object".to_string(),
        }
    }

    fn json_schema(&self) -> Value {
        match self {
            ParamType::String => json!({"type": "string"}),
            ParamType::Int => json!({"type": "integer"}),
            ParamType::Bool => json!({"type": "boolean"}),
            ParamType::StringList => json!({"type": "array", "items": {"type": "string"}}),
            ParamType::Enum(variants) => json!({"type": "string", "enum": variants}),
            ParamType::Json => json!({}),
        }
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Parameter definition
// =============================================================================

/// A single parameter definition for a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDef {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
    pub required: bool,
}

impl ParamDef {
    pub const fn required(
        name: &'static str,
        param_type: ParamType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            param_type,
            description,
            required: true,
        }
    }

    pub const fn optional(
        name: &'static str,
        param_type: ParamType,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            param_type,
            description,
            required: false,
        }
    }
}

// =============================================================================
// Approval gate
// =============================================================================

/// The concrete action and description one gated call asks approval for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedCall {
    pub action: &'static str,
    pub description: String,
}

/// Builds the [`GatedCall`] for validated arguments.
///
/// Runs against the context, so paths are described as they will be touched.
/// An error rejects the call before any approver is asked.
pub type DescribeFn = fn(&ToolContext, &Value) -> types::Result<GatedCall>;

/// Whether, and how, a tool asks for approval.
#[derive(Debug, Clone, Copy)]
pub enum ApprovalGate {
    Ungated,
    Required {
        /// Action label for the common case. `describe` may report a stricter
        /// one for a particular call.
        action: &'static str,
        describe: DescribeFn,
    },
}

// =============================================================================
// Tool descriptor
// =============================================================================

/// Static metadata for one tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub category: ToolCategory,
    pub parameters: &'static [ParamDef],
    pub gate: ApprovalGate,
}

impl ToolDescriptor {
    pub fn requires_approval(&self) -> bool {
        matches!(self.gate, ApprovalGate::Required { .. })
    }

    /// Build the approval request for a call, `None` for ungated tools.
    pub fn approval_request(
        &self,
        ctx: &ToolContext,
        args: &Value,
    ) -> types::Result<Option<ApprovalRequest>> {
        match self.gate {
            ApprovalGate::Ungated => Ok(None),
            ApprovalGate::Required { describe, .. } => {
                let call = describe(ctx, args)?;
                Ok(Some(ApprovalRequest::new(
                    self.name,
                    call.action,
                    call.description,
                )))
            }
        }
    }

    /// Validate call arguments against the parameter definitions.
    ///
    /// Returns a list of validation errors (empty = valid). `null` is read as
    /// an empty argument object.
    pub fn validate_args(&self, args: &Value) -> Vec<String> {
        let empty = Map::new();
        let param_map = match args {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return vec![format!(
                    "Parameters must be a JSON object, got {}",
                    value_type_name(other)
                )]
            }
        };

        let mut errors = Vec::new();

        for param_def in self.parameters {
            if param_def.required && !param_map.contains_key(param_def.name) {
                errors.push(format!("Missing required parameter: {}", param_def.name));
            }
        }

        let known_names: HashMap<&str, &ParamDef> =
            self.parameters.iter().map(|p| (p.name, p)).collect();

        for (key, value) in param_map {
            if let Some(param_def) = known_names.get(key.as_str()) {
                // Explicit null on an optional parameter means "use the default".
                if value.is_null() && !param_def.required {
                    continue;
                }
                if let Err(e) = param_def.param_type.validate(value) {
                    errors.push(format!("Parameter '{}': {}", key, e));
                }
            } else {
                errors.push(format!("Unknown parameter: {}", key));
            }
        }

        errors
    }

    /// Generate a prompt line for this tool.
    ///
    /// Format: `- name(param1: type, param2?: type): description`
    pub fn to_prompt_line(&self) -> String {
        let params: Vec<String> = self
            .parameters
            .iter()
            .map(|p| {
                let optional = if p.required { "" } else { "?" };
                format!("{}{}: {}", p.name, optional, p.param_type.display_name())
            })
            .collect();

        format!("- {}({}): {}", self.name, params.join(", "), self.description)
    }

    /// OpenAI-style function schema for this tool.
    pub fn function_schema(&self) -> Value {
        let mut properties = Map::new();
        for p in self.parameters {
            let mut schema = p.param_type.json_schema();
            if let Some(obj) = schema.as_object_mut() {
                obj.insert("description".to_string(), json!(p.description));
            }
            properties.insert(p.name.to_string(), schema);
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": {
                    "type": "object",
                    "properties": properties,
                    "required": required,
                },
            },
        })
    }
}

/// Read a string argument, empty when absent.
pub(crate) fn arg_str<'a>(args: &'a Value, key: &str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================
