//! Ordered, name-indexed tool collections handed to an agent runtime.

use crate::context::ToolContext;
use crate::tools::gate::Tool;
use crate::tools::output::{FailureKind, ToolFailure, ToolOutput};
use serde_json::Value;

/// An ordered set of tools. Order is preserved from construction.
#[derive(Debug, Clone, Default)]
pub struct ToolSet {
    tools: Vec<Tool>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Append a tool, replacing any earlier tool with the same name in place.
    pub fn push(&mut self, tool: Tool) {
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => *slot = tool,
            None => self.tools.push(tool),
        }
    }

    /// Append every tool of `other` that is not already present.
    pub fn merge(mut self, other: ToolSet) -> Self {
        for tool in other.tools {
            if !self.has_tool(tool.name()) {
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(Tool::name).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tool> {
        self.tools.iter()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invoke a tool by name. Unknown names are a `NotFound` failure.
    pub async fn invoke(&self, name: &str, ctx: &ToolContext, args: Value) -> ToolOutput {
        match self.get(name) {
            Some(tool) => tool.invoke(ctx, args).await,
            None => {
                tracing::debug!(tool = name, "unknown tool requested");
                ToolOutput::Failure(ToolFailure::new(
                    FailureKind::NotFound,
                    format!("Unknown tool: {}", name),
                ))
            }
        }
    }

    /// Generate formatted prompt section for LLM consumption.
    pub fn generate_prompt(&self) -> String {
        if self.tools.is_empty() {
            return String::new();
        }

        let mut lines = Vec::with_capacity(self.tools.len() + 1);
        lines.push("Available tools:".to_string());
        for tool in &self.tools {
            lines.push(tool.descriptor().to_prompt_line());
        }
        lines.join("\n")
    }

    /// Function-calling schemas, one per tool, in order.
    pub fn function_schemas(&self) -> Vec<Value> {
        self.tools
            .iter()
            .map(|t| t.descriptor().function_schema())
            .collect()
    }
}

impl FromIterator<Tool> for ToolSet {
    fn from_iter<I: IntoIterator<Item = Tool>>(iter: I) -> Self {
        let mut set = ToolSet::new();
        for tool in iter {
            set.push(tool);
        }
        set
    }
}

impl IntoIterator for ToolSet {
    type Item = Tool;
    type IntoIter = std::vec::IntoIter<Tool>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.into_iter()
    }
}

impl<'a> IntoIterator for &'a ToolSet {
    type Item = &'a Tool;
    type IntoIter = std::slice::Iter<'a, Tool>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::{safe_tools, shell_tools, web_tools};

    #[test]
    fn test_merge_keeps_order_and_dedups() {
        let set = web_tools().merge(shell_tools()).merge(web_tools());
        assert_eq!(set.names(), vec!["search_web", "fetch_url", "shell"]);
    }

    #[test]
    fn test_generate_prompt() {
        let prompt = web_tools().generate_prompt();
        assert!(prompt.starts_with("Available tools:\n"));
        assert!(prompt.contains("- fetch_url(url: string): Fetch a web page"));
        assert!(ToolSet::new().generate_prompt().is_empty());
    }

    #[test]
    fn test_function_schemas_follow_order() {
        let schemas = safe_tools().function_schemas();
        assert_eq!(schemas.len(), safe_tools().len());
        assert_eq!(schemas[0]["function"]["name"], "read_file");
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ToolContext::new(dir.path()).unwrap();

        let out = safe_tools()
            .invoke("shell", &ctx, serde_json::json!({"command": "ls"}))
            .await;
        let failure = out.failure().unwrap();
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.message, "Unknown tool: shell");
    }
}
