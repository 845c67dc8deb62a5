use std::collections::HashMap;
use std::fmt;
use crate::tool::DynTool;

/// A registry of the tools a service exposes, keyed by tool id.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, DynTool>,
}

impl ToolRegistry {
    /// Creates a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registers a tool, replacing any tool with the same id.
    pub fn register(&mut self, tool: DynTool) {
        let id = tool.id().to_string();
        self.tools.insert(id, tool);
    }

    /// Gets a tool by id.
    pub fn get(&self, id: &str) -> Option<&DynTool> {
        self.tools.get(id)
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Converts all tools to their definitions, ordered by id.
    pub fn to_tool_definitions(&self) -> Vec<crate::tool::ToolDefinition> {
        let mut definitions: Vec<_> = self
            .tools
            .values()
            .map(|tool| tool.to_definition())
            .collect();
        definitions.sort_by(|a, b| a.id.cmp(&b.id));
        definitions
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools_count", &self.tools.len())
            .finish()
    }
}
