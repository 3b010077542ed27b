//! Adapter bridging catalog tools to rig-core tool definitions.
//!
//! The engine executes tools itself (so it can pause for authorization), so
//! rig-core only needs the definitions to put in the completion request.

use rig::completion::ToolDefinition as RigToolDefinition;

use super::{ToolCatalog, ToolSpec};

/// Builds the rig-core definition sent to the LLM for one tool.
pub fn to_rig_definition(tool: &ToolSpec) -> RigToolDefinition {
    RigToolDefinition {
        name: tool.name.clone(),
        description: tool.description.clone(),
        parameters: tool.parameters.clone(),
    }
}

impl ToolCatalog {
    /// Converts all catalog tools into rig-core definitions.
    ///
    /// Returns a fresh `Vec` each call so the result can be moved into a
    /// completion request builder.
    #[cfg(test)]
    pub fn to_rig_definitions(&self) -> Vec<RigToolDefinition> {
        self.iter().map(to_rig_definition).collect()
    }
}
