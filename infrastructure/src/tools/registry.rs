//! Tool Registry
//!
//! [`ToolRegistry`] maps tool names to [`Tool`] implementations. Local tools
//! and tools bridged from provider processes are registered the same way;
//! the agent loop cannot tell them apart.
//!
//! The registry is shared behind an `Arc` and mutated through `&self`: tools
//! are registered at startup and replaced when a provider restarts, while
//! turns only read.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use zia_domain::{Tool, ToolDefinition};

/// Name → tool mapping. The last registration for a name wins.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its declared name, returning the tool it replaced.
    pub fn register(&self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        let replaced = self
            .tools
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.clone(), tool);
        if replaced.is_some() {
            tracing::warn!(tool = %name, "Replaced previously registered tool");
        } else {
            tracing::debug!(tool = %name, "Registered tool");
        }
        replaced
    }

    /// Convenience wrapper for owned tools
    pub fn register_tool<T: Tool + 'static>(&self, tool: T) -> Option<Arc<dyn Tool>> {
        self.register(Arc::new(tool))
    }

    pub fn unregister(&self, name: &str) -> bool {
        let removed = self
            .tools
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name)
            .is_some();
        if removed {
            tracing::debug!(tool = %name, "Unregistered tool");
        }
        removed
    }

    /// Unregister `tool` only if it is still the instance registered under
    /// its name; a later registration by someone else is left alone.
    pub fn unregister_instance(&self, tool: &Arc<dyn Tool>) -> bool {
        let mut tools = self.tools.write().unwrap_or_else(|e| e.into_inner());
        let current = tools.get(tool.name());
        if current.is_some_and(|t| std::ptr::addr_eq(Arc::as_ptr(t), Arc::as_ptr(tool))) {
            tools.remove(tool.name());
            tracing::debug!(tool = %tool.name(), "Unregistered tool");
            true
        } else {
            false
        }
    }

    pub fn tool(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(name)
    }

    /// Current definitions, recomputed on every call and sorted by name.
    pub fn all_definitions(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> = self
            .tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|t| t.definition().clone())
            .collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use zia_domain::{ToolError, ToolInput};

    struct Fixed {
        definition: ToolDefinition,
        output: &'static str,
    }

    impl Fixed {
        fn new(name: &str, output: &'static str) -> Self {
            Self {
                definition: ToolDefinition::new(name, format!("returns {}", output)),
                output,
            }
        }
    }

    #[async_trait]
    impl Tool for Fixed {
        fn definition(&self) -> &ToolDefinition {
            &self.definition
        }

        async fn execute(&self, _input: &ToolInput) -> Result<String, ToolError> {
            Ok(self.output.to_string())
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register_tool(Fixed::new("alpha", "a")).is_none());

        assert!(registry.contains("alpha"));
        assert_eq!(registry.tool("alpha").unwrap().name(), "alpha");
        assert!(registry.tool("beta").is_none());
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let registry = ToolRegistry::new();
        registry.register_tool(Fixed::new("dup", "first"));
        assert!(registry.register_tool(Fixed::new("dup", "second")).is_some());

        assert_eq!(registry.len(), 1);
        let tool = registry.tool("dup").unwrap();
        assert_eq!(tool.execute(&ToolInput::new()).await.unwrap(), "second");
    }

    #[test]
    fn test_definitions_are_sorted_and_live() {
        let registry = ToolRegistry::new();
        registry.register_tool(Fixed::new("zeta", "z"));
        registry.register_tool(Fixed::new("alpha", "a"));

        let names: Vec<_> = registry
            .all_definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);

        let zeta = registry.tool("zeta").unwrap();
        registry.register_tool(Fixed::new("zeta", "replacement"));
        assert!(!registry.unregister_instance(&zeta));
        assert!(registry.contains("zeta"));

        assert!(registry.unregister("alpha"));
        assert!(!registry.unregister("alpha"));
        assert_eq!(registry.names(), vec!["zeta"]);
    }
}
