use crate::traits::{Tool, ToolResult, ToolSpec};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub struct ToolRegistry {
    tools: Mutex<Vec<Arc<dyn Tool>>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Mutex::new(Vec::new()),
        }
    }

    pub fn register(&self, tool: Arc<dyn Tool>) {
        self.lock().push(tool);
    }

    pub fn get_specs(&self) -> Vec<ToolSpec> {
        self.lock().iter().map(|t| t.spec()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().iter().any(|t| t.name() == name)
    }

    /// Dispatch by name. Unknown tools and tool errors become failed results.
    pub async fn execute(&self, name: &str, args: serde_json::Value) -> ToolResult {
        let tool = self.lock().iter().find(|t| t.name() == name).cloned();

        match tool {
            Some(tool) => match tool.execute(args).await {
                Ok(result) => result,
                Err(e) => ToolResult::error(format!("Execution failed: {}", e)),
            },
            None => ToolResult::error(format!("Tool '{}' not found", name)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<dyn Tool>>> {
        self.tools.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
