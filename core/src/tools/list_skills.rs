use crate::skills::SkillIndex;
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct ListSkillsTool {
    index: Arc<SkillIndex>,
}

impl ListSkillsTool {
    pub fn new(index: Arc<SkillIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for ListSkillsTool {
    fn name(&self) -> &str {
        "list_skills"
    }

    fn description(&self) -> &str {
        "List installed skills with their descriptions and locations"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, _args: serde_json::Value) -> anyhow::Result<ToolResult> {
        match self.index.catalog() {
            Ok(catalog) => Ok(ToolResult::success(serde_json::to_string_pretty(&catalog)?)),
            Err(e) => Ok(ToolResult::error(format!("Failed to list skills: {}", e))),
        }
    }
}
