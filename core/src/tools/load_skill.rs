use crate::skills::{LoadRecordStore, SkillIndex, load_and_record};
use crate::tools::extract_string_arg;
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

pub struct LoadSkillTool {
    index: Arc<SkillIndex>,
    records: Arc<LoadRecordStore>,
}

impl LoadSkillTool {
    pub fn new(index: Arc<SkillIndex>, records: Arc<LoadRecordStore>) -> Self {
        Self { index, records }
    }
}

#[async_trait]
impl Tool for LoadSkillTool {
    fn name(&self) -> &str {
        "load_skill"
    }

    fn description(&self) -> &str {
        "Load a skill's SKILL.md content and the directory it was resolved from"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Skill name (its directory name)"
                }
            },
            "required": ["name"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let name = extract_string_arg(&args, "name")?;

        let loaded = match load_and_record(&self.index, &self.records, &name) {
            Ok(loaded) => loaded,
            Err(e) => return Ok(ToolResult::error(e.to_string())),
        };

        Ok(ToolResult::success(serde_json::to_string_pretty(&loaded)?))
    }
}
