use serde_json::Value;

pub mod execute;
pub mod list_skills;
pub mod load_skill;

pub use execute::ExecuteCommandTool;
pub use list_skills::ListSkillsTool;
pub use load_skill::LoadSkillTool;

pub fn extract_string_arg(args: &Value, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))
        .map(|s| s.to_string())
}
