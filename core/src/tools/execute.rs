use crate::exec::{CommandExecutor, CommandOutcome, ExitState};
use crate::tools::extract_string_arg;
use crate::traits::{Tool, ToolResult};
use async_trait::async_trait;
use serde_json::json;

pub struct ExecuteCommandTool {
    executor: CommandExecutor,
}

impl ExecuteCommandTool {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Execute a shell command and return its output"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "Shell command to execute"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: serde_json::Value) -> anyhow::Result<ToolResult> {
        let command = extract_string_arg(&args, "command")?;
        let outcome = self.executor.execute(&command).await;
        Ok(self.to_result(&outcome))
    }
}

impl ExecuteCommandTool {
    fn to_result(&self, outcome: &CommandOutcome) -> ToolResult {
        match &outcome.status {
            ExitState::Exited { code: 0 } => ToolResult::success(outcome.stdout_or_placeholder()),
            ExitState::Exited { code } => ToolResult::error_with_output(
                format!("Command exited with code {}", code),
                streams(outcome),
            ),
            ExitState::TimedOut => ToolResult::error_with_output(
                format!(
                    "Command timed out after {}s",
                    self.executor.timeout().as_secs()
                ),
                streams(outcome),
            ),
            ExitState::SpawnFailed { message } => {
                ToolResult::error(format!("Failed to execute command: {}", message))
            }
        }
    }
}

fn streams(outcome: &CommandOutcome) -> String {
    let mut out = String::new();
    if !outcome.stdout.is_empty() {
        out.push_str("stdout:\n");
        out.push_str(&outcome.stdout);
    }
    if !outcome.stderr.is_empty() {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str("stderr:\n");
        out.push_str(&outcome.stderr);
    }
    out
}
