use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skillbox_core::{ToolRegistry, ToolResult};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    tool: String,
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    id: Value,
    result: ToolResult,
}

/// Line-delimited JSON over stdio. Every request runs on its own task and
/// its response is written as soon as it completes.
pub async fn run(registry: Arc<ToolRegistry>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(response) = rx.recv().await {
            let mut line = serde_json::to_string(&response)?;
            line.push('\n');
            stdout.write_all(line.as_bytes()).await?;
            stdout.flush().await?;
        }
        anyhow::Ok(())
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let registry = registry.clone();
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = respond(&registry, &line).await;
            if tx.send(response).is_err() {
                tracing::debug!("response dropped, writer closed");
            }
        });
    }

    drop(tx);
    writer.await??;

    Ok(())
}

async fn respond(registry: &ToolRegistry, line: &str) -> Response {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => {
            tracing::debug!(tool = %request.tool, "request received");
            let result = registry.execute(&request.tool, request.arguments).await;
            Response {
                id: request.id,
                result,
            }
        }
        Err(e) => Response {
            id: Value::Null,
            result: ToolResult::error(format!("Invalid request: {}", e)),
        },
    }
}
