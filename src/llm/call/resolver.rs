use serde_json::Value;

use crate::llm::tool::{ToolContext, ToolDefinition};

use super::types::{ToolCallDecision, ToolResolution};

/// Resolve and (if needed) execute the proposed tool call against known tools.
pub fn resolve_and_execute_tool_call(
    decision: ToolCallDecision,
    tools: &[ToolDefinition],
    ctx: &ToolContext,
) -> ToolResolution {
    match decision {
        ToolCallDecision::Text(t) => ToolResolution::ModelText(t),
        ToolCallDecision::ToolCall { name, arguments, .. } => {
            let tool = match tools.iter().find(|d| d.name == name) {
                Some(t) => t,
                None => return ToolResolution::ToolNotFound { requested: name },
            };
            // 引数なしの呼び出しは空オブジェクト扱い
            let raw = if arguments.trim().is_empty() { "{}" } else { arguments.as_str() };
            let parsed: Value = match serde_json::from_str(raw) {
                Ok(v) => v,
                Err(e) => {
                    return ToolResolution::ArgumentsParseError {
                        name: tool.name.to_string(),
                        raw: arguments,
                        error: e.to_string(),
                    };
                }
            };
            match tool.execute(&parsed, ctx) {
                Ok(v) => ToolResolution::Executed { name: tool.name.to_string(), result: v },
                Err(e) => ToolResolution::ExecutionError { name: tool.name.to_string(), error: e.to_string() },
            }
        }
    }
}
