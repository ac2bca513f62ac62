use crate::llm::client::LlmClient;
use crate::llm::tool::ToolDefinition;
use async_openai::types::{ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs};
use color_eyre::Result;
use tracing::{debug, info, instrument};

use super::types::ToolCallDecision;

pub const AGENT_SYSTEM_PROMPT: &str = "You are a friendly assistant that helps people find nearby places such as \
restaurants, cafes and shops. When the user asks about places, call the places_search tool with their request \
as the query, keeping any city or area they named. Answer other questions directly. Base answers about places \
only on the tool output and keep its bulleted list.";

/// 次に何をするか（ツール呼び出し or 直接回答）を決める。差し替え可能な判断器。
pub trait ToolProposer: Send + Sync {
    fn propose(&self, history: &[ChatCompletionRequestMessage], tools: &[ToolDefinition]) -> Result<ToolCallDecision>;
}

impl ToolProposer for LlmClient {
    #[instrument(name = "propose_tool_call", skip(self, history, tools), fields(history_len = history.len()))]
    fn propose(&self, history: &[ChatCompletionRequestMessage], tools: &[ToolDefinition]) -> Result<ToolCallDecision> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(1 + history.len());
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(AGENT_SYSTEM_PROMPT)
            .build()?;
        messages.push(system.into());
        messages.extend_from_slice(history);

        let tools_for_api: Vec<_> = tools.iter().map(|t| t.as_chat_tool()).collect();
        let req = self.build_request(messages, tools_for_api)?;

        info!(target: "agent", model = %self.model(), tools = tools.len(), "propose_tool_call_request");
        let message = self.send(req)?;

        if let Some(first) = message.tool_calls.as_ref().and_then(|calls| calls.first()) {
            debug!(target: "agent", tool = %first.function.name, "tool_call_proposed");
            return Ok(ToolCallDecision::ToolCall {
                id: first.id.clone(),
                name: first.function.name.clone(),
                arguments: first.function.arguments.clone(),
            });
        }

        Ok(ToolCallDecision::Text(message.content.unwrap_or_default()))
    }
}
