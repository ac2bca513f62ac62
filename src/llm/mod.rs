//! LLM 連携: OpenAI 互換クライアント、単発補完、ツール定義、エージェントループ

pub mod call;
pub mod client;
pub mod history;
pub mod simple;
pub mod tool;

pub use call::{
    resolve_and_execute_tool_call, AgentAnswer, AgentEvent, AgentExecutor, ToolCallDecision,
    ToolProposer, ToolResolution,
};
pub use client::LlmClient;
pub use history::ConversationHistory;
pub use simple::Completion;
pub use tool::{ProgressSink, ToolContext, ToolDefinition, ToolHandler, ToolParameters, ToolParametersBuilder};
