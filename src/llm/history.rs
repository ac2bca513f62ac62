use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionToolType, FunctionCall,
};
use color_eyre::Result;

/// Simple helper struct to build and reuse a conversation history (excluding the system message).
/// This wraps a `Vec<ChatCompletionRequestMessage>` and provides builder-style helpers.
///
/// Invariant: System message is excluded; the proposer prepends its own system prompt.
/// The order of messages is preserved (push order == send order).
#[derive(Debug, Default, Clone)]
pub struct ConversationHistory {
    messages: Vec<ChatCompletionRequestMessage>,
}

impl ConversationHistory {
    /// Create empty history.
    pub fn new() -> Self {
        Self { messages: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn as_slice(&self) -> &[ChatCompletionRequestMessage] {
        &self.messages
    }

    /// Messages with a leading system prompt, ready to send.
    pub fn with_system(&self, system: &str) -> Result<Vec<ChatCompletionRequestMessage>> {
        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(system)
            .build()?;
        let mut out = Vec::with_capacity(1 + self.messages.len());
        out.push(system.into());
        out.extend_from_slice(&self.messages);
        Ok(out)
    }

    pub fn add_user<S: AsRef<str>>(&mut self, content: S) -> Result<&mut Self> {
        let msg = ChatCompletionRequestUserMessageArgs::default()
            .content(content.as_ref())
            .build()?;
        self.messages.push(msg.into());
        Ok(self)
    }

    /// Add assistant message (text only).
    pub fn add_assistant<S: AsRef<str>>(&mut self, content: S) -> Result<&mut Self> {
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .content(content.as_ref())
            .build()?;
        self.messages.push(msg.into());
        Ok(self)
    }

    /// Record the assistant's tool call so the following tool message has something to answer.
    pub fn add_tool_call(&mut self, id: &str, name: &str, arguments: &str) -> Result<&mut Self> {
        let call = ChatCompletionMessageToolCall {
            id: id.to_string(),
            r#type: ChatCompletionToolType::Function,
            function: FunctionCall { name: name.to_string(), arguments: arguments.to_string() },
        };
        let msg = ChatCompletionRequestAssistantMessageArgs::default()
            .tool_calls(vec![call])
            .build()?;
        self.messages.push(msg.into());
        Ok(self)
    }

    /// Tool output for the call `id`. Raw JSON/string already prepared upstream.
    pub fn add_tool_result<S: AsRef<str>>(&mut self, id: &str, content: S) -> Result<&mut Self> {
        let msg = ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(id)
            .content(content.as_ref())
            .build()?;
        self.messages.push(msg.into());
        Ok(self)
    }
}
