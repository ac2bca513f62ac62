//! シンプルな単発問い合わせ（ツールなし・履歴なし）

use super::client::LlmClient;
use super::history::ConversationHistory;
use color_eyre::Result;
use tracing::{debug, instrument};

const COMPLETION_SYSTEM_PROMPT: &str = "You are a precise assistant. Follow the instruction exactly.";

/// テキストを入れるとテキストが返る LLM 呼び出し
pub trait Completion: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String>;
}

impl Completion for LlmClient {
    #[instrument(name = "complete", skip(self, prompt), fields(model = %self.model(), prompt_len = prompt.len()))]
    fn complete(&self, prompt: &str) -> Result<String> {
        let mut history = ConversationHistory::new();
        history.add_user(prompt)?;
        let req = self.build_request(history.with_system(COMPLETION_SYSTEM_PROMPT)?, Vec::new())?;
        let message = self.send(req)?;
        let text = message.content.unwrap_or_default();
        debug!(target: "llm", len = text.len(), "completion_text");
        Ok(text)
    }
}
