//! OpenAI 互換エンドポイントへのクライアント
//!
//! 呼び出し側はすべて同期。内部に Tokio ランタイムを1つ持ち、`async-openai` の
//! 呼び出しを `block_on` で待つ。ワーカースレッド専用で、非同期コンテキストの
//! 中から呼んではいけない。

use crate::config::Config;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionResponseMessage, ChatCompletionTool,
    ChatCompletionToolChoiceOption, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use color_eyre::{eyre::eyre, eyre::WrapErr, Result};
use tokio::runtime::Runtime;
use tracing::{debug, info};

/// トークン制限戦略を表現する列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenLimitStrategy {
    /// `max_tokens` を使用（多くの互換エンドポイント）
    MaxTokens,
    /// `max_completion_tokens` を使用（推論系モデル）
    MaxCompletionTokens,
}

/// モデル名からトークン制限戦略を判定する
pub(crate) fn determine_token_limit_strategy(model: &str) -> TokenLimitStrategy {
    let m = model.to_ascii_lowercase();
    if m.starts_with("gpt-5") || m.starts_with("o1") || m.starts_with("o3") || m.starts_with("o4") {
        TokenLimitStrategy::MaxCompletionTokens
    } else {
        TokenLimitStrategy::MaxTokens
    }
}

pub struct LlmClient {
    client: Client<OpenAIConfig>,
    runtime: Runtime,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmClient {
    pub fn new(config: &Config) -> Result<Self> {
        let key = config
            .effective_llm_key()
            .ok_or_else(|| eyre!("GOOGLE_API_KEY (or PLACES_LLM_API_KEY) not set"))?;
        let api_config = OpenAIConfig::new()
            .with_api_base(config.llm_api_base.trim_end_matches('/'))
            .with_api_key(key);
        let runtime = Runtime::new().wrap_err("building tokio runtime for LLM calls")?;
        info!(target: "llm", model = %config.model, api_base = %config.llm_api_base, "llm_client_ready");
        Ok(Self {
            client: Client::with_config(api_config),
            runtime,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// リクエストを構築する。`tools` が空ならツール指定なし。
    pub(crate) fn build_request(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<CreateChatCompletionRequest> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages).temperature(self.temperature);
        if !tools.is_empty() {
            builder.tools(tools).tool_choice(ChatCompletionToolChoiceOption::Auto);
        }

        let strategy = determine_token_limit_strategy(&self.model);
        debug!(target: "llm", ?strategy, max_tokens = self.max_tokens, "token_limit_strategy");
        match strategy {
            TokenLimitStrategy::MaxTokens => {
                #[allow(deprecated)]
                builder.max_tokens(self.max_tokens);
            }
            TokenLimitStrategy::MaxCompletionTokens => {
                builder.max_completion_tokens(self.max_tokens);
            }
        }
        Ok(builder.build()?)
    }

    /// 1回だけ送信し、先頭の choice のメッセージを返す
    pub(crate) fn send(&self, req: CreateChatCompletionRequest) -> Result<ChatCompletionResponseMessage> {
        let resp = self
            .runtime
            .block_on(self.client.chat().create(req))
            .wrap_err("chat completion request failed")?;
        debug!(target: "llm", choices = resp.choices.len(), "chat_completion_response");
        resp.choices
            .into_iter()
            .next()
            .map(|c| c.message)
            .ok_or_else(|| eyre!("chat completion returned no choices"))
    }
}
