//! ツール呼び出しを繰り返して最終回答を作るエージェント
//!
//! `AgentExecutor` はワーカースレッドが1つだけ生成して所有する。ターンをまたいで
//! 会話メモリ（ユーザー入力と最終回答）を保持するため `&mut self` で呼ぶ。

use crate::llm::history::ConversationHistory;
use crate::llm::tool::{ToolContext, ToolDefinition};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use super::proposer::ToolProposer;
use super::resolver::resolve_and_execute_tool_call;
use super::types::{AgentAnswer, AgentEvent, ToolCallDecision, ToolResolution};

pub const DEFAULT_MAX_LOOPS: usize = 5;

const NO_ANSWER: &str = "Sorry, I don't have an answer for that. Could you rephrase your question?";

pub struct AgentExecutor {
    proposer: Arc<dyn ToolProposer>,
    tools: Vec<ToolDefinition>,
    memory: ConversationHistory,
    max_loops: usize,
}

impl AgentExecutor {
    pub fn new(proposer: Arc<dyn ToolProposer>, tools: Vec<ToolDefinition>, max_loops: usize) -> Self {
        Self { proposer, tools, memory: ConversationHistory::new(), max_loops: max_loops.max(1) }
    }

    /// これまでのターンの記憶
    pub fn memory(&self) -> &ConversationHistory {
        &self.memory
    }

    pub fn invoke(&mut self, input: &str, ctx: &ToolContext) -> AgentAnswer {
        self.invoke_with_logger(input, ctx, |_| {})
    }

    /// どの失敗経路でも空でない回答を返す
    #[instrument(name = "agent_invoke", skip(self, ctx, logger), fields(memory_len = self.memory.len()))]
    pub fn invoke_with_logger(
        &mut self,
        input: &str,
        ctx: &ToolContext,
        mut logger: impl FnMut(&AgentEvent),
    ) -> AgentAnswer {
        let mut emit = |ev: AgentEvent| {
            debug!(target: "agent", event = %ev, "agent_event");
            logger(&ev);
        };

        let mut steps: Vec<ToolResolution> = Vec::new();
        let mut last_tool_answer: Option<String> = None;
        let mut scratch = self.memory.clone();
        if let Err(e) = scratch.add_user(input) {
            error!(target: "agent", "building user message failed: {e}");
            return self.finish(input, format!("Sorry, I couldn't process that message: {e}"), steps, 0, false);
        }
        let names: Vec<&str> = self.tools.iter().map(|t| t.name).collect();

        for iteration in 1..=self.max_loops {
            emit(AgentEvent::IterationStart { iteration });

            let decision = match self.proposer.propose(scratch.as_slice(), &self.tools) {
                Ok(d) => d,
                Err(e) => {
                    error!(target: "agent", iteration, "propose_tool_call_error: {e:#}");
                    emit(AgentEvent::ProposeFailed { iteration, error: e.to_string() });
                    let answer = last_tool_answer.unwrap_or_else(|| {
                        format!("Sorry, I ran into a problem reaching the language model: {e}")
                    });
                    return self.finish(input, answer, steps, iteration, false);
                }
            };
            emit(AgentEvent::Proposed { iteration, decision: decision.clone() });

            let (id, name, arguments) = match decision {
                ToolCallDecision::Text(text) => {
                    emit(AgentEvent::FinalText { iteration, text: text.clone() });
                    let answer = if text.trim().is_empty() {
                        last_tool_answer.unwrap_or_else(|| NO_ANSWER.to_string())
                    } else {
                        text.trim().to_string()
                    };
                    return self.finish(input, answer, steps, iteration, false);
                }
                ToolCallDecision::ToolCall { id, name, arguments } => (id, name, arguments),
            };

            let resolution = resolve_and_execute_tool_call(
                ToolCallDecision::ToolCall { id: id.clone(), name: name.clone(), arguments: arguments.clone() },
                &self.tools,
                ctx,
            );
            emit(AgentEvent::Resolved { iteration, resolution: resolution.clone() });

            if let ToolResolution::Executed { result, .. } = &resolution {
                if let Some(answer) = result.get("answer").and_then(|v| v.as_str()) {
                    last_tool_answer = Some(answer.to_string());
                }
            } else {
                warn!(target: "agent", iteration, resolution = %resolution, "tool call not executed; feeding error back");
            }

            let observation = resolution.observation(&names);
            steps.push(resolution);
            let appended = scratch
                .add_tool_call(&id, &name, &arguments)
                .and_then(|h| h.add_tool_result(&id, &observation));
            if let Err(e) = appended {
                error!(target: "agent", "appending tool messages failed: {e}");
                let answer = last_tool_answer.unwrap_or_else(|| NO_ANSWER.to_string());
                return self.finish(input, answer, steps, iteration, false);
            }
        }

        emit(AgentEvent::Truncated { max_loops: self.max_loops });
        let answer = last_tool_answer.unwrap_or_else(|| {
            "Sorry, I couldn't finish answering that. Please try rephrasing your question.".to_string()
        });
        let iterations = self.max_loops;
        self.finish(input, answer, steps, iterations, true)
    }

    fn finish(
        &mut self,
        input: &str,
        final_answer: String,
        steps: Vec<ToolResolution>,
        iterations: usize,
        truncated: bool,
    ) -> AgentAnswer {
        if let Err(e) = self.memory.add_user(input).and_then(|m| m.add_assistant(&final_answer)) {
            warn!(target: "agent", "saving turn to memory failed: {e}");
        }
        info!(target: "agent", iterations, truncated, steps = steps.len(), final_len = final_answer.len(), "agent_done");
        AgentAnswer { final_answer, steps, iterations, truncated }
    }
}
