use serde_json::Value;
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallDecision {
    Text(String),
    ToolCall { id: String, name: String, arguments: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolResolution {
    ModelText(String),
    Executed { name: String, result: Value },
    ToolNotFound { requested: String },
    ArgumentsParseError { name: String, raw: String, error: String },
    ExecutionError { name: String, error: String },
}

impl ToolResolution {
    pub fn is_executed(&self) -> bool {
        matches!(self, ToolResolution::Executed { .. })
    }

    /// 次の提案に渡す観測テキスト。失敗もモデルに伝えて立て直させる。
    pub fn observation(&self, available: &[&str]) -> String {
        match self {
            ToolResolution::ModelText(t) => t.clone(),
            ToolResolution::Executed { result, .. } => result.to_string(),
            ToolResolution::ToolNotFound { requested } => format!(
                "Tool '{requested}' does not exist. Available tools: {}.",
                available.join(", ")
            ),
            ToolResolution::ArgumentsParseError { name, error, .. } => format!(
                "Could not parse the arguments for '{name}': {error}. Call it again with a valid JSON object."
            ),
            ToolResolution::ExecutionError { name, error } => format!("Tool '{name}' failed: {error}"),
        }
    }
}

impl Display for ToolCallDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolCallDecision::Text(t) => write!(f, "Text(len={}):\n{}", t.len(), t),
            ToolCallDecision::ToolCall { id, name, arguments } => {
                write!(f, "ToolCall id={} name={} args={} (len={})", id, name, arguments, arguments.len())
            }
        }
    }
}

impl Display for ToolResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolResolution::ModelText(t) => write!(f, "ModelText(len={}):\n{}", t.len(), t),
            ToolResolution::Executed { name, result } => {
                write!(f, "Executed name={} result={} (json)", name, result)
            }
            ToolResolution::ToolNotFound { requested } => write!(f, "ToolNotFound requested={}", requested),
            ToolResolution::ArgumentsParseError { name, raw, error } => {
                write!(f, "ArgumentsParseError name={} error={} raw={}", name, error, raw)
            }
            ToolResolution::ExecutionError { name, error } => {
                write!(f, "ExecutionError name={} error={}", name, error)
            }
        }
    }
}

/// 1ターン分のエージェント実行結果
#[derive(Debug, Clone)]
pub struct AgentAnswer {
    pub final_answer: String,
    pub steps: Vec<ToolResolution>,
    pub iterations: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub enum AgentEvent {
    IterationStart { iteration: usize },
    Proposed { iteration: usize, decision: ToolCallDecision },
    Resolved { iteration: usize, resolution: ToolResolution },
    ProposeFailed { iteration: usize, error: String },
    FinalText { iteration: usize, text: String },
    Truncated { max_loops: usize },
}

impl Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentEvent::IterationStart { iteration } => write!(f, "IterationStart #{}", iteration),
            AgentEvent::Proposed { iteration, decision } => write!(f, "Proposed @{} => {}", iteration, decision),
            AgentEvent::Resolved { iteration, resolution } => write!(f, "Resolved @{} => {}", iteration, resolution),
            AgentEvent::ProposeFailed { iteration, error } => write!(f, "ProposeFailed @{} error={}", iteration, error),
            AgentEvent::FinalText { iteration, text } => write!(f, "FinalText @{} len={}", iteration, text.len()),
            AgentEvent::Truncated { max_loops } => write!(f, "Truncated after {} loops", max_loops),
        }
    }
}
