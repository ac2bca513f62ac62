// Submodule for tool-calling features: types, proposer, resolver, and the agent loop.

pub mod agent;
pub mod proposer;
pub mod resolver;
pub mod types;

pub use agent::{AgentExecutor, DEFAULT_MAX_LOOPS};
pub use proposer::{ToolProposer, AGENT_SYSTEM_PROMPT};
pub use resolver::resolve_and_execute_tool_call;
pub use types::{AgentAnswer, AgentEvent, ToolCallDecision, ToolResolution};
