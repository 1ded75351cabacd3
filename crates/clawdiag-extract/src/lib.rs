mod causes;
mod conversation;
mod logs;
mod session_store;
mod status;

pub use causes::{classify_error_causes, matches_cause, CauseRule, CAUSE_RULES, CONNECTION_RESET};
pub use conversation::{
    extract_last_conversation_texts, truncate_chars, ConversationLimits, ConversationWindow,
};
pub use logs::{
    bound_tail, extract_cli_errors, extract_delivery_errors, extract_last_cli_call,
    extract_run_completion, has_idle_run_completed, CliCall, RunCompletion, MAX_ERROR_LINES,
};
pub use session_store::read_system_sent;
pub use status::{
    discover_agents, extract_global_signals, extract_session_line, extract_token_usage,
    TokenUsage,
};

use regex::Regex;

/// Compile a pattern that is known to be valid at build time.
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}
