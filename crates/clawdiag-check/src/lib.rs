pub mod check;
pub mod engine;

pub use check::Thresholds;
pub use engine::{evaluate_agent, AgentInput, SharedFacts};
