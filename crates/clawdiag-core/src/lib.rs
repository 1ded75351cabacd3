pub mod report;
pub mod types;

pub use report::{AgentReport, DiagnosticRun, ModelError, Totals};
pub use types::*;
