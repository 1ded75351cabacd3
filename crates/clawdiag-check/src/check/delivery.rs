use clawdiag_core::{CheckKind, CheckResult};
use clawdiag_extract::{classify_error_causes, matches_cause, CONNECTION_RESET};

use super::plural;

/// Check 5: replies reach the chat surface.
///
/// Positive signals are an idle transition after `run_completed` and a
/// persisted `systemSent=true`. Errors that all look like network resets
/// are not blamed on the agent.
pub fn check_delivery(errors: &[String], idle_run_completed: bool, system_sent: bool) -> CheckResult {
    let kind = CheckKind::Delivery;

    let mut positives: Vec<&str> = Vec::new();
    if system_sent {
        positives.push("systemSent=true");
    }
    if idle_run_completed {
        positives.push("session idle after run_completed");
    }

    if errors.is_empty() {
        return if positives.is_empty() {
            CheckResult::warn(kind, "no delivery signal in log window (insufficient data)")
        } else {
            CheckResult::pass(kind, format!("delivered: {}", positives.join(", ")))
        };
    }

    let count = plural(errors.len(), "delivery error");
    if !positives.is_empty() {
        return CheckResult::warn(
            kind,
            format!("{count}, recovered: {}", positives.join(", ")),
        );
    }
    if errors.iter().all(|e| matches_cause(e, CONNECTION_RESET)) {
        return CheckResult::warn(
            kind,
            format!("{count}, all network resets (socket hang up), not agent-attributed"),
        );
    }
    CheckResult::fail(kind, format!("{count} and no successful delivery"))
        .with_evidence(errors)
        .with_causes(classify_error_causes(&errors.join("\n")))
}
