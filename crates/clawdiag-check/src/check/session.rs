use clawdiag_core::{describe_session_age, CheckKind, CheckResult};
use clawdiag_extract::TokenUsage;

use super::{fmt_k, Thresholds};

/// Check 1: an active session exists and its context window is not exhausted.
pub fn check_session(
    session_line: Option<&str>,
    usage: &TokenUsage,
    thresholds: &Thresholds,
) -> CheckResult {
    let kind = CheckKind::Session;
    if session_line.is_none() {
        return CheckResult::fail(kind, "no session found in status output");
    }

    let tokens = format!(
        "{}/{} ({}%)",
        fmt_k(usage.used_k),
        fmt_k(usage.total_k),
        usage.percent
    );
    if usage.percent >= thresholds.fail_percent {
        CheckResult::fail(
            kind,
            format!(
                "token usage {tokens} at or above {}%; compact or reset the session",
                thresholds.fail_percent
            ),
        )
    } else if usage.percent >= thresholds.warn_percent {
        CheckResult::warn(
            kind,
            format!("token usage {tokens} nearing the limit (warn at {}%)", thresholds.warn_percent),
        )
    } else {
        CheckResult::pass(kind, format!("{}, tokens {tokens}", describe_session_age(&usage.age)))
    }
}
