use clawdiag_core::{CheckKind, CheckResult};

/// Reserved replies meaning "no user-visible reply was intended".
pub const SENTINEL_REPLIES: &[&str] = &["HEARTBEAT_OK", "NO_REPLY"];

/// Check 4: the last reply was not swallowed by a sentinel value.
/// Exact match only.
pub fn check_silence_filter(assistant_text: Option<&str>) -> CheckResult {
    let kind = CheckKind::SilenceFilter;
    match assistant_text {
        None => CheckResult::warn(kind, "no assistant message found in conversation store"),
        Some(text) if SENTINEL_REPLIES.contains(&text) => CheckResult::fail(
            kind,
            format!("last reply was {text}; the reply was suppressed and never reached the user"),
        ),
        Some(text) => CheckResult::pass(kind, format!("last reply: \"{text}\"")),
    }
}
