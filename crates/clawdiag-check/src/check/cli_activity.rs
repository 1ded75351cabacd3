use clawdiag_core::{CheckKind, CheckResult};
use clawdiag_extract::CliCall;

/// Check 2: some agent issued a `cli exec` inside the shared log window.
pub fn check_cli_activity(call: Option<&CliCall>) -> CheckResult {
    let kind = CheckKind::CliActivity;
    let Some(call) = call.filter(|c| !c.line.is_empty()) else {
        return CheckResult::fail(kind, "no `cli exec` line in log window");
    };

    let detail = match (&call.timestamp, call.minutes_ago) {
        (Some(ts), Some(mins)) => format!("last cli exec at {ts} ({mins} min ago)"),
        (Some(ts), None) => format!("last cli exec at {ts}"),
        (None, _) => "cli exec found (no timestamp)".to_string(),
    };
    CheckResult::pass(kind, detail)
}
