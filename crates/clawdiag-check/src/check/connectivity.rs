use clawdiag_core::{CheckKind, CheckResult, GlobalSignals};

/// Check 6: Discord and the gateway are both healthy. Same result for every agent.
pub fn check_connectivity(signals: &GlobalSignals) -> CheckResult {
    let detail = format!(
        "Discord: {}, Gateway: {}",
        signals.discord.display, signals.gateway.display
    );
    if signals.connectivity_ok() {
        CheckResult::pass(CheckKind::Connectivity, detail)
    } else {
        CheckResult::fail(CheckKind::Connectivity, detail)
    }
}
