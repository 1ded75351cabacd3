use clawdiag_core::{CheckResult, DiagnosticRun, Verdict};

use crate::format_ts;

fn icon(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Pass => "\u{2713}", // ✓
        Verdict::Warn => "!",
        Verdict::Fail => "\u{2717}", // ✗
    }
}

/// Plain-text summary for stdout.
pub fn render_terminal(run: &DiagnosticRun) -> String {
    let mut out = format!(
        "OpenClaw diagnostics · {} · {}\n",
        run.hostname,
        format_ts(run.timestamp)
    );
    let signals: Vec<String> = run
        .global_signals
        .iter()
        .map(|s| format!("{}: {}", s.kind.label(), s.display))
        .collect();
    out.push_str(&signals.join(" · "));
    out.push('\n');

    for agent in &run.agents {
        out.push_str(&format!(
            "\n{} [{}]  {} pass / {} warn / {} fail\n",
            agent.name,
            agent.overall_status.as_str().to_uppercase(),
            agent.pass_count,
            agent.warn_count,
            agent.fail_count
        ));
        for check in &agent.checks {
            out.push_str(&check_line(check));
        }
        if let Some(i) = agent.selected_conversation_index {
            out.push_str(&format!(
                "  conversation #{i} of {}\n",
                agent.conversation_window.len()
            ));
        }
    }

    out.push_str(&format!(
        "\nTotals: {} pass, {} warn, {} fail\n",
        run.totals.pass, run.totals.warn, run.totals.fail
    ));
    out
}

fn check_line(check: &CheckResult) -> String {
    let mut line = format!(
        "  {} {}. {:<18} {}\n",
        icon(check.verdict),
        check.kind.number(),
        check.kind.title(),
        check.detail
    );
    for cause in &check.causes {
        line.push_str(&format!("       - {}: {}\n", cause.tag, cause.explanation));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawdiag_core::{AgentReport, Cause, CheckKind, GlobalSignals};
    use time::macros::datetime;

    fn run() -> DiagnosticRun {
        let mut checks: Vec<CheckResult> = CheckKind::ALL
            .iter()
            .map(|k| CheckResult::pass(*k, "fine"))
            .collect();
        checks[2] = CheckResult::fail(CheckKind::CliCompletion, "1 CLI error in log window")
            .with_causes(vec![Cause {
                tag: "broken-pipe".into(),
                explanation: "pipe closed".into(),
            }]);
        let agent = AgentReport::from_checks("main", "5m", 10, Vec::new(), None, checks).unwrap();
        DiagnosticRun::new(
            datetime!(2026-03-01 12:00 UTC),
            "box-1",
            GlobalSignals::default(),
            vec![agent],
        )
    }

    #[test]
    fn summary_lists_checks_and_totals() {
        let text = render_terminal(&run());
        assert!(text.starts_with("OpenClaw diagnostics · box-1 · 2026-03-01T12:00:00Z\n"));
        assert!(text.contains("Discord: unknown · Gateway: unknown · Serialize: unknown"));
        assert!(text.contains("main [FAIL]  5 pass / 0 warn / 1 fail"));
        assert!(text.contains("  \u{2717} 3. CLI completion     1 CLI error in log window"));
        assert!(text.contains("       - broken-pipe: pipe closed"));
        assert!(text.ends_with("Totals: 5 pass, 0 warn, 1 fail\n"));
    }

    #[test]
    fn each_agent_has_six_check_lines() {
        let text = render_terminal(&run());
        let check_lines = text
            .lines()
            .filter(|l| l.starts_with("  \u{2713} ") || l.starts_with("  \u{2717} ") || l.starts_with("  ! "))
            .count();
        assert_eq!(check_lines, 6);
    }
}
