use clawdiag_core::{
    describe_session_age, AgentReport, CheckKind, CheckResult, ConversationRecord, DiagnosticRun,
    GlobalSignal, SignalState, Verdict,
};

use crate::format_ts;

const STYLE: &str = r#"
:root { --pass: #2e9d5b; --warn: #d09a16; --fail: #d0453b; --muted: #6b7280; --bg: #f6f7f9; }
* { box-sizing: border-box; }
body { font: 14px/1.45 -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; background: var(--bg); color: #1f2328; }
header { padding: 20px 28px 8px; }
h1 { font-size: 20px; margin: 0 0 4px; }
.meta { color: var(--muted); }
main { padding: 0 28px 40px; }
.signals { display: flex; gap: 8px; flex-wrap: wrap; margin: 12px 0; }
.signal { padding: 3px 10px; border-radius: 12px; background: #e5e7eb; }
.signal.healthy { background: #d8f3e2; }
.signal.unhealthy { background: #f9d9d6; }
.counters { display: flex; gap: 12px; margin: 12px 0; }
.counter { padding: 8px 14px; border-radius: 6px; background: #fff; border-left: 4px solid; min-width: 90px; }
.counter b { display: block; font-size: 20px; }
.counter.pass { border-color: var(--pass); }
.counter.warn { border-color: var(--warn); }
.counter.fail { border-color: var(--fail); }
.tabs { margin: 16px 0 10px; }
.tabs button { border: 1px solid #d0d7de; background: #fff; padding: 4px 12px; border-radius: 4px; cursor: pointer; }
.tabs button.active { background: #1f2328; color: #fff; }
details.agent { background: #fff; border-radius: 8px; margin: 10px 0; border-left: 6px solid; }
details.agent.pass { border-color: var(--pass); }
details.agent.warn { border-color: var(--warn); }
details.agent.fail { border-color: var(--fail); }
details.agent > summary { padding: 10px 16px; cursor: pointer; font-weight: 600; }
.badge { font-size: 11px; padding: 1px 8px; border-radius: 10px; color: #fff; margin-left: 8px; text-transform: uppercase; }
.badge.pass { background: var(--pass); }
.badge.warn { background: var(--warn); }
.badge.fail { background: var(--fail); }
.counts { color: var(--muted); font-weight: normal; margin-left: 8px; }
.body { padding: 0 16px 14px; }
.tokens { display: flex; align-items: center; gap: 10px; margin: 4px 0 10px; }
.token-bar { width: 240px; height: 8px; border-radius: 4px; background: #e5e7eb; overflow: hidden; }
.token-fill { height: 100%; }
.token-fill.pass { background: var(--pass); }
.token-fill.warn { background: var(--warn); }
.token-fill.fail { background: var(--fail); }
ol.checks { list-style: none; padding: 0; margin: 0; }
li.check { padding: 6px 0; border-top: 1px solid #eef0f2; }
.icon { display: inline-block; width: 18px; font-weight: 700; }
li.check.pass .icon { color: var(--pass); }
li.check.warn .icon { color: var(--warn); }
li.check.fail .icon { color: var(--fail); }
.title { display: inline-block; min-width: 150px; font-weight: 600; }
.detail { color: #374151; }
ul.causes { margin: 6px 0 0 18px; padding-left: 14px; }
ul.causes code { background: #f3f4f6; padding: 0 4px; border-radius: 3px; }
details.evidence { margin: 6px 0 0 18px; }
details.evidence pre { background: #111827; color: #e5e7eb; padding: 8px; border-radius: 4px; overflow-x: auto; white-space: pre-wrap; }
h3 { font-size: 13px; margin: 14px 0 4px; color: var(--muted); text-transform: uppercase; }
ol.conversations { margin: 0; padding-left: 20px; }
ol.conversations li { padding: 2px 4px; }
ol.conversations li.selected { background: #fff7d6; border-radius: 4px; }
.empty { color: var(--muted); font-style: italic; }
"#;

const SCRIPT: &str = r#"
document.querySelectorAll('.tabs button').forEach(function (btn) {
  btn.addEventListener('click', function () {
    var filter = btn.getAttribute('data-filter');
    document.querySelectorAll('.tabs button').forEach(function (b) { b.classList.toggle('active', b === btn); });
    document.querySelectorAll('details.agent').forEach(function (card) {
      card.style.display = (filter === 'all' || card.getAttribute('data-status') === filter) ? '' : 'none';
    });
  });
});
"#;

/// Escape text for embedding in HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render the run as one self-contained HTML document.
pub fn render_html(run: &DiagnosticRun) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let host = escape_html(&run.hostname);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>OpenClaw diagnostics · {host}</title>\n"));
    out.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));

    out.push_str("<header>\n<h1>OpenClaw agent diagnostics</h1>\n");
    out.push_str(&format!(
        "<div class=\"meta\">Generated {} on {host} · {} agent(s)</div>\n</header>\n<main>\n",
        escape_html(&format_ts(run.timestamp)),
        run.agents.len()
    ));

    out.push_str("<div class=\"signals\">");
    for signal in run.global_signals.iter() {
        out.push_str(&render_signal(signal));
    }
    out.push_str("</div>\n");

    out.push_str("<div class=\"counters\">");
    for (verdict, count) in [
        (Verdict::Pass, run.totals.pass),
        (Verdict::Warn, run.totals.warn),
        (Verdict::Fail, run.totals.fail),
    ] {
        out.push_str(&format!(
            "<div class=\"counter {v}\"><b>{count}</b>{v}</div>",
            v = verdict.as_str()
        ));
    }
    out.push_str("</div>\n");

    out.push_str("<div class=\"tabs\">");
    for (i, filter) in ["all", "fail", "warn", "pass"].iter().enumerate() {
        let active = if i == 0 { " class=\"active\"" } else { "" };
        out.push_str(&format!(
            "<button data-filter=\"{filter}\"{active}>{filter}</button> "
        ));
    }
    out.push_str("</div>\n");

    if run.agents.is_empty() {
        out.push_str("<p class=\"empty\">No agents evaluated.</p>\n");
    }
    for agent in &run.agents {
        out.push_str(&render_agent(agent));
    }

    out.push_str(&format!("</main>\n<script>{SCRIPT}</script>\n</body>\n</html>\n"));
    out
}

fn render_signal(signal: &GlobalSignal) -> String {
    let class = match signal.state {
        SignalState::Healthy => "healthy",
        SignalState::Unhealthy => "unhealthy",
        SignalState::Unknown => "unknown",
    };
    format!(
        "<span class=\"signal {class}\">{}: {}</span>",
        signal.kind.label(),
        escape_html(&signal.display)
    )
}

fn render_agent(agent: &AgentReport) -> String {
    let status = agent.overall_status.as_str();
    let open = if agent.overall_status == Verdict::Fail {
        " open"
    } else {
        ""
    };
    let mut out = format!(
        "<details class=\"agent {status}\" data-status=\"{status}\"{open}>\n\
         <summary>{}<span class=\"badge {status}\">{status}</span>\
         <span class=\"counts\">{} pass · {} warn · {} fail</span></summary>\n<div class=\"body\">\n",
        escape_html(&agent.name),
        agent.pass_count,
        agent.warn_count,
        agent.fail_count
    );

    let level = agent
        .check(CheckKind::Session)
        .map(|c| c.verdict)
        .unwrap_or(Verdict::Pass)
        .as_str();
    out.push_str(&format!(
        "<div class=\"tokens\"><div class=\"token-bar\"><div class=\"token-fill {level}\" style=\"width: {}%\"></div></div>\
         <span>{}% context used · {}</span></div>\n",
        agent.token_usage_percent.min(100),
        agent.token_usage_percent,
        escape_html(&describe_session_age(&agent.session_age))
    ));

    out.push_str("<ol class=\"checks\">\n");
    for check in &agent.checks {
        out.push_str(&render_check(check));
    }
    out.push_str("</ol>\n");

    out.push_str("<h3>Recent conversations</h3>\n");
    out.push_str(&render_conversations(
        &agent.conversation_window,
        agent.selected_conversation_index,
    ));

    out.push_str("</div>\n</details>\n");
    out
}

fn render_check(check: &CheckResult) -> String {
    let verdict = check.verdict.as_str();
    let icon = match check.verdict {
        Verdict::Pass => "&#10003;",
        Verdict::Warn => "!",
        Verdict::Fail => "&#10007;",
    };
    let mut out = format!(
        "<li class=\"check {verdict}\" data-check=\"{}\"><span class=\"icon\">{icon}</span>\
         <span class=\"title\">{}. {}</span> <span class=\"detail\">{}</span>",
        check.kind.id(),
        check.kind.number(),
        check.kind.title(),
        escape_html(&check.detail)
    );

    let explained = matches!(check.kind, CheckKind::CliCompletion | CheckKind::Delivery);
    if explained && check.verdict == Verdict::Fail {
        if !check.causes.is_empty() {
            out.push_str("\n<ul class=\"causes\">");
            for cause in &check.causes {
                out.push_str(&format!(
                    "<li><code>{}</code> {}</li>",
                    escape_html(&cause.tag),
                    escape_html(&cause.explanation)
                ));
            }
            out.push_str("</ul>");
        }
        if let Some(evidence) = &check.evidence {
            out.push_str(&format!(
                "\n<details class=\"evidence\"><summary>Raw log lines ({})</summary><pre>{}</pre></details>",
                evidence.lines().count(),
                escape_html(evidence)
            ));
        }
    }

    out.push_str("</li>\n");
    out
}

fn render_conversations(records: &[ConversationRecord], selected: Option<usize>) -> String {
    if records.is_empty() {
        return "<p class=\"empty\">No conversations found.</p>\n".to_string();
    }
    let mut out = String::from("<ol class=\"conversations\">\n");
    for record in records {
        let class = if Some(record.index) == selected {
            " class=\"selected\""
        } else {
            ""
        };
        out.push_str(&format!(
            "<li{class}><span class=\"meta\">{}</span> · <b>user:</b> {} · <b>assistant:</b> {}</li>\n",
            escape_html(&record.timestamp),
            text_or_dash(record.user_text.as_deref()),
            text_or_dash(record.assistant_text.as_deref()),
        ));
    }
    out.push_str("</ol>\n");
    out
}

fn text_or_dash(text: Option<&str>) -> String {
    match text {
        Some(t) => escape_html(t),
        None => "<span class=\"empty\">none</span>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawdiag_core::{Cause, GlobalSignals};
    use time::macros::datetime;

    fn checks(completion: CheckResult, delivery: CheckResult) -> Vec<CheckResult> {
        vec![
            CheckResult::pass(CheckKind::Session, "active 5m ago"),
            CheckResult::pass(CheckKind::CliActivity, "ok"),
            completion,
            CheckResult::pass(CheckKind::SilenceFilter, "last reply: \"hi\""),
            delivery,
            CheckResult::pass(CheckKind::Connectivity, "Discord: on, Gateway: reachable"),
        ]
    }

    fn run_with(agent_checks: Vec<CheckResult>, window: Vec<ConversationRecord>) -> DiagnosticRun {
        let selected = if window.is_empty() { None } else { Some(2) };
        let agent =
            AgentReport::from_checks("main", "5m", 42, window, selected, agent_checks).unwrap();
        DiagnosticRun::new(
            datetime!(2026-03-01 12:00 UTC),
            "box-1",
            GlobalSignals::default(),
            vec![agent],
        )
    }

    #[test]
    fn escape_covers_markup_chars() {
        assert_eq!(
            escape_html(r#"<a href="x">&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn script_in_log_line_is_escaped() {
        let lines = vec!["cli failed <script>alert(1)</script>".to_string()];
        let completion = CheckResult::fail(CheckKind::CliCompletion, "1 CLI error in log window")
            .with_evidence(&lines);
        let html = render_html(&run_with(
            checks(completion, CheckResult::pass(CheckKind::Delivery, "delivered")),
            Vec::new(),
        ));
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn evidence_and_causes_shown_for_failing_completion() {
        let lines = vec!["claude-cli timeout".to_string()];
        let completion = CheckResult::fail(CheckKind::CliCompletion, "1 CLI error in log window")
            .with_evidence(&lines)
            .with_causes(vec![Cause {
                tag: "timeout".into(),
                explanation: "The CLI call exceeded its time limit.".into(),
            }]);
        let html = render_html(&run_with(
            checks(completion, CheckResult::warn(CheckKind::Delivery, "insufficient data")),
            Vec::new(),
        ));
        assert!(html.contains("<code>timeout</code> The CLI call exceeded its time limit."));
        assert!(html.contains("Raw log lines (1)"));
        assert!(html.contains("details class=\"agent fail\" data-status=\"fail\" open"));
    }

    #[test]
    fn evidence_hidden_for_non_failing_checks() {
        let mut delivery = CheckResult::warn(CheckKind::Delivery, "recovered");
        delivery.evidence = Some("deliver error".into());
        let html = render_html(&run_with(
            checks(CheckResult::pass(CheckKind::CliCompletion, "done"), delivery),
            Vec::new(),
        ));
        assert!(!html.contains("Raw log lines"));
        assert!(html.contains("details class=\"agent warn\" data-status=\"warn\">"));
    }

    #[test]
    fn selected_conversation_highlighted() {
        let window: Vec<ConversationRecord> = (1..=3)
            .map(|index| ConversationRecord {
                index,
                timestamp: format!("2026-03-01 1{index}:00"),
                user_text: Some(format!("question {index}")),
                assistant_text: (index != 3).then(|| format!("answer {index}")),
            })
            .collect();
        let html = render_html(&run_with(
            checks(
                CheckResult::pass(CheckKind::CliCompletion, "done"),
                CheckResult::pass(CheckKind::Delivery, "delivered"),
            ),
            window,
        ));
        assert!(html.contains(
            "<li class=\"selected\"><span class=\"meta\">2026-03-01 12:00</span> · <b>user:</b> question 2"
        ));
        assert_eq!(html.matches("class=\"selected\"").count(), 1);
        assert!(html.contains("<b>assistant:</b> <span class=\"empty\">none</span>"));
    }

    #[test]
    fn document_has_counters_tabs_and_token_bar() {
        let html = render_html(&run_with(
            checks(
                CheckResult::pass(CheckKind::CliCompletion, "done"),
                CheckResult::pass(CheckKind::Delivery, "delivered"),
            ),
            Vec::new(),
        ));
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<div class=\"counter pass\"><b>6</b>pass</div>"));
        assert!(html.contains("<button data-filter=\"fail\">fail</button>"));
        assert!(html.contains("token-fill pass\" style=\"width: 42%\""));
        assert!(html.contains("No conversations found."));
        assert!(html.contains("Discord: unknown"));
    }
}
