use clawdiag_core::{AgentReport, GlobalSignals, ModelError};
use clawdiag_extract::{
    extract_cli_errors, extract_delivery_errors, extract_global_signals, extract_last_cli_call,
    extract_run_completion, extract_session_line, extract_token_usage, has_idle_run_completed,
    CliCall, ConversationWindow, RunCompletion, TokenUsage,
};
use time::OffsetDateTime;

use crate::check::{
    cli_activity::check_cli_activity, cli_completion::check_cli_completion,
    connectivity::check_connectivity, delivery::check_delivery, session::check_session,
    silence::check_silence_filter, Thresholds,
};

/// Facts read once per run from the shared status and log text.
#[derive(Debug, Clone, PartialEq)]
pub struct SharedFacts {
    pub signals: GlobalSignals,
    pub last_cli_call: Option<CliCall>,
    pub run_completion: RunCompletion,
    pub cli_errors: Vec<String>,
    pub delivery_errors: Vec<String>,
    pub idle_run_completed: bool,
}

impl SharedFacts {
    pub fn extract(status: &str, logs: &str, now: OffsetDateTime) -> Self {
        Self {
            signals: extract_global_signals(status),
            last_cli_call: extract_last_cli_call(logs, now),
            run_completion: extract_run_completion(logs),
            cli_errors: extract_cli_errors(logs),
            delivery_errors: extract_delivery_errors(logs),
            idle_run_completed: has_idle_run_completed(logs),
        }
    }
}

/// Facts specific to one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentInput {
    pub name: String,
    pub session_line: Option<String>,
    pub usage: TokenUsage,
    pub conversations: ConversationWindow,
    pub system_sent: bool,
}

impl AgentInput {
    /// Pull the agent's session line and token usage out of the status text.
    pub fn extract(
        name: &str,
        status: &str,
        conversations: ConversationWindow,
        system_sent: bool,
    ) -> Self {
        let session_line = extract_session_line(status, name).map(str::to_string);
        let usage = session_line
            .as_deref()
            .map(extract_token_usage)
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            session_line,
            usage,
            conversations,
            system_sent,
        }
    }
}

/// Run all six checks for one agent and fold them into its report.
///
/// Missing data never errors; every check has a fallback verdict.
pub fn evaluate_agent(
    input: &AgentInput,
    shared: &SharedFacts,
    thresholds: &Thresholds,
) -> Result<AgentReport, ModelError> {
    let checks = vec![
        check_session(input.session_line.as_deref(), &input.usage, thresholds),
        check_cli_activity(shared.last_cli_call.as_ref()),
        check_cli_completion(shared.run_completion, &shared.cli_errors),
        check_silence_filter(input.conversations.selected_assistant_text.as_deref()),
        check_delivery(
            &shared.delivery_errors,
            shared.idle_run_completed,
            input.system_sent,
        ),
        check_connectivity(&shared.signals),
    ];

    let report = AgentReport::from_checks(
        input.name.clone(),
        input.usage.age.clone(),
        input.usage.percent,
        input.conversations.records.clone(),
        input.conversations.selected_index,
        checks,
    )?;
    tracing::debug!(
        agent = %report.name,
        status = report.overall_status.as_str(),
        pass = report.pass_count,
        warn = report.warn_count,
        fail = report.fail_count,
        "agent evaluated"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawdiag_core::{CheckKind, ConversationRecord, Verdict};
    use time::macros::datetime;

    const STATUS: &str = "\
Gateway: reachable (ws://127.0.0.1:18789)
Discord: ON · ok
  agent:main:discord:channel:1402  direct  5m ago  claude-opus  45k/200k (22%)
  agent:ops:main  direct  2h ago  claude-opus  184k/200k (92%)
";

    const LOGS: &str = "\
2026-03-01T11:50:00.120Z info cli exec: provider=claude-cli agent=main
2026-03-01T11:51:10.000Z info run done runId=a1 aborted=false durationMs=4200
2026-03-01T11:51:10.500Z debug session state processing -> idle reason=run_completed
";

    fn window(assistant: &str) -> ConversationWindow {
        let record = ConversationRecord {
            index: 1,
            timestamp: "2026-03-01 11:51".into(),
            user_text: Some("ping".into()),
            assistant_text: Some(assistant.into()),
        };
        ConversationWindow {
            records: vec![record],
            selected_index: Some(1),
            selected_user_text: Some("ping".into()),
            selected_assistant_text: Some(assistant.into()),
        }
    }

    fn shared() -> SharedFacts {
        SharedFacts::extract(STATUS, LOGS, datetime!(2026-03-01 12:00 UTC))
    }

    #[test]
    fn healthy_agent_passes_everything() {
        let input = AgentInput::extract("main", STATUS, window("pong"), false);
        let report = evaluate_agent(&input, &shared(), &Thresholds::default()).unwrap();
        assert_eq!(report.checks.len(), 6);
        let kinds: Vec<CheckKind> = report.checks.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, CheckKind::ALL.to_vec());
        assert_eq!(report.overall_status, Verdict::Pass, "{:#?}", report.checks);
        assert_eq!(report.session_age, "5m");
        assert_eq!(report.token_usage_percent, 22);
        assert_eq!(report.selected_conversation_index, Some(1));
    }

    #[test]
    fn high_usage_and_sentinel_fail() {
        let input = AgentInput::extract("ops", STATUS, window("NO_REPLY"), false);
        let report = evaluate_agent(&input, &shared(), &Thresholds::default()).unwrap();
        assert_eq!(report.overall_status, Verdict::Fail);
        assert_eq!(report.check(CheckKind::Session).unwrap().verdict, Verdict::Fail);
        assert_eq!(report.check(CheckKind::SilenceFilter).unwrap().verdict, Verdict::Fail);
        assert_eq!(report.fail_count, 2);
    }

    #[test]
    fn unknown_agent_with_no_data() {
        let input = AgentInput::extract("ghost", "", ConversationWindow::default(), false);
        let facts = SharedFacts::extract("", "", datetime!(2026-03-01 12:00 UTC));
        let report = evaluate_agent(&input, &facts, &Thresholds::default()).unwrap();
        let verdicts: Vec<Verdict> = report.checks.iter().map(|c| c.verdict).collect();
        assert_eq!(
            verdicts,
            vec![
                Verdict::Fail, // no session
                Verdict::Fail, // no cli exec
                Verdict::Warn, // window too short
                Verdict::Warn, // no assistant message
                Verdict::Warn, // insufficient data
                Verdict::Fail, // connectivity unknown
            ]
        );
        assert_eq!(report.session_age, "?");
        assert_eq!(report.token_usage_percent, 0);
        assert!(report.selected_conversation_index.is_none());
    }

    #[test]
    fn evaluation_is_idempotent() {
        let now = datetime!(2026-03-01 12:00 UTC);
        let run = || {
            let facts = SharedFacts::extract(STATUS, LOGS, now);
            let input = AgentInput::extract("main", STATUS, window("pong"), true);
            evaluate_agent(&input, &facts, &Thresholds::default()).unwrap()
        };
        assert_eq!(run(), run());
    }
}
