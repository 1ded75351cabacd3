use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clawdiag_check::{evaluate_agent, AgentInput, SharedFacts, Thresholds};
use clawdiag_core::DiagnosticRun;
use clawdiag_extract::{
    bound_tail, discover_agents, extract_last_conversation_texts, read_system_sent,
    ConversationLimits,
};
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::DiagConfig;
use crate::fetch;
use crate::open::open_report;

/// No agent names were given and `--all` found none either.
#[derive(Debug, Error)]
#[error("no agents to diagnose; {}", describe_available(.available))]
pub struct UsageError {
    pub available: Vec<String>,
}

fn describe_available(available: &[String]) -> String {
    if available.is_empty() {
        "none found in status output".to_string()
    } else {
        format!("available agents: {}", available.join(", "))
    }
}

pub struct DiagnoseParams<'a> {
    pub agents: &'a [String],
    pub all: bool,
    pub open: bool,
    pub conv: usize,
    pub json: bool,
    pub out: Option<&'a Path>,
    pub config: Option<&'a Path>,
}

/// Execute `diagnose [AGENT]... [--all]`
pub fn execute(params: &DiagnoseParams<'_>) -> Result<()> {
    let cfg = DiagConfig::load(params.config);
    let now = OffsetDateTime::now_utc();

    let status = fetch::fetch_status(&cfg.openclaw_bin);
    let agents = resolve_agents(params.agents, params.all, &status);
    if agents.is_empty() {
        return Err(UsageError {
            available: discover_agents(&status),
        }
        .into());
    }

    let logs = fetch::fetch_logs(&cfg.openclaw_bin, cfg.log_lines);
    let conv = clamp_conv(params.conv, cfg.conversation_window);
    let run = build_run(&cfg, &agents, conv, &status, &logs, now, fetch::hostname())?;

    let path = report_path(params.out, &cfg);
    let html = clawdiag_report::render_html(&run);
    clawdiag_store::write_atomic(&path, html.as_bytes())
        .with_context(|| format!("cannot write report to {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        agents = run.agents.len(),
        status = run.overall_status().as_str(),
        "report written"
    );

    if params.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print!("{}", clawdiag_report::render_terminal(&run));
        println!("\nReport: {}", path.display());
    }

    if params.open {
        open_report(&path);
    }
    Ok(())
}

/// Positional names first, then (with `--all`) every agent in the status
/// text. Duplicates dropped, first occurrence wins.
pub fn resolve_agents(positional: &[String], all: bool, status: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let discovered = if all {
        let found = discover_agents(status);
        tracing::debug!(agents = ?found, "discovered agents");
        found
    } else {
        Vec::new()
    };
    for name in positional.iter().chain(discovered.iter()) {
        let name = name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Clamp a 1-based `--conv` index into `1..=window`.
pub fn clamp_conv(n: usize, window: usize) -> usize {
    n.clamp(1, window.max(1))
}

fn report_path(out: Option<&Path>, cfg: &DiagConfig) -> PathBuf {
    out.map(Path::to_path_buf)
        .or_else(|| cfg.report_path.clone())
        .unwrap_or_else(clawdiag_store::default_report_path)
}

/// Evaluate every agent over one snapshot of status and log text.
fn build_run(
    cfg: &DiagConfig,
    agents: &[String],
    conv: usize,
    status: &str,
    logs: &str,
    now: OffsetDateTime,
    hostname: String,
) -> Result<DiagnosticRun> {
    let logs = bound_tail(logs, cfg.log_tail_bytes);
    let shared = SharedFacts::extract(status, logs, now);
    let thresholds = Thresholds {
        warn_percent: cfg.token_warn_percent,
        fail_percent: cfg.token_fail_percent,
    };
    let limits = ConversationLimits {
        window: cfg.conversation_window,
        preview_chars: cfg.preview_chars,
    };

    let mut reports = Vec::with_capacity(agents.len());
    for name in agents {
        let workspace = clawdiag_store::agent_workspace(&cfg.openclaw_home, name);
        let store_dir = clawdiag_store::conversation_dir(&cfg.projects_dir, &workspace);
        let conversations = extract_last_conversation_texts(&store_dir, conv, limits);
        let system_sent = read_system_sent(
            &clawdiag_store::session_store_path(&cfg.openclaw_home, name),
            name,
        );
        let input = AgentInput::extract(name, status, conversations, system_sent);
        reports.push(evaluate_agent(&input, &shared, &thresholds)?);
    }

    Ok(DiagnosticRun::new(now, hostname, shared.signals, reports))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawdiag_core::{CheckKind, Verdict};
    use time::macros::datetime;

    const STATUS: &str = "\
Gateway: reachable
Discord: ON · ok
  agent:main:discord:channel:1  direct  3m ago  claude  20k/200k (10%)
  agent:ops:main  direct  1h ago  claude  190k/200k (95%)
";

    const LOGS: &str = "\
2026-03-01T11:58:00.000Z info cli exec: provider=claude-cli
2026-03-01T11:58:05.000Z info run done aborted=false durationMs=5000
2026-03-01T11:58:05.100Z debug state processing -> idle reason=run_completed
";

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolve_positional_only() {
        assert_eq!(resolve_agents(&names(&["ops"]), false, STATUS), names(&["ops"]));
    }

    #[test]
    fn resolve_all_appends_and_dedupes() {
        assert_eq!(
            resolve_agents(&names(&["ops", "extra"]), true, STATUS),
            names(&["ops", "extra", "main"])
        );
    }

    #[test]
    fn resolve_nothing_is_empty() {
        assert!(resolve_agents(&[], false, STATUS).is_empty());
        assert!(resolve_agents(&[], true, "").is_empty());
    }

    #[test]
    fn conv_is_clamped_to_window() {
        assert_eq!(clamp_conv(0, 5), 1);
        assert_eq!(clamp_conv(3, 5), 3);
        assert_eq!(clamp_conv(99, 5), 5);
        assert_eq!(clamp_conv(2, 0), 1);
    }

    #[test]
    fn usage_error_lists_available_agents() {
        let err = UsageError {
            available: names(&["main", "ops"]),
        };
        assert!(err.to_string().ends_with("available agents: main, ops"));
    }

    #[test]
    fn out_flag_beats_config_path() {
        let cfg = DiagConfig {
            report_path: Some(PathBuf::from("/cfg/report.html")),
            ..DiagConfig::default()
        };
        assert_eq!(
            report_path(Some(Path::new("/cli/r.html")), &cfg),
            PathBuf::from("/cli/r.html")
        );
        assert_eq!(report_path(None, &cfg), PathBuf::from("/cfg/report.html"));
    }

    #[test]
    fn build_run_over_temp_stores() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = DiagConfig {
            openclaw_home: tmp.path().join("home"),
            projects_dir: tmp.path().join("projects"),
            ..DiagConfig::default()
        };

        let workspace = clawdiag_store::agent_workspace(&cfg.openclaw_home, "main");
        let store = clawdiag_store::conversation_dir(&cfg.projects_dir, &workspace);
        std::fs::create_dir_all(&store).unwrap();
        std::fs::write(
            store.join("s1.jsonl"),
            concat!(
                r#"{"type":"user","message":{"role":"user","content":"hello"}}"#,
                "\n",
                r#"{"type":"assistant","message":{"role":"assistant","content":[{"type":"text","text":"hi there"}]}}"#,
                "\n"
            ),
        )
        .unwrap();

        let run = build_run(
            &cfg,
            &names(&["main", "ops"]),
            1,
            STATUS,
            LOGS,
            datetime!(2026-03-01 12:00 UTC),
            "test-host".into(),
        )
        .unwrap();

        assert_eq!(run.hostname, "test-host");
        assert_eq!(run.agents.len(), 2);
        let main = &run.agents[0];
        assert_eq!(main.overall_status, Verdict::Pass, "{:#?}", main.checks);
        assert_eq!(main.conversation_window.len(), 1);
        assert_eq!(main.selected_conversation_index, Some(1));

        let ops = &run.agents[1];
        assert_eq!(ops.check(CheckKind::Session).unwrap().verdict, Verdict::Fail);
        // no conversation store for ops
        assert_eq!(ops.check(CheckKind::SilenceFilter).unwrap().verdict, Verdict::Warn);

        let summed = run
            .agents
            .iter()
            .fold(0, |acc, a| acc + a.pass_count + a.warn_count + a.fail_count);
        assert_eq!(run.totals.pass + run.totals.warn + run.totals.fail, summed);
    }
}
