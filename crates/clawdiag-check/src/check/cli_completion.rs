use clawdiag_core::{CheckKind, CheckResult};
use clawdiag_extract::{classify_error_causes, RunCompletion};

use super::plural;

/// Check 3: CLI runs finish cleanly.
///
/// Aborts and error lines fail even when a completed run is also present.
pub fn check_cli_completion(completion: RunCompletion, errors: &[String]) -> CheckResult {
    let kind = CheckKind::CliCompletion;

    let failure = match (completion, errors.is_empty()) {
        (RunCompletion::Aborted, true) => Some("last run aborted (aborted=true)".to_string()),
        (RunCompletion::Aborted, false) => Some(format!(
            "last run aborted (aborted=true), {} in log window",
            plural(errors.len(), "CLI error")
        )),
        (_, false) => Some(format!("{} in log window", plural(errors.len(), "CLI error"))),
        _ => None,
    };
    if let Some(detail) = failure {
        return CheckResult::fail(kind, detail)
            .with_evidence(errors)
            .with_causes(classify_error_causes(&errors.join("\n")));
    }

    match completion {
        RunCompletion::Completed {
            duration_ms: Some(ms),
        } => CheckResult::pass(kind, format!("last run completed in {:.1}s", ms as f64 / 1000.0)),
        RunCompletion::Completed { duration_ms: None } => {
            CheckResult::pass(kind, "last run completed")
        }
        _ => CheckResult::warn(
            kind,
            "no errors and no run completion in log window (log window too short)",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clawdiag_core::Verdict;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn aborted_fails() {
        let r = check_cli_completion(RunCompletion::Aborted, &[]);
        assert_eq!(r.verdict, Verdict::Fail);
        assert!(r.evidence.is_none());
    }

    #[test]
    fn errors_fail_over_completed() {
        let errors = lines(&["cli failed: write EPIPE", "claude-cli timeout after 120s"]);
        let r = check_cli_completion(RunCompletion::Completed { duration_ms: Some(10) }, &errors);
        assert_eq!(r.verdict, Verdict::Fail);
        assert_eq!(r.detail, "2 CLI errors in log window");
        assert_eq!(
            r.evidence.as_deref(),
            Some("cli failed: write EPIPE\nclaude-cli timeout after 120s")
        );
        let tags: Vec<&str> = r.causes.iter().map(|c| c.tag.as_str()).collect();
        assert_eq!(tags, vec!["broken-pipe", "timeout"]);
    }

    #[test]
    fn errors_without_known_cause_still_fail() {
        let errors = lines(&["embedded agent failed"]);
        let r = check_cli_completion(RunCompletion::Unknown, &errors);
        assert_eq!(r.verdict, Verdict::Fail);
        assert!(r.causes.is_empty());
        assert_eq!(r.detail, "1 CLI error in log window");
    }

    #[test]
    fn nothing_in_window_warns() {
        let r = check_cli_completion(RunCompletion::Unknown, &[]);
        assert_eq!(r.verdict, Verdict::Warn);
        assert!(r.detail.contains("too short"));
    }

    #[test]
    fn clean_completion_passes() {
        let r = check_cli_completion(RunCompletion::Completed { duration_ms: Some(4200) }, &[]);
        assert_eq!(r.verdict, Verdict::Pass);
        assert_eq!(r.detail, "last run completed in 4.2s");

        let r = check_cli_completion(RunCompletion::Completed { duration_ms: None }, &[]);
        assert_eq!(r.detail, "last run completed");
    }
}
