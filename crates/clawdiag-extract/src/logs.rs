use std::sync::OnceLock;

use regex::Regex;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::compile;

/// Error-line lists keep only this many trailing matches.
pub const MAX_ERROR_LINES: usize = 10;

/// Keep the last `max_bytes` of `text`, starting on a line boundary.
pub fn bound_tail(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut start = text.len() - max_bytes;
    while start < text.len() && !text.is_char_boundary(start) {
        start += 1;
    }
    let tail = &text[start..];
    // Drop the partial first line unless the cut landed exactly on one.
    if start > 0 && text.as_bytes()[start - 1] != b'\n' {
        if let Some(nl) = tail.find('\n') {
            return &tail[nl + 1..];
        }
    }
    tail
}

// ── CLI activity ──

/// The most recent `cli exec` line in the log window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliCall {
    pub line: String,
    pub timestamp: Option<String>,
    pub minutes_ago: Option<i64>,
}

fn cli_exec_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\bcli exec\b"))
}

fn timestamp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}"))
}

/// Find the last `cli exec` line. Log timestamps carry no reliable offset and
/// are read as UTC; elapsed time is measured against `now`.
pub fn extract_last_cli_call(logs: &str, now: OffsetDateTime) -> Option<CliCall> {
    let line = logs
        .lines()
        .rev()
        .find(|l| !l.trim().is_empty() && cli_exec_re().is_match(l))?;

    let timestamp = timestamp_re().find(line).map(|m| m.as_str().to_string());
    let minutes_ago = timestamp.as_deref().and_then(|ts| {
        let parsed = PrimitiveDateTime::parse(
            ts,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
        .ok()?;
        let elapsed = now - parsed.assume_utc();
        Some(elapsed.whole_minutes().max(0))
    });

    Some(CliCall {
        line: line.trim().to_string(),
        timestamp,
        minutes_ago,
    })
}

// ── Run completion ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunCompletion {
    Completed { duration_ms: Option<u64> },
    Aborted,
    Unknown,
}

fn run_done_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\brun done\b.*\baborted=(true|false)\b"))
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\bduration(?:Ms)?=(\d+)"))
}

/// `Aborted` if any run aborted, else `Completed` from the last clean run.
pub fn extract_run_completion(logs: &str) -> RunCompletion {
    let mut last_clean: Option<&str> = None;
    for line in logs.lines() {
        let Some(caps) = run_done_re().captures(line) else {
            continue;
        };
        match caps.get(1).map(|m| m.as_str().to_lowercase()).as_deref() {
            Some("true") => return RunCompletion::Aborted,
            _ => last_clean = Some(line),
        }
    }

    match last_clean {
        Some(line) => RunCompletion::Completed {
            duration_ms: duration_re()
                .captures(line)
                .and_then(|c| c.get(1))
                .and_then(|m| m.as_str().parse().ok()),
        },
        None => RunCompletion::Unknown,
    }
}

// ── Error lines ──

// Keywords match anywhere in the line so `RateLimitError`, `ratelimited` and
// `ChildProcessError` count.

fn cli_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        compile(
            r"(?i)embedded agent failed|cli failed|failover ?error|\bcli\b.*(error|timeout|epipe)",
        )
    })
}

fn delivery_error_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\bdeliver.*(error|fail)|\bdiscord\b.*(error|rate)"))
}

fn idle_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\bidle\b.*\brun_completed\b|\brun_completed\b.*\bidle\b"))
}

fn last_matching(logs: &str, re: &Regex) -> Vec<String> {
    let matched: Vec<&str> = logs.lines().filter(|l| re.is_match(l)).collect();
    let skip = matched.len().saturating_sub(MAX_ERROR_LINES);
    matched[skip..].iter().map(|l| l.trim().to_string()).collect()
}

/// Last CLI error lines, in log order.
pub fn extract_cli_errors(logs: &str) -> Vec<String> {
    last_matching(logs, cli_error_re())
}

/// Last delivery / Discord error lines, in log order.
pub fn extract_delivery_errors(logs: &str) -> Vec<String> {
    last_matching(logs, delivery_error_re())
}

/// A session went idle because its run completed.
pub fn has_idle_run_completed(logs: &str) -> bool {
    logs.lines().any(|l| idle_re().is_match(l))
}
