use std::sync::OnceLock;

use clawdiag_core::{GlobalSignal, GlobalSignals, SignalKind, SignalState};
use regex::Regex;

use crate::compile;

// ── Session lines ──

/// Parsed age and token usage from one session line.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenUsage {
    pub age: String,
    pub used_k: f64,
    pub total_k: f64,
    pub percent: u32,
}

impl Default for TokenUsage {
    fn default() -> Self {
        Self {
            age: "?".into(),
            used_k: 0.0,
            total_k: 0.0,
            percent: 0,
        }
    }
}

fn agent_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?:^|[^A-Za-z0-9_])agent:([A-Za-z0-9_-]+):"))
}

fn age_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\b(\d+)\s*([smhd])\s+ago\b|\b(just now)\b"))
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(\d+(?:\.\d+)?)k\s*/\s*(\d+(?:\.\d+)?)k\s*\((\d+)%\)"))
}

/// First status line carrying the `agent:<name>:` session key.
///
/// `None` means "session not found"; callers must not treat it as an error.
pub fn extract_session_line<'a>(status: &'a str, agent: &str) -> Option<&'a str> {
    agent_lines(status).find_map(|(name, line)| (name == agent).then_some(line))
}

/// Every distinct agent name in the status text, in first-seen order.
pub fn discover_agents(status: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for (name, _) in agent_lines(status) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn agent_lines(status: &str) -> impl Iterator<Item = (&str, &str)> {
    status.lines().flat_map(|line| {
        agent_key_re()
            .captures_iter(line)
            .filter_map(|c| c.get(1))
            .map(move |m| (m.as_str(), line))
            .collect::<Vec<_>>()
    })
}

/// Parse `<n><unit> ago` and `used/total (pct%)` out of a session line.
/// Each field falls back independently (`"?"`, `0`).
pub fn extract_token_usage(line: &str) -> TokenUsage {
    let mut usage = TokenUsage::default();

    if let Some(caps) = age_re().captures(line) {
        usage.age = match (caps.get(1), caps.get(2), caps.get(3)) {
            (Some(n), Some(unit), _) => format!("{}{}", n.as_str(), unit.as_str().to_lowercase()),
            (_, _, Some(now)) => now.as_str().to_lowercase(),
            _ => usage.age,
        };
    }

    if let Some(caps) = token_re().captures(line) {
        let used = caps.get(1).and_then(|m| m.as_str().parse::<f64>().ok());
        let total = caps.get(2).and_then(|m| m.as_str().parse::<f64>().ok());
        let pct = caps.get(3).and_then(|m| m.as_str().parse::<u32>().ok());
        if let (Some(used), Some(total), Some(pct)) = (used, total, pct) {
            usage.used_k = used;
            usage.total_k = total;
            usage.percent = pct;
        }
    }

    usage
}

// ── Global signals ──

const UNHEALTHY_WORDS: &str = concat!(
    r"(?i)\bnot\s+(?:connected|reachable|running|healthy|ok)\b|not configured",
    r"|\b(?:errors?|fail(?:ed|ing|ure)?|disconnected|offline|unreachable|down|off|disabled)\b",
);
const HEALTHY_WORDS: &str = r"(?i)\b(ok|connected|healthy|running|on|reachable)\b";
// `errors: 0`, `failures=0` report the absence of a problem.
const ZERO_COUNT: &str = r"(?i)\b(?:errors?|fail(?:ed|ures?)?)\s*[:=]\s*0\b";

fn unhealthy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(UNHEALTHY_WORDS))
}

fn healthy_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(HEALTHY_WORDS))
}

fn zero_count_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(ZERO_COUNT))
}

fn serialize_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?i)\bserialize\s*[=:]\s*(true|false)\b"))
}

/// Read the Discord, gateway and serialization signals from the status text.
pub fn extract_global_signals(status: &str) -> GlobalSignals {
    GlobalSignals {
        discord: component_signal(status, SignalKind::DiscordConnectivity, "discord"),
        gateway: component_signal(status, SignalKind::GatewayConnectivity, "gateway"),
        serialization: serialization_signal(status),
    }
}

fn component_signal(status: &str, kind: SignalKind, component: &str) -> GlobalSignal {
    // Session keys mention channels too (`agent:main:discord:...`); skip them.
    let lines: Vec<String> = status
        .lines()
        .filter(|l| l.to_lowercase().contains(component))
        .filter(|l| agent_key_re().find(l).is_none())
        .map(|l| zero_count_re().replace_all(l, "").into_owned())
        .collect();

    if lines.is_empty() {
        return GlobalSignal::new(kind, SignalState::Unknown, "not reported");
    }
    for line in &lines {
        if let Some(m) = unhealthy_re().find(line) {
            return GlobalSignal::new(kind, SignalState::Unhealthy, m.as_str().to_lowercase());
        }
    }
    for line in &lines {
        if let Some(m) = healthy_re().find(line) {
            return GlobalSignal::new(kind, SignalState::Healthy, m.as_str().to_lowercase());
        }
    }
    GlobalSignal::new(kind, SignalState::Unknown, "unrecognized")
}

fn serialization_signal(status: &str) -> GlobalSignal {
    let kind = SignalKind::SerializationMode;
    match serialize_re()
        .captures(status)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_lowercase())
    {
        Some(v) if v == "true" => GlobalSignal::new(kind, SignalState::Healthy, "serialized"),
        Some(_) => GlobalSignal::new(kind, SignalState::Healthy, "concurrent"),
        None => GlobalSignal::unknown(kind),
    }
}
