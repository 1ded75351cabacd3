use serde::Serialize;

// ── Verdict ──

/// Tri-state outcome of a single check.
///
/// Ordered by severity so `max()` over a set of verdicts gives the worst one.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "pass",
            Verdict::Warn => "warn",
            Verdict::Fail => "fail",
        }
    }

    /// Worst verdict present, `Pass` when empty.
    pub fn worst<I: IntoIterator<Item = Verdict>>(verdicts: I) -> Verdict {
        verdicts.into_iter().max().unwrap_or(Verdict::Pass)
    }
}

// ── Check kinds ──

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    Session,
    CliActivity,
    CliCompletion,
    SilenceFilter,
    Delivery,
    Connectivity,
}

impl CheckKind {
    /// Fixed evaluation and display order.
    pub const ALL: [CheckKind; 6] = [
        CheckKind::Session,
        CheckKind::CliActivity,
        CheckKind::CliCompletion,
        CheckKind::SilenceFilter,
        CheckKind::Delivery,
        CheckKind::Connectivity,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CheckKind::Session => "session",
            CheckKind::CliActivity => "cli-activity",
            CheckKind::CliCompletion => "cli-completion",
            CheckKind::SilenceFilter => "silence-filter",
            CheckKind::Delivery => "delivery",
            CheckKind::Connectivity => "connectivity",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CheckKind::Session => "Session",
            CheckKind::CliActivity => "CLI activity",
            CheckKind::CliCompletion => "CLI completion",
            CheckKind::SilenceFilter => "Silence filter",
            CheckKind::Delivery => "Delivery",
            CheckKind::Connectivity => "Gateway / Discord",
        }
    }

    /// 1-based position in [`CheckKind::ALL`].
    pub fn number(self) -> usize {
        CheckKind::ALL
            .iter()
            .position(|k| *k == self)
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

// ── Check results ──

/// One matched cause rule attached to a failing check.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Cause {
    pub tag: String,
    pub explanation: String,
}

/// Outcome of one check for one agent. Immutable once built.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CheckResult {
    pub kind: CheckKind,
    pub verdict: Verdict,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Cause>,
}

impl CheckResult {
    pub fn new(kind: CheckKind, verdict: Verdict, detail: impl Into<String>) -> Self {
        Self {
            kind,
            verdict,
            detail: detail.into(),
            evidence: None,
            causes: Vec::new(),
        }
    }

    pub fn pass(kind: CheckKind, detail: impl Into<String>) -> Self {
        Self::new(kind, Verdict::Pass, detail)
    }

    pub fn warn(kind: CheckKind, detail: impl Into<String>) -> Self {
        Self::new(kind, Verdict::Warn, detail)
    }

    pub fn fail(kind: CheckKind, detail: impl Into<String>) -> Self {
        Self::new(kind, Verdict::Fail, detail)
    }

    /// Attach raw evidence lines. An empty slice leaves `evidence` unset.
    pub fn with_evidence(mut self, lines: &[String]) -> Self {
        if !lines.is_empty() {
            self.evidence = Some(lines.join("\n"));
        }
        self
    }

    pub fn with_causes(mut self, causes: Vec<Cause>) -> Self {
        self.causes = causes;
        self
    }
}

// ── Global signals ──

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    DiscordConnectivity,
    GatewayConnectivity,
    SerializationMode,
}

impl SignalKind {
    pub fn label(self) -> &'static str {
        match self {
            SignalKind::DiscordConnectivity => "Discord",
            SignalKind::GatewayConnectivity => "Gateway",
            SignalKind::SerializationMode => "Serialize",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SignalState {
    Healthy,
    Unhealthy,
    Unknown,
}

/// A run-wide signal read once from the status text.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GlobalSignal {
    pub kind: SignalKind,
    pub state: SignalState,
    pub display: String,
}

impl GlobalSignal {
    pub fn new(kind: SignalKind, state: SignalState, display: impl Into<String>) -> Self {
        Self {
            kind,
            state,
            display: display.into(),
        }
    }

    pub fn unknown(kind: SignalKind) -> Self {
        Self::new(kind, SignalState::Unknown, "unknown")
    }

    pub fn is_healthy(&self) -> bool {
        self.state == SignalState::Healthy
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct GlobalSignals {
    pub discord: GlobalSignal,
    pub gateway: GlobalSignal,
    pub serialization: GlobalSignal,
}

impl GlobalSignals {
    /// Both Discord and the gateway report healthy.
    pub fn connectivity_ok(&self) -> bool {
        self.discord.is_healthy() && self.gateway.is_healthy()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlobalSignal> {
        [&self.discord, &self.gateway, &self.serialization].into_iter()
    }
}

impl Default for GlobalSignals {
    fn default() -> Self {
        Self {
            discord: GlobalSignal::unknown(SignalKind::DiscordConnectivity),
            gateway: GlobalSignal::unknown(SignalKind::GatewayConnectivity),
            serialization: GlobalSignal::unknown(SignalKind::SerializationMode),
        }
    }
}

// ── Session age ──

/// Human wording for a session age token (`5m`, `just now`, or `?` when unknown).
pub fn describe_session_age(age: &str) -> String {
    match age {
        "?" | "" => "active, last activity unknown".to_string(),
        "just now" => "active just now".to_string(),
        _ => format!("active {age} ago"),
    }
}

// ── Conversations ──

/// One archived conversation, newest first (`index` 1 = most recent).
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConversationRecord {
    pub index: usize,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_text: Option<String>,
}
