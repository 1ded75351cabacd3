use serde::Serialize;
use time::OffsetDateTime;

use crate::types::{CheckKind, CheckResult, ConversationRecord, GlobalSignals, Verdict};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("expected {expected} checks, got {actual}")]
    CheckCount { expected: usize, actual: usize },
    #[error("check #{position} should be {expected}, got {actual}")]
    CheckOrder {
        position: usize,
        expected: &'static str,
        actual: &'static str,
    },
}

// ── Totals ──

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Totals {
    pub pass: usize,
    pub warn: usize,
    pub fail: usize,
}

impl Totals {
    pub fn count(checks: &[CheckResult]) -> Self {
        checks.iter().fold(Totals::default(), |acc, c| acc.add_verdict(c.verdict))
    }

    /// Element-wise sum over all agents.
    pub fn sum(agents: &[AgentReport]) -> Self {
        agents.iter().fold(Totals::default(), |acc, a| Totals {
            pass: acc.pass + a.pass_count,
            warn: acc.warn + a.warn_count,
            fail: acc.fail + a.fail_count,
        })
    }

    fn add_verdict(self, verdict: Verdict) -> Self {
        match verdict {
            Verdict::Pass => Totals { pass: self.pass + 1, ..self },
            Verdict::Warn => Totals { warn: self.warn + 1, ..self },
            Verdict::Fail => Totals { fail: self.fail + 1, ..self },
        }
    }
}

// ── Agent report ──

/// All six check results for one agent plus the facts shown alongside them.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AgentReport {
    pub name: String,
    pub session_age: String,
    pub token_usage_percent: u32,
    pub conversation_window: Vec<ConversationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_conversation_index: Option<usize>,
    pub checks: Vec<CheckResult>,
    pub pass_count: usize,
    pub warn_count: usize,
    pub fail_count: usize,
    pub overall_status: Verdict,
}

impl AgentReport {
    /// Build a report from exactly one result per [`CheckKind`], in
    /// [`CheckKind::ALL`] order. Counts and overall status are derived here.
    pub fn from_checks(
        name: impl Into<String>,
        session_age: impl Into<String>,
        token_usage_percent: u32,
        conversation_window: Vec<ConversationRecord>,
        selected_conversation_index: Option<usize>,
        checks: Vec<CheckResult>,
    ) -> Result<Self, ModelError> {
        if checks.len() != CheckKind::ALL.len() {
            return Err(ModelError::CheckCount {
                expected: CheckKind::ALL.len(),
                actual: checks.len(),
            });
        }
        for (i, (check, expected)) in checks.iter().zip(CheckKind::ALL).enumerate() {
            if check.kind != expected {
                return Err(ModelError::CheckOrder {
                    position: i + 1,
                    expected: expected.id(),
                    actual: check.kind.id(),
                });
            }
        }

        let totals = Totals::count(&checks);
        let overall_status = Verdict::worst(checks.iter().map(|c| c.verdict));
        let selected_conversation_index = match conversation_window.len() {
            0 => None,
            len => selected_conversation_index.map(|i| i.clamp(1, len)),
        };

        Ok(Self {
            name: name.into(),
            session_age: session_age.into(),
            token_usage_percent,
            conversation_window,
            selected_conversation_index,
            checks,
            pass_count: totals.pass,
            warn_count: totals.warn,
            fail_count: totals.fail,
            overall_status,
        })
    }

    pub fn check(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.kind == kind)
    }
}

// ── Run ──

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DiagnosticRun {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub hostname: String,
    pub global_signals: GlobalSignals,
    pub agents: Vec<AgentReport>,
    pub totals: Totals,
}

impl DiagnosticRun {
    pub fn new(
        timestamp: OffsetDateTime,
        hostname: impl Into<String>,
        global_signals: GlobalSignals,
        agents: Vec<AgentReport>,
    ) -> Self {
        let totals = Totals::sum(&agents);
        Self {
            timestamp,
            hostname: hostname.into(),
            global_signals,
            agents,
            totals,
        }
    }

    /// Worst overall status across all agents.
    pub fn overall_status(&self) -> Verdict {
        Verdict::worst(self.agents.iter().map(|a| a.overall_status))
    }
}
