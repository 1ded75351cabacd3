use clawdiag_core::Cause;

/// A keyword rule that tags error text with a likely cause.
#[derive(Debug, Clone, Copy)]
pub struct CauseRule {
    pub tag: &'static str,
    /// Lowercase keywords; any one matching applies the rule.
    pub keywords: &'static [&'static str],
    pub explanation: &'static str,
}

/// Tag of the rule that marks network-level resets.
pub const CONNECTION_RESET: &str = "connection-reset";

/// Evaluated independently and in this order; several may apply at once.
pub const CAUSE_RULES: &[CauseRule] = &[
    CauseRule {
        tag: "websocket-disconnect(1005)",
        keywords: &["1005"],
        explanation: "Discord websocket closed with code 1005 (no status); the gateway dropped the connection.",
    },
    CauseRule {
        tag: "broken-pipe",
        keywords: &["epipe", "broken pipe"],
        explanation: "The CLI child process exited before its output was read (broken pipe).",
    },
    CauseRule {
        tag: "timeout",
        keywords: &["timeout", "timed out"],
        explanation: "The CLI call exceeded its time limit.",
    },
    CauseRule {
        tag: "rate-limit",
        keywords: &["rate limit", "rate-limit", "429"],
        explanation: "The upstream API rate-limited the request.",
    },
    CauseRule {
        tag: CONNECTION_RESET,
        // Only `socket hang up` is attributed to the network; other transient
        // errors stay agent-attributed.
        keywords: &["socket hang up"],
        explanation: "The network connection was reset mid-request (socket hang up).",
    },
];

impl CauseRule {
    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Every cause rule matching `context`, in rule order, each at most once.
/// An empty result still means the caller has errors to report.
pub fn classify_error_causes(context: &str) -> Vec<Cause> {
    let lowered = context.to_lowercase();
    CAUSE_RULES
        .iter()
        .filter(|rule| rule.matches(&lowered))
        .map(|rule| Cause {
            tag: rule.tag.to_string(),
            explanation: rule.explanation.to_string(),
        })
        .collect()
}

/// Whether the rule tagged `tag` matches `text`. Unknown tags never match.
pub fn matches_cause(text: &str, tag: &str) -> bool {
    let lowered = text.to_lowercase();
    CAUSE_RULES
        .iter()
        .find(|rule| rule.tag == tag)
        .is_some_and(|rule| rule.matches(&lowered))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(context: &str) -> Vec<String> {
        classify_error_causes(context).into_iter().map(|c| c.tag).collect()
    }

    #[test]
    fn no_keywords_no_causes() {
        assert!(classify_error_causes("embedded agent failed: unknown").is_empty());
        assert!(classify_error_causes("").is_empty());
    }

    #[test]
    fn single_cause() {
        assert_eq!(tags("write EPIPE"), vec!["broken-pipe"]);
        assert_eq!(tags("Request timed out"), vec!["timeout"]);
    }

    #[test]
    fn multiple_causes_in_rule_order() {
        let context = "socket hang up\nHTTP 429 rate limit\nws closed 1005\ncli timeout";
        assert_eq!(
            tags(context),
            vec![
                "websocket-disconnect(1005)",
                "timeout",
                "rate-limit",
                "connection-reset",
            ]
        );
    }

    #[test]
    fn each_tag_once() {
        assert_eq!(tags("timeout timeout timed out"), vec!["timeout"]);
    }

    #[test]
    fn matches_cause_by_tag() {
        assert!(matches_cause("deliver error: Socket Hang Up", CONNECTION_RESET));
        assert!(!matches_cause("deliver error: ECONNRESET", CONNECTION_RESET));
        assert!(!matches_cause("anything", "no-such-tag"));
    }
}
