pub mod cli_activity;
pub mod cli_completion;
pub mod connectivity;
pub mod delivery;
pub mod session;
pub mod silence;

/// Token-usage percentages at which the session check degrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warn_percent: u32,
    pub fail_percent: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn_percent: 75,
            fail_percent: 90,
        }
    }
}

/// `45k`, `12.5k`
pub(crate) fn fmt_k(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}k")
    } else {
        format!("{value:.1}k")
    }
}

/// `1 line` / `3 lines`
pub(crate) fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_k_drops_zero_fraction() {
        assert_eq!(fmt_k(45.0), "45k");
        assert_eq!(fmt_k(12.5), "12.5k");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(1, "error"), "1 error");
        assert_eq!(plural(3, "error"), "3 errors");
    }
}
