use std::path::{Path, PathBuf};

use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "diagnose.json";

const ENV_OPENCLAW_BIN: &str = "CLAWDIAG_OPENCLAW_BIN";
const ENV_OPENCLAW_HOME: &str = "OPENCLAW_HOME";
const ENV_PROJECTS_DIR: &str = "CLAWDIAG_PROJECTS_DIR";

/// Settings for one diagnose run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiagConfig {
    pub openclaw_bin: String,
    pub openclaw_home: PathBuf,
    pub projects_dir: PathBuf,
    pub log_lines: usize,
    pub log_tail_bytes: usize,
    pub token_warn_percent: u32,
    pub token_fail_percent: u32,
    pub conversation_window: usize,
    pub preview_chars: usize,
    pub report_path: Option<PathBuf>,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            openclaw_bin: "openclaw".to_string(),
            openclaw_home: clawdiag_store::default_openclaw_home(),
            projects_dir: clawdiag_store::default_projects_root(),
            log_lines: 2000,
            log_tail_bytes: 200 * 1024,
            token_warn_percent: 75,
            token_fail_percent: 90,
            conversation_window: 5,
            preview_chars: 60,
            report_path: None,
        }
    }
}

impl DiagConfig {
    /// Load the config file, then apply environment overrides.
    ///
    /// `explicit` wins over `<openclaw home>/diagnose.json`. Never fails:
    /// a missing or unparseable file yields defaults.
    pub fn load(explicit: Option<&Path>) -> Self {
        Self::load_with(explicit, |key| std::env::var(key).ok())
    }

    fn load_with(explicit: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Self {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let home = env(ENV_OPENCLAW_HOME)
                    .map(PathBuf::from)
                    .unwrap_or_else(clawdiag_store::default_openclaw_home);
                home.join(CONFIG_FILE_NAME)
            }
        };
        let mut cfg = Self::from_file(&path);
        cfg.apply_env(env);
        cfg.normalize();
        cfg
    }

    fn from_file(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "no config file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config");
                Self::default()
            }
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        if let Some(bin) = non_empty(ENV_OPENCLAW_BIN) {
            self.openclaw_bin = bin;
        }
        if let Some(home) = non_empty(ENV_OPENCLAW_HOME) {
            self.openclaw_home = PathBuf::from(home);
        }
        if let Some(dir) = non_empty(ENV_PROJECTS_DIR) {
            self.projects_dir = PathBuf::from(dir);
        }
    }

    // Zero windows and inverted thresholds make every check meaningless.
    fn normalize(&mut self) {
        self.conversation_window = self.conversation_window.max(1);
        self.preview_chars = self.preview_chars.max(1);
        if self.token_fail_percent < self.token_warn_percent {
            self.token_fail_percent = self.token_warn_percent;
        }
    }
}
