use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the generated report.
pub const REPORT_FILE_NAME: &str = "diagnose-report.html";

/// Return the OpenClaw home: `~/.openclaw/`
pub fn default_openclaw_home() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".openclaw"),
        None => PathBuf::from(".openclaw"),
    }
}

/// Return the root that holds one conversation directory per workspace:
/// `~/.claude/projects/`
pub fn default_projects_root() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".claude").join("projects"),
        None => PathBuf::from(".claude").join("projects"),
    }
}

/// Mangle a workspace path into its conversation directory name.
/// Every char that is not ASCII alphanumeric becomes `-`.
pub fn mangle_path(p: &Path) -> String {
    p.to_string_lossy()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Conversation directory for a workspace: `projects_root/<mangled>/`
pub fn conversation_dir(projects_root: &Path, workspace: &Path) -> PathBuf {
    projects_root.join(mangle_path(workspace))
}

/// Session store file for an agent: `openclaw_home/agents/<agent>/sessions/sessions.json`
pub fn session_store_path(openclaw_home: &Path, agent: &str) -> PathBuf {
    openclaw_home
        .join("agents")
        .join(agent)
        .join("sessions")
        .join("sessions.json")
}

/// Resolve an agent's workspace directory.
///
/// Reads `agents.list[].workspace` (and `agents.defaults.workspace` for
/// `main`) from `openclaw_home/openclaw.json`. Falls back to
/// `openclaw_home/workspace` for `main`, `openclaw_home/workspace-<agent>`
/// otherwise. Never fails.
pub fn agent_workspace(openclaw_home: &Path, agent: &str) -> PathBuf {
    let fallback = if agent == "main" {
        openclaw_home.join("workspace")
    } else {
        openclaw_home.join(format!("workspace-{agent}"))
    };

    let config_path = openclaw_home.join("openclaw.json");
    let content = match fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(_) => return fallback,
    };
    let val: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(path = %config_path.display(), error = %e, "unparseable openclaw config");
            return fallback;
        }
    };

    let agents = val.get("agents");
    let listed = agents
        .and_then(|a| a.get("list"))
        .and_then(|l| l.as_array())
        .and_then(|list| {
            list.iter()
                .find(|entry| entry.get("id").and_then(|v| v.as_str()) == Some(agent))
        })
        .and_then(|entry| entry.get("workspace"))
        .and_then(|w| w.as_str());
    let default = if agent == "main" {
        agents
            .and_then(|a| a.get("defaults"))
            .and_then(|d| d.get("workspace"))
            .and_then(|w| w.as_str())
    } else {
        None
    };

    match listed.or(default) {
        Some(ws) if !ws.is_empty() => expand_home(ws),
        _ => fallback,
    }
}

/// Expand a leading `~/` against the home directory.
fn expand_home(p: &str) -> PathBuf {
    if let Some(rest) = p.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(p)
}

/// Default report location: next to the running executable.
pub fn default_report_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|d| d.join(REPORT_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(REPORT_FILE_NAME))
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}
