use std::path::Path;

/// Whether any of `agent`'s sessions in `sessions.json` has `systemSent: true`.
///
/// The store is a JSON object keyed by session key (`agent:<name>:...`).
/// A missing or unparseable file reads as `false`.
pub fn read_system_sent(store_path: &Path, agent: &str) -> bool {
    let content = match std::fs::read_to_string(store_path) {
        Ok(c) => c,
        Err(_) => return false,
    };
    let val: serde_json::Value = match serde_json::from_str(&content) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(path = %store_path.display(), error = %e, "unparseable session store");
            return false;
        }
    };
    let Some(sessions) = val.as_object() else {
        return false;
    };

    let prefix = format!("agent:{agent}:");
    sessions
        .iter()
        .filter(|(key, _)| key.starts_with(&prefix))
        .any(|(_, entry)| entry.get("systemSent").and_then(|v| v.as_bool()) == Some(true))
}
