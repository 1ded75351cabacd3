use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use clawdiag_core::ConversationRecord;
use time::macros::format_description;
use time::OffsetDateTime;

/// Bounds applied while reading the conversation store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversationLimits {
    /// How many of the most recent conversation files to read.
    pub window: usize,
    /// Message previews are cut to this many chars.
    pub preview_chars: usize,
}

impl Default for ConversationLimits {
    fn default() -> Self {
        Self {
            window: 5,
            preview_chars: 60,
        }
    }
}

/// The recent conversations of one agent and the selected entry's texts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationWindow {
    pub records: Vec<ConversationRecord>,
    /// 1-based; `None` when `records` is empty.
    pub selected_index: Option<usize>,
    /// Full texts of the selected entry; `records` only hold previews.
    pub selected_user_text: Option<String>,
    pub selected_assistant_text: Option<String>,
}

/// Read the newest conversation files under `store_dir` (skipping any
/// `subagents/` paths) and pick entry `selected_index`, clamped to the window.
///
/// A missing directory yields an empty window.
pub fn extract_last_conversation_texts(
    store_dir: &Path,
    selected_index: usize,
    limits: ConversationLimits,
) -> ConversationWindow {
    let mut files = Vec::new();
    collect_jsonl(store_dir, &mut files);
    // Newest first; path order breaks ties so output is deterministic.
    files.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    files.truncate(limits.window);

    let texts: Vec<(Option<String>, Option<String>)> =
        files.iter().map(|(_, path)| last_texts(path)).collect();
    let records: Vec<ConversationRecord> = files
        .iter()
        .zip(&texts)
        .enumerate()
        .map(|(i, ((modified, _), (user, assistant)))| ConversationRecord {
            index: i + 1,
            timestamp: format_mtime(*modified),
            user_text: user.as_deref().map(|t| truncate_chars(t, limits.preview_chars)),
            assistant_text: assistant
                .as_deref()
                .map(|t| truncate_chars(t, limits.preview_chars)),
        })
        .collect();

    if records.is_empty() {
        return ConversationWindow::default();
    }

    let selected = selected_index.clamp(1, records.len());
    let (user, assistant) = texts[selected - 1].clone();
    ConversationWindow {
        selected_index: Some(selected),
        selected_user_text: user,
        selected_assistant_text: assistant,
        records,
    }
}

fn collect_jsonl(dir: &Path, out: &mut Vec<(SystemTime, PathBuf)>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            if entry.file_name() != "subagents" {
                collect_jsonl(&path, out);
            }
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        out.push((modified, path));
    }
}

/// Scan one JSONL conversation forward and keep the last user and assistant texts.
///
/// A record's role is `message.role`, else the top-level `type`. Content is
/// either a string or an array whose `text` blocks are joined. User records
/// without text (tool results) are skipped.
fn last_texts(path: &Path) -> (Option<String>, Option<String>) {
    let file = match std::fs::File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot open conversation file");
            return (None, None);
        }
    };

    let mut last_user: Option<String> = None;
    let mut last_assistant: Option<String> = None;

    for line in BufReader::new(file).lines() {
        let Ok(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }
        let record: serde_json::Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(_) => continue,
        };

        let message = record.get("message");
        let role = message
            .and_then(|m| m.get("role"))
            .and_then(|r| r.as_str())
            .or_else(|| record.get("type").and_then(|t| t.as_str()))
            .unwrap_or("");

        let Some(text) = message.and_then(|m| m.get("content")).and_then(content_text) else {
            continue;
        };

        match role {
            "user" => last_user = Some(text),
            "assistant" => last_assistant = Some(text),
            _ => {}
        }
    }

    (last_user, last_assistant)
}

fn content_text(content: &serde_json::Value) -> Option<String> {
    let text = match content {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Array(blocks) => blocks
            .iter()
            .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
            .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    };
    (!text.is_empty()).then_some(text)
}

/// Cut `text` to `max_chars` chars, marking the cut with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}

fn format_mtime(modified: SystemTime) -> String {
    OffsetDateTime::from(modified)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| "?".into())
}
