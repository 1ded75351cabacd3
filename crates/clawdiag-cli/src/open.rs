use std::path::Path;
use std::process::{Command, Stdio};

#[cfg(windows)]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    // empty title arg so a quoted path is not taken as the window title
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(target_os = "macos")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(not(any(windows, target_os = "macos")))]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Hand the report to the platform's default viewer.
/// Best-effort: failures are logged and otherwise ignored.
pub fn open_report(path: &Path) {
    let status = opener(path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match status {
        Ok(s) if s.success() => tracing::debug!(path = %path.display(), "report opened"),
        Ok(s) => tracing::warn!(path = %path.display(), status = %s, "could not open report"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not open report"),
    }
}
