use std::process::Command;

use thiserror::Error;

/// Why an external command produced no usable output.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{program}` exited with {code}: {stderr}")]
    Exit {
        program: String,
        code: String,
        stderr: String,
    },
}

/// Run `program args...` and return its stdout (lossy UTF-8).
pub fn run_capture(program: &str, args: &[&str]) -> Result<String, FetchError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| FetchError::Spawn {
            program: program.to_string(),
            source,
        })?;
    if !output.status.success() {
        return Err(FetchError::Exit {
            program: program.to_string(),
            code: output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn run_or_empty(program: &str, args: &[&str]) -> String {
    match run_capture(program, args) {
        Ok(out) => out,
        Err(e) => {
            tracing::warn!(error = %e, "external command failed, continuing with empty output");
            String::new()
        }
    }
}

/// `<bin> status --deep`. Empty on any failure.
pub fn fetch_status(bin: &str) -> String {
    run_or_empty(bin, &["status", "--deep"])
}

/// `<bin> logs --plain --limit <lines>`. Empty on any failure.
pub fn fetch_logs(bin: &str, lines: usize) -> String {
    let limit = lines.to_string();
    run_or_empty(bin, &["logs", "--plain", "--limit", &limit])
}

/// Best-effort host name: `HOSTNAME` / `COMPUTERNAME`, then `hostname`, then "unknown".
pub fn hostname() -> String {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .or_else(|| {
            run_capture("hostname", &[])
                .ok()
                .map(|out| out.trim().to_string())
                .filter(|v| !v.is_empty())
        })
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSING: &str = "clawdiag-definitely-not-a-real-binary";

    #[test]
    fn missing_binary_is_spawn_error() {
        let err = run_capture(MISSING, &["status"]).unwrap_err();
        assert!(matches!(err, FetchError::Spawn { .. }));
        assert!(err.to_string().contains(MISSING));
    }

    #[test]
    fn fetchers_degrade_to_empty() {
        assert_eq!(fetch_status(MISSING), "");
        assert_eq!(fetch_logs(MISSING, 2000), "");
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_carries_code_and_stderr() {
        let err = run_capture("sh", &["-c", "echo boom >&2; exit 3"]).unwrap_err();
        match err {
            FetchError::Exit { code, stderr, .. } => {
                assert_eq!(code, "3");
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected: {other}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout() {
        assert_eq!(run_capture("sh", &["-c", "printf 'a\\nb'"]).unwrap(), "a\nb");
    }

    #[test]
    fn hostname_is_never_empty() {
        assert!(!hostname().is_empty());
    }
}
