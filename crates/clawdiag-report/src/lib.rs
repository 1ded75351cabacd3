//! Rendering of a [`DiagnosticRun`](clawdiag_core::DiagnosticRun).
//!
//! Both renderers are pure: they take the finished run and return a string.
//! Writing the result anywhere is the caller's job.

mod html;
mod terminal;

pub use html::{escape_html, render_html};
pub use terminal::render_terminal;

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

pub(crate) fn format_ts(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_else(|_| ts.to_string())
}
