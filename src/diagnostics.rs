use std::fmt;
use std::io::Write;

use crate::error::{CollectError, FailureKind, RenderError, Resource};

/// A single advisory failure message for the operator.
///
/// Displayed as `Error: <context> - <cause>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: FailureKind,
    pub context: String,
    pub cause: String,
}

impl Diagnostic {
    pub fn collect(resource: Resource, error: &CollectError) -> Self {
        let context = match error.kind() {
            FailureKind::AccessDenied => format!("Access denied to {resource} information"),
            FailureKind::TimedOut => format!("Timed out reading {resource} information"),
            FailureKind::Unexpected => format!("Unexpected error occurred in {resource} collector"),
        };
        Diagnostic {
            kind: error.kind(),
            context,
            cause: single_line(&error.to_string()),
        }
    }

    pub fn skipped_partition(mount_point: &str, error: &CollectError) -> Self {
        Diagnostic {
            kind: error.kind(),
            context: format!("Skipped disk partition {mount_point}"),
            cause: single_line(&error.to_string()),
        }
    }

    pub fn render(format: &str, error: &RenderError) -> Self {
        Diagnostic {
            kind: FailureKind::Unexpected,
            context: format!("Failed to render {format} output"),
            cause: single_line(&error.to_string()),
        }
    }
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {} - {}", self.context, self.cause)
    }
}

/// Receives diagnostics from collectors and renderers.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, diagnostic: &Diagnostic);
}

/// Writes each diagnostic as one line on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, diagnostic: &Diagnostic) {
        tracing::debug!(
            kind = ?diagnostic.kind,
            context = %diagnostic.context,
            cause = %diagnostic.cause,
            "diagnostic emitted"
        );
        // Nothing sensible is left to do if stderr itself is gone.
        let _ = writeln!(std::io::stderr().lock(), "{diagnostic}");
    }
}
