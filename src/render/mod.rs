//! Snapshot presentation.
//!
//! Renderers only read a [`SystemSnapshot`]; they never query the host.

pub mod json;
pub mod table;

use std::io::Write;

use clap::ValueEnum;

use crate::diagnostics::DiagnosticSink;
use crate::system::SystemSnapshot;

pub use json::render_json;
pub use table::render_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
}

impl OutputFormat {
    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Json => "JSON",
            OutputFormat::Table => "table",
        }
    }
}

pub fn parse_format(s: &str) -> Option<OutputFormat> {
    match s.trim().to_ascii_lowercase().as_str() {
        "json" => Some(OutputFormat::Json),
        "table" | "text" => Some(OutputFormat::Table),
        _ => None,
    }
}

/// Writes the snapshot in the chosen format; `false` when rendering failed.
pub fn render<W: Write>(
    snapshot: &SystemSnapshot,
    format: OutputFormat,
    out: &mut W,
    sink: &dyn DiagnosticSink,
) -> bool {
    match format {
        OutputFormat::Json => render_json(snapshot, out, sink).is_some(),
        OutputFormat::Table => render_table(snapshot, out, sink),
    }
}
