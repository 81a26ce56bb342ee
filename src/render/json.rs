use std::io::Write;

use super::OutputFormat;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::RenderError;
use crate::system::SystemSnapshot;

/// Pretty-printed JSON with keys in snapshot order.
pub fn to_json(snapshot: &SystemSnapshot) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Writes the JSON document to `out` and returns it.
///
/// `None` signals that serialization or the write failed; a diagnostic has
/// already been emitted in that case.
pub fn render_json<W: Write>(
    snapshot: &SystemSnapshot,
    out: &mut W,
    sink: &dyn DiagnosticSink,
) -> Option<String> {
    let _span = tracing::debug_span!("render.json").entered();
    let written = to_json(snapshot).and_then(|json| {
        writeln!(out, "{json}")?;
        out.flush()?;
        Ok(json)
    });
    match written {
        Ok(json) => Some(json),
        Err(err) => {
            sink.emit(&Diagnostic::render(OutputFormat::Json.label(), &err));
            None
        }
    }
}
