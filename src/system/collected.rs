use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{CollectError, FailureKind, Resource};

/// Outcome of one collector run.
///
/// Callers can tell "no data because the query failed" from "no data because
/// there genuinely is none" without inspecting printed output.
#[derive(Debug)]
pub enum Collected<T> {
    Ok(T),
    /// Some entries were skipped; each carries its own diagnostic.
    Partial { value: T, skipped: Vec<Diagnostic> },
    /// The whole query failed and `empty` stands in for the result.
    Degraded { empty: T, diagnostic: Diagnostic },
}

impl<T: Default> Collected<T> {
    pub fn degraded(resource: Resource, error: CollectError) -> Self {
        Collected::Degraded {
            empty: T::default(),
            diagnostic: Diagnostic::collect(resource, &error),
        }
    }
}

impl<T> Collected<T> {
    pub fn value(&self) -> &T {
        match self {
            Collected::Ok(value) => value,
            Collected::Partial { value, .. } => value,
            Collected::Degraded { empty, .. } => empty,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Collected::Degraded { diagnostic, .. } => Some(diagnostic.kind),
            _ => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Collected::Degraded { .. })
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Collected::Ok(_) => &[],
            Collected::Partial { skipped, .. } => skipped,
            Collected::Degraded { diagnostic, .. } => std::slice::from_ref(diagnostic),
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Collected::Ok(value) => value,
            Collected::Partial { value, .. } => value,
            Collected::Degraded { empty, .. } => empty,
        }
    }

    /// Emits every carried diagnostic and yields the value.
    pub fn report(self, sink: &dyn DiagnosticSink) -> T {
        for diagnostic in self.diagnostics() {
            sink.emit(diagnostic);
        }
        self.into_value()
    }
}
