use crate::traits::{Diagnostic, DiagnosticSink};
use std::sync::Mutex;
use tracing::{debug, error, warn};

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MalformedFeed { source, reason } => {
                warn!(source = %source, reason = %reason, "Malformed feed recovered");
            }
            Diagnostic::SourceFailed { source, error } => {
                error!(source = %source, error = %error, "Source failed");
            }
        }
    }

    fn progress(&self, source: &str, position: usize, total: usize) {
        debug!(source = %source, position, total, "Fetching source");
    }
}

/// Keeps every diagnostic in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    progress: Mutex<Vec<(String, usize, usize)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// `(source, position, total)` for every source started.
    pub fn progress_log(&self) -> Vec<(String, usize, usize)> {
        self.progress
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<Diagnostic> {
        self.diagnostics()
            .into_iter()
            .filter(Diagnostic::is_failure)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn report(&self, diagnostic: Diagnostic) {
        if let Ok(mut guard) = self.diagnostics.lock() {
            guard.push(diagnostic);
        }
    }

    fn progress(&self, source: &str, position: usize, total: usize) {
        if let Ok(mut guard) = self.progress.lock() {
            guard.push((source.to_string(), position, total));
        }
    }
}
