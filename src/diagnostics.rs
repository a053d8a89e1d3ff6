//! Diagnostics collected while reading and rewriting Kotlin metadata.
//!
//! Almost nothing that goes wrong with a single class's metadata is allowed to fail the
//! compilation. Problems are recorded here instead, tagged with the class they concern, and
//! the host decides what to show the user.
//!
//! # Architecture
//!
//! One [`Diagnostics`] instance is shared by all per-class tasks of a read or write pass:
//! - **Read pass**: malformed payloads, unknown versions, missing companion fields,
//!   members claimed by two declarations
//! - **Write pass**: contained rewrite failures, dropped properties
//! - **Info model**: unrecognized classifier shapes
//!
//! The container uses `boxcar::Vec` for lock-free append, so rayon tasks can report
//! without synchronizing with each other.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - One entry with severity, category and the affected class
//! - [`DiagnosticSeverity`] - Info, Warning or Error
//! - [`DiagnosticCategory`] - Which part of the pipeline reported it
//!
//! # Examples
//!
//! ```rust
//! use ktmeta::diagnostics::{DiagnosticCategory, Diagnostics};
//!
//! let diagnostics = Diagnostics::new();
//! diagnostics.info_for(
//!     DiagnosticCategory::Read,
//!     "Lfoo/Bar;",
//!     "Class Lfoo/Bar; has malformed kotlin.Metadata: missing element d1",
//! );
//!
//! assert_eq!(diagnostics.info_count(), 1);
//! assert!(!diagnostics.has_warnings());
//! ```
//!
//! # Thread Safety
//!
//! [`Diagnostics`] is [`Send`] and [`Sync`]. Entries are never removed.

use std::fmt::{self, Write};

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Expected degradation, e.g. metadata that could not be parsed and is left alone.
    Info,
    /// Metadata was dropped or left stale.
    Warning,
    /// An invariant of the host was violated.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// The pipeline stage a diagnostic originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Locating, decoding and binding metadata.
    Read,
    /// Rewriting and re-encoding metadata.
    Rewrite,
    /// Metadata version checks.
    Version,
    /// Companion object bookkeeping.
    Companion,
    /// Classifier resolution.
    Classifier,
    /// Anything else.
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Read => write!(f, "Read"),
            DiagnosticCategory::Rewrite => write!(f, "Rewrite"),
            DiagnosticCategory::Version => write!(f, "Version"),
            DiagnosticCategory::Companion => write!(f, "Companion"),
            DiagnosticCategory::Classifier => write!(f, "Classifier"),
            DiagnosticCategory::General => write!(f, "General"),
        }
    }
}

/// A single diagnostic entry.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Reporting stage.
    pub category: DiagnosticCategory,
    /// Human-readable message.
    pub message: String,
    /// Descriptor of the class concerned, if any.
    pub class: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic not tied to a class.
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            class: None,
        }
    }

    /// Attaches the class the diagnostic concerns.
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;
        if let Some(class) = &self.class {
            write!(f, " (class: {class})")?;
        }
        Ok(())
    }
}

/// Append-only, thread-safe collection of [`Diagnostic`] entries.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Records an info-level diagnostic.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Records a warning.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Records an error.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Records an info-level diagnostic about `class`.
    pub fn info_for(
        &self,
        category: DiagnosticCategory,
        class: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message).with_class(class));
    }

    /// Records a warning about `class`.
    pub fn warning_for(
        &self,
        category: DiagnosticCategory,
        class: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.push(
            Diagnostic::new(DiagnosticSeverity::Warning, category, message).with_class(class),
        );
    }

    /// Records an arbitrary diagnostic.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns `true` if anything was recorded.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns `true` if at least one error was recorded.
    pub fn has_errors(&self) -> bool {
        self.count_of(DiagnosticSeverity::Error) > 0
    }

    /// Returns `true` if at least one warning was recorded.
    pub fn has_warnings(&self) -> bool {
        self.count_of(DiagnosticSeverity::Warning) > 0
    }

    /// Total number of entries.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Number of errors.
    pub fn error_count(&self) -> usize {
        self.count_of(DiagnosticSeverity::Error)
    }

    /// Number of warnings.
    pub fn warning_count(&self) -> usize {
        self.count_of(DiagnosticSeverity::Warning)
    }

    /// Number of info entries.
    pub fn info_count(&self) -> usize {
        self.count_of(DiagnosticSeverity::Info)
    }

    fn count_of(&self, severity: DiagnosticSeverity) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == severity)
            .count()
    }

    /// Iterates over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// All warnings.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Warning)
            .collect()
    }

    /// All errors.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
            .collect()
    }

    /// Entries of one category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }

    /// Entries about one class.
    pub fn for_class(&self, class: &str) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.class.as_deref() == Some(class))
            .collect()
    }

    /// A multi-line report of counts, errors and warnings.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let error_count = self.error_count();
        let warning_count = self.warning_count();
        let info_count = self.info_count();

        let _ = writeln!(
            output,
            "Diagnostics: {error_count} error(s), {warning_count} warning(s), {info_count} info(s)"
        );

        if error_count > 0 {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        if warning_count > 0 {
            output.push_str("\nWarnings:\n");
            for diag in self.warnings() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_diagnostic_creation() {
        let diag = Diagnostic::new(
            DiagnosticSeverity::Warning,
            DiagnosticCategory::Companion,
            "Missing companion field",
        );
        assert_eq!(diag.severity, DiagnosticSeverity::Warning);
        assert_eq!(diag.category, DiagnosticCategory::Companion);
        assert!(diag.class.is_none());

        let diag = diag.with_class("Lfoo/Bar;");
        assert_eq!(diag.class.as_deref(), Some("Lfoo/Bar;"));
        assert_eq!(
            diag.to_string(),
            "[WARN] Companion: Missing companion field (class: Lfoo/Bar;)"
        );
    }

    #[test]
    fn test_diagnostics_container() {
        let diagnostics = Diagnostics::new();
        assert!(!diagnostics.has_any());

        diagnostics.info(DiagnosticCategory::General, "info");
        diagnostics.warning_for(DiagnosticCategory::Rewrite, "LA;", "warning");
        diagnostics.error(DiagnosticCategory::Read, "error");

        assert_eq!(diagnostics.count(), 3);
        assert_eq!(diagnostics.info_count(), 1);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(diagnostics.error_count(), 1);
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.by_category(DiagnosticCategory::Rewrite).len(), 1);
        assert_eq!(diagnostics.for_class("LA;").len(), 1);
    }

    #[test]
    fn test_summary() {
        let diagnostics = Diagnostics::new();
        diagnostics.warning(DiagnosticCategory::Version, "unknown version 9.9.9");
        let summary = diagnostics.summary();
        assert!(summary.contains("0 error(s), 1 warning(s), 0 info(s)"));
        assert!(summary.contains("unknown version 9.9.9"));
    }

    #[test]
    fn test_concurrent_push() {
        let diagnostics = Arc::new(Diagnostics::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let diagnostics = Arc::clone(&diagnostics);
                thread::spawn(move || {
                    for j in 0..25 {
                        diagnostics.info(DiagnosticCategory::Read, format!("{i}-{j}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(diagnostics.count(), 100);
    }
}
