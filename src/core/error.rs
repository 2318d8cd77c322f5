use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while configuring the engine or producing documents.
///
/// Business-rule findings are never errors; they are reported as
/// [`Diagnostic`] values inside a [`ValidationResult`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InvoiceError {
    /// The invoice carries error-severity diagnostics and a gated operation refused it.
    #[error("validation failed: {0}")]
    Validation(String),

    /// XML generation error.
    #[error("XML error: {0}")]
    Xml(String),

    /// A derived amount does not fit the decimal range.
    #[error("amount out of range: {0}")]
    AmountOverflow(String),

    /// Invalid profile configuration.
    #[error("config error: {0}")]
    Config(String),

    /// An external pre-send check failed.
    #[error("pre-send check error: {0}")]
    PreSend(String),
}

/// Diagnostic severity. Only `Error` blocks sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// A single business-rule finding with rule code, field path and message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Rule code, namespaced by prefix (e.g. "BR-01", "BR-CO-10", "SG-GST-01").
    pub code: String,
    /// Dot-separated path to the offending field (e.g. "items[0].quantity").
    pub field: String,
    /// Human-readable description.
    pub message: String,
    pub severity: Severity,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.code, self.severity, self.field, self.message
        )
    }
}

impl Diagnostic {
    pub fn new(
        code: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            code: code.into(),
            field: field.into(),
            message: message.into(),
            severity,
        }
    }

    /// Error-severity diagnostic.
    pub fn error(
        code: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, field, message, Severity::Error)
    }

    /// Warning-severity diagnostic.
    pub fn warning(
        code: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, field, message, Severity::Warning)
    }

    pub fn info(
        code: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(code, field, message, Severity::Info)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Aggregated outcome of a validation pass.
///
/// Serializes as `{ isValid, canSend, errors, errorCount, warningCount, summary }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub can_send: bool,
    /// All diagnostics in rule-group order, regardless of severity.
    pub errors: Vec<Diagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
    pub summary: String,
}

impl ValidationResult {
    /// Derive counts, verdict and summary from a diagnostic list.
    pub fn from_diagnostics(diagnostics: Vec<Diagnostic>) -> Self {
        let error_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count();
        let warning_count = diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count();
        let ok = error_count == 0;
        Self {
            is_valid: ok,
            can_send: ok,
            summary: summarize(error_count, warning_count),
            errors: diagnostics,
            error_count,
            warning_count,
        }
    }

    /// Append diagnostics and recompute counts, verdict and summary.
    pub fn extend(&mut self, more: impl IntoIterator<Item = Diagnostic>) {
        let mut all = std::mem::take(&mut self.errors);
        all.extend(more);
        *self = Self::from_diagnostics(all);
    }

    /// Diagnostics with the given rule code.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.errors.iter().filter(move |d| d.code == code)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.with_code(code).next().is_some()
    }
}

fn summarize(errors: usize, warnings: usize) -> String {
    match (errors, warnings) {
        (0, 0) => "Invoice passed all checks and is ready to send".to_string(),
        (0, w) => format!("Invoice can be sent with {w} warning(s)"),
        (e, 0) => format!("Invoice cannot be sent: {e} error(s)"),
        (e, w) => format!("Invoice cannot be sent: {e} error(s), {w} warning(s)"),
    }
}
