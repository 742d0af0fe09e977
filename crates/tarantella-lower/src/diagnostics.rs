//! Diagnostic collection and ariadne rendering for lowering errors.
//!
//! Failed conversions are reported into a [`Diagnostics`] sink and the
//! compilation unit carries on. Rendering is separate from collection so a
//! driver can print, snapshot, or serialize the same diagnostics.

use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use serde::Serialize;

use crate::error::LowerError;

// ── Sink ───────────────────────────────────────────────────────────────

/// Lowering only reports errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// One reported failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub error: LowerError,
}

impl Diagnostic {
    /// The formatted message, as shown to the user.
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}

/// Accumulates diagnostics for a compilation unit, in report order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a failed conversion at error severity.
    pub fn report(&mut self, error: LowerError) {
        tracing::debug!(code = error_code(&error), %error, "lowering error reported");
        self.items.push(Diagnostic {
            severity: Severity::Error,
            error,
        });
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn errors(&self) -> impl Iterator<Item = &LowerError> {
        self.items.iter().map(|d| &d.error)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render every diagnostic against the unit's source.
    pub fn render_all(&self, source: &str, filename: &str, options: &DiagnosticOptions) -> Vec<String> {
        self.items
            .iter()
            .map(|d| render_diagnostic(d, source, filename, options))
            .collect()
    }
}

// ── Rendering ──────────────────────────────────────────────────────────

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticOptions {
    pub color: bool,
    /// Emit one JSON object per diagnostic instead of an ariadne report.
    pub json: bool,
}

impl Default for DiagnosticOptions {
    fn default() -> Self {
        DiagnosticOptions {
            color: true,
            json: false,
        }
    }
}

impl DiagnosticOptions {
    /// Plain text for tests and piped output.
    pub fn colorless() -> Self {
        DiagnosticOptions {
            color: false,
            json: false,
        }
    }

    pub fn json_mode() -> Self {
        DiagnosticOptions {
            color: false,
            json: true,
        }
    }
}

/// The stable code for each error kind.
pub fn error_code(err: &LowerError) -> &'static str {
    match err {
        LowerError::NotUsableFromScript { .. } => "L0001",
        LowerError::IncompatibleParamsExpansion { .. } => "L0002",
        LowerError::Internal { .. } => "L9999",
    }
}

fn text_range_to_range(range: rowan::TextRange) -> Range<usize> {
    let start: usize = range.start().into();
    let end: usize = range.end().into();
    start..end
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    code: &'static str,
    severity: Severity,
    message: String,
    file: &'a str,
    start: usize,
    end: usize,
}

/// Render one diagnostic.
pub fn render_diagnostic(
    diagnostic: &Diagnostic,
    source: &str,
    filename: &str,
    options: &DiagnosticOptions,
) -> String {
    let error = &diagnostic.error;
    let code = error_code(error);
    let source_len = source.len();

    // Clamp to the source and keep at least one character for ariadne.
    let clamp = |r: Range<usize>| -> Range<usize> {
        let s = r.start.min(source_len);
        let e = r.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };
    let range = clamp(text_range_to_range(error.span()));

    if options.json {
        let json = JsonDiagnostic {
            code,
            severity: diagnostic.severity,
            message: error.to_string(),
            file: filename,
            start: range.start,
            end: range.end,
        };
        return serde_json::to_string(&json).unwrap_or_default();
    }

    let kind = ReportKind::Error;
    let config = Config::default().with_color(options.color);
    let msg = error.to_string();

    let report = match error {
        LowerError::NotUsableFromScript { member, .. } => Report::build(kind, range.clone())
            .with_code(code)
            .with_message(&msg)
            .with_config(config)
            .with_label(
                Label::new(range)
                    .with_message(format!("`{}` has no script counterpart", member))
                    .with_color(Color::Red),
            )
            .finish(),

        LowerError::IncompatibleParamsExpansion { delegate, .. } => {
            Report::build(kind, range.clone())
                .with_code(code)
                .with_message(&msg)
                .with_config(config)
                .with_label(
                    Label::new(range)
                        .with_message(format!("converted to `{}` here", delegate))
                        .with_color(Color::Red),
                )
                .with_help("use a delegate type that expands param arrays, or a wrapping lambda")
                .finish()
        }

        LowerError::Internal { .. } => Report::build(kind, range.clone())
            .with_code(code)
            .with_message(&msg)
            .with_config(config)
            .with_label(Label::new(range).with_color(Color::Red))
            .with_note("this conversion should have been rejected by overload resolution")
            .finish(),
    };

    let mut buf = Vec::new();
    if report.write(Source::from(source), &mut buf).is_err() {
        return format!("[{}] {}", code, msg);
    }
    String::from_utf8_lossy(&buf).into_owned()
}
