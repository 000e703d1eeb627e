//! Diagnostics as plain values (§9 "Diagnostics as values"): every phase collects a
//! [`DiagnosticBag`] instead of aborting on the first problem. Errors are
//! `Display`-implementing structs returned in `Result`s rather than thrown.
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub lexeme: String,
    pub context_line: Option<String>,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            line,
            column,
            message: message.into(),
            lexeme: String::new(),
            context_line: None,
            suggestion: None,
        }
    }

    pub fn warning(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            line,
            column,
            message: message.into(),
            lexeme: String::new(),
            context_line: None,
            suggestion: None,
        }
    }

    pub fn with_lexeme(mut self, lexeme: impl Into<String>) -> Self {
        self.lexeme = lexeme.into();
        self
    }

    pub fn with_context_line(mut self, line: impl Into<String>) -> Self {
        self.context_line = Some(line.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Produces the wire format of §6: `Error [line L, column C]: message near 'lexeme'`,
/// with the "Aviso"/"Warning" analog for warnings, a caret-indicated context line when
/// present, and a trailing suggestion line when present.
impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "Error",
            Severity::Warning => "Aviso",
        };
        if self.lexeme.is_empty() {
            write!(
                f,
                "{} [line {}, column {}]: {}",
                prefix, self.line, self.column, self.message
            )?;
        } else {
            write!(
                f,
                "{} [line {}, column {}]: {} near '{}'",
                prefix, self.line, self.column, self.message, self.lexeme
            )?;
        }
        if let Some(context) = &self.context_line {
            write!(f, "\n    {}", context)?;
            write!(f, "\n    {}^", " ".repeat(self.column.saturating_sub(1)))?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Truly exceptional failures below the phase-level diagnostics: the file can't be
/// read, or the IR sink can't be written. Propagated with `?`, never `.unwrap()`'d.
#[derive(Debug)]
pub enum CompileError {
    Io(std::io::Error),
    CompilationFailed { errors: usize, warnings: usize },
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Io(err) => write!(f, "I/O error: {}", err),
            CompileError::CompilationFailed { errors, warnings } => write!(
                f,
                "compilation failed with {} error(s), {} warning(s)",
                errors, warnings
            ),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Io(err) => Some(err),
            CompileError::CompilationFailed { .. } => None,
        }
    }
}

impl From<std::io::Error> for CompileError {
    fn from(value: std::io::Error) -> Self {
        CompileError::Io(value)
    }
}
