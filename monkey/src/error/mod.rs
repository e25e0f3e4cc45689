//! Error types and reporting

use crate::ast::Span;
use thiserror::Error;

/// Error raised before evaluation starts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Parser error at {span}: {message}")]
    Parser { message: String, span: Span },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl CompileError {
    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Parser { span, .. } => Some(*span),
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Parser { message, .. } => message,
            Self::Io { message } => message,
        }
    }
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &CompileError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = match error {
        CompileError::Parser { .. } => "Parser",
        CompileError::Io { .. } => "IO",
    };

    let report = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (filename, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((filename, span.start..span.end))
                    .with_message(error.message())
                    .with_color(Color::Red),
            )
            .finish()
    } else {
        Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{kind} error: {}", error.message()))
            .finish()
    };

    if report.eprint((filename, Source::from(source))).is_err() {
        eprintln!("{error}");
    }
}
