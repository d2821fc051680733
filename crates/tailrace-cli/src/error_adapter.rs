//! Adapters for rendering Tailrace errors and warnings with miette.
//!
//! The library reports plain [`TailraceError`] values and
//! [`tailrace::diagnostic::Diagnostic`] warnings; this module gives both a
//! stable code and, where one helps, a hint for fixing the file.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, Severity};

use tailrace::{
    ParseError, TailraceError,
    diagnostic::{Diagnostic, DiagnosticCode},
};

/// Adapter for a single load or consistency warning.
pub struct DiagnosticAdapter<'a>(pub &'a Diagnostic);

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DiagnosticAdapter").field(&self.0).finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.message())
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.0.code()))
    }

    fn severity(&self) -> Option<Severity> {
        Some(Severity::Warning)
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0.code() {
            DiagnosticCode::W101 => {
                "restore the missing node or point the edge at an existing one, then save again"
            }
            DiagnosticCode::W201 => "redraw the edge onto an existing edge or a node",
            DiagnosticCode::W202 => "move the junction back onto its host edge",
        };
        Some(Box::new(help))
    }
}

/// Adapter for [`TailraceError`].
pub struct ErrorAdapter<'a>(pub &'a TailraceError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self.0 {
            TailraceError::Io(_) => "tailrace::io",
            TailraceError::Parse(err) => match err {
                ParseError::Json(_) => "tailrace::parse::json",
                ParseError::InvalidNode { .. } => "tailrace::parse::node",
                ParseError::InvalidEdge { .. } => "tailrace::parse::edge",
                ParseError::InvalidZone { .. } => "tailrace::parse::zone",
                ParseError::DuplicateNodeId(_) | ParseError::DuplicateEdgeId(_) => {
                    "tailrace::parse::duplicate_id"
                }
            },
            TailraceError::Model(_) => "tailrace::model",
            TailraceError::Validation(_) => "tailrace::validation",
            TailraceError::Drawing(_) => "tailrace::drawing",
            TailraceError::Config(_) => "tailrace::config",
            TailraceError::Export(_) => "tailrace::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self.0 {
            TailraceError::Parse(ParseError::Json(_)) => {
                "a diagram file is a JSON object with `nodes` and `edges` arrays"
            }
            TailraceError::Parse(ParseError::DuplicateNodeId(_) | ParseError::DuplicateEdgeId(_)) => {
                "node ids and edge ids must each be unique within a file"
            }
            TailraceError::Config(_) => {
                "check the file given with --config, or tailrace/config.toml"
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}

/// A warning or error that can be rendered by miette.
#[derive(Debug)]
pub enum Reportable<'a> {
    /// A load or consistency warning.
    Diagnostic(DiagnosticAdapter<'a>),
    /// A failed operation.
    Error(ErrorAdapter<'a>),
}

impl fmt::Display for Reportable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reportable::Diagnostic(d) => fmt::Display::fmt(d, f),
            Reportable::Error(e) => fmt::Display::fmt(e, f),
        }
    }
}

impl std::error::Error for Reportable<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Reportable::Diagnostic(_) => None,
            Reportable::Error(e) => e.source(),
        }
    }
}

impl MietteDiagnostic for Reportable<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.code(),
            Reportable::Error(e) => e.code(),
        }
    }

    fn severity(&self) -> Option<Severity> {
        match self {
            Reportable::Diagnostic(d) => d.severity(),
            Reportable::Error(e) => e.severity(),
        }
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        match self {
            Reportable::Diagnostic(d) => d.help(),
            Reportable::Error(e) => e.help(),
        }
    }
}

/// Wraps warnings for rendering, in their original order.
pub fn diagnostics_to_reportables(diagnostics: &[Diagnostic]) -> Vec<Reportable<'_>> {
    diagnostics
        .iter()
        .map(|d| Reportable::Diagnostic(DiagnosticAdapter(d)))
        .collect()
}

/// Convert a [`TailraceError`] into a list of reportable errors.
pub fn to_reportables(err: &TailraceError) -> Vec<Reportable<'_>> {
    vec![Reportable::Error(ErrorAdapter(err))]
}
