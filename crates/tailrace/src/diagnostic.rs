//! Data-quality diagnostics.
//!
//! Diagnostics never block an operation. They report what a load dropped
//! and which junction edges no longer sit on their host, so a user can fix
//! the diagram at their own pace.
//!
//! Codes are organized by phase:
//! - `W1xx` - Load warnings
//! - `W2xx` - Graph consistency warnings

use std::fmt;

use crate::model::ElementRef;

/// Diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // =========================================================================
    // Load Warnings (W1xx)
    // =========================================================================
    /// Edge dropped on load.
    ///
    /// The edge's `from`, or its non-junction `to`, named a node that is not
    /// in the file.
    W101,

    // =========================================================================
    // Consistency Warnings (W2xx)
    // =========================================================================
    /// Orphaned junction edge.
    ///
    /// The edge ends on a junction whose host edge no longer exists.
    W201,

    /// Junction drifted off its host.
    ///
    /// The host edge still exists but its path has moved away from the
    /// junction position, e.g. after one of its nodes was dragged.
    W202,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::W101 => "W101",
            Self::W201 => "W201",
            Self::W202 => "W202",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single warning, optionally pointing at the element concerned.
///
/// Every diagnostic is a warning; problems that make a diagram unusable are
/// errors, not diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    code: DiagnosticCode,
    message: String,
    element: Option<ElementRef>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            element: None,
        }
    }

    pub fn with_element(mut self, element: ElementRef) -> Self {
        self.element = Some(element);
        self
    }

    pub fn code(&self) -> DiagnosticCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The element this diagnostic is about. `None` when the element no
    /// longer exists, e.g. an edge dropped on load.
    pub fn element(&self) -> Option<&ElementRef> {
        self.element.as_ref()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning[{}]: {}", self.code, self.message)
    }
}
