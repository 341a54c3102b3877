//! Diagnostic types: warning codes, warnings, and compile errors.
//!
//! Warnings carry stable codes so hosts can configure per-code severity;
//! errors halt the compilation and surface line/column into the source.

use fict_carton::Span;
use serde::Serialize;
use thiserror::Error;

/// Stable warning codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum WarningCode {
    /// Direct mutation of a nested property on a reactive object
    DeepMutation = 0,
    /// Side effect inside a `$memo` body
    MemoSideEffect = 1,
    /// Dynamic property access widens the dependency
    DynamicAccess = 2,
    /// Signal passed as a function argument without dereferencing
    SignalAsArgument = 3,
    /// List `map` without a `key` attribute
    ListWithoutKey = 4,
    /// Component defined inside another component
    NestedComponent = 5,
    /// Component has no `return`
    ComponentWithoutReturn = 6,
    /// `$effect` body has no reactive reads
    EffectWithoutDeps = 7,
}

impl WarningCode {
    pub const ALL: [WarningCode; 8] = [
        WarningCode::DeepMutation,
        WarningCode::MemoSideEffect,
        WarningCode::DynamicAccess,
        WarningCode::SignalAsArgument,
        WarningCode::ListWithoutKey,
        WarningCode::NestedComponent,
        WarningCode::ComponentWithoutReturn,
        WarningCode::EffectWithoutDeps,
    ];

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            WarningCode::DeepMutation => "FICT-M",
            WarningCode::MemoSideEffect => "FICT-M003",
            WarningCode::DynamicAccess => "FICT-H",
            WarningCode::SignalAsArgument => "FICT-S002",
            WarningCode::ListWithoutKey => "FICT-J002",
            WarningCode::NestedComponent => "FICT-C003",
            WarningCode::ComponentWithoutReturn => "FICT-C004",
            WarningCode::EffectWithoutDeps => "FICT-E001",
        }
    }

    pub fn from_str(code: &str) -> Option<Self> {
        match code {
            "FICT-M" => Some(WarningCode::DeepMutation),
            "FICT-M003" => Some(WarningCode::MemoSideEffect),
            "FICT-H" => Some(WarningCode::DynamicAccess),
            "FICT-S002" => Some(WarningCode::SignalAsArgument),
            "FICT-J002" => Some(WarningCode::ListWithoutKey),
            "FICT-C003" => Some(WarningCode::NestedComponent),
            "FICT-C004" => Some(WarningCode::ComponentWithoutReturn),
            "FICT-E001" => Some(WarningCode::EffectWithoutDeps),
            _ => None,
        }
    }
}

/// Warning severity after policy resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// A compiler warning delivered to the host.
#[derive(Debug, Clone, Serialize)]
pub struct Warning {
    /// Stable code string, e.g. `FICT-J002`
    pub code: &'static str,
    pub message: String,
    /// 1-indexed source line
    pub line: u32,
    /// 1-indexed source column
    pub column: u32,
    pub level: Severity,
    /// Optional remediation hint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Fatal compilation error.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("parse error at {line}:{column}: {message}")]
    Parse {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("{message} ({line}:{column})")]
    Semantic {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("Fict warning treated as error: [{code}] {message} ({line}:{column})")]
    WarningAsError {
        code: &'static str,
        message: String,
        line: u32,
        column: u32,
    },
}

impl CompileError {
    pub fn semantic(message: impl Into<String>, line: u32, column: u32) -> Self {
        CompileError::Semantic {
            message: message.into(),
            line,
            column,
        }
    }

    /// The source position the error points at.
    pub fn position(&self) -> (u32, u32) {
        match self {
            CompileError::Parse { line, column, .. }
            | CompileError::Semantic { line, column, .. }
            | CompileError::WarningAsError { line, column, .. } => (*line, *column),
        }
    }
}

/// A not-yet-positioned diagnostic raised inside a pass.
///
/// Passes report spans; the facade resolves them to line/column through the
/// compilation's `LineIndex` when building the public `Warning`/`CompileError`.
#[derive(Debug, Clone)]
pub struct RawDiagnostic {
    pub code: WarningCode,
    pub message: String,
    pub span: Span,
    pub hint: Option<String>,
}

impl RawDiagnostic {
    pub fn new(code: WarningCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_round_trip() {
        for code in WarningCode::ALL {
            assert_eq!(WarningCode::from_str(code.as_str()), Some(code));
        }
        assert_eq!(WarningCode::from_str("FICT-X999"), None);
    }

    #[test]
    fn test_warning_as_error_message_prefix() {
        let err = CompileError::WarningAsError {
            code: "FICT-J002",
            message: "list rendered without a key".into(),
            line: 3,
            column: 7,
        };
        assert!(err
            .to_string()
            .starts_with("Fict warning treated as error"));
    }
}
