//! Relief - the surface layer of the Fict compiler.
//!
//! Defines the AST for the Fict surface dialect (JS/TS + JSX + binding
//! macros), the compiler options, and the diagnostic types shared by every
//! downstream pass.

pub mod ast;
pub mod diagnostics;
pub mod options;

pub use ast::*;
pub use diagnostics::{CompileError, RawDiagnostic, Severity, Warning, WarningCode};
pub use options::{CompilerOptions, OptimizeLevel, WarnLevel, WarningsAsErrors};
