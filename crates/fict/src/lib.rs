//! # Fict
//!
//! Reactive-UI compiler: ingests a JavaScript/TypeScript-family surface
//! dialect extended with the `$state`/`$effect` binding macros and JSX, and
//! emits code expressed entirely in terms of a small runtime of signal,
//! memo, effect and DOM-binding primitives.
//!
//! ```
//! use fict::{transform, CompilerOptions};
//!
//! let source = "import { $state } from 'fict';\nlet count = $state(0);\ncount++;";
//! let output = transform(source, &CompilerOptions::default()).unwrap();
//! assert!(output.code.contains("__fictUseSignal(__fictCtx, 0"));
//! assert!(output.code.contains("count(count() + 1)"));
//! ```
//!
//! ## Crates
//!
//! - [`carton`] - spans, line index, shared utilities
//! - [`relief`] - surface AST, options, diagnostics
//! - [`armature`] - lexer and parser for the surface dialect
//! - [`croquis`] - semantic analysis, shapes, regions, classification
//! - [`atelier`] - lowering, optimization and code generation

use fict_carton::LineIndex;
use fict_relief::diagnostics::{RawDiagnostic, Severity, Warning};
use fict_relief::options::WarnLevel;

/// Spans, line index, shared utilities.
pub use fict_carton as carton;

/// Surface AST, options, diagnostics.
pub use fict_relief as relief;

/// Lexer and parser for the surface dialect.
pub use fict_armature as armature;

/// Semantic analysis: HIR, shapes, regions, classification.
pub use fict_croquis as croquis;

/// Lowering, optimization and code generation.
pub use fict_atelier as atelier;

pub use fict_relief::diagnostics::{CompileError, WarningCode};
pub use fict_relief::options::{CompilerOptions, OptimizeLevel, WarningsAsErrors};

/// Result of a successful transform.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// The emitted module
    pub code: String,
    /// Diagnostics surviving the severity policy, in source order
    pub warnings: Vec<Warning>,
}

/// Compile one module. Semantic violations and policy-promoted warnings
/// return an error; everything else lands in `TransformOutput::warnings`.
pub fn transform(source: &str, options: &CompilerOptions) -> Result<TransformOutput, CompileError> {
    transform_with(source, options, |_| {})
}

/// Like [`transform`], streaming each warning to `sink` as it is resolved.
pub fn transform_with(
    source: &str,
    options: &CompilerOptions,
    mut sink: impl FnMut(&Warning),
) -> Result<TransformOutput, CompileError> {
    let line_index = LineIndex::new(source);

    let mut module = fict_armature::parse_module(source).map_err(|e| {
        let pos = line_index.position(e.offset);
        CompileError::Parse {
            message: e.message,
            line: pos.line,
            column: pos.column,
        }
    })?;

    if options.optimize {
        fict_atelier::fold_module(&mut module, options.optimize_level);
    }

    let mut summary = fict_croquis::analyze(&module, options);

    if let Err(error) = fict_croquis::validate(&summary) {
        let pos = line_index.position(error.span.start);
        return Err(CompileError::Semantic {
            message: error.message,
            line: pos.line,
            column: pos.column,
        });
    }

    fict_croquis::classify(&mut summary.bindings, &summary.functions, options);

    if options.optimize {
        fict_atelier::apply_cse(&mut module, &summary);
    }

    let code = fict_atelier::generate(&module, &summary, options, source);

    let warnings = resolve_warnings(&summary.diagnostics, options, &line_index, &mut sink)?;

    Ok(TransformOutput { code, warnings })
}

/// Apply the severity policy and position each surviving diagnostic.
fn resolve_warnings(
    diagnostics: &[RawDiagnostic],
    options: &CompilerOptions,
    line_index: &LineIndex,
    sink: &mut impl FnMut(&Warning),
) -> Result<Vec<Warning>, CompileError> {
    let mut sorted: Vec<&RawDiagnostic> = diagnostics.iter().collect();
    sorted.sort_by_key(|d| d.span.start);

    let mut warnings = Vec::new();
    for diagnostic in sorted {
        let level = options.level_for(diagnostic.code);
        if level == WarnLevel::Off {
            continue;
        }
        let pos = line_index.position(diagnostic.span.start);
        let line = pos.line.max(1);
        let column = pos.column.max(1);
        if level == WarnLevel::Error {
            return Err(CompileError::WarningAsError {
                code: diagnostic.code.as_str(),
                message: diagnostic.message.clone(),
                line,
                column,
            });
        }
        let warning = Warning {
            code: diagnostic.code.as_str(),
            message: diagnostic.message.clone(),
            line,
            column,
            level: Severity::Warning,
            hint: diagnostic.hint.clone(),
        };
        sink(&warning);
        warnings.push(warning);
    }
    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_smoke() {
        let output = transform(
            "import { $state } from 'fict';\nlet count = $state(0);\nconst doubled = count * 2;\nexport { doubled };",
            &CompilerOptions::default(),
        )
        .unwrap();
        assert!(output.code.contains("__fictUseSignal(__fictCtx, 0"));
        assert!(output.code.contains("__fictUseMemo(__fictCtx, () => count() * 2"));
    }

    #[test]
    fn test_parse_error_positions() {
        let err = transform("let = ;", &CompilerOptions::default()).unwrap_err();
        let (line, column) = err.position();
        assert_eq!(line, 1);
        assert!(column > 1);
    }
}
