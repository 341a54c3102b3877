//! Compiler options.

use fict_carton::CompactString;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::diagnostics::WarningCode;

/// Optimization aggressiveness.
///
/// `Safe` (the default) applies only rewrites valid for every JS value;
/// `Full` additionally applies algebraic identities that assume numeric,
/// finite operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeLevel {
    #[default]
    Safe,
    Full,
}

/// Per-code warning severity override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarnLevel {
    Off,
    Warn,
    Error,
}

/// Warning promotion policy: everything, nothing, or a code list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WarningsAsErrors {
    Enabled(bool),
    Codes(Vec<CompactString>),
}

impl Default for WarningsAsErrors {
    fn default() -> Self {
        WarningsAsErrors::Enabled(false)
    }
}

impl WarningsAsErrors {
    /// Whether the policy promotes this code to an error.
    pub fn promotes(&self, code: WarningCode) -> bool {
        match self {
            WarningsAsErrors::Enabled(enabled) => *enabled,
            WarningsAsErrors::Codes(codes) => codes.iter().any(|c| c.as_str() == code.as_str()),
        }
    }
}

/// Options accepted by `transform`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    /// Enables dev-only warnings and cycle diagnostics
    pub dev: bool,
    /// Use template + fine-grained bindings; else VDOM `jsx` calls
    pub fine_grained_dom: bool,
    /// Enable the optimizer
    pub optimize: bool,
    /// Gate non-numeric-safe algebraic simplifications
    pub optimize_level: OptimizeLevel,
    /// Inline single-use memos
    pub inline_derived_memos: bool,
    /// Produce lazy region accessors
    pub lazy_conditional: bool,
    /// Cache memo accessors within sync bodies
    pub getter_cache: bool,
    /// Additional function names whose first-argument callback is a
    /// reactive scope
    pub reactive_scopes: Vec<CompactString>,
    /// Per-code severity override, keyed by code string (`"FICT-J002"`)
    pub warning_levels: FxHashMap<CompactString, WarnLevel>,
    /// Promotion policy
    pub warnings_as_errors: WarningsAsErrors,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            dev: true,
            fine_grained_dom: true,
            optimize: false,
            optimize_level: OptimizeLevel::Safe,
            inline_derived_memos: false,
            lazy_conditional: false,
            getter_cache: false,
            reactive_scopes: Vec::new(),
            warning_levels: FxHashMap::default(),
            warnings_as_errors: WarningsAsErrors::default(),
        }
    }
}

impl CompilerOptions {
    /// Resolve the effective severity for a code: per-code override first,
    /// then the promotion policy, then the default `Warn`.
    pub fn level_for(&self, code: WarningCode) -> WarnLevel {
        if let Some(level) = self.warning_levels.get(code.as_str()) {
            return *level;
        }
        if self.warnings_as_errors.promotes(code) {
            return WarnLevel::Error;
        }
        WarnLevel::Warn
    }

    /// Whether a call name is configured as a reactive-scope host.
    pub fn is_reactive_scope_call(&self, name: &str) -> bool {
        self.reactive_scopes.iter().any(|s| s.as_str() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = CompilerOptions::default();
        assert!(opts.dev);
        assert!(opts.fine_grained_dom);
        assert!(!opts.optimize);
        assert_eq!(opts.optimize_level, OptimizeLevel::Safe);
        assert_eq!(opts.level_for(WarningCode::ListWithoutKey), WarnLevel::Warn);
    }

    #[test]
    fn test_warning_level_override() {
        let mut opts = CompilerOptions::default();
        opts.warning_levels
            .insert("FICT-J002".into(), WarnLevel::Off);
        assert_eq!(opts.level_for(WarningCode::ListWithoutKey), WarnLevel::Off);
    }

    #[test]
    fn test_warnings_as_errors_list() {
        let mut opts = CompilerOptions::default();
        opts.warnings_as_errors = WarningsAsErrors::Codes(vec!["FICT-E001".into()]);
        assert_eq!(
            opts.level_for(WarningCode::EffectWithoutDeps),
            WarnLevel::Error
        );
        assert_eq!(opts.level_for(WarningCode::ListWithoutKey), WarnLevel::Warn);
    }

    #[test]
    fn test_options_from_json() {
        let opts: CompilerOptions = serde_json::from_str(
            r#"{ "optimize": true, "optimizeLevel": "full", "reactiveScopes": ["renderHook"] }"#,
        )
        .unwrap();
        assert!(opts.optimize);
        assert_eq!(opts.optimize_level, OptimizeLevel::Full);
        assert!(opts.is_reactive_scope_call("renderHook"));
    }
}
