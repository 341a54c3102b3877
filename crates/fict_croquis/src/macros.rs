//! Macro recognition.
//!
//! Scans top-level imports from the module literal `"fict"` and records
//! which local names refer to the binding macros. Aliasing a macro import is
//! a compile-time error; using a macro without importing it is rejected at
//! the call site.

use fict_carton::Span;
use fict_relief::ast::{ImportDecl, Module, Stmt};

/// The macro module specifier
pub const MACRO_MODULE: &str = "fict";

/// Binding macros recognized by the compiler
pub static MACRO_NAMES: &[&str] = &["$state", "$effect", "$memo"];

/// The kind of compiler macro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MacroKind {
    State = 0,
    Effect = 1,
    Memo = 2,
    /// `$store` is a runtime primitive, not a macro; it is tracked so shape
    /// analysis can mark its values as store-sourced
    Store = 3,
}

impl MacroKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "$state" => Some(Self::State),
            "$effect" => Some(Self::Effect),
            "$memo" => Some(Self::Memo),
            "$store" => Some(Self::Store),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::State => "$state",
            Self::Effect => "$effect",
            Self::Memo => "$memo",
            Self::Store => "$store",
        }
    }

    /// Whether this name must be imported (true macros; `$store` is an
    /// ordinary runtime import)
    #[inline]
    pub const fn is_macro(self) -> bool {
        !matches!(self, Self::Store)
    }
}

/// An aliased macro import (`import { $state as s }`), always an error.
#[derive(Debug, Clone)]
pub struct AliasedImport {
    pub kind: MacroKind,
    pub span: Span,
}

/// Which macros the module imported from `"fict"`.
#[derive(Debug, Clone, Default)]
pub struct MacroRegistry {
    state: bool,
    effect: bool,
    memo: bool,
    store: bool,
    /// Aliased macro imports found during the scan
    pub aliased: Vec<AliasedImport>,
}

impl MacroRegistry {
    /// Scan the module's top-level imports.
    pub fn from_module(module: &Module) -> Self {
        let mut registry = Self::default();
        for stmt in &module.body {
            if let Stmt::Import(import) = stmt {
                registry.record_import(import);
            }
        }
        registry
    }

    fn record_import(&mut self, import: &ImportDecl) {
        if import.source.value != MACRO_MODULE || import.type_only {
            return;
        }
        for spec in &import.named {
            let Some(kind) = MacroKind::from_name(&spec.imported) else {
                continue;
            };
            if kind.is_macro() && spec.is_aliased() {
                self.aliased.push(AliasedImport {
                    kind,
                    span: spec.span,
                });
                continue;
            }
            match kind {
                MacroKind::State => self.state = true,
                MacroKind::Effect => self.effect = true,
                MacroKind::Memo => self.memo = true,
                MacroKind::Store => self.store = true,
            }
        }
    }

    /// Resolve a call-site name to an imported macro.
    #[inline]
    pub fn resolve(&self, name: &str) -> Option<MacroKind> {
        let kind = MacroKind::from_name(name)?;
        if self.is_imported(kind) {
            Some(kind)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_imported(&self, kind: MacroKind) -> bool {
        match kind {
            MacroKind::State => self.state,
            MacroKind::Effect => self.effect,
            MacroKind::Memo => self.memo,
            MacroKind::Store => self.store,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fict_armature::parse_module;

    #[test]
    fn test_registry_from_imports() {
        let module = parse_module("import { $state, $effect } from 'fict';").unwrap();
        let registry = MacroRegistry::from_module(&module);
        assert!(registry.is_imported(MacroKind::State));
        assert!(registry.is_imported(MacroKind::Effect));
        assert!(!registry.is_imported(MacroKind::Memo));
        assert!(registry.aliased.is_empty());
        assert_eq!(registry.resolve("$state"), Some(MacroKind::State));
        assert_eq!(registry.resolve("$memo"), None);
    }

    #[test]
    fn test_aliased_import_detected() {
        let module = parse_module("import { $state as s } from 'fict';").unwrap();
        let registry = MacroRegistry::from_module(&module);
        assert_eq!(registry.aliased.len(), 1);
        assert_eq!(registry.aliased[0].kind, MacroKind::State);
        assert!(!registry.is_imported(MacroKind::State));
    }

    #[test]
    fn test_other_module_ignored() {
        let module = parse_module("import { $state } from 'other';").unwrap();
        let registry = MacroRegistry::from_module(&module);
        assert!(!registry.is_imported(MacroKind::State));
    }
}
