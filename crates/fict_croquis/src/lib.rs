//! Croquis - semantic analysis for the Fict compiler.
//!
//! Quick sketches of meaning from the surface AST: the HIR builder, macro
//! recognition, the object-shape lattice, the reactive dependency graph,
//! reactive-scope and region inference, the semantic validator, and the
//! classification pass that assigns every binding its reactive kind.

pub mod analysis;
pub mod ast_util;
pub mod binder;
pub mod builtins;
pub mod classify;
pub mod graph;
pub mod hir;
pub mod macros;
pub mod regions;
pub mod shape;
pub mod validate;

pub use analysis::{analyze, AnalysisSummary};
pub use classify::classify;
pub use graph::{Cycle, DepGraph};
pub use hir::*;
pub use macros::{MacroKind, MacroRegistry};
pub use shape::{ShapeRecord, ShapeSource};
pub use validate::{validate, SemanticError};
