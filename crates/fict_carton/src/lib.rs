//! Carton - the shared toolbox for the Fict compiler.
//!
//! This crate provides the foundational utilities used by every other Fict
//! crate: source spans and line/column mapping, JavaScript string escaping,
//! and re-exports of the common utility stack.
//!
//! # Example
//!
//! ```
//! use fict_carton::LineIndex;
//!
//! let index = LineIndex::new("let a = 1;\nlet b = 2;");
//! let pos = index.position(12);
//! assert_eq!(pos.line, 2);
//! assert_eq!(pos.column, 2);
//! ```

pub mod js_string;
pub mod span;

pub use js_string::{escape_js_string, escape_template_string};
pub use span::{LineIndex, Position, Span};

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

// Re-export once_cell for lazily-built statics
pub use once_cell::sync::Lazy;
