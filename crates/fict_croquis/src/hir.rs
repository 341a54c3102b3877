//! High-level IR: function, block and binding arenas.
//!
//! The HIR is an index arena over the surface AST: the binder partitions the
//! module into functions and lexical blocks, records every binding with its
//! use-site profile, and resolves identifier occurrences to `BindingId`s.
//! Later passes (shape, regions, classification, lowering) work against these
//! tables instead of re-walking scopes.

use compact_str::CompactString;
use fict_carton::{bitflags, Span};
use fict_relief::ast::Expr;

/// Unique identifier for a function (the module body is function 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FunctionId(u32);

impl FunctionId {
    /// The synthetic module-body function
    pub const MODULE: Self = Self(0);

    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for a lexical block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BindingId(u32);

impl BindingId {
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique identifier for a region memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct RegionId(u32);

impl RegionId {
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of function body this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FunctionKind {
    /// The module top level
    Module = 0,
    /// Top-level initial-capital function
    Component = 1,
    /// Top-level `useX` function
    Hook = 2,
    /// First-argument callback of a configured reactive-scope call
    ReactiveCallback = 3,
    /// Any other function
    Plain = 4,
}

impl FunctionKind {
    /// Reactive scopes may call `$state` / `$effect` at top level and emit a
    /// hook-context bracket.
    #[inline]
    pub const fn is_reactive_scope(self) -> bool {
        !matches!(self, FunctionKind::Plain)
    }
}

/// One function body (the module body included).
#[derive(Debug, Clone)]
pub struct HirFunction {
    pub id: FunctionId,
    pub parent: Option<FunctionId>,
    pub name: Option<CompactString>,
    pub kind: FunctionKind,
    pub is_async: bool,
    pub span: Span,
    /// Entry lexical block
    pub entry_block: BlockId,
    /// Bindings declared anywhere inside this function
    pub bindings: Vec<BindingId>,
    /// Whether any `return` statement exists in the body
    pub has_return: bool,
    /// Whether any return argument is a JSX element/fragment
    pub has_jsx_return: bool,
}

impl HirFunction {
    #[inline]
    pub fn is_reactive_scope(&self) -> bool {
        self.kind.is_reactive_scope()
    }

    /// Components are initial-capital top-level functions.
    #[inline]
    pub fn is_component(&self) -> bool {
        matches!(self.kind, FunctionKind::Component)
    }
}

/// One lexical block (function body, branch arm, loop body, switch case).
#[derive(Debug, Clone)]
pub struct HirBlock {
    pub id: BlockId,
    pub function: FunctionId,
    pub parent: Option<BlockId>,
    pub span: Span,
}

bitflags! {
    /// Use-site profile over all occurrences of a binding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct UseProfile: u16 {
        /// Read anywhere in a value position
        const READ = 1 << 0;
        /// Read in a JSX child position
        const JSX_CHILD = 1 << 1;
        /// Read in a JSX attribute (other than `key`)
        const JSX_ATTR = 1 << 2;
        /// Read inside an event handler
        const EVENT_HANDLER = 1 << 3;
        /// Read inside a `$effect` body
        const EFFECT_BODY = 1 << 4;
        /// Read inside a nested closure that escapes (returned/stored)
        const CLOSURE_ESCAPE = 1 << 5;
        /// Target of an assignment or update after declaration
        const REASSIGNED = 1 << 6;
        /// Named in an export
        const EXPORTED = 1 << 7;
        /// Passed as an argument to an opaque callee
        const OPAQUE_ARG = 1 << 8;
        /// Read in a JSX `key` attribute
        const JSX_KEY = 1 << 9;
    }
}

impl Default for UseProfile {
    fn default() -> Self {
        Self::empty()
    }
}

impl UseProfile {
    /// Use sites that force a derived binding to be memoized.
    #[inline]
    pub fn forces_memo(self) -> bool {
        self.intersects(
            UseProfile::JSX_CHILD
                | UseProfile::JSX_ATTR
                | UseProfile::EFFECT_BODY
                | UseProfile::CLOSURE_ESCAPE
                | UseProfile::EXPORTED,
        )
    }

    /// Use sites that keep a memo alive through reactive-graph DCE.
    #[inline]
    pub fn is_dce_root(self) -> bool {
        self.intersects(
            UseProfile::JSX_CHILD
                | UseProfile::JSX_ATTR
                | UseProfile::EVENT_HANDLER
                | UseProfile::EFFECT_BODY
                | UseProfile::CLOSURE_ESCAPE
                | UseProfile::EXPORTED,
        )
    }
}

/// Reactive kind assigned by classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ReactiveKind {
    /// Backed by `__fictUseSignal`; the identifier is an accessor
    Signal = 0,
    /// Backed by `__fictUseMemo`
    Memo = 1,
    /// One field of a region memo tuple
    RegionMemoField = 2,
    /// No storage; initializer substituted at each use site
    InlinedDerived = 3,
    /// Snapshot of a reactive source's current value
    CapturedValue = 4,
    /// Destructured component prop, compiled to `useProp`
    PropAccessor = 5,
    /// Unreactive
    #[default]
    Plain = 6,
}

impl ReactiveKind {
    /// Whether a read of this binding is rewritten to an accessor call.
    #[inline]
    pub const fn reads_as_call(self) -> bool {
        matches!(
            self,
            ReactiveKind::Signal | ReactiveKind::Memo | ReactiveKind::PropAccessor
        )
    }
}

/// How a binding was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DeclForm {
    /// `let x` / `const x` with a bare identifier
    Single = 0,
    /// Bound by an object destructuring pattern
    ObjectPattern = 1,
    /// Bound by an array destructuring pattern
    ArrayPattern = 2,
    /// Function parameter
    Param = 3,
    /// `function f() {}`
    Function = 4,
    /// Import specifier
    Import = 5,
    /// `catch (e)`
    CatchParam = 6,
    /// `for (const x of …)` / `for (const x in …)` head
    LoopHead = 7,
    /// Class declaration
    Class = 8,
}

/// A named introduction of a value.
#[derive(Debug, Clone)]
pub struct BindingRecord {
    pub id: BindingId,
    pub name: CompactString,
    /// Span of the declaring identifier
    pub span: Span,
    pub function: FunctionId,
    pub block: BlockId,
    pub decl_form: DeclForm,
    /// `let` / `var` (reassignable) vs `const`
    pub mutable: bool,
    pub kind: ReactiveKind,
    pub profile: UseProfile,
    /// Number of read sites
    pub read_count: u32,

    /// Initializer is a `$state(…)` call
    pub is_state_macro: bool,
    /// Initializer is an explicit `$memo(…)` call
    pub is_explicit_memo: bool,
    /// Initializer is a `$store(…)` call
    pub is_store: bool,
    /// Initializer is a bare reference to a Signal binding (alias)
    pub alias_of: Option<BindingId>,
    /// Bound by destructuring a Signal binding (each field reads
    /// `signal().field`)
    pub destructured_from: Option<BindingId>,
    /// Property key (or array index) this binding took from the
    /// destructured source
    pub destructure_key: Option<CompactString>,
    /// Component prop field: access path from `__props` plus default
    pub prop_path: Option<PropPath>,

    /// Reactive dependencies of the initializer (signals / derived bindings)
    pub deps: Vec<BindingId>,
    /// Initializer is side-effect-free
    pub init_pure: bool,
    /// Cloned initializer, kept for memo/inline/region emission
    pub init: Option<Expr>,

    /// Region membership for grouped derived values
    pub region: Option<RegionId>,
}

impl BindingRecord {
    /// Whether the initializer mentions at least one reactive source,
    /// making this a derived-value candidate.
    #[inline]
    pub fn is_derived_candidate(&self) -> bool {
        !self.deps.is_empty() && !self.is_state_macro
    }
}

/// Access path for a destructured component prop.
#[derive(Debug, Clone)]
pub struct PropPath {
    /// Member path from the props object (`["profile", "name"]`)
    pub path: Vec<CompactString>,
    /// Defaults applying at each path segment, innermost last; rendered as
    /// `??` fallbacks during lowering
    pub defaults: Vec<Option<Expr>>,
}

/// Where a region memo's body comes from.
#[derive(Debug, Clone)]
pub enum RegionBody {
    /// A group of co-dependent derived declarations
    DerivedGroup,
    /// A branch-assigned `let` folded into a memo: the declaration plus the
    /// single `if`/`switch` that assigns it
    Branch {
        /// Span of the branching statement consumed by the region
        branch_span: Span,
    },
}

/// A region memo grouping co-dependent derived values.
#[derive(Debug, Clone)]
pub struct Region {
    pub id: RegionId,
    pub function: FunctionId,
    pub block: BlockId,
    /// Fields in declaration order
    pub fields: Vec<BindingId>,
    pub body: RegionBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_profile_flags() {
        let mut profile = UseProfile::default();
        profile |= UseProfile::READ | UseProfile::JSX_CHILD;
        assert!(profile.forces_memo());
        assert!(profile.is_dce_root());

        let handler_only = UseProfile::READ | UseProfile::EVENT_HANDLER;
        assert!(!handler_only.forces_memo());
        assert!(handler_only.is_dce_root());
    }

    #[test]
    fn test_reactive_kind_reads() {
        assert!(ReactiveKind::Signal.reads_as_call());
        assert!(ReactiveKind::Memo.reads_as_call());
        assert!(!ReactiveKind::CapturedValue.reads_as_call());
        assert!(!ReactiveKind::Plain.reads_as_call());
    }

    #[test]
    fn test_function_kind() {
        assert!(FunctionKind::Module.is_reactive_scope());
        assert!(FunctionKind::Component.is_reactive_scope());
        assert!(!FunctionKind::Plain.is_reactive_scope());
    }
}
