//! Code generation context.
//!
//! A byte-buffer emitter with indent tracking, runtime-helper registration
//! (the import preamble is assembled after the body, once the used set is
//! known), hook-slot counters, and the per-function state the reactive
//! rewrites need.

use fict_carton::{FxHashMap, FxHashSet};
use fict_croquis::{AnalysisSummary, BindingId, RegionId};
use fict_relief::options::CompilerOptions;

/// Runtime module the fine-grained helpers are imported from.
pub const RUNTIME_MODULE: &str = "fict/runtime";
/// Runtime module the VDOM helpers are imported from.
pub const JSX_RUNTIME_MODULE: &str = "fict/jsx-runtime";

/// Per-function emission state.
#[derive(Debug, Default)]
pub struct FunctionFrame {
    /// Next hook slot id, in declaration order
    pub next_slot: u32,
    /// Memo accessors cached as locals within this sync body
    pub getter_cache: FxHashMap<BindingId, String>,
    /// Memos whose cache declaration still has to be emitted after their
    /// own declaration statement
    pub pending_cache: FxHashSet<BindingId>,
}

pub struct CodegenContext<'a> {
    pub source: &'a str,
    pub summary: &'a AnalysisSummary,
    pub options: &'a CompilerOptions,

    /// Generated code buffer (bytes)
    code: Vec<u8>,
    indent_level: u32,

    /// Runtime helpers referenced by the emitted code
    pub used_helpers: FxHashSet<&'static str>,
    /// Hoisted template HTML, emitted as `_tmpl$N` declarations
    pub templates: Vec<String>,

    /// One frame per reactive-scope nesting level (module at the bottom)
    pub frames: Vec<FunctionFrame>,
    /// Whether any module-level hook was emitted
    pub module_ctx_used: bool,

    /// Region memo naming: raw region id -> (name, slot)
    pub region_names: FxHashMap<u32, (String, u32)>,
    region_counter: u32,
    /// Statements consumed into a branch-region memo (by span start)
    pub consumed_stmts: FxHashSet<u32>,
    /// While emitting a region memo body, its fields stay plain locals
    pub region_inline: Option<RegionId>,

    /// Selector hoists flushed into the current function prologue
    pub pending_selectors: Vec<String>,
    /// Selector key (source text of the selected accessor) -> name
    pub selector_names: FxHashMap<String, String>,
    selector_counter: u32,

    /// Memos eliminated by reactive-graph DCE
    pub eliminated: FxHashSet<BindingId>,

    /// Binding whose initializer is being emitted (self-reads stay raw)
    pub current_decl: Option<BindingId>,
    /// Region fields whose declarations were already folded into an
    /// emitted region memo
    pub emitted_region_fields: FxHashSet<BindingId>,
    /// Non-zero while emitting a nested function/thunk body; the getter
    /// cache never crosses function boundaries
    pub suspend_getter_cache: u32,
    /// Inside a keyed list render: (key expression source, key param name)
    pub current_key: Option<(String, String)>,
    /// Branch statements consumed by branch regions, cloned for emission
    /// inside the region memo body (by span start)
    pub branch_stmts: FxHashMap<u32, fict_relief::ast::Stmt>,

    el_counter: u32,
    tmpl_value_counter: u32,
}

impl<'a> CodegenContext<'a> {
    pub fn new(
        source: &'a str,
        summary: &'a AnalysisSummary,
        options: &'a CompilerOptions,
        eliminated: FxHashSet<BindingId>,
    ) -> Self {
        Self {
            source,
            summary,
            options,
            code: Vec::with_capacity(source.len() * 2),
            indent_level: 0,
            used_helpers: FxHashSet::default(),
            templates: Vec::new(),
            frames: vec![FunctionFrame::default()],
            module_ctx_used: false,
            region_names: FxHashMap::default(),
            region_counter: 0,
            consumed_stmts: FxHashSet::default(),
            region_inline: None,
            pending_selectors: Vec::new(),
            selector_names: FxHashMap::default(),
            selector_counter: 0,
            eliminated,
            current_decl: None,
            emitted_region_fields: FxHashSet::default(),
            suspend_getter_cache: 0,
            current_key: None,
            branch_stmts: FxHashMap::default(),
            el_counter: 0,
            tmpl_value_counter: 0,
        }
    }

    // -------------------------------------------------------------------------
    // Buffer
    // -------------------------------------------------------------------------

    #[inline]
    pub fn push(&mut self, code: &str) {
        self.code.extend_from_slice(code.as_bytes());
    }

    #[inline]
    pub fn newline(&mut self) {
        self.code.push(b'\n');
        for _ in 0..self.indent_level {
            self.code.extend_from_slice(b"  ");
        }
    }

    #[inline]
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    #[inline]
    pub fn deindent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Swap out the buffer to emit a sub-section, restoring afterwards.
    pub fn take_buffer(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.code)
    }

    pub fn restore_buffer(&mut self, saved: Vec<u8>) -> Vec<u8> {
        std::mem::replace(&mut self.code, saved)
    }

    pub fn append_raw(&mut self, bytes: &[u8]) {
        self.code.extend_from_slice(bytes);
    }

    pub fn into_code(self) -> String {
        // SAFETY: only valid UTF-8 is pushed
        unsafe { String::from_utf8_unchecked(self.code) }
    }

    // -------------------------------------------------------------------------
    // Helpers, slots, names
    // -------------------------------------------------------------------------

    /// Register a runtime helper and return its emitted name.
    #[inline]
    pub fn helper(&mut self, name: &'static str) -> &'static str {
        self.used_helpers.insert(name);
        name
    }

    /// Allocate the next hook slot of the innermost reactive scope.
    pub fn next_slot(&mut self) -> u32 {
        if self.frames.len() == 1 {
            self.module_ctx_used = true;
        }
        let frame = self.frames.last_mut().expect("frame underflow");
        let slot = frame.next_slot;
        frame.next_slot += 1;
        slot
    }

    pub fn push_frame(&mut self) {
        self.frames.push(FunctionFrame::default());
    }

    pub fn pop_frame(&mut self) {
        self.frames.pop();
    }

    #[inline]
    pub fn frame(&mut self) -> &mut FunctionFrame {
        self.frames.last_mut().expect("frame underflow")
    }

    /// Cached accessor local for a memo read, if one is active. Inactive
    /// inside nested function bodies and while the cache line is pending.
    pub fn cached_accessor(&self, id: BindingId) -> Option<&str> {
        if self.suspend_getter_cache > 0 {
            return None;
        }
        let frame = self.frames.last()?;
        let name = frame.getter_cache.get(&id)?;
        if frame.pending_cache.contains(&id) {
            return None;
        }
        Some(name.as_str())
    }

    /// Hoist a template and return its `_tmpl$N` name.
    pub fn add_template(&mut self, html: String) -> String {
        if let Some(index) = self.templates.iter().position(|t| t == &html) {
            return format!("_tmpl${}", index + 1);
        }
        self.templates.push(html);
        format!("_tmpl${}", self.templates.len())
    }

    /// Name (and slot) for a region memo, allocated on first request.
    pub fn region_name(&mut self, id: RegionId) -> (String, u32) {
        let raw = id.index() as u32;
        if let Some(entry) = self.region_names.get(&raw) {
            return entry.clone();
        }
        let name = format!("__region_{}", self.region_counter);
        self.region_counter += 1;
        let slot = self.next_slot();
        self.region_names.insert(raw, (name.clone(), slot));
        (name, slot)
    }

    /// Selector hoist for a keyed-list class binding; one per accessor text.
    pub fn selector_for(&mut self, key: &str, accessor_source: &str) -> String {
        if let Some(name) = self.selector_names.get(key) {
            return name.clone();
        }
        let name = format!("__sel${}", self.selector_counter);
        self.selector_counter += 1;
        let helper = self.helper("createSelector");
        self.pending_selectors
            .push(format!("const {name} = {helper}(() => {accessor_source});"));
        self.selector_names.insert(key.to_string(), name.clone());
        name
    }

    /// Per-instantiation element variable (`__el$N`).
    pub fn next_el(&mut self) -> String {
        self.el_counter += 1;
        format!("__el${}", self.el_counter)
    }

    pub fn reset_el_counter(&mut self) -> u32 {
        std::mem::take(&mut self.el_counter)
    }

    pub fn restore_el_counter(&mut self, saved: u32) {
        self.el_counter = saved;
    }

    /// Temporary value name (`__v$N`) for destructuring rewrites.
    pub fn next_tmp(&mut self) -> String {
        self.tmpl_value_counter += 1;
        format!("__v${}", self.tmpl_value_counter)
    }

    /// Source text of a span (used for selector keys).
    #[inline]
    pub fn span_text(&self, span: fict_carton::Span) -> &'a str {
        span.text(self.source)
    }
}
