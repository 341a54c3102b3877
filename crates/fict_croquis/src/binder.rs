//! HIR builder.
//!
//! One walk over the surface AST that partitions the module into functions
//! and lexical blocks, declares every binding, resolves identifier
//! occurrences, collects use-site profiles and macro placement facts, and
//! records the raw material for shape/region/classification passes.
//!
//! Forward references inside a scope (`const a = b + s; const b = …`) are
//! handled by pre-declaring each scope's bindings before walking its
//! statements.

use compact_str::CompactString;
use fict_carton::{FxHashMap, Span};
use fict_relief::ast::*;
use fict_relief::diagnostics::{RawDiagnostic, WarningCode};
use fict_relief::options::CompilerOptions;

use crate::ast_util::{callee_path, collect_ident_names, has_side_effect, is_pure_expr};
use crate::hir::*;
use crate::macros::{MacroKind, MacroRegistry};

/// A macro placement fact recorded at a call site; the validator turns
/// non-`Ok` facts into errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroFactKind {
    StateOk,
    StateInLoop,
    StateInConditional,
    StateInNestedFunction,
    StateDestructured,
    StateNotDirectlyAssigned,
    StateNotImported,
    EffectOk,
    EffectInLoopOrConditional,
    EffectInNestedFunction,
    EffectNotImported,
}

#[derive(Debug, Clone, Copy)]
pub struct MacroFact {
    pub kind: MacroFactKind,
    pub span: Span,
}

/// `obj.path = …` where `obj` may be reactive; resolved by finalization.
#[derive(Debug, Clone, Copy)]
pub struct MemberMutationFact {
    pub base: BindingId,
    pub span: Span,
    /// Nesting depth of the member path (`a.b = 1` is 1, `a.b.c = 1` is 2)
    pub depth: u32,
}

/// A bare identifier passed as a call argument.
#[derive(Debug, Clone)]
pub struct CallArgFact {
    pub arg: BindingId,
    pub callee: Option<String>,
    pub span: Span,
}

/// One `$effect` call with the bindings its body reads.
#[derive(Debug, Clone)]
pub struct EffectFact {
    pub span: Span,
    pub reads: Vec<BindingId>,
}

/// A write to a binding, with the innermost enclosing branch statement.
#[derive(Debug, Clone, Copy)]
pub struct WriteFact {
    pub binding: BindingId,
    pub branch: Option<Span>,
}

/// Everything the binder learned in its single walk.
#[derive(Debug, Default)]
pub struct BinderOutput {
    pub functions: Vec<HirFunction>,
    pub blocks: Vec<HirBlock>,
    pub bindings: Vec<BindingRecord>,
    /// Identifier occurrence (span start) -> binding
    pub resolutions: FxHashMap<u32, BindingId>,
    /// Function construct (span start) -> function id
    pub functions_by_span: FxHashMap<u32, FunctionId>,
    pub macro_facts: Vec<MacroFact>,
    pub member_mutations: Vec<MemberMutationFact>,
    pub call_args: Vec<CallArgFact>,
    pub effects: Vec<EffectFact>,
    pub writes: Vec<WriteFact>,
    pub diagnostics: Vec<RawDiagnostic>,
}

struct Scope {
    names: FxHashMap<CompactString, BindingId>,
}

pub struct Binder<'a> {
    macros: &'a MacroRegistry,
    options: &'a CompilerOptions,
    out: BinderOutput,

    scopes: Vec<Scope>,
    fn_stack: Vec<FunctionId>,
    block_stack: Vec<BlockId>,

    loop_depth: u32,
    cond_depth: u32,
    in_jsx_child: bool,
    in_jsx_attr: bool,
    in_jsx_key: bool,
    in_handler: bool,
    in_effect: bool,
    /// Innermost enclosing `if`/`switch` statement span
    branch_stack: Vec<Span>,
    /// Read collection for `$effect` bodies
    effect_reads: Vec<Vec<BindingId>>,
    /// Declarator currently being initialized (self-references skip deps)
    current_decl: Option<BindingId>,
}

impl<'a> Binder<'a> {
    pub fn run(
        module: &Module,
        macros: &'a MacroRegistry,
        options: &'a CompilerOptions,
    ) -> BinderOutput {
        let mut binder = Binder {
            macros,
            options,
            out: BinderOutput::default(),
            scopes: Vec::new(),
            fn_stack: Vec::new(),
            block_stack: Vec::new(),
            loop_depth: 0,
            cond_depth: 0,
            in_jsx_child: false,
            in_jsx_attr: false,
            in_jsx_key: false,
            in_handler: false,
            in_effect: false,
            branch_stack: Vec::new(),
            effect_reads: Vec::new(),
            current_decl: None,
        };
        binder.walk_module(module);
        binder.out
    }

    // -------------------------------------------------------------------------
    // Arena plumbing
    // -------------------------------------------------------------------------

    fn new_function(
        &mut self,
        name: Option<CompactString>,
        kind: FunctionKind,
        is_async: bool,
        span: Span,
    ) -> FunctionId {
        let id = FunctionId::new(self.out.functions.len() as u32);
        let block = self.new_block(span, id);
        self.out.functions.push(HirFunction {
            id,
            parent: self.fn_stack.last().copied(),
            name,
            kind,
            is_async,
            span,
            entry_block: block,
            bindings: Vec::new(),
            has_return: false,
            has_jsx_return: false,
        });
        self.out.functions_by_span.insert(span.start, id);
        id
    }

    fn new_block(&mut self, span: Span, function: FunctionId) -> BlockId {
        let id = BlockId::new(self.out.blocks.len() as u32);
        self.out.blocks.push(HirBlock {
            id,
            function,
            parent: self.block_stack.last().copied(),
            span,
        });
        id
    }

    fn current_fn(&self) -> FunctionId {
        *self.fn_stack.last().expect("function stack underflow")
    }

    fn current_fn_kind(&self) -> FunctionKind {
        self.out.functions[self.current_fn().index()].kind
    }

    fn current_block(&self) -> BlockId {
        *self.block_stack.last().expect("block stack underflow")
    }

    fn declare(
        &mut self,
        name: &CompactString,
        span: Span,
        decl_form: DeclForm,
        mutable: bool,
    ) -> BindingId {
        let id = BindingId::new(self.out.bindings.len() as u32);
        let function = self.current_fn();
        self.out.bindings.push(BindingRecord {
            id,
            name: name.clone(),
            span,
            function,
            block: self.current_block(),
            decl_form,
            mutable,
            kind: ReactiveKind::Plain,
            profile: UseProfile::default(),
            read_count: 0,
            is_state_macro: false,
            is_explicit_memo: false,
            is_store: false,
            alias_of: None,
            destructured_from: None,
            destructure_key: None,
            prop_path: None,
            deps: Vec::new(),
            init_pure: false,
            init: None,
            region: None,
        });
        self.out.functions[function.index()].bindings.push(id);
        self.scopes
            .last_mut()
            .expect("scope stack underflow")
            .names
            .insert(name.clone(), id);
        if span.end > span.start {
            self.out.resolutions.insert(span.start, id);
        }
        id
    }

    fn lookup(&self, name: &str) -> Option<BindingId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&id) = scope.names.get(name) {
                return Some(id);
            }
        }
        None
    }

    fn push_scope(&mut self) {
        self.scopes.push(Scope {
            names: FxHashMap::default(),
        });
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    // -------------------------------------------------------------------------
    // Reads and writes
    // -------------------------------------------------------------------------

    fn read_flags(&self, target: BindingId) -> UseProfile {
        let mut flags = UseProfile::READ;
        if self.in_jsx_key {
            flags |= UseProfile::JSX_KEY;
        } else if self.in_jsx_child {
            flags |= UseProfile::JSX_CHILD;
        } else if self.in_jsx_attr {
            flags |= UseProfile::JSX_ATTR;
        }
        if self.in_handler {
            flags |= UseProfile::EVENT_HANDLER;
        } else if self.in_effect {
            flags |= UseProfile::EFFECT_BODY;
        } else if self.crosses_plain_boundary(target) {
            flags |= UseProfile::CLOSURE_ESCAPE;
        }
        flags
    }

    /// Whether reading `target` from the current function crosses a
    /// non-reactive function boundary (the read lives in a closure).
    fn crosses_plain_boundary(&self, target: BindingId) -> bool {
        let target_fn = self.out.bindings[target.index()].function;
        for &fn_id in self.fn_stack.iter().rev() {
            if fn_id == target_fn {
                return false;
            }
            if self.out.functions[fn_id.index()].kind == FunctionKind::Plain {
                return true;
            }
        }
        false
    }

    fn record_read(&mut self, ident: &Ident) {
        let Some(id) = self.lookup(&ident.name) else {
            return;
        };
        if ident.span.end > ident.span.start {
            self.out.resolutions.insert(ident.span.start, id);
        }
        if self.current_decl == Some(id) {
            // reference inside the binding's own initializer
            return;
        }
        let flags = self.read_flags(id);
        let record = &mut self.out.bindings[id.index()];
        record.profile |= flags;
        record.read_count += 1;
        if self.in_effect {
            if let Some(reads) = self.effect_reads.last_mut() {
                reads.push(id);
            }
        }
    }

    fn record_write(&mut self, ident: &Ident) {
        let Some(id) = self.lookup(&ident.name) else {
            return;
        };
        if ident.span.end > ident.span.start {
            self.out.resolutions.insert(ident.span.start, id);
        }
        self.out.bindings[id.index()].profile |= UseProfile::REASSIGNED;
        self.out.writes.push(WriteFact {
            binding: id,
            branch: self.branch_stack.last().copied(),
        });
    }

    fn mark_exported(&mut self, name: &str) {
        if let Some(id) = self.lookup(name) {
            self.out.bindings[id.index()].profile |= UseProfile::EXPORTED;
        }
    }

    // -------------------------------------------------------------------------
    // Module walk
    // -------------------------------------------------------------------------

    fn walk_module(&mut self, module: &Module) {
        let fn_id = FunctionId::new(0);
        debug_assert!(self.out.functions.is_empty());
        // the module function allocates its own entry block inside
        // new_function; build it with an empty stack first
        let id = self.new_function(None, FunctionKind::Module, false, module.span);
        debug_assert_eq!(id, fn_id);
        self.fn_stack.push(id);
        self.block_stack
            .push(self.out.functions[id.index()].entry_block);
        self.push_scope();

        self.predeclare_stmts(&module.body, true);
        for stmt in &module.body {
            self.walk_stmt(stmt);
        }

        self.pop_scope();
        self.block_stack.pop();
        self.fn_stack.pop();
    }

    /// Declare the bindings a statement list introduces, before walking it.
    fn predeclare_stmts(&mut self, stmts: &[Stmt], top_level: bool) {
        for stmt in stmts {
            self.predeclare_stmt(stmt, top_level);
        }
    }

    fn predeclare_stmt(&mut self, stmt: &Stmt, top_level: bool) {
        match stmt {
            Stmt::VarDecl(decl) => {
                let mutable = decl.kind != VarKind::Const;
                for declarator in &decl.decls {
                    self.predeclare_pattern(&declarator.pat, mutable);
                }
            }
            Stmt::Func(func) => {
                self.declare(&func.name.name, func.name.span, DeclForm::Function, false);
            }
            Stmt::Class(class) => {
                self.declare(&class.name.name, class.name.span, DeclForm::Class, false);
            }
            Stmt::Import(import) if top_level => {
                if let Some(default) = &import.default {
                    self.declare(&default.name, default.span, DeclForm::Import, false);
                }
                if let Some(ns) = &import.namespace {
                    self.declare(&ns.name, ns.span, DeclForm::Import, false);
                }
                for spec in &import.named {
                    self.declare(&spec.local.name, spec.local.span, DeclForm::Import, false);
                }
            }
            Stmt::ExportNamed(export) => {
                if let Some(decl) = &export.decl {
                    self.predeclare_stmt(decl, top_level);
                }
            }
            _ => {}
        }
    }

    fn predeclare_pattern(&mut self, pat: &Pattern, mutable: bool) {
        match pat {
            Pattern::Ident(ident) => {
                self.declare(&ident.name, ident.span, DeclForm::Single, mutable);
            }
            Pattern::Object(obj) => {
                for prop in &obj.props {
                    self.predeclare_pattern_nested(&prop.value, mutable, DeclForm::ObjectPattern);
                }
                if let Some(rest) = &obj.rest {
                    self.predeclare_pattern_nested(rest, mutable, DeclForm::ObjectPattern);
                }
            }
            Pattern::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.predeclare_pattern_nested(elem, mutable, DeclForm::ArrayPattern);
                }
            }
            Pattern::Assign(assign) => self.predeclare_pattern(&assign.target, mutable),
            Pattern::Rest(rest) => self.predeclare_pattern(&rest.arg, mutable),
        }
    }

    fn predeclare_pattern_nested(&mut self, pat: &Pattern, mutable: bool, form: DeclForm) {
        match pat {
            Pattern::Ident(ident) => {
                self.declare(&ident.name, ident.span, form, mutable);
            }
            Pattern::Object(obj) => {
                for prop in &obj.props {
                    self.predeclare_pattern_nested(&prop.value, mutable, form);
                }
                if let Some(rest) = &obj.rest {
                    self.predeclare_pattern_nested(rest, mutable, form);
                }
            }
            Pattern::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.predeclare_pattern_nested(elem, mutable, form);
                }
            }
            Pattern::Assign(assign) => self.predeclare_pattern_nested(&assign.target, mutable, form),
            Pattern::Rest(rest) => self.predeclare_pattern_nested(&rest.arg, mutable, form),
        }
    }

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => self.walk_expr(&e.expr),
            Stmt::VarDecl(decl) => self.walk_var_decl(decl),
            Stmt::Func(func) => self.walk_func_decl(func),
            Stmt::Class(class) => self.walk_class(&class.class),
            Stmt::Return(ret) => {
                let fn_id = self.current_fn();
                self.out.functions[fn_id.index()].has_return = true;
                if let Some(arg) = &ret.arg {
                    if returns_jsx(arg) {
                        self.out.functions[fn_id.index()].has_jsx_return = true;
                    }
                    self.walk_expr(arg);
                }
            }
            Stmt::If(if_stmt) => {
                self.walk_expr(&if_stmt.test);
                self.cond_depth += 1;
                self.branch_stack.push(if_stmt.span);
                self.walk_branch_stmt(&if_stmt.cons);
                if let Some(alt) = &if_stmt.alt {
                    self.walk_branch_stmt(alt);
                }
                self.branch_stack.pop();
                self.cond_depth -= 1;
            }
            Stmt::Switch(sw) => {
                self.walk_expr(&sw.disc);
                self.cond_depth += 1;
                self.branch_stack.push(sw.span);
                for case in &sw.cases {
                    if let Some(test) = &case.test {
                        self.walk_expr(test);
                    }
                    let block = self.new_block(case.span, self.current_fn());
                    self.block_stack.push(block);
                    self.push_scope();
                    self.predeclare_stmts(&case.body, false);
                    for s in &case.body {
                        self.walk_stmt(s);
                    }
                    self.pop_scope();
                    self.block_stack.pop();
                }
                self.branch_stack.pop();
                self.cond_depth -= 1;
            }
            Stmt::While(w) => {
                self.walk_expr(&w.test);
                self.loop_depth += 1;
                self.walk_branch_stmt(&w.body);
                self.loop_depth -= 1;
            }
            Stmt::DoWhile(dw) => {
                self.loop_depth += 1;
                self.walk_branch_stmt(&dw.body);
                self.loop_depth -= 1;
                self.walk_expr(&dw.test);
            }
            Stmt::For(f) => {
                let block = self.new_block(f.span, self.current_fn());
                self.block_stack.push(block);
                self.push_scope();
                match &f.init {
                    Some(ForInit::VarDecl(decl)) => {
                        let mutable = decl.kind != VarKind::Const;
                        for declarator in &decl.decls {
                            self.predeclare_pattern(&declarator.pat, mutable);
                        }
                        self.loop_depth += 1;
                        self.walk_var_decl(decl);
                        self.loop_depth -= 1;
                    }
                    Some(ForInit::Expr(e)) => self.walk_expr(e),
                    None => {}
                }
                if let Some(test) = &f.test {
                    self.walk_expr(test);
                }
                if let Some(update) = &f.update {
                    self.walk_expr(update);
                }
                self.loop_depth += 1;
                self.walk_branch_stmt(&f.body);
                self.loop_depth -= 1;
                self.pop_scope();
                self.block_stack.pop();
            }
            Stmt::ForIn(fi) => {
                self.walk_expr(&fi.object);
                self.walk_loop_head_body(&fi.left, &fi.body, fi.span);
            }
            Stmt::ForOf(fo) => {
                self.walk_expr(&fo.iterable);
                self.walk_loop_head_body(&fo.left, &fo.body, fo.span);
            }
            Stmt::Block(block) => {
                let id = self.new_block(block.span, self.current_fn());
                self.block_stack.push(id);
                self.push_scope();
                self.predeclare_stmts(&block.stmts, false);
                for s in &block.stmts {
                    self.walk_stmt(s);
                }
                self.pop_scope();
                self.block_stack.pop();
            }
            Stmt::Throw(t) => self.walk_expr(&t.arg),
            Stmt::Try(t) => {
                self.walk_block(&t.block);
                if let Some(handler) = &t.handler {
                    let block = self.new_block(handler.span, self.current_fn());
                    self.block_stack.push(block);
                    self.push_scope();
                    if let Some(param) = &handler.param {
                        self.predeclare_pattern_nested(param, true, DeclForm::CatchParam);
                    }
                    self.predeclare_stmts(&handler.body.stmts, false);
                    for s in &handler.body.stmts {
                        self.walk_stmt(s);
                    }
                    self.pop_scope();
                    self.block_stack.pop();
                }
                if let Some(finalizer) = &t.finalizer {
                    self.walk_block(finalizer);
                }
            }
            Stmt::Labeled(l) => self.walk_stmt(&l.body),
            Stmt::Import(_) => {}
            Stmt::ExportNamed(export) => {
                if let Some(decl) = &export.decl {
                    self.walk_stmt(decl);
                    let mut names = Vec::new();
                    exported_decl_names(decl, &mut names);
                    for name in names {
                        self.mark_exported(&name);
                    }
                } else if export.source.is_none() {
                    for spec in &export.specifiers {
                        self.mark_exported(&spec.local);
                    }
                }
            }
            Stmt::ExportDefault(export) => {
                let core = export.expr.unwrap_tsparen();
                let is_module = self.current_fn_kind() == FunctionKind::Module;
                if is_module && matches!(core, Expr::Func(_) | Expr::Arrow(_)) {
                    // a default-exported function is a component unless its
                    // name says otherwise
                    let kind = match core {
                        Expr::Func(f) => f
                            .name
                            .as_ref()
                            .map(|n| scope_kind_for_name(&n.name))
                            .filter(|k| *k != FunctionKind::Plain)
                            .unwrap_or(FunctionKind::Component),
                        _ => FunctionKind::Component,
                    };
                    self.walk_named_scope_value(core, kind);
                } else if let Some(name) = export.expr.as_ident_name() {
                    let name = name.to_string();
                    self.walk_expr(&export.expr);
                    self.mark_exported(&name);
                } else {
                    self.walk_expr(&export.expr);
                }
            }
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) | Stmt::Debugger(_) => {}
        }
    }

    /// Walk a branch/loop body, giving non-block single statements their own
    /// lexical block.
    fn walk_branch_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                let id = self.new_block(block.span, self.current_fn());
                self.block_stack.push(id);
                self.push_scope();
                self.predeclare_stmts(&block.stmts, false);
                for s in &block.stmts {
                    self.walk_stmt(s);
                }
                self.pop_scope();
                self.block_stack.pop();
            }
            other => self.walk_stmt(other),
        }
    }

    fn walk_block(&mut self, block: &BlockStmt) {
        let id = self.new_block(block.span, self.current_fn());
        self.block_stack.push(id);
        self.push_scope();
        self.predeclare_stmts(&block.stmts, false);
        for s in &block.stmts {
            self.walk_stmt(s);
        }
        self.pop_scope();
        self.block_stack.pop();
    }

    fn walk_loop_head_body(&mut self, head: &ForHead, body: &Stmt, span: Span) {
        let block = self.new_block(span, self.current_fn());
        self.block_stack.push(block);
        self.push_scope();
        match head {
            ForHead::VarDecl(kind, pat) => {
                self.predeclare_pattern_nested(pat, *kind != VarKind::Const, DeclForm::LoopHead);
            }
            ForHead::Pattern(pat) => {
                // assignment head: the names are writes, not declarations
                let mut names = Vec::new();
                pat.bound_names(&mut names);
                for name in names {
                    if let Some(id) = self.lookup(&name) {
                        self.out.bindings[id.index()].profile |= UseProfile::REASSIGNED;
                        self.out.writes.push(WriteFact {
                            binding: id,
                            branch: self.branch_stack.last().copied(),
                        });
                    }
                }
            }
        }
        self.loop_depth += 1;
        self.walk_branch_stmt(body);
        self.loop_depth -= 1;
        self.pop_scope();
        self.block_stack.pop();
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn walk_var_decl(&mut self, decl: &VarDecl) {
        for declarator in &decl.decls {
            self.walk_declarator(declarator);
        }
    }

    fn walk_declarator(&mut self, declarator: &Declarator) {
        let Some(init) = &declarator.init else {
            // pattern defaults still contain expressions
            self.walk_pattern_defaults(&declarator.pat);
            return;
        };
        let core = init.unwrap_tsparen();

        // `$state(…)` / `$memo(…)` / `$store(…)` initializers
        if let Expr::Call(call) = core {
            if let Some(name) = call.callee.as_ident_name() {
                if let Some(kind) = MacroKind::from_name(name) {
                    match kind {
                        MacroKind::State => {
                            self.handle_state_decl(declarator, call);
                            return;
                        }
                        MacroKind::Memo if self.macros.resolve(name).is_some() => {
                            self.handle_memo_decl(declarator, call);
                            return;
                        }
                        MacroKind::Store if self.macros.resolve(name).is_some() => {
                            self.handle_store_decl(declarator, call);
                            return;
                        }
                        _ => {}
                    }
                }
            }
        }

        // ordinary initializer
        self.walk_pattern_defaults(&declarator.pat);
        if let Pattern::Ident(pat) = &declarator.pat {
            if let Some(id) = self.lookup(&pat.name) {
                // alias candidate: bare reference to another binding
                if let Some(target_name) = core.as_ident_name() {
                    if let Some(target) = self.lookup(target_name) {
                        if target != id {
                            self.out.bindings[id.index()].alias_of = Some(target);
                        }
                    }
                }
                self.fill_init_data(id, init);

                // a top-level function value adopts the reactive-scope naming
                // convention (`const App = () => …`); the kind must be known
                // before the body is walked so `$state` placement sees it
                if self.current_fn_kind() == FunctionKind::Module {
                    let kind = scope_kind_for_name(&pat.name);
                    if kind != FunctionKind::Plain && self.walk_named_scope_value(core, kind) {
                        return;
                    }
                }
                self.walk_init(id, init);
                return;
            }
        }

        // destructuring declarator
        if let Some(target_name) = core.as_ident_name() {
            if let Some(target) = self.lookup(target_name) {
                self.record_destructure(&declarator.pat, target);
            }
        }
        self.walk_expr(init);
    }

    /// Record which source key each destructured field binding came from.
    fn record_destructure(&mut self, pat: &Pattern, target: BindingId) {
        match pat {
            Pattern::Object(obj) => {
                for prop in &obj.props {
                    let Some(key) = prop.key.static_name() else {
                        continue;
                    };
                    let key = CompactString::new(key);
                    let value = match &prop.value {
                        Pattern::Assign(assign) => &assign.target,
                        other => other,
                    };
                    if let Pattern::Ident(ident) = value {
                        if let Some(id) = self.lookup(&ident.name) {
                            let record = &mut self.out.bindings[id.index()];
                            record.destructured_from = Some(target);
                            record.destructure_key = Some(key);
                        }
                    }
                }
            }
            Pattern::Array(arr) => {
                for (index, elem) in arr.elems.iter().enumerate() {
                    let Some(pat) = elem else { continue };
                    let value = match pat {
                        Pattern::Assign(assign) => &assign.target,
                        other => other,
                    };
                    if let Pattern::Ident(ident) = value {
                        if let Some(id) = self.lookup(&ident.name) {
                            let record = &mut self.out.bindings[id.index()];
                            record.destructured_from = Some(target);
                            record.destructure_key = Some(CompactString::new(index.to_string()));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn walk_pattern_defaults(&mut self, pat: &Pattern) {
        match pat {
            Pattern::Ident(_) => {}
            Pattern::Object(obj) => {
                for prop in &obj.props {
                    if let PropName::Computed(key) = &prop.key {
                        self.walk_expr(key);
                    }
                    self.walk_pattern_defaults(&prop.value);
                }
                if let Some(rest) = &obj.rest {
                    self.walk_pattern_defaults(rest);
                }
            }
            Pattern::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.walk_pattern_defaults(elem);
                }
            }
            Pattern::Assign(assign) => {
                self.walk_expr(&assign.default);
                self.walk_pattern_defaults(&assign.target);
            }
            Pattern::Rest(rest) => self.walk_pattern_defaults(&rest.arg),
        }
    }

    fn state_fact_kind(&self) -> MacroFactKind {
        if self.macros.resolve("$state").is_none() {
            MacroFactKind::StateNotImported
        } else if !self.current_fn_kind().is_reactive_scope() {
            MacroFactKind::StateInNestedFunction
        } else if self.loop_depth > 0 {
            MacroFactKind::StateInLoop
        } else if self.cond_depth > 0 {
            MacroFactKind::StateInConditional
        } else {
            MacroFactKind::StateOk
        }
    }

    fn handle_state_decl(&mut self, declarator: &Declarator, call: &CallExpr) {
        let mut kind = self.state_fact_kind();
        if kind == MacroFactKind::StateOk && !matches!(declarator.pat, Pattern::Ident(_)) {
            kind = MacroFactKind::StateDestructured;
        }
        self.out.macro_facts.push(MacroFact {
            kind,
            span: call.span,
        });

        if let Pattern::Ident(pat) = &declarator.pat {
            if let Some(id) = self.lookup(&pat.name) {
                let initial = call.args.first().map(|a| a.expr.clone());
                {
                    let record = &mut self.out.bindings[id.index()];
                    record.is_state_macro = true;
                    record.init_pure = initial.as_ref().map_or(true, is_pure_expr);
                    record.init = initial;
                }
                let saved = self.current_decl.replace(id);
                for arg in &call.args {
                    self.walk_expr(&arg.expr);
                }
                self.current_decl = saved;
                return;
            }
        }
        for arg in &call.args {
            self.walk_expr(&arg.expr);
        }
    }

    fn handle_memo_decl(&mut self, declarator: &Declarator, call: &CallExpr) {
        if let Pattern::Ident(pat) = &declarator.pat {
            if let Some(id) = self.lookup(&pat.name) {
                let body = call.args.first().map(|a| a.expr.clone());
                if let Some(body) = &body {
                    let inner = memo_body_expr(body);
                    if let Some(inner) = inner {
                        if has_side_effect(inner) {
                            self.out.diagnostics.push(
                                RawDiagnostic::new(
                                    WarningCode::MemoSideEffect,
                                    "side effect inside a $memo body",
                                    inner.span(),
                                )
                                .with_hint("memo bodies must be pure; move the effect to $effect"),
                            );
                        }
                    }
                }
                {
                    let record = &mut self.out.bindings[id.index()];
                    record.is_explicit_memo = true;
                    record.init = body;
                }
                self.fill_deps_from_init(id);
                let saved = self.current_decl.replace(id);
                for arg in &call.args {
                    self.walk_expr(&arg.expr);
                }
                self.current_decl = saved;
                return;
            }
        }
        for arg in &call.args {
            self.walk_expr(&arg.expr);
        }
    }

    fn handle_store_decl(&mut self, declarator: &Declarator, call: &CallExpr) {
        if let Pattern::Ident(pat) = &declarator.pat {
            if let Some(id) = self.lookup(&pat.name) {
                let record = &mut self.out.bindings[id.index()];
                record.is_store = true;
                record.init = call.args.first().map(|a| a.expr.clone());
            }
        }
        for arg in &call.args {
            self.walk_expr(&arg.expr);
        }
    }

    fn fill_init_data(&mut self, id: BindingId, init: &Expr) {
        let record = &mut self.out.bindings[id.index()];
        record.init = Some(init.clone());
        record.init_pure = is_pure_expr(init);
        self.fill_deps_from_init(id);
    }

    /// Collect dependency candidates: every name the initializer mentions
    /// that resolves in the current scope chain. Finalization narrows the
    /// list to reactive sources.
    fn fill_deps_from_init(&mut self, id: BindingId) {
        let Some(init) = self.out.bindings[id.index()].init.clone() else {
            return;
        };
        let mut names = Vec::new();
        collect_ident_names(&init, &mut names);
        let mut deps = Vec::new();
        for name in names {
            if let Some(dep) = self.lookup(&name) {
                if dep != id && !deps.contains(&dep) {
                    deps.push(dep);
                }
            }
        }
        self.out.bindings[id.index()].deps = deps;
    }

    fn walk_init(&mut self, id: BindingId, init: &Expr) {
        let saved = self.current_decl.replace(id);
        self.walk_expr(init);
        self.current_decl = saved;
    }

    /// Walk a function-valued initializer as a named reactive scope.
    /// Returns false when the value is not a function.
    fn walk_named_scope_value(&mut self, core: &Expr, kind: FunctionKind) -> bool {
        match core {
            Expr::Arrow(arrow) => {
                match &arrow.body {
                    ArrowBody::Block(block) => {
                        self.enter_function(
                            None,
                            kind,
                            arrow.is_async,
                            &arrow.params,
                            Some(block),
                            None,
                            arrow.span,
                        );
                    }
                    ArrowBody::Expr(e) => {
                        self.enter_function(
                            None,
                            kind,
                            arrow.is_async,
                            &arrow.params,
                            None,
                            Some(e),
                            arrow.span,
                        );
                    }
                }
                true
            }
            Expr::Func(f) => {
                self.enter_function(
                    f.name.as_ref().map(|n| n.name.clone()),
                    kind,
                    f.func.is_async,
                    &f.func.params,
                    Some(&f.func.body),
                    None,
                    f.span,
                );
                true
            }
            _ => false,
        }
    }

    fn walk_func_decl(&mut self, func: &FuncDecl) {
        let parent_kind = self.current_fn_kind();
        let kind = if parent_kind == FunctionKind::Module {
            scope_kind_for_name(&func.name.name)
        } else {
            // nested component definitions are legal but warned
            if parent_kind == FunctionKind::Component && is_component_name(&func.name.name) {
                self.out.diagnostics.push(
                    RawDiagnostic::new(
                        WarningCode::NestedComponent,
                        format!(
                            "component \"{}\" is defined inside another component",
                            func.name.name
                        ),
                        func.name.span,
                    )
                    .with_hint("move the component to module scope to avoid remounting"),
                );
            }
            FunctionKind::Plain
        };
        self.enter_function(
            Some(func.name.name.clone()),
            kind,
            func.func.is_async,
            &func.func.params,
            Some(&func.func.body),
            None,
            func.func.span,
        );
    }

    fn walk_class(&mut self, class: &Class) {
        if let Some(super_class) = &class.super_class {
            self.walk_expr(super_class);
        }
        for member in &class.members {
            if let PropName::Computed(key) = &member.key {
                self.walk_expr(key);
            }
            match &member.kind {
                ClassMemberKind::Method(f)
                | ClassMemberKind::Getter(f)
                | ClassMemberKind::Setter(f) => {
                    self.enter_function(
                        None,
                        FunctionKind::Plain,
                        f.is_async,
                        &f.params,
                        Some(&f.body),
                        None,
                        f.span,
                    );
                }
                ClassMemberKind::Field(Some(value)) => self.walk_expr(value),
                ClassMemberKind::Field(None) => {}
            }
        }
    }

    /// Enter a function: new scope, params, pre-declared body, walk.
    #[allow(clippy::too_many_arguments)]
    fn enter_function(
        &mut self,
        name: Option<CompactString>,
        kind: FunctionKind,
        is_async: bool,
        params: &[Pattern],
        body: Option<&BlockStmt>,
        expr_body: Option<&Expr>,
        span: Span,
    ) -> FunctionId {
        let id = self.new_function(name, kind, is_async, span);
        let entry = self.out.functions[id.index()].entry_block;
        self.fn_stack.push(id);
        self.block_stack.push(entry);
        self.push_scope();

        let saved_loop = std::mem::take(&mut self.loop_depth);
        let saved_cond = std::mem::take(&mut self.cond_depth);

        self.declare_params(id, kind, params);
        for param in params {
            self.walk_pattern_defaults(param);
        }

        if let Some(body) = body {
            self.predeclare_stmts(&body.stmts, false);
            for stmt in &body.stmts {
                self.walk_stmt(stmt);
            }
        }
        if let Some(expr) = expr_body {
            self.out.functions[id.index()].has_return = true;
            if returns_jsx(expr) {
                self.out.functions[id.index()].has_jsx_return = true;
            }
            self.walk_expr(expr);
        }

        self.loop_depth = saved_loop;
        self.cond_depth = saved_cond;
        self.pop_scope();
        self.block_stack.pop();
        self.fn_stack.pop();
        id
    }

    fn declare_params(&mut self, _fn_id: FunctionId, kind: FunctionKind, params: &[Pattern]) {
        let is_component_like = matches!(kind, FunctionKind::Component | FunctionKind::Hook);

        for (index, param) in params.iter().enumerate() {
            // component props destructuring becomes prop accessors, unless a
            // rest element forces the pattern to stay intact
            if index == 0 && is_component_like {
                if let Pattern::Object(obj) = param {
                    if obj.rest.is_none() {
                        self.declare_prop_fields(obj, &mut Vec::new(), &mut Vec::new());
                        continue;
                    }
                }
            }
            self.predeclare_pattern_nested(param, true, DeclForm::Param);
        }
    }

    fn declare_prop_fields(
        &mut self,
        obj: &ObjectPat,
        path: &mut Vec<CompactString>,
        defaults: &mut Vec<Option<Expr>>,
    ) {
        for prop in &obj.props {
            let Some(key) = prop.key.static_name() else {
                // computed prop keys cannot become accessors
                self.predeclare_pattern_nested(&prop.value, true, DeclForm::Param);
                continue;
            };
            path.push(CompactString::new(key));

            let (value, default) = match &prop.value {
                Pattern::Assign(assign) => (&assign.target, Some(assign.default.clone())),
                other => (other, None),
            };
            defaults.push(default);

            match value {
                Pattern::Ident(ident) => {
                    let id = self.declare(&ident.name, ident.span, DeclForm::Param, false);
                    let record = &mut self.out.bindings[id.index()];
                    record.kind = ReactiveKind::PropAccessor;
                    record.prop_path = Some(PropPath {
                        path: path.clone(),
                        defaults: defaults.clone(),
                    });
                }
                Pattern::Object(nested) => {
                    self.declare_prop_fields(nested, path, defaults);
                }
                other => {
                    self.predeclare_pattern_nested(other, true, DeclForm::Param);
                }
            }

            defaults.pop();
            path.pop();
        }
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Ident(ident) => self.record_read(ident),
            Expr::Member(member) => {
                self.walk_expr(&member.obj);
                if let MemberProp::Computed(prop) = &member.prop {
                    self.walk_expr(prop);
                }
            }
            Expr::Call(call) => self.walk_call(call),
            Expr::New(new) => {
                self.walk_expr(&new.callee);
                for arg in &new.args {
                    self.walk_expr(&arg.expr);
                }
            }
            Expr::Assign(assign) => {
                self.walk_assign_target(&assign.target);
                self.walk_expr(&assign.value);
            }
            Expr::Update(update) => {
                match update.arg.unwrap_tsparen() {
                    Expr::Ident(ident) => {
                        self.record_read(ident);
                        self.record_write(ident);
                    }
                    Expr::Member(member) => {
                        self.record_member_mutation_fact(member);
                        self.walk_expr(&update.arg);
                    }
                    _ => self.walk_expr(&update.arg),
                }
            }
            Expr::Unary(u) => self.walk_expr(&u.arg),
            Expr::Binary(b) => {
                self.walk_expr(&b.left);
                self.walk_expr(&b.right);
            }
            Expr::Logical(l) => {
                self.walk_expr(&l.left);
                self.walk_expr(&l.right);
            }
            Expr::Cond(c) => {
                self.walk_expr(&c.test);
                self.walk_expr(&c.cons);
                self.walk_expr(&c.alt);
            }
            Expr::Seq(s) => {
                for e in &s.exprs {
                    self.walk_expr(e);
                }
            }
            Expr::Paren(p) => self.walk_expr(&p.expr),
            Expr::Await(a) => self.walk_expr(&a.arg),
            Expr::Template(t) => {
                for e in &t.exprs {
                    self.walk_expr(e);
                }
            }
            Expr::TaggedTemplate(t) => {
                self.walk_expr(&t.tag);
                for e in &t.quasi.exprs {
                    self.walk_expr(e);
                }
            }
            Expr::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.walk_expr(&elem.expr);
                }
            }
            Expr::Object(obj) => {
                for prop in &obj.props {
                    match prop {
                        ObjectProp::KeyValue { key, value, .. } => {
                            if let PropName::Computed(k) = key {
                                self.walk_expr(k);
                            }
                            self.walk_expr(value);
                        }
                        ObjectProp::Shorthand { name, .. } => self.record_read(name),
                        ObjectProp::Method { func, span, .. } => {
                            self.enter_function(
                                None,
                                FunctionKind::Plain,
                                func.is_async,
                                &func.params,
                                Some(&func.body),
                                None,
                                *span,
                            );
                        }
                        ObjectProp::Spread { expr, .. } => self.walk_expr(expr),
                    }
                }
            }
            Expr::Func(f) => {
                self.check_nested_component(f.name.as_ref().map(|n| (&n.name, n.span)));
                self.enter_function(
                    f.name.as_ref().map(|n| n.name.clone()),
                    FunctionKind::Plain,
                    f.func.is_async,
                    &f.func.params,
                    Some(&f.func.body),
                    None,
                    f.span,
                );
            }
            Expr::Arrow(arrow) => {
                match &arrow.body {
                    ArrowBody::Block(block) => {
                        self.enter_function(
                            None,
                            FunctionKind::Plain,
                            arrow.is_async,
                            &arrow.params,
                            Some(block),
                            None,
                            arrow.span,
                        );
                    }
                    ArrowBody::Expr(e) => {
                        self.enter_function(
                            None,
                            FunctionKind::Plain,
                            arrow.is_async,
                            &arrow.params,
                            None,
                            Some(e),
                            arrow.span,
                        );
                    }
                }
            }
            Expr::Jsx(el) => self.walk_jsx(el),
            Expr::JsxFragment(frag) => {
                for child in &frag.children {
                    self.walk_jsx_child(child);
                }
            }
            Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => self.walk_expr(&w.expr),
            Expr::ImportCall(i) => self.walk_expr(&i.arg),
            _ => {}
        }
    }

    fn check_nested_component(&mut self, name: Option<(&CompactString, Span)>) {
        if let Some((name, span)) = name {
            if self.current_fn_kind() == FunctionKind::Component && is_component_name(name) {
                self.out.diagnostics.push(
                    RawDiagnostic::new(
                        WarningCode::NestedComponent,
                        format!("component \"{name}\" is defined inside another component"),
                        span,
                    )
                    .with_hint("move the component to module scope to avoid remounting"),
                );
            }
        }
    }

    fn walk_assign_target(&mut self, target: &AssignTarget) {
        match target {
            AssignTarget::Ident(ident) => self.record_write(ident),
            AssignTarget::Member(member) => {
                self.record_member_mutation_fact(member);
                self.walk_expr(&member.obj);
                if let MemberProp::Computed(prop) = &member.prop {
                    self.walk_expr(prop);
                }
            }
            AssignTarget::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    self.walk_assign_target(&elem.target);
                    if let Some(default) = &elem.default {
                        self.walk_expr(default);
                    }
                }
                if let Some(rest) = &arr.rest {
                    self.walk_assign_target(rest);
                }
            }
            AssignTarget::Object(obj) => {
                for prop in &obj.props {
                    if let PropName::Computed(key) = &prop.key {
                        self.walk_expr(key);
                    }
                    self.walk_assign_target(&prop.target);
                    if let Some(default) = &prop.default {
                        self.walk_expr(default);
                    }
                }
                if let Some(rest) = &obj.rest {
                    self.walk_assign_target(rest);
                }
            }
        }
    }

    fn record_member_mutation_fact(&mut self, member: &MemberExpr) {
        let mut depth = 1u32;
        let mut base = &member.obj;
        loop {
            match base.unwrap_tsparen() {
                Expr::Member(inner) => {
                    depth += 1;
                    base = &inner.obj;
                }
                Expr::Ident(ident) => {
                    if let Some(id) = self.lookup(&ident.name) {
                        self.out.member_mutations.push(MemberMutationFact {
                            base: id,
                            span: member.span,
                            depth,
                        });
                    }
                    return;
                }
                _ => return,
            }
        }
    }

    fn walk_call(&mut self, call: &CallExpr) {
        // macro calls in non-declarator positions
        if let Some(name) = call.callee.as_ident_name() {
            match name {
                "$state" => {
                    let kind = if self.macros.resolve("$state").is_none() {
                        MacroFactKind::StateNotImported
                    } else {
                        // a `$state` call that survives to the generic call
                        // walk is not a plain `let`/`const` initializer
                        MacroFactKind::StateNotDirectlyAssigned
                    };
                    self.out.macro_facts.push(MacroFact {
                        kind,
                        span: call.span,
                    });
                    for arg in &call.args {
                        self.walk_expr(&arg.expr);
                    }
                    return;
                }
                "$effect" => {
                    self.walk_effect_call(call);
                    return;
                }
                _ => {}
            }

            // first-argument callbacks of configured reactive-scope calls
            if self.options.is_reactive_scope_call(name) && self.is_direct_callee(name) {
                self.record_read_of_callee(&call.callee);
                let mut args = call.args.iter();
                if let Some(first) = args.next() {
                    self.walk_callback_as_reactive_scope(&first.expr);
                }
                for arg in args {
                    self.walk_expr(&arg.expr);
                }
                return;
            }
        }

        self.walk_expr(&call.callee);
        let callee = callee_path(&call.callee);
        for arg in &call.args {
            if let Expr::Ident(ident) = arg.expr.unwrap_tsparen() {
                if let Some(id) = self.lookup(&ident.name) {
                    self.out.call_args.push(CallArgFact {
                        arg: id,
                        callee: callee.clone(),
                        span: ident.span,
                    });
                    self.out.bindings[id.index()].profile |= UseProfile::OPAQUE_ARG;
                }
            }
            self.walk_expr(&arg.expr);
        }
    }

    /// A callee is "direct" when the name does not resolve to a local
    /// binding other than an import (aliased invocations are not reactive
    /// scopes).
    fn is_direct_callee(&self, name: &str) -> bool {
        match self.lookup(name) {
            None => true,
            Some(id) => self.out.bindings[id.index()].decl_form == DeclForm::Import,
        }
    }

    fn record_read_of_callee(&mut self, callee: &Expr) {
        if let Expr::Ident(ident) = callee.unwrap_tsparen() {
            self.record_read(ident);
        }
    }

    fn walk_callback_as_reactive_scope(&mut self, expr: &Expr) {
        match expr.unwrap_tsparen() {
            Expr::Arrow(arrow) => match &arrow.body {
                ArrowBody::Block(block) => {
                    self.enter_function(
                        None,
                        FunctionKind::ReactiveCallback,
                        arrow.is_async,
                        &arrow.params,
                        Some(block),
                        None,
                        arrow.span,
                    );
                }
                ArrowBody::Expr(e) => {
                    self.enter_function(
                        None,
                        FunctionKind::ReactiveCallback,
                        arrow.is_async,
                        &arrow.params,
                        None,
                        Some(e),
                        arrow.span,
                    );
                }
            },
            Expr::Func(f) => {
                self.enter_function(
                    f.name.as_ref().map(|n| n.name.clone()),
                    FunctionKind::ReactiveCallback,
                    f.func.is_async,
                    &f.func.params,
                    Some(&f.func.body),
                    None,
                    f.span,
                );
            }
            other => self.walk_expr(other),
        }
    }

    fn walk_effect_call(&mut self, call: &CallExpr) {
        let kind = if self.macros.resolve("$effect").is_none() {
            MacroFactKind::EffectNotImported
        } else if !self.current_fn_kind().is_reactive_scope() {
            MacroFactKind::EffectInNestedFunction
        } else if self.loop_depth > 0 || self.cond_depth > 0 {
            MacroFactKind::EffectInLoopOrConditional
        } else {
            MacroFactKind::EffectOk
        };
        self.out.macro_facts.push(MacroFact {
            kind,
            span: call.span,
        });

        let saved_effect = self.in_effect;
        self.in_effect = true;
        self.effect_reads.push(Vec::new());
        for arg in &call.args {
            self.walk_expr(&arg.expr);
        }
        let reads = self.effect_reads.pop().unwrap_or_default();
        self.in_effect = saved_effect;
        self.out.effects.push(EffectFact {
            span: call.span,
            reads,
        });
    }

    // -------------------------------------------------------------------------
    // JSX
    // -------------------------------------------------------------------------

    fn walk_jsx(&mut self, el: &JsxElement) {
        for attr in &el.attrs {
            match attr {
                JsxAttr::Named(named) => {
                    let Some(JsxAttrValue::Expr(value)) = &named.value else {
                        continue;
                    };
                    let saved = (
                        self.in_jsx_child,
                        self.in_jsx_attr,
                        self.in_jsx_key,
                        self.in_handler,
                    );
                    self.in_jsx_child = false;
                    if is_event_attr(&named.name) {
                        self.in_handler = true;
                        self.in_jsx_attr = false;
                        self.in_jsx_key = false;
                    } else if named.name == "key" {
                        self.in_jsx_key = true;
                        self.in_jsx_attr = false;
                    } else {
                        self.in_jsx_attr = true;
                        self.in_jsx_key = false;
                    }
                    self.walk_expr(value);
                    (
                        self.in_jsx_child,
                        self.in_jsx_attr,
                        self.in_jsx_key,
                        self.in_handler,
                    ) = saved;
                }
                JsxAttr::Spread(spread) => {
                    let saved = self.in_jsx_attr;
                    self.in_jsx_attr = true;
                    self.walk_expr(&spread.expr);
                    self.in_jsx_attr = saved;
                }
            }
        }
        for child in &el.children {
            self.walk_jsx_child(child);
        }
    }

    fn walk_jsx_child(&mut self, child: &JsxChild) {
        match child {
            JsxChild::Expr(container) => {
                let Some(expr) = &container.expr else { return };
                self.check_unkeyed_map(expr);
                let saved = (self.in_jsx_child, self.in_jsx_attr, self.in_jsx_key);
                self.in_jsx_child = true;
                self.in_jsx_attr = false;
                self.in_jsx_key = false;
                self.walk_expr(expr);
                (self.in_jsx_child, self.in_jsx_attr, self.in_jsx_key) = saved;
            }
            JsxChild::Element(el) => self.walk_jsx(el),
            JsxChild::Fragment(frag) => {
                for c in &frag.children {
                    self.walk_jsx_child(c);
                }
            }
            JsxChild::Text(_) => {}
        }
    }

    /// `items.map(item => <li>…</li>)` without a `key` attribute.
    fn check_unkeyed_map(&mut self, expr: &Expr) {
        let Some((_, render)) = as_map_call(expr) else {
            return;
        };
        let Some(body) = arrow_result_expr(render) else {
            return;
        };
        if let Expr::Jsx(el) = body.unwrap_tsparen() {
            if el.attr("key").is_none() {
                self.out.diagnostics.push(
                    RawDiagnostic::new(
                        WarningCode::ListWithoutKey,
                        "list rendered from map() without a key attribute",
                        el.span,
                    )
                    .with_hint("add key={…} so list items reconcile by identity"),
                );
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------------

/// `onClick`, `onInput`, … (an `on` prefix followed by a capital)
pub fn is_event_attr(name: &str) -> bool {
    name.len() > 2
        && name.starts_with("on")
        && name.as_bytes()[2].is_ascii_uppercase()
}

pub fn is_component_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

pub fn is_hook_name(name: &str) -> bool {
    let rest = name.strip_prefix("use");
    rest.is_some_and(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
}

fn scope_kind_for_name(name: &str) -> FunctionKind {
    if is_component_name(name) {
        FunctionKind::Component
    } else if is_hook_name(name) {
        FunctionKind::Hook
    } else {
        FunctionKind::Plain
    }
}

fn returns_jsx(expr: &Expr) -> bool {
    matches!(
        expr.unwrap_tsparen(),
        Expr::Jsx(_) | Expr::JsxFragment(_)
    )
}

fn exported_decl_names(stmt: &Stmt, out: &mut Vec<CompactString>) {
    match stmt {
        Stmt::VarDecl(decl) => {
            for declarator in &decl.decls {
                declarator.pat.bound_names(out);
            }
        }
        Stmt::Func(func) => out.push(func.name.name.clone()),
        Stmt::Class(class) => out.push(class.name.name.clone()),
        _ => {}
    }
}

/// Match `expr.map(fn)`; returns the receiver and the callback.
pub fn as_map_call(expr: &Expr) -> Option<(&Expr, &Expr)> {
    let Expr::Call(call) = expr.unwrap_tsparen() else {
        return None;
    };
    let Expr::Member(member) = call.callee.unwrap_tsparen() else {
        return None;
    };
    match &member.prop {
        MemberProp::Ident(name, _) if name == "map" => {}
        _ => return None,
    }
    let render = &call.args.first()?.expr;
    Some((&member.obj, render))
}

/// Result expression of an arrow callback (`x => expr` or a block whose
/// single trailing return carries the value).
pub fn arrow_result_expr(expr: &Expr) -> Option<&Expr> {
    match expr.unwrap_tsparen() {
        Expr::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expr(e) => Some(e),
            ArrowBody::Block(block) => block.stmts.iter().rev().find_map(|stmt| match stmt {
                Stmt::Return(ret) => ret.arg.as_ref(),
                _ => None,
            }),
        },
        _ => None,
    }
}

/// The expression a `$memo(…)` argument evaluates: the body of a thunk, or
/// the expression itself.
pub fn memo_body_expr(arg: &Expr) -> Option<&Expr> {
    match arg.unwrap_tsparen() {
        Expr::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expr(e) => Some(e),
            ArrowBody::Block(block) => block.stmts.iter().find_map(|stmt| match stmt {
                Stmt::Return(ret) => ret.arg.as_ref(),
                _ => None,
            }),
        },
        other => Some(other),
    }
}
