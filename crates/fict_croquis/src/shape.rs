//! Object-shape analysis.
//!
//! Forward dataflow over function bodies computing, per tracked binding, the
//! shape record from the data model: known keys, dynamic accesses, narrowed
//! key sets, mutated keys, escape and spread facts. Joins at control-flow
//! merges are pointwise set union / boolean OR.
//!
//! The key-narrowing sub-pass tracks, per variable name, the set of string
//! literals the variable can hold on the current edge. Loop bodies are
//! walked twice to reach the fixed point of the join.

use compact_str::CompactString;
use fict_carton::{FxHashMap, FxHashSet, SmallVec};
use fict_relief::ast::*;
use fict_relief::diagnostics::{RawDiagnostic, WarningCode};

use crate::ast_util::callee_path;
use crate::builtins::is_safe_callee;
use crate::hir::{BindingId, BindingRecord, DeclForm, ReactiveKind};

/// Where a tracked object came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ShapeSource {
    Literal = 0,
    Param = 1,
    Props = 2,
    Store = 3,
    #[default]
    Unknown = 4,
}

/// Per-binding shape summary.
#[derive(Debug, Clone, Default)]
pub struct ShapeRecord {
    pub source: ShapeSource,
    /// Statically observed member-access keys
    pub known_keys: FxHashSet<CompactString>,
    /// Observed `obj[expr]` with no narrowing information
    pub dynamic_access: bool,
    /// Literal sets dynamic keys were narrowed to
    pub narrowed_keys: FxHashSet<CompactString>,
    /// Keys written through (`obj.k = …`, `obj.k++`)
    pub mutable_keys: FxHashSet<CompactString>,
    /// Returned, passed to an opaque callee, or spread into a result
    pub escapes: bool,
    /// Spread source on some edge
    pub is_spread: bool,
}

impl ShapeRecord {
    /// A whole-object subscription is needed when a dynamic access could
    /// reach any key. Stores subscribe per-property regardless.
    pub fn needs_whole_object_subscription(&self) -> bool {
        self.dynamic_access && self.narrowed_keys.is_empty() && self.source != ShapeSource::Store
    }

    /// The property set a fine-grained subscription covers.
    pub fn property_subscription(&self) -> FxHashSet<CompactString> {
        let mut out = self.known_keys.clone();
        out.extend(self.narrowed_keys.iter().cloned());
        out.extend(self.mutable_keys.iter().cloned());
        out
    }

    pub fn needs_spread_wrapping(&self) -> bool {
        self.is_spread
    }
}

/// Narrowed candidate set for one variable on the current edge.
type NarrowSet = SmallVec<[CompactString; 4]>;

/// Run shape analysis over a module.
pub fn analyze_shapes(
    module: &Module,
    bindings: &[BindingRecord],
    resolutions: &FxHashMap<u32, BindingId>,
    dev: bool,
) -> (FxHashMap<BindingId, ShapeRecord>, Vec<RawDiagnostic>) {
    let mut analyzer = ShapeAnalyzer {
        bindings,
        resolutions,
        shapes: FxHashMap::default(),
        narrow: FxHashMap::default(),
        diagnostics: Vec::new(),
        dev,
        warned_dynamic: FxHashSet::default(),
    };
    analyzer.seed(module);
    for stmt in &module.body {
        analyzer.walk_stmt(stmt);
    }
    (analyzer.shapes, analyzer.diagnostics)
}

struct ShapeAnalyzer<'a> {
    bindings: &'a [BindingRecord],
    resolutions: &'a FxHashMap<u32, BindingId>,
    shapes: FxHashMap<BindingId, ShapeRecord>,
    /// Per-edge narrowing environment, keyed by name
    narrow: FxHashMap<CompactString, NarrowSet>,
    diagnostics: Vec<RawDiagnostic>,
    dev: bool,
    /// Bindings already warned for dynamic access (one warning per binding)
    warned_dynamic: FxHashSet<BindingId>,
}

impl<'a> ShapeAnalyzer<'a> {
    fn resolve(&self, ident: &Ident) -> Option<BindingId> {
        if ident.span.end <= ident.span.start {
            return None;
        }
        self.resolutions.get(&ident.span.start).copied()
    }

    /// Seed shape sources from binding records.
    fn seed(&mut self, _module: &Module) {
        for binding in self.bindings {
            let source = if binding.is_store {
                ShapeSource::Store
            } else if matches!(binding.decl_form, DeclForm::Param) {
                ShapeSource::Param
            } else if binding.kind == ReactiveKind::PropAccessor {
                ShapeSource::Props
            } else {
                match binding.init.as_ref().map(|e| e.unwrap_tsparen()) {
                    Some(Expr::Object(obj)) => {
                        let mut record = ShapeRecord {
                            source: ShapeSource::Literal,
                            ..Default::default()
                        };
                        for prop in &obj.props {
                            match prop {
                                ObjectProp::KeyValue { key, .. }
                                | ObjectProp::Method { key, .. } => {
                                    if let Some(name) = key.static_name() {
                                        record.known_keys.insert(CompactString::new(name));
                                    }
                                }
                                ObjectProp::Shorthand { name, .. } => {
                                    record.known_keys.insert(name.name.clone());
                                }
                                ObjectProp::Spread { .. } => {}
                            }
                        }
                        self.shapes.insert(binding.id, record);
                        continue;
                    }
                    _ => continue,
                }
            };
            self.shapes.insert(
                binding.id,
                ShapeRecord {
                    source,
                    ..Default::default()
                },
            );
        }
    }

    fn record(&mut self, id: BindingId) -> &mut ShapeRecord {
        self.shapes.entry(id).or_default()
    }

    /// Literal keys of a tracked literal-sourced binding.
    fn literal_keys(&self, id: BindingId) -> Option<NarrowSet> {
        let record = self.shapes.get(&id)?;
        if record.source != ShapeSource::Literal {
            return None;
        }
        Some(record.known_keys.iter().cloned().collect())
    }

    // -------------------------------------------------------------------------
    // Statement walk
    // -------------------------------------------------------------------------

    fn walk_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => self.walk_expr(&e.expr),
            Stmt::VarDecl(decl) => self.walk_var_decl(decl),
            Stmt::Func(f) => self.walk_function(&f.func),
            Stmt::Class(c) => {
                for member in &c.class.members {
                    match &member.kind {
                        ClassMemberKind::Method(f)
                        | ClassMemberKind::Getter(f)
                        | ClassMemberKind::Setter(f) => self.walk_function(f),
                        ClassMemberKind::Field(Some(e)) => self.walk_expr(e),
                        ClassMemberKind::Field(None) => {}
                    }
                }
            }
            Stmt::Return(r) => {
                if let Some(arg) = &r.arg {
                    self.mark_escaping(arg);
                    self.walk_expr(arg);
                }
            }
            Stmt::If(if_stmt) => self.walk_if(if_stmt),
            Stmt::Switch(sw) => self.walk_switch(sw),
            Stmt::While(w) => {
                self.walk_expr(&w.test);
                // fixed point: two passes over the body
                let saved = self.narrow.clone();
                self.walk_stmt(&w.body);
                self.walk_stmt(&w.body);
                self.narrow = saved;
            }
            Stmt::DoWhile(dw) => {
                let saved = self.narrow.clone();
                self.walk_stmt(&dw.body);
                self.walk_stmt(&dw.body);
                self.narrow = saved;
                self.walk_expr(&dw.test);
            }
            Stmt::For(f) => {
                match &f.init {
                    Some(ForInit::VarDecl(decl)) => self.walk_var_decl(decl),
                    Some(ForInit::Expr(e)) => self.walk_expr(e),
                    None => {}
                }
                if let Some(test) = &f.test {
                    self.walk_expr(test);
                }
                let saved = self.narrow.clone();
                self.walk_stmt(&f.body);
                if let Some(update) = &f.update {
                    self.walk_expr(update);
                }
                self.walk_stmt(&f.body);
                self.narrow = saved;
            }
            Stmt::ForIn(fi) => {
                self.walk_expr(&fi.object);
                let saved = self.narrow.clone();
                self.narrow_loop_head(&fi.left, &fi.object, true);
                self.walk_stmt(&fi.body);
                self.walk_stmt(&fi.body);
                self.narrow = saved;
            }
            Stmt::ForOf(fo) => {
                self.walk_expr(&fo.iterable);
                let saved = self.narrow.clone();
                self.narrow_loop_head(&fo.left, &fo.iterable, false);
                self.walk_stmt(&fo.body);
                self.walk_stmt(&fo.body);
                self.narrow = saved;
            }
            Stmt::Block(block) => {
                for s in &block.stmts {
                    self.walk_stmt(s);
                }
            }
            Stmt::Throw(t) => self.walk_expr(&t.arg),
            Stmt::Try(t) => {
                for s in &t.block.stmts {
                    self.walk_stmt(s);
                }
                if let Some(handler) = &t.handler {
                    for s in &handler.body.stmts {
                        self.walk_stmt(s);
                    }
                }
                if let Some(finalizer) = &t.finalizer {
                    for s in &finalizer.stmts {
                        self.walk_stmt(s);
                    }
                }
            }
            Stmt::Labeled(l) => self.walk_stmt(&l.body),
            Stmt::ExportNamed(e) => {
                if let Some(decl) = &e.decl {
                    self.walk_stmt(decl);
                }
            }
            Stmt::ExportDefault(e) => {
                self.mark_escaping(&e.expr);
                self.walk_expr(&e.expr);
            }
            Stmt::Break(_)
            | Stmt::Continue(_)
            | Stmt::Import(_)
            | Stmt::Empty(_)
            | Stmt::Debugger(_) => {}
        }
    }

    fn walk_var_decl(&mut self, decl: &VarDecl) {
        for declarator in &decl.decls {
            if let Some(init) = &declarator.init {
                self.walk_expr(init);
                // `const k = "a"` / `const k = flag ? "a" : "b"` seed narrowing
                if let Pattern::Ident(pat) = &declarator.pat {
                    if let Some(set) = string_candidates(init) {
                        self.narrow.insert(pat.name.clone(), set);
                    } else {
                        self.narrow.remove(&pat.name);
                    }
                }
            }
        }
    }

    fn walk_function(&mut self, func: &Function) {
        // inner scopes restart narrowing for names they shadow
        let saved = self.narrow.clone();
        let mut shadowed = Vec::new();
        for param in &func.params {
            param.bound_names(&mut shadowed);
        }
        for name in &shadowed {
            self.narrow.remove(name.as_str());
        }
        for stmt in &func.body.stmts {
            self.walk_stmt(stmt);
        }
        self.narrow = saved;
    }

    fn walk_if(&mut self, if_stmt: &IfStmt) {
        self.walk_expr(&if_stmt.test);
        let base = self.narrow.clone();

        // then-edge narrowing
        apply_narrowing(&mut self.narrow, &if_stmt.test);
        self.walk_stmt(&if_stmt.cons);

        // else-edge starts from the base environment
        self.narrow = base.clone();
        if let Some(alt) = &if_stmt.alt {
            self.walk_stmt(alt);
        }

        // join: conservative reset to the pre-branch environment
        self.narrow = base;
    }

    fn walk_switch(&mut self, sw: &SwitchStmt) {
        self.walk_expr(&sw.disc);
        let base = self.narrow.clone();
        let disc_name = sw.disc.as_ident_name().map(CompactString::new);

        for case in &sw.cases {
            self.narrow = base.clone();
            if let (Some(name), Some(test)) = (&disc_name, &case.test) {
                if let Some(Expr::Str(s)) = Some(test.unwrap_tsparen()) {
                    self.narrow
                        .insert(name.clone(), SmallVec::from_iter([CompactString::new(&s.value)]));
                }
            }
            for stmt in &case.body {
                self.walk_stmt(stmt);
            }
        }
        self.narrow = base;
    }

    /// Narrow a loop variable from a literal iterable:
    /// `for (const k of ["a","b"])`, `for (const k in {a, b})`,
    /// `for (const k of Object.keys(lit))`.
    fn narrow_loop_head(&mut self, head: &ForHead, iterable: &Expr, is_for_in: bool) {
        let name = match head {
            ForHead::VarDecl(_, Pattern::Ident(pat)) => pat.name.clone(),
            ForHead::Pattern(Pattern::Ident(pat)) => pat.name.clone(),
            _ => return,
        };
        let set = self.iterable_key_set(iterable, is_for_in);
        match set {
            Some(set) => {
                self.narrow.insert(name, set);
            }
            None => {
                self.narrow.remove(&name);
            }
        }
    }

    fn iterable_key_set(&self, iterable: &Expr, is_for_in: bool) -> Option<NarrowSet> {
        match iterable.unwrap_tsparen() {
            Expr::Array(arr) if !is_for_in => {
                let mut set = NarrowSet::new();
                for elem in arr.elems.iter().flatten() {
                    match elem.expr.unwrap_tsparen() {
                        Expr::Str(s) if !elem.spread => set.push(CompactString::new(&s.value)),
                        _ => return None,
                    }
                }
                Some(set)
            }
            Expr::Object(obj) if is_for_in => {
                let mut set = NarrowSet::new();
                for prop in &obj.props {
                    match prop {
                        ObjectProp::KeyValue { key, .. } => {
                            set.push(CompactString::new(key.static_name()?));
                        }
                        ObjectProp::Shorthand { name, .. } => set.push(name.name.clone()),
                        _ => return None,
                    }
                }
                Some(set)
            }
            Expr::Call(call) if !is_for_in => {
                // Object.keys(tracked-literal)
                if callee_path(&call.callee).as_deref() == Some("Object.keys") {
                    if let Some(Expr::Ident(arg)) =
                        call.args.first().map(|a| a.expr.unwrap_tsparen())
                    {
                        let id = self.resolve(arg)?;
                        return self.literal_keys(id);
                    }
                }
                None
            }
            _ => None,
        }
    }

    // -------------------------------------------------------------------------
    // Expression walk
    // -------------------------------------------------------------------------

    fn walk_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Member(member) => {
                self.record_member_access(member);
                self.walk_expr(&member.obj);
                if let MemberProp::Computed(prop) = &member.prop {
                    self.walk_expr(prop);
                }
            }
            Expr::Call(call) => {
                self.walk_call(call);
            }
            Expr::Assign(assign) => {
                self.record_assignment(assign);
                self.walk_expr(&assign.value);
                // re-narrow or invalidate the assigned name
                if let AssignTarget::Ident(target) = &assign.target {
                    if assign.op == AssignOp::Assign {
                        if let Some(set) = string_candidates(&assign.value) {
                            self.narrow.insert(target.name.clone(), set);
                        } else {
                            self.narrow.remove(&target.name);
                        }
                    } else {
                        self.narrow.remove(&target.name);
                    }
                }
            }
            Expr::Update(update) => {
                // `k++` invalidates narrowing immediately
                if let Some(name) = update.arg.as_ident_name() {
                    self.narrow.remove(name);
                }
                if let Expr::Member(member) = update.arg.unwrap_tsparen() {
                    self.record_member_mutation(member);
                }
                self.walk_expr(&update.arg);
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
                        ObjectProp::Shorthand { .. } => {}
                        ObjectProp::Method { func, .. } => self.walk_function(func),
                        ObjectProp::Spread { expr, .. } => {
                            self.mark_spread(expr);
                            self.walk_expr(expr);
                        }
                    }
                }
            }
            Expr::Array(arr) => {
                for elem in arr.elems.iter().flatten() {
                    if elem.spread {
                        self.mark_spread(&elem.expr);
                    }
                    self.walk_expr(&elem.expr);
                }
            }
            Expr::Func(f) => self.walk_function(&f.func),
            Expr::Arrow(arrow) => match &arrow.body {
                ArrowBody::Block(block) => {
                    let saved = self.narrow.clone();
                    let mut shadowed = Vec::new();
                    for param in &arrow.params {
                        param.bound_names(&mut shadowed);
                    }
                    for name in &shadowed {
                        self.narrow.remove(name.as_str());
                    }
                    for stmt in &block.stmts {
                        self.walk_stmt(stmt);
                    }
                    self.narrow = saved;
                }
                ArrowBody::Expr(e) => self.walk_expr(e),
            },
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
                let base = self.narrow.clone();
                apply_narrowing(&mut self.narrow, &c.test);
                self.walk_expr(&c.cons);
                self.narrow = base.clone();
                self.walk_expr(&c.alt);
                self.narrow = base;
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
            Expr::New(n) => {
                self.walk_expr(&n.callee);
                for arg in &n.args {
                    self.mark_escaping(&arg.expr);
                    self.walk_expr(&arg.expr);
                }
            }
            Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => self.walk_expr(&w.expr),
            Expr::Jsx(el) => self.walk_jsx(el),
            Expr::JsxFragment(frag) => {
                for child in &frag.children {
                    self.walk_jsx_child(child);
                }
            }
            Expr::ImportCall(i) => self.walk_expr(&i.arg),
            _ => {}
        }
    }

    fn walk_jsx(&mut self, el: &JsxElement) {
        for attr in &el.attrs {
            match attr {
                JsxAttr::Named(named) => {
                    if let Some(JsxAttrValue::Expr(e)) = &named.value {
                        self.walk_expr(e);
                    }
                }
                JsxAttr::Spread(spread) => {
                    self.mark_spread(&spread.expr);
                    self.walk_expr(&spread.expr);
                }
            }
        }
        for child in &el.children {
            self.walk_jsx_child(child);
        }
    }

    fn walk_jsx_child(&mut self, child: &JsxChild) {
        match child {
            JsxChild::Expr(e) => {
                if let Some(expr) = &e.expr {
                    self.walk_expr(expr);
                }
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

    fn walk_call(&mut self, call: &CallExpr) {
        self.walk_expr(&call.callee);
        let path = callee_path(&call.callee);
        let safe = path.as_deref().is_some_and(is_safe_callee);

        for arg in &call.args {
            if arg.spread {
                self.mark_spread(&arg.expr);
            }
            if !safe {
                // passing a tracked object to an opaque callee
                if let Expr::Ident(ident) = arg.expr.unwrap_tsparen() {
                    if let Some(id) = self.resolve(ident) {
                        if let Some(record) = self.shapes.get_mut(&id) {
                            record.escapes = true;
                            if self.dev
                                && record.source != ShapeSource::Store
                                && self.warned_dynamic.insert(id)
                            {
                                self.diagnostics.push(
                                    RawDiagnostic::new(
                                        WarningCode::DynamicAccess,
                                        format!(
                                            "passing \"{}\" to a black box callee widens its dependency to the whole object",
                                            ident.name
                                        ),
                                        ident.span,
                                    )
                                    .with_hint(
                                        "destructure the fields you need before the call, or use $store",
                                    ),
                                );
                            }
                        }
                    }
                }
            }
            self.walk_expr(&arg.expr);
        }
    }

    // -------------------------------------------------------------------------
    // Shape fact recording
    // -------------------------------------------------------------------------

    fn record_member_access(&mut self, member: &MemberExpr) {
        let Expr::Ident(obj) = member.obj.unwrap_tsparen() else {
            return;
        };
        let Some(id) = self.resolve(obj) else { return };
        if !self.shapes.contains_key(&id) {
            return;
        }

        match &member.prop {
            MemberProp::Ident(name, _) => {
                self.record(id).known_keys.insert(name.clone());
            }
            MemberProp::Computed(prop) => match prop.unwrap_tsparen() {
                Expr::Str(s) => {
                    self.record(id).known_keys.insert(CompactString::new(&s.value));
                }
                Expr::Ident(key_ident) => {
                    if let Some(set) = self.narrow.get(key_ident.name.as_str()).cloned() {
                        let record = self.record(id);
                        for key in set {
                            record.narrowed_keys.insert(key);
                        }
                    } else {
                        self.flag_dynamic(id, obj);
                    }
                }
                _ => {
                    self.flag_dynamic(id, obj);
                }
            },
        }
    }

    fn flag_dynamic(&mut self, id: BindingId, obj: &Ident) {
        let record = self.record(id);
        record.dynamic_access = true;
        let is_store = record.source == ShapeSource::Store;
        if self.dev && !is_store && self.warned_dynamic.insert(id) {
            self.diagnostics.push(
                RawDiagnostic::new(
                    WarningCode::DynamicAccess,
                    format!(
                        "dynamic property access on \"{}\" widens its dependency to the whole object",
                        obj.name
                    ),
                    obj.span,
                )
                .with_hint("narrow the key with a literal check, or use $store"),
            );
        }
    }

    fn record_assignment(&mut self, assign: &AssignExpr) {
        if let AssignTarget::Member(member) = &assign.target {
            self.record_member_mutation(member);
        }
    }

    fn record_member_mutation(&mut self, member: &MemberExpr) {
        let Expr::Ident(obj) = member.obj.unwrap_tsparen() else {
            return;
        };
        let Some(id) = self.resolve(obj) else { return };
        if !self.shapes.contains_key(&id) {
            return;
        }
        let key = match &member.prop {
            MemberProp::Ident(name, _) => Some(name.clone()),
            MemberProp::Computed(prop) => match prop.unwrap_tsparen() {
                Expr::Str(s) => Some(CompactString::new(&s.value)),
                _ => None,
            },
        };
        let record = self.record(id);
        match key {
            Some(key) => {
                record.mutable_keys.insert(key);
            }
            None => record.dynamic_access = true,
        }
    }

    fn mark_escaping(&mut self, expr: &Expr) {
        if let Expr::Ident(ident) = expr.unwrap_tsparen() {
            if let Some(id) = self.resolve(ident) {
                if let Some(record) = self.shapes.get_mut(&id) {
                    record.escapes = true;
                }
            }
        }
    }

    fn mark_spread(&mut self, expr: &Expr) {
        if let Expr::Ident(ident) = expr.unwrap_tsparen() {
            if let Some(id) = self.resolve(ident) {
                if let Some(record) = self.shapes.get_mut(&id) {
                    record.is_spread = true;
                    record.escapes = true;
                }
            }
        }
    }
}

/// Candidate string set of an expression: `"a"`, `flag ? "a" : "b"`.
fn string_candidates(expr: &Expr) -> Option<NarrowSet> {
    match expr.unwrap_tsparen() {
        Expr::Str(s) => Some(SmallVec::from_iter([CompactString::new(&s.value)])),
        Expr::Cond(cond) => {
            let mut cons = string_candidates(&cond.cons)?;
            let alt = string_candidates(&cond.alt)?;
            cons.extend(alt);
            Some(cons)
        }
        _ => None,
    }
}

/// Apply narrowing facts from a branch test to the then-edge environment.
///
/// `k === "a"` narrows to `{"a"}`; loose `==` does not narrow. `a || b`
/// unions both sides' facts per name; `a && b` applies both in sequence.
fn apply_narrowing(env: &mut FxHashMap<CompactString, NarrowSet>, test: &Expr) {
    match test.unwrap_tsparen() {
        Expr::Binary(bin) if bin.op == BinaryOp::StrictEq => {
            let (name, value) = match (bin.left.unwrap_tsparen(), bin.right.unwrap_tsparen()) {
                (Expr::Ident(id), Expr::Str(s)) | (Expr::Str(s), Expr::Ident(id)) => {
                    (id.name.clone(), CompactString::new(&s.value))
                }
                _ => return,
            };
            env.insert(name, SmallVec::from_iter([value]));
        }
        Expr::Logical(log) => match log.op {
            LogicalOp::And => {
                apply_narrowing(env, &log.left);
                apply_narrowing(env, &log.right);
            }
            LogicalOp::Or => {
                let mut left_env = env.clone();
                let mut right_env = env.clone();
                apply_narrowing(&mut left_env, &log.left);
                apply_narrowing(&mut right_env, &log.right);
                for (name, left_set) in left_env {
                    if env.get(&name).map(|s| s.as_slice()) == Some(left_set.as_slice()) {
                        continue; // no new fact from the left side
                    }
                    if let Some(right_set) = right_env.get(&name) {
                        if env.get(&name).map(|s| s.as_slice()) != Some(right_set.as_slice()) {
                            let mut union = left_set;
                            for key in right_set {
                                if !union.contains(key) {
                                    union.push(key.clone());
                                }
                            }
                            env.insert(name, union);
                        }
                    }
                }
            }
            LogicalOp::Nullish => {}
        },
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_candidates() {
        let s = Expr::Str(StrLit {
            value: "a".into(),
            span: fict_carton::Span::STUB,
        });
        let set = string_candidates(&s).unwrap();
        assert_eq!(set.as_slice(), ["a"]);
    }

    #[test]
    fn test_apply_narrowing_strict_eq() {
        let test = Expr::Binary(Box::new(BinaryExpr {
            op: BinaryOp::StrictEq,
            left: Expr::Ident(Ident::new("k", fict_carton::Span::new(0, 1))),
            right: Expr::Str(StrLit {
                value: "a".into(),
                span: fict_carton::Span::new(5, 8),
            }),
            span: fict_carton::Span::new(0, 8),
        }));
        let mut env = FxHashMap::default();
        apply_narrowing(&mut env, &test);
        assert_eq!(env.get("k").unwrap().as_slice(), ["a"]);
    }

    #[test]
    fn test_loose_eq_does_not_narrow() {
        let test = Expr::Binary(Box::new(BinaryExpr {
            op: BinaryOp::Eq,
            left: Expr::Ident(Ident::new("k", fict_carton::Span::new(0, 1))),
            right: Expr::Str(StrLit {
                value: "a".into(),
                span: fict_carton::Span::new(5, 8),
            }),
            span: fict_carton::Span::new(0, 8),
        }));
        let mut env = FxHashMap::default();
        apply_narrowing(&mut env, &test);
        assert!(env.is_empty());
    }

    #[test]
    fn test_whole_object_subscription() {
        let mut record = ShapeRecord {
            dynamic_access: true,
            ..Default::default()
        };
        assert!(record.needs_whole_object_subscription());
        record.narrowed_keys.insert("a".into());
        assert!(!record.needs_whole_object_subscription());

        let store = ShapeRecord {
            source: ShapeSource::Store,
            dynamic_access: true,
            ..Default::default()
        };
        assert!(!store.needs_whole_object_subscription());
    }
}
