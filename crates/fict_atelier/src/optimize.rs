//! The optimizer.
//!
//! Pure-expression rewrites (constant folding, algebraic simplification,
//! conditional simplification) run over the AST before analysis; cross-block
//! CSE runs after analysis with binding knowledge; reactive-graph DCE marks
//! dead memos for the emitter; the getter-cache scan feeds per-function
//! accessor caching. Every rewrite is observationally equivalent to the
//! unoptimized output.

use fict_carton::{FxHashMap, FxHashSet, Span};
use fict_croquis::ast_util::{expr_fingerprint, is_pure_expr};
use fict_croquis::hir::{BindingId, ReactiveKind, UseProfile};
use fict_croquis::AnalysisSummary;
use fict_relief::ast::*;
use fict_relief::options::{CompilerOptions, OptimizeLevel};

// -----------------------------------------------------------------------------
// Constant folding / algebraic simplification
// -----------------------------------------------------------------------------

/// Fold the whole module in place.
pub fn fold_module(module: &mut Module, level: OptimizeLevel) {
    for stmt in &mut module.body {
        fold_stmt(stmt, level);
    }
}

fn fold_stmt(stmt: &mut Stmt, level: OptimizeLevel) {
    for_each_expr_mut(stmt, &mut |expr| {
        if let Some(folded) = simplify_expr(expr, level) {
            *expr = folded;
        }
    });
}

fn num_lit(value: f64, span: Span) -> Option<Expr> {
    if !value.is_finite() {
        return None;
    }
    Some(Expr::Number(NumberLit {
        value,
        raw: format!("{value}").into(),
        span,
    }))
}

fn bool_lit(value: bool, span: Span) -> Expr {
    Expr::Bool(BoolLit { value, span })
}

fn as_number(expr: &Expr) -> Option<f64> {
    match expr.unwrap_tsparen() {
        Expr::Number(n) => Some(n.value),
        Expr::Unary(u) if u.op == UnaryOp::Minus => as_number(&u.arg).map(|v| -v),
        _ => None,
    }
}

fn as_string(expr: &Expr) -> Option<&str> {
    match expr.unwrap_tsparen() {
        Expr::Str(s) => Some(&s.value),
        _ => None,
    }
}

fn as_bool(expr: &Expr) -> Option<bool> {
    match expr.unwrap_tsparen() {
        Expr::Bool(b) => Some(b.value),
        _ => None,
    }
}

fn is_nullish_literal(expr: &Expr) -> Option<bool> {
    match expr.unwrap_tsparen() {
        Expr::Null(_) => Some(true),
        Expr::Ident(id) if id.name == "undefined" => Some(true),
        Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) | Expr::BigInt(_) | Expr::Regex(_) => {
            Some(false)
        }
        Expr::Array(_) | Expr::Object(_) | Expr::Arrow(_) | Expr::Func(_)
        | Expr::Template(_) => Some(false),
        _ => None,
    }
}

/// Syntactically provable number-valued expression (the guard for
/// non-literal algebraic identities).
fn is_numeric(expr: &Expr) -> bool {
    match expr.unwrap_tsparen() {
        Expr::Number(_) => true,
        Expr::Unary(u) => matches!(u.op, UnaryOp::Minus | UnaryOp::Plus) && is_numeric(&u.arg),
        Expr::Update(_) => true,
        Expr::Binary(b) => match b.op {
            BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Mod
            | BinaryOp::Exp
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::UShr
            | BinaryOp::BitAnd
            | BinaryOp::BitOr
            | BinaryOp::BitXor => true,
            BinaryOp::Add => is_numeric(&b.left) && is_numeric(&b.right),
            _ => false,
        },
        _ => false,
    }
}

fn simplify_expr(expr: &Expr, level: OptimizeLevel) -> Option<Expr> {
    let span = expr.span();
    match expr {
        Expr::Binary(b) => {
            // constant folding on fully constant operands (both levels)
            if let (Some(l), Some(r)) = (as_number(&b.left), as_number(&b.right)) {
                let folded = match b.op {
                    BinaryOp::Add => num_lit(l + r, span),
                    BinaryOp::Sub => num_lit(l - r, span),
                    BinaryOp::Mul => num_lit(l * r, span),
                    BinaryOp::Div => num_lit(l / r, span),
                    BinaryOp::Mod => num_lit(l % r, span),
                    BinaryOp::Exp => num_lit(l.powf(r), span),
                    BinaryOp::Lt => Some(bool_lit(l < r, span)),
                    BinaryOp::LtEq => Some(bool_lit(l <= r, span)),
                    BinaryOp::Gt => Some(bool_lit(l > r, span)),
                    BinaryOp::GtEq => Some(bool_lit(l >= r, span)),
                    BinaryOp::Eq | BinaryOp::StrictEq => Some(bool_lit(l == r, span)),
                    BinaryOp::NotEq | BinaryOp::StrictNotEq => Some(bool_lit(l != r, span)),
                    _ => None,
                };
                if folded.is_some() {
                    return folded;
                }
            }
            if let (Some(l), Some(r)) = (as_string(&b.left), as_string(&b.right)) {
                match b.op {
                    BinaryOp::Add => {
                        return Some(Expr::Str(StrLit {
                            value: format!("{l}{r}"),
                            span,
                        }))
                    }
                    BinaryOp::Eq | BinaryOp::StrictEq => return Some(bool_lit(l == r, span)),
                    BinaryOp::NotEq | BinaryOp::StrictNotEq => {
                        return Some(bool_lit(l != r, span))
                    }
                    _ => {}
                }
            }

            if level == OptimizeLevel::Full {
                // identities with numericity guards
                let left_num = is_numeric(&b.left);
                let right_num = is_numeric(&b.right);
                match b.op {
                    BinaryOp::Add => {
                        if as_number(&b.right) == Some(0.0) && left_num {
                            return Some(b.left.clone());
                        }
                        if as_number(&b.left) == Some(0.0) && right_num {
                            return Some(b.right.clone());
                        }
                    }
                    BinaryOp::Sub => {
                        if as_number(&b.right) == Some(0.0) && left_num {
                            return Some(b.left.clone());
                        }
                    }
                    BinaryOp::Mul => {
                        if as_number(&b.right) == Some(1.0) && left_num {
                            return Some(b.left.clone());
                        }
                        if as_number(&b.left) == Some(1.0) && right_num {
                            return Some(b.right.clone());
                        }
                    }
                    BinaryOp::Div => {
                        if as_number(&b.right) == Some(1.0) && left_num {
                            return Some(b.left.clone());
                        }
                    }
                    BinaryOp::Exp => {
                        if as_number(&b.right) == Some(1.0) && left_num {
                            return Some(b.left.clone());
                        }
                        if as_number(&b.right) == Some(0.0) && left_num {
                            return num_lit(1.0, span);
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        Expr::Logical(l) => {
            // fully constant operands fold at both levels
            if let (Some(lv), Some(rv)) = (as_bool(&l.left), as_bool(&l.right)) {
                let folded = match l.op {
                    LogicalOp::And => lv && rv,
                    LogicalOp::Or => lv || rv,
                    LogicalOp::Nullish => lv,
                };
                return Some(bool_lit(folded, span));
            }
            match l.op {
                LogicalOp::Nullish => match is_nullish_literal(&l.left) {
                    Some(true) => return Some(l.right.clone()),
                    Some(false) => return Some(l.left.clone()),
                    None => {}
                },
                LogicalOp::And if level == OptimizeLevel::Full => match as_bool(&l.left) {
                    Some(true) => return Some(l.right.clone()),
                    Some(false) => return Some(bool_lit(false, span)),
                    None => {
                        if as_bool(&l.right) == Some(true) {
                            return Some(l.left.clone());
                        }
                    }
                },
                LogicalOp::Or if level == OptimizeLevel::Full => match as_bool(&l.left) {
                    Some(false) => return Some(l.right.clone()),
                    Some(true) => return Some(bool_lit(true, span)),
                    None => {
                        if as_bool(&l.right) == Some(false) {
                            return Some(l.left.clone());
                        }
                    }
                },
                _ => {}
            }
            None
        }
        Expr::Unary(u) => {
            if u.op == UnaryOp::Not {
                if let Some(v) = as_bool(&u.arg) {
                    return Some(bool_lit(!v, span));
                }
            }
            if u.op == UnaryOp::Minus && level == OptimizeLevel::Full {
                // double negation
                if let Expr::Unary(inner) = u.arg.unwrap_tsparen() {
                    if inner.op == UnaryOp::Minus && is_numeric(&inner.arg) {
                        return Some(inner.arg.clone());
                    }
                }
            }
            None
        }
        Expr::Cond(c) => {
            if let Some(test) = as_bool(&c.test) {
                return Some(if test { c.cons.clone() } else { c.alt.clone() });
            }
            // `c ? a : a` when the test is side-effect-free
            if is_pure_expr(&c.test) {
                if let (Some(cons), Some(alt)) =
                    (expr_fingerprint(&c.cons), expr_fingerprint(&c.alt))
                {
                    if cons == alt {
                        return Some(c.cons.clone());
                    }
                }
            }
            None
        }
        _ => None,
    }
}

// -----------------------------------------------------------------------------
// Cross-block CSE
// -----------------------------------------------------------------------------

/// Hoist pure expressions repeated across statements into temporaries.
/// Applies only to expressions whose identifiers resolve to plain,
/// never-reassigned bindings, so reactive dependency tracking is untouched.
pub fn apply_cse(module: &mut Module, summary: &AnalysisSummary) {
    let mut counter = 0u32;
    cse_stmt_list(&mut module.body, summary, &mut counter);
}

fn cse_stmt_list(stmts: &mut Vec<Stmt>, summary: &AnalysisSummary, counter: &mut u32) {
    // recurse into nested function bodies first
    for stmt in stmts.iter_mut() {
        visit_fn_bodies(stmt, &mut |body| cse_stmt_list(body, summary, counter));
    }

    // occurrence counting, skipping nested functions and special inits
    let mut seen: FxHashMap<String, (usize, FxHashSet<usize>)> = FxHashMap::default();
    for (index, stmt) in stmts.iter().enumerate() {
        collect_exprs_shallow(stmt, summary, &mut |expr| {
            if !is_cse_candidate(summary, expr) {
                return;
            }
            if let Some(key) = expr_fingerprint(expr) {
                let entry = seen.entry(key).or_insert((index, FxHashSet::default()));
                entry.1.insert(index);
            }
        });
    }

    let mut chosen: Vec<(String, usize)> = seen
        .into_iter()
        .filter(|(_, (_, indices))| indices.len() >= 2)
        .map(|(key, (first, _))| (key, first))
        .collect();
    if chosen.is_empty() {
        return;
    }
    chosen.sort_by_key(|(_, first)| *first);

    // replace occurrences and insert the temporaries before first use
    let mut inserts: Vec<(usize, Stmt)> = Vec::new();
    for (key, first) in chosen {
        let name = format!("__cse_{counter}");
        *counter += 1;

        let mut template: Option<Expr> = None;
        for stmt in stmts.iter_mut() {
            replace_exprs_shallow(stmt, summary, &mut |expr| {
                if expr_fingerprint(expr).as_deref() == Some(key.as_str()) {
                    if template.is_none() {
                        template = Some(expr.clone());
                    }
                    *expr = Expr::Ident(Ident::new(name.clone(), Span::STUB));
                }
            });
        }
        let Some(init) = template else { continue };
        let span = Span::STUB;
        inserts.push((
            first,
            Stmt::VarDecl(VarDecl {
                kind: VarKind::Const,
                decls: vec![Declarator {
                    pat: Pattern::Ident(IdentPat {
                        name: name.into(),
                        span,
                    }),
                    init: Some(init),
                    span,
                }],
                span,
            }),
        ));
    }

    // insert from the back so earlier indices stay valid
    inserts.sort_by_key(|(index, _)| std::cmp::Reverse(*index));
    for (index, stmt) in inserts {
        stmts.insert(index, stmt);
    }
}

fn is_cse_candidate(summary: &AnalysisSummary, expr: &Expr) -> bool {
    if !matches!(expr, Expr::Binary(_) | Expr::Logical(_)) {
        return false;
    }
    if !is_pure_expr(expr) {
        return false;
    }
    idents_all_stable(summary, expr)
}

/// Every identifier resolves to a plain, never-reassigned binding.
fn idents_all_stable(summary: &AnalysisSummary, expr: &Expr) -> bool {
    fn check(summary: &AnalysisSummary, expr: &Expr) -> bool {
        match expr {
            Expr::Ident(ident) => {
                if ident.span.end <= ident.span.start {
                    return false;
                }
                let Some(id) = summary.resolve_at(ident.span.start) else {
                    return false;
                };
                let binding = summary.binding(id);
                binding.kind == ReactiveKind::Plain
                    && !binding.profile.contains(UseProfile::REASSIGNED)
            }
            Expr::Number(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Null(_) | Expr::BigInt(_) => {
                true
            }
            Expr::Binary(b) => check(summary, &b.left) && check(summary, &b.right),
            Expr::Logical(l) => check(summary, &l.left) && check(summary, &l.right),
            Expr::Unary(u) => check(summary, &u.arg),
            Expr::Paren(p) => check(summary, &p.expr),
            Expr::Member(m) => {
                let prop_ok = match &m.prop {
                    MemberProp::Computed(p) => check(summary, p),
                    MemberProp::Ident(..) => true,
                };
                prop_ok && check(summary, &m.obj)
            }
            Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => check(summary, &w.expr),
            _ => false,
        }
    }
    check(summary, expr)
}

// -----------------------------------------------------------------------------
// Reactive-graph DCE
// -----------------------------------------------------------------------------

/// Memos with no live use site. Explicit `$memo` wrappers and region fields
/// are never eliminated.
pub fn reactive_dce(summary: &AnalysisSummary, options: &CompilerOptions) -> FxHashSet<BindingId> {
    if !options.optimize {
        return FxHashSet::default();
    }

    let memo_like: Vec<&fict_croquis::hir::BindingRecord> = summary
        .bindings
        .iter()
        .filter(|b| {
            b.kind == ReactiveKind::Memo && !b.is_explicit_memo && b.region.is_none()
        })
        .collect();
    if memo_like.is_empty() {
        return FxHashSet::default();
    }

    // reads that come from other reactive initializers
    let mut init_refs: FxHashMap<BindingId, u32> = FxHashMap::default();
    for binding in &summary.bindings {
        if binding.deps.is_empty() {
            continue;
        }
        for dep in &binding.deps {
            *init_refs.entry(*dep).or_insert(0) += 1;
        }
    }

    let mut live: FxHashSet<BindingId> = FxHashSet::default();
    let mut work: Vec<BindingId> = Vec::new();
    for binding in &memo_like {
        let refs = init_refs.get(&binding.id).copied().unwrap_or(0);
        let has_other_reads = binding.read_count > refs;
        if binding.profile.is_dce_root() || has_other_reads {
            work.push(binding.id);
        }
    }
    // everything a live consumer depends on stays live
    while let Some(id) = work.pop() {
        if !live.insert(id) {
            continue;
        }
        for dep in &summary.binding(id).deps {
            work.push(*dep);
        }
    }
    // non-memo consumers (regions, explicit memos, effects run through
    // read_count) keep their dependencies alive
    for binding in &summary.bindings {
        let keeps_deps = match binding.kind {
            ReactiveKind::Memo if binding.is_explicit_memo => true,
            ReactiveKind::RegionMemoField => true,
            _ => false,
        };
        if keeps_deps {
            for dep in &binding.deps {
                if live.insert(*dep) {
                    let mut work = summary.binding(*dep).deps.clone();
                    while let Some(id) = work.pop() {
                        if live.insert(id) {
                            work.extend(summary.binding(id).deps.iter().copied());
                        }
                    }
                }
            }
        }
    }

    memo_like
        .iter()
        .filter(|b| !live.contains(&b.id))
        .map(|b| b.id)
        .collect()
}

// -----------------------------------------------------------------------------
// Getter-cache scan
// -----------------------------------------------------------------------------

/// Count memo accessor reads in one synchronous function body, excluding
/// nested function bodies, JSX (lowered to thunks), and reactive
/// initializers (lowered to thunks).
pub fn getter_cache_counts(summary: &AnalysisSummary, stmts: &[Stmt]) -> Vec<(BindingId, u32)> {
    let mut counts: FxHashMap<BindingId, u32> = FxHashMap::default();
    for stmt in stmts {
        count_stmt(summary, stmt, &mut counts);
    }
    let mut out: Vec<(BindingId, u32)> = counts.into_iter().collect();
    out.sort_by_key(|(id, _)| *id);
    out
}

fn count_stmt(summary: &AnalysisSummary, stmt: &Stmt, counts: &mut FxHashMap<BindingId, u32>) {
    match stmt {
        Stmt::Expr(e) => count_expr(summary, &e.expr, counts),
        Stmt::VarDecl(decl) => {
            for declarator in &decl.decls {
                let special = declarator
                    .pat
                    .as_ident()
                    .filter(|pat| pat.span.end > pat.span.start)
                    .and_then(|pat| summary.resolve_at(pat.span.start))
                    .is_some_and(|id| summary.binding(id).kind != ReactiveKind::Plain);
                if special {
                    continue;
                }
                if let Some(init) = &declarator.init {
                    count_expr(summary, init, counts);
                }
            }
        }
        Stmt::Return(r) => {
            if let Some(arg) = &r.arg {
                count_expr(summary, arg, counts);
            }
        }
        Stmt::If(if_stmt) => {
            count_expr(summary, &if_stmt.test, counts);
            count_stmt(summary, &if_stmt.cons, counts);
            if let Some(alt) = &if_stmt.alt {
                count_stmt(summary, alt, counts);
            }
        }
        Stmt::Switch(sw) => {
            count_expr(summary, &sw.disc, counts);
            for case in &sw.cases {
                if let Some(test) = &case.test {
                    count_expr(summary, test, counts);
                }
                for s in &case.body {
                    count_stmt(summary, s, counts);
                }
            }
        }
        Stmt::While(w) => {
            count_expr(summary, &w.test, counts);
            count_stmt(summary, &w.body, counts);
        }
        Stmt::DoWhile(dw) => {
            count_stmt(summary, &dw.body, counts);
            count_expr(summary, &dw.test, counts);
        }
        Stmt::For(f) => {
            match &f.init {
                Some(ForInit::VarDecl(decl)) => {
                    for declarator in &decl.decls {
                        if let Some(init) = &declarator.init {
                            count_expr(summary, init, counts);
                        }
                    }
                }
                Some(ForInit::Expr(e)) => count_expr(summary, e, counts),
                None => {}
            }
            if let Some(test) = &f.test {
                count_expr(summary, test, counts);
            }
            if let Some(update) = &f.update {
                count_expr(summary, update, counts);
            }
            count_stmt(summary, &f.body, counts);
        }
        Stmt::ForIn(fi) => {
            count_expr(summary, &fi.object, counts);
            count_stmt(summary, &fi.body, counts);
        }
        Stmt::ForOf(fo) => {
            count_expr(summary, &fo.iterable, counts);
            count_stmt(summary, &fo.body, counts);
        }
        Stmt::Block(block) => {
            for s in &block.stmts {
                count_stmt(summary, s, counts);
            }
        }
        Stmt::Throw(t) => count_expr(summary, &t.arg, counts),
        Stmt::Try(t) => {
            for s in &t.block.stmts {
                count_stmt(summary, s, counts);
            }
            if let Some(handler) = &t.handler {
                for s in &handler.body.stmts {
                    count_stmt(summary, s, counts);
                }
            }
            if let Some(finalizer) = &t.finalizer {
                for s in &finalizer.stmts {
                    count_stmt(summary, s, counts);
                }
            }
        }
        Stmt::Labeled(l) => count_stmt(summary, &l.body, counts),
        _ => {}
    }
}

fn count_expr(summary: &AnalysisSummary, expr: &Expr, counts: &mut FxHashMap<BindingId, u32>) {
    match expr {
        Expr::Ident(ident) => {
            if ident.span.end <= ident.span.start {
                return;
            }
            if let Some(id) = summary.resolve_at(ident.span.start) {
                if summary.binding(id).kind == ReactiveKind::Memo {
                    *counts.entry(id).or_insert(0) += 1;
                }
            }
        }
        // function boundaries and JSX thunks never share the cache
        Expr::Arrow(_) | Expr::Func(_) | Expr::Jsx(_) | Expr::JsxFragment(_) => {}
        Expr::Call(call) => {
            // macro arguments lower into thunks
            if call
                .callee
                .as_ident_name()
                .is_some_and(|name| name == "$effect" || name == "$memo" || name == "$state")
            {
                return;
            }
            count_expr(summary, &call.callee, counts);
            for arg in &call.args {
                count_expr(summary, &arg.expr, counts);
            }
        }
        Expr::Member(m) => {
            count_expr(summary, &m.obj, counts);
            if let MemberProp::Computed(p) = &m.prop {
                count_expr(summary, p, counts);
            }
        }
        Expr::Binary(b) => {
            count_expr(summary, &b.left, counts);
            count_expr(summary, &b.right, counts);
        }
        Expr::Logical(l) => {
            count_expr(summary, &l.left, counts);
            count_expr(summary, &l.right, counts);
        }
        Expr::Cond(c) => {
            count_expr(summary, &c.test, counts);
            count_expr(summary, &c.cons, counts);
            count_expr(summary, &c.alt, counts);
        }
        Expr::Unary(u) => count_expr(summary, &u.arg, counts),
        Expr::Update(u) => count_expr(summary, &u.arg, counts),
        Expr::Paren(p) => count_expr(summary, &p.expr, counts),
        Expr::Seq(s) => {
            for e in &s.exprs {
                count_expr(summary, e, counts);
            }
        }
        Expr::Template(t) => {
            for e in &t.exprs {
                count_expr(summary, e, counts);
            }
        }
        Expr::Array(arr) => {
            for elem in arr.elems.iter().flatten() {
                count_expr(summary, &elem.expr, counts);
            }
        }
        Expr::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    ObjectProp::KeyValue { value, .. } => count_expr(summary, value, counts),
                    ObjectProp::Spread { expr, .. } => count_expr(summary, expr, counts),
                    _ => {}
                }
            }
        }
        Expr::Assign(a) => count_expr(summary, &a.value, counts),
        Expr::Await(a) => count_expr(summary, &a.arg, counts),
        Expr::New(n) => {
            count_expr(summary, &n.callee, counts);
            for arg in &n.args {
                count_expr(summary, &arg.expr, counts);
            }
        }
        Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => {
            count_expr(summary, &w.expr, counts)
        }
        _ => {}
    }
}

// -----------------------------------------------------------------------------
// AST walkers
// -----------------------------------------------------------------------------

/// Post-order mutation over every expression in a statement (descending
/// into nested functions and JSX).
pub fn for_each_expr_mut(stmt: &mut Stmt, f: &mut impl FnMut(&mut Expr)) {
    match stmt {
        Stmt::Expr(e) => visit_expr_mut(&mut e.expr, f),
        Stmt::VarDecl(decl) => {
            for declarator in &mut decl.decls {
                visit_pattern_mut(&mut declarator.pat, f);
                if let Some(init) = &mut declarator.init {
                    visit_expr_mut(init, f);
                }
            }
        }
        Stmt::Func(func) => {
            for s in &mut func.func.body.stmts {
                for_each_expr_mut(s, f);
            }
        }
        Stmt::Class(class) => {
            if let Some(super_class) = &mut class.class.super_class {
                visit_expr_mut(super_class, f);
            }
            for member in &mut class.class.members {
                match &mut member.kind {
                    ClassMemberKind::Method(func)
                    | ClassMemberKind::Getter(func)
                    | ClassMemberKind::Setter(func) => {
                        for s in &mut func.body.stmts {
                            for_each_expr_mut(s, f);
                        }
                    }
                    ClassMemberKind::Field(Some(value)) => visit_expr_mut(value, f),
                    ClassMemberKind::Field(None) => {}
                }
            }
        }
        Stmt::Return(r) => {
            if let Some(arg) = &mut r.arg {
                visit_expr_mut(arg, f);
            }
        }
        Stmt::If(if_stmt) => {
            visit_expr_mut(&mut if_stmt.test, f);
            for_each_expr_mut(&mut if_stmt.cons, f);
            if let Some(alt) = &mut if_stmt.alt {
                for_each_expr_mut(alt, f);
            }
        }
        Stmt::Switch(sw) => {
            visit_expr_mut(&mut sw.disc, f);
            for case in &mut sw.cases {
                if let Some(test) = &mut case.test {
                    visit_expr_mut(test, f);
                }
                for s in &mut case.body {
                    for_each_expr_mut(s, f);
                }
            }
        }
        Stmt::While(w) => {
            visit_expr_mut(&mut w.test, f);
            for_each_expr_mut(&mut w.body, f);
        }
        Stmt::DoWhile(dw) => {
            for_each_expr_mut(&mut dw.body, f);
            visit_expr_mut(&mut dw.test, f);
        }
        Stmt::For(for_stmt) => {
            match &mut for_stmt.init {
                Some(ForInit::VarDecl(decl)) => {
                    for declarator in &mut decl.decls {
                        if let Some(init) = &mut declarator.init {
                            visit_expr_mut(init, f);
                        }
                    }
                }
                Some(ForInit::Expr(e)) => visit_expr_mut(e, f),
                None => {}
            }
            if let Some(test) = &mut for_stmt.test {
                visit_expr_mut(test, f);
            }
            if let Some(update) = &mut for_stmt.update {
                visit_expr_mut(update, f);
            }
            for_each_expr_mut(&mut for_stmt.body, f);
        }
        Stmt::ForIn(fi) => {
            visit_expr_mut(&mut fi.object, f);
            for_each_expr_mut(&mut fi.body, f);
        }
        Stmt::ForOf(fo) => {
            visit_expr_mut(&mut fo.iterable, f);
            for_each_expr_mut(&mut fo.body, f);
        }
        Stmt::Block(block) => {
            for s in &mut block.stmts {
                for_each_expr_mut(s, f);
            }
        }
        Stmt::Throw(t) => visit_expr_mut(&mut t.arg, f),
        Stmt::Try(t) => {
            for s in &mut t.block.stmts {
                for_each_expr_mut(s, f);
            }
            if let Some(handler) = &mut t.handler {
                for s in &mut handler.body.stmts {
                    for_each_expr_mut(s, f);
                }
            }
            if let Some(finalizer) = &mut t.finalizer {
                for s in &mut finalizer.stmts {
                    for_each_expr_mut(s, f);
                }
            }
        }
        Stmt::Labeled(l) => for_each_expr_mut(&mut l.body, f),
        Stmt::ExportNamed(export) => {
            if let Some(decl) = &mut export.decl {
                for_each_expr_mut(decl, f);
            }
        }
        Stmt::ExportDefault(export) => visit_expr_mut(&mut export.expr, f),
        _ => {}
    }
}

fn visit_pattern_mut(pat: &mut Pattern, f: &mut impl FnMut(&mut Expr)) {
    match pat {
        Pattern::Ident(_) => {}
        Pattern::Object(obj) => {
            for prop in &mut obj.props {
                if let PropName::Computed(key) = &mut prop.key {
                    visit_expr_mut(key, f);
                }
                visit_pattern_mut(&mut prop.value, f);
            }
            if let Some(rest) = &mut obj.rest {
                visit_pattern_mut(rest, f);
            }
        }
        Pattern::Array(arr) => {
            for elem in arr.elems.iter_mut().flatten() {
                visit_pattern_mut(elem, f);
            }
        }
        Pattern::Assign(assign) => {
            visit_pattern_mut(&mut assign.target, f);
            visit_expr_mut(&mut assign.default, f);
        }
        Pattern::Rest(rest) => visit_pattern_mut(&mut rest.arg, f),
    }
}

fn visit_expr_mut(expr: &mut Expr, f: &mut impl FnMut(&mut Expr)) {
    match expr {
        Expr::Array(arr) => {
            for elem in arr.elems.iter_mut().flatten() {
                visit_expr_mut(&mut elem.expr, f);
            }
        }
        Expr::Object(obj) => {
            for prop in &mut obj.props {
                match prop {
                    ObjectProp::KeyValue { key, value, .. } => {
                        if let PropName::Computed(k) = key {
                            visit_expr_mut(k, f);
                        }
                        visit_expr_mut(value, f);
                    }
                    ObjectProp::Method { func, .. } => {
                        for s in &mut func.body.stmts {
                            for_each_expr_mut(s, f);
                        }
                    }
                    ObjectProp::Spread { expr, .. } => visit_expr_mut(expr, f),
                    ObjectProp::Shorthand { .. } => {}
                }
            }
        }
        Expr::Func(func) => {
            for s in &mut func.func.body.stmts {
                for_each_expr_mut(s, f);
            }
        }
        Expr::Arrow(arrow) => match &mut arrow.body {
            ArrowBody::Block(block) => {
                for s in &mut block.stmts {
                    for_each_expr_mut(s, f);
                }
            }
            ArrowBody::Expr(e) => visit_expr_mut(e, f),
        },
        Expr::Unary(u) => visit_expr_mut(&mut u.arg, f),
        Expr::Update(u) => visit_expr_mut(&mut u.arg, f),
        Expr::Binary(b) => {
            visit_expr_mut(&mut b.left, f);
            visit_expr_mut(&mut b.right, f);
        }
        Expr::Logical(l) => {
            visit_expr_mut(&mut l.left, f);
            visit_expr_mut(&mut l.right, f);
        }
        Expr::Assign(assign) => {
            visit_expr_mut(&mut assign.value, f);
        }
        Expr::Member(m) => {
            visit_expr_mut(&mut m.obj, f);
            if let MemberProp::Computed(p) = &mut m.prop {
                visit_expr_mut(p, f);
            }
        }
        Expr::Call(call) => {
            visit_expr_mut(&mut call.callee, f);
            for arg in &mut call.args {
                visit_expr_mut(&mut arg.expr, f);
            }
        }
        Expr::New(new) => {
            visit_expr_mut(&mut new.callee, f);
            for arg in &mut new.args {
                visit_expr_mut(&mut arg.expr, f);
            }
        }
        Expr::Cond(c) => {
            visit_expr_mut(&mut c.test, f);
            visit_expr_mut(&mut c.cons, f);
            visit_expr_mut(&mut c.alt, f);
        }
        Expr::Seq(s) => {
            for e in &mut s.exprs {
                visit_expr_mut(e, f);
            }
        }
        Expr::Paren(p) => visit_expr_mut(&mut p.expr, f),
        Expr::Await(a) => visit_expr_mut(&mut a.arg, f),
        Expr::Template(t) => {
            for e in &mut t.exprs {
                visit_expr_mut(e, f);
            }
        }
        Expr::TaggedTemplate(t) => {
            visit_expr_mut(&mut t.tag, f);
            for e in &mut t.quasi.exprs {
                visit_expr_mut(e, f);
            }
        }
        Expr::Jsx(el) => visit_jsx_mut(el, f),
        Expr::JsxFragment(frag) => {
            for child in &mut frag.children {
                visit_jsx_child_mut(child, f);
            }
        }
        Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => {
            visit_expr_mut(&mut w.expr, f)
        }
        Expr::ImportCall(call) => visit_expr_mut(&mut call.arg, f),
        _ => {}
    }
    f(expr);
}

fn visit_jsx_mut(el: &mut JsxElement, f: &mut impl FnMut(&mut Expr)) {
    for attr in &mut el.attrs {
        match attr {
            JsxAttr::Named(named) => {
                if let Some(JsxAttrValue::Expr(expr)) = &mut named.value {
                    visit_expr_mut(expr, f);
                }
            }
            JsxAttr::Spread(spread) => visit_expr_mut(&mut spread.expr, f),
        }
    }
    for child in &mut el.children {
        visit_jsx_child_mut(child, f);
    }
}

fn visit_jsx_child_mut(child: &mut JsxChild, f: &mut impl FnMut(&mut Expr)) {
    match child {
        JsxChild::Expr(container) => {
            if let Some(expr) = &mut container.expr {
                visit_expr_mut(expr, f);
            }
        }
        JsxChild::Element(el) => visit_jsx_mut(el, f),
        JsxChild::Fragment(frag) => {
            for c in &mut frag.children {
                visit_jsx_child_mut(c, f);
            }
        }
        JsxChild::Text(_) => {}
    }
}

// -----------------------------------------------------------------------------
// Shallow walkers for CSE (no descent into nested functions)
// -----------------------------------------------------------------------------

fn visit_fn_bodies(stmt: &mut Stmt, f: &mut impl FnMut(&mut Vec<Stmt>)) {
    match stmt {
        Stmt::Func(func) => f(&mut func.func.body.stmts),
        Stmt::ExportNamed(export) => {
            if let Some(decl) = &mut export.decl {
                visit_fn_bodies(decl, f);
            }
        }
        Stmt::ExportDefault(export) => {
            if let Expr::Func(func) = &mut export.expr {
                f(&mut func.func.body.stmts);
            }
        }
        Stmt::VarDecl(decl) => {
            for declarator in &mut decl.decls {
                match declarator.init.as_mut() {
                    Some(Expr::Func(func)) => f(&mut func.func.body.stmts),
                    Some(Expr::Arrow(arrow)) => {
                        if let ArrowBody::Block(block) = &mut arrow.body {
                            f(&mut block.stmts);
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn collect_exprs_shallow(
    stmt: &Stmt,
    summary: &AnalysisSummary,
    f: &mut impl FnMut(&Expr),
) {
    fn expr_walk(expr: &Expr, f: &mut impl FnMut(&Expr)) {
        match expr {
            Expr::Arrow(_) | Expr::Func(_) => return,
            Expr::Binary(b) => {
                expr_walk(&b.left, f);
                expr_walk(&b.right, f);
            }
            Expr::Logical(l) => {
                expr_walk(&l.left, f);
                expr_walk(&l.right, f);
            }
            Expr::Unary(u) => expr_walk(&u.arg, f),
            Expr::Cond(c) => {
                expr_walk(&c.test, f);
                expr_walk(&c.cons, f);
                expr_walk(&c.alt, f);
            }
            Expr::Call(call) => {
                expr_walk(&call.callee, f);
                for arg in &call.args {
                    expr_walk(&arg.expr, f);
                }
            }
            Expr::Member(m) => {
                expr_walk(&m.obj, f);
                if let MemberProp::Computed(p) = &m.prop {
                    expr_walk(p, f);
                }
            }
            Expr::Paren(p) => expr_walk(&p.expr, f),
            Expr::Seq(s) => {
                for e in &s.exprs {
                    expr_walk(e, f);
                }
            }
            Expr::Assign(a) => expr_walk(&a.value, f),
            _ => {}
        }
        f(expr);
    }

    match stmt {
        Stmt::Expr(e) => expr_walk(&e.expr, f),
        Stmt::Return(r) => {
            if let Some(arg) = &r.arg {
                expr_walk(arg, f);
            }
        }
        Stmt::VarDecl(decl) => {
            for declarator in &decl.decls {
                let special = declarator
                    .pat
                    .as_ident()
                    .filter(|pat| pat.span.end > pat.span.start)
                    .and_then(|pat| summary.resolve_at(pat.span.start))
                    .is_some_and(|id| summary.binding(id).kind != ReactiveKind::Plain);
                if special {
                    continue;
                }
                if let Some(init) = &declarator.init {
                    expr_walk(init, f);
                }
            }
        }
        Stmt::If(if_stmt) => {
            expr_walk(&if_stmt.test, f);
            collect_exprs_shallow(&if_stmt.cons, summary, f);
            if let Some(alt) = &if_stmt.alt {
                collect_exprs_shallow(alt, summary, f);
            }
        }
        Stmt::Block(block) => {
            for s in &block.stmts {
                collect_exprs_shallow(s, summary, f);
            }
        }
        Stmt::While(w) => {
            expr_walk(&w.test, f);
            collect_exprs_shallow(&w.body, summary, f);
        }
        _ => {}
    }
}

fn replace_exprs_shallow(
    stmt: &mut Stmt,
    summary: &AnalysisSummary,
    f: &mut impl FnMut(&mut Expr),
) {
    fn expr_walk(expr: &mut Expr, f: &mut impl FnMut(&mut Expr)) {
        match expr {
            Expr::Arrow(_) | Expr::Func(_) => return,
            Expr::Binary(b) => {
                expr_walk(&mut b.left, f);
                expr_walk(&mut b.right, f);
            }
            Expr::Logical(l) => {
                expr_walk(&mut l.left, f);
                expr_walk(&mut l.right, f);
            }
            Expr::Unary(u) => expr_walk(&mut u.arg, f),
            Expr::Cond(c) => {
                expr_walk(&mut c.test, f);
                expr_walk(&mut c.cons, f);
                expr_walk(&mut c.alt, f);
            }
            Expr::Call(call) => {
                expr_walk(&mut call.callee, f);
                for arg in &mut call.args {
                    expr_walk(&mut arg.expr, f);
                }
            }
            Expr::Member(m) => {
                expr_walk(&mut m.obj, f);
                if let MemberProp::Computed(p) = &mut m.prop {
                    expr_walk(p, f);
                }
            }
            Expr::Paren(p) => expr_walk(&mut p.expr, f),
            Expr::Seq(s) => {
                for e in &mut s.exprs {
                    expr_walk(e, f);
                }
            }
            Expr::Assign(a) => expr_walk(&mut a.value, f),
            _ => {}
        }
        f(expr);
    }

    match stmt {
        Stmt::Expr(e) => expr_walk(&mut e.expr, f),
        Stmt::Return(r) => {
            if let Some(arg) = &mut r.arg {
                expr_walk(arg, f);
            }
        }
        Stmt::VarDecl(decl) => {
            for declarator in &mut decl.decls {
                let special = declarator
                    .pat
                    .as_ident()
                    .filter(|pat| pat.span.end > pat.span.start)
                    .and_then(|pat| summary.resolve_at(pat.span.start))
                    .is_some_and(|id| summary.binding(id).kind != ReactiveKind::Plain);
                if special {
                    continue;
                }
                if let Some(init) = &mut declarator.init {
                    expr_walk(init, f);
                }
            }
        }
        Stmt::If(if_stmt) => {
            expr_walk(&mut if_stmt.test, f);
            replace_exprs_shallow(&mut if_stmt.cons, summary, f);
            if let Some(alt) = &mut if_stmt.alt {
                replace_exprs_shallow(alt, summary, f);
            }
        }
        Stmt::Block(block) => {
            for s in &mut block.stmts {
                replace_exprs_shallow(s, summary, f);
            }
        }
        Stmt::While(w) => {
            expr_walk(&mut w.test, f);
            replace_exprs_shallow(&mut w.body, summary, f);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fict_armature::parse_module;

    fn fold(src: &str, level: OptimizeLevel) -> Module {
        let mut module = parse_module(src).unwrap();
        fold_module(&mut module, level);
        module
    }

    fn first_init(module: &Module) -> &Expr {
        match &module.body[0] {
            Stmt::VarDecl(decl) => decl.decls[0].init.as_ref().unwrap(),
            other => panic!("expected var decl, got {other:?}"),
        }
    }

    #[test]
    fn test_constant_folding() {
        let m = fold("const x = 1 + 2 * 3;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Number(n) if n.value == 7.0));

        let m = fold("const s = 'a' + 'b';", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Str(s) if s.value == "ab"));

        let m = fold("const b = 2 < 3;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Bool(b) if b.value));
    }

    #[test]
    fn test_algebraic_gated_by_level() {
        // x + 0 with a proven-numeric x simplifies only under full
        let m = fold("const x = (a * b) + 0;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Binary(b) if b.op == BinaryOp::Add));

        let m = fold("const x = (a * b) + 0;", OptimizeLevel::Full);
        assert!(matches!(first_init(&m), Expr::Paren(_)));
    }

    #[test]
    fn test_non_numeric_not_simplified() {
        // `a + 0` cannot drop the 0: `a` may be a string
        let m = fold("const x = a + 0;", OptimizeLevel::Full);
        assert!(matches!(first_init(&m), Expr::Binary(_)));
    }

    #[test]
    fn test_nullish_folding() {
        let m = fold("const x = null ?? y;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Ident(id) if id.name == "y"));

        let m = fold("const x = 1 ?? y;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Number(_)));
    }

    #[test]
    fn test_conditional_simplification() {
        let m = fold("const x = true ? a : b;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Ident(id) if id.name == "a"));

        let m = fold("const x = c ? a : a;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Ident(id) if id.name == "a"));

        // effectful test must keep the conditional
        let m = fold("const x = f() ? a : a;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Cond(_)));
    }

    #[test]
    fn test_boolean_identities_full_only() {
        let m = fold("const x = true && y;", OptimizeLevel::Safe);
        assert!(matches!(first_init(&m), Expr::Logical(_)));

        let m = fold("const x = true && y;", OptimizeLevel::Full);
        assert!(matches!(first_init(&m), Expr::Ident(id) if id.name == "y"));

        let m = fold("const x = false && y;", OptimizeLevel::Full);
        assert!(matches!(first_init(&m), Expr::Bool(b) if !b.value));
    }
}
