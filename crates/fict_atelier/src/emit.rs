//! Statement and expression emission with reactive rewrites.
//!
//! The emitter walks the surface AST guided by the analysis summary:
//! identifier reads of signals/memos become accessor calls, writes become
//! setter calls, derived declarations become memo constructors, macros
//! lower to their runtime hooks, and reactive scope bodies acquire the
//! context push/pop bracket. JSX subtrees are handed to the `jsx` module.

use fict_carton::Span;
use fict_croquis::hir::{
    BindingId, BindingRecord, FunctionId, FunctionKind, ReactiveKind, RegionBody,
};
use fict_relief::ast::*;

use crate::context::CodegenContext;
use crate::jsx;
use crate::optimize::getter_cache_counts;

// -----------------------------------------------------------------------------
// Precedence
// -----------------------------------------------------------------------------

pub const P_LOWEST: u8 = 0;
pub const P_SEQ: u8 = 1;
pub const P_ASSIGN: u8 = 2;
pub const P_COND: u8 = 3;
pub const P_NULLISH: u8 = 4;
pub const P_OR: u8 = 5;
pub const P_AND: u8 = 6;
pub const P_BITOR: u8 = 7;
pub const P_BITXOR: u8 = 8;
pub const P_BITAND: u8 = 9;
pub const P_EQ: u8 = 10;
pub const P_REL: u8 = 11;
pub const P_SHIFT: u8 = 12;
pub const P_ADD: u8 = 13;
pub const P_MUL: u8 = 14;
pub const P_EXP: u8 = 15;
pub const P_UNARY: u8 = 16;
pub const P_POSTFIX: u8 = 17;
pub const P_CALL: u8 = 18;
pub const P_PRIMARY: u8 = 19;

pub fn binary_prec(op: BinaryOp) -> u8 {
    use BinaryOp::*;
    match op {
        BitOr => P_BITOR,
        BitXor => P_BITXOR,
        BitAnd => P_BITAND,
        Eq | NotEq | StrictEq | StrictNotEq => P_EQ,
        Lt | LtEq | Gt | GtEq | In | InstanceOf => P_REL,
        Shl | Shr | UShr => P_SHIFT,
        Add | Sub => P_ADD,
        Mul | Div | Mod => P_MUL,
        Exp => P_EXP,
    }
}

pub fn logical_prec(op: LogicalOp) -> u8 {
    match op {
        LogicalOp::Nullish => P_NULLISH,
        LogicalOp::Or => P_OR,
        LogicalOp::And => P_AND,
    }
}

fn expr_prec(expr: &Expr) -> u8 {
    match expr {
        Expr::Seq(_) => P_SEQ,
        Expr::Assign(_) | Expr::Arrow(_) => P_ASSIGN,
        Expr::Cond(_) => P_COND,
        Expr::Logical(l) => logical_prec(l.op),
        Expr::Binary(b) => binary_prec(b.op),
        Expr::Unary(_) | Expr::Await(_) => P_UNARY,
        Expr::Update(u) => {
            if u.prefix {
                P_UNARY
            } else {
                P_POSTFIX
            }
        }
        Expr::Call(_)
        | Expr::New(_)
        | Expr::Member(_)
        | Expr::TaggedTemplate(_)
        | Expr::ImportCall(_) => P_CALL,
        Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => expr_prec(&w.expr),
        _ => P_PRIMARY,
    }
}

// -----------------------------------------------------------------------------
// Statements
// -----------------------------------------------------------------------------

/// Whether a statement produces no output (dropped imports, consumed branch
/// statements, fully-elided declarations).
pub fn stmt_is_skipped(ctx: &CodegenContext, stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Empty(_) => true,
        Stmt::Import(import) => import_is_dropped(import),
        Stmt::VarDecl(decl) => decl.decls.iter().all(|d| declarator_is_skipped(ctx, d)),
        Stmt::If(if_stmt) => ctx.consumed_stmts.contains(&if_stmt.span.start),
        Stmt::Switch(sw) => ctx.consumed_stmts.contains(&sw.span.start),
        Stmt::ExportNamed(export) => match &export.decl {
            Some(decl) => stmt_is_skipped(ctx, decl),
            None => false,
        },
        _ => false,
    }
}

fn import_is_dropped(import: &ImportDecl) -> bool {
    if import.type_only {
        return true;
    }
    if import.source.value != fict_croquis::macros::MACRO_MODULE {
        return false;
    }
    // dropped when nothing but macro specifiers remain
    import.default.is_none()
        && import.namespace.is_none()
        && import
            .named
            .iter()
            .all(|spec| fict_croquis::macros::MACRO_NAMES.contains(&spec.imported.as_str()))
}

fn declarator_is_skipped(ctx: &CodegenContext, declarator: &Declarator) -> bool {
    let Pattern::Ident(pat) = &declarator.pat else {
        return false;
    };
    let Some(id) = resolve_pat(ctx, pat) else {
        return false;
    };
    if ctx.eliminated.contains(&id) {
        return true;
    }
    let binding = ctx.summary.binding(id);
    match binding.kind {
        ReactiveKind::InlinedDerived => true,
        ReactiveKind::RegionMemoField => ctx.emitted_region_fields.contains(&id),
        _ => false,
    }
}

fn resolve_pat(ctx: &CodegenContext, pat: &IdentPat) -> Option<BindingId> {
    if pat.span.end <= pat.span.start {
        return None;
    }
    ctx.summary.resolve_at(pat.span.start)
}

fn resolve_ident(ctx: &CodegenContext, ident: &Ident) -> Option<BindingId> {
    if ident.span.end <= ident.span.start {
        return None;
    }
    ctx.summary.resolve_at(ident.span.start)
}

/// Emit a statement list, one per line.
pub fn emit_stmts(ctx: &mut CodegenContext, stmts: &[Stmt]) {
    for stmt in stmts {
        if stmt_is_skipped(ctx, stmt) {
            continue;
        }
        ctx.newline();
        emit_stmt(ctx, stmt);
    }
}

pub fn emit_stmt(ctx: &mut CodegenContext, stmt: &Stmt) {
    match stmt {
        Stmt::Expr(e) => {
            let needs_parens = matches!(
                e.expr,
                Expr::Func(_) | Expr::Object(_)
            );
            if needs_parens {
                ctx.push("(");
            }
            emit_expr(ctx, &e.expr, P_LOWEST);
            if needs_parens {
                ctx.push(")");
            }
            ctx.push(";");
        }
        Stmt::VarDecl(decl) => emit_var_decl(ctx, decl),
        Stmt::Func(func) => emit_func_decl(ctx, func),
        Stmt::Class(class) => emit_class_decl(ctx, class),
        Stmt::Return(ret) => {
            ctx.push("return");
            if let Some(arg) = &ret.arg {
                ctx.push(" ");
                emit_expr(ctx, arg, P_LOWEST);
            }
            ctx.push(";");
        }
        Stmt::If(if_stmt) => {
            ctx.push("if (");
            emit_expr(ctx, &if_stmt.test, P_LOWEST);
            ctx.push(") ");
            emit_nested_stmt(ctx, &if_stmt.cons);
            if let Some(alt) = &if_stmt.alt {
                ctx.push(" else ");
                emit_nested_stmt(ctx, alt);
            }
        }
        Stmt::Switch(sw) => {
            ctx.push("switch (");
            emit_expr(ctx, &sw.disc, P_LOWEST);
            ctx.push(") {");
            ctx.indent();
            for case in &sw.cases {
                ctx.newline();
                match &case.test {
                    Some(test) => {
                        ctx.push("case ");
                        emit_expr(ctx, test, P_LOWEST);
                        ctx.push(":");
                    }
                    None => ctx.push("default:"),
                }
                ctx.indent();
                emit_stmts(ctx, &case.body);
                ctx.deindent();
            }
            ctx.deindent();
            ctx.newline();
            ctx.push("}");
        }
        Stmt::While(w) => {
            ctx.push("while (");
            emit_expr(ctx, &w.test, P_LOWEST);
            ctx.push(") ");
            emit_nested_stmt(ctx, &w.body);
        }
        Stmt::DoWhile(dw) => {
            ctx.push("do ");
            emit_nested_stmt(ctx, &dw.body);
            ctx.push(" while (");
            emit_expr(ctx, &dw.test, P_LOWEST);
            ctx.push(");");
        }
        Stmt::For(f) => {
            ctx.push("for (");
            match &f.init {
                Some(ForInit::VarDecl(decl)) => emit_plain_var_decl(ctx, decl),
                Some(ForInit::Expr(e)) => emit_expr(ctx, e, P_LOWEST),
                None => {}
            }
            ctx.push("; ");
            if let Some(test) = &f.test {
                emit_expr(ctx, test, P_LOWEST);
            }
            ctx.push("; ");
            if let Some(update) = &f.update {
                emit_expr(ctx, update, P_LOWEST);
            }
            ctx.push(") ");
            emit_nested_stmt(ctx, &f.body);
        }
        Stmt::ForIn(fi) => {
            ctx.push("for (");
            emit_for_head(ctx, &fi.left);
            ctx.push(" in ");
            emit_expr(ctx, &fi.object, P_LOWEST);
            ctx.push(") ");
            emit_nested_stmt(ctx, &fi.body);
        }
        Stmt::ForOf(fo) => {
            ctx.push("for ");
            if fo.is_await {
                ctx.push("await ");
            }
            ctx.push("(");
            emit_for_head(ctx, &fo.left);
            ctx.push(" of ");
            emit_expr(ctx, &fo.iterable, P_ASSIGN);
            ctx.push(") ");
            emit_nested_stmt(ctx, &fo.body);
        }
        Stmt::Break(b) => {
            ctx.push("break");
            if let Some(label) = &b.label {
                ctx.push(" ");
                ctx.push(&label.name);
            }
            ctx.push(";");
        }
        Stmt::Continue(c) => {
            ctx.push("continue");
            if let Some(label) = &c.label {
                ctx.push(" ");
                ctx.push(&label.name);
            }
            ctx.push(";");
        }
        Stmt::Block(block) => emit_block_braces(ctx, &block.stmts),
        Stmt::Throw(t) => {
            ctx.push("throw ");
            emit_expr(ctx, &t.arg, P_LOWEST);
            ctx.push(";");
        }
        Stmt::Try(t) => {
            ctx.push("try ");
            emit_block_braces(ctx, &t.block.stmts);
            if let Some(handler) = &t.handler {
                ctx.push(" catch ");
                if let Some(param) = &handler.param {
                    ctx.push("(");
                    emit_pattern(ctx, param);
                    ctx.push(") ");
                }
                emit_block_braces(ctx, &handler.body.stmts);
            }
            if let Some(finalizer) = &t.finalizer {
                ctx.push(" finally ");
                emit_block_braces(ctx, &finalizer.stmts);
            }
        }
        Stmt::Labeled(l) => {
            ctx.push(&l.label.name);
            ctx.push(": ");
            emit_nested_stmt(ctx, &l.body);
        }
        Stmt::Import(import) => emit_import(ctx, import),
        Stmt::ExportNamed(export) => emit_export_named(ctx, export),
        Stmt::ExportDefault(export) => {
            ctx.push("export default ");
            emit_expr(ctx, &export.expr, P_ASSIGN);
            ctx.push(";");
        }
        Stmt::Empty(_) => {}
        Stmt::Debugger(_) => ctx.push("debugger;"),
    }
}

fn emit_nested_stmt(ctx: &mut CodegenContext, stmt: &Stmt) {
    match stmt {
        Stmt::Block(block) => emit_block_braces(ctx, &block.stmts),
        other => emit_stmt(ctx, other),
    }
}

pub fn emit_block_braces(ctx: &mut CodegenContext, stmts: &[Stmt]) {
    ctx.push("{");
    ctx.indent();
    emit_stmts(ctx, stmts);
    ctx.deindent();
    ctx.newline();
    ctx.push("}");
}

fn emit_for_head(ctx: &mut CodegenContext, head: &ForHead) {
    match head {
        ForHead::VarDecl(kind, pat) => {
            ctx.push(kind.as_str());
            ctx.push(" ");
            emit_pattern(ctx, pat);
        }
        ForHead::Pattern(pat) => emit_pattern(ctx, pat),
    }
}

// -----------------------------------------------------------------------------
// Imports / exports
// -----------------------------------------------------------------------------

fn emit_import(ctx: &mut CodegenContext, import: &ImportDecl) {
    ctx.push("import ");
    let mut wrote = false;
    if let Some(default) = &import.default {
        ctx.push(&default.name);
        wrote = true;
    }
    if let Some(ns) = &import.namespace {
        if wrote {
            ctx.push(", ");
        }
        ctx.push("* as ");
        ctx.push(&ns.name);
        wrote = true;
    }
    let kept: Vec<&ImportSpecifier> = if import.source.value == fict_croquis::macros::MACRO_MODULE
    {
        import
            .named
            .iter()
            .filter(|spec| !fict_croquis::macros::MACRO_NAMES.contains(&spec.imported.as_str()))
            .collect()
    } else {
        import.named.iter().collect()
    };
    if !kept.is_empty() {
        if wrote {
            ctx.push(", ");
        }
        ctx.push("{ ");
        for (i, spec) in kept.iter().enumerate() {
            if i > 0 {
                ctx.push(", ");
            }
            ctx.push(&spec.imported);
            if spec.is_aliased() {
                ctx.push(" as ");
                ctx.push(&spec.local.name);
            }
        }
        ctx.push(" }");
        wrote = true;
    }
    if wrote {
        ctx.push(" from ");
    }
    emit_str_lit(ctx, &import.source.value);
    ctx.push(";");
}

fn emit_export_named(ctx: &mut CodegenContext, export: &ExportNamedDecl) {
    if let Some(decl) = &export.decl {
        ctx.push("export ");
        emit_stmt(ctx, decl);
        return;
    }
    // `export * from "m"`
    if export
        .specifiers
        .first()
        .is_some_and(|spec| spec.local == "*")
    {
        let spec = &export.specifiers[0];
        ctx.push("export *");
        if spec.exported != "*" {
            ctx.push(" as ");
            ctx.push(&spec.exported);
        }
        if let Some(source) = &export.source {
            ctx.push(" from ");
            emit_str_lit(ctx, &source.value);
        }
        ctx.push(";");
        return;
    }
    ctx.push("export { ");
    for (i, spec) in export.specifiers.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        ctx.push(&spec.local);
        if spec.exported != spec.local {
            ctx.push(" as ");
            ctx.push(&spec.exported);
        }
    }
    ctx.push(" }");
    if let Some(source) = &export.source {
        ctx.push(" from ");
        emit_str_lit(ctx, &source.value);
    }
    ctx.push(";");
}

// -----------------------------------------------------------------------------
// Variable declarations
// -----------------------------------------------------------------------------

/// Plain declaration emission with no reactive rewrites of the binders
/// (loop heads; initializer expressions are still rewritten).
fn emit_plain_var_decl(ctx: &mut CodegenContext, decl: &VarDecl) {
    ctx.push(decl.kind.as_str());
    ctx.push(" ");
    for (i, declarator) in decl.decls.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        emit_pattern(ctx, &declarator.pat);
        if let Some(init) = &declarator.init {
            ctx.push(" = ");
            emit_expr(ctx, init, P_ASSIGN);
        }
    }
}

fn emit_var_decl(ctx: &mut CodegenContext, decl: &VarDecl) {
    let any_special = decl
        .decls
        .iter()
        .any(|d| declarator_is_special(ctx, d) || declarator_is_skipped(ctx, d));

    if !any_special {
        emit_plain_var_decl(ctx, decl);
        ctx.push(";");
        return;
    }

    let mut first = true;
    for declarator in &decl.decls {
        if declarator_is_skipped(ctx, declarator) {
            continue;
        }
        if !first {
            ctx.newline();
        }
        first = false;
        emit_declarator(ctx, decl.kind, declarator);
    }
}

fn declarator_is_special(ctx: &CodegenContext, declarator: &Declarator) -> bool {
    if let Pattern::Ident(pat) = &declarator.pat {
        if let Some(id) = resolve_pat(ctx, pat) {
            let binding = ctx.summary.binding(id);
            return !matches!(
                binding.kind,
                ReactiveKind::Plain | ReactiveKind::CapturedValue
            );
        }
        return false;
    }
    // destructuring over a signal lowers to per-field memos
    destructured_signal_source(ctx, declarator).is_some()
}

fn destructured_signal_source<'a>(
    ctx: &CodegenContext<'a>,
    declarator: &Declarator,
) -> Option<&'a BindingRecord> {
    let init = declarator.init.as_ref()?;
    let name = init.as_ident_name()?;
    let mut bound = Vec::new();
    declarator.pat.bound_names(&mut bound);
    let first = bound.first()?;
    // any bound field carries the source when the init is a signal
    let summary = ctx.summary;
    let field = summary
        .bindings
        .iter()
        .find(|b| b.name == *first && b.destructured_from.is_some())?;
    let source = summary.binding(field.destructured_from?);
    if source.is_state_macro && source.name == name {
        Some(source)
    } else {
        None
    }
}

fn emit_declarator(ctx: &mut CodegenContext, kind: VarKind, declarator: &Declarator) {
    // destructuring a signal: one memo per field
    if let Some(source) = destructured_signal_source(ctx, declarator) {
        emit_signal_destructure(ctx, declarator, &source.name.clone());
        return;
    }

    let Pattern::Ident(pat) = &declarator.pat else {
        emit_single_plain_declarator(ctx, kind, declarator);
        return;
    };
    let Some(id) = resolve_pat(ctx, pat) else {
        emit_single_plain_declarator(ctx, kind, declarator);
        return;
    };
    let summary = ctx.summary;
    let binding = summary.binding(id);

    match binding.kind {
        ReactiveKind::Signal => {
            let slot = ctx.next_slot();
            ctx.push("const ");
            ctx.push(&pat.name);
            ctx.push(" = ");
            let helper = ctx.helper("__fictUseSignal");
            ctx.push(helper);
            ctx.push("(__fictCtx, ");
            let initial = state_initial_value(declarator);
            match initial {
                Some(expr) => {
                    let saved = ctx.current_decl.replace(id);
                    emit_expr(ctx, expr, P_ASSIGN);
                    ctx.current_decl = saved;
                }
                None => ctx.push("undefined"),
            }
            ctx.push(", ");
            ctx.push(&slot.to_string());
            ctx.push(");");
        }
        ReactiveKind::Memo => {
            emit_memo_declarator(ctx, id, binding, &pat.name);
        }
        ReactiveKind::RegionMemoField => {
            emit_region(ctx, binding.region.expect("region field without region"));
        }
        ReactiveKind::InlinedDerived => {
            // declaration removed; substituted at use sites
        }
        ReactiveKind::CapturedValue | ReactiveKind::Plain | ReactiveKind::PropAccessor => {
            emit_single_plain_declarator(ctx, kind, declarator);
        }
    }
}

fn state_initial_value(declarator: &Declarator) -> Option<&Expr> {
    let init = declarator.init.as_ref()?;
    if let Expr::Call(call) = init.unwrap_tsparen() {
        return call.args.first().map(|a| &a.expr);
    }
    None
}

fn emit_single_plain_declarator(ctx: &mut CodegenContext, kind: VarKind, declarator: &Declarator) {
    ctx.push(kind.as_str());
    ctx.push(" ");
    emit_pattern(ctx, &declarator.pat);
    if let Some(init) = &declarator.init {
        ctx.push(" = ");
        let decl_id = declarator
            .pat
            .as_ident()
            .and_then(|pat| resolve_pat(ctx, pat));
        let saved = ctx.current_decl;
        ctx.current_decl = decl_id;
        emit_expr(ctx, init, P_ASSIGN);
        ctx.current_decl = saved;
    }
    ctx.push(";");
}

fn emit_memo_declarator(
    ctx: &mut CodegenContext,
    id: BindingId,
    binding: &BindingRecord,
    name: &str,
) {
    let slot = ctx.next_slot();
    ctx.push("const ");
    ctx.push(name);
    ctx.push(" = ");
    let helper = ctx.helper("__fictUseMemo");
    ctx.push(helper);
    ctx.push("(__fictCtx, ");

    let init = binding.init.clone();
    ctx.suspend_getter_cache += 1;
    let saved = ctx.current_decl.replace(id);
    match init.as_ref().map(|e| e.unwrap_tsparen()) {
        // explicit $memo with a function argument is already a thunk
        Some(Expr::Arrow(_)) | Some(Expr::Func(_)) if binding.is_explicit_memo => {
            emit_expr(ctx, init.as_ref().unwrap(), P_ASSIGN);
        }
        Some(_) => {
            ctx.push("() => ");
            emit_thunk_value(ctx, init.as_ref().unwrap());
        }
        None => ctx.push("() => undefined"),
    }
    ctx.current_decl = saved;
    ctx.suspend_getter_cache -= 1;

    ctx.push(", ");
    ctx.push(&slot.to_string());
    ctx.push(");");

    // flush a pending getter-cache line right after the declaration
    let pending = ctx.frame().pending_cache.remove(&id);
    if pending {
        if let Some(cache_name) = ctx.frame().getter_cache.get(&id).cloned() {
            ctx.newline();
            ctx.push("const ");
            ctx.push(&cache_name);
            ctx.push(" = ");
            ctx.push(name);
            ctx.push("();");
        }
    }
}

/// Emit an arrow-body expression, parenthesizing object literals.
fn emit_thunk_value(ctx: &mut CodegenContext, expr: &Expr) {
    if matches!(expr.unwrap_tsparen(), Expr::Object(_)) {
        ctx.push("(");
        emit_expr(ctx, expr, P_ASSIGN);
        ctx.push(")");
    } else {
        emit_expr(ctx, expr, P_ASSIGN);
    }
}

fn emit_signal_destructure(ctx: &mut CodegenContext, declarator: &Declarator, source: &str) {
    let mut bound = Vec::new();
    declarator.pat.bound_names(&mut bound);
    let summary = ctx.summary;
    let mut first = true;
    for name in bound {
        let Some(binding) = summary
            .bindings
            .iter()
            .find(|b| b.name == name && b.destructured_from.is_some())
        else {
            continue;
        };
        let Some(key) = binding.destructure_key.clone() else {
            continue;
        };
        if !first {
            ctx.newline();
        }
        first = false;
        let slot = ctx.next_slot();
        ctx.push("const ");
        ctx.push(&name);
        ctx.push(" = ");
        let helper = ctx.helper("__fictUseMemo");
        ctx.push(helper);
        ctx.push("(__fictCtx, () => ");
        ctx.push(source);
        ctx.push("()");
        if key.chars().all(|c| c.is_ascii_digit()) {
            ctx.push("[");
            ctx.push(&key);
            ctx.push("]");
        } else {
            ctx.push(".");
            ctx.push(&key);
        }
        ctx.push(", ");
        ctx.push(&slot.to_string());
        ctx.push(");");
    }
}

// -----------------------------------------------------------------------------
// Regions
// -----------------------------------------------------------------------------

fn emit_region(ctx: &mut CodegenContext, region_id: fict_croquis::hir::RegionId) {
    let summary = ctx.summary;
    let region = summary.region(region_id);
    // already emitted at the first field
    if region
        .fields
        .first()
        .is_some_and(|f| ctx.emitted_region_fields.contains(f))
    {
        return;
    }
    for &field in &region.fields {
        ctx.emitted_region_fields.insert(field);
    }

    let (name, slot) = ctx.region_name(region_id);
    let lazy = ctx.options.lazy_conditional;

    ctx.push("const ");
    ctx.push(&name);
    ctx.push(" = ");
    let helper = ctx.helper("__fictUseMemo");
    ctx.push(helper);
    ctx.push("(__fictCtx, ");

    ctx.suspend_getter_cache += 1;
    match &region.body {
        RegionBody::DerivedGroup if lazy => {
            // getters defer each field; intra-region reads go back through
            // the accessor, which returns the cached object once computed
            ctx.push("() => ({");
            ctx.indent();
            for (i, &field) in region.fields.iter().enumerate() {
                if i > 0 {
                    ctx.push(",");
                }
                ctx.newline();
                let binding = summary.binding(field);
                ctx.push("get ");
                ctx.push(&binding.name);
                ctx.push("() {");
                ctx.indent();
                ctx.newline();
                ctx.push("return ");
                emit_region_field_init(ctx, binding);
                ctx.push(";");
                ctx.deindent();
                ctx.newline();
                ctx.push("}");
            }
            ctx.deindent();
            ctx.newline();
            ctx.push("})");
        }
        RegionBody::DerivedGroup => {
            // locals in declaration order so fields may read earlier fields
            ctx.push("() => {");
            ctx.indent();
            let saved_region = ctx.region_inline.replace(region_id);
            for &field in &region.fields {
                ctx.newline();
                let binding = summary.binding(field);
                ctx.push("const ");
                ctx.push(&binding.name);
                ctx.push(" = ");
                emit_region_field_init(ctx, binding);
                ctx.push(";");
            }
            ctx.region_inline = saved_region;
            ctx.newline();
            ctx.push("return { ");
            for (i, &field) in region.fields.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                ctx.push(&summary.binding(field).name);
            }
            ctx.push(" };");
            ctx.deindent();
            ctx.newline();
            ctx.push("}");
        }
        RegionBody::Branch { branch_span } => {
            emit_branch_region_body(ctx, region_id, *branch_span);
        }
    }
    ctx.suspend_getter_cache -= 1;

    ctx.push(", ");
    ctx.push(&slot.to_string());
    ctx.push(");");

    if !lazy {
        ctx.newline();
        ctx.push("const { ");
        for (i, &field) in region.fields.iter().enumerate() {
            if i > 0 {
                ctx.push(", ");
            }
            ctx.push(&summary.binding(field).name);
        }
        ctx.push(" } = ");
        ctx.push(&name);
        ctx.push("();");
    }
}

fn emit_region_field_init(ctx: &mut CodegenContext, binding: &BindingRecord) {
    let saved = ctx.current_decl.replace(binding.id);
    match &binding.init {
        Some(init) => emit_expr(ctx, init, P_ASSIGN),
        None => ctx.push("undefined"),
    }
    ctx.current_decl = saved;
}

/// Branch region: the declaration plus its single branching statement,
/// folded into the memo body.
fn emit_branch_region_body(
    ctx: &mut CodegenContext,
    region_id: fict_croquis::hir::RegionId,
    branch_span: Span,
) {
    let summary = ctx.summary;
    let region = summary.region(region_id);
    let field = region.fields[0];
    let binding = summary.binding(field);
    let name = binding.name.clone();
    let init = binding.init.clone();

    ctx.consumed_stmts.insert(branch_span.start);

    ctx.push("() => {");
    ctx.indent();
    ctx.newline();
    ctx.push("let ");
    ctx.push(&name);
    if let Some(init) = &init {
        ctx.push(" = ");
        let saved_region = ctx.region_inline.replace(region_id);
        emit_expr(ctx, init, P_ASSIGN);
        ctx.region_inline = saved_region;
    }
    ctx.push(";");

    // the branching statement, with the field kept as a plain local
    let saved_region = ctx.region_inline.replace(region_id);
    if let Some(branch) = find_branch_stmt(ctx, branch_span) {
        ctx.newline();
        emit_stmt(ctx, &branch);
    }
    ctx.region_inline = saved_region;

    ctx.newline();
    ctx.push("return { ");
    ctx.push(&name);
    ctx.push(" };");
    ctx.deindent();
    ctx.newline();
    ctx.push("}");
}

/// The branch statement lives in the module AST; carry a clone through the
/// context for emission inside the memo body.
fn find_branch_stmt(ctx: &CodegenContext, span: Span) -> Option<Stmt> {
    ctx.branch_stmts.get(&span.start).cloned()
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

fn emit_func_decl(ctx: &mut CodegenContext, func: &FuncDecl) {
    if func.func.is_async {
        ctx.push("async ");
    }
    ctx.push("function ");
    ctx.push(&func.name.name);
    emit_function_rest(ctx, &func.func.params, Some(&func.func.body), None, func.func.span);
}

fn emit_class_decl(ctx: &mut CodegenContext, class: &ClassDecl) {
    ctx.push("class ");
    ctx.push(&class.name.name);
    if let Some(super_class) = &class.class.super_class {
        ctx.push(" extends ");
        emit_expr(ctx, super_class, P_CALL);
    }
    ctx.push(" {");
    ctx.indent();
    for member in &class.class.members {
        ctx.newline();
        if member.is_static {
            ctx.push("static ");
        }
        match &member.kind {
            ClassMemberKind::Method(f) => {
                if f.is_async {
                    ctx.push("async ");
                }
                emit_prop_name(ctx, &member.key);
                emit_plain_fn_tail(ctx, &f.params, &f.body);
            }
            ClassMemberKind::Getter(f) => {
                ctx.push("get ");
                emit_prop_name(ctx, &member.key);
                emit_plain_fn_tail(ctx, &f.params, &f.body);
            }
            ClassMemberKind::Setter(f) => {
                ctx.push("set ");
                emit_prop_name(ctx, &member.key);
                emit_plain_fn_tail(ctx, &f.params, &f.body);
            }
            ClassMemberKind::Field(value) => {
                emit_prop_name(ctx, &member.key);
                if let Some(value) = value {
                    ctx.push(" = ");
                    emit_expr(ctx, value, P_ASSIGN);
                }
                ctx.push(";");
            }
        }
    }
    ctx.deindent();
    ctx.newline();
    ctx.push("}");
}

fn emit_plain_fn_tail(ctx: &mut CodegenContext, params: &[Pattern], body: &BlockStmt) {
    ctx.push("(");
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        emit_pattern(ctx, param);
    }
    ctx.push(") ");
    ctx.suspend_getter_cache += 1;
    emit_block_braces(ctx, &body.stmts);
    ctx.suspend_getter_cache -= 1;
}

/// Emit params and body; reactive scopes get the hook-context bracket.
pub fn emit_function_rest(
    ctx: &mut CodegenContext,
    params: &[Pattern],
    body: Option<&BlockStmt>,
    expr_body: Option<&Expr>,
    span: Span,
) {
    let fn_id = ctx.summary.functions_by_span.get(&span.start).copied();
    let reactive = fn_id.is_some_and(|id| {
        ctx.summary.function(id).kind.is_reactive_scope()
            && ctx.summary.function(id).kind != FunctionKind::Module
    });

    if !reactive {
        ctx.push("(");
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                ctx.push(", ");
            }
            emit_pattern(ctx, param);
        }
        ctx.push(") ");
        ctx.suspend_getter_cache += 1;
        match (body, expr_body) {
            (Some(body), _) => emit_block_braces(ctx, &body.stmts),
            (None, Some(_)) => unreachable!("expression bodies are arrow-only"),
            (None, None) => ctx.push("{}"),
        }
        ctx.suspend_getter_cache -= 1;
        return;
    }

    let fn_id = fn_id.unwrap();
    let (param_text, prop_lines) = reactive_params(ctx, fn_id, params);
    ctx.push("(");
    ctx.push(&param_text);
    ctx.push(") ");
    emit_reactive_body(ctx, fn_id, prop_lines, body, expr_body);
}

/// Parameter list text + prop-accessor prologue for a reactive scope.
fn reactive_params(
    ctx: &mut CodegenContext,
    fn_id: FunctionId,
    params: &[Pattern],
) -> (String, Vec<String>) {
    let summary = ctx.summary;
    let function = summary.function(fn_id);
    let component_like = matches!(function.kind, FunctionKind::Component | FunctionKind::Hook);

    let props_rewritten = component_like
        && matches!(params.first(), Some(Pattern::Object(obj)) if obj.rest.is_none());

    let mut text = String::new();
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            text.push_str(", ");
        }
        if i == 0 && props_rewritten {
            text.push_str("__props");
        } else {
            text.push_str(&pattern_to_string(ctx, param));
        }
    }

    let mut lines = Vec::new();
    if props_rewritten {
        for &id in &summary.function(fn_id).bindings {
            let binding = summary.binding(id);
            if binding.kind != ReactiveKind::PropAccessor {
                continue;
            }
            let Some(prop_path) = &binding.prop_path else {
                continue;
            };
            let mut access = String::from("__props");
            for (segment, default) in prop_path.path.iter().zip(&prop_path.defaults) {
                access.push('.');
                access.push_str(segment);
                if let Some(default) = default {
                    let default_text = emit_expr_to_string(ctx, default);
                    access = format!("({access} ?? {default_text})");
                }
            }
            let helper = ctx.helper("useProp");
            lines.push(format!("const {} = {helper}(() => {access});", binding.name));
        }
    }
    (text, lines)
}

fn emit_reactive_body(
    ctx: &mut CodegenContext,
    fn_id: FunctionId,
    prop_lines: Vec<String>,
    body: Option<&BlockStmt>,
    expr_body: Option<&Expr>,
) {
    ctx.push_frame();

    // getter cache for memo accessors read repeatedly in this sync body
    let mut cache_lines = Vec::new();
    if ctx.options.getter_cache {
        if let Some(body) = body {
            let counts = getter_cache_counts(ctx.summary, &body.stmts);
            for (id, count) in counts {
                if count < 2 {
                    continue;
                }
                let binding = ctx.summary.binding(id);
                let cache_name = format!("__c_{}", binding.name);
                if binding.function == fn_id {
                    ctx.frame().pending_cache.insert(id);
                } else {
                    cache_lines.push(format!("const {cache_name} = {}();", binding.name));
                }
                ctx.frame().getter_cache.insert(id, cache_name);
            }
        }
    }

    ctx.push("{");
    ctx.indent();
    ctx.newline();
    let push_helper = ctx.helper("__fictPushContext");
    ctx.push("const __fictCtx = ");
    ctx.push(push_helper);
    ctx.push("();");
    ctx.newline();
    ctx.push("try {");
    ctx.indent();

    // body into a side buffer so selector hoists land in the prologue
    let saved_selectors = std::mem::take(&mut ctx.pending_selectors);
    let saved_names = std::mem::take(&mut ctx.selector_names);
    let saved_buf = ctx.take_buffer();
    match (body, expr_body) {
        (Some(body), _) => emit_scope_stmts(ctx, &body.stmts),
        (None, Some(expr)) => {
            ctx.newline();
            ctx.push("return ");
            emit_expr(ctx, expr, P_LOWEST);
            ctx.push(";");
        }
        (None, None) => {}
    }
    let body_buf = ctx.restore_buffer(saved_buf);
    let selectors = std::mem::replace(&mut ctx.pending_selectors, saved_selectors);
    ctx.selector_names = saved_names;

    for line in prop_lines {
        ctx.newline();
        ctx.push(&line);
    }
    for line in selectors {
        ctx.newline();
        ctx.push(&line);
    }
    for line in cache_lines {
        ctx.newline();
        ctx.push(&line);
    }
    ctx.append_raw(&body_buf);

    ctx.deindent();
    ctx.newline();
    ctx.push("} finally {");
    ctx.indent();
    ctx.newline();
    let pop_helper = ctx.helper("__fictPopContext");
    ctx.push(pop_helper);
    ctx.push("();");
    ctx.deindent();
    ctx.newline();
    ctx.push("}");
    ctx.deindent();
    ctx.newline();
    ctx.push("}");

    ctx.pop_frame();
}

/// Statement emission for a reactive scope body, converting the trailing
/// `if (…) return <A/>; … return <B/>;` pair into `createConditional`.
pub fn emit_scope_stmts(ctx: &mut CodegenContext, stmts: &[Stmt]) {
    if let Some((index, if_stmt, fallback)) = conditional_return_split(stmts) {
        for stmt in &stmts[..index] {
            if stmt_is_skipped(ctx, stmt) {
                continue;
            }
            ctx.newline();
            emit_stmt(ctx, stmt);
        }
        ctx.newline();
        emit_conditional_return(ctx, if_stmt, fallback);
        return;
    }
    emit_stmts(ctx, stmts);
}

/// Find the last `if (cond) { … return JSX }` directly followed by a
/// `return JSX`. Only this final pair converts.
fn conditional_return_split<'a>(
    stmts: &'a [Stmt],
) -> Option<(usize, &'a IfStmt, &'a ReturnStmt)> {
    if stmts.len() < 2 {
        return None;
    }
    let last = stmts.last()?;
    let Stmt::Return(fallback) = last else {
        return None;
    };
    if !fallback.arg.as_ref().is_some_and(is_jsx_expr) {
        return None;
    }
    let Stmt::If(if_stmt) = &stmts[stmts.len() - 2] else {
        return None;
    };
    if if_stmt.alt.is_some() {
        return None;
    }
    if branch_jsx_return(&if_stmt.cons).is_none() {
        return None;
    }
    Some((stmts.len() - 2, if_stmt, fallback))
}

fn is_jsx_expr(expr: &Expr) -> bool {
    matches!(expr.unwrap_tsparen(), Expr::Jsx(_) | Expr::JsxFragment(_))
}

/// The JSX return that terminates a conditional branch, when the branch is
/// eligible (a bare return or a block ending in one).
fn branch_jsx_return(stmt: &Stmt) -> Option<&ReturnStmt> {
    match stmt {
        Stmt::Return(ret) if ret.arg.as_ref().is_some_and(is_jsx_expr) => Some(ret),
        Stmt::Block(block) => match block.stmts.last() {
            Some(Stmt::Return(ret)) if ret.arg.as_ref().is_some_and(is_jsx_expr) => Some(ret),
            _ => None,
        },
        _ => None,
    }
}

fn emit_conditional_return(ctx: &mut CodegenContext, if_stmt: &IfStmt, fallback: &ReturnStmt) {
    ctx.push("return ");
    let helper = ctx.helper("createConditional");
    ctx.push(helper);
    ctx.push("(() => ");
    ctx.suspend_getter_cache += 1;
    emit_expr(ctx, &if_stmt.test, P_ASSIGN);
    ctx.push(", ");

    // then-branch thunk
    match &if_stmt.cons {
        Stmt::Return(ret) => {
            ctx.push("() => ");
            emit_expr(ctx, ret.arg.as_ref().unwrap(), P_ASSIGN);
        }
        Stmt::Block(block) => {
            let (lead, ret) = block.stmts.split_at(block.stmts.len() - 1);
            let Stmt::Return(ret) = &ret[0] else {
                unreachable!("checked by conditional_return_split")
            };
            if lead.is_empty() {
                ctx.push("() => ");
                emit_expr(ctx, ret.arg.as_ref().unwrap(), P_ASSIGN);
            } else {
                ctx.push("() => {");
                ctx.indent();
                emit_stmts(ctx, lead);
                ctx.newline();
                ctx.push("return ");
                emit_expr(ctx, ret.arg.as_ref().unwrap(), P_LOWEST);
                ctx.push(";");
                ctx.deindent();
                ctx.newline();
                ctx.push("}");
            }
        }
        _ => unreachable!("checked by conditional_return_split"),
    }

    ctx.push(", () => ");
    emit_expr(ctx, fallback.arg.as_ref().unwrap(), P_ASSIGN);
    ctx.suspend_getter_cache -= 1;
    ctx.push(");");
}

// -----------------------------------------------------------------------------
// Patterns (plain printing)
// -----------------------------------------------------------------------------

pub fn emit_pattern(ctx: &mut CodegenContext, pat: &Pattern) {
    match pat {
        Pattern::Ident(ident) => ctx.push(&ident.name),
        Pattern::Object(obj) => {
            ctx.push("{ ");
            let mut first = true;
            for prop in &obj.props {
                if !first {
                    ctx.push(", ");
                }
                first = false;
                if prop.shorthand {
                    emit_pattern(ctx, &prop.value);
                } else {
                    emit_prop_name(ctx, &prop.key);
                    ctx.push(": ");
                    emit_pattern(ctx, &prop.value);
                }
            }
            if let Some(rest) = &obj.rest {
                if !first {
                    ctx.push(", ");
                }
                ctx.push("...");
                emit_pattern(ctx, rest);
            }
            ctx.push(" }");
        }
        Pattern::Array(arr) => {
            ctx.push("[");
            for (i, elem) in arr.elems.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                if let Some(elem) = elem {
                    emit_pattern(ctx, elem);
                }
            }
            ctx.push("]");
        }
        Pattern::Assign(assign) => {
            emit_pattern(ctx, &assign.target);
            ctx.push(" = ");
            emit_expr(ctx, &assign.default, P_ASSIGN);
        }
        Pattern::Rest(rest) => {
            ctx.push("...");
            emit_pattern(ctx, &rest.arg);
        }
    }
}

pub fn emit_prop_name(ctx: &mut CodegenContext, name: &PropName) {
    match name {
        PropName::Ident(ident, _) => ctx.push(ident),
        PropName::Str(s) => emit_str_lit(ctx, &s.value),
        PropName::Num(n) => ctx.push(&n.raw),
        PropName::Computed(expr) => {
            ctx.push("[");
            emit_expr(ctx, expr, P_ASSIGN);
            ctx.push("]");
        }
    }
}

pub fn emit_str_lit(ctx: &mut CodegenContext, value: &str) {
    ctx.push("\"");
    let escaped = fict_carton::escape_js_string(value);
    ctx.push(&escaped);
    ctx.push("\"");
}

// -----------------------------------------------------------------------------
// Expressions
// -----------------------------------------------------------------------------

pub fn emit_expr(ctx: &mut CodegenContext, expr: &Expr, min_prec: u8) {
    let prec = expr_prec(expr);
    let parens = prec < min_prec;
    if parens {
        ctx.push("(");
    }
    emit_expr_inner(ctx, expr);
    if parens {
        ctx.push(")");
    }
}

fn emit_expr_inner(ctx: &mut CodegenContext, expr: &Expr) {
    match expr {
        Expr::Ident(ident) => emit_ident(ctx, ident),
        Expr::Number(n) => ctx.push(&n.raw),
        Expr::BigInt(b) => ctx.push(&b.raw),
        Expr::Str(s) => emit_str_lit(ctx, &s.value),
        Expr::Bool(b) => ctx.push(if b.value { "true" } else { "false" }),
        Expr::Null(_) => ctx.push("null"),
        Expr::Regex(r) => {
            ctx.push("/");
            ctx.push(&r.pattern);
            ctx.push("/");
            ctx.push(&r.flags);
        }
        Expr::Template(tpl) => emit_template(ctx, tpl),
        Expr::TaggedTemplate(tagged) => {
            emit_expr(ctx, &tagged.tag, P_CALL);
            emit_template(ctx, &tagged.quasi);
        }
        Expr::Array(arr) => {
            ctx.push("[");
            for (i, elem) in arr.elems.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                if let Some(elem) = elem {
                    if elem.spread {
                        ctx.push("...");
                    }
                    emit_expr(ctx, &elem.expr, P_ASSIGN);
                }
            }
            ctx.push("]");
        }
        Expr::Object(obj) => emit_object(ctx, obj),
        Expr::Func(f) => {
            if f.func.is_async {
                ctx.push("async ");
            }
            ctx.push("function ");
            if let Some(name) = &f.name {
                ctx.push(&name.name);
            }
            emit_function_rest(ctx, &f.func.params, Some(&f.func.body), None, f.func.span);
        }
        Expr::Arrow(arrow) => emit_arrow(ctx, arrow),
        Expr::Unary(u) => {
            ctx.push(u.op.as_str());
            if u.op.is_keyword() {
                ctx.push(" ");
            } else if matches!(
                (&u.op, u.arg.unwrap_tsparen()),
                (UnaryOp::Minus, Expr::Unary(inner)) if inner.op == UnaryOp::Minus
            ) {
                // avoid `--` from nested negation
                ctx.push(" ");
            }
            emit_expr(ctx, &u.arg, P_UNARY);
        }
        Expr::Update(update) => emit_update(ctx, update),
        Expr::Binary(b) => {
            let prec = binary_prec(b.op);
            let (left_min, right_min) = if b.op == BinaryOp::Exp {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            emit_expr(ctx, &b.left, left_min);
            ctx.push(" ");
            ctx.push(b.op.as_str());
            ctx.push(" ");
            emit_expr(ctx, &b.right, right_min);
        }
        Expr::Logical(l) => emit_logical(ctx, l),
        Expr::Assign(assign) => emit_assign(ctx, assign),
        Expr::Member(member) => emit_member(ctx, member),
        Expr::Call(call) => emit_call(ctx, call),
        Expr::New(new) => {
            ctx.push("new ");
            emit_expr(ctx, &new.callee, P_PRIMARY);
            ctx.push("(");
            emit_args(ctx, &new.args);
            ctx.push(")");
        }
        Expr::Cond(cond) => {
            emit_expr(ctx, &cond.test, P_NULLISH);
            ctx.push(" ? ");
            emit_expr(ctx, &cond.cons, P_ASSIGN);
            ctx.push(" : ");
            emit_expr(ctx, &cond.alt, P_ASSIGN);
        }
        Expr::Seq(seq) => {
            for (i, e) in seq.exprs.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                emit_expr(ctx, e, P_ASSIGN);
            }
        }
        Expr::Paren(paren) => {
            ctx.push("(");
            emit_expr(ctx, &paren.expr, P_LOWEST);
            ctx.push(")");
        }
        Expr::Await(a) => {
            ctx.push("await ");
            emit_expr(ctx, &a.arg, P_UNARY);
        }
        Expr::Jsx(_) | Expr::JsxFragment(_) => jsx::emit_jsx_expr(ctx, expr),
        // TypeScript wrappers are stripped at lowering
        Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => {
            emit_expr_inner(ctx, &w.expr);
        }
        Expr::ImportMeta(_) => ctx.push("import.meta"),
        Expr::ImportCall(call) => {
            ctx.push("import(");
            emit_expr(ctx, &call.arg, P_ASSIGN);
            ctx.push(")");
        }
    }
}

fn emit_template(ctx: &mut CodegenContext, tpl: &TemplateLit) {
    ctx.push("`");
    for (i, quasi) in tpl.quasis.iter().enumerate() {
        ctx.push(&quasi.raw);
        if let Some(expr) = tpl.exprs.get(i) {
            ctx.push("${");
            emit_expr(ctx, expr, P_LOWEST);
            ctx.push("}");
        }
    }
    ctx.push("`");
}

fn emit_object(ctx: &mut CodegenContext, obj: &ObjectLit) {
    ctx.push("{ ");
    for (i, prop) in obj.props.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        match prop {
            ObjectProp::KeyValue { key, value, .. } => {
                emit_prop_name(ctx, key);
                ctx.push(": ");
                emit_expr(ctx, value, P_ASSIGN);
            }
            ObjectProp::Shorthand { name, .. } => {
                // reactive shorthand values expand to key-value form
                let resolved = resolve_ident(ctx, name);
                let rewritten = resolved.is_some_and(|id| {
                    ctx.summary.binding(id).kind.reads_as_call()
                        || ctx.summary.binding(id).kind == ReactiveKind::InlinedDerived
                });
                if rewritten {
                    ctx.push(&name.name);
                    ctx.push(": ");
                    emit_ident(ctx, name);
                } else {
                    ctx.push(&name.name);
                }
            }
            ObjectProp::Method { key, kind, func, .. } => {
                match kind {
                    MethodKind::Getter => ctx.push("get "),
                    MethodKind::Setter => ctx.push("set "),
                    MethodKind::Method => {
                        if func.is_async {
                            ctx.push("async ");
                        }
                    }
                }
                emit_prop_name(ctx, key);
                emit_plain_fn_tail(ctx, &func.params, &func.body);
            }
            ObjectProp::Spread { expr, .. } => {
                ctx.push("...");
                emit_expr(ctx, expr, P_ASSIGN);
            }
        }
    }
    ctx.push(" }");
}

fn emit_arrow(ctx: &mut CodegenContext, arrow: &ArrowExpr) {
    if arrow.is_async {
        ctx.push("async ");
    }

    let fn_id = ctx
        .summary
        .functions_by_span
        .get(&arrow.span.start)
        .copied();
    let reactive = fn_id.is_some_and(|id| {
        let kind = ctx.summary.function(id).kind;
        kind.is_reactive_scope() && kind != FunctionKind::Module
    });

    // bare single-ident params keep their shape
    let bare = arrow.params.len() == 1
        && matches!(arrow.params[0], Pattern::Ident(_))
        && !reactive;
    if bare {
        emit_pattern(ctx, &arrow.params[0]);
    } else if reactive {
        let fn_id = fn_id.unwrap();
        let (param_text, prop_lines) = reactive_params(ctx, fn_id, &arrow.params);
        ctx.push("(");
        ctx.push(&param_text);
        ctx.push(")");
        ctx.push(" => ");
        match &arrow.body {
            ArrowBody::Block(block) => {
                emit_reactive_body(ctx, fn_id, prop_lines, Some(block), None)
            }
            ArrowBody::Expr(expr) => emit_reactive_body(ctx, fn_id, prop_lines, None, Some(expr)),
        }
        return;
    } else {
        ctx.push("(");
        for (i, param) in arrow.params.iter().enumerate() {
            if i > 0 {
                ctx.push(", ");
            }
            emit_pattern(ctx, param);
        }
        ctx.push(")");
    }

    ctx.push(" => ");
    ctx.suspend_getter_cache += 1;
    match &arrow.body {
        ArrowBody::Block(block) => emit_block_braces(ctx, &block.stmts),
        ArrowBody::Expr(expr) => emit_thunk_value(ctx, expr),
    }
    ctx.suspend_getter_cache -= 1;
}

fn emit_logical(ctx: &mut CodegenContext, l: &LogicalExpr) {
    let prec = logical_prec(l.op);
    // `??` may not mix bare with `||`/`&&`
    let force = |child: &Expr| -> bool {
        match (l.op, child.unwrap_tsparen()) {
            (LogicalOp::Nullish, Expr::Logical(inner)) => inner.op != LogicalOp::Nullish,
            (LogicalOp::Or | LogicalOp::And, Expr::Logical(inner)) => {
                inner.op == LogicalOp::Nullish
            }
            _ => false,
        }
    };
    if force(&l.left) {
        ctx.push("(");
        emit_expr(ctx, &l.left, P_LOWEST);
        ctx.push(")");
    } else {
        emit_expr(ctx, &l.left, prec);
    }
    ctx.push(" ");
    ctx.push(l.op.as_str());
    ctx.push(" ");
    if force(&l.right) {
        ctx.push("(");
        emit_expr(ctx, &l.right, P_LOWEST);
        ctx.push(")");
    } else {
        emit_expr(ctx, &l.right, prec + 1);
    }
}

fn emit_member(ctx: &mut CodegenContext, member: &MemberExpr) {
    emit_expr(ctx, &member.obj, P_CALL);
    match &member.prop {
        MemberProp::Ident(name, _) => {
            if member.optional {
                ctx.push("?.");
            } else {
                ctx.push(".");
            }
            ctx.push(name);
        }
        MemberProp::Computed(prop) => {
            if member.optional {
                ctx.push("?.");
            }
            ctx.push("[");
            emit_expr(ctx, prop, P_LOWEST);
            ctx.push("]");
        }
    }
}

fn emit_args(ctx: &mut CodegenContext, args: &[Arg]) {
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        if arg.spread {
            ctx.push("...");
        }
        emit_expr(ctx, &arg.expr, P_ASSIGN);
    }
}

// -----------------------------------------------------------------------------
// Reads
// -----------------------------------------------------------------------------

fn emit_ident(ctx: &mut CodegenContext, ident: &Ident) {
    let Some(id) = resolve_ident(ctx, ident) else {
        ctx.push(&ident.name);
        return;
    };
    if ctx.current_decl == Some(id) {
        // reference inside the binding's own initializer
        ctx.push(&ident.name);
        return;
    }
    let summary = ctx.summary;
    let binding = summary.binding(id);

    match binding.kind {
        ReactiveKind::Signal | ReactiveKind::Memo | ReactiveKind::PropAccessor => {
            if let Some(cached) = ctx.cached_accessor(id) {
                let cached = cached.to_string();
                ctx.push(&cached);
                return;
            }
            ctx.push(&ident.name);
            ctx.push("()");
        }
        ReactiveKind::RegionMemoField => {
            let region = binding.region.expect("region field without region");
            if ctx.region_inline == Some(region) {
                ctx.push(&ident.name);
                return;
            }
            if ctx.options.lazy_conditional {
                let (name, _) = ctx.region_name(region);
                ctx.push(&name);
                ctx.push("().");
                ctx.push(&ident.name);
            } else {
                ctx.push(&ident.name);
            }
        }
        ReactiveKind::InlinedDerived => match binding.init.clone() {
            Some(init) => {
                let saved = ctx.current_decl.replace(id);
                ctx.push("(");
                emit_expr(ctx, &init, P_LOWEST);
                ctx.push(")");
                ctx.current_decl = saved;
            }
            None => ctx.push(&ident.name),
        },
        ReactiveKind::CapturedValue | ReactiveKind::Plain => ctx.push(&ident.name),
    }
}

// -----------------------------------------------------------------------------
// Writes
// -----------------------------------------------------------------------------

fn signal_target(ctx: &CodegenContext, target: &AssignTarget) -> Option<BindingId> {
    let AssignTarget::Ident(ident) = target else {
        return None;
    };
    let id = resolve_ident(ctx, ident)?;
    if ctx.summary.binding(id).kind == ReactiveKind::Signal {
        Some(id)
    } else {
        None
    }
}

fn emit_assign(ctx: &mut CodegenContext, assign: &AssignExpr) {
    // signal writes become setter calls
    if let Some(_id) = signal_target(ctx, &assign.target) {
        let AssignTarget::Ident(ident) = &assign.target else {
            unreachable!()
        };
        let name = ident.name.clone();
        match assign.op {
            AssignOp::Assign => {
                ctx.push(&name);
                ctx.push("(");
                emit_expr(ctx, &assign.value, P_ASSIGN);
                ctx.push(")");
            }
            op => {
                ctx.push(&name);
                ctx.push("(");
                ctx.push(&name);
                ctx.push("() ");
                if let Some(bin) = op.to_binary() {
                    ctx.push(bin.as_str());
                    ctx.push(" ");
                    emit_expr(ctx, &assign.value, binary_prec(bin) + 1);
                } else if let Some(log) = op.to_logical() {
                    ctx.push(log.as_str());
                    ctx.push(" ");
                    emit_expr(ctx, &assign.value, logical_prec(log) + 1);
                }
                ctx.push(")");
            }
        }
        return;
    }

    match &assign.target {
        AssignTarget::Ident(ident) => {
            ctx.push(&ident.name);
            ctx.push(" ");
            ctx.push(assign.op.as_str());
            ctx.push(" ");
            emit_expr(ctx, &assign.value, P_ASSIGN);
        }
        AssignTarget::Member(member) => {
            emit_member(ctx, member);
            ctx.push(" ");
            ctx.push(assign.op.as_str());
            ctx.push(" ");
            emit_expr(ctx, &assign.value, P_ASSIGN);
        }
        AssignTarget::Array(_) | AssignTarget::Object(_) => {
            emit_destructuring_assign(ctx, assign);
        }
    }
}

/// Whether a destructuring target binds any signal.
fn target_mentions_signal(ctx: &CodegenContext, target: &AssignTarget) -> bool {
    match target {
        AssignTarget::Ident(ident) => resolve_ident(ctx, ident)
            .is_some_and(|id| ctx.summary.binding(id).kind == ReactiveKind::Signal),
        AssignTarget::Member(_) => false,
        AssignTarget::Array(arr) => {
            arr.elems
                .iter()
                .flatten()
                .any(|elem| target_mentions_signal(ctx, &elem.target))
                || arr
                    .rest
                    .as_ref()
                    .is_some_and(|rest| target_mentions_signal(ctx, rest))
        }
        AssignTarget::Object(obj) => {
            obj.props
                .iter()
                .any(|prop| target_mentions_signal(ctx, &prop.target))
                || obj
                    .rest
                    .as_ref()
                    .is_some_and(|rest| target_mentions_signal(ctx, rest))
        }
    }
}

fn emit_destructuring_assign(ctx: &mut CodegenContext, assign: &AssignExpr) {
    let has_signal = target_mentions_signal(ctx, &assign.target);
    let object_rest = matches!(&assign.target, AssignTarget::Object(obj) if obj.rest.is_some());

    if !has_signal || object_rest {
        // no reactive binders (or an object rest, which must destructure
        // for real): print the assignment as written
        emit_assign_target_raw(ctx, &assign.target);
        ctx.push(" ");
        ctx.push(assign.op.as_str());
        ctx.push(" ");
        emit_expr(ctx, &assign.value, P_ASSIGN);
        return;
    }

    let simple_rhs = matches!(
        assign.value.unwrap_tsparen(),
        Expr::Ident(_) | Expr::Member(_)
    );

    if simple_rhs {
        let base = emit_expr_to_string(ctx, &assign.value);
        let mut pieces = Vec::new();
        destructure_pieces(ctx, &assign.target, &base, &mut pieces);
        ctx.push("(");
        for (i, piece) in pieces.iter().enumerate() {
            if i > 0 {
                ctx.push(", ");
            }
            ctx.push(piece);
        }
        ctx.push(")");
    } else {
        let tmp = ctx.next_tmp();
        let mut pieces = Vec::new();
        destructure_pieces(ctx, &assign.target, &tmp, &mut pieces);
        ctx.push("((");
        ctx.push(&tmp);
        ctx.push(") => (");
        for piece in &pieces {
            ctx.push(piece);
            ctx.push(", ");
        }
        ctx.push(&tmp);
        ctx.push("))(");
        emit_expr(ctx, &assign.value, P_ASSIGN);
        ctx.push(")");
    }
}

/// Per-binder assignment pieces reading from `base`.
fn destructure_pieces(
    ctx: &mut CodegenContext,
    target: &AssignTarget,
    base: &str,
    out: &mut Vec<String>,
) {
    match target {
        AssignTarget::Object(obj) => {
            for prop in &obj.props {
                let access = match prop.key.static_name() {
                    Some(key) => format!("{base}.{key}"),
                    None => match &prop.key {
                        PropName::Computed(key) => {
                            format!("{base}[{}]", emit_expr_to_string(ctx, key))
                        }
                        _ => continue,
                    },
                };
                let value = match &prop.default {
                    Some(default) => {
                        let default_text = emit_expr_to_string(ctx, default);
                        format!("{access} === undefined ? {default_text} : {access}")
                    }
                    None => access,
                };
                push_binder_piece(ctx, &prop.target, value, out);
            }
        }
        AssignTarget::Array(arr) => {
            for (index, elem) in arr.elems.iter().enumerate() {
                let Some(elem) = elem else { continue };
                let access = format!("{base}[{index}]");
                let value = match &elem.default {
                    Some(default) => {
                        let default_text = emit_expr_to_string(ctx, default);
                        format!("{access} === undefined ? {default_text} : {access}")
                    }
                    None => access,
                };
                push_binder_piece(ctx, &elem.target, value, out);
            }
            if let Some(rest) = &arr.rest {
                let value = format!("{base}.slice({})", arr.elems.len());
                push_binder_piece(ctx, rest, value, out);
            }
        }
        other => push_binder_piece(ctx, other, base.to_string(), out),
    }
}

fn push_binder_piece(
    ctx: &mut CodegenContext,
    target: &AssignTarget,
    value: String,
    out: &mut Vec<String>,
) {
    match target {
        AssignTarget::Ident(ident) => {
            let is_signal = resolve_ident(ctx, ident)
                .is_some_and(|id| ctx.summary.binding(id).kind == ReactiveKind::Signal);
            if is_signal {
                out.push(format!("{}({value})", ident.name));
            } else {
                out.push(format!("{} = {value}", ident.name));
            }
        }
        AssignTarget::Member(member) => {
            let member_text = {
                let saved = ctx.take_buffer();
                emit_member(ctx, member);
                let buf = ctx.restore_buffer(saved);
                // SAFETY: only valid UTF-8 is pushed
                unsafe { String::from_utf8_unchecked(buf) }
            };
            out.push(format!("{member_text} = {value}"));
        }
        nested => destructure_pieces(ctx, nested, &value, out),
    }
}

/// Print a destructuring target as source-shaped destructuring syntax.
fn emit_assign_target_raw(ctx: &mut CodegenContext, target: &AssignTarget) {
    match target {
        AssignTarget::Ident(ident) => ctx.push(&ident.name),
        AssignTarget::Member(member) => emit_member(ctx, member),
        AssignTarget::Array(arr) => {
            ctx.push("[");
            for (i, elem) in arr.elems.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                if let Some(elem) = elem {
                    emit_assign_target_raw(ctx, &elem.target);
                    if let Some(default) = &elem.default {
                        ctx.push(" = ");
                        emit_expr(ctx, default, P_ASSIGN);
                    }
                }
            }
            if let Some(rest) = &arr.rest {
                if !arr.elems.is_empty() {
                    ctx.push(", ");
                }
                ctx.push("...");
                emit_assign_target_raw(ctx, rest);
            }
            ctx.push("]");
        }
        AssignTarget::Object(obj) => {
            ctx.push("{ ");
            let mut first = true;
            for prop in &obj.props {
                if !first {
                    ctx.push(", ");
                }
                first = false;
                if prop.shorthand {
                    emit_assign_target_raw(ctx, &prop.target);
                } else {
                    emit_prop_name(ctx, &prop.key);
                    ctx.push(": ");
                    emit_assign_target_raw(ctx, &prop.target);
                }
                if let Some(default) = &prop.default {
                    ctx.push(" = ");
                    emit_expr(ctx, default, P_ASSIGN);
                }
            }
            if let Some(rest) = &obj.rest {
                if !first {
                    ctx.push(", ");
                }
                ctx.push("...");
                emit_assign_target_raw(ctx, rest);
            }
            ctx.push(" }");
        }
    }
}

fn emit_update(ctx: &mut CodegenContext, update: &UpdateExpr) {
    if let Expr::Ident(ident) = update.arg.unwrap_tsparen() {
        if let Some(id) = resolve_ident(ctx, ident) {
            if ctx.summary.binding(id).kind == ReactiveKind::Signal {
                let name = ident.name.clone();
                ctx.push(&name);
                ctx.push("(");
                ctx.push(&name);
                ctx.push("() ");
                ctx.push(match update.op {
                    UpdateOp::Inc => "+",
                    UpdateOp::Dec => "-",
                });
                ctx.push(" 1)");
                return;
            }
        }
    }
    if update.prefix {
        ctx.push(update.op.as_str());
        emit_expr(ctx, &update.arg, P_UNARY);
    } else {
        emit_expr(ctx, &update.arg, P_POSTFIX);
        ctx.push(update.op.as_str());
    }
}

// -----------------------------------------------------------------------------
// Calls and macros
// -----------------------------------------------------------------------------

fn emit_call(ctx: &mut CodegenContext, call: &CallExpr) {
    if let Some(name) = call.callee.as_ident_name() {
        let summary = ctx.summary;
        match name {
            "$effect" if summary.macros.resolve("$effect").is_some() => {
                let slot = ctx.next_slot();
                let helper = ctx.helper("__fictUseEffect");
                ctx.push(helper);
                ctx.push("(__fictCtx, ");
                ctx.suspend_getter_cache += 1;
                match call.args.first() {
                    Some(arg) => emit_expr(ctx, &arg.expr, P_ASSIGN),
                    None => ctx.push("() => {}"),
                }
                ctx.suspend_getter_cache -= 1;
                ctx.push(", ");
                ctx.push(&slot.to_string());
                ctx.push(")");
                return;
            }
            "$memo" if summary.macros.resolve("$memo").is_some() => {
                let slot = ctx.next_slot();
                let helper = ctx.helper("__fictUseMemo");
                ctx.push(helper);
                ctx.push("(__fictCtx, ");
                ctx.suspend_getter_cache += 1;
                match call.args.first().map(|a| a.expr.unwrap_tsparen()) {
                    Some(Expr::Arrow(_)) | Some(Expr::Func(_)) => {
                        emit_expr(ctx, &call.args[0].expr, P_ASSIGN);
                    }
                    Some(_) => {
                        ctx.push("() => ");
                        emit_thunk_value(ctx, &call.args[0].expr);
                    }
                    None => ctx.push("() => undefined"),
                }
                ctx.suspend_getter_cache -= 1;
                ctx.push(", ");
                ctx.push(&slot.to_string());
                ctx.push(")");
                return;
            }
            _ => {}
        }
    }

    emit_expr(ctx, &call.callee, P_CALL);
    if call.optional {
        ctx.push("?.");
    }
    ctx.push("(");
    emit_args(ctx, &call.args);
    ctx.push(")");
}

// -----------------------------------------------------------------------------
// Utilities
// -----------------------------------------------------------------------------

/// Emit an expression into a standalone string (rewrites included).
pub fn emit_expr_to_string(ctx: &mut CodegenContext, expr: &Expr) -> String {
    let saved = ctx.take_buffer();
    emit_expr(ctx, expr, P_ASSIGN);
    let buf = ctx.restore_buffer(saved);
    // SAFETY: only valid UTF-8 is pushed
    unsafe { String::from_utf8_unchecked(buf) }
}

/// Pattern rendered to a standalone string.
pub fn pattern_to_string(ctx: &mut CodegenContext, pat: &Pattern) -> String {
    let saved = ctx.take_buffer();
    emit_pattern(ctx, pat);
    let buf = ctx.restore_buffer(saved);
    // SAFETY: only valid UTF-8 is pushed
    unsafe { String::from_utf8_unchecked(buf) }
}

/// Whether an expression depends on reactive state (drives getter wrapping
/// in props and VDOM mode). Conservative: calls count as reactive.
pub fn expr_is_reactive(ctx: &CodegenContext, expr: &Expr) -> bool {
    match expr {
        Expr::Ident(ident) => resolve_ident(ctx, ident).is_some_and(|id| {
            let kind = ctx.summary.binding(id).kind;
            kind.reads_as_call() || kind == ReactiveKind::RegionMemoField
                || kind == ReactiveKind::InlinedDerived
        }),
        Expr::Call(_) | Expr::New(_) | Expr::TaggedTemplate(_) | Expr::ImportCall(_) => true,
        Expr::Member(m) => {
            expr_is_reactive(ctx, &m.obj)
                || matches!(&m.prop, MemberProp::Computed(p) if expr_is_reactive(ctx, p))
        }
        Expr::Binary(b) => expr_is_reactive(ctx, &b.left) || expr_is_reactive(ctx, &b.right),
        Expr::Logical(l) => expr_is_reactive(ctx, &l.left) || expr_is_reactive(ctx, &l.right),
        Expr::Cond(c) => {
            expr_is_reactive(ctx, &c.test)
                || expr_is_reactive(ctx, &c.cons)
                || expr_is_reactive(ctx, &c.alt)
        }
        Expr::Unary(u) => expr_is_reactive(ctx, &u.arg),
        Expr::Update(u) => expr_is_reactive(ctx, &u.arg),
        Expr::Paren(p) => expr_is_reactive(ctx, &p.expr),
        Expr::Seq(s) => s.exprs.iter().any(|e| expr_is_reactive(ctx, e)),
        Expr::Template(t) => t.exprs.iter().any(|e| expr_is_reactive(ctx, e)),
        Expr::Array(arr) => arr
            .elems
            .iter()
            .flatten()
            .any(|elem| expr_is_reactive(ctx, &elem.expr)),
        Expr::Object(obj) => obj.props.iter().any(|prop| match prop {
            ObjectProp::KeyValue { value, .. } => expr_is_reactive(ctx, value),
            ObjectProp::Shorthand { name, .. } => {
                resolve_ident(ctx, name).is_some_and(|id| {
                    ctx.summary.binding(id).kind.reads_as_call()
                })
            }
            ObjectProp::Spread { expr, .. } => expr_is_reactive(ctx, expr),
            ObjectProp::Method { .. } => false,
        }),
        Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => {
            expr_is_reactive(ctx, &w.expr)
        }
        _ => false,
    }
}
