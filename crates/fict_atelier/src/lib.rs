//! Atelier - lowering and code generation for the Fict compiler.
//!
//! Consumes the surface AST and the analysis summary, applies the reactive
//! rewrites and the optimizer, and produces the emitted module: runtime
//! import preamble, hoisted templates, and the transformed body.

pub mod context;
pub mod emit;
pub mod jsx;
pub mod optimize;

use fict_carton::{escape_template_string, FxHashSet};
use fict_croquis::hir::RegionBody;
use fict_croquis::AnalysisSummary;
use fict_relief::ast::{Module, Stmt};
use fict_relief::options::CompilerOptions;

pub use context::{CodegenContext, JSX_RUNTIME_MODULE, RUNTIME_MODULE};
pub use optimize::{apply_cse, fold_module, reactive_dce};

/// Generate the output module.
pub fn generate(
    module: &Module,
    summary: &AnalysisSummary,
    options: &CompilerOptions,
    source: &str,
) -> String {
    let eliminated = optimize::reactive_dce(summary, options);
    let mut ctx = CodegenContext::new(source, summary, options, eliminated);

    // clone the statements that branch regions fold into their memo bodies
    let wanted: FxHashSet<u32> = summary
        .regions
        .iter()
        .filter_map(|region| match region.body {
            RegionBody::Branch { branch_span } => Some(branch_span.start),
            RegionBody::DerivedGroup => None,
        })
        .collect();
    if !wanted.is_empty() {
        collect_branch_stmts(&module.body, &wanted, &mut ctx);
    }

    emit::emit_stmts(&mut ctx, &module.body);
    let body = ctx.take_buffer();

    // assemble: runtime imports, templates, module context, hoists, body
    let mut out = String::with_capacity(body.len() + 256);

    let mut runtime: Vec<&str> = ctx
        .used_helpers
        .iter()
        .copied()
        .filter(|h| *h != "jsx" && *h != "jsxs")
        .collect();
    if ctx.module_ctx_used && !runtime.contains(&"__fictUseContext") {
        runtime.push("__fictUseContext");
    }
    runtime.sort_unstable();
    if !runtime.is_empty() {
        out.push_str("import { ");
        out.push_str(&runtime.join(", "));
        out.push_str(" } from \"");
        out.push_str(RUNTIME_MODULE);
        out.push_str("\";\n");
    }

    let mut vdom: Vec<&str> = ctx
        .used_helpers
        .iter()
        .copied()
        .filter(|h| *h == "jsx" || *h == "jsxs")
        .collect();
    vdom.sort_unstable();
    if !vdom.is_empty() {
        out.push_str("import { ");
        out.push_str(&vdom.join(", "));
        out.push_str(" } from \"");
        out.push_str(JSX_RUNTIME_MODULE);
        out.push_str("\";\n");
    }

    for (index, html) in ctx.templates.iter().enumerate() {
        out.push_str("const _tmpl$");
        out.push_str(&(index + 1).to_string());
        out.push_str(" = template(`");
        out.push_str(&escape_template_string(html));
        out.push_str("`);\n");
    }

    if ctx.module_ctx_used {
        out.push_str("const __fictCtx = __fictUseContext();\n");
    }
    for line in &ctx.pending_selectors {
        out.push_str(line);
        out.push('\n');
    }

    // SAFETY: only valid UTF-8 is pushed into the buffer
    let body = unsafe { String::from_utf8_unchecked(body) };
    out.push_str(body.trim_start_matches('\n'));
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn collect_branch_stmts(stmts: &[Stmt], wanted: &FxHashSet<u32>, ctx: &mut CodegenContext) {
    for stmt in stmts {
        let span = stmt.span();
        if wanted.contains(&span.start)
            && matches!(stmt, Stmt::If(_) | Stmt::Switch(_))
            && !ctx.branch_stmts.contains_key(&span.start)
        {
            ctx.branch_stmts.insert(span.start, stmt.clone());
        }
        match stmt {
            Stmt::Func(func) => collect_branch_stmts(&func.func.body.stmts, wanted, ctx),
            Stmt::Block(block) => collect_branch_stmts(&block.stmts, wanted, ctx),
            Stmt::If(if_stmt) => {
                collect_branch_stmts(std::slice::from_ref(&if_stmt.cons), wanted, ctx);
                if let Some(alt) = &if_stmt.alt {
                    collect_branch_stmts(std::slice::from_ref(alt), wanted, ctx);
                }
            }
            Stmt::ExportNamed(export) => {
                if let Some(decl) = &export.decl {
                    collect_branch_stmts(std::slice::from_ref(decl), wanted, ctx);
                }
            }
            Stmt::VarDecl(decl) => {
                for declarator in &decl.decls {
                    if let Some(init) = &declarator.init {
                        collect_branch_stmts_in_expr(init, wanted, ctx);
                    }
                }
            }
            _ => {}
        }
    }
}

fn collect_branch_stmts_in_expr(
    expr: &fict_relief::ast::Expr,
    wanted: &FxHashSet<u32>,
    ctx: &mut CodegenContext,
) {
    use fict_relief::ast::{ArrowBody, Expr};
    match expr {
        Expr::Func(func) => collect_branch_stmts(&func.func.body.stmts, wanted, ctx),
        Expr::Arrow(arrow) => {
            if let ArrowBody::Block(block) = &arrow.body {
                collect_branch_stmts(&block.stmts, wanted, ctx);
            }
        }
        Expr::Paren(p) => collect_branch_stmts_in_expr(&p.expr, wanted, ctx),
        _ => {}
    }
}
