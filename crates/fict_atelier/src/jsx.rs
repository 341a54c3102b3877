//! JSX lowering.
//!
//! Fine-grained DOM mode (the default) extracts each static JSX subtree
//! into a hoisted `template(...)` declaration and instantiates it with a
//! path-indexed walk, attaching one binding call per dynamic hole. VDOM
//! mode lowers each element to a `jsx`/`jsxs` call with getter-wrapped
//! reactive props.

use fict_carton::{phf_set, FxHashMap, PhfSet};
use fict_croquis::binder::{arrow_result_expr, as_map_call, is_event_attr};
use fict_relief::ast::*;

use crate::context::CodegenContext;
use crate::emit::{
    emit_block_braces, emit_expr, emit_expr_to_string, emit_pattern, expr_is_reactive, P_ASSIGN,
};

/// Void HTML elements (no closing tag in templates)
static VOID_TAGS: PhfSet<&'static str> = phf_set! {
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "param", "source", "track", "wbr",
};

/// Form elements whose `value`/`checked` lower to property bindings
static FORM_TAGS: PhfSet<&'static str> = phf_set! {
    "input", "textarea", "select",
};

pub fn emit_jsx_expr(ctx: &mut CodegenContext, expr: &Expr) {
    if !ctx.options.fine_grained_dom {
        emit_vdom(ctx, expr);
        return;
    }
    match expr {
        Expr::Jsx(el) if el.is_component() => emit_component_call(ctx, el),
        Expr::Jsx(el) => emit_dom_element(ctx, el),
        Expr::JsxFragment(frag) => emit_fragment_array(ctx, &frag.children),
        _ => unreachable!("emit_jsx_expr expects a JSX node"),
    }
}

// -----------------------------------------------------------------------------
// Fine-grained: template extraction
// -----------------------------------------------------------------------------

enum OpKind<'e> {
    BindText(&'e Expr),
    Insert(&'e Expr),
    InsertComponent(&'e JsxElement),
    InsertFragment(&'e [JsxChild]),
    BindAttr(&'e str, &'e Expr),
    /// `{...attrs}` on a DOM element: a whole-object attribute binding
    SpreadAttrs(&'e Expr),
    BindClass(&'e Expr),
    BindStyle(&'e Expr),
    BindProp(&'e str, &'e Expr),
    BindRef(&'e Expr),
    BindEvent(String, &'e Expr),
}

struct Op<'e> {
    /// Template-order child-index path from the root to the target node
    path: Vec<usize>,
    kind: OpKind<'e>,
}

struct TemplateBuild<'e> {
    html: String,
    ops: Vec<Op<'e>>,
}

fn emit_dom_element(ctx: &mut CodegenContext, el: &JsxElement) {
    let mut build = TemplateBuild {
        html: String::new(),
        ops: Vec::new(),
    };
    let mut path = Vec::new();
    build_element(el, &mut build, &mut path);

    ctx.helper("template");
    let tmpl = ctx.add_template(build.html);

    if build.ops.is_empty() {
        // fully static subtree
        ctx.push(&tmpl);
        ctx.push("()");
        return;
    }

    let saved_el = ctx.reset_el_counter();

    ctx.push("(() => {");
    ctx.indent();
    ctx.newline();
    ctx.push("const __root = ");
    ctx.push(&tmpl);
    ctx.push("();");

    // walk declarations for every node the ops reference
    let mut vars: FxHashMap<Vec<usize>, String> = FxHashMap::default();
    vars.insert(Vec::new(), "__root".to_string());
    for op in &build.ops {
        ensure_path_var(ctx, &mut vars, &op.path);
        if matches!(
            op.kind,
            OpKind::Insert(_) | OpKind::InsertComponent(_) | OpKind::InsertFragment(_)
        ) {
            let parent = op.path[..op.path.len() - 1].to_vec();
            ensure_path_var(ctx, &mut vars, &parent);
        }
    }

    for op in &build.ops {
        ctx.newline();
        let var = vars[&op.path].clone();
        match &op.kind {
            OpKind::BindText(expr) => {
                let helper = ctx.helper("bindText");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&var);
                ctx.push(", () => ");
                emit_thunk_expr(ctx, expr);
                ctx.push(");");
            }
            OpKind::Insert(expr) => {
                let parent = vars[&op.path[..op.path.len() - 1]].clone();
                let helper = ctx.helper("insert");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&parent);
                ctx.push(", ");
                ctx.push(&var);
                ctx.push(", () => ");
                emit_insert_value(ctx, expr);
                ctx.push(");");
            }
            OpKind::InsertComponent(child) => {
                let parent = vars[&op.path[..op.path.len() - 1]].clone();
                let helper = ctx.helper("insert");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&parent);
                ctx.push(", ");
                ctx.push(&var);
                ctx.push(", () => ");
                ctx.suspend_getter_cache += 1;
                emit_component_call(ctx, child);
                ctx.suspend_getter_cache -= 1;
                ctx.push(");");
            }
            OpKind::InsertFragment(children) => {
                let parent = vars[&op.path[..op.path.len() - 1]].clone();
                let helper = ctx.helper("insert");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&parent);
                ctx.push(", ");
                ctx.push(&var);
                ctx.push(", () => ");
                ctx.suspend_getter_cache += 1;
                emit_fragment_array(ctx, children);
                ctx.suspend_getter_cache -= 1;
                ctx.push(");");
            }
            OpKind::BindAttr(name, expr) => {
                let helper = ctx.helper("bindAttribute");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&var);
                ctx.push(", \"");
                ctx.push(name);
                ctx.push("\", () => ");
                emit_thunk_expr(ctx, expr);
                ctx.push(");");
            }
            OpKind::SpreadAttrs(expr) => {
                let helper = ctx.helper("bindAttribute");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&var);
                ctx.push(", null, () => ");
                emit_thunk_expr(ctx, expr);
                ctx.push(");");
            }
            OpKind::BindClass(expr) => emit_class_binding(ctx, &var, expr),
            OpKind::BindStyle(expr) => {
                let helper = ctx.helper("bindStyle");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&var);
                ctx.push(", () => ");
                emit_thunk_expr(ctx, expr);
                ctx.push(");");
            }
            OpKind::BindProp(name, expr) => {
                let helper = ctx.helper("bindProperty");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&var);
                ctx.push(", \"");
                ctx.push(name);
                ctx.push("\", () => ");
                emit_thunk_expr(ctx, expr);
                ctx.push(");");
            }
            OpKind::BindRef(expr) => {
                let helper = ctx.helper("bindRef");
                ctx.push(helper);
                ctx.push("(");
                ctx.push(&var);
                ctx.push(", ");
                ctx.suspend_getter_cache += 1;
                emit_expr(ctx, expr, P_ASSIGN);
                ctx.suspend_getter_cache -= 1;
                ctx.push(");");
            }
            OpKind::BindEvent(event, handler) => emit_event_binding(ctx, &var, event, handler),
        }
    }

    ctx.newline();
    ctx.push("return __root;");
    ctx.deindent();
    ctx.newline();
    ctx.push("})()");

    ctx.restore_el_counter(saved_el);
}

/// Declare `firstChild`/`nextSibling` chains down to `path`, caching every
/// intermediate node variable.
fn ensure_path_var(
    ctx: &mut CodegenContext,
    vars: &mut FxHashMap<Vec<usize>, String>,
    path: &[usize],
) -> String {
    if let Some(var) = vars.get(path) {
        return var.clone();
    }
    let (parent, index) = path.split_at(path.len() - 1);
    let index = index[0];
    let source = if index == 0 {
        let parent_var = ensure_path_var(ctx, vars, parent);
        format!("{parent_var}.firstChild")
    } else {
        let mut prev = parent.to_vec();
        prev.push(index - 1);
        let prev_var = ensure_path_var(ctx, vars, &prev);
        format!("{prev_var}.nextSibling")
    };
    let var = ctx.next_el();
    ctx.newline();
    ctx.push("const ");
    ctx.push(&var);
    ctx.push(" = ");
    ctx.push(&source);
    ctx.push(";");
    vars.insert(path.to_vec(), var.clone());
    var
}

fn build_element<'e>(el: &'e JsxElement, build: &mut TemplateBuild<'e>, path: &mut Vec<usize>) {
    let tag = el.name.display();
    build.html.push('<');
    build.html.push_str(&tag);

    for attr in &el.attrs {
        match attr {
            JsxAttr::Named(named) => build_attr(el, named, build, path),
            JsxAttr::Spread(spread) => {
                build.ops.push(Op {
                    path: path.clone(),
                    kind: OpKind::SpreadAttrs(&spread.expr),
                });
            }
        }
    }
    build.html.push('>');

    if VOID_TAGS.contains(tag.as_str()) {
        return;
    }

    let mut index = 0usize;
    for child in &el.children {
        match child {
            JsxChild::Text(text) => {
                if is_dropped_jsx_text(&text.value) {
                    continue;
                }
                push_escaped_text(&mut build.html, &text.value);
                index += 1;
            }
            JsxChild::Element(child_el) => {
                if child_el.is_component() {
                    build.html.push_str("<!---->");
                    path.push(index);
                    build.ops.push(Op {
                        path: path.clone(),
                        kind: OpKind::InsertComponent(child_el),
                    });
                    path.pop();
                } else {
                    path.push(index);
                    build_element(child_el, build, path);
                    path.pop();
                }
                index += 1;
            }
            JsxChild::Fragment(frag) => {
                build.html.push_str("<!---->");
                path.push(index);
                build.ops.push(Op {
                    path: path.clone(),
                    kind: OpKind::InsertFragment(&frag.children),
                });
                path.pop();
                index += 1;
            }
            JsxChild::Expr(container) => {
                let Some(expr) = &container.expr else { continue };
                build.html.push_str("<!---->");
                path.push(index);
                let kind = if is_block_child(expr) {
                    OpKind::Insert(expr)
                } else {
                    OpKind::BindText(expr)
                };
                build.ops.push(Op {
                    path: path.clone(),
                    kind,
                });
                path.pop();
                index += 1;
            }
        }
    }

    build.html.push_str("</");
    build.html.push_str(&tag);
    build.html.push('>');
}

fn build_attr<'e>(
    el: &JsxElement,
    attr: &'e JsxNamedAttr,
    build: &mut TemplateBuild<'e>,
    path: &[usize],
) {
    let name = attr.name.as_str();
    if name == "key" {
        return;
    }

    match &attr.value {
        None => {
            build.html.push(' ');
            build.html.push_str(name);
        }
        Some(JsxAttrValue::Str(s)) => {
            build.html.push(' ');
            build.html.push_str(name);
            build.html.push_str("=\"");
            build.html.push_str(&s.value.replace('"', "&quot;"));
            build.html.push('"');
        }
        Some(JsxAttrValue::Expr(expr)) => {
            // constant literal values fold into the template
            if let Some(text) = constant_attr_text(expr) {
                build.html.push(' ');
                build.html.push_str(name);
                build.html.push_str("=\"");
                build.html.push_str(&text.replace('"', "&quot;"));
                build.html.push('"');
                return;
            }
            let kind = if is_event_attr(name) {
                OpKind::BindEvent(event_name(name), expr)
            } else if name == "class" || name == "className" {
                OpKind::BindClass(expr)
            } else if name == "style" {
                OpKind::BindStyle(expr)
            } else if name == "ref" {
                OpKind::BindRef(expr)
            } else if (name == "value" || name == "checked")
                && FORM_TAGS.contains(el.name.display().as_str())
            {
                OpKind::BindProp(if name == "value" { "value" } else { "checked" }, expr)
            } else {
                OpKind::BindAttr(name, expr)
            };
            build.ops.push(Op {
                path: path.to_vec(),
                kind,
            });
        }
    }
}

fn constant_attr_text(expr: &Expr) -> Option<String> {
    match expr.unwrap_tsparen() {
        Expr::Str(s) => Some(s.value.clone()),
        Expr::Number(n) => Some(n.raw.to_string()),
        Expr::Bool(b) => Some(b.value.to_string()),
        _ => None,
    }
}

/// `onDblClick` -> `dblclick`
fn event_name(attr: &str) -> String {
    attr[2..].to_ascii_lowercase()
}

/// Whitespace-only JSX text containing a newline is formatting, not content.
fn is_dropped_jsx_text(text: &str) -> bool {
    text.trim().is_empty() && text.contains('\n')
}

fn push_escaped_text(html: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => html.push_str("&amp;"),
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            _ => html.push(c),
        }
    }
}

/// Dynamic children that need an `insert` container rather than a text
/// binding: lists, conditionals over JSX, components, fragments.
fn is_block_child(expr: &Expr) -> bool {
    match expr.unwrap_tsparen() {
        Expr::Jsx(_) | Expr::JsxFragment(_) => true,
        Expr::Cond(cond) => is_block_child(&cond.cons) || is_block_child(&cond.alt),
        Expr::Logical(log) => is_block_child(&log.left) || is_block_child(&log.right),
        Expr::Call(call) => {
            // list rendering, or a component invocation
            if as_map_call(expr).is_some() {
                return true;
            }
            call.callee
                .as_ident_name()
                .is_some_and(|name| name.chars().next().is_some_and(|c| c.is_ascii_uppercase()))
        }
        _ => false,
    }
}

/// Thunk body for text/attr/style/prop bindings. Object literals get the
/// parentheses an arrow body requires.
fn emit_thunk_expr(ctx: &mut CodegenContext, expr: &Expr) {
    ctx.suspend_getter_cache += 1;
    if matches!(expr.unwrap_tsparen(), Expr::Object(_)) {
        ctx.push("(");
        emit_expr(ctx, expr, P_ASSIGN);
        ctx.push(")");
    } else {
        emit_expr(ctx, expr, P_ASSIGN);
    }
    ctx.suspend_getter_cache -= 1;
}

/// Insert-hole value: keyed lists lower here, everything else emits as an
/// expression.
fn emit_insert_value(ctx: &mut CodegenContext, expr: &Expr) {
    ctx.suspend_getter_cache += 1;
    if let Some((receiver, render)) = as_map_call(expr) {
        if arrow_result_expr(render).is_some_and(is_jsx_result) {
            emit_keyed_list(ctx, receiver, render);
            ctx.suspend_getter_cache -= 1;
            return;
        }
    }
    emit_expr(ctx, expr, P_ASSIGN);
    ctx.suspend_getter_cache -= 1;
}

fn is_jsx_result(expr: &Expr) -> bool {
    matches!(expr.unwrap_tsparen(), Expr::Jsx(_) | Expr::JsxFragment(_))
}

// -----------------------------------------------------------------------------
// Keyed lists and selectors
// -----------------------------------------------------------------------------

fn emit_keyed_list(ctx: &mut CodegenContext, receiver: &Expr, render: &Expr) {
    let helper = ctx.helper("createKeyedList");
    ctx.push(helper);
    ctx.push("(() => ");
    emit_expr(ctx, receiver, P_ASSIGN);
    ctx.push(", ");

    let Expr::Arrow(arrow) = render.unwrap_tsparen() else {
        // non-arrow render callbacks pass through untouched
        emit_expr(ctx, render, P_ASSIGN);
        ctx.push(")");
        return;
    };

    ctx.push("(");
    match arrow.params.first() {
        Some(pat) => emit_pattern(ctx, pat),
        None => ctx.push("__item"),
    }
    ctx.push(", ");
    match arrow.params.get(1) {
        Some(pat) => emit_pattern(ctx, pat),
        None => ctx.push("__index"),
    }
    ctx.push(", __key) => ");

    // key expression source, for selector hoisting inside the row
    let key_source = arrow_result_expr(render)
        .and_then(|result| match result.unwrap_tsparen() {
            Expr::Jsx(el) => el.attr("key"),
            _ => None,
        })
        .and_then(|attr| match &attr.value {
            Some(JsxAttrValue::Expr(expr)) => Some(ctx.span_text(expr.span()).trim().to_string()),
            _ => None,
        });
    let saved_key = ctx.current_key.take();
    if let Some(source) = key_source {
        ctx.current_key = Some((source, "__key".to_string()));
    }

    match &arrow.body {
        ArrowBody::Expr(body) => emit_expr(ctx, body, P_ASSIGN),
        ArrowBody::Block(block) => emit_block_braces(ctx, &block.stmts),
    }

    ctx.current_key = saved_key;
    ctx.push(")");
}

/// `class={key === selected() ? "a" : "b"}` inside a keyed list hoists a
/// `createSelector` and rewrites the test to a selector probe.
fn emit_class_binding(ctx: &mut CodegenContext, var: &str, expr: &Expr) {
    if let Some((key_source, key_param)) = ctx.current_key.clone() {
        if let Expr::Cond(cond) = expr.unwrap_tsparen() {
            if let Expr::Binary(bin) = cond.test.unwrap_tsparen() {
                if matches!(bin.op, BinaryOp::StrictEq | BinaryOp::Eq) {
                    let left_src = ctx.span_text(bin.left.span()).trim().to_string();
                    let right_src = ctx.span_text(bin.right.span()).trim().to_string();
                    let selected = if left_src == key_source && is_reactive_ident(ctx, &bin.right)
                    {
                        Some(&bin.right)
                    } else if right_src == key_source && is_reactive_ident(ctx, &bin.left) {
                        Some(&bin.left)
                    } else {
                        None
                    };
                    if let Some(selected) = selected {
                        let accessor = emit_expr_to_string(ctx, selected);
                        let sel_name = ctx.selector_for(&accessor, &accessor);
                        let helper = ctx.helper("bindClass");
                        ctx.push(helper);
                        ctx.push("(");
                        ctx.push(var);
                        ctx.push(", () => ");
                        ctx.push(&sel_name);
                        ctx.push("(");
                        ctx.push(&key_param);
                        ctx.push(") ? ");
                        ctx.suspend_getter_cache += 1;
                        emit_expr(ctx, &cond.cons, P_ASSIGN);
                        ctx.push(" : ");
                        emit_expr(ctx, &cond.alt, P_ASSIGN);
                        ctx.suspend_getter_cache -= 1;
                        ctx.push(");");
                        return;
                    }
                }
            }
        }
    }
    let helper = ctx.helper("bindClass");
    ctx.push(helper);
    ctx.push("(");
    ctx.push(var);
    ctx.push(", () => ");
    emit_thunk_expr(ctx, expr);
    ctx.push(");");
}

fn is_reactive_ident(ctx: &CodegenContext, expr: &Expr) -> bool {
    let Expr::Ident(ident) = expr.unwrap_tsparen() else {
        return false;
    };
    if ident.span.end <= ident.span.start {
        return false;
    }
    ctx.summary
        .resolve_at(ident.span.start)
        .is_some_and(|id| ctx.summary.binding(id).kind.reads_as_call())
}

// -----------------------------------------------------------------------------
// Events
// -----------------------------------------------------------------------------

/// Delegated data form: `onX={() => f(data)}` with an untracked `f` sets
/// `$$x`/`$$xData` node properties for the shared dispatcher.
fn emit_event_binding(ctx: &mut CodegenContext, var: &str, event: &str, handler: &Expr) {
    if let Expr::Arrow(arrow) = handler.unwrap_tsparen() {
        if arrow.params.is_empty() {
            if let ArrowBody::Expr(body) = &arrow.body {
                if let Expr::Call(call) = body.unwrap_tsparen() {
                    if call.args.len() == 1 && !call.args[0].spread {
                        if let Expr::Ident(callee) = call.callee.unwrap_tsparen() {
                            let tracked = callee.span.end > callee.span.start
                                && ctx
                                    .summary
                                    .resolve_at(callee.span.start)
                                    .is_some_and(|id| {
                                        ctx.summary.binding(id).kind.reads_as_call()
                                    });
                            if !tracked {
                                ctx.push(var);
                                ctx.push(".$$");
                                ctx.push(event);
                                ctx.push(" = ");
                                ctx.push(&callee.name);
                                ctx.push(";");
                                ctx.newline();
                                ctx.push(var);
                                ctx.push(".$$");
                                ctx.push(event);
                                ctx.push("Data = () => ");
                                ctx.suspend_getter_cache += 1;
                                emit_expr(ctx, &call.args[0].expr, P_ASSIGN);
                                ctx.suspend_getter_cache -= 1;
                                ctx.push(";");
                                return;
                            }
                        }
                    }
                }
            }
        }
    }

    let helper = ctx.helper("bindEvent");
    ctx.push(helper);
    ctx.push("(");
    ctx.push(var);
    ctx.push(", \"");
    ctx.push(event);
    ctx.push("\", ");
    ctx.suspend_getter_cache += 1;
    emit_expr(ctx, handler, P_ASSIGN);
    ctx.suspend_getter_cache -= 1;
    ctx.push(");");
}

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

fn emit_component_call(ctx: &mut CodegenContext, el: &JsxElement) {
    let name = el.name.display();
    ctx.push(&name);
    ctx.push("(");

    // group named attrs between spreads to preserve evaluation order
    let mut groups: Vec<ComponentPropsGroup> = Vec::new();
    let mut current: Vec<&JsxNamedAttr> = Vec::new();
    let mut key_attr: Option<&Expr> = None;
    let mut has_spread = false;
    for attr in &el.attrs {
        match attr {
            JsxAttr::Named(named) => {
                if named.name == "key" {
                    if let Some(JsxAttrValue::Expr(expr)) = &named.value {
                        key_attr = Some(expr);
                    }
                    continue;
                }
                current.push(named);
            }
            JsxAttr::Spread(spread) => {
                has_spread = true;
                if !current.is_empty() {
                    groups.push(ComponentPropsGroup::Named(std::mem::take(&mut current)));
                }
                groups.push(ComponentPropsGroup::Spread(&spread.expr));
            }
        }
    }
    if !current.is_empty() {
        groups.push(ComponentPropsGroup::Named(current));
    }

    let has_children = el
        .children
        .iter()
        .any(|child| !matches!(child, JsxChild::Text(t) if is_dropped_jsx_text(&t.value)));

    let children = if has_children {
        Some(el.children.as_slice())
    } else {
        None
    };

    if has_spread {
        let helper = ctx.helper("mergeProps");
        ctx.push(helper);
        ctx.push("(");
        for (i, group) in groups.iter().enumerate() {
            if i > 0 {
                ctx.push(", ");
            }
            match group {
                ComponentPropsGroup::Spread(expr) => emit_expr(ctx, expr, P_ASSIGN),
                ComponentPropsGroup::Named(attrs) => emit_props_object(ctx, attrs, None),
            }
        }
        if let Some(children) = children {
            if !groups.is_empty() {
                ctx.push(", ");
            }
            emit_props_object(ctx, &[], Some(children));
        }
        ctx.push(")");
    } else {
        let named: Vec<&JsxNamedAttr> = match groups.first() {
            Some(ComponentPropsGroup::Named(attrs)) => attrs.clone(),
            _ => Vec::new(),
        };
        let reactive_key = key_attr.is_some_and(|expr| expr_is_reactive(ctx, expr));
        if let (Some(key), true) = (key_attr, reactive_key) {
            let helper = ctx.helper("keyed");
            ctx.push(helper);
            ctx.push("(");
            emit_props_object(ctx, &named, children);
            ctx.push(", () => ");
            emit_thunk_expr(ctx, key);
            ctx.push(")");
        } else {
            emit_props_object(ctx, &named, children);
        }
    }

    ctx.push(")");
}

enum ComponentPropsGroup<'e> {
    Named(Vec<&'e JsxNamedAttr>),
    Spread(&'e Expr),
}

fn emit_props_object(ctx: &mut CodegenContext, attrs: &[&JsxNamedAttr], children: Option<&[JsxChild]>) {
    ctx.push("{");
    let mut first = true;
    for attr in attrs {
        if !first {
            ctx.push(",");
        }
        first = false;
        ctx.push(" ");
        match &attr.value {
            None => {
                ctx.push(&attr.name);
                ctx.push(": true");
            }
            Some(JsxAttrValue::Str(s)) => {
                ctx.push(&attr.name);
                ctx.push(": ");
                crate::emit::emit_str_lit(ctx, &s.value);
            }
            Some(JsxAttrValue::Expr(expr)) => {
                if expr_is_reactive(ctx, expr) {
                    ctx.push("get ");
                    ctx.push(&attr.name);
                    ctx.push("() { return ");
                    emit_thunk_expr(ctx, expr);
                    ctx.push("; }");
                } else {
                    ctx.push(&attr.name);
                    ctx.push(": ");
                    emit_expr(ctx, expr, P_ASSIGN);
                }
            }
        }
    }
    if let Some(children) = children {
        if !first {
            ctx.push(",");
        }
        first = false;
        ctx.push(" get children() { return ");
        emit_children_value(ctx, children);
        ctx.push("; }");
    }
    if !first {
        ctx.push(" ");
    }
    ctx.push("}");
}

fn emit_children_value(ctx: &mut CodegenContext, children: &[JsxChild]) {
    let kept: Vec<&JsxChild> = children
        .iter()
        .filter(|child| !matches!(child, JsxChild::Text(t) if is_dropped_jsx_text(&t.value)))
        .collect();
    if kept.len() == 1 {
        emit_jsx_child_value(ctx, kept[0]);
        return;
    }
    ctx.push("[");
    for (i, child) in kept.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        emit_jsx_child_value(ctx, child);
    }
    ctx.push("]");
}

fn emit_jsx_child_value(ctx: &mut CodegenContext, child: &JsxChild) {
    match child {
        JsxChild::Text(text) => crate::emit::emit_str_lit(ctx, text.value.trim()),
        JsxChild::Expr(container) => match &container.expr {
            Some(expr) => emit_expr(ctx, expr, P_ASSIGN),
            None => ctx.push("null"),
        },
        JsxChild::Element(el) => {
            if el.is_component() {
                emit_component_call(ctx, el);
            } else {
                emit_dom_element(ctx, el);
            }
        }
        JsxChild::Fragment(frag) => emit_fragment_array(ctx, &frag.children),
    }
}

fn emit_fragment_array(ctx: &mut CodegenContext, children: &[JsxChild]) {
    let kept: Vec<&JsxChild> = children
        .iter()
        .filter(|child| !matches!(child, JsxChild::Text(t) if is_dropped_jsx_text(&t.value)))
        .collect();
    ctx.push("[");
    for (i, child) in kept.iter().enumerate() {
        if i > 0 {
            ctx.push(", ");
        }
        emit_jsx_child_value(ctx, child);
    }
    ctx.push("]");
}

// -----------------------------------------------------------------------------
// VDOM mode
// -----------------------------------------------------------------------------

fn emit_vdom(ctx: &mut CodegenContext, expr: &Expr) {
    match expr {
        Expr::Jsx(el) => emit_vdom_element(ctx, el),
        Expr::JsxFragment(frag) => {
            ctx.push("[");
            let kept: Vec<&JsxChild> = frag
                .children
                .iter()
                .filter(|child| !matches!(child, JsxChild::Text(t) if is_dropped_jsx_text(&t.value)))
                .collect();
            for (i, child) in kept.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                emit_vdom_child(ctx, child);
            }
            ctx.push("]");
        }
        _ => unreachable!("emit_vdom expects a JSX node"),
    }
}

fn emit_vdom_element(ctx: &mut CodegenContext, el: &JsxElement) {
    let kept_children: Vec<&JsxChild> = el
        .children
        .iter()
        .filter(|child| !matches!(child, JsxChild::Text(t) if is_dropped_jsx_text(&t.value)))
        .collect();
    let helper = if kept_children.len() > 1 {
        ctx.helper("jsxs")
    } else {
        ctx.helper("jsx")
    };
    ctx.push(helper);
    ctx.push("(");
    if el.is_component() {
        ctx.push(&el.name.display());
    } else {
        ctx.push("\"");
        ctx.push(&el.name.display());
        ctx.push("\"");
    }
    ctx.push(", {");

    let mut first = true;
    for attr in &el.attrs {
        match attr {
            JsxAttr::Named(named) => {
                if named.name == "key" {
                    continue;
                }
                if !first {
                    ctx.push(",");
                }
                first = false;
                ctx.push(" ");
                match &named.value {
                    None => {
                        ctx.push(&named.name);
                        ctx.push(": true");
                    }
                    Some(JsxAttrValue::Str(s)) => {
                        ctx.push(&named.name);
                        ctx.push(": ");
                        crate::emit::emit_str_lit(ctx, &s.value);
                    }
                    Some(JsxAttrValue::Expr(expr)) => {
                        if expr_is_reactive(ctx, expr) && !is_event_attr(&named.name) {
                            ctx.push("get ");
                            ctx.push(&named.name);
                            ctx.push("() { return ");
                            emit_thunk_expr(ctx, expr);
                            ctx.push("; }");
                        } else {
                            ctx.push(&named.name);
                            ctx.push(": ");
                            emit_expr(ctx, expr, P_ASSIGN);
                        }
                    }
                }
            }
            JsxAttr::Spread(spread) => {
                if !first {
                    ctx.push(",");
                }
                first = false;
                ctx.push(" ...");
                emit_expr(ctx, &spread.expr, P_ASSIGN);
            }
        }
    }

    if !kept_children.is_empty() {
        if !first {
            ctx.push(",");
        }
        first = false;
        ctx.push(" children: ");
        if kept_children.len() == 1 {
            emit_vdom_child(ctx, kept_children[0]);
        } else {
            ctx.push("[");
            for (i, child) in kept_children.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                emit_vdom_child(ctx, child);
            }
            ctx.push("]");
        }
    }

    if !first {
        ctx.push(" ");
    }
    ctx.push("})");
}

fn emit_vdom_child(ctx: &mut CodegenContext, child: &JsxChild) {
    match child {
        JsxChild::Text(text) => crate::emit::emit_str_lit(ctx, text.value.trim()),
        JsxChild::Expr(container) => match &container.expr {
            Some(expr) => emit_expr(ctx, expr, P_ASSIGN),
            None => ctx.push("null"),
        },
        JsxChild::Element(el) => emit_vdom_element(ctx, el),
        JsxChild::Fragment(frag) => {
            ctx.push("[");
            for (i, c) in frag.children.iter().enumerate() {
                if i > 0 {
                    ctx.push(", ");
                }
                emit_vdom_child(ctx, c);
            }
            ctx.push("]");
        }
    }
}
