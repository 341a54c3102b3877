//! Small AST helpers shared by the analysis passes.

use fict_relief::ast::*;

/// Dotted path of a callee (`console.log`, `Object.keys`), when it is a
/// plain identifier/member chain.
pub fn callee_path(expr: &Expr) -> Option<String> {
    fn build(expr: &Expr, out: &mut String) -> bool {
        match expr.unwrap_tsparen() {
            Expr::Ident(id) => {
                out.push_str(&id.name);
                true
            }
            Expr::Member(member) => {
                if member.optional {
                    return false;
                }
                if !build(&member.obj, out) {
                    return false;
                }
                match &member.prop {
                    MemberProp::Ident(name, _) => {
                        out.push('.');
                        out.push_str(name);
                        true
                    }
                    MemberProp::Computed(_) => false,
                }
            }
            _ => false,
        }
    }
    let mut out = String::new();
    if build(expr, &mut out) {
        Some(out)
    } else {
        None
    }
}

/// Conservative purity: true when evaluating the expression cannot run
/// arbitrary code or mutate state. Calls, `new`, assignments, updates,
/// `await`, `delete` and tagged templates are impure.
pub fn is_pure_expr(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(_)
        | Expr::Number(_)
        | Expr::BigInt(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::Null(_)
        | Expr::Regex(_)
        | Expr::ImportMeta(_) => true,
        Expr::Template(t) => t.exprs.iter().all(is_pure_expr),
        Expr::Array(arr) => arr
            .elems
            .iter()
            .flatten()
            .all(|elem| is_pure_expr(&elem.expr)),
        Expr::Object(obj) => obj.props.iter().all(|prop| match prop {
            ObjectProp::KeyValue { key, value, .. } => {
                let key_pure = match key {
                    PropName::Computed(k) => is_pure_expr(k),
                    _ => true,
                };
                key_pure && is_pure_expr(value)
            }
            ObjectProp::Shorthand { .. } => true,
            ObjectProp::Method { .. } => true,
            ObjectProp::Spread { expr, .. } => is_pure_expr(expr),
        }),
        Expr::Unary(u) => u.op != UnaryOp::Delete && is_pure_expr(&u.arg),
        Expr::Binary(b) => is_pure_expr(&b.left) && is_pure_expr(&b.right),
        Expr::Logical(l) => is_pure_expr(&l.left) && is_pure_expr(&l.right),
        Expr::Cond(c) => is_pure_expr(&c.test) && is_pure_expr(&c.cons) && is_pure_expr(&c.alt),
        Expr::Seq(s) => s.exprs.iter().all(is_pure_expr),
        Expr::Paren(p) => is_pure_expr(&p.expr),
        Expr::Member(m) => {
            let prop_pure = match &m.prop {
                MemberProp::Computed(p) => is_pure_expr(p),
                MemberProp::Ident(..) => true,
            };
            prop_pure && is_pure_expr(&m.obj)
        }
        Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => is_pure_expr(&w.expr),
        // closures are values; creating one is pure
        Expr::Func(_) | Expr::Arrow(_) => true,
        _ => false,
    }
}

/// Whether an expression contains an obvious side effect: an assignment, an
/// update, `delete`, or a call to a mutating method.
pub fn has_side_effect(expr: &Expr) -> bool {
    struct Finder {
        found: bool,
    }
    impl Finder {
        fn visit(&mut self, expr: &Expr) {
            if self.found {
                return;
            }
            match expr {
                Expr::Assign(_) | Expr::Update(_) => self.found = true,
                Expr::Unary(u) if u.op == UnaryOp::Delete => self.found = true,
                Expr::Call(call) => {
                    if let Some(path) = callee_path(&call.callee) {
                        if let Some(method) = path.rsplit('.').next() {
                            if matches!(
                                method,
                                "push" | "pop" | "shift" | "unshift" | "splice" | "sort"
                                    | "reverse" | "fill" | "copyWithin" | "set" | "delete" | "add"
                                    | "clear"
                            ) {
                                self.found = true;
                                return;
                            }
                        }
                    }
                    self.visit(&call.callee);
                    for arg in &call.args {
                        self.visit(&arg.expr);
                    }
                }
                Expr::Binary(b) => {
                    self.visit(&b.left);
                    self.visit(&b.right);
                }
                Expr::Logical(l) => {
                    self.visit(&l.left);
                    self.visit(&l.right);
                }
                Expr::Cond(c) => {
                    self.visit(&c.test);
                    self.visit(&c.cons);
                    self.visit(&c.alt);
                }
                Expr::Seq(s) => {
                    for e in &s.exprs {
                        self.visit(e);
                    }
                }
                Expr::Paren(p) => self.visit(&p.expr),
                Expr::Member(m) => {
                    self.visit(&m.obj);
                    if let MemberProp::Computed(p) = &m.prop {
                        self.visit(p);
                    }
                }
                Expr::Unary(u) => self.visit(&u.arg),
                Expr::Template(t) => {
                    for e in &t.exprs {
                        self.visit(e);
                    }
                }
                Expr::Array(arr) => {
                    for elem in arr.elems.iter().flatten() {
                        self.visit(&elem.expr);
                    }
                }
                Expr::Object(obj) => {
                    for prop in &obj.props {
                        match prop {
                            ObjectProp::KeyValue { value, .. } => self.visit(value),
                            ObjectProp::Spread { expr, .. } => self.visit(expr),
                            _ => {}
                        }
                    }
                }
                Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => self.visit(&w.expr),
                Expr::Await(a) => self.visit(&a.arg),
                _ => {}
            }
        }
    }
    let mut finder = Finder { found: false };
    finder.visit(expr);
    finder.found
}

/// Syntactic equality on expressions, ignoring spans.
pub fn expr_fingerprint(expr: &Expr) -> Option<String> {
    if !is_pure_expr(expr) {
        return None;
    }
    let mut out = String::new();
    fn write(expr: &Expr, out: &mut String) {
        match expr {
            Expr::Ident(id) => out.push_str(&id.name),
            Expr::Number(n) => out.push_str(&n.raw),
            Expr::BigInt(b) => out.push_str(&b.raw),
            Expr::Str(s) => {
                out.push('"');
                out.push_str(&s.value);
                out.push('"');
            }
            Expr::Bool(b) => out.push_str(if b.value { "true" } else { "false" }),
            Expr::Null(_) => out.push_str("null"),
            Expr::Member(m) => {
                write(&m.obj, out);
                match &m.prop {
                    MemberProp::Ident(name, _) => {
                        out.push('.');
                        out.push_str(name);
                    }
                    MemberProp::Computed(p) => {
                        out.push('[');
                        write(p, out);
                        out.push(']');
                    }
                }
            }
            Expr::Binary(b) => {
                out.push('(');
                write(&b.left, out);
                out.push_str(b.op.as_str());
                write(&b.right, out);
                out.push(')');
            }
            Expr::Logical(l) => {
                out.push('(');
                write(&l.left, out);
                out.push_str(l.op.as_str());
                write(&l.right, out);
                out.push(')');
            }
            Expr::Unary(u) => {
                out.push('(');
                out.push_str(u.op.as_str());
                out.push(' ');
                write(&u.arg, out);
                out.push(')');
            }
            Expr::Cond(c) => {
                out.push('(');
                write(&c.test, out);
                out.push('?');
                write(&c.cons, out);
                out.push(':');
                write(&c.alt, out);
                out.push(')');
            }
            Expr::Paren(p) => write(&p.expr, out),
            Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => write(&w.expr, out),
            Expr::Template(t) => {
                out.push('`');
                for (i, quasi) in t.quasis.iter().enumerate() {
                    out.push_str(&quasi.raw);
                    if let Some(e) = t.exprs.get(i) {
                        out.push_str("${");
                        write(e, out);
                        out.push('}');
                    }
                }
                out.push('`');
            }
            // arrays, objects, closures: not worth canonicalizing
            _ => out.push('\u{0}'),
        }
    }
    write(expr, &mut out);
    if out.contains('\u{0}') {
        return None;
    }
    Some(out)
}

/// Collect free identifier names referenced by an expression (no scope
/// tracking: local shadowing inside nested closures is over-approximated).
pub fn collect_ident_names(expr: &Expr, out: &mut Vec<compact_str::CompactString>) {
    match expr {
        Expr::Ident(id) => out.push(id.name.clone()),
        Expr::Member(m) => {
            collect_ident_names(&m.obj, out);
            if let MemberProp::Computed(p) = &m.prop {
                collect_ident_names(p, out);
            }
        }
        Expr::Call(c) => {
            collect_ident_names(&c.callee, out);
            for arg in &c.args {
                collect_ident_names(&arg.expr, out);
            }
        }
        Expr::New(n) => {
            collect_ident_names(&n.callee, out);
            for arg in &n.args {
                collect_ident_names(&arg.expr, out);
            }
        }
        Expr::Binary(b) => {
            collect_ident_names(&b.left, out);
            collect_ident_names(&b.right, out);
        }
        Expr::Logical(l) => {
            collect_ident_names(&l.left, out);
            collect_ident_names(&l.right, out);
        }
        Expr::Cond(c) => {
            collect_ident_names(&c.test, out);
            collect_ident_names(&c.cons, out);
            collect_ident_names(&c.alt, out);
        }
        Expr::Unary(u) => collect_ident_names(&u.arg, out),
        Expr::Update(u) => collect_ident_names(&u.arg, out),
        Expr::Paren(p) => collect_ident_names(&p.expr, out),
        Expr::Seq(s) => {
            for e in &s.exprs {
                collect_ident_names(e, out);
            }
        }
        Expr::Template(t) => {
            for e in &t.exprs {
                collect_ident_names(e, out);
            }
        }
        Expr::Array(arr) => {
            for elem in arr.elems.iter().flatten() {
                collect_ident_names(&elem.expr, out);
            }
        }
        Expr::Object(obj) => {
            for prop in &obj.props {
                match prop {
                    ObjectProp::KeyValue { key, value, .. } => {
                        if let PropName::Computed(k) = key {
                            collect_ident_names(k, out);
                        }
                        collect_ident_names(value, out);
                    }
                    ObjectProp::Shorthand { name, .. } => out.push(name.name.clone()),
                    ObjectProp::Spread { expr, .. } => collect_ident_names(expr, out),
                    ObjectProp::Method { .. } => {}
                }
            }
        }
        Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => {
            collect_ident_names(&w.expr, out)
        }
        Expr::Await(a) => collect_ident_names(&a.arg, out),
        Expr::Arrow(arrow) => match &arrow.body {
            ArrowBody::Expr(e) => collect_ident_names(e, out),
            ArrowBody::Block(block) => {
                for stmt in &block.stmts {
                    collect_stmt_ident_names(stmt, out);
                }
            }
        },
        Expr::Func(f) => {
            for stmt in &f.func.body.stmts {
                collect_stmt_ident_names(stmt, out);
            }
        }
        _ => {}
    }
}

/// Statement-level companion to [`collect_ident_names`], used for thunk
/// bodies. Over-approximates: locally declared names are not subtracted.
fn collect_stmt_ident_names(stmt: &Stmt, out: &mut Vec<compact_str::CompactString>) {
    match stmt {
        Stmt::Expr(e) => collect_ident_names(&e.expr, out),
        Stmt::Return(r) => {
            if let Some(arg) = &r.arg {
                collect_ident_names(arg, out);
            }
        }
        Stmt::VarDecl(decl) => {
            for declarator in &decl.decls {
                if let Some(init) = &declarator.init {
                    collect_ident_names(init, out);
                }
            }
        }
        Stmt::If(if_stmt) => {
            collect_ident_names(&if_stmt.test, out);
            collect_stmt_ident_names(&if_stmt.cons, out);
            if let Some(alt) = &if_stmt.alt {
                collect_stmt_ident_names(alt, out);
            }
        }
        Stmt::Block(block) => {
            for s in &block.stmts {
                collect_stmt_ident_names(s, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fict_armature::parse_module;
    use fict_relief::ast::{Stmt, VarDecl};

    fn init_of(src: &str) -> Expr {
        let module = parse_module(src).unwrap();
        match module.body.into_iter().next().unwrap() {
            Stmt::VarDecl(VarDecl { mut decls, .. }) => decls.remove(0).init.unwrap(),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_callee_path() {
        let expr = init_of("const x = console.log;");
        assert_eq!(callee_path(&expr).as_deref(), Some("console.log"));
        let expr = init_of("const x = foo;");
        assert_eq!(callee_path(&expr).as_deref(), Some("foo"));
    }

    #[test]
    fn test_purity() {
        assert!(is_pure_expr(&init_of("const x = a + b.c * 2;")));
        assert!(!is_pure_expr(&init_of("const x = f();")));
        assert!(!is_pure_expr(&init_of("const x = (a = 1);")));
    }

    #[test]
    fn test_side_effects() {
        assert!(has_side_effect(&init_of("const x = items.push(1);")));
        assert!(has_side_effect(&init_of("const x = (a = 2);")));
        assert!(!has_side_effect(&init_of("const x = a + b;")));
    }

    #[test]
    fn test_fingerprint_equality() {
        let a = init_of("const x = a.b + 1;");
        let b = init_of("const y = a.b  + 1;");
        assert_eq!(expr_fingerprint(&a), expr_fingerprint(&b));
        let c = init_of("const z = a.b + 2;");
        assert_ne!(expr_fingerprint(&a), expr_fingerprint(&c));
    }
}
