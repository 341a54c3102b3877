//! Surface AST node types.
//!
//! This module defines the AST for the Fict surface dialect: JavaScript with
//! TypeScript annotations and JSX markup, extended with the `$state`/`$effect`
//! binding macros. Nodes are owned (`Box`/`Vec`) and every node carries its
//! source span.

use fict_carton::{CompactString, Span};

/// Node type discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    Module = 0,
    Stmt = 1,
    Expr = 2,
    Pattern = 3,
    JsxElement = 4,
    JsxFragment = 5,
}

/// The unit of compilation: an ordered sequence of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub span: Span,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(ExprStmt),
    VarDecl(VarDecl),
    Func(Box<FuncDecl>),
    Class(Box<ClassDecl>),
    Return(ReturnStmt),
    If(Box<IfStmt>),
    Switch(Box<SwitchStmt>),
    While(Box<WhileStmt>),
    DoWhile(Box<DoWhileStmt>),
    For(Box<ForStmt>),
    ForIn(Box<ForInStmt>),
    ForOf(Box<ForOfStmt>),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Block(BlockStmt),
    Throw(ThrowStmt),
    Try(Box<TryStmt>),
    Labeled(Box<LabeledStmt>),
    Import(ImportDecl),
    ExportNamed(Box<ExportNamedDecl>),
    ExportDefault(Box<ExportDefaultDecl>),
    Empty(Span),
    Debugger(Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Expr(s) => s.span,
            Stmt::VarDecl(s) => s.span,
            Stmt::Func(s) => s.span,
            Stmt::Class(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::Switch(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::ForIn(s) => s.span,
            Stmt::ForOf(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Block(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Labeled(s) => s.span,
            Stmt::Import(s) => s.span,
            Stmt::ExportNamed(s) => s.span,
            Stmt::ExportDefault(s) => s.span,
            Stmt::Empty(span) => *span,
            Stmt::Debugger(span) => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

/// Declaration keyword for variable statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VarKind {
    Var = 0,
    Let = 1,
    Const = 2,
}

impl VarKind {
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub decls: Vec<Declarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub pat: Pattern,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: Ident,
    pub func: Function,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub class: Class,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub arg: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub test: Expr,
    pub cons: Stmt,
    pub alt: Option<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub disc: Expr,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

/// One `case`/`default` arm. `test` is `None` for `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Stmt,
    pub test: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<ForInit>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expr(Expr),
}

/// Left-hand side of `for-in` / `for-of`
#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    VarDecl(VarKind, Pattern),
    Pattern(Pattern),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForInStmt {
    pub left: ForHead,
    pub object: Expr,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForOfStmt {
    pub left: ForHead,
    pub iterable: Expr,
    pub body: Stmt,
    pub is_await: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub label: Option<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub label: Option<Ident>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStmt {
    pub arg: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TryStmt {
    pub block: BlockStmt,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<BlockStmt>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Pattern>,
    pub body: BlockStmt,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub label: Ident,
    pub body: Stmt,
    pub span: Span,
}

// =============================================================================
// Imports / exports
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub default: Option<Ident>,
    pub namespace: Option<Ident>,
    pub named: Vec<ImportSpecifier>,
    pub source: StrLit,
    pub type_only: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    /// Name as exported by the source module
    pub imported: CompactString,
    /// Local binding (differs from `imported` when aliased)
    pub local: Ident,
    pub span: Span,
}

impl ImportSpecifier {
    #[inline]
    pub fn is_aliased(&self) -> bool {
        self.imported != self.local.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportNamedDecl {
    /// `export const x = …` / `export function f() {}`
    pub decl: Option<Stmt>,
    /// `export { a, b as c }`
    pub specifiers: Vec<ExportSpecifier>,
    /// `export { a } from "m"`
    pub source: Option<StrLit>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    pub local: CompactString,
    pub exported: CompactString,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportDefaultDecl {
    pub expr: Expr,
    pub span: Span,
}

// =============================================================================
// Patterns
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(IdentPat),
    Object(Box<ObjectPat>),
    Array(Box<ArrayPat>),
    /// `target = default`
    Assign(Box<AssignPat>),
    /// `...rest`
    Rest(Box<RestPat>),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Ident(p) => p.span,
            Pattern::Object(p) => p.span,
            Pattern::Array(p) => p.span,
            Pattern::Assign(p) => p.span,
            Pattern::Rest(p) => p.span,
        }
    }

    /// The single bound name, if this is a bare identifier pattern.
    pub fn as_ident(&self) -> Option<&IdentPat> {
        match self {
            Pattern::Ident(p) => Some(p),
            _ => None,
        }
    }

    /// Collect every name this pattern binds, in source order.
    pub fn bound_names(&self, out: &mut Vec<CompactString>) {
        match self {
            Pattern::Ident(p) => out.push(p.name.clone()),
            Pattern::Object(p) => {
                for prop in &p.props {
                    prop.value.bound_names(out);
                }
                if let Some(rest) = &p.rest {
                    rest.bound_names(out);
                }
            }
            Pattern::Array(p) => {
                for elem in p.elems.iter().flatten() {
                    elem.bound_names(out);
                }
            }
            Pattern::Assign(p) => p.target.bound_names(out),
            Pattern::Rest(p) => p.arg.bound_names(out),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdentPat {
    pub name: CompactString,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPat {
    pub props: Vec<ObjectPatProp>,
    pub rest: Option<Pattern>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPatProp {
    pub key: PropName,
    pub value: Pattern,
    pub shorthand: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPat {
    pub elems: Vec<Option<Pattern>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignPat {
    pub target: Pattern,
    pub default: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestPat {
    pub arg: Pattern,
    pub span: Span,
}

/// Property key in object literals, patterns and class members
#[derive(Debug, Clone, PartialEq)]
pub enum PropName {
    Ident(CompactString, Span),
    Str(StrLit),
    Num(NumberLit),
    Computed(Box<Expr>),
}

impl PropName {
    /// Static string form of the key, when it has one.
    pub fn static_name(&self) -> Option<&str> {
        match self {
            PropName::Ident(name, _) => Some(name),
            PropName::Str(s) => Some(&s.value),
            _ => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            PropName::Ident(_, span) => *span,
            PropName::Str(s) => s.span,
            PropName::Num(n) => n.span,
            PropName::Computed(e) => e.span(),
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(Ident),
    Number(NumberLit),
    BigInt(BigIntLit),
    Str(StrLit),
    Bool(BoolLit),
    Null(Span),
    Regex(RegexLit),
    Template(Box<TemplateLit>),
    TaggedTemplate(Box<TaggedTemplate>),
    Array(Box<ArrayLit>),
    Object(Box<ObjectLit>),
    Func(Box<FuncExpr>),
    Arrow(Box<ArrowExpr>),
    Unary(Box<UnaryExpr>),
    Update(Box<UpdateExpr>),
    Binary(Box<BinaryExpr>),
    Logical(Box<LogicalExpr>),
    Assign(Box<AssignExpr>),
    Member(Box<MemberExpr>),
    Call(Box<CallExpr>),
    New(Box<NewExpr>),
    Cond(Box<CondExpr>),
    Seq(Box<SeqExpr>),
    Paren(Box<ParenExpr>),
    Await(Box<AwaitExpr>),
    Jsx(Box<JsxElement>),
    JsxFragment(Box<JsxFragment>),
    /// `expr!` — stripped at lowering
    TsNonNull(Box<TsWrapper>),
    /// `expr as T` — stripped at lowering
    TsAs(Box<TsWrapper>),
    /// `expr satisfies T` — stripped at lowering
    TsSatisfies(Box<TsWrapper>),
    /// `import.meta`
    ImportMeta(Span),
    /// `import(specifier)`
    ImportCall(Box<ImportCall>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(e) => e.span,
            Expr::Number(e) => e.span,
            Expr::BigInt(e) => e.span,
            Expr::Str(e) => e.span,
            Expr::Bool(e) => e.span,
            Expr::Null(span) => *span,
            Expr::Regex(e) => e.span,
            Expr::Template(e) => e.span,
            Expr::TaggedTemplate(e) => e.span,
            Expr::Array(e) => e.span,
            Expr::Object(e) => e.span,
            Expr::Func(e) => e.span,
            Expr::Arrow(e) => e.span,
            Expr::Unary(e) => e.span,
            Expr::Update(e) => e.span,
            Expr::Binary(e) => e.span,
            Expr::Logical(e) => e.span,
            Expr::Assign(e) => e.span,
            Expr::Member(e) => e.span,
            Expr::Call(e) => e.span,
            Expr::New(e) => e.span,
            Expr::Cond(e) => e.span,
            Expr::Seq(e) => e.span,
            Expr::Paren(e) => e.span,
            Expr::Await(e) => e.span,
            Expr::Jsx(e) => e.span,
            Expr::JsxFragment(e) => e.span,
            Expr::TsNonNull(e) => e.span,
            Expr::TsAs(e) => e.span,
            Expr::TsSatisfies(e) => e.span,
            Expr::ImportMeta(span) => *span,
            Expr::ImportCall(e) => e.span,
        }
    }

    /// Strip parentheses and TS wrappers.
    pub fn unwrap_tsparen(&self) -> &Expr {
        match self {
            Expr::Paren(p) => p.expr.unwrap_tsparen(),
            Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => w.expr.unwrap_tsparen(),
            other => other,
        }
    }

    /// Bare identifier name, looking through parens/TS wrappers.
    pub fn as_ident_name(&self) -> Option<&str> {
        match self.unwrap_tsparen() {
            Expr::Ident(id) => Some(&id.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: CompactString,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<CompactString>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberLit {
    pub value: f64,
    /// Literal text as written
    pub raw: CompactString,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BigIntLit {
    /// Literal text including the trailing `n`
    pub raw: CompactString,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrLit {
    /// Cooked value (escapes resolved)
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoolLit {
    pub value: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegexLit {
    pub pattern: String,
    pub flags: CompactString,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLit {
    /// Raw quasi text segments; always `exprs.len() + 1` entries
    pub quasis: Vec<TplElement>,
    pub exprs: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TplElement {
    pub raw: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTemplate {
    pub tag: Expr,
    pub quasi: TemplateLit,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayLit {
    /// `None` entries are elisions (`[a, , b]`)
    pub elems: Vec<Option<ArrayElem>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElem {
    pub expr: Expr,
    pub spread: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLit {
    pub props: Vec<ObjectProp>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProp {
    KeyValue {
        key: PropName,
        value: Expr,
        span: Span,
    },
    Shorthand {
        name: Ident,
        span: Span,
    },
    Method {
        key: PropName,
        kind: MethodKind,
        func: Function,
        span: Span,
    },
    Spread {
        expr: Expr,
        span: Span,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MethodKind {
    Method = 0,
    Getter = 1,
    Setter = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub params: Vec<Pattern>,
    pub body: BlockStmt,
    pub is_async: bool,
    pub is_generator: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncExpr {
    pub name: Option<Ident>,
    pub func: Function,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowExpr {
    pub params: Vec<Pattern>,
    pub body: ArrowBody,
    pub is_async: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    Block(BlockStmt),
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub arg: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpr {
    pub op: UpdateOp,
    pub prefix: bool,
    pub arg: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpr {
    pub op: LogicalOp,
    pub left: Expr,
    pub right: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpr {
    pub op: AssignOp,
    pub target: AssignTarget,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpr {
    pub obj: Expr,
    pub prop: MemberProp,
    /// `?.` access
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    Ident(CompactString, Span),
    Computed(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Arg>,
    /// `?.()` call
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub expr: Expr,
    pub spread: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub callee: Expr,
    pub args: Vec<Arg>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CondExpr {
    pub test: Expr,
    pub cons: Expr,
    pub alt: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeqExpr {
    pub exprs: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpr {
    pub arg: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsWrapper {
    pub expr: Expr,
    /// Raw annotation text for `as` / `satisfies`; empty for non-null
    pub annotation: CompactString,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportCall {
    pub arg: Expr,
    pub span: Span,
}

// =============================================================================
// Assignment targets
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    Ident(Ident),
    Member(Box<MemberExpr>),
    Array(Box<ArrayAssignTarget>),
    Object(Box<ObjectAssignTarget>),
}

impl AssignTarget {
    pub fn span(&self) -> Span {
        match self {
            AssignTarget::Ident(t) => t.span,
            AssignTarget::Member(t) => t.span,
            AssignTarget::Array(t) => t.span,
            AssignTarget::Object(t) => t.span,
        }
    }
}

/// `[a, b = d, ...rest] = value`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAssignTarget {
    pub elems: Vec<Option<AssignTargetElem>>,
    pub rest: Option<AssignTarget>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignTargetElem {
    pub target: AssignTarget,
    pub default: Option<Expr>,
}

/// `({ a, b: c = d, ...rest } = value)`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAssignTarget {
    pub props: Vec<ObjectAssignProp>,
    pub rest: Option<AssignTarget>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAssignProp {
    pub key: PropName,
    pub target: AssignTarget,
    pub default: Option<Expr>,
    pub shorthand: bool,
    pub span: Span,
}

// =============================================================================
// Classes
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub super_class: Option<Expr>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassMember {
    pub key: PropName,
    pub kind: ClassMemberKind,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMemberKind {
    Method(Function),
    Getter(Function),
    Setter(Function),
    Field(Option<Expr>),
}

// =============================================================================
// JSX
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    pub name: JsxName,
    pub attrs: Vec<JsxAttr>,
    pub children: Vec<JsxChild>,
    pub self_closing: bool,
    pub span: Span,
}

impl JsxElement {
    /// Uppercase-initial names denote component references.
    pub fn is_component(&self) -> bool {
        match &self.name {
            JsxName::Ident(name, _) => name.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
            JsxName::Member(..) => true,
        }
    }

    /// Find a named attribute.
    pub fn attr(&self, name: &str) -> Option<&JsxNamedAttr> {
        self.attrs.iter().find_map(|a| match a {
            JsxAttr::Named(named) if named.name == name => Some(named),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxName {
    Ident(CompactString, Span),
    /// `A.B.C`
    Member(Vec<CompactString>, Span),
}

impl JsxName {
    pub fn span(&self) -> Span {
        match self {
            JsxName::Ident(_, span) => *span,
            JsxName::Member(_, span) => *span,
        }
    }

    pub fn display(&self) -> String {
        match self {
            JsxName::Ident(name, _) => name.to_string(),
            JsxName::Member(parts, _) => parts.join("."),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttr {
    Named(JsxNamedAttr),
    Spread(JsxSpreadAttr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxNamedAttr {
    pub name: CompactString,
    pub name_span: Span,
    pub value: Option<JsxAttrValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttrValue {
    Str(StrLit),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxSpreadAttr {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    Text(JsxText),
    /// `{expr}`; `expr` is `None` for an empty or comment-only container
    Expr(JsxExprChild),
    Element(Box<JsxElement>),
    Fragment(Box<JsxFragment>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxText {
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxExprChild {
    pub expr: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxFragment {
    pub children: Vec<JsxChild>,
    pub span: Span,
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BinaryOp {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Mod = 4,
    Exp = 5,
    Eq = 6,
    NotEq = 7,
    StrictEq = 8,
    StrictNotEq = 9,
    Lt = 10,
    LtEq = 11,
    Gt = 12,
    GtEq = 13,
    Shl = 14,
    Shr = 15,
    UShr = 16,
    BitAnd = 17,
    BitOr = 18,
    BitXor = 19,
    In = 20,
    InstanceOf = 21,
}

impl BinaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Exp => "**",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LogicalOp {
    And = 0,
    Or = 1,
    Nullish = 2,
}

impl LogicalOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Nullish => "??",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UnaryOp {
    Minus = 0,
    Plus = 1,
    Not = 2,
    BitNot = 3,
    Typeof = 4,
    Void = 5,
    Delete = 6,
}

impl UnaryOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Minus => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof",
            UnaryOp::Void => "void",
            UnaryOp::Delete => "delete",
        }
    }

    /// Keyword operators need a separating space when emitted.
    pub const fn is_keyword(self) -> bool {
        matches!(self, UnaryOp::Typeof | UnaryOp::Void | UnaryOp::Delete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UpdateOp {
    Inc = 0,
    Dec = 1,
}

impl UpdateOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            UpdateOp::Inc => "++",
            UpdateOp::Dec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AssignOp {
    Assign = 0,
    Add = 1,
    Sub = 2,
    Mul = 3,
    Div = 4,
    Mod = 5,
    Exp = 6,
    Shl = 7,
    Shr = 8,
    UShr = 9,
    BitAnd = 10,
    BitOr = 11,
    BitXor = 12,
    And = 13,
    Or = 14,
    Nullish = 15,
}

impl AssignOp {
    pub const fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Exp => "**=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::UShr => ">>>=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::And => "&&=",
            AssignOp::Or => "||=",
            AssignOp::Nullish => "??=",
        }
    }

    /// The binary operator a compound assignment expands to, if any.
    pub const fn to_binary(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
            AssignOp::Exp => Some(BinaryOp::Exp),
            AssignOp::Shl => Some(BinaryOp::Shl),
            AssignOp::Shr => Some(BinaryOp::Shr),
            AssignOp::UShr => Some(BinaryOp::UShr),
            AssignOp::BitAnd => Some(BinaryOp::BitAnd),
            AssignOp::BitOr => Some(BinaryOp::BitOr),
            AssignOp::BitXor => Some(BinaryOp::BitXor),
            _ => None,
        }
    }

    /// The logical operator a logical assignment expands to, if any.
    pub const fn to_logical(self) -> Option<LogicalOp> {
        match self {
            AssignOp::And => Some(LogicalOp::And),
            AssignOp::Or => Some(LogicalOp::Or),
            AssignOp::Nullish => Some(LogicalOp::Nullish),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_names() {
        let pat = Pattern::Object(Box::new(ObjectPat {
            props: vec![ObjectPatProp {
                key: PropName::Ident("a".into(), Span::STUB),
                value: Pattern::Ident(IdentPat {
                    name: "a".into(),
                    span: Span::STUB,
                }),
                shorthand: true,
                span: Span::STUB,
            }],
            rest: Some(Pattern::Ident(IdentPat {
                name: "rest".into(),
                span: Span::STUB,
            })),
            span: Span::STUB,
        }));

        let mut names = Vec::new();
        pat.bound_names(&mut names);
        assert_eq!(names, vec!["a", "rest"]);
    }

    #[test]
    fn test_assign_op_expansion() {
        assert_eq!(AssignOp::Add.to_binary(), Some(BinaryOp::Add));
        assert_eq!(AssignOp::Assign.to_binary(), None);
        assert_eq!(AssignOp::Nullish.to_logical(), Some(LogicalOp::Nullish));
    }

    #[test]
    fn test_unwrap_tsparen() {
        let inner = Expr::Ident(Ident::new("x", Span::STUB));
        let wrapped = Expr::TsNonNull(Box::new(TsWrapper {
            expr: Expr::Paren(Box::new(ParenExpr {
                expr: inner,
                span: Span::STUB,
            })),
            annotation: "".into(),
            span: Span::STUB,
        }));
        assert_eq!(wrapped.as_ident_name(), Some("x"));
    }
}
