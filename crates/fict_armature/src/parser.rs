//! Recursive-descent parser for the Fict surface dialect.
//!
//! Builds the `fict_relief` AST from source text. JSX subtrees are scanned at
//! character level through the lexer cursor; everything else is token driven.
//! TypeScript annotations are consumed and dropped (`as` / `satisfies` /
//! non-null wrappers are preserved as AST nodes and stripped during lowering).

use compact_str::CompactString;
use fict_carton::Span;
use fict_relief::ast::*;

use crate::lexer::{is_ident_part, is_whitespace, Kw, LexError, Lexer, Punct, Token, TokenKind};

/// Parse failure, positioned by byte offset.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub offset: u32,
}

impl ParseError {
    fn new(message: impl Into<String>, offset: u32) -> Self {
        Self {
            message: message.into(),
            offset,
        }
    }
}

impl From<LexError> for ParseError {
    fn from(e: LexError) -> Self {
        Self {
            message: e.message,
            offset: e.offset,
        }
    }
}

type PResult<T> = Result<T, ParseError>;

/// Parse a complete module.
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let mut parser = Parser::new(source)?;
    parser.parse_module()
}

/// Saved parser position for speculative parsing.
struct Checkpoint {
    pos: usize,
    tok: Token,
}

pub struct Parser<'s> {
    lexer: Lexer<'s>,
    tok: Token,
    /// Disallow the `in` operator (for-statement heads)
    no_in: bool,
}

impl<'s> Parser<'s> {
    pub fn new(source: &'s str) -> PResult<Self> {
        let mut lexer = Lexer::new(source);
        let tok = lexer.next_token()?;
        Ok(Self {
            lexer,
            tok,
            no_in: false,
        })
    }

    // -------------------------------------------------------------------------
    // Token plumbing
    // -------------------------------------------------------------------------

    #[inline]
    fn advance(&mut self) -> PResult<()> {
        self.tok = self.lexer.next_token()?;
        Ok(())
    }

    fn save(&self) -> Checkpoint {
        Checkpoint {
            pos: self.lexer.pos(),
            tok: self.tok.clone(),
        }
    }

    fn restore(&mut self, cp: Checkpoint) {
        self.lexer.set_pos(cp.pos);
        self.tok = cp.tok;
    }

    fn peek(&mut self) -> PResult<Token> {
        let cp = self.save();
        self.advance()?;
        let tok = self.tok.clone();
        self.restore(cp);
        Ok(tok)
    }

    fn err<T>(&self, message: impl Into<String>) -> PResult<T> {
        Err(ParseError::new(message, self.tok.span.start))
    }

    fn eat_punct(&mut self, p: Punct) -> PResult<bool> {
        if self.tok.is_punct(p) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_punct(&mut self, p: Punct, what: &str) -> PResult<Span> {
        if self.tok.is_punct(p) {
            let span = self.tok.span;
            self.advance()?;
            Ok(span)
        } else {
            self.err(format!("expected {what}"))
        }
    }

    fn expect_kw(&mut self, kw: Kw) -> PResult<Span> {
        if self.tok.is_kw(kw) {
            let span = self.tok.span;
            self.advance()?;
            Ok(span)
        } else {
            self.err(format!("expected `{}`", kw.as_str()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> PResult<Ident> {
        match &self.tok.kind {
            TokenKind::Ident(name) => {
                let ident = Ident::new(name.clone(), self.tok.span);
                self.advance()?;
                Ok(ident)
            }
            _ => self.err(format!("expected {what}")),
        }
    }

    /// Identifier or keyword usable as a property / import name.
    fn expect_name_like(&mut self, what: &str) -> PResult<(CompactString, Span)> {
        let out = match &self.tok.kind {
            TokenKind::Ident(name) => (name.clone(), self.tok.span),
            TokenKind::Keyword(kw) => (CompactString::new(kw.as_str()), self.tok.span),
            _ => return self.err(format!("expected {what}")),
        };
        self.advance()?;
        Ok(out)
    }

    /// Consume a statement terminator: `;`, or accept an inserted one before
    /// a newline, `}`, or end of input.
    fn semicolon(&mut self) -> PResult<()> {
        if self.tok.is_punct(Punct::Semi) {
            self.advance()?;
            return Ok(());
        }
        if self.tok.newline_before || self.tok.is_punct(Punct::RBrace) || self.tok.is_eof() {
            return Ok(());
        }
        self.err("expected semicolon")
    }

    // -------------------------------------------------------------------------
    // Module and statements
    // -------------------------------------------------------------------------

    pub fn parse_module(&mut self) -> PResult<Module> {
        let start = self.tok.span.start;
        let mut body = Vec::new();
        while !self.tok.is_eof() {
            body.push(self.parse_stmt()?);
        }
        Ok(Module {
            body,
            span: Span::new(start, self.tok.span.end),
        })
    }

    fn parse_stmt(&mut self) -> PResult<Stmt> {
        match &self.tok.kind {
            TokenKind::Keyword(Kw::Import) => {
                let next = self.peek()?;
                if next.is_punct(Punct::LParen) || next.is_punct(Punct::Dot) {
                    self.parse_expr_stmt()
                } else {
                    self.parse_import()
                }
            }
            TokenKind::Keyword(Kw::Export) => self.parse_export(),
            TokenKind::Keyword(Kw::Var | Kw::Let | Kw::Const) => {
                let decl = self.parse_var_decl()?;
                self.semicolon()?;
                Ok(Stmt::VarDecl(decl))
            }
            TokenKind::Keyword(Kw::Function) => {
                let decl = self.parse_func_decl(false)?;
                Ok(Stmt::Func(Box::new(decl)))
            }
            TokenKind::Keyword(Kw::Class) => {
                let decl = self.parse_class_decl()?;
                Ok(Stmt::Class(Box::new(decl)))
            }
            TokenKind::Keyword(Kw::If) => self.parse_if(),
            TokenKind::Keyword(Kw::Switch) => self.parse_switch(),
            TokenKind::Keyword(Kw::While) => self.parse_while(),
            TokenKind::Keyword(Kw::Do) => self.parse_do_while(),
            TokenKind::Keyword(Kw::For) => self.parse_for(),
            TokenKind::Keyword(Kw::Return) => self.parse_return(),
            TokenKind::Keyword(Kw::Break) => {
                let start = self.tok.span.start;
                self.advance()?;
                let label = self.optional_label()?;
                let end = label.as_ref().map_or(start + 5, |l| l.span.end);
                self.semicolon()?;
                Ok(Stmt::Break(BreakStmt {
                    label,
                    span: Span::new(start, end),
                }))
            }
            TokenKind::Keyword(Kw::Continue) => {
                let start = self.tok.span.start;
                self.advance()?;
                let label = self.optional_label()?;
                let end = label.as_ref().map_or(start + 8, |l| l.span.end);
                self.semicolon()?;
                Ok(Stmt::Continue(ContinueStmt {
                    label,
                    span: Span::new(start, end),
                }))
            }
            TokenKind::Keyword(Kw::Throw) => {
                let start = self.tok.span.start;
                self.advance()?;
                let arg = self.parse_expr()?;
                let span = Span::new(start, arg.span().end);
                self.semicolon()?;
                Ok(Stmt::Throw(ThrowStmt { arg, span }))
            }
            TokenKind::Keyword(Kw::Try) => self.parse_try(),
            TokenKind::Keyword(Kw::Debugger) => {
                let span = self.tok.span;
                self.advance()?;
                self.semicolon()?;
                Ok(Stmt::Debugger(span))
            }
            TokenKind::Punct(Punct::LBrace) => {
                let block = self.parse_block()?;
                Ok(Stmt::Block(block))
            }
            TokenKind::Punct(Punct::Semi) => {
                let span = self.tok.span;
                self.advance()?;
                Ok(Stmt::Empty(span))
            }
            TokenKind::Ident(name) if name == "async" => {
                let next = self.peek()?;
                if next.is_kw(Kw::Function) && !next.newline_before {
                    self.advance()?;
                    let decl = self.parse_func_decl(true)?;
                    return Ok(Stmt::Func(Box::new(decl)));
                }
                self.parse_labeled_or_expr()
            }
            TokenKind::Ident(name) if name == "interface" => {
                let next = self.peek()?;
                if matches!(next.kind, TokenKind::Ident(_)) {
                    return self.skip_interface_decl();
                }
                self.parse_labeled_or_expr()
            }
            TokenKind::Ident(name) if name == "type" => {
                let next = self.peek()?;
                if matches!(next.kind, TokenKind::Ident(_)) {
                    return self.skip_type_alias_decl();
                }
                self.parse_labeled_or_expr()
            }
            TokenKind::Ident(_) => self.parse_labeled_or_expr(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn optional_label(&mut self) -> PResult<Option<Ident>> {
        if self.tok.newline_before {
            return Ok(None);
        }
        if let TokenKind::Ident(name) = &self.tok.kind {
            let ident = Ident::new(name.clone(), self.tok.span);
            self.advance()?;
            return Ok(Some(ident));
        }
        Ok(None)
    }

    fn parse_labeled_or_expr(&mut self) -> PResult<Stmt> {
        if let TokenKind::Ident(name) = &self.tok.kind {
            let name = name.clone();
            let label_span = self.tok.span;
            let next = self.peek()?;
            if next.is_punct(Punct::Colon) {
                let label = Ident::new(name, label_span);
                self.advance()?; // label
                self.advance()?; // :
                let body = self.parse_stmt()?;
                let span = Span::new(label_span.start, body.span().end);
                return Ok(Stmt::Labeled(Box::new(LabeledStmt { label, body, span })));
            }
        }
        self.parse_expr_stmt()
    }

    fn parse_expr_stmt(&mut self) -> PResult<Stmt> {
        let expr = self.parse_expr()?;
        let span = expr.span();
        self.semicolon()?;
        Ok(Stmt::Expr(ExprStmt { expr, span }))
    }

    /// Skip a TS `interface X … { … }` declaration.
    fn skip_interface_decl(&mut self) -> PResult<Stmt> {
        let span = self.tok.span;
        self.advance()?; // interface
        self.advance()?; // name
        if self.tok.is_punct(Punct::Lt) {
            self.skip_angle_brackets()?;
        }
        while !self.tok.is_punct(Punct::LBrace) && !self.tok.is_eof() {
            self.advance()?;
        }
        self.skip_balanced(Punct::LBrace, Punct::RBrace)?;
        Ok(Stmt::Empty(span))
    }

    /// Skip a TS `type X = …;` alias.
    fn skip_type_alias_decl(&mut self) -> PResult<Stmt> {
        let span = self.tok.span;
        self.advance()?; // type
        self.advance()?; // name
        if self.tok.is_punct(Punct::Lt) {
            self.skip_angle_brackets()?;
        }
        self.expect_punct(Punct::Assign, "`=`")?;
        self.skip_type()?;
        self.semicolon()?;
        Ok(Stmt::Empty(span))
    }

    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------

    fn parse_var_decl(&mut self) -> PResult<VarDecl> {
        let start = self.tok.span.start;
        let kind = match self.tok.kind {
            TokenKind::Keyword(Kw::Var) => VarKind::Var,
            TokenKind::Keyword(Kw::Let) => VarKind::Let,
            TokenKind::Keyword(Kw::Const) => VarKind::Const,
            _ => return self.err("expected variable declaration"),
        };
        self.advance()?;

        let mut decls = Vec::new();
        loop {
            let pat_start = self.tok.span.start;
            let pat = self.parse_binding_pattern()?;
            if self.eat_punct(Punct::Not)? {
                // definite-assignment assertion `let x!: T`
            }
            if self.tok.is_punct(Punct::Colon) {
                self.advance()?;
                self.skip_type()?;
            }
            let init = if self.eat_punct(Punct::Assign)? {
                Some(self.parse_assign_expr()?)
            } else {
                None
            };
            let end = init
                .as_ref()
                .map_or_else(|| pat.span().end, |e| e.span().end);
            decls.push(Declarator {
                pat,
                init,
                span: Span::new(pat_start, end),
            });
            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }

        let end = decls.last().map_or(start, |d| d.span.end);
        Ok(VarDecl {
            kind,
            decls,
            span: Span::new(start, end),
        })
    }

    fn parse_func_decl(&mut self, is_async: bool) -> PResult<FuncDecl> {
        let start = self.tok.span.start;
        self.expect_kw(Kw::Function)?;
        let is_generator = self.eat_punct(Punct::Star)?;
        let name = self.expect_ident("function name")?;
        let func = self.parse_function_tail(start, is_async, is_generator)?;
        let span = func.span;
        Ok(FuncDecl { name, func, span })
    }

    /// Params, optional return type, and body. `start` is the span start of
    /// the surrounding function construct.
    fn parse_function_tail(
        &mut self,
        start: u32,
        is_async: bool,
        is_generator: bool,
    ) -> PResult<Function> {
        if self.tok.is_punct(Punct::Lt) {
            self.skip_angle_brackets()?;
        }
        let params = self.parse_params()?;
        if self.tok.is_punct(Punct::Colon) {
            self.advance()?;
            self.skip_type()?;
        }
        let body = self.parse_block()?;
        let span = Span::new(start, body.span.end);
        Ok(Function {
            params,
            body,
            is_async,
            is_generator,
            span,
        })
    }

    fn parse_params(&mut self) -> PResult<Vec<Pattern>> {
        self.expect_punct(Punct::LParen, "`(`")?;
        let mut params = Vec::new();
        while !self.tok.is_punct(Punct::RParen) {
            params.push(self.parse_param()?);
            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }
        self.expect_punct(Punct::RParen, "`)`")?;
        Ok(params)
    }

    fn parse_param(&mut self) -> PResult<Pattern> {
        let start = self.tok.span.start;
        if self.tok.is_punct(Punct::DotDotDot) {
            self.advance()?;
            let arg = self.parse_param()?;
            let span = Span::new(start, arg.span().end);
            return Ok(Pattern::Rest(Box::new(RestPat { arg, span })));
        }
        let pat = self.parse_binding_pattern()?;
        // optional marker `a?`
        if self.tok.is_punct(Punct::Question) {
            self.advance()?;
        }
        if self.tok.is_punct(Punct::Colon) {
            self.advance()?;
            self.skip_type()?;
        }
        if self.eat_punct(Punct::Assign)? {
            let default = self.parse_assign_expr()?;
            let span = Span::new(start, default.span().end);
            return Ok(Pattern::Assign(Box::new(AssignPat {
                target: pat,
                default,
                span,
            })));
        }
        Ok(pat)
    }

    fn parse_binding_pattern(&mut self) -> PResult<Pattern> {
        match &self.tok.kind {
            TokenKind::Ident(name) => {
                let pat = Pattern::Ident(IdentPat {
                    name: name.clone(),
                    span: self.tok.span,
                });
                self.advance()?;
                Ok(pat)
            }
            TokenKind::Punct(Punct::LBrace) => self.parse_object_pattern(),
            TokenKind::Punct(Punct::LBracket) => self.parse_array_pattern(),
            _ => self.err("expected binding pattern"),
        }
    }

    fn parse_object_pattern(&mut self) -> PResult<Pattern> {
        let start = self.expect_punct(Punct::LBrace, "`{`")?.start;
        let mut props = Vec::new();
        let mut rest = None;

        while !self.tok.is_punct(Punct::RBrace) {
            if self.tok.is_punct(Punct::DotDotDot) {
                self.advance()?;
                rest = Some(self.parse_binding_pattern()?);
                break;
            }
            let prop_start = self.tok.span.start;
            let key = self.parse_prop_name()?;
            let (value, shorthand) = if self.eat_punct(Punct::Colon)? {
                (self.parse_binding_pattern()?, false)
            } else {
                let name = match key.static_name() {
                    Some(name) => CompactString::new(name),
                    None => return self.err("invalid shorthand pattern"),
                };
                (
                    Pattern::Ident(IdentPat {
                        name,
                        span: key.span(),
                    }),
                    true,
                )
            };
            let value = if self.eat_punct(Punct::Assign)? {
                let default = self.parse_assign_expr()?;
                let span = Span::new(value.span().start, default.span().end);
                Pattern::Assign(Box::new(AssignPat {
                    target: value,
                    default,
                    span,
                }))
            } else {
                value
            };
            let span = Span::new(prop_start, value.span().end);
            props.push(ObjectPatProp {
                key,
                value,
                shorthand,
                span,
            });
            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }

        let end = self.expect_punct(Punct::RBrace, "`}`")?.end;
        Ok(Pattern::Object(Box::new(ObjectPat {
            props,
            rest,
            span: Span::new(start, end),
        })))
    }

    fn parse_array_pattern(&mut self) -> PResult<Pattern> {
        let start = self.expect_punct(Punct::LBracket, "`[`")?.start;
        let mut elems = Vec::new();

        while !self.tok.is_punct(Punct::RBracket) {
            if self.tok.is_punct(Punct::Comma) {
                elems.push(None);
                self.advance()?;
                continue;
            }
            if self.tok.is_punct(Punct::DotDotDot) {
                let rest_start = self.tok.span.start;
                self.advance()?;
                let arg = self.parse_binding_pattern()?;
                let span = Span::new(rest_start, arg.span().end);
                elems.push(Some(Pattern::Rest(Box::new(RestPat { arg, span }))));
                break;
            }
            let pat = self.parse_binding_pattern()?;
            let pat = if self.eat_punct(Punct::Assign)? {
                let default = self.parse_assign_expr()?;
                let span = Span::new(pat.span().start, default.span().end);
                Pattern::Assign(Box::new(AssignPat {
                    target: pat,
                    default,
                    span,
                }))
            } else {
                pat
            };
            elems.push(Some(pat));
            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }

        let end = self.expect_punct(Punct::RBracket, "`]`")?.end;
        Ok(Pattern::Array(Box::new(ArrayPat {
            elems,
            span: Span::new(start, end),
        })))
    }

    fn parse_prop_name(&mut self) -> PResult<PropName> {
        match &self.tok.kind {
            TokenKind::Ident(name) => {
                let out = PropName::Ident(name.clone(), self.tok.span);
                self.advance()?;
                Ok(out)
            }
            TokenKind::Keyword(kw) => {
                let out = PropName::Ident(CompactString::new(kw.as_str()), self.tok.span);
                self.advance()?;
                Ok(out)
            }
            TokenKind::Str { value } => {
                let out = PropName::Str(StrLit {
                    value: value.clone(),
                    span: self.tok.span,
                });
                self.advance()?;
                Ok(out)
            }
            TokenKind::Number { value, raw } => {
                let out = PropName::Num(NumberLit {
                    value: *value,
                    raw: raw.clone(),
                    span: self.tok.span,
                });
                self.advance()?;
                Ok(out)
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.advance()?;
                let expr = self.parse_assign_expr()?;
                self.expect_punct(Punct::RBracket, "`]`")?;
                Ok(PropName::Computed(Box::new(expr)))
            }
            _ => self.err("expected property name"),
        }
    }

    fn parse_class_decl(&mut self) -> PResult<ClassDecl> {
        let start = self.expect_kw(Kw::Class)?.start;
        let name = self.expect_ident("class name")?;
        let class = self.parse_class_tail(start)?;
        let span = class.span;
        Ok(ClassDecl { name, class, span })
    }

    fn parse_class_tail(&mut self, start: u32) -> PResult<Class> {
        if self.tok.is_punct(Punct::Lt) {
            self.skip_angle_brackets()?;
        }
        let super_class = if self.tok.is_kw(Kw::Extends) {
            self.advance()?;
            Some(self.parse_unary_expr()?)
        } else {
            None
        };
        self.expect_punct(Punct::LBrace, "`{`")?;

        let mut members = Vec::new();
        while !self.tok.is_punct(Punct::RBrace) {
            if self.eat_punct(Punct::Semi)? {
                continue;
            }
            members.push(self.parse_class_member()?);
        }
        let end = self.expect_punct(Punct::RBrace, "`}`")?.end;

        Ok(Class {
            super_class,
            members,
            span: Span::new(start, end),
        })
    }

    fn parse_class_member(&mut self) -> PResult<ClassMember> {
        let start = self.tok.span.start;
        let mut is_static = false;
        if self.tok.is_ident("static") && !self.peek()?.is_punct(Punct::LParen) {
            is_static = true;
            self.advance()?;
        }

        let mut is_async = false;
        if self.tok.is_ident("async") {
            let next = self.peek()?;
            if !next.is_punct(Punct::LParen) && !next.is_punct(Punct::Assign) {
                is_async = true;
                self.advance()?;
            }
        }

        let mut accessor = None;
        if (self.tok.is_ident("get") || self.tok.is_ident("set"))
            && !self.peek()?.is_punct(Punct::LParen)
            && !self.peek()?.is_punct(Punct::Assign)
        {
            accessor = Some(self.tok.is_ident("get"));
            self.advance()?;
        }

        let is_generator = self.eat_punct(Punct::Star)?;
        let key = self.parse_prop_name()?;

        if self.tok.is_punct(Punct::LParen) || self.tok.is_punct(Punct::Lt) {
            let func = self.parse_function_tail(start, is_async, is_generator)?;
            let span = Span::new(start, func.span.end);
            let kind = match accessor {
                Some(true) => ClassMemberKind::Getter(func),
                Some(false) => ClassMemberKind::Setter(func),
                None => ClassMemberKind::Method(func),
            };
            return Ok(ClassMember {
                key,
                kind,
                is_static,
                span,
            });
        }

        // field
        if self.tok.is_punct(Punct::Question) || self.tok.is_punct(Punct::Not) {
            self.advance()?;
        }
        if self.tok.is_punct(Punct::Colon) {
            self.advance()?;
            self.skip_type()?;
        }
        let value = if self.eat_punct(Punct::Assign)? {
            Some(self.parse_assign_expr()?)
        } else {
            None
        };
        let end = value.as_ref().map_or(key.span().end, |v| v.span().end);
        self.semicolon()?;
        Ok(ClassMember {
            key,
            kind: ClassMemberKind::Field(value),
            is_static,
            span: Span::new(start, end),
        })
    }

    // -------------------------------------------------------------------------
    // Imports / exports
    // -------------------------------------------------------------------------

    fn parse_import(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::Import)?.start;

        // `import "module"`
        if let TokenKind::Str { value } = &self.tok.kind {
            let source = StrLit {
                value: value.clone(),
                span: self.tok.span,
            };
            let end = self.tok.span.end;
            self.advance()?;
            self.semicolon()?;
            return Ok(Stmt::Import(ImportDecl {
                default: None,
                namespace: None,
                named: Vec::new(),
                source,
                type_only: false,
                span: Span::new(start, end),
            }));
        }

        let mut type_only = false;
        if self.tok.is_ident("type") {
            let next = self.peek()?;
            if !next.is_ident("from") && !next.is_punct(Punct::Comma) {
                type_only = true;
                self.advance()?;
            }
        }

        let mut default = None;
        let mut namespace = None;
        let mut named = Vec::new();

        if let TokenKind::Ident(name) = &self.tok.kind {
            default = Some(Ident::new(name.clone(), self.tok.span));
            self.advance()?;
            if self.tok.is_punct(Punct::Comma) {
                self.advance()?;
            }
        }

        if self.tok.is_punct(Punct::Star) {
            self.advance()?;
            if !self.tok.is_ident("as") {
                return self.err("expected `as` after `*`");
            }
            self.advance()?;
            namespace = Some(self.expect_ident("namespace name")?);
        } else if self.tok.is_punct(Punct::LBrace) {
            self.advance()?;
            while !self.tok.is_punct(Punct::RBrace) {
                // inline `type` specifier
                if self.tok.is_ident("type") {
                    let next = self.peek()?;
                    if !next.is_punct(Punct::Comma)
                        && !next.is_punct(Punct::RBrace)
                        && !next.is_ident("as")
                    {
                        self.advance()?;
                    }
                }
                let spec_start = self.tok.span.start;
                let (imported, imported_span) = self.expect_name_like("import specifier")?;
                let local = if self.tok.is_ident("as") {
                    self.advance()?;
                    self.expect_ident("local name")?
                } else {
                    Ident::new(imported.clone(), imported_span)
                };
                let end = local.span.end;
                named.push(ImportSpecifier {
                    imported,
                    local,
                    span: Span::new(spec_start, end),
                });
                if !self.eat_punct(Punct::Comma)? {
                    break;
                }
            }
            self.expect_punct(Punct::RBrace, "`}`")?;
        }

        if !self.tok.is_ident("from") {
            return self.err("expected `from`");
        }
        self.advance()?;
        let source = match &self.tok.kind {
            TokenKind::Str { value } => StrLit {
                value: value.clone(),
                span: self.tok.span,
            },
            _ => return self.err("expected module specifier string"),
        };
        let end = self.tok.span.end;
        self.advance()?;
        self.semicolon()?;

        Ok(Stmt::Import(ImportDecl {
            default,
            namespace,
            named,
            source,
            type_only,
            span: Span::new(start, end),
        }))
    }

    fn parse_export(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::Export)?.start;

        if self.tok.is_kw(Kw::Default) {
            self.advance()?;
            let expr = if self.tok.is_kw(Kw::Function) {
                let decl = self.parse_func_decl(false)?;
                Expr::Func(Box::new(FuncExpr {
                    name: Some(decl.name),
                    func: decl.func,
                    span: decl.span,
                }))
            } else if self.tok.is_ident("async") && self.peek()?.is_kw(Kw::Function) {
                self.advance()?;
                let decl = self.parse_func_decl(true)?;
                Expr::Func(Box::new(FuncExpr {
                    name: Some(decl.name),
                    func: decl.func,
                    span: decl.span,
                }))
            } else {
                let e = self.parse_assign_expr()?;
                self.semicolon()?;
                e
            };
            let span = Span::new(start, expr.span().end);
            return Ok(Stmt::ExportDefault(Box::new(ExportDefaultDecl {
                expr,
                span,
            })));
        }

        // `export type …` / `export interface …` are type-only: skip
        if self.tok.is_ident("type") {
            let next = self.peek()?;
            if matches!(next.kind, TokenKind::Ident(_)) {
                return self.skip_type_alias_decl();
            }
            if next.is_punct(Punct::LBrace) {
                // `export type { … }`
                self.advance()?;
                self.skip_balanced(Punct::LBrace, Punct::RBrace)?;
                if self.tok.is_ident("from") {
                    self.advance()?;
                    self.advance()?;
                }
                self.semicolon()?;
                return Ok(Stmt::Empty(Span::new(start, start)));
            }
        }
        if self.tok.is_ident("interface") {
            return self.skip_interface_decl();
        }

        if self.tok.is_punct(Punct::Star) {
            self.advance()?;
            let mut exported = CompactString::new("*");
            if self.tok.is_ident("as") {
                self.advance()?;
                exported = self.expect_ident("export alias")?.name;
            }
            if !self.tok.is_ident("from") {
                return self.err("expected `from`");
            }
            self.advance()?;
            let source = match &self.tok.kind {
                TokenKind::Str { value } => StrLit {
                    value: value.clone(),
                    span: self.tok.span,
                },
                _ => return self.err("expected module specifier string"),
            };
            let end = self.tok.span.end;
            self.advance()?;
            self.semicolon()?;
            return Ok(Stmt::ExportNamed(Box::new(ExportNamedDecl {
                decl: None,
                specifiers: vec![ExportSpecifier {
                    local: CompactString::new("*"),
                    exported,
                    span: Span::new(start, end),
                }],
                source: Some(source),
                span: Span::new(start, end),
            })));
        }

        if self.tok.is_punct(Punct::LBrace) {
            self.advance()?;
            let mut specifiers = Vec::new();
            while !self.tok.is_punct(Punct::RBrace) {
                let spec_start = self.tok.span.start;
                let (local, local_span) = self.expect_name_like("export specifier")?;
                let exported = if self.tok.is_ident("as") {
                    self.advance()?;
                    self.expect_name_like("export alias")?.0
                } else {
                    local.clone()
                };
                specifiers.push(ExportSpecifier {
                    local,
                    exported,
                    span: Span::new(spec_start, local_span.end),
                });
                if !self.eat_punct(Punct::Comma)? {
                    break;
                }
            }
            let mut end = self.expect_punct(Punct::RBrace, "`}`")?.end;
            let source = if self.tok.is_ident("from") {
                self.advance()?;
                match &self.tok.kind {
                    TokenKind::Str { value } => {
                        let lit = StrLit {
                            value: value.clone(),
                            span: self.tok.span,
                        };
                        end = self.tok.span.end;
                        self.advance()?;
                        Some(lit)
                    }
                    _ => return self.err("expected module specifier string"),
                }
            } else {
                None
            };
            self.semicolon()?;
            return Ok(Stmt::ExportNamed(Box::new(ExportNamedDecl {
                decl: None,
                specifiers,
                source,
                span: Span::new(start, end),
            })));
        }

        // `export <declaration>`
        let decl = self.parse_stmt()?;
        let span = Span::new(start, decl.span().end);
        Ok(Stmt::ExportNamed(Box::new(ExportNamedDecl {
            decl: Some(decl),
            specifiers: Vec::new(),
            source: None,
            span,
        })))
    }

    // -------------------------------------------------------------------------
    // Control flow statements
    // -------------------------------------------------------------------------

    fn parse_block(&mut self) -> PResult<BlockStmt> {
        let start = self.expect_punct(Punct::LBrace, "`{`")?.start;
        let mut stmts = Vec::new();
        while !self.tok.is_punct(Punct::RBrace) {
            if self.tok.is_eof() {
                return self.err("unexpected end of input in block");
            }
            stmts.push(self.parse_stmt()?);
        }
        let end = self.expect_punct(Punct::RBrace, "`}`")?.end;
        Ok(BlockStmt {
            stmts,
            span: Span::new(start, end),
        })
    }

    fn parse_if(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::If)?.start;
        self.expect_punct(Punct::LParen, "`(`")?;
        let test = self.parse_expr()?;
        self.expect_punct(Punct::RParen, "`)`")?;
        let cons = self.parse_stmt()?;
        let alt = if self.tok.is_kw(Kw::Else) {
            self.advance()?;
            Some(self.parse_stmt()?)
        } else {
            None
        };
        let end = alt.as_ref().map_or_else(|| cons.span().end, |a| a.span().end);
        Ok(Stmt::If(Box::new(IfStmt {
            test,
            cons,
            alt,
            span: Span::new(start, end),
        })))
    }

    fn parse_switch(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::Switch)?.start;
        self.expect_punct(Punct::LParen, "`(`")?;
        let disc = self.parse_expr()?;
        self.expect_punct(Punct::RParen, "`)`")?;
        self.expect_punct(Punct::LBrace, "`{`")?;

        let mut cases = Vec::new();
        while !self.tok.is_punct(Punct::RBrace) {
            let case_start = self.tok.span.start;
            let test = if self.tok.is_kw(Kw::Case) {
                self.advance()?;
                let e = self.parse_expr()?;
                Some(e)
            } else if self.tok.is_kw(Kw::Default) {
                self.advance()?;
                None
            } else {
                return self.err("expected `case` or `default`");
            };
            self.expect_punct(Punct::Colon, "`:`")?;
            let mut body = Vec::new();
            while !self.tok.is_punct(Punct::RBrace)
                && !self.tok.is_kw(Kw::Case)
                && !self.tok.is_kw(Kw::Default)
            {
                body.push(self.parse_stmt()?);
            }
            let end = body.last().map_or(case_start, |s| s.span().end);
            cases.push(SwitchCase {
                test,
                body,
                span: Span::new(case_start, end),
            });
        }
        let end = self.expect_punct(Punct::RBrace, "`}`")?.end;
        Ok(Stmt::Switch(Box::new(SwitchStmt {
            disc,
            cases,
            span: Span::new(start, end),
        })))
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::While)?.start;
        self.expect_punct(Punct::LParen, "`(`")?;
        let test = self.parse_expr()?;
        self.expect_punct(Punct::RParen, "`)`")?;
        let body = self.parse_stmt()?;
        let end = body.span().end;
        Ok(Stmt::While(Box::new(WhileStmt {
            test,
            body,
            span: Span::new(start, end),
        })))
    }

    fn parse_do_while(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::Do)?.start;
        let body = self.parse_stmt()?;
        self.expect_kw(Kw::While)?;
        self.expect_punct(Punct::LParen, "`(`")?;
        let test = self.parse_expr()?;
        let end = self.expect_punct(Punct::RParen, "`)`")?.end;
        self.semicolon()?;
        Ok(Stmt::DoWhile(Box::new(DoWhileStmt {
            body,
            test,
            span: Span::new(start, end),
        })))
    }

    fn parse_for(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::For)?.start;
        let is_await = if self.tok.is_kw(Kw::Await) {
            self.advance()?;
            true
        } else {
            false
        };
        self.expect_punct(Punct::LParen, "`(`")?;

        // for-in / for-of with a declaration head
        if matches!(
            self.tok.kind,
            TokenKind::Keyword(Kw::Var | Kw::Let | Kw::Const)
        ) {
            let kind = match self.tok.kind {
                TokenKind::Keyword(Kw::Var) => VarKind::Var,
                TokenKind::Keyword(Kw::Let) => VarKind::Let,
                _ => VarKind::Const,
            };
            let cp = self.save();
            self.advance()?;
            let pat = self.parse_binding_pattern()?;
            if self.tok.is_kw(Kw::In) {
                self.advance()?;
                let object = self.parse_expr()?;
                self.expect_punct(Punct::RParen, "`)`")?;
                let body = self.parse_stmt()?;
                let end = body.span().end;
                return Ok(Stmt::ForIn(Box::new(ForInStmt {
                    left: ForHead::VarDecl(kind, pat),
                    object,
                    body,
                    span: Span::new(start, end),
                })));
            }
            if self.tok.is_ident("of") {
                self.advance()?;
                let iterable = self.parse_assign_expr()?;
                self.expect_punct(Punct::RParen, "`)`")?;
                let body = self.parse_stmt()?;
                let end = body.span().end;
                return Ok(Stmt::ForOf(Box::new(ForOfStmt {
                    left: ForHead::VarDecl(kind, pat),
                    iterable,
                    body,
                    is_await,
                    span: Span::new(start, end),
                })));
            }
            // plain C-style for with declarations
            self.restore(cp);
            self.no_in = true;
            let init = self.parse_var_decl()?;
            self.no_in = false;
            self.expect_punct(Punct::Semi, "`;`")?;
            return self.parse_for_tail(start, Some(ForInit::VarDecl(init)));
        }

        if self.tok.is_punct(Punct::Semi) {
            self.advance()?;
            return self.parse_for_tail(start, None);
        }

        // expression head: could still be for-in / for-of
        self.no_in = true;
        let head = self.parse_expr()?;
        self.no_in = false;
        if self.tok.is_kw(Kw::In) {
            self.advance()?;
            let left = ForHead::Pattern(self.expr_to_pattern(head)?);
            let object = self.parse_expr()?;
            self.expect_punct(Punct::RParen, "`)`")?;
            let body = self.parse_stmt()?;
            let end = body.span().end;
            return Ok(Stmt::ForIn(Box::new(ForInStmt {
                left,
                object,
                body,
                span: Span::new(start, end),
            })));
        }
        if self.tok.is_ident("of") {
            self.advance()?;
            let left = ForHead::Pattern(self.expr_to_pattern(head)?);
            let iterable = self.parse_assign_expr()?;
            self.expect_punct(Punct::RParen, "`)`")?;
            let body = self.parse_stmt()?;
            let end = body.span().end;
            return Ok(Stmt::ForOf(Box::new(ForOfStmt {
                left,
                iterable,
                body,
                is_await,
                span: Span::new(start, end),
            })));
        }
        self.expect_punct(Punct::Semi, "`;`")?;
        self.parse_for_tail(start, Some(ForInit::Expr(head)))
    }

    fn parse_for_tail(&mut self, start: u32, init: Option<ForInit>) -> PResult<Stmt> {
        let test = if self.tok.is_punct(Punct::Semi) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_punct(Punct::Semi, "`;`")?;
        let update = if self.tok.is_punct(Punct::RParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect_punct(Punct::RParen, "`)`")?;
        let body = self.parse_stmt()?;
        let end = body.span().end;
        Ok(Stmt::For(Box::new(ForStmt {
            init,
            test,
            update,
            body,
            span: Span::new(start, end),
        })))
    }

    fn parse_return(&mut self) -> PResult<Stmt> {
        let span = self.expect_kw(Kw::Return)?;
        let arg = if self.tok.is_punct(Punct::Semi)
            || self.tok.is_punct(Punct::RBrace)
            || self.tok.is_eof()
            || self.tok.newline_before
        {
            None
        } else {
            Some(self.parse_expr()?)
        };
        let end = arg.as_ref().map_or(span.end, |a| a.span().end);
        self.semicolon()?;
        Ok(Stmt::Return(ReturnStmt {
            arg,
            span: Span::new(span.start, end),
        }))
    }

    fn parse_try(&mut self) -> PResult<Stmt> {
        let start = self.expect_kw(Kw::Try)?.start;
        let block = self.parse_block()?;
        let handler = if self.tok.is_kw(Kw::Catch) {
            let catch_start = self.tok.span.start;
            self.advance()?;
            let param = if self.eat_punct(Punct::LParen)? {
                let pat = self.parse_binding_pattern()?;
                if self.tok.is_punct(Punct::Colon) {
                    self.advance()?;
                    self.skip_type()?;
                }
                self.expect_punct(Punct::RParen, "`)`")?;
                Some(pat)
            } else {
                None
            };
            let body = self.parse_block()?;
            let span = Span::new(catch_start, body.span.end);
            Some(CatchClause { param, body, span })
        } else {
            None
        };
        let finalizer = if self.tok.is_kw(Kw::Finally) {
            self.advance()?;
            Some(self.parse_block()?)
        } else {
            None
        };
        let end = finalizer
            .as_ref()
            .map(|f| f.span.end)
            .or_else(|| handler.as_ref().map(|h| h.span.end))
            .unwrap_or(block.span.end);
        Ok(Stmt::Try(Box::new(TryStmt {
            block,
            handler,
            finalizer,
            span: Span::new(start, end),
        })))
    }

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------

    /// Comma-sequence expression.
    fn parse_expr(&mut self) -> PResult<Expr> {
        let first = self.parse_assign_expr()?;
        if !self.tok.is_punct(Punct::Comma) {
            return Ok(first);
        }
        let start = first.span().start;
        let mut exprs = vec![first];
        while self.eat_punct(Punct::Comma)? {
            exprs.push(self.parse_assign_expr()?);
        }
        let end = exprs.last().unwrap().span().end;
        Ok(Expr::Seq(Box::new(SeqExpr {
            exprs,
            span: Span::new(start, end),
        })))
    }

    pub fn parse_assign_expr(&mut self) -> PResult<Expr> {
        // arrow function forms
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }

        let left = self.parse_cond_expr()?;

        let op = match self.tok.kind {
            TokenKind::Punct(Punct::Assign) => Some(AssignOp::Assign),
            TokenKind::Punct(Punct::PlusEq) => Some(AssignOp::Add),
            TokenKind::Punct(Punct::MinusEq) => Some(AssignOp::Sub),
            TokenKind::Punct(Punct::StarEq) => Some(AssignOp::Mul),
            TokenKind::Punct(Punct::SlashEq) => Some(AssignOp::Div),
            TokenKind::Punct(Punct::PercentEq) => Some(AssignOp::Mod),
            TokenKind::Punct(Punct::StarStarEq) => Some(AssignOp::Exp),
            TokenKind::Punct(Punct::LtLtEq) => Some(AssignOp::Shl),
            TokenKind::Punct(Punct::GtGtEq) => Some(AssignOp::Shr),
            TokenKind::Punct(Punct::GtGtGtEq) => Some(AssignOp::UShr),
            TokenKind::Punct(Punct::AmpEq) => Some(AssignOp::BitAnd),
            TokenKind::Punct(Punct::PipeEq) => Some(AssignOp::BitOr),
            TokenKind::Punct(Punct::CaretEq) => Some(AssignOp::BitXor),
            TokenKind::Punct(Punct::AmpAmpEq) => Some(AssignOp::And),
            TokenKind::Punct(Punct::PipePipeEq) => Some(AssignOp::Or),
            TokenKind::Punct(Punct::QuestionQuestionEq) => Some(AssignOp::Nullish),
            _ => None,
        };

        let Some(op) = op else { return Ok(left) };
        self.advance()?;
        let target = self.expr_to_assign_target(left)?;
        let value = self.parse_assign_expr()?;
        let span = Span::new(target.span().start, value.span().end);
        Ok(Expr::Assign(Box::new(AssignExpr {
            op,
            target,
            value,
            span,
        })))
    }

    /// Detect and parse arrow functions: `x => …`, `(a, b) => …`,
    /// `async x => …`, `async (a) => …`.
    fn try_parse_arrow(&mut self) -> PResult<Option<Expr>> {
        let start = self.tok.span.start;

        // async prefix
        if self.tok.is_ident("async") {
            let cp = self.save();
            self.advance()?;
            if self.tok.newline_before {
                self.restore(cp);
            } else if let TokenKind::Ident(_) = &self.tok.kind {
                if self.peek()?.is_punct(Punct::Arrow) {
                    let param = self.expect_ident("parameter")?;
                    self.expect_punct(Punct::Arrow, "`=>`")?;
                    return Ok(Some(self.parse_arrow_body(
                        start,
                        vec![Pattern::Ident(IdentPat {
                            name: param.name,
                            span: param.span,
                        })],
                        true,
                    )?));
                }
                self.restore(cp);
            } else if self.tok.is_punct(Punct::LParen) && self.is_arrow_params_ahead()? {
                let params = self.parse_params()?;
                if self.tok.is_punct(Punct::Colon) {
                    self.advance()?;
                    self.skip_type()?;
                }
                self.expect_punct(Punct::Arrow, "`=>`")?;
                return Ok(Some(self.parse_arrow_body(start, params, true)?));
            } else {
                self.restore(cp);
            }
            return Ok(None);
        }

        // bare identifier arrow
        if let TokenKind::Ident(name) = &self.tok.kind {
            let name = name.clone();
            let span = self.tok.span;
            let next = self.peek()?;
            if next.is_punct(Punct::Arrow) && !next.newline_before {
                self.advance()?; // ident
                self.advance()?; // =>
                return Ok(Some(self.parse_arrow_body(
                    start,
                    vec![Pattern::Ident(IdentPat { name, span })],
                    false,
                )?));
            }
            return Ok(None);
        }

        // parenthesized params arrow
        if self.tok.is_punct(Punct::LParen) && self.is_arrow_params_ahead()? {
            let params = self.parse_params()?;
            if self.tok.is_punct(Punct::Colon) {
                self.advance()?;
                self.skip_type()?;
            }
            self.expect_punct(Punct::Arrow, "`=>`")?;
            return Ok(Some(self.parse_arrow_body(start, params, false)?));
        }

        Ok(None)
    }

    /// Look ahead past a balanced parenthesis group for `=>` (or `: Type =>`).
    fn is_arrow_params_ahead(&mut self) -> PResult<bool> {
        let cp = self.save();
        debug_assert!(self.tok.is_punct(Punct::LParen));
        self.advance()?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.tok.kind {
                TokenKind::Eof => {
                    self.restore(cp);
                    return Ok(false);
                }
                TokenKind::Punct(Punct::LParen) => depth += 1,
                TokenKind::Punct(Punct::RParen) => depth -= 1,
                _ => {}
            }
            self.advance()?;
        }
        let mut is_arrow = self.tok.is_punct(Punct::Arrow);
        if !is_arrow && self.tok.is_punct(Punct::Colon) {
            // return type annotation between params and arrow
            self.advance()?;
            if self.skip_type().is_ok() {
                is_arrow = self.tok.is_punct(Punct::Arrow);
            }
        }
        self.restore(cp);
        Ok(is_arrow)
    }

    fn parse_arrow_body(
        &mut self,
        start: u32,
        params: Vec<Pattern>,
        is_async: bool,
    ) -> PResult<Expr> {
        let body = if self.tok.is_punct(Punct::LBrace) {
            ArrowBody::Block(self.parse_block()?)
        } else {
            ArrowBody::Expr(Box::new(self.parse_assign_expr()?))
        };
        let end = match &body {
            ArrowBody::Block(b) => b.span.end,
            ArrowBody::Expr(e) => e.span().end,
        };
        Ok(Expr::Arrow(Box::new(ArrowExpr {
            params,
            body,
            is_async,
            span: Span::new(start, end),
        })))
    }

    fn parse_cond_expr(&mut self) -> PResult<Expr> {
        let test = self.parse_binary_expr(0)?;
        if !self.tok.is_punct(Punct::Question) {
            return Ok(test);
        }
        self.advance()?;
        let cons = self.parse_assign_expr()?;
        self.expect_punct(Punct::Colon, "`:`")?;
        let alt = self.parse_assign_expr()?;
        let span = Span::new(test.span().start, alt.span().end);
        Ok(Expr::Cond(Box::new(CondExpr {
            test,
            cons,
            alt,
            span,
        })))
    }

    /// Binary operator precedence; higher binds tighter.
    fn binary_prec(&self) -> Option<(u8, BinOpKind)> {
        let (prec, op) = match self.tok.kind {
            TokenKind::Punct(Punct::QuestionQuestion) => (1, BinOpKind::Logical(LogicalOp::Nullish)),
            TokenKind::Punct(Punct::PipePipe) => (2, BinOpKind::Logical(LogicalOp::Or)),
            TokenKind::Punct(Punct::AmpAmp) => (3, BinOpKind::Logical(LogicalOp::And)),
            TokenKind::Punct(Punct::Pipe) => (4, BinOpKind::Binary(BinaryOp::BitOr)),
            TokenKind::Punct(Punct::Caret) => (5, BinOpKind::Binary(BinaryOp::BitXor)),
            TokenKind::Punct(Punct::Amp) => (6, BinOpKind::Binary(BinaryOp::BitAnd)),
            TokenKind::Punct(Punct::EqEq) => (7, BinOpKind::Binary(BinaryOp::Eq)),
            TokenKind::Punct(Punct::NotEq) => (7, BinOpKind::Binary(BinaryOp::NotEq)),
            TokenKind::Punct(Punct::EqEqEq) => (7, BinOpKind::Binary(BinaryOp::StrictEq)),
            TokenKind::Punct(Punct::NotEqEq) => (7, BinOpKind::Binary(BinaryOp::StrictNotEq)),
            TokenKind::Punct(Punct::Lt) => (8, BinOpKind::Binary(BinaryOp::Lt)),
            TokenKind::Punct(Punct::LtEq) => (8, BinOpKind::Binary(BinaryOp::LtEq)),
            TokenKind::Punct(Punct::Gt) => (8, BinOpKind::Binary(BinaryOp::Gt)),
            TokenKind::Punct(Punct::GtEq) => (8, BinOpKind::Binary(BinaryOp::GtEq)),
            TokenKind::Keyword(Kw::InstanceOf) => (8, BinOpKind::Binary(BinaryOp::InstanceOf)),
            TokenKind::Keyword(Kw::In) if !self.no_in => (8, BinOpKind::Binary(BinaryOp::In)),
            TokenKind::Punct(Punct::LtLt) => (9, BinOpKind::Binary(BinaryOp::Shl)),
            TokenKind::Punct(Punct::GtGt) => (9, BinOpKind::Binary(BinaryOp::Shr)),
            TokenKind::Punct(Punct::GtGtGt) => (9, BinOpKind::Binary(BinaryOp::UShr)),
            TokenKind::Punct(Punct::Plus) => (10, BinOpKind::Binary(BinaryOp::Add)),
            TokenKind::Punct(Punct::Minus) => (10, BinOpKind::Binary(BinaryOp::Sub)),
            TokenKind::Punct(Punct::Star) => (11, BinOpKind::Binary(BinaryOp::Mul)),
            TokenKind::Punct(Punct::Slash) => (11, BinOpKind::Binary(BinaryOp::Div)),
            TokenKind::Punct(Punct::Percent) => (11, BinOpKind::Binary(BinaryOp::Mod)),
            TokenKind::Punct(Punct::StarStar) => (12, BinOpKind::Binary(BinaryOp::Exp)),
            _ => return None,
        };
        Some((prec, op))
    }

    fn parse_binary_expr(&mut self, min_prec: u8) -> PResult<Expr> {
        let mut left = self.parse_unary_expr()?;

        loop {
            // `as` / `satisfies` wrappers bind like relational operators
            if (self.tok.is_ident("as") || self.tok.is_ident("satisfies"))
                && !self.tok.newline_before
                && min_prec <= 8
            {
                let satisfies = self.tok.is_ident("satisfies");
                self.advance()?;
                let type_start = self.tok.span.start;
                self.skip_type()?;
                let type_end = self.prev_end(type_start);
                let annotation =
                    CompactString::new(&self.lexer.source()[type_start as usize..type_end as usize]);
                let span = Span::new(left.span().start, type_end);
                let wrapper = Box::new(TsWrapper {
                    expr: left,
                    annotation,
                    span,
                });
                left = if satisfies {
                    Expr::TsSatisfies(wrapper)
                } else {
                    Expr::TsAs(wrapper)
                };
                continue;
            }

            let Some((prec, op)) = self.binary_prec() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance()?;
            // exponent is right-associative
            let next_min = if matches!(op, BinOpKind::Binary(BinaryOp::Exp)) {
                prec
            } else {
                prec + 1
            };
            let right = self.parse_binary_expr(next_min)?;
            let span = Span::new(left.span().start, right.span().end);
            left = match op {
                BinOpKind::Binary(op) => Expr::Binary(Box::new(BinaryExpr {
                    op,
                    left,
                    right,
                    span,
                })),
                BinOpKind::Logical(op) => Expr::Logical(Box::new(LogicalExpr {
                    op,
                    left,
                    right,
                    span,
                })),
            };
        }

        Ok(left)
    }

    /// End offset of the last consumed token (start of current token's
    /// leading trivia is not tracked; the previous token ends where the
    /// current one's span begins minus trivia, so we conservatively trim
    /// trailing whitespace from the source slice).
    fn prev_end(&self, fallback: u32) -> u32 {
        let mut end = self.tok.span.start as usize;
        let bytes = self.lexer.source().as_bytes();
        while end > fallback as usize && end > 0 && is_whitespace(bytes[end - 1]) {
            end -= 1;
        }
        end as u32
    }

    fn parse_unary_expr(&mut self) -> PResult<Expr> {
        let start = self.tok.span.start;
        let op = match self.tok.kind {
            TokenKind::Punct(Punct::Not) => Some(UnaryOp::Not),
            TokenKind::Punct(Punct::Tilde) => Some(UnaryOp::BitNot),
            TokenKind::Punct(Punct::Plus) => Some(UnaryOp::Plus),
            TokenKind::Punct(Punct::Minus) => Some(UnaryOp::Minus),
            TokenKind::Keyword(Kw::Typeof) => Some(UnaryOp::Typeof),
            TokenKind::Keyword(Kw::Void) => Some(UnaryOp::Void),
            TokenKind::Keyword(Kw::Delete) => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            self.advance()?;
            let arg = self.parse_unary_expr()?;
            let span = Span::new(start, arg.span().end);
            return Ok(Expr::Unary(Box::new(UnaryExpr { op, arg, span })));
        }

        if self.tok.is_kw(Kw::Await) {
            self.advance()?;
            let arg = self.parse_unary_expr()?;
            let span = Span::new(start, arg.span().end);
            return Ok(Expr::Await(Box::new(AwaitExpr { arg, span })));
        }

        if self.tok.is_punct(Punct::PlusPlus) || self.tok.is_punct(Punct::MinusMinus) {
            let op = if self.tok.is_punct(Punct::PlusPlus) {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            self.advance()?;
            let arg = self.parse_unary_expr()?;
            let span = Span::new(start, arg.span().end);
            return Ok(Expr::Update(Box::new(UpdateExpr {
                op,
                prefix: true,
                arg,
                span,
            })));
        }

        let expr = self.parse_postfix_expr()?;

        // postfix update
        if (self.tok.is_punct(Punct::PlusPlus) || self.tok.is_punct(Punct::MinusMinus))
            && !self.tok.newline_before
        {
            let op = if self.tok.is_punct(Punct::PlusPlus) {
                UpdateOp::Inc
            } else {
                UpdateOp::Dec
            };
            let end = self.tok.span.end;
            self.advance()?;
            let span = Span::new(expr.span().start, end);
            return Ok(Expr::Update(Box::new(UpdateExpr {
                op,
                prefix: false,
                arg: expr,
                span,
            })));
        }

        Ok(expr)
    }

    fn parse_postfix_expr(&mut self) -> PResult<Expr> {
        let mut expr = if self.tok.is_kw(Kw::New) {
            self.parse_new_expr()?
        } else {
            self.parse_primary_expr()?
        };
        self.parse_call_member_chain(&mut expr)?;
        Ok(expr)
    }

    fn parse_new_expr(&mut self) -> PResult<Expr> {
        let start = self.expect_kw(Kw::New)?.start;
        let mut callee = self.parse_primary_expr()?;
        // member accesses bind to the callee before the argument list
        loop {
            if self.tok.is_punct(Punct::Dot) {
                self.advance()?;
                let (name, name_span) = self.expect_name_like("property name")?;
                let span = Span::new(callee.span().start, name_span.end);
                callee = Expr::Member(Box::new(MemberExpr {
                    obj: callee,
                    prop: MemberProp::Ident(name, name_span),
                    optional: false,
                    span,
                }));
            } else if self.tok.is_punct(Punct::LBracket) {
                self.advance()?;
                let prop = self.parse_expr()?;
                let end = self.expect_punct(Punct::RBracket, "`]`")?.end;
                let span = Span::new(callee.span().start, end);
                callee = Expr::Member(Box::new(MemberExpr {
                    obj: callee,
                    prop: MemberProp::Computed(prop),
                    optional: false,
                    span,
                }));
            } else {
                break;
            }
        }
        let (args, end) = if self.tok.is_punct(Punct::LParen) {
            self.parse_args()?
        } else {
            (Vec::new(), callee.span().end)
        };
        Ok(Expr::New(Box::new(NewExpr {
            callee,
            args,
            span: Span::new(start, end),
        })))
    }

    fn parse_call_member_chain(&mut self, expr: &mut Expr) -> PResult<()> {
        loop {
            if self.tok.is_punct(Punct::Dot) {
                self.advance()?;
                let (name, name_span) = self.expect_name_like("property name")?;
                let span = Span::new(expr.span().start, name_span.end);
                *expr = Expr::Member(Box::new(MemberExpr {
                    obj: std::mem::replace(expr, Expr::Null(Span::STUB)),
                    prop: MemberProp::Ident(name, name_span),
                    optional: false,
                    span,
                }));
            } else if self.tok.is_punct(Punct::QuestionDot) {
                self.advance()?;
                if self.tok.is_punct(Punct::LParen) {
                    let (args, end) = self.parse_args()?;
                    let span = Span::new(expr.span().start, end);
                    *expr = Expr::Call(Box::new(CallExpr {
                        callee: std::mem::replace(expr, Expr::Null(Span::STUB)),
                        args,
                        optional: true,
                        span,
                    }));
                } else if self.tok.is_punct(Punct::LBracket) {
                    self.advance()?;
                    let prop = self.parse_expr()?;
                    let end = self.expect_punct(Punct::RBracket, "`]`")?.end;
                    let span = Span::new(expr.span().start, end);
                    *expr = Expr::Member(Box::new(MemberExpr {
                        obj: std::mem::replace(expr, Expr::Null(Span::STUB)),
                        prop: MemberProp::Computed(prop),
                        optional: true,
                        span,
                    }));
                } else {
                    let (name, name_span) = self.expect_name_like("property name")?;
                    let span = Span::new(expr.span().start, name_span.end);
                    *expr = Expr::Member(Box::new(MemberExpr {
                        obj: std::mem::replace(expr, Expr::Null(Span::STUB)),
                        prop: MemberProp::Ident(name, name_span),
                        optional: true,
                        span,
                    }));
                }
            } else if self.tok.is_punct(Punct::LBracket) {
                self.advance()?;
                let prop = self.parse_expr()?;
                let end = self.expect_punct(Punct::RBracket, "`]`")?.end;
                let span = Span::new(expr.span().start, end);
                *expr = Expr::Member(Box::new(MemberExpr {
                    obj: std::mem::replace(expr, Expr::Null(Span::STUB)),
                    prop: MemberProp::Computed(prop),
                    optional: false,
                    span,
                }));
            } else if self.tok.is_punct(Punct::LParen) {
                let (args, end) = self.parse_args()?;
                let span = Span::new(expr.span().start, end);
                *expr = Expr::Call(Box::new(CallExpr {
                    callee: std::mem::replace(expr, Expr::Null(Span::STUB)),
                    args,
                    optional: false,
                    span,
                }));
            } else if let TokenKind::Template(_) = &self.tok.kind {
                let quasi = self.parse_template_lit()?;
                let span = Span::new(expr.span().start, quasi.span.end);
                *expr = Expr::TaggedTemplate(Box::new(TaggedTemplate {
                    tag: std::mem::replace(expr, Expr::Null(Span::STUB)),
                    quasi,
                    span,
                }));
            } else if self.tok.is_punct(Punct::Not) && !self.tok.newline_before {
                // TS non-null assertion
                let end = self.tok.span.end;
                self.advance()?;
                let span = Span::new(expr.span().start, end);
                *expr = Expr::TsNonNull(Box::new(TsWrapper {
                    expr: std::mem::replace(expr, Expr::Null(Span::STUB)),
                    annotation: CompactString::new(""),
                    span,
                }));
            } else {
                break;
            }
        }
        Ok(())
    }

    fn parse_args(&mut self) -> PResult<(Vec<Arg>, u32)> {
        self.expect_punct(Punct::LParen, "`(`")?;
        let mut args = Vec::new();
        while !self.tok.is_punct(Punct::RParen) {
            let spread = self.eat_punct(Punct::DotDotDot)?;
            let expr = self.parse_assign_expr()?;
            args.push(Arg { expr, spread });
            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }
        let end = self.expect_punct(Punct::RParen, "`)`")?.end;
        Ok((args, end))
    }

    fn parse_template_lit(&mut self) -> PResult<TemplateLit> {
        let span = self.tok.span;
        let TokenKind::Template(tpl) = self.tok.kind.clone() else {
            return self.err("expected template literal");
        };
        self.advance()?;

        let mut exprs = Vec::new();
        for expr_span in &tpl.expr_spans {
            let mut sub = Parser::new(self.lexer.source())?;
            sub.lexer.set_pos(expr_span.start as usize);
            sub.advance()?;
            let expr = sub.parse_expr()?;
            exprs.push(expr);
        }
        let quasis = tpl
            .quasis
            .into_iter()
            .map(|(raw, span)| TplElement { raw, span })
            .collect();
        Ok(TemplateLit {
            quasis,
            exprs,
            span,
        })
    }

    fn parse_primary_expr(&mut self) -> PResult<Expr> {
        let span = self.tok.span;
        match &self.tok.kind {
            TokenKind::Number { value, raw } => {
                let e = Expr::Number(NumberLit {
                    value: *value,
                    raw: raw.clone(),
                    span,
                });
                self.advance()?;
                Ok(e)
            }
            TokenKind::BigInt { raw } => {
                let e = Expr::BigInt(BigIntLit {
                    raw: raw.clone(),
                    span,
                });
                self.advance()?;
                Ok(e)
            }
            TokenKind::Str { value } => {
                let e = Expr::Str(StrLit {
                    value: value.clone(),
                    span,
                });
                self.advance()?;
                Ok(e)
            }
            TokenKind::Template(_) => {
                let tpl = self.parse_template_lit()?;
                Ok(Expr::Template(Box::new(tpl)))
            }
            TokenKind::Keyword(Kw::True) => {
                self.advance()?;
                Ok(Expr::Bool(BoolLit { value: true, span }))
            }
            TokenKind::Keyword(Kw::False) => {
                self.advance()?;
                Ok(Expr::Bool(BoolLit { value: false, span }))
            }
            TokenKind::Keyword(Kw::Null) => {
                self.advance()?;
                Ok(Expr::Null(span))
            }
            TokenKind::Keyword(Kw::This) => {
                self.advance()?;
                Ok(Expr::Ident(Ident::new("this", span)))
            }
            TokenKind::Keyword(Kw::Super) => {
                self.advance()?;
                Ok(Expr::Ident(Ident::new("super", span)))
            }
            TokenKind::Keyword(Kw::Import) => {
                self.advance()?;
                if self.tok.is_punct(Punct::Dot) {
                    self.advance()?;
                    let (name, name_span) = self.expect_name_like("`meta`")?;
                    if name != "meta" {
                        return Err(ParseError::new(
                            "expected `meta` after `import.`",
                            name_span.start,
                        ));
                    }
                    return Ok(Expr::ImportMeta(Span::new(span.start, name_span.end)));
                }
                self.expect_punct(Punct::LParen, "`(`")?;
                let arg = self.parse_assign_expr()?;
                let end = self.expect_punct(Punct::RParen, "`)`")?.end;
                Ok(Expr::ImportCall(Box::new(ImportCall {
                    arg,
                    span: Span::new(span.start, end),
                })))
            }
            TokenKind::Keyword(Kw::Function) => {
                self.advance()?;
                let is_generator = self.eat_punct(Punct::Star)?;
                let name = if let TokenKind::Ident(n) = &self.tok.kind {
                    let ident = Ident::new(n.clone(), self.tok.span);
                    self.advance()?;
                    Some(ident)
                } else {
                    None
                };
                let func = self.parse_function_tail(span.start, false, is_generator)?;
                let fspan = func.span;
                Ok(Expr::Func(Box::new(FuncExpr {
                    name,
                    func,
                    span: fspan,
                })))
            }
            TokenKind::Ident(name) if name == "async" => {
                // `async function` expression; arrow forms are handled earlier
                let async_name = name.clone();
                let next = self.peek()?;
                if next.is_kw(Kw::Function) {
                    self.advance()?;
                    self.advance()?;
                    let is_generator = self.eat_punct(Punct::Star)?;
                    let name = if let TokenKind::Ident(n) = &self.tok.kind {
                        let ident = Ident::new(n.clone(), self.tok.span);
                        self.advance()?;
                        Some(ident)
                    } else {
                        None
                    };
                    let func = self.parse_function_tail(span.start, true, is_generator)?;
                    let fspan = func.span;
                    return Ok(Expr::Func(Box::new(FuncExpr {
                        name,
                        func,
                        span: fspan,
                    })));
                }
                let e = Expr::Ident(Ident::new(async_name, span));
                self.advance()?;
                Ok(e)
            }
            TokenKind::Ident(name) => {
                let e = Expr::Ident(Ident::new(name.clone(), span));
                self.advance()?;
                Ok(e)
            }
            TokenKind::Punct(Punct::LParen) => {
                self.advance()?;
                let inner = self.parse_expr()?;
                let end = self.expect_punct(Punct::RParen, "`)`")?.end;
                Ok(Expr::Paren(Box::new(ParenExpr {
                    expr: inner,
                    span: Span::new(span.start, end),
                })))
            }
            TokenKind::Punct(Punct::LBracket) => self.parse_array_lit(),
            TokenKind::Punct(Punct::LBrace) => self.parse_object_lit(),
            TokenKind::Punct(Punct::Lt) => self.parse_jsx_root(),
            TokenKind::Punct(Punct::Slash | Punct::SlashEq) => {
                // regex literal in expression position
                let tok = self.lexer.rescan_regex(span.start as usize)?;
                let TokenKind::Regex { pattern, flags } = tok.kind else {
                    unreachable!()
                };
                let e = Expr::Regex(RegexLit {
                    pattern,
                    flags,
                    span: tok.span,
                });
                self.advance()?;
                Ok(e)
            }
            _ => self.err("unexpected token in expression"),
        }
    }

    fn parse_array_lit(&mut self) -> PResult<Expr> {
        let start = self.expect_punct(Punct::LBracket, "`[`")?.start;
        let mut elems = Vec::new();
        while !self.tok.is_punct(Punct::RBracket) {
            if self.tok.is_punct(Punct::Comma) {
                elems.push(None);
                self.advance()?;
                continue;
            }
            let spread = self.eat_punct(Punct::DotDotDot)?;
            let expr = self.parse_assign_expr()?;
            elems.push(Some(ArrayElem { expr, spread }));
            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }
        let end = self.expect_punct(Punct::RBracket, "`]`")?.end;
        Ok(Expr::Array(Box::new(ArrayLit {
            elems,
            span: Span::new(start, end),
        })))
    }

    fn parse_object_lit(&mut self) -> PResult<Expr> {
        let start = self.expect_punct(Punct::LBrace, "`{`")?.start;
        let mut props = Vec::new();

        while !self.tok.is_punct(Punct::RBrace) {
            let prop_start = self.tok.span.start;

            if self.tok.is_punct(Punct::DotDotDot) {
                self.advance()?;
                let expr = self.parse_assign_expr()?;
                let span = Span::new(prop_start, expr.span().end);
                props.push(ObjectProp::Spread { expr, span });
                if !self.eat_punct(Punct::Comma)? {
                    break;
                }
                continue;
            }

            // getter / setter / async method prefixes
            let mut accessor = None;
            let mut is_async = false;
            if self.tok.is_ident("get") || self.tok.is_ident("set") {
                let next = self.peek()?;
                if !next.is_punct(Punct::Colon)
                    && !next.is_punct(Punct::Comma)
                    && !next.is_punct(Punct::LParen)
                    && !next.is_punct(Punct::RBrace)
                {
                    accessor = Some(self.tok.is_ident("get"));
                    self.advance()?;
                }
            } else if self.tok.is_ident("async") {
                let next = self.peek()?;
                if !next.is_punct(Punct::Colon)
                    && !next.is_punct(Punct::Comma)
                    && !next.is_punct(Punct::LParen)
                    && !next.is_punct(Punct::RBrace)
                {
                    is_async = true;
                    self.advance()?;
                }
            }
            let is_generator = self.eat_punct(Punct::Star)?;

            let key = self.parse_prop_name()?;

            if self.tok.is_punct(Punct::LParen) || self.tok.is_punct(Punct::Lt) {
                let func = self.parse_function_tail(prop_start, is_async, is_generator)?;
                let span = Span::new(prop_start, func.span.end);
                let kind = match accessor {
                    Some(true) => MethodKind::Getter,
                    Some(false) => MethodKind::Setter,
                    None => MethodKind::Method,
                };
                props.push(ObjectProp::Method {
                    key,
                    kind,
                    func,
                    span,
                });
            } else if self.eat_punct(Punct::Colon)? {
                let value = self.parse_assign_expr()?;
                let span = Span::new(prop_start, value.span().end);
                props.push(ObjectProp::KeyValue { key, value, span });
            } else if self.tok.is_punct(Punct::Assign) {
                // cover grammar for destructuring defaults: `({ a = 1 } = o)`
                self.advance()?;
                let default = self.parse_assign_expr()?;
                let name = match key.static_name() {
                    Some(n) => CompactString::new(n),
                    None => return self.err("invalid shorthand property"),
                };
                let key_span = key.span();
                let span = Span::new(prop_start, default.span().end);
                props.push(ObjectProp::KeyValue {
                    key,
                    value: Expr::Assign(Box::new(AssignExpr {
                        op: AssignOp::Assign,
                        target: AssignTarget::Ident(Ident::new(name, key_span)),
                        value: default,
                        span,
                    })),
                    span,
                });
            } else {
                let name = match key.static_name() {
                    Some(n) => CompactString::new(n),
                    None => return self.err("invalid shorthand property"),
                };
                let key_span = key.span();
                props.push(ObjectProp::Shorthand {
                    name: Ident::new(name, key_span),
                    span: key_span,
                });
            }

            if !self.eat_punct(Punct::Comma)? {
                break;
            }
        }

        let end = self.expect_punct(Punct::RBrace, "`}`")?.end;
        Ok(Expr::Object(Box::new(ObjectLit {
            props,
            span: Span::new(start, end),
        })))
    }

    // -------------------------------------------------------------------------
    // Cover-grammar conversions
    // -------------------------------------------------------------------------

    fn expr_to_assign_target(&self, expr: Expr) -> PResult<AssignTarget> {
        let offset = expr.span().start;
        match expr {
            Expr::Ident(id) => Ok(AssignTarget::Ident(id)),
            Expr::Member(m) => Ok(AssignTarget::Member(m)),
            Expr::Paren(p) => self.expr_to_assign_target(p.expr),
            Expr::TsNonNull(w) | Expr::TsAs(w) | Expr::TsSatisfies(w) => {
                self.expr_to_assign_target(w.expr)
            }
            Expr::Array(arr) => {
                let mut elems = Vec::new();
                let mut rest = None;
                for elem in arr.elems {
                    match elem {
                        None => elems.push(None),
                        Some(ArrayElem { expr, spread: true }) => {
                            rest = Some(self.expr_to_assign_target(expr)?);
                        }
                        Some(ArrayElem {
                            expr: Expr::Assign(assign),
                            spread: false,
                        }) if assign.op == AssignOp::Assign => {
                            elems.push(Some(AssignTargetElem {
                                target: assign.target,
                                default: Some(assign.value),
                            }));
                        }
                        Some(ArrayElem {
                            expr,
                            spread: false,
                        }) => {
                            elems.push(Some(AssignTargetElem {
                                target: self.expr_to_assign_target(expr)?,
                                default: None,
                            }));
                        }
                    }
                }
                Ok(AssignTarget::Array(Box::new(ArrayAssignTarget {
                    elems,
                    rest,
                    span: arr.span,
                })))
            }
            Expr::Object(obj) => {
                let mut props = Vec::new();
                let mut rest = None;
                for prop in obj.props {
                    match prop {
                        ObjectProp::Shorthand { name, span } => {
                            props.push(ObjectAssignProp {
                                key: PropName::Ident(name.name.clone(), name.span),
                                target: AssignTarget::Ident(name),
                                default: None,
                                shorthand: true,
                                span,
                            });
                        }
                        ObjectProp::KeyValue { key, value, span } => {
                            // shorthand-with-default cover: value is `ident = default`
                            if let Expr::Assign(assign) = &value {
                                if assign.op == AssignOp::Assign {
                                    if let (Some(key_name), AssignTarget::Ident(target_id)) =
                                        (key.static_name(), &assign.target)
                                    {
                                        if key_name == target_id.name {
                                            let Expr::Assign(assign) = value else {
                                                unreachable!()
                                            };
                                            props.push(ObjectAssignProp {
                                                key,
                                                target: assign.target,
                                                default: Some(assign.value),
                                                shorthand: true,
                                                span,
                                            });
                                            continue;
                                        }
                                    }
                                }
                            }
                            let (target, default) = match value {
                                Expr::Assign(assign) if assign.op == AssignOp::Assign => {
                                    (assign.target, Some(assign.value))
                                }
                                other => (self.expr_to_assign_target(other)?, None),
                            };
                            props.push(ObjectAssignProp {
                                key,
                                target,
                                default,
                                shorthand: false,
                                span,
                            });
                        }
                        ObjectProp::Spread { expr, span: _ } => {
                            rest = Some(self.expr_to_assign_target(expr)?);
                        }
                        ObjectProp::Method { span, .. } => {
                            return Err(ParseError::new(
                                "invalid assignment target",
                                span.start,
                            ))
                        }
                    }
                }
                Ok(AssignTarget::Object(Box::new(ObjectAssignTarget {
                    props,
                    rest,
                    span: obj.span,
                })))
            }
            _ => Err(ParseError::new("invalid assignment target", offset)),
        }
    }

    fn expr_to_pattern(&self, expr: Expr) -> PResult<Pattern> {
        let offset = expr.span().start;
        match expr {
            Expr::Ident(id) => Ok(Pattern::Ident(IdentPat {
                name: id.name,
                span: id.span,
            })),
            Expr::Paren(p) => self.expr_to_pattern(p.expr),
            _ => Err(ParseError::new("expected binding pattern", offset)),
        }
    }

    // -------------------------------------------------------------------------
    // TS type skipping
    // -------------------------------------------------------------------------

    fn skip_balanced(&mut self, open: Punct, close: Punct) -> PResult<()> {
        self.expect_punct(open, "opening bracket")?;
        let mut depth = 1usize;
        while depth > 0 {
            if self.tok.is_eof() {
                return self.err("unexpected end of input");
            }
            if self.tok.is_punct(open) {
                depth += 1;
            } else if self.tok.is_punct(close) {
                depth -= 1;
            }
            self.advance()?;
        }
        Ok(())
    }

    fn skip_angle_brackets(&mut self) -> PResult<()> {
        self.expect_punct(Punct::Lt, "`<`")?;
        let mut depth: i32 = 1;
        while depth > 0 {
            match self.tok.kind {
                TokenKind::Eof => return self.err("unexpected end of input in type parameters"),
                TokenKind::Punct(Punct::Lt) => depth += 1,
                TokenKind::Punct(Punct::LtLt) => depth += 2,
                TokenKind::Punct(Punct::Gt) => depth -= 1,
                TokenKind::Punct(Punct::GtGt) => depth -= 2,
                TokenKind::Punct(Punct::GtGtGt) => depth -= 3,
                TokenKind::Punct(Punct::LParen) => {
                    self.skip_balanced(Punct::LParen, Punct::RParen)?;
                    continue;
                }
                TokenKind::Punct(Punct::LBracket) => {
                    self.skip_balanced(Punct::LBracket, Punct::RBracket)?;
                    continue;
                }
                TokenKind::Punct(Punct::LBrace) => {
                    self.skip_balanced(Punct::LBrace, Punct::RBrace)?;
                    continue;
                }
                _ => {}
            }
            self.advance()?;
        }
        Ok(())
    }

    /// Consume a TypeScript type annotation without interpreting it.
    fn skip_type(&mut self) -> PResult<()> {
        self.skip_type_atom()?;
        loop {
            match self.tok.kind {
                TokenKind::Punct(Punct::Pipe) | TokenKind::Punct(Punct::Amp) => {
                    self.advance()?;
                    self.skip_type_atom()?;
                }
                // conditional type `T extends U ? A : B`
                TokenKind::Keyword(Kw::Extends) => {
                    self.advance()?;
                    self.skip_type_atom()?;
                    if self.eat_punct(Punct::Question)? {
                        self.skip_type()?;
                        self.expect_punct(Punct::Colon, "`:`")?;
                        self.skip_type()?;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_type_atom(&mut self) -> PResult<()> {
        match &self.tok.kind {
            TokenKind::Punct(Punct::LParen) => {
                self.skip_balanced(Punct::LParen, Punct::RParen)?;
                // function type
                if self.tok.is_punct(Punct::Arrow) {
                    self.advance()?;
                    self.skip_type()?;
                }
            }
            TokenKind::Punct(Punct::LBrace) => {
                self.skip_balanced(Punct::LBrace, Punct::RBrace)?;
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.skip_balanced(Punct::LBracket, Punct::RBracket)?;
            }
            TokenKind::Keyword(Kw::New) => {
                self.advance()?;
                self.skip_type_atom()?;
            }
            TokenKind::Keyword(Kw::Typeof) => {
                self.advance()?;
                self.skip_type_atom()?;
            }
            TokenKind::Ident(_)
            | TokenKind::Keyword(_)
            | TokenKind::Str { .. }
            | TokenKind::Number { .. }
            | TokenKind::BigInt { .. } => {
                self.advance()?;
                loop {
                    if self.tok.is_punct(Punct::Dot) {
                        self.advance()?;
                        self.expect_name_like("type name")?;
                    } else if self.tok.is_punct(Punct::Lt) {
                        self.skip_angle_brackets()?;
                    } else if self.tok.is_punct(Punct::LBracket) {
                        self.skip_balanced(Punct::LBracket, Punct::RBracket)?;
                    } else {
                        break;
                    }
                }
            }
            _ => return self.err("expected type"),
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // JSX (character-level through the lexer cursor)
    // -------------------------------------------------------------------------

    fn parse_jsx_root(&mut self) -> PResult<Expr> {
        let lt_pos = self.tok.span.start as usize;
        let expr = self.parse_jsx_at(lt_pos)?;
        self.advance()?;
        Ok(expr)
    }

    /// Parse a JSX element or fragment whose `<` sits at `lt_pos`.
    /// On return, the lexer cursor is just past the closing `>`.
    fn parse_jsx_at(&mut self, lt_pos: usize) -> PResult<Expr> {
        self.lexer.set_pos(lt_pos + 1);
        self.jsx_skip_ws();

        if self.lexer.peek_byte() == Some(b'>') {
            // fragment
            self.lexer.set_pos(self.lexer.pos() + 1);
            let children = self.parse_jsx_children(None, lt_pos)?;
            let end = self.lexer.pos() as u32;
            return Ok(Expr::JsxFragment(Box::new(JsxFragment {
                children,
                span: Span::new(lt_pos as u32, end),
            })));
        }

        let name = self.parse_jsx_name(lt_pos)?;
        let mut attrs = Vec::new();

        loop {
            self.jsx_skip_ws();
            match self.lexer.peek_byte() {
                Some(b'/') => {
                    self.lexer.set_pos(self.lexer.pos() + 1);
                    self.jsx_skip_ws();
                    if self.lexer.peek_byte() != Some(b'>') {
                        return Err(ParseError::new(
                            "expected `>` after `/`",
                            self.lexer.pos() as u32,
                        ));
                    }
                    self.lexer.set_pos(self.lexer.pos() + 1);
                    let end = self.lexer.pos() as u32;
                    return Ok(Expr::Jsx(Box::new(JsxElement {
                        name,
                        attrs,
                        children: Vec::new(),
                        self_closing: true,
                        span: Span::new(lt_pos as u32, end),
                    })));
                }
                Some(b'>') => {
                    self.lexer.set_pos(self.lexer.pos() + 1);
                    let tag_name = match &name {
                        JsxName::Ident(n, _) => n.to_string(),
                        JsxName::Member(parts, _) => parts.join("."),
                    };
                    let children = self.parse_jsx_children(Some(&tag_name), lt_pos)?;
                    let end = self.lexer.pos() as u32;
                    return Ok(Expr::Jsx(Box::new(JsxElement {
                        name,
                        attrs,
                        children,
                        self_closing: false,
                        span: Span::new(lt_pos as u32, end),
                    })));
                }
                Some(b'{') => {
                    // spread attribute
                    let spread_start = self.lexer.pos() as u32;
                    self.lexer.set_pos(self.lexer.pos() + 1);
                    self.advance()?;
                    if !self.tok.is_punct(Punct::DotDotDot) {
                        return self.err("expected `...` in spread attribute");
                    }
                    self.advance()?;
                    let expr = self.parse_assign_expr()?;
                    if !self.tok.is_punct(Punct::RBrace) {
                        return self.err("expected `}` after spread attribute");
                    }
                    let end = self.tok.span.end;
                    self.lexer.set_pos(self.tok.span.end as usize);
                    attrs.push(JsxAttr::Spread(JsxSpreadAttr {
                        expr,
                        span: Span::new(spread_start, end),
                    }));
                }
                Some(c) if c == b'_' || c == b'$' || c.is_ascii_alphabetic() => {
                    attrs.push(JsxAttr::Named(self.parse_jsx_attr()?));
                }
                Some(_) => {
                    return Err(ParseError::new(
                        "unexpected character in JSX tag",
                        self.lexer.pos() as u32,
                    ))
                }
                None => {
                    return Err(ParseError::new("unterminated JSX element", lt_pos as u32))
                }
            }
        }
    }

    fn parse_jsx_name(&mut self, lt_pos: usize) -> PResult<JsxName> {
        let start = self.lexer.pos() as u32;
        let first = self.jsx_read_name_part();
        if first.is_empty() {
            return Err(ParseError::new("expected JSX element name", lt_pos as u32));
        }
        if self.lexer.peek_byte() == Some(b'.') {
            let mut parts = vec![first];
            while self.lexer.peek_byte() == Some(b'.') {
                self.lexer.set_pos(self.lexer.pos() + 1);
                parts.push(self.jsx_read_name_part());
            }
            let end = self.lexer.pos() as u32;
            return Ok(JsxName::Member(parts, Span::new(start, end)));
        }
        let end = self.lexer.pos() as u32;
        Ok(JsxName::Ident(first, Span::new(start, end)))
    }

    /// JSX name segment: identifier characters plus `-`.
    fn jsx_read_name_part(&mut self) -> CompactString {
        let start = self.lexer.pos();
        while let Some(c) = self.lexer.peek_byte() {
            if is_ident_part(c) || c == b'-' {
                self.lexer.set_pos(self.lexer.pos() + 1);
            } else {
                break;
            }
        }
        CompactString::new(&self.lexer.source()[start..self.lexer.pos()])
    }

    fn jsx_skip_ws(&mut self) {
        while let Some(c) = self.lexer.peek_byte() {
            if is_whitespace(c) {
                self.lexer.set_pos(self.lexer.pos() + 1);
            } else {
                break;
            }
        }
    }

    fn parse_jsx_attr(&mut self) -> PResult<JsxNamedAttr> {
        let name_start = self.lexer.pos() as u32;
        let mut name = self.jsx_read_name_part();
        // namespaced attributes (`xlink:href`)
        if self.lexer.peek_byte() == Some(b':') {
            self.lexer.set_pos(self.lexer.pos() + 1);
            let rest = self.jsx_read_name_part();
            name = CompactString::new(format!("{name}:{rest}"));
        }
        let name_end = self.lexer.pos() as u32;
        let name_span = Span::new(name_start, name_end);
        self.jsx_skip_ws();

        if self.lexer.peek_byte() != Some(b'=') {
            return Ok(JsxNamedAttr {
                name,
                name_span,
                value: None,
                span: name_span,
            });
        }
        self.lexer.set_pos(self.lexer.pos() + 1);
        self.jsx_skip_ws();

        match self.lexer.peek_byte() {
            Some(q @ (b'"' | b'\'')) => {
                let str_start = self.lexer.pos() as u32;
                self.lexer.set_pos(self.lexer.pos() + 1);
                let value_start = self.lexer.pos();
                while let Some(c) = self.lexer.peek_byte() {
                    if c == q {
                        break;
                    }
                    self.lexer.set_pos(self.lexer.pos() + 1);
                }
                if self.lexer.peek_byte() != Some(q) {
                    return Err(ParseError::new("unterminated attribute value", str_start));
                }
                let value = self.lexer.source()[value_start..self.lexer.pos()].to_string();
                self.lexer.set_pos(self.lexer.pos() + 1);
                let end = self.lexer.pos() as u32;
                Ok(JsxNamedAttr {
                    name,
                    name_span,
                    value: Some(JsxAttrValue::Str(StrLit {
                        value,
                        span: Span::new(str_start, end),
                    })),
                    span: Span::new(name_start, end),
                })
            }
            Some(b'{') => {
                self.lexer.set_pos(self.lexer.pos() + 1);
                self.advance()?;
                let expr = self.parse_assign_expr()?;
                if !self.tok.is_punct(Punct::RBrace) {
                    return self.err("expected `}` after attribute expression");
                }
                let end = self.tok.span.end;
                self.lexer.set_pos(end as usize);
                Ok(JsxNamedAttr {
                    name,
                    name_span,
                    value: Some(JsxAttrValue::Expr(expr)),
                    span: Span::new(name_start, end),
                })
            }
            _ => Err(ParseError::new(
                "expected attribute value",
                self.lexer.pos() as u32,
            )),
        }
    }

    /// Parse children until the matching closing tag (or `</>` for
    /// fragments). The cursor starts just past the opening `>`.
    fn parse_jsx_children(
        &mut self,
        tag_name: Option<&str>,
        lt_pos: usize,
    ) -> PResult<Vec<JsxChild>> {
        let mut children = Vec::new();
        loop {
            let text_start = self.lexer.pos();
            while let Some(c) = self.lexer.peek_byte() {
                if c == b'<' || c == b'{' {
                    break;
                }
                self.lexer.set_pos(self.lexer.pos() + 1);
            }
            if self.lexer.pos() > text_start {
                let value = self.lexer.source()[text_start..self.lexer.pos()].to_string();
                children.push(JsxChild::Text(JsxText {
                    value,
                    span: Span::new(text_start as u32, self.lexer.pos() as u32),
                }));
            }

            match self.lexer.peek_byte() {
                None => {
                    return Err(ParseError::new("unterminated JSX element", lt_pos as u32))
                }
                Some(b'<') => {
                    let child_lt = self.lexer.pos();
                    // closing tag?
                    if self.lexer.source().as_bytes().get(child_lt + 1) == Some(&b'/') {
                        self.lexer.set_pos(child_lt + 2);
                        self.jsx_skip_ws();
                        let close_name = self.jsx_read_name_part();
                        // member closing names (`</A.B>`)
                        let mut full = close_name.to_string();
                        while self.lexer.peek_byte() == Some(b'.') {
                            self.lexer.set_pos(self.lexer.pos() + 1);
                            full.push('.');
                            full.push_str(&self.jsx_read_name_part());
                        }
                        self.jsx_skip_ws();
                        if self.lexer.peek_byte() != Some(b'>') {
                            return Err(ParseError::new(
                                "expected `>` in closing tag",
                                self.lexer.pos() as u32,
                            ));
                        }
                        self.lexer.set_pos(self.lexer.pos() + 1);
                        if let Some(expected) = tag_name {
                            if full != expected {
                                return Err(ParseError::new(
                                    format!(
                                        "mismatched closing tag: expected `</{expected}>`, found `</{full}>`"
                                    ),
                                    child_lt as u32,
                                ));
                            }
                        } else if !full.is_empty() {
                            return Err(ParseError::new(
                                "expected `</>` to close fragment",
                                child_lt as u32,
                            ));
                        }
                        return Ok(children);
                    }
                    // nested element
                    let child = self.parse_jsx_at(child_lt)?;
                    match child {
                        Expr::Jsx(el) => children.push(JsxChild::Element(el)),
                        Expr::JsxFragment(frag) => children.push(JsxChild::Fragment(frag)),
                        _ => unreachable!(),
                    }
                }
                Some(b'{') => {
                    let expr_start = self.lexer.pos() as u32;
                    self.lexer.set_pos(self.lexer.pos() + 1);
                    self.advance()?;
                    if self.tok.is_punct(Punct::RBrace) {
                        // empty or comment-only container
                        let end = self.tok.span.end;
                        self.lexer.set_pos(end as usize);
                        children.push(JsxChild::Expr(JsxExprChild {
                            expr: None,
                            span: Span::new(expr_start, end),
                        }));
                        continue;
                    }
                    let expr = self.parse_assign_expr()?;
                    if !self.tok.is_punct(Punct::RBrace) {
                        return self.err("expected `}` after JSX expression");
                    }
                    let end = self.tok.span.end;
                    self.lexer.set_pos(end as usize);
                    children.push(JsxChild::Expr(JsxExprChild {
                        expr: Some(expr),
                        span: Span::new(expr_start, end),
                    }));
                }
                Some(_) => unreachable!(),
            }
        }
    }
}

/// Binary vs. logical operator discriminator for the precedence table.
#[derive(Debug, Clone, Copy)]
enum BinOpKind {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Module {
        parse_module(src).unwrap_or_else(|e| panic!("parse failed: {e:?} in {src:?}"))
    }

    fn first_expr(module: &Module) -> &Expr {
        match &module.body[0] {
            Stmt::Expr(e) => &e.expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn test_var_decls() {
        let m = parse("let count = $state(0);\nconst doubled = count * 2;");
        assert_eq!(m.body.len(), 2);
        match &m.body[0] {
            Stmt::VarDecl(decl) => {
                assert_eq!(decl.kind, VarKind::Let);
                assert_eq!(
                    decl.decls[0].pat.as_ident().map(|p| p.name.as_str()),
                    Some("count")
                );
                assert!(matches!(decl.decls[0].init, Some(Expr::Call(_))));
            }
            other => panic!("expected var decl, got {other:?}"),
        }
    }

    #[test]
    fn test_destructuring_patterns() {
        let m = parse("const { a, b: c = 1, ...rest } = obj; const [x, , y] = arr;");
        match &m.body[0] {
            Stmt::VarDecl(decl) => {
                let Pattern::Object(pat) = &decl.decls[0].pat else {
                    panic!("expected object pattern");
                };
                assert_eq!(pat.props.len(), 2);
                assert!(pat.rest.is_some());
                assert!(pat.props[0].shorthand);
                assert!(matches!(pat.props[1].value, Pattern::Assign(_)));
            }
            other => panic!("expected var decl, got {other:?}"),
        }
        match &m.body[1] {
            Stmt::VarDecl(decl) => {
                let Pattern::Array(pat) = &decl.decls[0].pat else {
                    panic!("expected array pattern");
                };
                assert_eq!(pat.elems.len(), 3);
                assert!(pat.elems[1].is_none());
            }
            other => panic!("expected var decl, got {other:?}"),
        }
    }

    #[test]
    fn test_operator_precedence() {
        let m = parse("a + b * c;");
        let Expr::Binary(add) = first_expr(&m) else {
            panic!("expected binary expression");
        };
        assert_eq!(add.op, BinaryOp::Add);
        assert!(matches!(&add.right, Expr::Binary(mul) if mul.op == BinaryOp::Mul));
    }

    #[test]
    fn test_exponent_right_assoc() {
        let m = parse("a ** b ** c;");
        let Expr::Binary(outer) = first_expr(&m) else {
            panic!("expected binary expression");
        };
        assert_eq!(outer.op, BinaryOp::Exp);
        assert!(matches!(&outer.left, Expr::Ident(_)));
        assert!(matches!(&outer.right, Expr::Binary(_)));
    }

    #[test]
    fn test_arrow_functions() {
        let m = parse("const f = x => x + 1; const g = (a, b = 2) => { return a; }; const h = async () => 1;");
        for stmt in &m.body {
            let Stmt::VarDecl(decl) = stmt else {
                panic!("expected var decl");
            };
            assert!(matches!(decl.decls[0].init, Some(Expr::Arrow(_))));
        }
        let Stmt::VarDecl(decl) = &m.body[2] else {
            unreachable!()
        };
        let Some(Expr::Arrow(arrow)) = &decl.decls[0].init else {
            unreachable!()
        };
        assert!(arrow.is_async);
    }

    #[test]
    fn test_update_and_compound_assign() {
        let m = parse("count++; count += 3;");
        assert!(matches!(first_expr(&m), Expr::Update(u) if !u.prefix));
        match &m.body[1] {
            Stmt::Expr(e) => {
                let Expr::Assign(assign) = &e.expr else {
                    panic!("expected assignment");
                };
                assert_eq!(assign.op, AssignOp::Add);
            }
            other => panic!("expected expr stmt, got {other:?}"),
        }
    }

    #[test]
    fn test_destructuring_assignment() {
        let m = parse("({ count } = { count: 5 });");
        let Expr::Paren(paren) = first_expr(&m) else {
            panic!("expected paren");
        };
        let Expr::Assign(assign) = &paren.expr else {
            panic!("expected assignment");
        };
        assert!(matches!(assign.target, AssignTarget::Object(_)));
    }

    #[test]
    fn test_destructuring_assignment_with_default() {
        let m = parse("({ count = d } = obj);");
        let Expr::Paren(paren) = first_expr(&m) else {
            panic!("expected paren");
        };
        let Expr::Assign(assign) = &paren.expr else {
            panic!("expected assignment");
        };
        let AssignTarget::Object(target) = &assign.target else {
            panic!("expected object target");
        };
        assert!(target.props[0].default.is_some());
    }

    #[test]
    fn test_control_flow() {
        let m = parse(
            "if (a) { b(); } else c();\nwhile (x) y();\ndo { z(); } while (q);\nfor (let i = 0; i < 10; i++) f(i);\nfor (const k in obj) g(k);\nfor (const v of list) h(v);",
        );
        assert!(matches!(m.body[0], Stmt::If(_)));
        assert!(matches!(m.body[1], Stmt::While(_)));
        assert!(matches!(m.body[2], Stmt::DoWhile(_)));
        assert!(matches!(m.body[3], Stmt::For(_)));
        assert!(matches!(m.body[4], Stmt::ForIn(_)));
        assert!(matches!(m.body[5], Stmt::ForOf(_)));
    }

    #[test]
    fn test_switch() {
        let m = parse("switch (k) { case \"a\": f(); break; default: g(); }");
        let Stmt::Switch(sw) = &m.body[0] else {
            panic!("expected switch");
        };
        assert_eq!(sw.cases.len(), 2);
        assert!(sw.cases[0].test.is_some());
        assert!(sw.cases[1].test.is_none());
    }

    #[test]
    fn test_labeled_break() {
        let m = parse("outer: for (;;) { break outer; }");
        assert!(matches!(m.body[0], Stmt::Labeled(_)));
    }

    #[test]
    fn test_imports() {
        let m = parse("import { $state, $effect as fx } from 'fict';\nimport Def, * as ns from 'm';");
        let Stmt::Import(import) = &m.body[0] else {
            panic!("expected import");
        };
        assert_eq!(import.source.value, "fict");
        assert_eq!(import.named.len(), 2);
        assert!(!import.named[0].is_aliased());
        assert!(import.named[1].is_aliased());
        let Stmt::Import(import) = &m.body[1] else {
            panic!("expected import");
        };
        assert!(import.default.is_some());
        assert!(import.namespace.is_some());
    }

    #[test]
    fn test_exports() {
        let m = parse("export const doubled = count * 2;\nexport { a, b as c };\nexport default function App() {}");
        assert!(matches!(m.body[0], Stmt::ExportNamed(_)));
        let Stmt::ExportNamed(named) = &m.body[1] else {
            panic!("expected named export");
        };
        assert_eq!(named.specifiers.len(), 2);
        assert!(matches!(m.body[2], Stmt::ExportDefault(_)));
    }

    #[test]
    fn test_jsx_element() {
        let m = parse("const v = <div class=\"box\" id={myId}>hello {name}!</div>;");
        let Stmt::VarDecl(decl) = &m.body[0] else {
            panic!("expected var decl");
        };
        let Some(Expr::Jsx(el)) = &decl.decls[0].init else {
            panic!("expected JSX");
        };
        assert_eq!(el.name.display(), "div");
        assert_eq!(el.attrs.len(), 2);
        assert_eq!(el.children.len(), 3);
        assert!(matches!(&el.children[0], JsxChild::Text(t) if t.value == "hello "));
        assert!(matches!(&el.children[1], JsxChild::Expr(_)));
    }

    #[test]
    fn test_jsx_nested_and_self_closing() {
        let m = parse("const v = <ul>{items.map(item => <li key={item.id}>{item.name}</li>)}</ul>;");
        let Stmt::VarDecl(decl) = &m.body[0] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::Jsx(_))));

        let m = parse("const v = <br/>;");
        let Stmt::VarDecl(decl) = &m.body[0] else {
            panic!("expected var decl");
        };
        let Some(Expr::Jsx(el)) = &decl.decls[0].init else {
            panic!("expected JSX");
        };
        assert!(el.self_closing);
    }

    #[test]
    fn test_jsx_fragment_and_spread() {
        let m = parse("const v = <>{a}<A {...props}/></>;");
        let Stmt::VarDecl(decl) = &m.body[0] else {
            panic!("expected var decl");
        };
        let Some(Expr::JsxFragment(frag)) = &decl.decls[0].init else {
            panic!("expected fragment");
        };
        assert_eq!(frag.children.len(), 2);
        let JsxChild::Element(el) = &frag.children[1] else {
            panic!("expected element child");
        };
        assert!(matches!(el.attrs[0], JsxAttr::Spread(_)));
    }

    #[test]
    fn test_conditional_jsx_return() {
        let m = parse("function V() { if (c % 2) return <A/>; return <B/>; }");
        let Stmt::Func(f) = &m.body[0] else {
            panic!("expected function");
        };
        assert_eq!(f.func.body.stmts.len(), 2);
    }

    #[test]
    fn test_typescript_stripping() {
        let m = parse(
            "const n: number = 1;\nfunction f(a: string, b?: number): void {}\nconst x = y as Foo<Bar>;\nconst z = w satisfies Baz;\nconst v = maybe!;\ninterface I { a: number }\ntype T = string | number;",
        );
        assert!(matches!(m.body[0], Stmt::VarDecl(_)));
        let Stmt::Func(f) = &m.body[1] else {
            panic!("expected function");
        };
        assert_eq!(f.func.params.len(), 2);
        let Stmt::VarDecl(decl) = &m.body[2] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::TsAs(_))));
        let Stmt::VarDecl(decl) = &m.body[3] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::TsSatisfies(_))));
        let Stmt::VarDecl(decl) = &m.body[4] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::TsNonNull(_))));
        assert!(matches!(m.body[5], Stmt::Empty(_)));
        assert!(matches!(m.body[6], Stmt::Empty(_)));
    }

    #[test]
    fn test_template_literals() {
        let m = parse("const s = `a${x + 1}b`;");
        let Stmt::VarDecl(decl) = &m.body[0] else {
            panic!("expected var decl");
        };
        let Some(Expr::Template(tpl)) = &decl.decls[0].init else {
            panic!("expected template");
        };
        assert_eq!(tpl.quasis.len(), 2);
        assert_eq!(tpl.exprs.len(), 1);
        assert!(matches!(&tpl.exprs[0], Expr::Binary(_)));
    }

    #[test]
    fn test_regex_bigint_import_meta() {
        let m = parse("const r = /ab+c/gi; const b = 10n; const u = import.meta; const p = import('mod');");
        let Stmt::VarDecl(decl) = &m.body[0] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::Regex(_))));
        let Stmt::VarDecl(decl) = &m.body[1] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::BigInt(_))));
        let Stmt::VarDecl(decl) = &m.body[2] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::ImportMeta(_))));
        let Stmt::VarDecl(decl) = &m.body[3] else {
            panic!("expected var decl");
        };
        assert!(matches!(decl.decls[0].init, Some(Expr::ImportCall(_))));
    }

    #[test]
    fn test_optional_chaining_and_nullish() {
        let m = parse("const v = a?.b?.() ?? c;");
        let Stmt::VarDecl(decl) = &m.body[0] else {
            panic!("expected var decl");
        };
        let Some(Expr::Logical(log)) = &decl.decls[0].init else {
            panic!("expected logical");
        };
        assert_eq!(log.op, LogicalOp::Nullish);
    }

    #[test]
    fn test_async_await() {
        let m = parse("async function f() { const x = await g(); }");
        let Stmt::Func(f) = &m.body[0] else {
            panic!("expected function");
        };
        assert!(f.func.is_async);
    }

    #[test]
    fn test_parse_error_position() {
        let err = parse_module("let = 5;").unwrap_err();
        assert_eq!(err.offset, 4);
    }
}
