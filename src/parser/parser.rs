//! Recursive descent parser for level source files
//!
//! Builds the AST of [`crate::syntax::ast`] from the token stream. Trivia is
//! dropped before parsing; the first syntax error aborts the file and is
//! returned as a [`ParseError`].

use smol_str::SmolStr;

use super::error::ParseError;
use super::lexer::{Lexer, Token};
use super::token_kind::TokenKind;
use crate::base::{FileId, LineIndex, Position, Span, TextSize};
use crate::syntax::ast::*;

type PResult<T> = Result<T, ParseError>;

/// Parse one source file into a compilation unit.
pub fn parse_unit(file: FileId, source: &str) -> PResult<CompilationUnit> {
    let tokens: Vec<_> = Lexer::new(source)
        .filter(|t| !t.kind.is_trivia())
        .collect();
    let mut parser = Parser::new(file, source, tokens);
    parser.parse_compilation_unit()
}

/// The parser state
struct Parser<'a> {
    file: FileId,
    tokens: Vec<Token<'a>>,
    /// Start and end position of every token.
    positions: Vec<(Position, Position)>,
    pos: usize,
    /// End of the last consumed token.
    last_end: Position,
    eof: Position,
}

impl<'a> Parser<'a> {
    fn new(file: FileId, source: &str, tokens: Vec<Token<'a>>) -> Self {
        let line_index = LineIndex::new(source);
        let positions = tokens
            .iter()
            .map(|t| {
                (
                    line_index.line_col(t.range.start()).into(),
                    line_index.line_col(t.range.end()).into(),
                )
            })
            .collect();
        let eof = line_index
            .line_col(TextSize::new(source.len() as u32))
            .into();
        Self {
            file,
            tokens,
            positions,
            pos: 0,
            last_end: Position::new(0, 0),
            eof,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn kind(&self) -> TokenKind {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn text(&self) -> &'a str {
        self.tokens.get(self.pos).map(|t| t.text).unwrap_or("")
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn start(&self) -> Position {
        self.positions
            .get(self.pos)
            .map(|(start, _)| *start)
            .unwrap_or(self.eof)
    }

    fn current_span(&self) -> Span {
        match self.positions.get(self.pos) {
            Some((start, end)) => Span::new(self.file, *start, *end),
            None => Span::new(self.file, self.eof, self.eof),
        }
    }

    fn span_from(&self, start: Position) -> Span {
        Span::new(self.file, start, self.last_end.max(start))
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    /// Consume the current token and return its span.
    fn bump(&mut self) -> Span {
        let span = self.current_span();
        if self.pos < self.tokens.len() {
            self.last_end = span.end;
            self.pos += 1;
        }
        span
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Span> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(kind.describe()))
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn unexpected(&self, expected: &str) -> ParseError {
        let kind = self.kind();
        let found = match kind {
            TokenKind::Ident | TokenKind::Error => format!("'{}'", self.text()),
            k if k.is_literal() => format!("'{}'", self.text()),
            TokenKind::Eof => kind.describe().to_string(),
            _ if kind.describe() == "keyword" => format!("keyword '{}'", self.text()),
            _ => kind.describe().to_string(),
        };
        ParseError::new(
            format!("expected {}, found {}", expected, found),
            self.current_span(),
        )
    }

    // =========================================================================
    // Grammar rules: declarations
    // =========================================================================

    /// CompilationUnit = PackageDecl? ImportDecl* TypeDecl*
    fn parse_compilation_unit(&mut self) -> PResult<CompilationUnit> {
        let start = self.start();

        let package = if self.eat(TokenKind::PackageKw) {
            let name = self.qualified_name()?;
            self.expect(TokenKind::Semicolon)?;
            Some(name)
        } else {
            None
        };

        let mut imports = Vec::new();
        while self.at(TokenKind::ImportKw) {
            imports.push(self.import_decl()?);
        }

        let mut types = Vec::new();
        while !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            if self.at(TokenKind::ImportKw) || self.at(TokenKind::PackageKw) {
                return Err(ParseError::new(
                    "package and import declarations must precede type declarations",
                    self.current_span(),
                ));
            }
            let modifiers = self.modifiers()?;
            types.push(self.type_decl(modifiers)?);
        }

        Ok(CompilationUnit {
            file: self.file,
            package,
            imports,
            types,
            span: self.span_from(start),
        })
    }

    /// ImportDecl = 'import' Name ('.' '*')? ';'
    fn import_decl(&mut self) -> PResult<ImportDecl> {
        let start = self.start();
        self.expect(TokenKind::ImportKw)?;
        let first = self.ident()?;
        let mut parts = vec![first];
        let mut on_demand = false;
        while self.eat(TokenKind::Dot) {
            if self.eat(TokenKind::Star) {
                on_demand = true;
                break;
            }
            parts.push(self.ident()?);
        }
        let path_span = parts[0].span.to(parts[parts.len() - 1].span);
        self.expect(TokenKind::Semicolon)?;
        Ok(ImportDecl {
            path: QualifiedName {
                parts,
                span: path_span,
            },
            on_demand,
            span: self.span_from(start),
        })
    }

    fn modifiers(&mut self) -> PResult<Modifiers> {
        let start = self.start();
        let mut modifiers = Modifiers::empty(Span::new(self.file, start, start));
        while let Some(modifier) = modifier_for(self.kind()) {
            let span = self.bump();
            if !modifiers.push(modifier) {
                return Err(ParseError::new(
                    format!("repeated modifier '{}'", modifier),
                    span,
                ));
            }
        }
        if !modifiers.is_empty() {
            modifiers.span = self.span_from(start);
        }
        Ok(modifiers)
    }

    /// TypeDecl = Modifiers ('class' | 'interface') Ident Supertypes Body
    fn type_decl(&mut self, modifiers: Modifiers) -> PResult<TypeDecl> {
        let start = if modifiers.is_empty() {
            self.start()
        } else {
            modifiers.span.start
        };
        let kind = match self.kind() {
            TokenKind::ClassKw => TypeDeclKind::Class,
            TokenKind::InterfaceKw => TypeDeclKind::Interface,
            _ => return Err(self.unexpected("'class' or 'interface'")),
        };
        self.bump();
        let name = self.ident()?;

        let mut extends = Vec::new();
        if self.eat(TokenKind::ExtendsKw) {
            extends = self.type_list()?;
            if kind == TypeDeclKind::Class && extends.len() > 1 {
                return Err(ParseError::new(
                    "a class can extend only one class",
                    extends[1].span(),
                ));
            }
        }
        let mut implements = Vec::new();
        if kind == TypeDeclKind::Class && self.eat(TokenKind::ImplementsKw) {
            implements = self.type_list()?;
        }

        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("'}'"));
            }
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            members.push(self.member()?);
        }
        self.expect(TokenKind::RBrace)?;

        Ok(TypeDecl {
            kind,
            modifiers,
            name,
            extends,
            implements,
            members,
            span: self.span_from(start),
        })
    }

    fn type_list(&mut self) -> PResult<Vec<TypeExpr>> {
        let mut types = vec![self.type_expr()?];
        while self.eat(TokenKind::Comma) {
            types.push(self.type_expr()?);
        }
        Ok(types)
    }

    /// Member = Field | Method | Constructor | TypeDecl
    fn member(&mut self) -> PResult<Member> {
        let modifiers = self.modifiers()?;
        let start = if modifiers.is_empty() {
            self.start()
        } else {
            modifiers.span.start
        };

        match self.kind() {
            TokenKind::ClassKw | TokenKind::InterfaceKw => {
                Ok(Member::Type(self.type_decl(modifiers)?))
            }
            TokenKind::Ident if self.nth(1) == TokenKind::LParen => {
                let name = self.ident()?;
                let params = self.params()?;
                let body = self.block()?;
                Ok(Member::Method(MethodDecl {
                    modifiers,
                    return_type: None,
                    name,
                    params,
                    body: Some(body),
                    span: self.span_from(start),
                }))
            }
            _ => {
                let ty = if self.at(TokenKind::VoidKw) {
                    TypeExpr::Void(self.bump())
                } else {
                    self.type_expr()?
                };
                let name = self.ident()?;
                if self.at(TokenKind::LParen) {
                    let params = self.params()?;
                    let body = if self.eat(TokenKind::Semicolon) {
                        None
                    } else {
                        Some(self.block()?)
                    };
                    return Ok(Member::Method(MethodDecl {
                        modifiers,
                        return_type: Some(ty),
                        name,
                        params,
                        body,
                        span: self.span_from(start),
                    }));
                }
                if ty.is_void() {
                    return Err(ParseError::new(
                        "a field cannot have type void",
                        ty.span(),
                    ));
                }
                let declarators = self.declarators_after(name)?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Member::Field(FieldDecl {
                    modifiers,
                    ty,
                    declarators,
                    span: self.span_from(start),
                }))
            }
        }
    }

    /// Declarators of a field or local, the first name already consumed.
    fn declarators_after(&mut self, first: Name) -> PResult<Vec<VarDeclarator>> {
        let mut declarators = vec![self.declarator_rest(first)?];
        while self.eat(TokenKind::Comma) {
            let name = self.ident()?;
            declarators.push(self.declarator_rest(name)?);
        }
        Ok(declarators)
    }

    fn declarator_rest(&mut self, name: Name) -> PResult<VarDeclarator> {
        let start = name.span.start;
        let init = if self.eat(TokenKind::Eq) {
            Some(self.expr()?)
        } else {
            None
        };
        Ok(VarDeclarator {
            name,
            init,
            span: self.span_from(start),
        })
    }

    fn params(&mut self) -> PResult<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.at(TokenKind::RParen) {
            loop {
                params.push(self.param()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    fn param(&mut self) -> PResult<Param> {
        let start = self.start();
        let modifiers = self.local_modifiers()?;
        let ty = self.type_expr()?;
        let name = self.ident()?;
        Ok(Param {
            modifiers,
            ty,
            name,
            span: self.span_from(start),
        })
    }

    /// Modifiers of parameters and locals: only `final` is accepted.
    fn local_modifiers(&mut self) -> PResult<Modifiers> {
        let modifiers = self.modifiers()?;
        if let Some(bad) = modifiers.iter().find(|m| *m != Modifier::Final) {
            return Err(ParseError::new(
                format!("modifier '{}' is not allowed here", bad),
                modifiers.span,
            ));
        }
        Ok(modifiers)
    }

    // =========================================================================
    // Grammar rules: types and names
    // =========================================================================

    /// Type = (PrimitiveType | Name) ('[' ']')*
    fn type_expr(&mut self) -> PResult<TypeExpr> {
        let start = self.start();
        let mut ty = if let Some(prim) = primitive_for(self.kind()) {
            TypeExpr::Primitive(prim, self.bump())
        } else if self.at(TokenKind::Ident) {
            TypeExpr::Named(self.qualified_name()?)
        } else {
            return Err(self.unexpected("type"));
        };
        while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
            self.bump();
            self.bump();
            ty = TypeExpr::Array(Box::new(ty), self.span_from(start));
        }
        Ok(ty)
    }

    fn qualified_name(&mut self) -> PResult<QualifiedName> {
        let first = self.ident()?;
        let mut parts = vec![first];
        while self.at(TokenKind::Dot) && self.nth(1) == TokenKind::Ident {
            self.bump();
            parts.push(self.ident()?);
        }
        let span = parts[0].span.to(parts[parts.len() - 1].span);
        Ok(QualifiedName { parts, span })
    }

    fn ident(&mut self) -> PResult<Name> {
        if self.at(TokenKind::Ident) {
            let text = SmolStr::new(self.text());
            let span = self.bump();
            Ok(Name::new(text, span))
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    // =========================================================================
    // Grammar rules: statements
    // =========================================================================

    fn block(&mut self) -> PResult<Block> {
        let start = self.start();
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !self.at(TokenKind::RBrace) {
            if self.at(TokenKind::Eof) {
                return Err(self.unexpected("'}'"));
            }
            stmts.push(self.stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(Block {
            stmts,
            span: self.span_from(start),
        })
    }

    fn stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        match self.kind() {
            TokenKind::LBrace => Ok(Stmt::Block(self.block()?)),
            TokenKind::Semicolon => Ok(Stmt::Empty(self.bump())),
            TokenKind::IfKw => {
                self.bump();
                let cond = self.paren_expr()?;
                let then_branch = Box::new(self.stmt()?);
                let else_branch = if self.eat(TokenKind::ElseKw) {
                    Some(Box::new(self.stmt()?))
                } else {
                    None
                };
                Ok(Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                    span: self.span_from(start),
                })
            }
            TokenKind::WhileKw => {
                self.bump();
                let cond = self.paren_expr()?;
                let body = Box::new(self.stmt()?);
                Ok(Stmt::While {
                    cond,
                    body,
                    span: self.span_from(start),
                })
            }
            TokenKind::DoKw => {
                self.bump();
                let body = Box::new(self.stmt()?);
                self.expect(TokenKind::WhileKw)?;
                let cond = self.paren_expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::DoWhile {
                    body,
                    cond,
                    span: self.span_from(start),
                })
            }
            TokenKind::ForKw => self.for_stmt(),
            TokenKind::ReturnKw => {
                self.bump();
                let value = if self.at(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.expr()?)
                };
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Return {
                    value,
                    span: self.span_from(start),
                })
            }
            TokenKind::BreakKw => {
                self.bump();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Break(self.span_from(start)))
            }
            TokenKind::ContinueKw => {
                self.bump();
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Continue(self.span_from(start)))
            }
            TokenKind::ClassKw | TokenKind::InterfaceKw => Err(ParseError::new(
                "local type declarations are not supported",
                self.current_span(),
            )),
            _ if self.at_local_var_decl() => {
                let mut decl = self.local_var_decl()?;
                self.expect(TokenKind::Semicolon)?;
                decl.span = self.span_from(start);
                Ok(Stmt::LocalVar(decl))
            }
            _ => {
                let expr = self.expr()?;
                self.expect(TokenKind::Semicolon)?;
                Ok(Stmt::Expr {
                    expr,
                    span: self.span_from(start),
                })
            }
        }
    }

    /// ForStmt = 'for' '(' ForInit? ';' Expr? ';' ExprList? ')' Stmt
    fn for_stmt(&mut self) -> PResult<Stmt> {
        let start = self.start();
        self.expect(TokenKind::ForKw)?;
        self.expect(TokenKind::LParen)?;

        let mut init = Vec::new();
        if !self.at(TokenKind::Semicolon) {
            if self.at_local_var_decl() {
                init.push(Stmt::LocalVar(self.local_var_decl()?));
            } else {
                for expr in self.expr_list()? {
                    let span = expr.span;
                    init.push(Stmt::Expr { expr, span });
                }
            }
        }
        self.expect(TokenKind::Semicolon)?;

        let cond = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expr()?)
        };
        self.expect(TokenKind::Semicolon)?;

        let update = if self.at(TokenKind::RParen) {
            Vec::new()
        } else {
            self.expr_list()?
        };
        self.expect(TokenKind::RParen)?;

        let body = Box::new(self.stmt()?);
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
            span: self.span_from(start),
        })
    }

    fn expr_list(&mut self) -> PResult<Vec<Expr>> {
        let mut exprs = vec![self.expr()?];
        while self.eat(TokenKind::Comma) {
            exprs.push(self.expr()?);
        }
        Ok(exprs)
    }

    fn paren_expr(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::LParen)?;
        let expr = self.expr()?;
        self.expect(TokenKind::RParen)?;
        Ok(expr)
    }

    /// Lookahead: `final`, a primitive type, or `Name ([])* Ident`.
    fn at_local_var_decl(&self) -> bool {
        match self.kind() {
            TokenKind::FinalKw => true,
            kind if kind.is_primitive_type() => true,
            TokenKind::Ident => {
                let mut n = 1;
                while self.nth(n) == TokenKind::Dot && self.nth(n + 1) == TokenKind::Ident {
                    n += 2;
                }
                while self.nth(n) == TokenKind::LBracket && self.nth(n + 1) == TokenKind::RBracket
                {
                    n += 2;
                }
                self.nth(n) == TokenKind::Ident
            }
            _ => false,
        }
    }

    fn local_var_decl(&mut self) -> PResult<LocalVarDecl> {
        let start = self.start();
        let modifiers = self.local_modifiers()?;
        let ty = self.type_expr()?;
        let name = self.ident()?;
        let declarators = self.declarators_after(name)?;
        Ok(LocalVarDecl {
            modifiers,
            ty,
            declarators,
            span: self.span_from(start),
        })
    }

    // =========================================================================
    // Grammar rules: expressions
    // =========================================================================

    fn expr(&mut self) -> PResult<Expr> {
        self.assignment()
    }

    fn assignment(&mut self) -> PResult<Expr> {
        let target = self.conditional()?;
        let op = match self.kind() {
            TokenKind::Eq => AssignOp::Assign,
            TokenKind::PlusEq => AssignOp::Add,
            TokenKind::MinusEq => AssignOp::Sub,
            TokenKind::StarEq => AssignOp::Mul,
            TokenKind::SlashEq => AssignOp::Div,
            TokenKind::PercentEq => AssignOp::Rem,
            _ => return Ok(target),
        };
        if !matches!(
            target.kind,
            ExprKind::Name(_) | ExprKind::FieldAccess { .. } | ExprKind::ArrayAccess { .. }
        ) {
            return Err(ParseError::new("invalid assignment target", target.span));
        }
        self.bump();
        let value = self.assignment()?;
        let span = target.span.to(value.span);
        Ok(Expr::new(
            ExprKind::Assign {
                op,
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        ))
    }

    fn conditional(&mut self) -> PResult<Expr> {
        let cond = self.binary(1)?;
        if !self.eat(TokenKind::Question) {
            return Ok(cond);
        }
        let then_expr = self.expr()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.conditional()?;
        let span = cond.span.to(else_expr.span);
        Ok(Expr::new(
            ExprKind::Conditional {
                cond: Box::new(cond),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        ))
    }

    /// Precedence climbing over the binary operators (and `instanceof`).
    fn binary(&mut self, min_prec: u8) -> PResult<Expr> {
        const RELATIONAL: u8 = 7;
        let mut lhs = self.unary()?;
        loop {
            if self.at(TokenKind::InstanceofKw) && RELATIONAL >= min_prec {
                self.bump();
                let ty = self.type_expr()?;
                let span = lhs.span.to(ty.span());
                lhs = Expr::new(
                    ExprKind::InstanceOf {
                        expr: Box::new(lhs),
                        ty,
                    },
                    span,
                );
                continue;
            }
            let Some(op) = binary_op_for(self.kind()) else {
                break;
            };
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.binary(prec + 1)?;
            let span = lhs.span.to(rhs.span);
            lhs = Expr::new(
                ExprKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> PResult<Expr> {
        let start = self.start();
        let op = match self.kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::PlusPlus => Some(UnaryOp::PreInc),
            TokenKind::MinusMinus => Some(UnaryOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.bump();
            let operand = self.unary()?;
            return Ok(Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                self.span_from(start),
            ));
        }
        if self.at(TokenKind::LParen) && self.at_cast() {
            self.bump();
            let ty = self.type_expr()?;
            self.expect(TokenKind::RParen)?;
            let expr = self.unary()?;
            return Ok(Expr::new(
                ExprKind::Cast {
                    ty,
                    expr: Box::new(expr),
                },
                self.span_from(start),
            ));
        }
        self.postfix()
    }

    /// Lookahead at `(`: a parenthesized type followed by an operand.
    fn at_cast(&self) -> bool {
        let mut n = 1;
        let primitive = self.nth(n).is_primitive_type();
        if primitive {
            n += 1;
        } else if self.nth(n) == TokenKind::Ident {
            n += 1;
            while self.nth(n) == TokenKind::Dot && self.nth(n + 1) == TokenKind::Ident {
                n += 2;
            }
        } else {
            return false;
        }
        while self.nth(n) == TokenKind::LBracket && self.nth(n + 1) == TokenKind::RBracket {
            n += 2;
        }
        if self.nth(n) != TokenKind::RParen {
            return false;
        }
        if primitive {
            return true;
        }
        let next = self.nth(n + 1);
        next.is_literal()
            || matches!(
                next,
                TokenKind::Ident
                    | TokenKind::ThisKw
                    | TokenKind::SuperKw
                    | TokenKind::NewKw
                    | TokenKind::LParen
                    | TokenKind::Bang
                    | TokenKind::Tilde
            )
    }

    fn postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            let start = expr.span.start;
            match self.kind() {
                TokenKind::Dot => {
                    self.bump();
                    let name = self.ident()?;
                    if self.at(TokenKind::LParen) {
                        let args = self.args()?;
                        expr = Expr::new(
                            ExprKind::MethodCall {
                                receiver: Receiver::Expr(Box::new(expr)),
                                name,
                                args,
                            },
                            self.span_from(start),
                        );
                    } else {
                        expr = Expr::new(
                            ExprKind::FieldAccess {
                                target: Box::new(expr),
                                name,
                            },
                            self.span_from(start),
                        );
                    }
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = self.expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = Expr::new(
                        ExprKind::ArrayAccess {
                            array: Box::new(expr),
                            index: Box::new(index),
                        },
                        self.span_from(start),
                    );
                }
                _ => break,
            }
        }
        while let Some(op) = match self.kind() {
            TokenKind::PlusPlus => Some(UnaryOp::PostInc),
            TokenKind::MinusMinus => Some(UnaryOp::PostDec),
            _ => None,
        } {
            let start = expr.span.start;
            self.bump();
            expr = Expr::new(
                ExprKind::Unary {
                    op,
                    operand: Box::new(expr),
                },
                self.span_from(start),
            );
        }
        Ok(expr)
    }

    fn primary(&mut self) -> PResult<Expr> {
        let start = self.start();
        match self.kind() {
            kind if kind.is_literal() => {
                let text = self.text();
                let lit_kind = literal_kind(kind, text);
                let span = self.bump();
                Ok(Expr::new(
                    ExprKind::Literal(Literal {
                        kind: lit_kind,
                        text: SmolStr::new(text),
                    }),
                    span,
                ))
            }
            TokenKind::ThisKw => {
                let span = self.bump();
                if self.at(TokenKind::LParen) {
                    let args = self.args()?;
                    return Ok(Expr::new(
                        ExprKind::ConstructorCall {
                            kind: ConstructorCallKind::This,
                            args,
                        },
                        self.span_from(start),
                    ));
                }
                Ok(Expr::new(ExprKind::This, span))
            }
            TokenKind::SuperKw => {
                self.bump();
                if self.at(TokenKind::LParen) {
                    let args = self.args()?;
                    return Ok(Expr::new(
                        ExprKind::ConstructorCall {
                            kind: ConstructorCallKind::Super,
                            args,
                        },
                        self.span_from(start),
                    ));
                }
                self.expect(TokenKind::Dot)?;
                let name = self.ident()?;
                if !self.at(TokenKind::LParen) {
                    return Err(ParseError::new(
                        "field access through 'super' is not supported",
                        self.span_from(start),
                    ));
                }
                let args = self.args()?;
                Ok(Expr::new(
                    ExprKind::MethodCall {
                        receiver: Receiver::Super,
                        name,
                        args,
                    },
                    self.span_from(start),
                ))
            }
            TokenKind::NewKw => self.creation(),
            TokenKind::LParen => {
                self.bump();
                let inner = self.expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(Expr::new(
                    ExprKind::Paren(Box::new(inner)),
                    self.span_from(start),
                ))
            }
            TokenKind::Ident => {
                let first = self.ident()?;
                let mut parts = vec![first];
                // stop before `.m(` so the call keeps its receiver
                while self.at(TokenKind::Dot)
                    && self.nth(1) == TokenKind::Ident
                    && self.nth(2) != TokenKind::LParen
                {
                    self.bump();
                    parts.push(self.ident()?);
                }
                if parts.len() == 1 && self.at(TokenKind::LParen) {
                    let name = parts.remove(0);
                    let args = self.args()?;
                    return Ok(Expr::new(
                        ExprKind::MethodCall {
                            receiver: Receiver::Implicit,
                            name,
                            args,
                        },
                        self.span_from(start),
                    ));
                }
                let span = self.span_from(start);
                Ok(Expr::new(
                    ExprKind::Name(QualifiedName { parts, span }),
                    span,
                ))
            }
            _ => Err(self.unexpected("expression")),
        }
    }

    /// `new C(args)` or `new T[n]...[]`
    fn creation(&mut self) -> PResult<Expr> {
        let start = self.start();
        self.expect(TokenKind::NewKw)?;
        let element = if let Some(prim) = primitive_for(self.kind()) {
            TypeExpr::Primitive(prim, self.bump())
        } else {
            let class = self.qualified_name()?;
            if !self.at(TokenKind::LBracket) {
                let args = self.args()?;
                return Ok(Expr::new(
                    ExprKind::New { class, args },
                    self.span_from(start),
                ));
            }
            TypeExpr::Named(class)
        };

        let mut dims = Vec::new();
        while self.at(TokenKind::LBracket) && self.nth(1) != TokenKind::RBracket {
            self.bump();
            dims.push(self.expr()?);
            self.expect(TokenKind::RBracket)?;
        }
        if dims.is_empty() {
            return Err(self.unexpected("array dimension"));
        }
        let mut extra_dims = 0;
        while self.at(TokenKind::LBracket) && self.nth(1) == TokenKind::RBracket {
            self.bump();
            self.bump();
            extra_dims += 1;
        }
        Ok(Expr::new(
            ExprKind::NewArray {
                element,
                dims,
                extra_dims,
            },
            self.span_from(start),
        ))
    }

    fn args(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !self.at(TokenKind::RParen) {
            args = self.expr_list()?;
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }
}

// ============================================================================
// TOKEN MAPPINGS
// ============================================================================

fn modifier_for(kind: TokenKind) -> Option<Modifier> {
    Some(match kind {
        TokenKind::PublicKw => Modifier::Public,
        TokenKind::ProtectedKw => Modifier::Protected,
        TokenKind::PrivateKw => Modifier::Private,
        TokenKind::AbstractKw => Modifier::Abstract,
        TokenKind::StaticKw => Modifier::Static,
        TokenKind::FinalKw => Modifier::Final,
        TokenKind::SynchronizedKw => Modifier::Synchronized,
        TokenKind::NativeKw => Modifier::Native,
        TokenKind::TransientKw => Modifier::Transient,
        TokenKind::VolatileKw => Modifier::Volatile,
        TokenKind::StrictfpKw => Modifier::Strictfp,
        _ => return None,
    })
}

fn primitive_for(kind: TokenKind) -> Option<PrimitiveType> {
    Some(match kind {
        TokenKind::BooleanKw => PrimitiveType::Boolean,
        TokenKind::ByteKw => PrimitiveType::Byte,
        TokenKind::ShortKw => PrimitiveType::Short,
        TokenKind::CharKw => PrimitiveType::Char,
        TokenKind::IntKw => PrimitiveType::Int,
        TokenKind::LongKw => PrimitiveType::Long,
        TokenKind::FloatKw => PrimitiveType::Float,
        TokenKind::DoubleKw => PrimitiveType::Double,
        _ => return None,
    })
}

fn binary_op_for(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Rem,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::LtLt => BinaryOp::Shl,
        TokenKind::GtGt => BinaryOp::Shr,
        TokenKind::GtGtGt => BinaryOp::UShr,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::BangEq => BinaryOp::Ne,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Caret => BinaryOp::BitXor,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::AmpAmp => BinaryOp::And,
        TokenKind::PipePipe => BinaryOp::Or,
        _ => return None,
    })
}

fn literal_kind(kind: TokenKind, text: &str) -> LiteralKind {
    match kind {
        TokenKind::IntLiteral if text.ends_with(['l', 'L']) => LiteralKind::Long,
        TokenKind::IntLiteral => LiteralKind::Int,
        TokenKind::FloatLiteral if text.ends_with(['f', 'F']) => LiteralKind::Float,
        TokenKind::FloatLiteral => LiteralKind::Double,
        TokenKind::CharLiteral => LiteralKind::Char,
        TokenKind::StringLiteral => LiteralKind::String,
        TokenKind::TrueKw | TokenKind::FalseKw => LiteralKind::Bool,
        _ => LiteralKind::Null,
    }
}
