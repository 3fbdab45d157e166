use std::cell::RefCell;
use std::rc::Rc;

use chumsky::input::ValueInput;
use chumsky::prelude::*;

use crate::ast::ast::{
    Argument, Ast, Decl, DeclId, DeclKind, Param, Path, Ref, RefId, Stmt, StmtId, StmtKind,
};
use crate::ast::{Loc, SourceId};
use crate::context::{Interner, Symbol};
use crate::parser::lexer::Token;

type ParserError<'a> = extra::Err<Rich<'a, Token<'a>, SimpleSpan>>;

#[derive(Clone)]
pub struct AstCtx {
    pub ast: Rc<RefCell<Ast>>,
    pub interner: Rc<RefCell<Interner>>,
    pub source_id: SourceId,
}

impl AstCtx {
    pub fn intern(&self, ident: &str) -> Symbol {
        self.interner.borrow_mut().intern(ident)
    }

    /// Convert a SimpleSpan to a Loc with this context's source_id
    pub fn to_loc(&self, span: SimpleSpan) -> Loc {
        Loc::new(self.source_id, span.into_range())
    }

    pub fn alloc_decl(&self, kind: DeclKind, loc: Loc) -> DeclId {
        self.ast.borrow_mut().decls.alloc(Decl { loc, kind })
    }

    pub fn alloc_stmt(&self, kind: StmtKind, loc: Loc) -> StmtId {
        self.ast.borrow_mut().stmts.alloc(Stmt { loc, kind })
    }

    pub fn alloc_ref(&self, path: Path, loc: Loc) -> RefId {
        self.ast.borrow_mut().refs.alloc(Ref { loc, path })
    }
}

/// Strip the `{%` / `%}` delimiters from a raw token and trim the payload.
fn raw_payload(slice: &str) -> String {
    slice[2..slice.len() - 2].trim().to_string()
}

fn parse_symbol<'a, I>(ctx: &'a AstCtx) -> impl Parser<'a, I, Symbol, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    select! { Token::Identifier(ident) => ctx.intern(ident) }
}

/// A value position: either a raw block or a bare identifier. Covers
/// parameter defaults and statement arguments, both of which end up as
/// uninterpreted C text.
fn parse_value<'a, I>() -> impl Parser<'a, I, String, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    select! {
        Token::Raw(slice) => raw_payload(slice),
        Token::Identifier(ident) => ident.to_string(),
    }
}

fn parse_path<'a, I>(ctx: &'a AstCtx) -> impl Parser<'a, I, Path, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    parse_symbol(ctx)
        .then(
            just(Token::Dot)
                .ignore_then(parse_symbol(ctx))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .map(|(first, rest)| {
            if rest.is_empty() {
                Path::Simple(first)
            } else {
                let mut path = vec![first];
                path.extend(rest);
                Path::Qualified(path)
            }
        })
}

fn parse_reference<'a, I>(ctx: &'a AstCtx) -> impl Parser<'a, I, RefId, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    parse_path(ctx).map_with(|path, e| ctx.alloc_ref(path, ctx.to_loc(e.span())))
}

/// The macro-parameter list after a parameter or keyword-argument name,
/// e.g. `NodeNext(node)`. Its presence marks a function-like macro.
fn parse_macro_params<'a, I>(
    ctx: &'a AstCtx,
) -> impl Parser<'a, I, Option<Vec<Symbol>>, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    parse_symbol(ctx)
        .separated_by(just(Token::Comma))
        .collect::<Vec<_>>()
        .delimited_by(just(Token::LParen), just(Token::RParen))
        .or_not()
}

fn parse_param<'a, I>(ctx: &'a AstCtx) -> impl Parser<'a, I, Param, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    parse_symbol(ctx)
        .then(parse_macro_params(ctx))
        .then(just(Token::Eq).ignore_then(parse_value()).or_not())
        .map_with(|((name, macro_params), default), e| Param {
            loc: ctx.to_loc(e.span()),
            name,
            macro_params,
            default,
        })
}

fn parse_argument<'a, I>(ctx: &'a AstCtx) -> impl Parser<'a, I, Argument, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    // Keyword form first; it backtracks to positional when no `=` follows.
    let keyword = parse_symbol(ctx)
        .then(parse_macro_params(ctx))
        .then_ignore(just(Token::Eq))
        .then(parse_value())
        .map_with(|((name, macro_params), value), e| Argument {
            loc: ctx.to_loc(e.span()),
            name: Some(name),
            macro_params,
            value,
        });

    let positional = parse_value().map_with(|value, e| Argument {
        loc: ctx.to_loc(e.span()),
        name: None,
        macro_params: None,
        value,
    });

    keyword.or(positional)
}

/// The optional `with arg, ...` clause of a nest or import statement.
fn parse_with_args<'a, I>(
    ctx: &'a AstCtx,
) -> impl Parser<'a, I, Vec<Argument>, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    just(Token::With)
        .ignore_then(
            parse_argument(ctx)
                .separated_by(just(Token::Comma))
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .or_not()
        .map(Option::unwrap_or_default)
}

fn parse_stmt<'a, I>(ctx: &'a AstCtx) -> impl Parser<'a, I, StmtId, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    let raw = select! { Token::Raw(slice) => raw_payload(slice) }
        .map_with(|text, e| ctx.alloc_stmt(StmtKind::Raw(text), ctx.to_loc(e.span())));

    let refs = parse_reference(ctx)
        .separated_by(just(Token::Comma))
        .at_least(1)
        .collect::<Vec<_>>();

    let import = just(Token::Import)
        .ignore_then(refs.clone())
        .then(parse_with_args(ctx))
        .map_with(|(refs, args), e| {
            ctx.alloc_stmt(StmtKind::Import { refs, args }, ctx.to_loc(e.span()))
        });

    let nest = just(Token::Nest)
        .ignore_then(refs)
        .then(parse_with_args(ctx))
        .map_with(|(refs, args), e| {
            ctx.alloc_stmt(StmtKind::Nest { refs, args }, ctx.to_loc(e.span()))
        });

    choice((raw, import, nest))
}

pub fn parse_decl<'a, I>(ctx: &'a AstCtx) -> impl Parser<'a, I, DeclId, ParserError<'a>> + Clone
where
    I: ValueInput<'a, Token = Token<'a>, Span = SimpleSpan>,
{
    recursive(|decl| {
        let namespace = just(Token::Namespace)
            .ignore_then(parse_symbol(ctx))
            .then(
                decl.repeated()
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LBrace), just(Token::RBrace)),
            )
            .map_with(|(name, members), e| {
                ctx.alloc_decl(DeclKind::Namespace { name, members }, ctx.to_loc(e.span()))
            });

        let params = parse_param(ctx)
            .separated_by(just(Token::Comma))
            .collect::<Vec<_>>()
            .delimited_by(just(Token::LParen), just(Token::RParen))
            .or_not()
            .map(Option::unwrap_or_default);

        let template = just(Token::Template)
            .ignore_then(parse_symbol(ctx))
            .then(params)
            .then(
                parse_stmt(ctx)
                    .repeated()
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LBrace), just(Token::RBrace)),
            )
            .map_with(|((name, params), body), e| {
                ctx.alloc_decl(
                    DeclKind::Template { name, params, body },
                    ctx.to_loc(e.span()),
                )
            });

        namespace.or(template)
    })
}
