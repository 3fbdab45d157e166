//! Parse pass
//!
//! Tokenizes one translation unit with Logos, runs the Chumsky grammar over
//! the token stream, and validates the ordering rules the grammar itself
//! does not enforce.

use std::cell::RefCell;
use std::rc::Rc;

use chumsky::input::{Input, Stream};
use chumsky::prelude::*;
use chumsky::Parser as ChumskyParser;
use logos::Logos;

use crate::ast::ast::{Argument, Ast, DeclId, DeclKind, Param, Program, StmtKind};
use crate::ast::{Loc, SourceId};
use crate::context::GlobalContext;
use crate::error::{CompileError, CompileErrorKind};
use crate::parser::grammar::{parse_decl, AstCtx};
use crate::parser::lexer::Token;

pub struct Parser;

impl Parser {
    /// Parse one translation unit into the shared arenas. The returned
    /// `Program` lists the unit's top-level declarations.
    pub fn parse_unit(
        src: &str,
        source_id: SourceId,
        ast: &mut Ast,
        gcx: &mut GlobalContext,
    ) -> Result<Program, CompileError> {
        let mut tokens = Vec::new();
        for (result, span) in Token::lexer(src).spanned() {
            match result {
                Ok(token) => tokens.push((token, SimpleSpan::from(span))),
                Err(()) => {
                    return Err(CompileError::new(
                        CompileErrorKind::Parse("unrecognized token".to_string()),
                        Loc::new(source_id, span),
                    ));
                }
            }
        }

        let shared_ast = Rc::new(RefCell::new(std::mem::take(ast)));
        let shared_interner = Rc::new(RefCell::new(std::mem::take(&mut gcx.interner)));

        let ctx = AstCtx {
            ast: shared_ast.clone(),
            interner: shared_interner.clone(),
            source_id,
        };

        let ctx_for_parser = ctx.clone();
        let parser = parse_decl(&ctx_for_parser)
            .repeated()
            .collect::<Vec<_>>();

        // Map each token to its byte span so diagnostics point into the
        // source text rather than at token indices.
        let stream = Stream::from_iter(tokens.into_iter())
            .map((0..src.len()).into(), |(t, s): (_, _)| (t, s));

        let result = parser.parse(stream).into_result();

        *ast = std::mem::take(&mut *shared_ast.borrow_mut());
        gcx.interner = std::mem::take(&mut *shared_interner.borrow_mut());

        match result {
            Ok(decls) => {
                let program = Program { decls };
                Self::check_orderings(&program, ast)?;
                Ok(program)
            }
            Err(errors) => {
                // Chumsky reports every alternative; the first is enough.
                let err = match errors.into_iter().next() {
                    Some(err) => err,
                    None => {
                        return Err(CompileError::internal(
                            "parse",
                            "parser failed without an error",
                            Loc::new(source_id, 0..src.len()),
                        ));
                    }
                };
                Err(CompileError::new(
                    CompileErrorKind::Parse(err.to_string()),
                    Loc::new(source_id, err.span().into_range()),
                ))
            }
        }
    }

    /// The grammar accepts any interleaving of defaulted parameters and
    /// keyword arguments; the ordering rules live here.
    fn check_orderings(program: &Program, ast: &Ast) -> Result<(), CompileError> {
        for decl in &program.decls {
            Self::check_decl(*decl, ast)?;
        }
        Ok(())
    }

    fn check_decl(id: DeclId, ast: &Ast) -> Result<(), CompileError> {
        match &ast.decls.get(id).kind {
            DeclKind::Namespace { members, .. } => {
                for member in members {
                    Self::check_decl(*member, ast)?;
                }
            }
            DeclKind::Template { params, body, .. } => {
                Self::check_params(params)?;
                for stmt in body {
                    match &ast.stmts.get(*stmt).kind {
                        StmtKind::Import { args, .. } | StmtKind::Nest { args, .. } => {
                            Self::check_args(args)?;
                        }
                        StmtKind::Raw(_) => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn check_params(params: &[Param]) -> Result<(), CompileError> {
        let mut seen_default = false;
        for param in params {
            if param.default.is_some() {
                seen_default = true;
            } else if seen_default {
                return Err(CompileError::new(
                    CompileErrorKind::NonDefaultAfterDefault { name: param.name },
                    param.loc.clone(),
                ));
            }
        }
        Ok(())
    }

    fn check_args(args: &[Argument]) -> Result<(), CompileError> {
        let mut seen_keyword = false;
        for arg in args {
            if arg.is_keyword() {
                seen_keyword = true;
            } else if seen_keyword {
                return Err(CompileError::new(
                    CompileErrorKind::PositionalAfterKeyword,
                    arg.loc.clone(),
                ));
            }
        }
        Ok(())
    }
}
