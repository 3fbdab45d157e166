//! Namespace merging, within one unit and across units.

mod common;
use common::{resolve, template_id};

use stencil_lang::ast::ast::{Ast, DeclKind};
use stencil_lang::context::GlobalContext;
use stencil_lang::error::CompileErrorKind;
use stencil_lang::passes::parse::Parser;
use stencil_lang::passes::resolve::{merge, NameResolver};

#[test]
fn same_unit_namespaces_merge() {
    let program = resolve(&[r#"
        namespace ns { template a() { {% A %} } }
        namespace ns { template b() { nest a } }
    "#])
    .unwrap();

    // One surviving top-level declaration, holding both members.
    assert_eq!(program.root.decls.len(), 1);
    let a = template_id(&program, "a");
    assert!(program.resolutions.refs.values().all(|&t| t == a));
}

#[test]
fn cross_unit_namespaces_merge() {
    let program = resolve(&[
        r#"namespace ns { template a() { {% A %} } }"#,
        r#"namespace ns { template b() { nest a } }"#,
    ])
    .unwrap();

    assert_eq!(program.root.decls.len(), 1);
    let a = template_id(&program, "a");
    assert!(program.resolutions.refs.values().all(|&t| t == a));
}

#[test]
fn merged_members_keep_first_unit_first() {
    let program = resolve(&[
        r#"namespace ns { template a() { {% A %} } }"#,
        r#"namespace ns { template b() { {% B %} } }"#,
    ])
    .unwrap();

    let ns = program.root.decls[0];
    let members = match &program.ast.decls.get(ns).kind {
        DeclKind::Namespace { members, .. } => members.clone(),
        other => panic!("expected namespace at root, got {:?}", other),
    };
    let names: Vec<&str> = members
        .iter()
        .map(|&m| program.gcx.interner.resolve(program.ast.decls.get(m).name()))
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn nested_namespaces_merge_recursively() {
    let program = resolve(&[
        r#"namespace a { namespace b { template t() { {% T %} } } }"#,
        r#"namespace a { namespace b { template u() { nest t } } }"#,
    ])
    .unwrap();

    assert_eq!(program.root.decls.len(), 1);
    let t = template_id(&program, "t");
    assert!(program.resolutions.refs.values().all(|&x| x == t));
}

#[test]
fn template_redefinition_across_units_is_an_error() {
    let err = resolve(&[
        r#"namespace ns { template t() { {% ONE %} } }"#,
        r#"namespace ns { template t() { {% TWO %} } }"#,
    ])
    .unwrap_err();

    assert!(matches!(err.kind, CompileErrorKind::Redefinition { .. }));
}

#[test]
fn template_and_namespace_collision_is_an_error() {
    let err = resolve(&[r#"
        namespace ns { template x() { {% X %} } namespace x { } }
    "#])
    .unwrap_err();

    assert!(matches!(err.kind, CompileErrorKind::Redefinition { .. }));
}

#[test]
fn merging_the_same_unit_twice_is_idempotent() {
    let mut gcx = GlobalContext::new();
    let mut ast = Ast::default();
    let src = r#"namespace ns { template t() { {% T %} } }"#;
    let id = gcx.sources.add("unit", src);
    let program = Parser::parse_unit(src, id, &mut ast, &mut gcx).unwrap();

    // The same declarations merged twice must resolve as if merged once.
    let merged = merge(vec![program.clone(), program]);
    let resolved = NameResolver::new(&mut ast).resolve(merged).unwrap();
    assert_eq!(resolved.root.decls.len(), 1);
}
