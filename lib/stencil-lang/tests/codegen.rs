//! Generated file shape: package dispatch, slot unrolling, nest and import
//! lowering, and the on-disk overwrite policy.

mod common;
use common::{generate, generate_with};

use stencil_lang::codegen::GenConfig;
use stencil_lang::error::CompileErrorKind;

#[test]
fn template_produces_three_files() {
    let out = generate(&[r#"
        namespace n { template t(param = {% default %}) { {% BODY %} } }
    "#])
    .unwrap();

    assert_eq!(out.len(), 3);
    assert!(out.get("n/t.h").is_some());
    assert!(out.get("n/t.contents").is_some());
    assert_eq!(out.get("n/t.body"), Some("BODY\n"));
}

#[test]
fn package_file_dispatches_on_package_number() {
    let out = generate(&[r#"
        namespace n { template t(param) { {% BODY %} } }
    "#])
    .unwrap();
    let h = out.get("n/t.h").unwrap();

    assert!(h.contains("#define param_ CONCAT(param_, STENCIL_PACKAGE, _, STENCIL_DEPTH)"));
    for k in 0..5 {
        assert!(h.contains(&format!("#if STENCIL_PACKAGE == {k}")));
        assert!(h.contains(&format!("#define param_{k}_0 param")));
        assert!(h.contains(&format!("#undef param_{k}_0")));
    }
    // Entry always includes the contents file by bare name; the package
    // file sits in the same directory.
    assert!(h.contains("#include \"t.contents\""));
    assert!(h.contains("#undef param_\n"));
    assert!(h.contains("#if STENCIL_PACKAGE >= 5"));
    assert!(h.contains("#error \"maximum number of live packages exceeded for template t\""));
}

#[test]
fn content_file_unrolls_every_slot() {
    let out = generate_with(
        &[r#"namespace n { template t() { {% BODY %} } }"#],
        GenConfig {
            max_package: 2,
            max_depth: 3,
            ..GenConfig::default()
        },
    )
    .unwrap();
    let contents = out.get("n/t.contents").unwrap();

    for k in 0..2 {
        for d in 0..3 {
            assert!(contents.contains(&format!("#define t_{k}_{d}_H 1")));
        }
    }
    assert!(!contents.contains("#if STENCIL_PACKAGE == 2"));
    assert!(contents.contains("#if STENCIL_DEPTH >= 3"));
    assert!(contents.contains("#error \"maximum template nesting depth exceeded in template t\""));
    assert!(contents.contains("#include \"t.body\""));
}

#[test]
fn recursive_self_nesting_stops_at_the_depth_bound() {
    // A template nesting itself can only unwind through the unrolled depth
    // cases; the push past the last one must land on the bound-exceeded
    // error, never on a default or defined path.
    let out = generate_with(
        &[r#"
            namespace n { template t(v = {% 0 %}) { nest t with v = {% 1 %} } }
        "#],
        GenConfig {
            max_depth: 2,
            ..GenConfig::default()
        },
    )
    .unwrap();

    let contents = out.get("n/t.contents").unwrap();
    assert!(contents.contains("#define t_0_0_H 1"));
    assert!(contents.contains("#define t_0_1_H 1"));
    assert!(!contents.contains("#define t_0_2_H"));
    assert!(contents.contains("#if STENCIL_DEPTH >= 2"));
    assert!(contents.contains("#error \"maximum template nesting depth exceeded in template t\""));

    let body = out.get("n/t.body").unwrap();
    // The self-nest re-enters the same contents file one depth below, so
    // its arguments land at depth 1 and 2 but there is no depth-2 case to
    // receive the second push.
    assert!(body.contains("#if STENCIL_DEPTH == 0"));
    assert!(body.contains("#if STENCIL_DEPTH == 1"));
    assert!(!body.contains("#if STENCIL_DEPTH == 2"));
    assert!(body.contains("#define v_0_1 1"));
    assert!(body.contains("#define v_0_2 1"));
    assert!(body.contains("#include <stencil/depth/incr.h>"));
    assert!(body.contains("#include \"n/t.contents\""));
    assert!(body.contains("#include <stencil/depth/decr.h>"));
}

#[test]
fn missing_required_argument_becomes_a_preprocessor_error() {
    let out = generate(&[r#"
        namespace n { template t(needed) { {% BODY %} } }
    "#])
    .unwrap();
    let contents = out.get("n/t.contents").unwrap();

    assert!(contents.contains("#if ! defined(needed_0_0)"));
    assert!(contents.contains("#error \"missing argument to template parameter needed_0_0\""));
    // Required parameters never get a fallback definition.
    assert!(!contents.contains("#define needed_0_0"));
}

#[test]
fn defaulted_parameter_gets_a_guarded_definition() {
    let out = generate(&[r#"
        namespace n { template t(p = {% fallback %}) { {% BODY %} } }
    "#])
    .unwrap();
    let contents = out.get("n/t.contents").unwrap();

    assert!(contents.contains("#if ! defined(p_0_0)"));
    assert!(contents.contains("#define p_0_0 fallback"));
}

#[test]
fn macro_parameters_carry_their_argument_lists() {
    let out = generate(&[r#"
        namespace n { template t(Next(node)) { {% BODY %} } }
    "#])
    .unwrap();
    let h = out.get("n/t.h").unwrap();

    assert!(h.contains("#define Next_0_0(node) Next"));
}

#[test]
fn nest_binds_arguments_one_depth_below() {
    let out = generate(&[r#"
        namespace n {
            template inner(v) { {% use v %} }
            template outer() { nest inner with v = {% 42 %} }
        }
    "#])
    .unwrap();
    let body = out.get("n/outer.body").unwrap();

    // The nested instantiation runs at depth + 1, so its arguments must be
    // planted in that slot.
    assert!(body.contains("#if STENCIL_DEPTH == 0"));
    assert!(body.contains("#define v_0_1 42"));
    assert!(body.contains("#define v_4_1 42"));
    assert!(!body.contains("#define v_0_0 42"));
    assert!(body.contains("#undef v_\n"));
    assert!(body.contains("#define v_ CONCAT(v_, STENCIL_PACKAGE, _, STENCIL_DEPTH)"));
    assert!(body.contains("#include <stencil/depth/incr.h>"));
    assert!(body.contains("#include \"n/inner.contents\""));
    assert!(body.contains("#include <stencil/depth/decr.h>"));
}

#[test]
fn positional_arguments_bind_in_declaration_order() {
    let out = generate(&[r#"
        namespace n {
            template inner(first, second) { {% B %} }
            template outer() { nest inner with {% 1 %}, {% 2 %} }
        }
    "#])
    .unwrap();
    let body = out.get("n/outer.body").unwrap();

    assert!(body.contains("#define first_0_1 1"));
    assert!(body.contains("#define second_0_1 2"));
}

#[test]
fn import_is_guarded_by_the_instantiation_marker() {
    let out = generate(&[r#"
        namespace n {
            template dep() { {% D %} }
            template user() { import dep }
        }
    "#])
    .unwrap();
    let body = out.get("n/user.body").unwrap();

    assert!(body.contains("#if CONCAT(dep_, STENCIL_PACKAGE, _, STENCIL_DEPTH, _H) != 1"));
    assert!(body.contains("#include \"n/dep.contents\""));
    assert!(body.contains("#endif"));
}

#[test]
fn cross_namespace_includes_are_root_relative() {
    let out = generate(&[r#"
        namespace a { namespace b { template dep() { {% D %} } } }
        namespace c { template user() { nest a.b.dep } }
    "#])
    .unwrap();
    let body = out.get("c/user.body").unwrap();

    assert!(body.contains("#include \"a/b/dep.contents\""));
}

#[test]
fn raw_statements_are_verbatim_and_in_order() {
    let out = generate(&[r#"
        namespace n {
            template dep() { {% D %} }
            template t() {
                {% before %}
                import dep
                {% after %}
            }
        }
    "#])
    .unwrap();
    let body = out.get("n/t.body").unwrap();

    let before = body.find("before").unwrap();
    let import = body.find("#if CONCAT(dep_").unwrap();
    let after = body.find("after").unwrap();
    assert!(before < import && import < after);
}

#[test]
fn unknown_keyword_argument_is_an_error() {
    let err = generate(&[r#"
        namespace n {
            template inner(v) { {% B %} }
            template outer() { nest inner with bogus = {% 1 %} }
        }
    "#])
    .unwrap_err();

    assert!(matches!(err.kind, CompileErrorKind::UnknownParameter { .. }));
}

#[test]
fn keyword_rebinding_a_positional_argument_is_an_error() {
    let err = generate(&[r#"
        namespace n {
            template inner(v) { {% B %} }
            template outer() { nest inner with {% 1 %}, v = {% 2 %} }
        }
    "#])
    .unwrap_err();

    assert!(matches!(err.kind, CompileErrorKind::DuplicateArgument { .. }));
}

#[test]
fn repeated_keyword_argument_is_an_error() {
    let err = generate(&[r#"
        namespace n {
            template inner(a, b) { {% B %} }
            template outer() { nest inner with a = {% 1 %}, a = {% 2 %} }
        }
    "#])
    .unwrap_err();

    assert!(matches!(err.kind, CompileErrorKind::DuplicateArgument { .. }));
}

#[test]
fn excess_positional_arguments_are_an_error() {
    let err = generate(&[r#"
        namespace n {
            template inner(v) { {% B %} }
            template outer() { nest inner with {% 1 %}, {% 2 %} }
        }
    "#])
    .unwrap_err();

    assert!(matches!(
        err.kind,
        CompileErrorKind::TooManyArguments {
            expected: 1,
            actual: 2
        }
    ));
}

#[test]
fn write_refuses_to_overwrite_without_force() {
    let out = generate(&[r#"
        namespace n { template t() { {% BODY %} } }
    "#])
    .unwrap();

    let dir = tempfile::tempdir().unwrap();
    out.write_to(dir.path(), false).unwrap();
    assert!(dir.path().join("n/t.h").exists());

    let err = out.write_to(dir.path(), false).unwrap_err();
    assert!(matches!(err.kind, CompileErrorKind::OverwriteRefused { .. }));

    out.write_to(dir.path(), true).unwrap();
}
