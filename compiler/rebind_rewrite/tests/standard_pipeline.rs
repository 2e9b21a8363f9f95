//! Whole-file rewrites through the standard pipeline.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use rebind_config::Config;
use rebind_rewrite::{standard_pipeline, Hooks, Pipeline, RewriteError};

fn hooks() -> Hooks {
    Hooks {
        dispatch: "D".into(),
        dispatch_dynamic: "DD".into(),
        dispatch_dynamic_variable: "$DD".into(),
        eval_wrapper: "E".into(),
        script_trigger: "T()".into(),
        import_rewriter: "R".into(),
        prologue: "P;".into(),
    }
}

fn pipeline(names: &[&str]) -> Pipeline {
    let config = Config {
        redefinable_internals: names.iter().map(|n| (*n).to_owned()).collect(),
        expand_magic_constants: true,
        rewrite_import_paths: true,
        ..Config::default()
    };
    standard_pipeline(&config, &hooks())
}

fn rewrite(names: &[&str], code: &str) -> String {
    pipeline(names)
        .transform_string(code, Some("/srv/app/index.php"))
        .unwrap()
}

#[test]
fn a_small_script() {
    let code = "<?php\nnamespace App;\n\nuse function strlen as len;\n\nfunction size($s) {\n    return len($s) + $count($s);\n}\n";
    let expected = "<?php\nnamespace App; T();\n\nuse function strlen as len;\n\nfunction size($s) {P;\n    return D('strlen', [$s]) + DD($count, [$s]);\n}\n";
    assert_eq!(rewrite(&["strlen"], code), expected);
}

#[test]
fn eval_of_a_dynamic_call() {
    assert_eq!(
        rewrite(&["strlen"], "<?php eval($f());"),
        "<?php T(); eval(E(DD($f, [])));"
    );
}

#[test]
fn imports_and_magic_constants() {
    assert_eq!(
        rewrite(&[], "<?php require __DIR__ . '/boot.php';"),
        "<?php T(); require R( '/srv/app' . '/boot.php');"
    );
}

#[test]
fn chained_and_indexed_dynamic_calls() {
    assert_eq!(
        rewrite(&["strlen"], "<?php $a[$b()]()();"),
        "<?php T(); DD(DD($a[DD($b, [])], []), []);"
    );
}

#[test]
fn member_and_constructor_calls_are_untouched() {
    assert_eq!(
        rewrite(&["strlen"], "<?php new $x(); $obj->$m(); $obj->strlen();"),
        "<?php T(); new $x(); $obj->$m(); $obj->strlen();"
    );
}

#[test]
fn no_redefinable_names_leaves_call_sites_alone() {
    assert_eq!(
        rewrite(&[], "<?php strlen($s); $f();"),
        "<?php T(); strlen($s); $f();"
    );
}

#[test]
fn inline_text_survives() {
    assert_eq!(
        rewrite(&["strlen"], "<p><?= strlen($s) ?></p>\n"),
        "<p><?=(T()) ?:  D('strlen', [$s]) ?></p>\n"
    );
}

#[test]
fn calls_inside_interpolated_strings() {
    assert_eq!(
        rewrite(&["strlen"], r#"<?php echo "v={$f(1)} {$a[0]()}";"#),
        r#"<?php T(); echo "v={$DD($f, [1])} {$DD($a[0], [])}";"#
    );
    assert_eq!(
        rewrite(&["strlen"], "<?php echo <<<EOT\n{$a[strlen($s)]} ${$g()}\nEOT;\n"),
        "<?php T(); echo <<<EOT\n{$a[D('strlen', [$s])]} ${DD($g, [])}\nEOT;\n"
    );
}

#[test]
fn methods_named_after_constructs() {
    assert_eq!(
        rewrite(
            &["strlen"],
            "<?php class Redis { public function eval($script) { return 1; } } $r->eval('x'); $c->require('pkg');"
        ),
        "<?php T(); class Redis { public function eval($script) {P; return 1; } } $r->eval('x'); $c->require('pkg');"
    );
}

#[test]
fn by_reference_declarations_are_not_calls() {
    assert_eq!(
        rewrite(&["strlen"], "<?php class A { function &strlen($x) { return $x; } }"),
        "<?php T(); class A { function &strlen($x) {P; return $x; } }"
    );
}

#[test]
fn attributed_functions_are_rewritten() {
    assert_eq!(
        rewrite(
            &["strlen"],
            "<?php #[Pure] function g($x) { return strlen($x) + $h(); }"
        ),
        "<?php T(); #[Pure] function g($x) {P; return D('strlen', [$x]) + DD($h, []); }"
    );
}

#[test]
fn code_after_a_commented_close_tag() {
    assert_eq!(
        rewrite(&["strlen"], "<?php // note ?><b><?php strlen($s);"),
        "<?php T(); // note ?><b><?php D('strlen', [$s]);"
    );
}

#[test]
fn structural_errors_abort_the_file() {
    let err: RewriteError = pipeline(&["strlen"])
        .transform_string("<?php strlen($s;", Some("/srv/app/bad.php"))
        .unwrap_err();
    assert_eq!(err.action, "splice_named_function_calls");
    assert_eq!(err.file.as_deref(), Some("/srv/app/bad.php"));
}

#[allow(clippy::disallowed_types, reason = "proptest macros internally use Arc")]
mod proptest_pipeline {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn text_without_open_tags_is_unchanged(text in "[^<]*") {
            prop_assert_eq!(rewrite(&["strlen"], &text), text);
        }

        #[test]
        fn code_without_calls_only_gains_the_trigger(
            body in "[xyz =+;0-9]*"
        ) {
            let code = format!("<?php {body}");
            prop_assert_eq!(rewrite(&[], &code), format!("<?php T(); {body}"));
        }
    }
}
