#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;

fn apply(action: &impl Action, code: &str) -> String {
    let mut source = TokenSource::parse(code);
    action.apply(&mut source).unwrap();
    source.to_text()
}

// === wrap_unary_construct_arguments ===

#[test]
fn parenthesized_argument_is_wrapped_inside_the_parens() {
    let wrap = wrap_unary_construct_arguments(TokenKind::Eval, "W");
    assert_eq!(apply(&wrap, "<?php eval($code);"), "<?php eval(W($code));");
    assert_eq!(
        apply(&wrap, "<?php eval ( 'a' . $b );"),
        "<?php eval (W( 'a' . $b ));"
    );
}

#[test]
fn bare_argument_is_wrapped_to_the_end_of_the_expression() {
    let wrap = wrap_unary_construct_arguments(TokenKind::Include, "W");
    assert_eq!(
        apply(&wrap, "<?php include 'a.php';"),
        "<?php include W('a.php');"
    );
    assert_eq!(
        apply(&wrap, "<?php f(include 'a', 2);"),
        "<?php f(include W('a'), 2);"
    );
    assert_eq!(apply(&wrap, "<?php f(include 'a');"), "<?php f(include W('a'));");
    assert_eq!(apply(&wrap, "<?php include $p ?>x"), "<?php include W($p )?>x");
}

#[test]
fn bare_argument_ends_at_its_own_level() {
    let wrap = wrap_unary_construct_arguments(TokenKind::Include, "W");
    assert_eq!(
        apply(&wrap, "<?php include path('a', 'b');"),
        "<?php include W(path('a', 'b'));"
    );
    assert_eq!(
        apply(&wrap, r#"<?php include "{$d}/a.php", 2;"#),
        r#"<?php include W("{$d}/a.php"), 2;"#
    );
}

#[test]
fn member_names_are_not_constructs() {
    let wrap = wrap_unary_construct_arguments(TokenKind::Eval, "W");
    for code in [
        "<?php $r->eval('x');",
        "<?php $r?->eval('x');",
        "<?php Redis::eval('x');",
        "<?php class Redis { public function eval($script) {} }",
    ] {
        assert_eq!(apply(&wrap, code), code);
    }
}

#[test]
fn every_occurrence_is_wrapped() {
    let wrap = wrap_unary_construct_arguments(TokenKind::Eval, "W");
    assert_eq!(
        apply(&wrap, "<?php eval($a); eval(eval($b));"),
        "<?php eval(W($a)); eval(W(eval(W($b))));"
    );
}

#[test]
fn later_wrappers_nest_inside_earlier_ones() {
    let mut source = TokenSource::parse("<?php eval($c);");
    wrap_unary_construct_arguments(TokenKind::Eval, "A")
        .apply(&mut source)
        .unwrap();
    wrap_unary_construct_arguments(TokenKind::Eval, "B")
        .apply(&mut source)
        .unwrap();
    assert_eq!(source.to_text(), "<?php eval(A(B($c)));");
}

#[test]
fn construct_at_end_of_input_fails() {
    let mut source = TokenSource::parse("<?php eval");
    let err = wrap_unary_construct_arguments(TokenKind::Eval, "W")
        .apply(&mut source)
        .unwrap_err();
    assert!(matches!(err, StructuralError::UnexpectedEnd { .. }));
}

#[test]
fn unbalanced_argument_fails() {
    let mut source = TokenSource::parse("<?php eval($c;");
    let err = wrap_unary_construct_arguments(TokenKind::Eval, "W")
        .apply(&mut source)
        .unwrap_err();
    assert!(matches!(err, StructuralError::UnmatchedBracket { .. }));
}

// === inject_false_expression_at_beginnings ===

#[test]
fn statement_follows_the_open_tag() {
    let inject = inject_false_expression_at_beginnings("T()");
    assert_eq!(apply(&inject, "<?php echo 1;"), "<?php T(); echo 1;");
    assert_eq!(apply(&inject, "<html><?php\nf();"), "<html><?php\nT(); f();");
}

#[test]
fn only_the_first_tag_is_considered() {
    let inject = inject_false_expression_at_beginnings("T()");
    assert_eq!(
        apply(&inject, "<?php f(); ?>x<?php g();"),
        "<?php T(); f(); ?>x<?php g();"
    );
}

#[test]
fn echo_tags_get_a_short_ternary() {
    let inject = inject_false_expression_at_beginnings("T()");
    assert_eq!(apply(&inject, "<?= $x ?>"), "<?=(T()) ?:  $x ?>");
}

#[test]
fn declare_and_namespace_stay_first() {
    let inject = inject_false_expression_at_beginnings("T()");
    assert_eq!(
        apply(&inject, "<?php declare(strict_types=1); f();"),
        "<?php declare(strict_types=1); T(); f();"
    );
    assert_eq!(
        apply(&inject, "<?php namespace App; f();"),
        "<?php namespace App; T(); f();"
    );
    assert_eq!(
        apply(&inject, "<?php declare(strict_types=1);\nnamespace App { f(); }"),
        "<?php declare(strict_types=1);\nnamespace App { T(); f(); }"
    );
}

#[test]
fn relative_namespace_call_is_not_a_declaration() {
    let inject = inject_false_expression_at_beginnings("T()");
    assert_eq!(
        apply(&inject, "<?php namespace\\f();"),
        "<?php T(); namespace\\f();"
    );
}

#[test]
fn sources_without_tags_are_untouched() {
    let inject = inject_false_expression_at_beginnings("T()");
    assert_eq!(apply(&inject, "just text"), "just text");
    assert_eq!(apply(&inject, ""), "");
}

#[test]
fn malformed_declare_fails() {
    let mut source = TokenSource::parse("<?php declare strict;");
    let err = inject_false_expression_at_beginnings("T()")
        .apply(&mut source)
        .unwrap_err();
    assert!(matches!(
        err,
        StructuralError::Unexpected {
            found: TokenKind::Ident,
            ..
        }
    ));
}

// === prepend_code_to_functions ===

#[test]
fn named_functions_and_methods_get_the_code() {
    let prepend = prepend_code_to_functions("P;");
    assert_eq!(
        apply(&prepend, "<?php function f($a) { return $a; }"),
        "<?php function f($a) {P; return $a; }"
    );
    assert_eq!(
        apply(
            &prepend,
            "<?php class C { public static function &m(): int { return 1; } }"
        ),
        "<?php class C { public static function &m(): int {P; return 1; } }"
    );
}

#[test]
fn reserved_word_method_names_count() {
    let prepend = prepend_code_to_functions("P;");
    assert_eq!(
        apply(&prepend, "<?php class C { function new() {} }"),
        "<?php class C { function new() {P;} }"
    );
    assert_eq!(
        apply(&prepend, "<?php class R { function eval($s) {} function &require() {} }"),
        "<?php class R { function eval($s) {P;} function &require() {P;} }"
    );
}

#[test]
fn attributed_functions_get_the_code() {
    let prepend = prepend_code_to_functions("P;");
    assert_eq!(
        apply(&prepend, "<?php #[Pure] function g() { return 1; }"),
        "<?php #[Pure] function g() {P; return 1; }"
    );
    assert_eq!(
        apply(&prepend, "<?php #[A(['x' => 1])]\nfunction g() {}"),
        "<?php #[A(['x' => 1])]\nfunction g() {P;}"
    );
}

#[test]
fn closures_abstract_methods_and_imports_are_skipped() {
    let prepend = prepend_code_to_functions("P;");
    for code in [
        "<?php $f = function ($x) use ($y) { return $x; };",
        "<?php $f = function &() { return $x; };",
        "<?php $f = fn($x) => $x;",
        "<?php interface I { function m(); }",
        "<?php abstract class A { abstract function m(): void; }",
        "<?php use function A\\b;",
    ] {
        assert_eq!(apply(&prepend, code), code);
    }
}
