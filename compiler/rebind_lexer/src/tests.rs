use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).into_iter().map(|t| t.kind).collect()
}

fn significant(source: &str) -> Vec<(TokenKind, String)> {
    lex(source)
        .into_iter()
        .filter(|t| !t.kind.is_trivia())
        .map(|t| (t.kind, t.text))
        .collect()
}

fn rejoin(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

// === Modes ===

#[test]
fn source_without_open_tag_is_inline() {
    assert_eq!(kinds("just text"), vec![TokenKind::InlineHtml]);
}

#[test]
fn open_tag_takes_one_whitespace() {
    let tokens = lex("<?php  echo");
    assert_eq!(tokens[0].kind, TokenKind::OpenTag);
    assert_eq!(tokens[0].text, "<?php ");
    assert_eq!(tokens[1].kind, TokenKind::Whitespace);
    assert_eq!(tokens[1].text, " ");
}

#[test]
fn open_tag_is_case_insensitive() {
    assert_eq!(lex("<?PHP\n$a;")[0].kind, TokenKind::OpenTag);
}

#[test]
fn open_tag_needs_trailing_whitespace() {
    assert_eq!(kinds("<?phpx"), vec![TokenKind::InlineHtml]);
    assert_eq!(kinds("<?php"), vec![TokenKind::OpenTag]);
}

#[test]
fn echo_tag_and_close_tag() {
    let tokens = lex("a<?= $x ?>\nb");
    let got: Vec<_> = tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();
    assert_eq!(
        got,
        vec![
            (TokenKind::InlineHtml, "a"),
            (TokenKind::OpenTagWithEcho, "<?="),
            (TokenKind::Whitespace, " "),
            (TokenKind::Variable, "$x"),
            (TokenKind::Whitespace, " "),
            (TokenKind::CloseTag, "?>\n"),
            (TokenKind::InlineHtml, "b"),
        ]
    );
}

#[test]
fn multiple_code_blocks() {
    let source = "<?php $a ?>mid<?php $b;";
    let got = kinds(source);
    assert_eq!(got.iter().filter(|k| **k == TokenKind::OpenTag).count(), 2);
    assert_eq!(got.iter().filter(|k| **k == TokenKind::InlineHtml).count(), 1);
}

// === Code tokens ===

#[test]
fn call_expression_tokens() {
    assert_eq!(
        significant("<?php strlen($x);"),
        vec![
            (TokenKind::OpenTag, "<?php ".to_string()),
            (TokenKind::Ident, "strlen".to_string()),
            (TokenKind::LParen, "(".to_string()),
            (TokenKind::Variable, "$x".to_string()),
            (TokenKind::RParen, ")".to_string()),
            (TokenKind::Semicolon, ";".to_string()),
        ]
    );
}

#[test]
fn keywords_are_classified() {
    let got = significant("<?php namespace A; use function B\\c as d; function f() {}");
    let kinds: Vec<_> = got.iter().map(|(k, _)| *k).collect();
    assert!(kinds.contains(&TokenKind::Namespace));
    assert!(kinds.contains(&TokenKind::Use));
    assert!(kinds.contains(&TokenKind::Function));
    assert!(kinds.contains(&TokenKind::As));
    assert!(kinds.contains(&TokenKind::NsSeparator));
}

#[test]
fn member_access_operators() {
    let got: Vec<_> = significant("<?php $a->b; $a?->b; A::b;")
        .into_iter()
        .map(|(k, _)| k)
        .filter(|k| {
            matches!(
                k,
                TokenKind::Arrow | TokenKind::NullsafeArrow | TokenKind::DoubleColon
            )
        })
        .collect();
    assert_eq!(
        got,
        vec![
            TokenKind::Arrow,
            TokenKind::NullsafeArrow,
            TokenKind::DoubleColon
        ]
    );
}

#[test]
fn operators_use_longest_match() {
    let got = significant("<?php $a === $b ?? $c <=> $d;");
    let ops: Vec<_> = got
        .iter()
        .filter(|(k, _)| *k == TokenKind::Operator)
        .map(|(_, t)| t.as_str())
        .collect();
    assert_eq!(ops, vec!["===", "??", "<=>"]);
}

#[test]
fn doc_comment_vs_comment() {
    assert_eq!(
        kinds("<?php /** doc */ /**/ /* c */ // line\n# hash"),
        vec![
            TokenKind::OpenTag,
            TokenKind::DocComment,
            TokenKind::Whitespace,
            TokenKind::Comment,
            TokenKind::Whitespace,
            TokenKind::Comment,
            TokenKind::Whitespace,
            TokenKind::Comment,
            TokenKind::Whitespace,
            TokenKind::Comment,
        ]
    );
}

#[test]
fn strings_are_opaque() {
    let got = significant(r#"<?php "a $b (c)" . 'd\'e';"#);
    assert_eq!(got[1], (TokenKind::String, r#""a $b (c)""#.to_string()));
    assert_eq!(got[3], (TokenKind::String, r"'d\'e'".to_string()));
}

// === Interpolation ===

/// Every token after the open tag, trivia included.
fn pieces(source: &str) -> Vec<(TokenKind, String)> {
    lex(source)
        .into_iter()
        .skip(1)
        .map(|t| (t.kind, t.text))
        .collect()
}

fn owned(expected: &[(TokenKind, &str)]) -> Vec<(TokenKind, String)> {
    expected.iter().map(|(k, t)| (*k, (*t).to_string())).collect()
}

#[test]
fn curly_interpolation_is_lexed_as_code() {
    assert_eq!(
        pieces(r#"<?php "v={$f(1)} x""#),
        owned(&[
            (TokenKind::StringPart, "\"v="),
            (TokenKind::CurlyOpen, "{"),
            (TokenKind::Variable, "$f"),
            (TokenKind::LParen, "("),
            (TokenKind::Number, "1"),
            (TokenKind::RParen, ")"),
            (TokenKind::RBrace, "}"),
            (TokenKind::StringPart, " x\""),
        ])
    );
}

#[test]
fn dollar_brace_interpolation_is_lexed_as_code() {
    assert_eq!(
        pieces(r#"<?php "${$n}""#),
        owned(&[
            (TokenKind::StringPart, "\""),
            (TokenKind::Dollar, "$"),
            (TokenKind::LBrace, "{"),
            (TokenKind::Variable, "$n"),
            (TokenKind::RBrace, "}"),
            (TokenKind::StringPart, "\""),
        ])
    );
}

#[test]
fn quotes_inside_interpolation_do_not_end_the_string() {
    let got = pieces(r#"<?php "a{$x["k"]}b";"#);
    assert_eq!(
        got[3..].to_vec(),
        owned(&[
            (TokenKind::LBracket, "["),
            (TokenKind::String, r#""k""#),
            (TokenKind::RBracket, "]"),
            (TokenKind::RBrace, "}"),
            (TokenKind::StringPart, "b\""),
            (TokenKind::Semicolon, ";"),
        ])
    );
}

#[test]
fn nested_braces_stay_inside_the_interpolation() {
    let got = pieces(r#"<?php "{$a[${'k'}]}.""#);
    let kinds: Vec<_> = got.iter().map(|(k, _)| *k).collect();
    assert_eq!(kinds[..2].to_vec(), vec![TokenKind::StringPart, TokenKind::CurlyOpen]);
    assert_eq!(
        got.last(),
        Some(&(TokenKind::StringPart, ".\"".to_string()))
    );
}

#[test]
fn escaped_or_bare_braces_do_not_interpolate() {
    for code in [r#"<?php "\{$x}""#, r#"<?php "\${x}""#, r#"<?php "{ $x } $y""#] {
        let got = pieces(code);
        assert_eq!(got.len(), 1, "{code}");
        assert_eq!(got[0].0, TokenKind::String);
    }
}

#[test]
fn heredoc_interpolation_is_lexed_as_code() {
    let got = pieces("<?php <<<EOT\nv={$f()}\nEOT;\n");
    assert_eq!(
        got,
        owned(&[
            (TokenKind::StringPart, "<<<EOT\nv="),
            (TokenKind::CurlyOpen, "{"),
            (TokenKind::Variable, "$f"),
            (TokenKind::LParen, "("),
            (TokenKind::RParen, ")"),
            (TokenKind::RBrace, "}"),
            (TokenKind::StringPart, "\nEOT"),
            (TokenKind::Semicolon, ";"),
            (TokenKind::Whitespace, "\n"),
        ])
    );
}

#[test]
fn nowdoc_never_interpolates() {
    let got = pieces("<?php <<<'EOT'\n{$f()}\nEOT;");
    assert_eq!(got[0].0, TokenKind::Heredoc);
    assert_eq!(got[0].1, "<<<'EOT'\n{$f()}\nEOT");
}

#[test]
fn interpolated_lines_are_tracked() {
    let tokens = lex("<?php \"a\n{$b}\n\";\n$c;");
    let b = tokens.iter().find(|t| t.text == "$b");
    let c = tokens.iter().find(|t| t.text == "$c");
    assert_eq!(b.map(|t| t.line), Some(2));
    assert_eq!(c.map(|t| t.line), Some(4));
}

// === Attributes and comments ===

#[test]
fn attributes_are_brackets_not_comments() {
    assert_eq!(
        significant("<?php #[Pure] function g() {}")[1..4].to_vec(),
        owned(&[
            (TokenKind::AttributeOpen, "#["),
            (TokenKind::Ident, "Pure"),
            (TokenKind::RBracket, "]"),
        ])
    );
}

#[test]
fn line_comments_end_at_close_tag() {
    assert_eq!(
        pieces("<?php // c ?>text <?php # d ?>"),
        owned(&[
            (TokenKind::Comment, "// c "),
            (TokenKind::CloseTag, "?>"),
            (TokenKind::InlineHtml, "text "),
            (TokenKind::OpenTag, "<?php "),
            (TokenKind::Comment, "# d "),
            (TokenKind::CloseTag, "?>"),
        ])
    );
}

// === Keywords in name position ===

#[test]
fn reserved_words_name_members_and_functions() {
    for code in [
        "<?php $r->eval('x');",
        "<?php $r?->include($p);",
        "<?php Redis::require($p);",
        "<?php function eval($s) {}",
        "<?php function &require() {}",
    ] {
        let got = significant(code);
        assert!(
            got.iter()
                .any(|(k, t)| *k == TokenKind::Ident
                    && matches!(t.as_str(), "eval" | "include" | "require")),
            "{code}"
        );
    }
}

#[test]
fn reserved_words_elsewhere_stay_keywords() {
    let got = significant("<?php use function Lib\\f; eval($c); $a & require 'x';");
    let kinds: Vec<_> = got.iter().map(|(k, _)| *k).collect();
    assert!(kinds.contains(&TokenKind::Function));
    assert!(kinds.contains(&TokenKind::Eval));
    assert!(kinds.contains(&TokenKind::Require));
}

#[test]
fn heredoc_spans_to_closing_label() {
    let source = "<?php $x = <<<EOT\nline (\n  EOT;\n";
    let got = significant(source);
    assert_eq!(got[3], (TokenKind::Heredoc, "<<<EOT\nline (\n  EOT".to_string()));
    assert_eq!(got[4].0, TokenKind::Semicolon);
}

#[test]
fn nowdoc_with_quoted_label() {
    let got = significant("<?php <<<'RAW'\n$not_a_var\nRAW;");
    assert_eq!(got[1].0, TokenKind::Heredoc);
}

#[test]
fn magic_constants() {
    let got = significant("<?php __DIR__ . __file__;");
    assert_eq!(got[1].0, TokenKind::MagicDir);
    assert_eq!(got[3].0, TokenKind::MagicFile);
}

#[test]
fn bare_dollar_and_variable() {
    let got = significant("<?php $$name; ${'x'};");
    assert_eq!(got[1].0, TokenKind::Dollar);
    assert_eq!(got[2].0, TokenKind::Variable);
    assert_eq!(got[4].0, TokenKind::Dollar);
    assert_eq!(got[5].0, TokenKind::LBrace);
}

#[test]
fn unknown_bytes_become_other() {
    let tokens = lex("<?php é;");
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Other));
    assert_eq!(rejoin(&tokens), "<?php é;");
}

// === Lines ===

#[test]
fn lines_are_tracked() {
    let tokens = lex("<?php\n$a;\n\n$b;");
    let a = tokens.iter().find(|t| t.text == "$a");
    let b = tokens.iter().find(|t| t.text == "$b");
    assert_eq!(a.map(|t| t.line), Some(2));
    assert_eq!(b.map(|t| t.line), Some(4));
}

// === Losslessness ===

#[test]
fn lossless_on_mixed_input() {
    let source = "<html>\n<?php\nnamespace A\\B;\n/** d */\nfunction f(&$x): int { return $x ?-> y; }\n?>\n</html>";
    assert_eq!(rejoin(&lex(source)), source);
}

#[allow(
    clippy::disallowed_types,
    reason = "proptest macros internally use Arc"
)]
mod proptest_lossless {
    use super::{lex, rejoin};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn any_input_roundtrips(source in "\\PC*") {
            let code = format!("<?php {source}");
            prop_assert_eq!(rejoin(&lex(&code)), code);
        }

        #[test]
        fn code_like_input_roundtrips(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("$a"), Just("f"), Just("("), Just(")"), Just("["), Just("]"),
                    Just("{"), Just("}"), Just(" "), Just("\n"), Just("->"), Just("::"),
                    Just("\\"), Just("'s'"), Just("\""), Just("/*"), Just("*/"), Just("?>"),
                    Just("<?php "), Just("<<<E\n"), Just("E"), Just(";"),
                    Just("{$"), Just("${"), Just("#["), Just("#"), Just("//"),
                ],
                0..64,
            )
        ) {
            let code = format!("<?php {}", parts.concat());
            prop_assert_eq!(rejoin(&lex(&code)), code);
        }
    }
}
