#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use crate::action::action;
use pretty_assertions::assert_eq;
use rebind_source::SpliceMode;

fn config(names: &[&str]) -> Config {
    Config {
        redefinable_internals: names.iter().map(|n| (*n).to_owned()).collect(),
        ..Config::default()
    }
}

#[test]
fn standard_order_follows_the_config() {
    let hooks = Hooks::default();
    let minimal = standard_pipeline(&Config::default(), &hooks);
    assert_eq!(
        minimal.action_names().collect::<Vec<_>>(),
        vec![
            "propagate_through_eval",
            "inject_script_beginning_triggers",
            "inject_call_interception_code",
            "splice_named_function_calls",
            "splice_dynamic_calls",
        ]
    );

    let full = standard_pipeline(
        &Config {
            expand_magic_constants: true,
            rewrite_import_paths: true,
            ..Config::default()
        },
        &hooks,
    );
    assert_eq!(full.len(), 7);
    assert_eq!(
        full.action_names().nth(1),
        Some("propagate_through_import_paths")
    );
    assert_eq!(
        full.action_names().nth(2),
        Some("expand_magic_filesystem_constants")
    );
}

#[test]
fn actions_run_in_registration_order() {
    let mut pipeline = Pipeline::new();
    pipeline
        .register(action("first", |s| s.splice("a", 1, 0, SpliceMode::AppendAtEnd)))
        .register(action("second", |s| s.splice("b", 1, 0, SpliceMode::AppendAtEnd)));
    assert_eq!(pipeline.transform_string("<?php x", None).unwrap(), "<?php abx");
}

#[test]
fn transform_applies_the_splices() {
    let mut pipeline = Pipeline::new();
    pipeline.register(action("upper", |s| {
        s.splice("Y", 1, 1, SpliceMode::Replace)
    }));
    let mut source = TokenSource::parse("<?php x;");
    pipeline.transform(&mut source).unwrap();
    assert_eq!(source.pending(), 0);
    assert_eq!(source.to_text(), "<?php Y;");
}

#[test]
fn failures_name_the_action_and_file() {
    let mut pipeline = Pipeline::new();
    pipeline
        .register(action("fine", |_| Ok(())))
        .register(action("broken", |s| s.match_bracket(1).map(drop)));
    let err = pipeline
        .transform_string("<?php x", Some("/app/a.php"))
        .unwrap_err();
    assert_eq!(err.action, "broken");
    assert_eq!(err.file.as_deref(), Some("/app/a.php"));
    assert!(matches!(err.source, StructuralError::NotABracket { .. }));
    assert_eq!(
        err.to_string(),
        "broken failed on /app/a.php: identifier on line 1 is not a bracket"
    );
}

#[test]
fn failures_leave_the_source_unapplied() {
    let mut pipeline = Pipeline::new();
    pipeline
        .register(action("edit", |s| s.splice("Y", 1, 1, SpliceMode::Replace)))
        .register(action("conflict", |s| s.splice("Z", 1, 1, SpliceMode::Replace)));
    let mut source = TokenSource::parse("<?php x;");
    assert!(pipeline.transform(&mut source).is_err());
    assert_eq!(source.tokens()[1].text, "x");
}

#[test]
fn eval_code_has_no_open_tag() {
    let pipeline = standard_pipeline(&config(&["strlen"]), &Hooks::default());
    assert_eq!(
        pipeline.transform_for_eval("return strlen($s);").unwrap(),
        r"\Rebind\notify_script_beginning(); return \Rebind\dispatch('strlen', [$s]);"
    );
}

#[test]
fn empty_pipeline_is_the_identity() {
    let pipeline = Pipeline::new();
    assert!(pipeline.is_empty());
    let code = "<html><?php f($x); ?>\n</html>";
    assert_eq!(pipeline.transform_string(code, None).unwrap(), code);
}
