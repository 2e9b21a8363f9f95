//! Call-site splicing: route calls through the dispatcher.

use rebind_source::{
    collect_namespace_boundaries, collect_use_declarations, SpliceMode, StructuralError,
    TokenKind, TokenSet, TokenSource,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::action::{action, Action};
use crate::hooks::{string_literal, Hooks};

/// Tokens after which an identifier is a member or a declaration rather
/// than a plain function call.
const NOT_A_FUNCTION_CALL_AFTER: TokenSet = TokenSet::new()
    .with(TokenKind::Arrow)
    .with(TokenKind::NullsafeArrow)
    .with(TokenKind::DoubleColon)
    .with(TokenKind::Function)
    .with(TokenKind::New)
    .with(TokenKind::Const);

/// Tokens that make a directly following `\name` a qualified or
/// namespace-relative name.
const NAME_PREFIX: TokenSet = TokenSet::new()
    .with(TokenKind::Ident)
    .with(TokenKind::Namespace);

/// Tokens before a variable that make `$x(...)` something other than a
/// call of the value in `$x`.
const NOT_A_DYNAMIC_CALL_AFTER: TokenSet = TokenSet::new()
    .with(TokenKind::New)
    .with(TokenKind::Arrow)
    .with(TokenKind::NullsafeArrow)
    .with(TokenKind::DoubleColon);

/// Rewrite `name(args)` to `dispatch('name', [args])` for every name in
/// `names` (lower-case, no leading `\`).
///
/// Names are matched case-insensitively. Inside each namespace scope a
/// `use function` alias of a redefinable name is rewritten too, and the
/// dispatched name is always the canonical one.
pub fn splice_named_function_calls(names: FxHashSet<String>, hooks: &Hooks) -> impl Action {
    let dispatch = hooks.dispatch.clone();
    action("splice_named_function_calls", move |source| {
        if names.is_empty() {
            return Ok(());
        }
        for scope in collect_namespace_boundaries(source)? {
            let uses = collect_use_declarations(source, &scope)?;
            let aliases: FxHashMap<&str, &str> = uses
                .functions
                .iter()
                .filter(|(_, target)| names.contains(target.as_str()))
                .map(|(alias, target)| (alias.as_str(), target.as_str()))
                .collect();

            for ident in source.within(TokenKind::Ident, scope.begin, scope.end) {
                let name = source.text(ident).to_ascii_lowercase();
                let alias = aliases.get(name.as_str()).copied();
                if alias.is_none() && !names.contains(&name) {
                    continue;
                }

                let mut start = ident;
                let mut previous = source.prev_significant(ident);
                if let Some(separator) = previous.filter(|&p| source.is(TokenKind::NsSeparator, p))
                {
                    // Aliases never apply to fully qualified names.
                    if !names.contains(&name) {
                        continue;
                    }
                    if separator > 0 && source.is(NAME_PREFIX, separator - 1) {
                        continue;
                    }
                    start = separator;
                    previous = source.prev_significant(separator);
                }
                if previous.is_some_and(|p| {
                    source.is(NOT_A_FUNCTION_CALL_AFTER, p) || declares_by_reference(source, p)
                }) {
                    continue;
                }
                let Some(paren) = source
                    .next_significant(ident)
                    .filter(|&n| source.is(TokenKind::LParen, n))
                else {
                    continue;
                };
                let close = source.match_bracket(paren)?;

                let canonical = match alias {
                    Some(target) if start == ident => target,
                    _ => name.as_str(),
                };
                source.splice(
                    &format!("{dispatch}({}, [", string_literal(canonical)),
                    start,
                    paren - start + 1,
                    SpliceMode::Replace,
                )?;
                source.splice("])", close, 1, SpliceMode::Replace)?;
            }
        }
        Ok(())
    })
}

/// `function &name` declares a function that returns by reference.
fn declares_by_reference(source: &TokenSource, previous: usize) -> bool {
    source.is(TokenKind::Ampersand, previous)
        && source
            .prev_significant(previous)
            .is_some_and(|p| source.is(TokenKind::Function, p))
}

/// Rewrite `$callee(args)` to `dispatch_dynamic($callee, [args])`.
///
/// The callee is the whole run starting at the first variable token and
/// continuing through index and brace groups, so `$a['k']($x)` and
/// `${'f'}()` are covered. Chained calls nest: `$f()()` becomes
/// `dispatch_dynamic(dispatch_dynamic($f, []), [])`. Instance, static and
/// constructor forms are not dynamic calls. Only active alongside named
/// call splicing, so `enabled` mirrors whether any names are redefinable.
///
/// Calls inside `{$...}` and `${...}` string interpolations are rewritten
/// too. A callee that opens a `{$...}` interpolation must keep it starting
/// with `$`, so it is dispatched through the dispatcher variable instead.
pub fn splice_dynamic_calls(enabled: bool, hooks: &Hooks) -> impl Action {
    let hooks = hooks.clone();
    action("splice_dynamic_calls", move |source| {
        if enabled {
            splice_dynamic_calls_within(source, 0, source.len(), &hooks)?;
        }
        Ok(())
    })
}

fn splice_dynamic_calls_within(
    source: &TokenSource,
    start: usize,
    end: usize,
    hooks: &Hooks,
) -> Result<(), StructuralError> {
    let mut pos = start;
    let mut callee: Option<usize> = None;
    while pos < end {
        let Some(kind) = source.kind(pos) else {
            break;
        };
        match kind {
            TokenKind::Variable | TokenKind::Dollar => {
                callee.get_or_insert(pos);
            }
            TokenKind::LParen => match callee {
                Some(first)
                    if !source
                        .prev_significant(first)
                        .is_some_and(|p| source.is(NOT_A_DYNAMIC_CALL_AFTER, p)) =>
                {
                    let close = source.match_bracket(pos)?;
                    let opens_interpolation = first
                        .checked_sub(1)
                        .is_some_and(|p| source.is(TokenKind::CurlyOpen, p));
                    let dispatch = if opens_interpolation {
                        &hooks.dispatch_dynamic_variable
                    } else {
                        &hooks.dispatch_dynamic
                    };
                    source.splice(&format!("{dispatch}("), first, 0, SpliceMode::AppendAtEnd)?;
                    source.splice(", [", pos, 1, SpliceMode::Replace)?;
                    source.splice("])", close, 1, SpliceMode::Replace)?;
                    splice_dynamic_calls_within(source, pos + 1, close, hooks)?;
                    pos = close + 1;
                    continue;
                }
                _ => callee = None,
            },
            TokenKind::LBracket | TokenKind::LBrace | TokenKind::CurlyOpen => {
                let close = source.match_bracket(pos)?;
                splice_dynamic_calls_within(source, pos + 1, close, hooks)?;
                pos = close + 1;
                continue;
            }
            kind if kind.is_trivia() => {}
            _ => callee = None,
        }
        pos += 1;
    }
    Ok(())
}
