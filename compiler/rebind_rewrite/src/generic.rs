//! Reusable rewrite actions, parameterized by the code they inject.
//!
//! Opening text is always queued with [`SpliceMode::AppendAtEnd`] and closing
//! text with [`SpliceMode::PrependAtStart`]. When two passes wrap the same
//! span, the later one ends up innermost on both sides and the wrappers nest.

use rebind_source::{SpliceMode, StructuralError, TokenKind, TokenSource};

use crate::action::{action, Action};

/// End of the bare expression that starts after `from`: the next `;`, `,`
/// or `?>` on the same bracket level, or the bracket that closes the
/// current level, whichever is first.
pub(crate) fn expression_end(source: &TokenSource, from: usize) -> Result<usize, StructuralError> {
    let mut pos = from + 1;
    while let Some(kind) = source.kind(pos) {
        if kind.is_opening_bracket() {
            pos = source.match_bracket(pos)? + 1;
            continue;
        }
        if kind.is_closing_bracket()
            || matches!(
                kind,
                TokenKind::Semicolon | TokenKind::Comma | TokenKind::CloseTag
            )
        {
            return Ok(pos);
        }
        pos += 1;
    }
    Ok(source.len())
}

/// Wrap the argument of every `construct` token in `wrapper(...)`.
///
/// A parenthesized argument is wrapped inside its parentheses. Anything else
/// is wrapped up to [`expression_end`].
pub fn wrap_unary_construct_arguments(
    construct: TokenKind,
    wrapper: impl Into<String>,
) -> impl Action {
    let wrapper = wrapper.into();
    action("wrap_unary_construct_arguments", move |source| {
        for pos in source.all(construct) {
            let Some(arg) = source.next_significant(pos) else {
                return Err(StructuralError::UnexpectedEnd {
                    line: source.line(pos),
                    context: "construct argument",
                });
            };
            let (start, end) = if source.is(TokenKind::LParen, arg) {
                (arg + 1, source.match_bracket(arg)?)
            } else {
                (arg, expression_end(source, pos)?)
            };
            source.splice(&format!("{wrapper}("), start, 0, SpliceMode::AppendAtEnd)?;
            source.splice(")", end, 0, SpliceMode::PrependAtStart)?;
        }
        Ok(())
    })
}

/// Make `expression` the first thing each script evaluates.
///
/// Only the first open tag of a file is considered. An echo tag gets
/// `(expression) ?: ` so the echoed value survives as long as `expression`
/// is falsy. A plain tag gets `expression;` as the first statement, placed
/// after a leading `declare(...)` and a leading namespace declaration since
/// both must come first.
pub fn inject_false_expression_at_beginnings(expression: impl Into<String>) -> impl Action {
    let expression = expression.into();
    action("inject_false_expression_at_beginnings", move |source| {
        let Some(tag) = source
            .all([TokenKind::OpenTag, TokenKind::OpenTagWithEcho])
            .next()
        else {
            return Ok(());
        };
        if source.is(TokenKind::OpenTagWithEcho, tag) {
            return source.splice(
                &format!("({expression}) ?: "),
                tag + 1,
                0,
                SpliceMode::AppendAtEnd,
            );
        }

        let mut at = tag;
        if let Some(declare) = source
            .next_significant(at)
            .filter(|&i| source.is(TokenKind::Declare, i))
        {
            at = declare_end(source, declare)?;
        }
        if let Some(namespace) = source
            .next_significant(at)
            .filter(|&i| source.is(TokenKind::Namespace, i))
            .filter(|&i| {
                !source
                    .next_significant(i)
                    .is_some_and(|n| source.is(TokenKind::NsSeparator, n))
            })
        {
            at = source
                .next([TokenKind::Semicolon, TokenKind::LBrace], namespace)
                .ok_or(StructuralError::UnexpectedEnd {
                    line: source.line(namespace),
                    context: "namespace declaration",
                })?;
        }

        let text = if at == tag {
            format!("{expression}; ")
        } else {
            format!(" {expression};")
        };
        source.splice(&text, at + 1, 0, SpliceMode::AppendAtEnd)
    })
}

/// The `;` or `{` that ends `declare(...)`.
fn declare_end(source: &TokenSource, declare: usize) -> Result<usize, StructuralError> {
    const CONTEXT: &str = "declare directive";
    let paren = expect_next(source, declare, TokenKind::LParen, CONTEXT)?;
    let close = source.match_bracket(paren)?;
    let end = source
        .next_significant(close)
        .ok_or(StructuralError::UnexpectedEnd {
            line: source.line(close),
            context: CONTEXT,
        })?;
    if source.is([TokenKind::Semicolon, TokenKind::LBrace], end) {
        Ok(end)
    } else {
        Err(unexpected(source, end, CONTEXT))
    }
}

fn expect_next(
    source: &TokenSource,
    from: usize,
    kind: TokenKind,
    context: &'static str,
) -> Result<usize, StructuralError> {
    match source.next_significant(from) {
        Some(i) if source.is(kind, i) => Ok(i),
        Some(i) => Err(unexpected(source, i, context)),
        None => Err(StructuralError::UnexpectedEnd {
            line: source.line(from),
            context,
        }),
    }
}

fn unexpected(source: &TokenSource, index: usize, context: &'static str) -> StructuralError {
    StructuralError::Unexpected {
        index,
        found: source.kind(index).unwrap_or(TokenKind::Other),
        line: source.line(index),
        context,
    }
}

/// Insert `code` at the start of every named function and method body.
///
/// Closures, arrow functions, abstract and interface methods are left alone,
/// as is the `function` keyword of `use function` imports.
pub fn prepend_code_to_functions(code: impl Into<String>) -> impl Action {
    let code = code.into();
    action("prepend_code_to_functions", move |source| {
        for function in source.all(TokenKind::Function) {
            if source
                .prev_significant(function)
                .is_some_and(|p| source.is(TokenKind::Use, p))
            {
                continue;
            }
            let Some(mut name) = source.next_significant(function) else {
                continue;
            };
            if source.is(TokenKind::Ampersand, name) {
                match source.next_significant(name) {
                    Some(next) => name = next,
                    None => continue,
                }
            }
            // Method names may be reserved words, so anything but `(` names it.
            if source.is(TokenKind::LParen, name) {
                continue;
            }
            let Some(params) = source
                .next_significant(name)
                .filter(|&i| source.is(TokenKind::LParen, i))
            else {
                continue;
            };
            let close = source.match_bracket(params)?;
            let Some(body) = source.next([TokenKind::LBrace, TokenKind::Semicolon], close) else {
                continue;
            };
            if source.is(TokenKind::LBrace, body) {
                source.splice(&code, body + 1, 0, SpliceMode::AppendAtEnd)?;
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests;
