//! Namespace scopes and the `use` imports declared in each.
//!
//! Both collectors only look at the top level of a scope: `use` inside a
//! class body imports a trait, and `use` after a closure's parameter list
//! captures variables. Neither introduces an alias.

use rebind_lexer::TokenKind;
use rustc_hash::FxHashMap;

use crate::{StructuralError, TokenSource};

/// A namespace scope as a half-open token range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceScope {
    /// Namespace name without leading `\`; empty for the global namespace.
    pub name: String,
    pub begin: usize,
    pub end: usize,
    /// The `{` of a braced `namespace X { ... }` block.
    pub opener: Option<usize>,
}

/// Aliases imported by the top-level `use` declarations of one scope.
///
/// Keys are the local alias, values the fully qualified target without a
/// leading `\`. Class and function entries are lower-cased on both sides;
/// constant names are case-sensitive and kept as written.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UseDeclarations {
    pub classes: FxHashMap<String, String>,
    pub functions: FxHashMap<String, String>,
    pub constants: FxHashMap<String, String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ImportKind {
    Class,
    Function,
    Constant,
}

impl UseDeclarations {
    fn insert(&mut self, kind: ImportKind, alias: &str, qualified: &str) {
        if alias.is_empty() {
            return;
        }
        let qualified = qualified.trim_start_matches('\\');
        match kind {
            ImportKind::Class => {
                self.classes
                    .insert(alias.to_ascii_lowercase(), qualified.to_ascii_lowercase());
            }
            ImportKind::Function => {
                self.functions
                    .insert(alias.to_ascii_lowercase(), qualified.to_ascii_lowercase());
            }
            ImportKind::Constant => {
                self.constants.insert(alias.to_owned(), qualified.to_owned());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.functions.is_empty() && self.constants.is_empty()
    }
}

/// Split a source into namespace scopes.
///
/// `namespace X;` opens a scope running to the next namespace declaration
/// (or the end of input). `namespace X { ... }` opens a scope covering the
/// block contents. A source with no declaration is one global scope.
#[tracing::instrument(level = "trace", skip_all)]
pub fn collect_namespace_boundaries(
    s: &TokenSource,
) -> Result<Vec<NamespaceScope>, StructuralError> {
    let declarations: Vec<usize> = s
        .all(TokenKind::Namespace)
        .filter(|&i| s.enclosing_opener(i).is_none())
        // `namespace\foo()` is a relative name, not a declaration.
        .filter(|&i| !s.is(TokenKind::NsSeparator, skip_trivia(s, i)))
        .collect();

    if declarations.is_empty() {
        return Ok(vec![NamespaceScope {
            name: String::new(),
            begin: 0,
            end: s.len(),
            opener: None,
        }]);
    }

    let mut scopes = Vec::with_capacity(declarations.len());
    for (n, &decl) in declarations.iter().enumerate() {
        let (name, terminator) = read_name(s, decl, "namespace declaration")?;
        match s.kind(terminator) {
            Some(TokenKind::Semicolon) => {
                let end = declarations.get(n + 1).copied().unwrap_or(s.len());
                scopes.push(NamespaceScope {
                    name,
                    begin: terminator + 1,
                    end,
                    opener: None,
                });
            }
            Some(TokenKind::LBrace) => {
                let close = s.match_bracket(terminator)?;
                scopes.push(NamespaceScope {
                    name,
                    begin: terminator + 1,
                    end: close,
                    opener: Some(terminator),
                });
            }
            Some(found) => {
                return Err(StructuralError::Unexpected {
                    index: terminator,
                    found,
                    line: s.line(terminator),
                    context: "namespace declaration",
                });
            }
            None => {
                return Err(StructuralError::UnexpectedEnd {
                    line: s.line(decl),
                    context: "namespace declaration",
                });
            }
        }
    }
    Ok(scopes)
}

/// Collect the aliases imported at the top level of `scope`.
#[tracing::instrument(level = "trace", skip_all, fields(namespace = %scope.name))]
pub fn collect_use_declarations(
    s: &TokenSource,
    scope: &NamespaceScope,
) -> Result<UseDeclarations, StructuralError> {
    let mut uses = UseDeclarations::default();
    let statements = s
        .within(TokenKind::Use, scope.begin, scope.end)
        .filter(|&i| s.enclosing_opener(i) == scope.opener)
        .filter(|&i| !s.prev_significant(i).is_some_and(|p| s.is(TokenKind::RParen, p)));

    for statement in statements {
        read_use_statement(s, statement, &mut uses)?;
    }
    Ok(uses)
}

const USE_CONTEXT: &str = "use declaration";

fn read_use_statement(
    s: &TokenSource,
    keyword: usize,
    uses: &mut UseDeclarations,
) -> Result<(), StructuralError> {
    let mut pos = keyword;
    let kind = match import_kind(s, skip_trivia(s, pos)) {
        Some(kind) => {
            pos = skip_trivia(s, pos);
            kind
        }
        None => ImportKind::Class,
    };

    loop {
        let (name, after) = read_name(s, pos, USE_CONTEXT)?;
        let separator = if s.is(TokenKind::LBrace, after) {
            let close = s.match_bracket(after)?;
            read_group(s, &name, kind, after, close, uses)?;
            skip_trivia(s, close)
        } else {
            let (alias, after) = read_alias(s, &name, after)?;
            uses.insert(kind, &alias, &name);
            after
        };

        match s.kind(separator) {
            Some(TokenKind::Comma) => pos = separator,
            Some(TokenKind::Semicolon | TokenKind::CloseTag) => return Ok(()),
            Some(found) => {
                return Err(StructuralError::Unexpected {
                    index: separator,
                    found,
                    line: s.line(separator),
                    context: USE_CONTEXT,
                });
            }
            None => {
                return Err(StructuralError::UnexpectedEnd {
                    line: s.line(keyword),
                    context: USE_CONTEXT,
                });
            }
        }
    }
}

/// `Prefix\{a, function b as c}`: the braces span `open..close`.
fn read_group(
    s: &TokenSource,
    prefix: &str,
    default_kind: ImportKind,
    open: usize,
    close: usize,
    uses: &mut UseDeclarations,
) -> Result<(), StructuralError> {
    let prefix = prefix.trim_end_matches('\\');
    let mut pos = open;
    loop {
        let first = skip_trivia(s, pos);
        // Trailing comma before `}`.
        if first == close {
            return Ok(());
        }
        let kind = match import_kind(s, first) {
            Some(kind) => {
                pos = first;
                kind
            }
            None => default_kind,
        };
        let (name, after) = read_name(s, pos, USE_CONTEXT)?;
        let (alias, after) = read_alias(s, &name, after)?;
        uses.insert(kind, &alias, &format!("{prefix}\\{name}"));

        match s.kind(after) {
            Some(TokenKind::Comma) => pos = after,
            _ if after == close => return Ok(()),
            Some(found) => {
                return Err(StructuralError::Unexpected {
                    index: after,
                    found,
                    line: s.line(after),
                    context: USE_CONTEXT,
                });
            }
            None => {
                return Err(StructuralError::UnexpectedEnd {
                    line: s.line(open),
                    context: USE_CONTEXT,
                });
            }
        }
    }
}

/// Read an optional `as alias` after a name. Returns the alias and the index
/// of the first significant token after the clause.
fn read_alias(
    s: &TokenSource,
    name: &str,
    after_name: usize,
) -> Result<(String, usize), StructuralError> {
    if !s.is(TokenKind::As, after_name) {
        let default = name.rsplit('\\').next().unwrap_or(name);
        return Ok((default.to_owned(), after_name));
    }
    let alias = skip_trivia(s, after_name);
    match s.kind(alias) {
        Some(TokenKind::Ident) => Ok((s.text(alias).to_owned(), skip_trivia(s, alias))),
        Some(found) => Err(StructuralError::Unexpected {
            index: alias,
            found,
            line: s.line(alias),
            context: USE_CONTEXT,
        }),
        None => Err(StructuralError::UnexpectedEnd {
            line: s.line(after_name),
            context: USE_CONTEXT,
        }),
    }
}

/// Read a possibly qualified name starting after `from`.
///
/// Returns the name text (trivia removed) and the index of the first
/// significant token that is not part of it. An empty name is allowed for
/// `namespace { ... }`.
fn read_name(
    s: &TokenSource,
    from: usize,
    context: &'static str,
) -> Result<(String, usize), StructuralError> {
    let mut name = String::new();
    let mut pos = skip_trivia(s, from);
    while let Some(kind @ (TokenKind::Ident | TokenKind::NsSeparator)) = s.kind(pos) {
        // Two identifiers in a row end the name (`Foo as`, handled by `As`).
        if kind == TokenKind::Ident && name.chars().last().is_some_and(|c| c != '\\') {
            break;
        }
        name.push_str(s.text(pos));
        pos = skip_trivia(s, pos);
    }
    if pos >= s.len() {
        return Err(StructuralError::UnexpectedEnd {
            line: s.line(from),
            context,
        });
    }
    Ok((name, pos))
}

fn import_kind(s: &TokenSource, index: usize) -> Option<ImportKind> {
    match s.kind(index)? {
        TokenKind::Function => Some(ImportKind::Function),
        TokenKind::Const => Some(ImportKind::Constant),
        _ => None,
    }
}

/// Next significant index after `from`, or `len()` at the end.
fn skip_trivia(s: &TokenSource, from: usize) -> usize {
    s.next_significant(from).unwrap_or(s.len())
}
