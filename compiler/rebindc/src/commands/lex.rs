//! `lex`: dump the token stream of a file.

use std::fmt::Write;

use rebind_lexer::lex;

/// One line per token: line number, kind and the escaped text.
pub fn lex_source(path: &str, code: &str) -> String {
    let tokens = lex(code);
    let mut out = format!("Tokens for '{path}' ({} tokens):\n", tokens.len());
    for token in &tokens {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "  {:>4}  {:<20} {:?}", token.line, token.kind.name(), token.text);
    }
    out
}
