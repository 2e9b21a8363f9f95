//! Token kinds and bitset-backed kind sets.

use std::fmt;

/// Kind of a lexical token.
///
/// Field-less so that token kinds are `Copy` and map one-to-one onto bits of
/// a [`TokenSet`]. The token text lives on [`Token`](crate::Token).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenKind {
    // === Trivia ===
    /// Run of spaces, tabs, and newlines.
    Whitespace,
    /// `// ...`, `# ...`, or `/* ... */`. Line comments end before `?>`.
    Comment,
    /// `/** ... */`.
    DocComment,

    // === Mode switches ===
    /// Text outside the code tags, passed through untouched.
    InlineHtml,
    /// `<?php` and the single whitespace character that follows it.
    OpenTag,
    /// `<?=`.
    OpenTagWithEcho,
    /// `?>` and a directly following newline.
    CloseTag,

    // === Atoms ===
    /// `$name`.
    Variable,
    /// A bare `$`, as in `$$name` or `${expr}`.
    Dollar,
    /// Any identifier that is not a keyword.
    Ident,
    /// Integer or float literal.
    Number,
    /// Quoted string literal with no `{$` or `${` interpolation.
    String,
    /// `<<<LABEL ... LABEL` heredoc or nowdoc with no `{$` or `${` interpolation.
    Heredoc,
    /// Literal text of an interpolating string or heredoc, between its
    /// interpolated expressions.
    StringPart,
    /// `{` opening a `{$expr}` interpolation. Closed by an ordinary `}`.
    CurlyOpen,

    // === Brackets ===
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    /// `#[` opening an attribute. Closed by an ordinary `]`.
    AttributeOpen,

    // === Punctuation ===
    Semicolon,
    Comma,
    /// `->`
    Arrow,
    /// `?->`
    NullsafeArrow,
    /// `::`
    DoubleColon,
    /// `\`
    NsSeparator,
    Colon,
    Ampersand,
    /// Every other operator; the text tells them apart.
    Operator,

    // === Keywords (matched case-insensitively) ===
    Namespace,
    Use,
    Function,
    Fn,
    Class,
    Interface,
    Trait,
    New,
    Const,
    As,
    Eval,
    Include,
    IncludeOnce,
    Require,
    RequireOnce,
    Declare,
    /// `__DIR__`
    MagicDir,
    /// `__FILE__`
    MagicFile,

    /// A byte sequence that starts no token.
    Other,
}

impl TokenKind {
    /// Highest discriminant value; [`TokenSet`] relies on it fitting in a `u64`.
    pub const MAX_DISCRIMINANT: u8 = TokenKind::Other as u8;

    /// Bit position of this kind inside a [`TokenSet`].
    #[inline]
    pub const fn discriminant_index(self) -> u8 {
        self as u8
    }

    /// Whitespace and comments.
    #[inline]
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::DocComment
        )
    }

    #[inline]
    pub const fn is_opening_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::CurlyOpen
                | TokenKind::AttributeOpen
        )
    }

    #[inline]
    pub const fn is_closing_bracket(self) -> bool {
        matches!(
            self,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace
        )
    }

    /// The closing bracket that pairs with this opening bracket.
    pub const fn closing_pair(self) -> Option<TokenKind> {
        match self {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket | TokenKind::AttributeOpen => Some(TokenKind::RBracket),
            TokenKind::LBrace | TokenKind::CurlyOpen => Some(TokenKind::RBrace),
            _ => None,
        }
    }

    /// Human-readable name for diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Whitespace => "whitespace",
            TokenKind::Comment => "comment",
            TokenKind::DocComment => "doc comment",
            TokenKind::InlineHtml => "inline text",
            TokenKind::OpenTag => "`<?php`",
            TokenKind::OpenTagWithEcho => "`<?=`",
            TokenKind::CloseTag => "`?>`",
            TokenKind::Variable => "variable",
            TokenKind::Dollar => "`$`",
            TokenKind::Ident => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Heredoc => "heredoc",
            TokenKind::StringPart => "string fragment",
            TokenKind::CurlyOpen => "interpolation `{`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::AttributeOpen => "`#[`",
            TokenKind::Semicolon => "`;`",
            TokenKind::Comma => "`,`",
            TokenKind::Arrow => "`->`",
            TokenKind::NullsafeArrow => "`?->`",
            TokenKind::DoubleColon => "`::`",
            TokenKind::NsSeparator => "`\\`",
            TokenKind::Colon => "`:`",
            TokenKind::Ampersand => "`&`",
            TokenKind::Operator => "operator",
            TokenKind::Namespace => "`namespace`",
            TokenKind::Use => "`use`",
            TokenKind::Function => "`function`",
            TokenKind::Fn => "`fn`",
            TokenKind::Class => "`class`",
            TokenKind::Interface => "`interface`",
            TokenKind::Trait => "`trait`",
            TokenKind::New => "`new`",
            TokenKind::Const => "`const`",
            TokenKind::As => "`as`",
            TokenKind::Eval => "`eval`",
            TokenKind::Include => "`include`",
            TokenKind::IncludeOnce => "`include_once`",
            TokenKind::Require => "`require`",
            TokenKind::RequireOnce => "`require_once`",
            TokenKind::Declare => "`declare`",
            TokenKind::MagicDir => "`__DIR__`",
            TokenKind::MagicFile => "`__FILE__`",
            TokenKind::Other => "unrecognized input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Look up the keyword kind for an identifier, ignoring ASCII case.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    // Longest keyword is `require_once`.
    if ident.len() > 12 {
        return None;
    }
    let lower = ident.to_ascii_lowercase();
    let kind = match lower.as_str() {
        "namespace" => TokenKind::Namespace,
        "use" => TokenKind::Use,
        "function" => TokenKind::Function,
        "fn" => TokenKind::Fn,
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "trait" => TokenKind::Trait,
        "new" => TokenKind::New,
        "const" => TokenKind::Const,
        "as" => TokenKind::As,
        "eval" => TokenKind::Eval,
        "include" => TokenKind::Include,
        "include_once" => TokenKind::IncludeOnce,
        "require" => TokenKind::Require,
        "require_once" => TokenKind::RequireOnce,
        "declare" => TokenKind::Declare,
        "__dir__" => TokenKind::MagicDir,
        "__file__" => TokenKind::MagicFile,
        _ => return None,
    };
    Some(kind)
}

const _: () = assert!(
    TokenKind::MAX_DISCRIMINANT < 64,
    "TokenSet uses a u64 bitset; all discriminant indices must be < 64"
);

/// A set of token kinds with O(1) membership testing.
///
/// Each bit of the backing `u64` corresponds to a [`TokenKind`] discriminant.
///
/// ```text
/// const CALL_QUALIFIERS: TokenSet = TokenSet::new()
///     .with(TokenKind::Arrow)
///     .with(TokenKind::DoubleColon);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct TokenSet(u64);

impl TokenSet {
    /// Create an empty token set.
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Create a token set containing a single token kind.
    #[inline]
    pub const fn single(kind: TokenKind) -> Self {
        Self(1u64 << kind.discriminant_index())
    }

    /// Create a token set from a slice of kinds.
    pub const fn of(kinds: &[TokenKind]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < kinds.len() {
            bits |= 1u64 << kinds[i].discriminant_index();
            i += 1;
        }
        Self(bits)
    }

    /// Add a token kind (builder form for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, kind: TokenKind) -> Self {
        Self(self.0 | (1u64 << kind.discriminant_index()))
    }

    /// Union of two token sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check if this set contains a token kind.
    #[inline]
    pub const fn contains(self, kind: TokenKind) -> bool {
        (self.0 & (1u64 << kind.discriminant_index())) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl From<TokenKind> for TokenSet {
    fn from(kind: TokenKind) -> Self {
        TokenSet::single(kind)
    }
}

impl From<&[TokenKind]> for TokenSet {
    fn from(kinds: &[TokenKind]) -> Self {
        TokenSet::of(kinds)
    }
}

impl<const N: usize> From<[TokenKind; N]> for TokenSet {
    fn from(kinds: [TokenKind; N]) -> Self {
        TokenSet::of(&kinds)
    }
}

/// Whitespace and comments: what directional scans step over by default.
pub const TRIVIA: TokenSet = TokenSet::new()
    .with(TokenKind::Whitespace)
    .with(TokenKind::Comment)
    .with(TokenKind::DocComment);

/// Import constructs whose path argument can be rewritten.
pub const IMPORTS: TokenSet = TokenSet::new()
    .with(TokenKind::Include)
    .with(TokenKind::IncludeOnce)
    .with(TokenKind::Require)
    .with(TokenKind::RequireOnce);
