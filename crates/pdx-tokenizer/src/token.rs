//! Token types for the script lexer.

use crate::Span;

/// The kind of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Structural tokens
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `=`, `==`, `<`, `<=`, `>` or `>=`
    Operator,

    // Scalar tokens
    /// Dotted date: `1066.9.14`, `..5`
    Date,
    /// Integer or decimal: `42`, `-0.5`
    Number,
    /// Quoted string: `"hello world"` (may span lines)
    QuotedString,
    /// Anything else that is not whitespace or punctuation: `e_france`
    UnquotedString,

    // Trivia
    /// `#` comment running to the end of the line
    Comment,
    /// Horizontal whitespace (full profile) or any whitespace run (simple profile)
    Whitespace,
    /// `\n` or `\r\n` (full profile only)
    Newline,

    /// No pattern matched at this position
    Error,
}

impl TokenKind {
    /// Whether this token is trivia (whitespace, newlines or comments).
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Newline | TokenKind::Comment
        )
    }

    /// Whether this token can stand as a key.
    pub fn is_key(&self) -> bool {
        matches!(
            self,
            TokenKind::UnquotedString
                | TokenKind::Date
                | TokenKind::Number
                | TokenKind::QuotedString
        )
    }
}

/// Which of the two lexer dialects to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Profile {
    /// Discards comments and whitespace; bare tokens are classified after
    /// scanning (date, then number, else name).
    Simple,
    /// Keeps comments and newlines so they can be attached to nodes;
    /// numbers and dates are classified while scanning.
    #[default]
    Full,
}

impl Profile {
    /// Short lowercase name, used for cache directory names.
    pub fn name(&self) -> &'static str {
        match self {
            Profile::Simple => "simple",
            Profile::Full => "full",
        }
    }
}

/// A token with its kind, span, and source text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    /// The kind of token.
    pub kind: TokenKind,
    /// The span in the source text.
    pub span: Span,
    /// The source text of this token.
    pub text: &'src str,
}

impl<'src> Token<'src> {
    /// Create a new token.
    pub fn new(kind: TokenKind, span: Span, text: &'src str) -> Self {
        Self { kind, span, text }
    }
}
