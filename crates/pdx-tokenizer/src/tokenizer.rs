//! Tokenizer for Paradox-style script files.

use crate::{Profile, Span, Token, TokenKind};
use tracing::trace;

/// A tokenizer that produces tokens from script source text.
///
/// Every byte of the input is covered by exactly one token, trivia
/// included. Use [`tokenize`] to get the filtered stream a parser consumes.
#[derive(Clone)]
pub struct Tokenizer<'src> {
    /// The source text being tokenized.
    source: &'src str,
    /// The remaining source text (suffix of `source`).
    remaining: &'src str,
    /// Current byte position in `source`.
    pos: u32,
    profile: Profile,
}

impl<'src> Tokenizer<'src> {
    /// Create a new tokenizer for the given source text.
    pub fn new(source: &'src str, profile: Profile) -> Self {
        Self {
            source,
            remaining: source,
            pos: 0,
            profile,
        }
    }

    /// Get the current byte position.
    #[inline]
    pub fn position(&self) -> u32 {
        self.pos
    }

    /// Check if we're at the end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Peek at the next character without consuming it.
    #[inline]
    fn peek(&self) -> Option<char> {
        self.remaining.chars().next()
    }

    /// Peek at the nth character (0-indexed) without consuming.
    #[inline]
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.remaining.chars().nth(n)
    }

    /// Advance by one character and return it.
    #[inline]
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.advance_by(c.len_utf8());
        Some(c)
    }

    /// Advance by n bytes.
    #[inline]
    fn advance_by(&mut self, n: usize) {
        self.pos += n as u32;
        self.remaining = &self.remaining[n..];
    }

    /// Create a token from the given start position to current position.
    fn token(&self, kind: TokenKind, start: u32) -> Token<'src> {
        let span = Span::new(start, self.pos);
        let text = &self.source[start as usize..self.pos as usize];
        trace!("Token {:?} at {:?}: {:?}", kind, span, text);
        Token::new(kind, span, text)
    }

    /// Get the next token, or `None` at end of input.
    ///
    /// Patterns are tried in a fixed order and the first one that matches at
    /// the current position wins.
    pub fn next_token(&mut self) -> Option<Token<'src>> {
        let start = self.pos;
        let c = self.peek()?;

        let token = match c {
            '#' => self.tokenize_comment(),
            ' ' | '\t' if self.profile == Profile::Full => self.tokenize_whitespace(),
            '\n' if self.profile == Profile::Full => {
                self.advance();
                self.token(TokenKind::Newline, start)
            }
            '\r' if self.profile == Profile::Full && self.peek_nth(1) == Some('\n') => {
                self.advance_by(2);
                self.token(TokenKind::Newline, start)
            }
            c if c.is_whitespace() && self.profile == Profile::Simple => {
                self.tokenize_whitespace()
            }
            '{' => {
                self.advance();
                self.token(TokenKind::LBrace, start)
            }
            '}' => {
                self.advance();
                self.token(TokenKind::RBrace, start)
            }
            '<' | '=' | '>' => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                }
                self.token(TokenKind::Operator, start)
            }
            '"' => self.tokenize_quoted_string(),
            _ => self.tokenize_bare(),
        };
        Some(token)
    }

    /// Tokenize a `#` comment.
    ///
    /// The full profile stops at the last non-whitespace character so that
    /// trailing blanks and a `\r` before the newline stay outside the
    /// comment; the simple profile swallows the whole line.
    fn tokenize_comment(&mut self) -> Token<'src> {
        let start = self.pos;
        let line_len = self.remaining.find('\n').unwrap_or(self.remaining.len());
        let line = &self.remaining[..line_len];
        let len = match self.profile {
            Profile::Simple => line_len,
            Profile::Full => line.trim_end().len().max(1),
        };
        self.advance_by(len);
        self.token(TokenKind::Comment, start)
    }

    /// Tokenize whitespace: spaces and tabs in the full profile, any run of
    /// whitespace in the simple profile.
    fn tokenize_whitespace(&mut self) -> Token<'src> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let more = match self.profile {
                Profile::Full => c == ' ' || c == '\t',
                Profile::Simple => c.is_whitespace(),
            };
            if !more {
                break;
            }
            self.advance();
        }
        self.token(TokenKind::Whitespace, start)
    }

    /// Tokenize a quoted string: `"..."`. No escapes; the first `"` closes.
    fn tokenize_quoted_string(&mut self) -> Token<'src> {
        let start = self.pos;
        match self.remaining[1..].find('"') {
            Some(close) => {
                self.advance_by(close + 2);
                self.token(TokenKind::QuotedString, start)
            }
            None => {
                // Unterminated: no pattern matches at this position.
                self.advance();
                self.token(TokenKind::Error, start)
            }
        }
    }

    /// Tokenize a date, number or unquoted string starting here.
    fn tokenize_bare(&mut self) -> Token<'src> {
        let start = self.pos;
        if self.profile == Profile::Full {
            if let Some(len) = match_date(self.remaining) {
                self.advance_by(len);
                return self.token(TokenKind::Date, start);
            }
            if let Some(len) = match_number(self.remaining) {
                self.advance_by(len);
                return self.token(TokenKind::Number, start);
            }
        }

        let len = self
            .remaining
            .find(|c: char| !is_unquoted_char(c))
            .unwrap_or(self.remaining.len());
        if len == 0 {
            // A whitespace character the full profile has no pattern for,
            // e.g. a lone `\r` or a form feed.
            self.advance();
            return self.token(TokenKind::Error, start);
        }
        self.advance_by(len);

        let kind = match self.profile {
            Profile::Full => TokenKind::UnquotedString,
            Profile::Simple => classify_bare(&self.source[start as usize..self.pos as usize]),
        };
        self.token(kind, start)
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = Token<'src>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Error raised when no token pattern matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    /// Where scanning stopped.
    pub span: Span,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized input at offset {}", self.span.start)
    }
}

impl std::error::Error for LexError {}

/// Tokenize a whole source text, dropping the trivia the profile discards.
///
/// The simple profile keeps only significant tokens; the full profile keeps
/// comments and newlines (needed for comment attachment) and drops
/// horizontal whitespace.
pub fn tokenize(source: &str, profile: Profile) -> Result<Vec<Token<'_>>, LexError> {
    let mut tokens = Vec::new();
    for token in Tokenizer::new(source, profile) {
        match token.kind {
            TokenKind::Error => return Err(LexError { span: token.span }),
            TokenKind::Whitespace => {}
            TokenKind::Comment | TokenKind::Newline if profile == Profile::Simple => {}
            _ => tokens.push(token),
        }
    }
    Ok(tokens)
}

/// Whether a character may appear in an unquoted string.
pub fn is_unquoted_char(c: char) -> bool {
    !matches!(c, '"' | '#' | '<' | '=' | '>' | '{' | '}') && !c.is_whitespace()
}

/// Reclassify a bare token the way the simple profile does: a full-length
/// date first, then a full-length number, else a name.
fn classify_bare(text: &str) -> TokenKind {
    if match_date(text) == Some(text.len()) {
        TokenKind::Date
    } else if is_plain_number(text) {
        TokenKind::Number
    } else {
        TokenKind::UnquotedString
    }
}

fn digits(s: &str) -> usize {
    s.bytes().take_while(u8::is_ascii_digit).count()
}

fn sign(s: &str) -> usize {
    usize::from(s.starts_with('-'))
}

/// Length of a `-?\d*\.\d*\.\d*` match at the start of `s`.
pub fn match_date(s: &str) -> Option<usize> {
    let mut len = sign(s);
    len += digits(&s[len..]);
    for _ in 0..2 {
        if !s[len..].starts_with('.') {
            return None;
        }
        len += 1;
        len += digits(&s[len..]);
    }
    Some(len)
}

/// Length of a `-?\d+(\.\d+)?` match at the start of `s` that is not
/// directly followed by a word character.
///
/// When the fractional part runs into a word character the integer part
/// alone is tried, so `1.5x` lexes as `1` followed by `.5x`.
pub fn match_number(s: &str) -> Option<usize> {
    let int_start = sign(s);
    let int_len = digits(&s[int_start..]);
    if int_len == 0 {
        return None;
    }
    let int_end = int_start + int_len;

    if s[int_end..].starts_with('.') {
        let frac_len = digits(&s[int_end + 1..]);
        let frac_end = int_end + 1 + frac_len;
        if frac_len > 0 && !followed_by_word_char(s, frac_end) {
            return Some(frac_end);
        }
    }
    if followed_by_word_char(s, int_end) {
        None
    } else {
        Some(int_end)
    }
}

/// Whether `s` is entirely a `-?\d+(\.\d+)?` number.
pub fn is_plain_number(s: &str) -> bool {
    let int_start = sign(s);
    let int_len = digits(&s[int_start..]);
    if int_len == 0 {
        return false;
    }
    let rest = &s[int_start + int_len..];
    match rest.strip_prefix('.') {
        None => rest.is_empty(),
        Some(frac) => !frac.is_empty() && digits(frac) == frac.len(),
    }
}

fn followed_by_word_char(s: &str, at: usize) -> bool {
    s[at..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(source: &str) -> Vec<(TokenKind, &str)> {
        Tokenizer::new(source, Profile::Full)
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn simple(source: &str) -> Vec<(TokenKind, &str)> {
        tokenize(source, Profile::Simple)
            .unwrap()
            .into_iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_structural_tokens() {
        assert_eq!(full("{"), vec![(TokenKind::LBrace, "{")]);
        assert_eq!(full("}"), vec![(TokenKind::RBrace, "}")]);
        for op in ["=", "==", "<", "<=", ">", ">="] {
            assert_eq!(full(op), vec![(TokenKind::Operator, op)]);
        }
    }

    #[test]
    fn test_pair() {
        pdx_testhelpers::init_tracing();
        assert_eq!(
            full("culture = norse"),
            vec![
                (TokenKind::UnquotedString, "culture"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Operator, "="),
                (TokenKind::Whitespace, " "),
                (TokenKind::UnquotedString, "norse"),
            ]
        );
    }

    #[test]
    fn test_dates_and_numbers() {
        assert_eq!(full("1066.9.14"), vec![(TokenKind::Date, "1066.9.14")]);
        assert_eq!(full("..5"), vec![(TokenKind::Date, "..5")]);
        assert_eq!(full("-12"), vec![(TokenKind::Number, "-12")]);
        assert_eq!(full("0.50"), vec![(TokenKind::Number, "0.50")]);
        assert_eq!(full("12a"), vec![(TokenKind::UnquotedString, "12a")]);
        assert_eq!(
            full("1.5x"),
            vec![
                (TokenKind::Number, "1"),
                (TokenKind::UnquotedString, ".5x")
            ]
        );
    }

    #[test]
    fn test_quoted_string_spans_lines() {
        assert_eq!(
            full("\"two\nlines\""),
            vec![(TokenKind::QuotedString, "\"two\nlines\"")]
        );
    }

    #[test]
    fn test_comment_excludes_trailing_blanks() {
        assert_eq!(
            full("# note  \r\nx"),
            vec![
                (TokenKind::Comment, "# note"),
                (TokenKind::Whitespace, "  "),
                (TokenKind::Newline, "\r\n"),
                (TokenKind::UnquotedString, "x"),
            ]
        );
        assert_eq!(full("#"), vec![(TokenKind::Comment, "#")]);
    }

    #[test]
    fn test_simple_profile_reclassifies() {
        assert_eq!(
            simple("a = 1066.1.1 # c\nb = 1.5x c = -3.25"),
            vec![
                (TokenKind::UnquotedString, "a"),
                (TokenKind::Operator, "="),
                (TokenKind::Date, "1066.1.1"),
                (TokenKind::UnquotedString, "b"),
                (TokenKind::Operator, "="),
                (TokenKind::UnquotedString, "1.5x"),
                (TokenKind::UnquotedString, "c"),
                (TokenKind::Operator, "="),
                (TokenKind::Number, "-3.25"),
            ]
        );
    }

    #[test]
    fn test_full_profile_keeps_comments_and_newlines() {
        let kinds: Vec<_> = tokenize("a = b # c\n", Profile::Full)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::UnquotedString,
                TokenKind::Operator,
                TokenKind::UnquotedString,
                TokenKind::Comment,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = tokenize("a = \"oops", Profile::Full).unwrap_err();
        assert_eq!(err.span.start, 4);
        assert!(tokenize("a = \"oops", Profile::Simple).is_err());
    }

    #[test]
    fn test_lone_carriage_return_is_error_in_full_profile() {
        let err = tokenize("a\rb", Profile::Full).unwrap_err();
        assert_eq!(err.span.start, 1);
        assert_eq!(simple("a\rb").len(), 2);
    }

    #[test]
    fn test_matchers() {
        assert_eq!(match_date("1.2.3.4"), Some(5));
        assert_eq!(match_date("1.2"), None);
        assert_eq!(match_number("10 "), Some(2));
        assert_eq!(match_number("10_"), None);
        assert!(is_plain_number("-0.5"));
        assert!(!is_plain_number("1."));
        assert!(!is_plain_number("-"));
    }
}
