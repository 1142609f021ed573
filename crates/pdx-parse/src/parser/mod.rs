//! Token stream to tree.
//!
//! Grammar, with comment handling shown for the full profile:
//!
//! ```text
//! commented(x) = (newline* comment)* newline* x comment?
//! key          = unquoted | date | number | quoted
//! value        = object | key
//! pair         = key op value
//! object       = '{' (pair | value)* '}'
//! toplevel     = pair* (newline* comment)* newline* EOF
//! ```
//!
//! Comments bind forward to the next token, except a comment on the same
//! line right after a token, which binds back to it.

use pdx_tokenizer::{Profile, Span, Token, TokenKind, tokenize};
use pdx_tree::{
    BraceKind, Comment, Commented, Date, Entries, Item, Number, Object, Operator, Pair, Scalar,
    ScalarValue, Text, TopLevel, Value,
};
use tracing::trace;

use crate::{ParseError, ParseErrorKind};

/// Script parser over one source text.
#[derive(Clone)]
pub struct Parser<'src> {
    source: &'src str,
    profile: Profile,
    strict: bool,
}

/// Cursor over the significant tokens of one source.
struct Cursor<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    eof: Span,
    strict: bool,
}

impl<'src> Parser<'src> {
    /// Create a strict parser for the given source.
    pub fn new(source: &'src str, profile: Profile) -> Self {
        Self {
            source,
            profile,
            strict: true,
        }
    }

    /// Builder-style: in non-strict mode an object missing its `}` is closed
    /// at end of input instead of failing.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse the whole source into a tree.
    pub fn parse(self) -> Result<TopLevel, ParseError> {
        let tokens = tokenize(self.source, self.profile)?;
        trace!(count = tokens.len(), profile = self.profile.name(), "tokenized");
        let mut cursor = Cursor {
            tokens,
            pos: 0,
            eof: Span::empty(self.source.len() as u32),
            strict: self.strict,
        };
        cursor.toplevel()
    }
}

impl<'src> Cursor<'src> {
    fn peek(&self) -> Option<&Token<'src>> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek_span(&self) -> Span {
        self.peek().map_or(self.eof, |t| t.span)
    }

    fn bump(&mut self) -> Option<Token<'src>> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn skip_newlines(&mut self) {
        while self.peek_kind() == Some(TokenKind::Newline) {
            self.pos += 1;
        }
    }

    /// Comment lines (and blank lines) before the next significant token.
    fn pre_comments(&mut self) -> Vec<Comment> {
        let mut comments = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                Some(t) if t.kind == TokenKind::Comment => {
                    comments.push(Comment::new(t.text));
                    self.pos += 1;
                }
                _ => return comments,
            }
        }
    }

    /// A comment directly after the previous token, on the same line.
    fn post_comment(&mut self) -> Option<Comment> {
        match self.peek() {
            Some(t) if t.kind == TokenKind::Comment => {
                let comment = Comment::new(t.text);
                self.pos += 1;
                Some(comment)
            }
            _ => None,
        }
    }

    fn commented<T>(&mut self, pre_comments: Vec<Comment>, value: T) -> Commented<T> {
        Commented {
            value,
            pre_comments,
            post_comment: self.post_comment(),
        }
    }

    fn toplevel(&mut self) -> Result<TopLevel, ParseError> {
        let mut items = Vec::new();
        loop {
            let pre = self.pre_comments();
            let Some(kind) = self.peek_kind() else {
                return Ok(TopLevel {
                    entries: Entries::new(items),
                    post_comments: pre,
                });
            };
            if !kind.is_key() {
                return Err(ParseError::new(ParseErrorKind::ExpectedKey, self.peek_span()));
            }
            let key = self.scalar(pre)?;
            match self.operator() {
                Some(op) => {
                    let value = self.value()?;
                    items.push(Item::Pair(Pair { key, op, value }));
                }
                None => {
                    let span = self.peek_span();
                    let kind = if self.peek().is_none() {
                        ParseErrorKind::UnexpectedEof
                    } else {
                        ParseErrorKind::ExpectedOperator
                    };
                    return Err(ParseError::new(kind, span));
                }
            }
        }
    }

    /// A key-shaped scalar token with the given leading comments.
    fn scalar(&mut self, pre: Vec<Comment>) -> Result<Scalar, ParseError> {
        let span = self.peek_span();
        let Some(token) = self.bump() else {
            return Err(ParseError::new(ParseErrorKind::UnexpectedEof, span));
        };
        let value = match token.kind {
            TokenKind::UnquotedString => ScalarValue::String(Text::new(token.text)),
            TokenKind::QuotedString => {
                let inner = &token.text[1..token.text.len() - 1];
                ScalarValue::String(Text::quoted(inner))
            }
            TokenKind::Number => match Number::parse(token.text) {
                Some(n) => ScalarValue::Number(n),
                None => ScalarValue::String(Text::new(token.text)),
            },
            TokenKind::Date => match Date::parse(token.text) {
                Some(d) => ScalarValue::Date(d),
                None => ScalarValue::String(Text::new(token.text)),
            },
            _ => return Err(ParseError::new(ParseErrorKind::UnexpectedToken, token.span)),
        };
        Ok(self.commented(pre, value))
    }

    /// An operator, possibly on a later line. Restores the cursor when none
    /// follows.
    fn operator(&mut self) -> Option<Commented<Operator>> {
        let start = self.pos;
        let pre = self.pre_comments();
        let op = self
            .peek()
            .filter(|t| t.kind == TokenKind::Operator)
            .and_then(|t| Operator::parse(t.text));
        if let Some(op) = op {
            self.pos += 1;
            return Some(self.commented(pre, op));
        }
        self.pos = start;
        None
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        let pre = self.pre_comments();
        let Some(kind) = self.peek_kind() else {
            return Err(ParseError::new(ParseErrorKind::UnexpectedEof, self.eof));
        };
        match kind {
            TokenKind::LBrace => Ok(Value::Object(self.object(pre)?)),
            _ if kind.is_key() => Ok(Value::Scalar(self.scalar(pre)?)),
            _ => Err(ParseError::new(ParseErrorKind::ExpectedValue, self.peek_span())),
        }
    }

    fn object(&mut self, pre: Vec<Comment>) -> Result<Object, ParseError> {
        let open_span = self.peek_span();
        self.pos += 1;
        let open = self.commented(pre, BraceKind::Open);
        let mut items = Vec::new();
        loop {
            let pre = self.pre_comments();
            let Some(token) = self.peek() else {
                if self.strict {
                    return Err(ParseError::new(ParseErrorKind::UnclosedObject, open_span));
                }
                trace!(offset = open_span.start, "closing object at end of input");
                let close = Commented {
                    value: BraceKind::Close,
                    pre_comments: pre,
                    post_comment: None,
                };
                return Ok(Object {
                    open,
                    entries: Entries::new(items),
                    close,
                });
            };
            let (kind, span) = (token.kind, token.span);
            match kind {
                TokenKind::RBrace => {
                    self.pos += 1;
                    let close = self.commented(pre, BraceKind::Close);
                    return Ok(Object {
                        open,
                        entries: Entries::new(items),
                        close,
                    });
                }
                TokenKind::LBrace => items.push(Item::Value(Value::Object(self.object(pre)?))),
                _ if kind.is_key() => {
                    let key = self.scalar(pre)?;
                    match self.operator() {
                        Some(op) => {
                            let value = self.value()?;
                            items.push(Item::Pair(Pair { key, op, value }));
                        }
                        None => items.push(Item::Value(Value::Scalar(key))),
                    }
                }
                TokenKind::Operator => {
                    return Err(ParseError::new(ParseErrorKind::ExpectedKey, span));
                }
                _ => return Err(ParseError::new(ParseErrorKind::UnexpectedToken, span)),
            }
        }
    }
}

#[cfg(test)]
mod tests;
