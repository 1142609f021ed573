//! A tokenizer for Paradox-style script files.
//!
//! Two profiles share one scanner: [`Profile::Full`] keeps comments and
//! newlines for lossless printing, [`Profile::Simple`] discards them.

mod span;
pub use span::Span;

mod token;
pub use token::{Profile, Token, TokenKind};

mod tokenizer;
pub use tokenizer::{
    LexError, Tokenizer, is_plain_number, is_unquoted_char, match_date, match_number, tokenize,
};
