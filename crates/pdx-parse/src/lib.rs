//! Recursive-descent parser for Paradox-style script files.
//!
//! The full profile attaches comments to the nodes they surround so the
//! tree can be printed back losslessly; the simple profile drops them.
//!
//! ```
//! use pdx_parse::parse;
//! use pdx_tokenizer::Profile;
//!
//! let top = parse("a = 1 # one\na = 2", Profile::Full).unwrap();
//! assert_eq!(top.len(), 2);
//! assert_eq!(top.get("a").and_then(|v| v.as_i64()), Some(2));
//! ```

pub use pdx_tokenizer::{LexError, Profile, Span};

mod error;
pub use error::{ParseError, ParseErrorKind};

mod parser;
pub use parser::Parser;

/// Parse a whole file in strict mode.
pub fn parse(source: &str, profile: Profile) -> Result<pdx_tree::TopLevel, ParseError> {
    Parser::new(source, profile).parse()
}
