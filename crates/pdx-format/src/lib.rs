//! Printer for Paradox-style script trees.
//!
//! Output uses `\n` line endings; callers apply their own line ending and
//! encoding when writing to disk.

mod options;
mod scalar;
mod tree_format;
mod writer;

pub use options::{FormatOptions, Indent};
pub use scalar::{can_be_bare, scalar_text};
pub use tree_format::{format_tree, format_value};

use pdx_parse::{ParseError, Parser, Profile};

/// Parse source with the full profile and print it back.
pub fn format_source(source: &str, options: &FormatOptions) -> Result<String, ParseError> {
    let tree = Parser::new(source, Profile::Full).parse()?;
    Ok(format_tree(&tree, options))
}


#[cfg(test)]
mod proptests;
