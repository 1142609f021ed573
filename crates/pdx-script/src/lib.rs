//! Read, cache, resolve and write Paradox-style script files.
//!
//! [`ScriptParser`] ties together the layered file resolver, the parse tree
//! cache and the printer. One parser is meant to live for one batch run.
//!
//! ```no_run
//! use pdx_script::{ParserConfig, ScriptParser};
//!
//! let config = ParserConfig::new("/games/base").override_dirs(["/mods/mine"]);
//! let mut parser = ScriptParser::new(config);
//! for parsed in parser.parse_files("common/landed_titles/*.txt")? {
//!     let (path, tree) = parsed?;
//!     println!("{}: {} top-level items", path.display(), tree.len());
//! }
//! # Ok::<(), pdx_script::Error>(())
//! ```

mod config;
mod error;
mod parser;
pub mod text;

pub use config::{DecodePolicy, LineEnding, ParserConfig};
pub use error::Error;
pub use parser::{FileOptions, ParseFiles, ScriptParser};

pub use pdx_cache::CacheStats;
pub use pdx_files::{Layers, ResolveError, files};
pub use pdx_format::{FormatOptions, Indent, format_tree};
pub use pdx_parse::{ParseError, ParseErrorKind, Profile};
pub use pdx_tree as tree;
