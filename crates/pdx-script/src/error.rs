use std::path::{Path, PathBuf};

use pdx_files::ResolveError;
use pdx_parse::ParseError;

/// Errors from file-level operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Lex {
        path: PathBuf,
        text: String,
        source: ParseError,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        text: String,
        source: ParseError,
    },

    #[error("{} is not valid {encoding}", path.display())]
    Decode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error("cannot encode {} as {encoding}", path.display())]
    Encode {
        path: PathBuf,
        encoding: &'static str,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("no file matches {0:?}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
        move |source| Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn syntax(path: &Path, text: String, source: ParseError) -> Self {
        let path = path.to_path_buf();
        if source.is_lex_error() {
            Error::Lex { path, text, source }
        } else {
            Error::Parse { path, text, source }
        }
    }

    /// The file this error is about, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Error::Io { path, .. }
            | Error::Lex { path, .. }
            | Error::Parse { path, .. }
            | Error::Decode { path, .. }
            | Error::Encode { path, .. } => Some(path),
            Error::Resolve(_) | Error::NotFound(_) => None,
        }
    }

    /// Render a source-annotated report for lex and parse errors.
    pub fn render(&self) -> Option<String> {
        match self {
            Error::Lex { path, text, source } | Error::Parse { path, text, source } => {
                Some(source.render(&path.to_string_lossy(), text))
            }
            _ => None,
        }
    }
}
