//! Layered file resolution.
//!
//! A base directory is overlaid by override directories. Each override may
//! add files, shadow files with the same relative path, or suppress whole
//! subtrees of lower layers by listing them as `replace_path = "..."` in its
//! descriptor (the first `*.mod` file directly inside it).
//!
//! ```no_run
//! use pdx_files::Layers;
//!
//! let layers = Layers::new("/games/base").with_overrides(["/mods/bottom", "/mods/top"]);
//! for path in layers.files("history/provinces/*.txt", false)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), pdx_files::ResolveError>(())
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use regex::Regex;
use tracing::{debug, trace};

/// Extension of the descriptor file that declares `replace_path` entries.
pub const DESCRIPTOR_EXTENSION: &str = "mod";

/// Errors raised while resolving files.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("directory not found: {}", .0.display())]
    MissingDir(PathBuf),

    #[error("invalid glob pattern {pattern:?}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

/// A base directory plus override directories, applied in order so later
/// directories win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layers {
    base_dir: PathBuf,
    override_dirs: Vec<PathBuf>,
}

impl Layers {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            override_dirs: Vec::new(),
        }
    }

    /// Set the override directories, lowest priority first. Each one is
    /// laid over the base and every directory before it.
    pub fn with_overrides<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.override_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn override_dirs(&self) -> &[PathBuf] {
        &self.override_dirs
    }

    /// Resolve `pattern` across all layers. See [`files`].
    pub fn files(&self, pattern: &str, reverse: bool) -> Result<Vec<PathBuf>, ResolveError> {
        files(pattern, &self.override_dirs, &self.base_dir, reverse)
    }

    /// The first path in resolution order, if any layer matches.
    pub fn first_file(&self, pattern: &str) -> Result<Option<PathBuf>, ResolveError> {
        Ok(self.files(pattern, false)?.into_iter().next())
    }
}

/// Resolve `pattern` relative to `base_dir` and every override directory.
///
/// Layers are applied in order, the base first and then `override_dirs` as
/// given: each one first drops everything strictly beneath its
/// `replace_path` entries, then adds its own matches, overwriting any file
/// already present at the same relative path. The last directory wins.
///
/// The result is sorted by relative path components (descending when
/// `reverse` is set), so `a/z.txt` sorts before `a_b/a.txt`.
pub fn files<P: AsRef<Path>>(
    pattern: &str,
    override_dirs: &[P],
    base_dir: &Path,
    reverse: bool,
) -> Result<Vec<PathBuf>, ResolveError> {
    let mut resolved: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    let layers = std::iter::once(base_dir).chain(override_dirs.iter().map(|dir| dir.as_ref()));
    for dir in layers {
        if !dir.is_dir() {
            return Err(ResolveError::MissingDir(dir.to_path_buf()));
        }

        let replaced = replace_paths(dir)?;
        if !replaced.is_empty() {
            resolved.retain(|rel, abs| {
                let keep = !replaced.iter().any(|r| rel != r && rel.starts_with(r));
                if !keep {
                    debug!(path = %abs.display(), layer = %dir.display(), "removed by replace_path");
                }
                keep
            });
        }

        for path in matches(dir, pattern)? {
            let Ok(rel) = path.strip_prefix(dir) else {
                continue;
            };
            trace!(path = %path.display(), "matched");
            resolved.insert(rel.to_path_buf(), path);
        }
    }

    let paths = resolved.into_values();
    Ok(if reverse {
        paths.rev().collect()
    } else {
        paths.collect()
    })
}

/// The `replace_path` entries declared by `dir`'s descriptor, relative to
/// the layer root. A directory without a descriptor declares none.
pub fn replace_paths(dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
    let Some(descriptor) = descriptor(dir)? else {
        return Ok(Vec::new());
    };
    let bytes = fs::read(&descriptor).map_err(|source| ResolveError::Io {
        path: descriptor.clone(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    let re = Regex::new(r#"(?m)^[ \t]*replace_path\s*=\s*"([^"]+)""#)?;
    let paths: Vec<PathBuf> = re
        .captures_iter(&text)
        .map(|caps| PathBuf::from(caps[1].replace('\\', "/")))
        .collect();
    debug!(descriptor = %descriptor.display(), count = paths.len(), "read replace_path entries");
    Ok(paths)
}

/// First descriptor file in `dir`, by file name.
fn descriptor(dir: &Path) -> Result<Option<PathBuf>, ResolveError> {
    let io_err = |source| ResolveError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == DESCRIPTOR_EXTENSION) && path.is_file() {
            found.push(path);
        }
    }
    found.sort();
    Ok(found.into_iter().next())
}

fn matches(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, ResolveError> {
    let root = dir
        .to_str()
        .ok_or_else(|| ResolveError::NonUtf8Path(dir.to_path_buf()))?;
    let full = format!("{}/{}", Pattern::escape(root), pattern.trim_start_matches('/'));
    let paths = glob::glob(&full).map_err(|source| ResolveError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut out = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => out.push(path),
            Err(e) => {
                return Err(ResolveError::Io {
                    path: e.path().to_path_buf(),
                    source: e.into_error(),
                });
            }
        }
    }
    Ok(out)
}
