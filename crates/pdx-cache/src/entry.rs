//! On-disk cache entries.
//!
//! An entry is a postcard-encoded `u32` format version followed by the
//! tree. The version is decoded on its own first so a layout change is
//! reported as a version mismatch rather than garbage.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use pdx_tree::TopLevel;

use crate::CacheError;

/// Bump whenever the serialized shape of the tree changes.
pub const FORMAT_VERSION: u32 = 1;

/// Cache key for a source file read with a given encoding.
pub fn cache_key(path: &Path, encoding: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(encoding.as_bytes());
    hasher.update(path.as_os_str().as_encoded_bytes());
    hex::encode(&hasher.finalize().as_bytes()[..16])
}

/// Where a source file's entry lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPath {
    pub path: PathBuf,
    /// Named after the commit that last touched the source, so it is valid
    /// whenever it exists.
    pub content_addressed: bool,
}

impl EntryPath {
    /// Whether the entry may be used for `source`.
    pub(crate) fn is_fresh(&self, source: &Path) -> Result<bool, CacheError> {
        let entry_time = match modified(&self.path) {
            Ok(time) => time,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(source) => {
                return Err(CacheError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if self.content_addressed {
            return Ok(true);
        }
        let source_time = modified(source).map_err(|e| CacheError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        Ok(entry_time >= source_time)
    }
}

fn modified(path: &Path) -> std::io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

pub(crate) fn encode(tree: &TopLevel) -> Result<Vec<u8>, CacheError> {
    let mut bytes = postcard::to_stdvec(&FORMAT_VERSION).map_err(CacheError::Encode)?;
    bytes.extend(postcard::to_stdvec(tree).map_err(CacheError::Encode)?);
    Ok(bytes)
}

pub(crate) fn decode(path: &Path, bytes: &[u8]) -> Result<TopLevel, CacheError> {
    let decode_err = |source| CacheError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let (found, rest) = postcard::take_from_bytes::<u32>(bytes).map_err(decode_err)?;
    if found != FORMAT_VERSION {
        return Err(CacheError::Version {
            path: path.to_path_buf(),
            found,
            expected: FORMAT_VERSION,
        });
    }
    postcard::from_bytes(rest).map_err(decode_err)
}

pub(crate) fn load(path: &Path) -> Result<TopLevel, CacheError> {
    let bytes = fs::read(path).map_err(|source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode(path, &bytes)
}

/// Write `tree` to `path` through a temporary file in the same directory,
/// so concurrent readers never see a partial entry.
pub(crate) fn store(path: &Path, tree: &TopLevel) -> Result<(), CacheError> {
    let bytes = encode(tree)?;
    let io_err = |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or(Path::new("."));
    fs::create_dir_all(dir).map_err(io_err)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(&bytes).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
