use std::path::PathBuf;

/// Failures inside the cache. These are logged and treated as misses by
/// [`CacheContext`](crate::CacheContext); none of its public methods return
/// them.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O failed for {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt cache entry {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: postcard::Error,
    },

    #[error("cache entry {} has format version {found}, expected {expected}", path.display())]
    Version {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("failed to encode cache entry")]
    Encode(#[source] postcard::Error),

    #[error("git: {0}")]
    Git(#[from] git2::Error),
}
