//! Two-tier cache for parse trees.
//!
//! The memory tier maps absolute paths and encodings to trees for the
//! lifetime of a [`CacheContext`]. The disk tier stores postcard-encoded trees under a
//! cache root:
//!
//! - `<root>/<repo>/<commit>/<key>` for files that are tracked by git and
//!   clean in the working tree. These are trusted whenever they exist.
//! - `<root>/<repo>/<key>`, `<root>/base/<key>` or `<root>/<key>` for
//!   everything else. These are used only when at least as new as the
//!   source file.
//!
//! Any failure to read or decode an entry counts as a miss and is logged.
//! Removing the cache never changes what a parse returns.

mod entry;
mod error;
pub mod repo;

pub use entry::{EntryPath, FORMAT_VERSION, cache_key};
pub use error::CacheError;
pub use repo::RepoInfo;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use pdx_tree::TopLevel;
use tracing::{debug, trace, warn};

/// Directory under the cache root for a base directory outside git.
const BASE_DIR_NAME: &str = "base";

/// Which tiers a lookup may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub memory: bool,
    pub disk: bool,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            memory: false,
            disk: true,
        }
    }
}

/// Hit and miss counters for one context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} hits, {} misses", self.hits, self.misses)
    }
}

/// Cache state for one batch run. Create one, parse through it, drop it.
#[derive(Debug)]
pub struct CacheContext {
    root: PathBuf,
    base_dir: Option<PathBuf>,
    base_is_repo: bool,
    memory: HashMap<(PathBuf, String), TopLevel>,
    repos: HashMap<PathBuf, RepoInfo>,
    outside_repo: HashSet<PathBuf>,
    stats: CacheStats,
}

impl CacheContext {
    /// A context storing disk entries under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_dir: None,
            base_is_repo: true,
            memory: HashMap::new(),
            repos: HashMap::new(),
            outside_repo: HashSet::new(),
            stats: CacheStats::default(),
        }
    }

    /// Files under `base_dir` that are not in a git working tree get their
    /// own subdirectory of the cache root.
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Return the cached tree for `path`, or run `parse` and cache its result.
    ///
    /// `path` should be absolute and canonical; it is part of the key.
    /// Errors from `parse` are passed through and nothing is cached.
    pub fn get_or_parse<E>(
        &mut self,
        path: &Path,
        encoding: &str,
        policy: CachePolicy,
        parse: impl FnOnce() -> Result<TopLevel, E>,
    ) -> Result<TopLevel, E> {
        let memory_key = (path.to_path_buf(), encoding.to_string());
        if let Some(tree) = self.memory.get(&memory_key) {
            trace!(path = %path.display(), "memory hit");
            self.stats.hits += 1;
            return Ok(tree.clone());
        }

        let entry = policy.disk.then(|| self.entry_path(path, encoding));
        if let Some(entry) = &entry
            && let Some(tree) = self.load(entry, path)
        {
            debug!(path = %path.display(), content_addressed = entry.content_addressed, "disk hit");
            self.stats.hits += 1;
            if policy.memory {
                self.memory.insert(memory_key, tree.clone());
            }
            return Ok(tree);
        }

        debug!(path = %path.display(), "cache miss");
        self.stats.misses += 1;
        let tree = parse()?;
        if let Some(entry) = &entry
            && let Err(e) = entry::store(&entry.path, &tree)
        {
            warn!(path = %path.display(), error = %e, "failed to write cache entry");
        }
        if policy.memory {
            self.memory.insert(memory_key, tree.clone());
        }
        Ok(tree)
    }

    fn load(&self, entry: &EntryPath, source: &Path) -> Option<TopLevel> {
        let result = entry.is_fresh(source).and_then(|fresh| {
            if fresh {
                entry::load(&entry.path).map(Some)
            } else {
                Ok(None)
            }
        });
        match result {
            Ok(tree) => tree,
            Err(e) => {
                warn!(source = %source.display(), error = %e, "discarding cache entry");
                None
            }
        }
    }

    /// Where the disk entry for `path` lives.
    ///
    /// The first lookup inside a working tree scans its history; the
    /// result is kept until [`invalidate_repo`](Self::invalidate_repo).
    pub fn entry_path(&mut self, path: &Path, encoding: &str) -> EntryPath {
        let key = cache_key(path, encoding);
        let mtime_checked = |path: PathBuf| EntryPath {
            path,
            content_addressed: false,
        };

        if self.under_base_outside_repo(path) {
            return mtime_checked(self.root.join(BASE_DIR_NAME).join(key));
        }

        let Some(workdir) = self.repo_root(path) else {
            if self.under_base(path) {
                self.base_is_repo = false;
                return mtime_checked(self.root.join(BASE_DIR_NAME).join(key));
            }
            return mtime_checked(self.root.join(key));
        };

        let repo_dir = self.root.join(repo_dir_name(&workdir));
        let commit = path
            .strip_prefix(&workdir)
            .ok()
            .and_then(|rel| self.repos.get(&workdir)?.clean_commit(rel));
        match commit {
            Some(commit) => EntryPath {
                path: repo_dir.join(commit).join(key),
                content_addressed: true,
            },
            None => mtime_checked(repo_dir.join(key)),
        }
    }

    fn under_base(&self, path: &Path) -> bool {
        self.base_dir.as_ref().is_some_and(|b| path.starts_with(b))
    }

    fn under_base_outside_repo(&self, path: &Path) -> bool {
        !self.base_is_repo && self.under_base(path)
    }

    /// Working tree root enclosing `path`, scanning it on first sight.
    fn repo_root(&mut self, path: &Path) -> Option<PathBuf> {
        if let Some(root) = self.repos.keys().find(|root| path.starts_with(root)) {
            return Some(root.clone());
        }
        let dir = path.parent()?;
        if self.outside_repo.contains(dir) {
            return None;
        }

        let found = match repo::discover(dir) {
            Ok(Some(repo)) => {
                let root = normalize_workdir(repo.workdir()?);
                match repo::scan(&repo) {
                    Ok(info) => Some((root, info)),
                    Err(e) => {
                        warn!(repo = %root.display(), error = %e, "failed to scan repository");
                        None
                    }
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to open repository");
                None
            }
        };

        match found {
            Some((root, info)) => {
                self.repos.insert(root.clone(), info);
                Some(root)
            }
            None => {
                self.outside_repo.insert(dir.to_path_buf());
                None
            }
        }
    }

    /// Drop every tree from the memory tier.
    pub fn flush(&mut self) {
        self.memory.clear();
    }

    /// Drop the trees of one path, in every encoding, from the memory tier.
    pub fn flush_path(&mut self, path: &Path) {
        self.memory.retain(|(cached, _), _| cached != path);
    }

    /// Forget the git metadata of the working tree containing `path`, or
    /// of every working tree when `path` is `None`. The next lookup
    /// rescans.
    pub fn invalidate_repo(&mut self, path: Option<&Path>) {
        match path {
            None => {
                self.repos.clear();
                self.outside_repo.clear();
            }
            Some(path) => {
                self.repos.retain(|root, _| !path.starts_with(root));
                self.outside_repo.retain(|dir| !path.starts_with(dir));
            }
        }
    }

    /// Memoized metadata of the working tree rooted at `root`, if scanned.
    pub fn repo_info(&self, root: &Path) -> Option<&RepoInfo> {
        self.repos.get(root)
    }
}

/// libgit2 reports working trees with a trailing separator.
fn normalize_workdir(root: &Path) -> PathBuf {
    root.components().collect()
}

fn repo_dir_name(workdir: &Path) -> String {
    workdir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string())
}
