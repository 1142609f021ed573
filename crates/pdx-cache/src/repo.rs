//! Git metadata used to name cache entries by commit.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use git2::{Diff, ErrorCode, Repository, Sort, StatusOptions, Tree};
use tracing::{debug, info};

use crate::CacheError;

/// What one scan of a working tree learned.
#[derive(Debug, Clone, Default)]
pub struct RepoInfo {
    /// Last commit touching each tracked file, keyed by path relative to
    /// the working tree root.
    pub latest_commit: HashMap<PathBuf, String>,
    /// Paths with uncommitted changes. An untracked directory is listed
    /// once, as the directory itself.
    pub dirty: Vec<PathBuf>,
}

impl RepoInfo {
    /// Commit that last touched `rel`, provided neither it nor any of its
    /// ancestors has uncommitted changes.
    pub fn clean_commit(&self, rel: &Path) -> Option<&str> {
        if self.dirty.iter().any(|d| rel.starts_with(d)) {
            return None;
        }
        self.latest_commit.get(rel).map(String::as_str)
    }
}

/// Find the working tree enclosing `dir`, if any.
pub fn discover(dir: &Path) -> Result<Option<Repository>, CacheError> {
    match Repository::discover(dir) {
        Ok(repo) if repo.workdir().is_some() => Ok(Some(repo)),
        Ok(_) => Ok(None),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Walk the full history once and read the working tree status once.
pub fn scan(repo: &Repository) -> Result<RepoInfo, CacheError> {
    let start = Instant::now();
    let latest_commit = latest_commits(repo)?;
    let dirty = dirty_paths(repo)?;
    let name = repo
        .workdir()
        .and_then(|w| w.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    info!(
        repo = %name,
        files = latest_commit.len(),
        dirty = dirty.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "scanned repository"
    );
    Ok(RepoInfo {
        latest_commit,
        dirty,
    })
}

fn latest_commits(repo: &Repository) -> Result<HashMap<PathBuf, String>, CacheError> {
    let mut index = repo.index()?;
    index.read(false)?;
    let mut tracked: HashSet<PathBuf> = index
        .iter()
        .filter_map(|entry| std::str::from_utf8(&entry.path).ok().map(PathBuf::from))
        .collect();
    let mut latest = HashMap::with_capacity(tracked.len());

    let mut revwalk = repo.revwalk()?;
    revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
    if let Err(e) = revwalk.push_head() {
        // no commits yet
        if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound {
            return Ok(latest);
        }
        return Err(e.into());
    }

    for oid in revwalk {
        if tracked.is_empty() {
            break;
        }
        let commit = repo.find_commit(oid?)?;
        let tree = commit.tree()?;
        let id = commit.id().to_string();

        let mut touched = Vec::new();
        if commit.parent_count() == 0 {
            collect_paths(&diff(repo, None, &tree)?, &mut touched);
        }
        for parent in commit.parents() {
            collect_paths(&diff(repo, Some(&parent.tree()?), &tree)?, &mut touched);
        }
        for path in touched {
            if tracked.remove(&path) {
                latest.insert(path, id.clone());
            }
        }
    }
    debug!(untouched = tracked.len(), "history walk finished");
    Ok(latest)
}

fn diff<'r>(
    repo: &'r Repository,
    old: Option<&Tree<'_>>,
    new: &Tree<'_>,
) -> Result<Diff<'r>, CacheError> {
    Ok(repo.diff_tree_to_tree(old, Some(new), None)?)
}

fn collect_paths(diff: &Diff<'_>, out: &mut Vec<PathBuf>) {
    for delta in diff.deltas() {
        if let Some(path) = delta.new_file().path() {
            out.push(path.to_path_buf());
        }
    }
}

fn dirty_paths(repo: &Repository) -> Result<Vec<PathBuf>, CacheError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(false)
        .include_ignored(false);
    let statuses = repo.statuses(Some(&mut opts))?;
    Ok(statuses
        .iter()
        .filter_map(|entry| entry.path().map(PathBuf::from))
        .collect())
}
