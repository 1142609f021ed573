//! Test helpers shared by the pdx-script crates.
//!
//! Nothing here is meant for production use: every helper panics on
//! failure so tests stay short.

use std::path::{Path, PathBuf};

use git2::{IndexAddOption, Oid, Repository, Signature};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; output goes through the libtest capture.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A throwaway directory tree of script files.
pub struct Corpus {
    dir: TempDir,
}

impl Corpus {
    /// Create an empty corpus in a fresh temporary directory.
    pub fn new() -> Self {
        init_tracing();
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Root of the corpus.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of `rel` inside the corpus.
    pub fn join(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Write `contents` to `rel`, creating parent directories.
    pub fn write(&self, rel: impl AsRef<Path>, contents: &str) -> PathBuf {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dirs");
        }
        std::fs::write(&path, contents).expect("write corpus file");
        path
    }

    /// Create a directory (and parents) inside the corpus.
    pub fn mkdir(&self, rel: impl AsRef<Path>) -> PathBuf {
        let path = self.join(rel);
        std::fs::create_dir_all(&path).expect("create dir");
        path
    }

    /// Turn the corpus root into a git repository with a test identity.
    pub fn git_init(&self) -> Repository {
        let repo = Repository::init(self.path()).expect("git init");
        {
            let mut config = repo.config().expect("repo config");
            config.set_str("user.name", "Test User").expect("set name");
            config
                .set_str("user.email", "test@example.com")
                .expect("set email");
        }
        repo
    }

    /// Stage everything and commit it on top of HEAD.
    pub fn commit_all(&self, message: &str) -> Oid {
        let repo = Repository::open(self.path()).expect("open repo");
        let mut index = repo.index().expect("repo index");
        index
            .add_all(["*"], IndexAddOption::DEFAULT, None)
            .expect("stage files");
        index.write().expect("write index");
        let tree_oid = index.write_tree().expect("write tree");
        let tree = repo.find_tree(tree_oid).expect("find tree");
        let sig = Signature::now("Test User", "test@example.com").expect("signature");
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<_> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("commit")
    }
}

impl Default for Corpus {
    fn default() -> Self {
        Self::new()
    }
}
