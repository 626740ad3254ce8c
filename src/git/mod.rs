//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the handful of git
//! operations semver-release performs, allowing for a real implementation
//! backed by the `git2` crate and a mock implementation for testing.
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations; the release decision and executor in [crate::release]
//! are generic over it.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::{find_repository_root, Git2Repository};

use crate::config::IdentityConfig;
use crate::error::Result;
use git2::Oid;

/// The facts about a commit the release decision needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetails {
    /// The commit hash
    pub id: Oid,
    /// Parent commit hashes, in order
    pub parent_ids: Vec<Oid>,
    /// Hash of the tree the commit snapshots
    pub tree_id: Oid,
}

/// Common git operation trait for abstraction
///
/// All methods return [crate::error::Result] so implementations map
/// underlying `git2::Error`s onto the crate's error taxonomy. Implementors
/// must be `Send + Sync`.
pub trait Repository: Send + Sync {
    /// All tag short names in the repository.
    fn list_tags(&self) -> Result<Vec<String>>;

    /// Resolve a tag name to its target commit.
    ///
    /// One level of annotation is dereferenced: an annotated tag object
    /// resolves to the commit it targets, a lightweight tag directly to the
    /// commit it points at. Returns `Ok(None)` if the tag does not exist.
    fn tag_target(&self, tag_name: &str) -> Result<Option<Oid>>;

    /// Details of the commit HEAD currently points at.
    fn head(&self) -> Result<CommitDetails>;

    /// Details of an arbitrary commit.
    fn commit_details(&self, oid: Oid) -> Result<CommitDetails>;

    /// Whether the worktree has no pending changes.
    ///
    /// Untracked files count as pending; ignored files do not.
    fn is_worktree_clean(&self) -> Result<bool>;

    /// The tree hash a commit of the current worktree would snapshot.
    ///
    /// This is a dry-run primitive: no commit is created and the on-disk
    /// index is left untouched. Comparing the result against HEAD's tree
    /// hash answers "would a release commit be a no-op" without mutating
    /// the repository.
    fn worktree_tree_id(&self) -> Result<Oid>;

    /// Stage all pending changes and commit them on HEAD.
    ///
    /// The commit is authored and committed by `identity`. Returns the new
    /// commit's hash.
    fn commit_all(&self, message: &str, identity: &IdentityConfig) -> Result<Oid>;

    /// Create an annotated tag pointing at `target`.
    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        identity: &IdentityConfig,
        message: &str,
    ) -> Result<()>;

    /// Push all tag refs to the named remote.
    fn push_tags(&self, remote: &str) -> Result<()>;
}
