//! Release decision and execution.
//!
//! The rules here answer "is a release needed, and what should the next
//! version be?" by comparing the latest semver tag's target commit to HEAD.
//! Everything is generic over [Repository] and reports through a
//! [ReleaseObserver], so the logic is testable without a real repository or
//! captured output streams.

use git2::Oid;
use semver::Version;

use crate::config::ReleaseConfig;
use crate::error::Result;
use crate::git::{CommitDetails, Repository};
use crate::version::{self, ReleaseType};

/// Callback interface for progress and skip notices.
///
/// Keeps printing out of the decision logic; the CLI installs a console
/// observer, tests a silent or recording one.
pub trait ReleaseObserver {
    /// A tag name did not parse as a semantic version and was excluded.
    fn tag_skipped(&self, tag: &str, error: &semver::Error);

    /// A human-readable progress line.
    fn progress(&self, message: &str);
}

/// Observer that discards everything.
pub struct SilentObserver;

impl ReleaseObserver for SilentObserver {
    fn tag_skipped(&self, _tag: &str, _error: &semver::Error) {}
    fn progress(&self, _message: &str) {}
}

/// Options for [run_release].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReleaseOptions {
    pub release_type: ReleaseType,
    /// Push all tag refs to the configured remote after tagging.
    pub push: bool,
}

/// What [run_release] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Nothing to tag; `version` is the existing latest version.
    UpToDate { version: Version },
    /// A new annotated tag was created.
    Tagged {
        version: Version,
        tag: String,
        target: Oid,
        /// Whether a release commit was synthesized for a dirty worktree.
        committed: bool,
        pushed: bool,
    },
}

/// The maximum semantic version among the repository's tags, 0.0.0 if none.
pub fn latest_version<R: Repository + ?Sized>(
    repo: &R,
    observer: &dyn ReleaseObserver,
) -> Result<Version> {
    let tags = repo.list_tags()?;
    Ok(version::max_version(&tags, |tag, error| {
        observer.tag_skipped(tag, error)
    }))
}

/// Resolve the tag for a version to its target commit.
///
/// Tries the `v`-prefixed name first, then the bare version string.
fn find_version_tag<R: Repository + ?Sized>(repo: &R, version: &Version) -> Result<Option<Oid>> {
    if let Some(oid) = repo.tag_target(&format!("v{}", version))? {
        return Ok(Some(oid));
    }
    repo.tag_target(&version.to_string())
}

/// Decide whether HEAD contains changes not represented by the latest tag.
///
/// `dirty_tree_id` is the would-be tree hash of the worktree when it has
/// pending changes, `None` when clean. The rules, in order:
///
/// 1. Pending changes whose tree differs from HEAD's always need a release.
/// 2. No latest-version tag at all is the initial release: needed.
/// 3. The tag targeting HEAD itself: not needed.
/// 4. The tag targeting a commit whose only parent is HEAD: not needed
///    (the previous release appended exactly one commit with nothing after).
/// 5. Anything else: needed.
pub fn release_needed(
    latest_tag: Option<&CommitDetails>,
    head: &CommitDetails,
    dirty_tree_id: Option<Oid>,
) -> bool {
    if let Some(tree_id) = dirty_tree_id {
        if tree_id != head.tree_id {
            return true;
        }
    }

    let Some(tag) = latest_tag else {
        return true;
    };

    if tag.id == head.id {
        return false;
    }

    if tag.parent_ids.len() == 1 && tag.parent_ids[0] == head.id {
        return false;
    }

    true
}

/// Whether a release is needed, reading the repository state once.
pub fn check_release_needed<R: Repository + ?Sized>(
    repo: &R,
    observer: &dyn ReleaseObserver,
) -> Result<bool> {
    let latest = latest_version(repo, observer)?;
    needed_for(repo, &latest)
}

fn needed_for<R: Repository + ?Sized>(repo: &R, latest: &Version) -> Result<bool> {
    let head = repo.head()?;

    let dirty_tree_id = if repo.is_worktree_clean()? {
        None
    } else {
        Some(repo.worktree_tree_id()?)
    };

    let tag_details = match find_version_tag(repo, latest)? {
        Some(oid) => Some(repo.commit_details(oid)?),
        None => None,
    };

    Ok(release_needed(tag_details.as_ref(), &head, dirty_tree_id))
}

/// Create the next release tag.
///
/// Resolves the latest version, short-circuits when no release is needed,
/// synthesizes a release commit for a dirty worktree, creates the annotated
/// tag `v<next>`, and optionally pushes all tag refs to the configured
/// remote. Any failure aborts immediately; no rollback is attempted.
pub fn run_release<R: Repository + ?Sized>(
    repo: &R,
    config: &ReleaseConfig,
    options: &ReleaseOptions,
    observer: &dyn ReleaseObserver,
) -> Result<ReleaseOutcome> {
    let latest = latest_version(repo, observer)?;
    observer.progress(&format!("Latest version: {}", latest));

    if !needed_for(repo, &latest)? {
        observer.progress("No changes since last release, nothing to tag");
        return Ok(ReleaseOutcome::UpToDate { version: latest });
    }

    let next = version::next_version(&latest, options.release_type);
    let message = format!("Release {}", next);

    let (target, committed) = if repo.is_worktree_clean()? {
        (repo.head()?.id, false)
    } else {
        let oid = repo.commit_all(&message, &config.identity)?;
        observer.progress("Committed changes");
        (oid, true)
    };

    let tag = version::tag_name(&next);
    repo.create_annotated_tag(&tag, target, &config.identity, &message)?;
    observer.progress(&format!("Created tag {}", tag));

    let pushed = if options.push || config.remote.push {
        repo.push_tags(&config.remote.name)?;
        observer.progress(&format!("Pushed tags to {}", config.remote.name));
        true
    } else {
        false
    };

    Ok(ReleaseOutcome::Tagged {
        version: next,
        tag,
        target,
        committed,
        pushed,
    })
}
