use crate::config::IdentityConfig;
use crate::error::{Result, SemverReleaseError};
use crate::git::CommitDetails;
use git2::{Oid, Repository as Git2Repo, Signature};
use std::path::{Path, PathBuf};

/// Locate the repository root by walking upward from `start`.
///
/// Returns the nearest ancestor (inclusive) containing a `.git` directory,
/// or [SemverReleaseError::RepositoryNotFound] once the filesystem root is
/// reached without finding one.
pub fn find_repository_root(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();

    loop {
        if dir.join(".git").exists() {
            return Ok(dir);
        }

        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => return Err(SemverReleaseError::RepositoryNotFound(start.to_path_buf())),
        }
    }
}

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open the repository containing `path`.
    ///
    /// Walks upward from `path` to the repository root before opening.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let start = path.as_ref().canonicalize()?;
        let root = find_repository_root(&start)?;
        let repo = Git2Repo::open(root)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn details_of(&self, commit: &git2::Commit<'_>) -> CommitDetails {
        CommitDetails {
            id: commit.id(),
            parent_ids: commit.parent_ids().collect(),
            tree_id: commit.tree_id(),
        }
    }

    fn signature(identity: &IdentityConfig) -> Result<Signature<'static>> {
        Ok(Signature::now(&identity.name, &identity.email)?)
    }
}

impl super::Repository for Git2Repository {
    fn list_tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn tag_target(&self, tag_name: &str) -> Result<Option<Oid>> {
        let reference_name = format!("refs/tags/{}", tag_name);

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                // Peels annotated tag objects to their target commit;
                // lightweight tags already point at one.
                let commit = reference.peel_to_commit().map_err(|e| {
                    SemverReleaseError::tag(format!(
                        "Cannot resolve tag '{}' to a commit: {}",
                        tag_name, e
                    ))
                })?;

                Ok(Some(commit.id()))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(SemverReleaseError::tag(format!(
                "Cannot find tag '{}': {}",
                tag_name, e
            ))),
        }
    }

    fn head(&self) -> Result<CommitDetails> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(self.details_of(&commit))
    }

    fn commit_details(&self, oid: Oid) -> Result<CommitDetails> {
        let commit = self.repo.find_commit(oid)?;
        Ok(self.details_of(&commit))
    }

    fn is_worktree_clean(&self) -> Result<bool> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);

        let statuses = self.repo.statuses(Some(&mut opts))?;
        Ok(statuses.is_empty())
    }

    fn worktree_tree_id(&self) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None)?;

        // write_tree stores the tree object but the staged entries stay
        // in memory only; the on-disk index is never written back.
        Ok(index.write_tree()?)
    }

    fn commit_all(&self, message: &str, identity: &IdentityConfig) -> Result<Oid> {
        let mut index = self.repo.index()?;
        index.add_all(["*"], git2::IndexAddOption::DEFAULT, None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let parent = self.repo.head()?.peel_to_commit()?;
        let signature = Self::signature(identity)?;

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        Ok(oid)
    }

    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        identity: &IdentityConfig,
        message: &str,
    ) -> Result<()> {
        let object = self
            .repo
            .find_object(target, None)
            .map_err(|e| SemverReleaseError::tag(format!("Cannot find tag target: {}", e)))?;
        let signature = Self::signature(identity)?;

        self.repo
            .tag(name, &object, &signature, message, false)
            .map_err(|e| SemverReleaseError::tag(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote)
            .map_err(|e| SemverReleaseError::remote(format!("Cannot find remote: {}", e)))?;

        let mut push_options = git2::PushOptions::new();

        // SSH key / agent authentication, falling back to default credentials
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                let username = username_from_url.unwrap_or("git");
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());

                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let key_path = PathBuf::from(&home).join(".ssh").join(key);
                    if key_path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &key_path, None) {
                            return Ok(cred);
                        }
                    }
                }

                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }

            git2::Cred::default()
        });

        push_options.remote_callbacks(callbacks);

        remote
            .push(
                &["refs/tags/*:refs/tags/*"],
                Some(&mut push_options),
            )
            .map_err(|e| {
                if e.class() == git2::ErrorClass::Net {
                    SemverReleaseError::remote(format!("Network error during push: {}", e))
                } else {
                    SemverReleaseError::remote(format!("Failed to push tags: {}", e))
                }
            })?;

        Ok(())
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send + Sync.
// git2 library is thread-safe for read operations via libgit2's thread-safe design.
unsafe impl Sync for Git2Repository {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_repository_root_from_nested_dir() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("a/b/c")).unwrap();

        let found = find_repository_root(&root.join("a/b/c")).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn test_find_repository_root_inclusive() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();

        assert_eq!(find_repository_root(&root).unwrap(), root);
    }

    #[test]
    fn test_find_repository_root_not_found() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = find_repository_root(temp.path());
        assert!(matches!(
            result,
            Err(SemverReleaseError::RepositoryNotFound(_))
        ));
    }
}
