use crate::config::IdentityConfig;
use crate::error::Result;
use crate::git::{CommitDetails, Repository};
use git2::Oid;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mock repository for testing without actual git operations
///
/// Mutating trait methods record what they were asked to do so tests can
/// assert on created tags, synthesized commits and pushes.
pub struct MockRepository {
    commits: Mutex<HashMap<Oid, CommitDetails>>,
    tags: Mutex<HashMap<String, Oid>>,
    head: Mutex<Option<Oid>>,
    clean: Mutex<bool>,
    worktree_tree: Mutex<Option<Oid>>,
    next_commit: Mutex<Option<CommitDetails>>,
    commit_messages: Mutex<Vec<String>>,
    tag_messages: Mutex<Vec<(String, String)>>,
    pushed_remotes: Mutex<Vec<String>>,
}

impl MockRepository {
    /// Create a new empty mock repository with a clean worktree.
    pub fn new() -> Self {
        MockRepository {
            commits: Mutex::new(HashMap::new()),
            tags: Mutex::new(HashMap::new()),
            head: Mutex::new(None),
            clean: Mutex::new(true),
            worktree_tree: Mutex::new(None),
            next_commit: Mutex::new(None),
            commit_messages: Mutex::new(Vec::new()),
            tag_messages: Mutex::new(Vec::new()),
            pushed_remotes: Mutex::new(Vec::new()),
        }
    }

    /// Add a commit to the mock repository
    pub fn add_commit(&mut self, details: CommitDetails) {
        self.commits.get_mut().unwrap().insert(details.id, details);
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&mut self, name: impl Into<String>, oid: Oid) {
        self.tags.get_mut().unwrap().insert(name.into(), oid);
    }

    /// Set the commit HEAD points at
    pub fn set_head(&mut self, oid: Oid) {
        *self.head.get_mut().unwrap() = Some(oid);
    }

    /// Mark the worktree dirty with the given would-be tree hash
    pub fn set_dirty(&mut self, worktree_tree: Oid) {
        *self.clean.get_mut().unwrap() = false;
        *self.worktree_tree.get_mut().unwrap() = Some(worktree_tree);
    }

    /// Configure the commit that the next `commit_all` call produces
    pub fn set_next_commit(&mut self, details: CommitDetails) {
        *self.next_commit.get_mut().unwrap() = Some(details);
    }

    /// Messages of commits created through `commit_all`
    pub fn commit_messages(&self) -> Vec<String> {
        self.commit_messages.lock().unwrap().clone()
    }

    /// (name, message) pairs of tags created through `create_annotated_tag`
    pub fn created_tags(&self) -> Vec<(String, String)> {
        self.tag_messages.lock().unwrap().clone()
    }

    /// Remotes pushed to through `push_tags`
    pub fn pushed_remotes(&self) -> Vec<String> {
        self.pushed_remotes.lock().unwrap().clone()
    }

    fn missing(what: &str) -> crate::error::SemverReleaseError {
        crate::error::SemverReleaseError::Git(git2::Error::from_str(what))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn list_tags(&self) -> Result<Vec<String>> {
        let mut tags: Vec<String> = self.tags.lock().unwrap().keys().cloned().collect();
        tags.sort();
        Ok(tags)
    }

    fn tag_target(&self, tag_name: &str) -> Result<Option<Oid>> {
        Ok(self.tags.lock().unwrap().get(tag_name).copied())
    }

    fn head(&self) -> Result<CommitDetails> {
        let head = *self.head.lock().unwrap();
        let head = head.ok_or_else(|| Self::missing("mock repository has no HEAD"))?;
        self.commit_details(head)
    }

    fn commit_details(&self, oid: Oid) -> Result<CommitDetails> {
        self.commits
            .lock()
            .unwrap()
            .get(&oid)
            .cloned()
            .ok_or_else(|| Self::missing("commit not found in mock repository"))
    }

    fn is_worktree_clean(&self) -> Result<bool> {
        Ok(*self.clean.lock().unwrap())
    }

    fn worktree_tree_id(&self) -> Result<Oid> {
        if let Some(tree) = *self.worktree_tree.lock().unwrap() {
            return Ok(tree);
        }
        // Clean worktree snapshots the same tree as HEAD
        Ok(self.head()?.tree_id)
    }

    fn commit_all(&self, message: &str, _identity: &IdentityConfig) -> Result<Oid> {
        let details = self
            .next_commit
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| Self::missing("mock repository has no next commit configured"))?;

        let id = details.id;
        self.commit_messages.lock().unwrap().push(message.to_string());
        self.commits.lock().unwrap().insert(id, details);
        *self.head.lock().unwrap() = Some(id);
        *self.clean.lock().unwrap() = true;
        *self.worktree_tree.lock().unwrap() = None;

        Ok(id)
    }

    fn create_annotated_tag(
        &self,
        name: &str,
        target: Oid,
        _identity: &IdentityConfig,
        message: &str,
    ) -> Result<()> {
        self.tags.lock().unwrap().insert(name.to_string(), target);
        self.tag_messages
            .lock()
            .unwrap()
            .push((name.to_string(), message.to_string()));
        Ok(())
    }

    fn push_tags(&self, remote: &str) -> Result<()> {
        self.pushed_remotes.lock().unwrap().push(remote.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oid(n: u8) -> Oid {
        Oid::from_bytes(&[n; 20]).unwrap()
    }

    fn commit(id: u8, parents: &[u8], tree: u8) -> CommitDetails {
        CommitDetails {
            id: oid(id),
            parent_ids: parents.iter().map(|&p| oid(p)).collect(),
            tree_id: oid(tree),
        }
    }

    #[test]
    fn test_mock_repository_head() {
        let mut repo = MockRepository::new();
        repo.add_commit(commit(1, &[], 10));
        repo.set_head(oid(1));

        assert_eq!(repo.head().unwrap().id, oid(1));
    }

    #[test]
    fn test_mock_repository_tags() {
        let mut repo = MockRepository::new();
        repo.add_tag("v1.0.0", oid(2));

        assert_eq!(repo.tag_target("v1.0.0").unwrap(), Some(oid(2)));
        assert_eq!(repo.tag_target("v2.0.0").unwrap(), None);
    }

    #[test]
    fn test_mock_repository_list_tags_sorted() {
        let mut repo = MockRepository::new();
        repo.add_tag("v2.0.0", oid(2));
        repo.add_tag("v1.0.0", oid(1));

        assert_eq!(repo.list_tags().unwrap(), vec!["v1.0.0", "v2.0.0"]);
    }

    #[test]
    fn test_mock_repository_worktree_tree_follows_head_when_clean() {
        let mut repo = MockRepository::new();
        repo.add_commit(commit(1, &[], 10));
        repo.set_head(oid(1));

        assert!(repo.is_worktree_clean().unwrap());
        assert_eq!(repo.worktree_tree_id().unwrap(), oid(10));
    }

    #[test]
    fn test_mock_repository_commit_all_advances_head() {
        let mut repo = MockRepository::new();
        repo.add_commit(commit(1, &[], 10));
        repo.set_head(oid(1));
        repo.set_dirty(oid(11));
        repo.set_next_commit(commit(2, &[1], 11));

        let identity = IdentityConfig::default();
        let created = repo.commit_all("Release 0.0.1", &identity).unwrap();

        assert_eq!(created, oid(2));
        assert_eq!(repo.head().unwrap().id, oid(2));
        assert!(repo.is_worktree_clean().unwrap());
        assert_eq!(repo.commit_messages(), vec!["Release 0.0.1"]);
    }

    #[test]
    fn test_mock_repository_records_tags_and_pushes() {
        let repo = MockRepository::new();
        let identity = IdentityConfig::default();

        repo.create_annotated_tag("v0.0.1", oid(1), &identity, "Release 0.0.1")
            .unwrap();
        repo.push_tags("origin").unwrap();

        assert_eq!(
            repo.created_tags(),
            vec![("v0.0.1".to_string(), "Release 0.0.1".to_string())]
        );
        assert_eq!(repo.pushed_remotes(), vec!["origin"]);
    }
}
