use crate::error::ResolveError;
use std::process::Command;
use tracing::debug;

/// Length of the abbreviated commit hashes placed in URLs
pub const SHORT_HASH_LEN: usize = 7;

/// Resolves the commit a branch of a remote repository currently points to
pub trait CommitResolver {
    /// Abbreviated hash of the head commit of `branch` in `repo_url`
    fn head_hash(&self, repo_url: &str, branch: &str) -> Result<String, ResolveError>;
}

impl<F> CommitResolver for F
where
    F: Fn(&str, &str) -> Result<String, ResolveError>,
{
    fn head_hash(&self, repo_url: &str, branch: &str) -> Result<String, ResolveError> {
        self(repo_url, branch)
    }
}

/// Asks the remote with `git ls-remote`; every call queries again
#[derive(Debug, Clone, Copy, Default)]
pub struct GitLsRemote;

impl GitLsRemote {
    pub fn new() -> Self {
        Self
    }

    /// Pick the hash out of `git ls-remote` output ("<hash>\t<ref>" per line)
    fn parse_ls_remote(output: &str) -> Option<String> {
        output
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .find(|hash| !hash.is_empty())
            .map(|hash| hash.chars().take(SHORT_HASH_LEN).collect())
    }
}

impl CommitResolver for GitLsRemote {
    fn head_hash(&self, repo_url: &str, branch: &str) -> Result<String, ResolveError> {
        debug!(repo = repo_url, branch, "resolving head commit");
        let output = Command::new("git")
            .args(["ls-remote", repo_url, branch])
            .output()?;

        if !output.status.success() {
            return Err(ResolveError::GitFailed {
                repo: repo_url.to_string(),
                branch: branch.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Self::parse_ls_remote(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            ResolveError::BranchNotFound {
                repo: repo_url.to_string(),
                branch: branch.to_string(),
            }
        })
    }
}
