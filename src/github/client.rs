//! Octocrab client wrapper scoped to a specific repository.
//!
//! Effects are repo-scoped (the `GitHubEffect` enum doesn't include repo
//! info), so every webhook event gets a client bound to the repository the
//! event came from.

use octocrab::Octocrab;

use crate::types::RepoId;

/// A GitHub API client scoped to a specific repository.
#[derive(Clone)]
pub struct OctocrabClient {
    client: Octocrab,
    repo: RepoId,
}

impl OctocrabClient {
    /// Scopes a shared octocrab instance to one repository.
    ///
    /// Cloning `Octocrab` is cheap (it is reference-counted), so the server
    /// builds one of these per event.
    pub fn new(client: Octocrab, repo: RepoId) -> Self {
        Self { client, repo }
    }

    pub fn inner(&self) -> &Octocrab {
        &self.client
    }

    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    pub fn owner(&self) -> &str {
        &self.repo.owner
    }

    pub fn repo_name(&self) -> &str {
        &self.repo.repo
    }
}

impl std::fmt::Debug for OctocrabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OctocrabClient")
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn accessors_report_the_scoped_repository() {
        let octocrab = Octocrab::builder().build().unwrap();
        let client = OctocrabClient::new(octocrab, RepoId::new("o", "r"));

        assert_eq!(client.repo(), &RepoId::new("o", "r"));
        assert_eq!(client.owner(), "o");
        assert_eq!(client.repo_name(), "r");
        assert!(format!("{:?}", client).contains("owner: \"o\""));
    }
}
