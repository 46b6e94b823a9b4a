use crate::drive::{Drive, colab_drive_url, kaggle_drive_url};
use anyhow::Result;
use open_in_cloud_core::{CloudProvider, EnvReader};
use std::fmt;
use std::str::FromStr;

/// Where the processed notebooks get published
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOn {
    /// Uploaded as a workflow artifact; notebooks get no public URL
    Artifact { name: String },
    /// Copied to a Google Drive folder
    Drive { root_directory: String },
    /// Pushed to a branch of a GitHub repository
    GitHub { repository: String, branch: String },
}

impl PublishOn {
    /// URL under which the cloud provider opens the file at `relative_path`.
    ///
    /// `Ok(None)` means the file is not published yet (Drive only).
    pub fn url(
        &self,
        provider: CloudProvider,
        relative_path: &str,
        env: &dyn EnvReader,
    ) -> Result<Option<String>> {
        match self {
            PublishOn::Artifact { .. } => {
                anyhow::bail!("No URL is available when publishing to artifacts")
            }
            PublishOn::Drive { root_directory } => {
                let drive_url = Drive::new(root_directory.as_str(), env).url(relative_path)?;
                Ok(drive_url.map(|url| match provider {
                    CloudProvider::Colab => colab_drive_url(&url),
                    CloudProvider::Kaggle => kaggle_drive_url(&url),
                }))
            }
            PublishOn::GitHub { repository, branch } => Ok(Some(match provider {
                CloudProvider::Colab => colab_github_url(relative_path, repository, branch),
                CloudProvider::Kaggle => kaggle_github_url(relative_path, repository, branch),
            })),
        }
    }
}

impl fmt::Display for PublishOn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOn::Artifact { name } => write!(f, "publisher=artifact\nname={name}"),
            PublishOn::Drive { root_directory } => {
                write!(f, "publisher=drive\ndrive_root_directory={root_directory}")
            }
            PublishOn::GitHub { repository, branch } => {
                write!(f, "publisher=github\nrepository={repository}\nbranch={branch}")
            }
        }
    }
}

impl FromStr for PublishOn {
    type Err = anyhow::Error;

    /// `artifact@<name>`, `drive@<root directory>` or `github@<owner/repo>@<branch>`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('@').collect();
        match parts.as_slice() {
            ["artifact", name] => Ok(PublishOn::Artifact {
                name: name.to_string(),
            }),
            ["drive", root_directory] => Ok(PublishOn::Drive {
                root_directory: root_directory.to_string(),
            }),
            ["github", repository, branch] => Ok(PublishOn::GitHub {
                repository: repository.to_string(),
                branch: branch.to_string(),
            }),
            _ => anyhow::bail!(
                "Invalid publish_on attribute: {s} (expected artifact@<name>, drive@<directory> or github@<repository>@<branch>)"
            ),
        }
    }
}

/// Colab URL of a file hosted on GitHub
pub fn colab_github_url(relative_path: &str, repository: &str, branch: &str) -> String {
    format!("https://colab.research.google.com/github/{repository}/blob/{branch}/{relative_path}")
}

/// Kaggle URL of a file hosted on GitHub
pub fn kaggle_github_url(relative_path: &str, repository: &str, branch: &str) -> String {
    format!(
        "https://kaggle.com/kernels/welcome?src=https://github.com/{repository}/blob/{branch}/{relative_path}"
    )
}
