use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid cloud provider: {0} (expected colab or kaggle)")]
pub struct UnknownProvider(pub String);

/// Cloud notebook platform the notebooks are prepared for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudProvider {
    Colab,
    Kaggle,
}

impl CloudProvider {
    /// Short name used in URLs
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudProvider::Colab => "colab",
            CloudProvider::Kaggle => "kaggle",
        }
    }

    /// Default prefix hosting the prebuilt install archives
    pub fn releases_url(&self) -> String {
        format!("https://fem-on-{}.github.io/releases", self.as_str())
    }

    /// Repository publishing the install archives
    pub fn releases_repository(&self) -> String {
        let p = self.as_str();
        format!("https://github.com/fem-on-{p}/fem-on-{p}.github.io")
    }

    /// Branch of [`Self::releases_repository`] the archives are served from
    pub fn releases_branch(&self) -> &'static str {
        "gh-pages"
    }

    /// Prefix of the install archives as of a given commit
    pub fn releases_url_at(&self, commit: &str) -> String {
        format!("{}/raw/{commit}/releases", self.releases_repository())
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CloudProvider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "colab" => Ok(CloudProvider::Colab),
            "kaggle" => Ok(CloudProvider::Kaggle),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}
