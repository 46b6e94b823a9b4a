use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Defaults read from a TOML file, e.g.
///
/// ```toml
/// [workflow]
/// cloud_provider = "colab"
/// notebook_pattern = "**/*.ipynb"
/// fem_on_cloud_packages = "gmsh\nmpi4py"
/// pip_packages = "numpy\npython-dateutil$dateutil"
/// publish_on = "github@owner/repo@open-in-colab"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    pub cloud_provider: Option<String>,
    pub notebook_pattern: Option<String>,
    pub fem_on_cloud_packages: Option<String>,
    pub pip_packages: Option<String>,
    pub publish_on: Option<String>,
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid configuration: {}", path.display()))
    }

    /// Load the file if given, otherwise start from empty defaults
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Command line value, else configuration value, else an error naming the option
pub fn resolve(cli: Option<&str>, config: Option<&str>, option: &str) -> Result<String> {
    cli.or(config)
        .map(str::to_string)
        .with_context(|| format!("Missing --{option} (not given on the command line nor in the configuration)"))
}
