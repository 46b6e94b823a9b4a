use thiserror::Error;

/// A descriptor line that does not follow the package mini-language
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error(
        "line {line}: expected at most {max} '{delimiter}' ({field}) but found {found} in {text:?}"
    )]
    TooManyDelimiters {
        line: usize,
        delimiter: char,
        field: &'static str,
        found: usize,
        max: usize,
        text: String,
    },
    #[error("line {line}: operator '{operator}' appears more than once in {text:?}")]
    AmbiguousOperator {
        line: usize,
        operator: &'static str,
        text: String,
    },
    #[error("line {line}: constraint {constraint:?} mixes extras with a version comparison")]
    MixedConstraint { line: usize, constraint: String },
    #[error("line {line}: missing package name in {text:?}")]
    EmptyName { line: usize, text: String },
}

/// Failure to turn a commit reference into a commit hash
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("git ls-remote {repo} {branch} failed: {stderr}")]
    GitFailed {
        repo: String,
        branch: String,
        stderr: String,
    },
    #[error("Branch {branch} not found in {repo}")]
    BranchNotFound { repo: String, branch: String },
}

/// Failure while building an installation line or cell
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Environment variable {0} is not set")]
    MissingVariable(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("Please provide the commit SHA instead of the full URL: {0}")]
    LocatorIsUrl(String),
    #[error("Package {name}: expected a repository URL, got {locator:?}")]
    LocatorNotUrl { name: String, locator: String },
    #[error("Package {name}: version constraint {constraint:?} cannot be combined with a source locator")]
    ComparisonWithLocator { name: String, constraint: String },
    #[error("Package {name}: archive installs only accept an exact '==' version, got {constraint:?}")]
    InvalidArchiveVersion { name: String, constraint: String },
}
