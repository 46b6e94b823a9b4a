pub mod descriptor;
pub mod env;
pub mod error;
pub mod git;
pub mod install;
pub mod platform;
pub mod types;

// Re-export commonly used types at crate root
pub use descriptor::{packages_str_to_columns, parse_descriptor, parse_packages};
pub use env::{EnvReader, ProcessEnv, hardcode_environment_variable, substitute_env_vars};
pub use error::{DescriptorError, ResolveError, SynthesisError};
pub use git::{CommitResolver, GitLsRemote};
pub use install::{InstallationCell, InstallationSynthesizer, Installer, cell_code};
pub use platform::{CloudProvider, UnknownProvider};
pub use types::{ConstraintKind, PackageColumns, PackageDescriptor};
