//! Installation line and cell synthesis.
//!
//! Two installers are supported: `pip` for packages on the package registry
//! (or in a git repository), and the FEM on Cloud prebuilt archives, which are
//! shell scripts downloaded with `wget` and run with `bash`.

use crate::env::{EnvReader, substitute_env_vars};
use crate::error::SynthesisError;
use crate::git::CommitResolver;
use crate::platform::CloudProvider;
use crate::types::{ConstraintKind, PackageDescriptor};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Locator value selecting the head of the archive repository
pub const CURRENT: &str = "current";
/// Locator suffix selecting the head of a git repository for pip
pub const CURRENT_SUFFIX: &str = "@current";

/// Which installer a descriptor is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Installer {
    Pip,
    FemOnCloud,
}

impl fmt::Display for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Installer::Pip => write!(f, "pip"),
            Installer::FemOnCloud => write!(f, "fem-on-cloud"),
        }
    }
}

/// Generated notebook cell for one package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallationCell {
    pub package_name: String,
    pub import_name: String,
    pub dependent_import_names: Vec<String>,
    pub installer: Installer,
    /// Cell id, e.g. `python-dateutil_install`
    pub id: String,
    pub source: String,
}

impl InstallationCell {
    /// Import name followed by the dependent imports
    pub fn import_names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.import_name.as_str())
            .chain(self.dependent_import_names.iter().map(String::as_str))
    }
}

/// Builds install lines and cells for a target platform.
///
/// Commit resolution and environment lookups go through the injected
/// collaborators, so synthesis itself has no side effects.
pub struct InstallationSynthesizer<'a> {
    provider: CloudProvider,
    resolver: &'a dyn CommitResolver,
    env: &'a dyn EnvReader,
}

impl<'a> InstallationSynthesizer<'a> {
    pub fn new(
        provider: CloudProvider,
        resolver: &'a dyn CommitResolver,
        env: &'a dyn EnvReader,
    ) -> Self {
        Self {
            provider,
            resolver,
            env,
        }
    }

    /// Shell line installing the package with the given installer
    pub fn installation_line(
        &self,
        installer: Installer,
        package: &PackageDescriptor,
    ) -> Result<String, SynthesisError> {
        match installer {
            Installer::Pip => self.pip_installation_line(package),
            Installer::FemOnCloud => self.fem_on_cloud_installation_line(package),
        }
    }

    /// `pip3 install ...`, optionally preceded by pre-install commands
    pub fn pip_installation_line(&self, package: &PackageDescriptor) -> Result<String, SynthesisError> {
        let name = &package.name;
        let version = &package.version_constraint;
        let kind = package.constraint_kind();

        let mut install_arg = match kind {
            ConstraintKind::Comparison => "--upgrade ".to_string(),
            ConstraintKind::Extras | ConstraintKind::None => String::new(),
        };
        if !package.install_options.is_empty() {
            install_arg.push_str(&substitute_env_vars(&package.install_options, self.env)?);
            install_arg.push(' ');
        }

        let target = if package.source_locator.is_empty() {
            match (install_arg.is_empty(), version.is_empty()) {
                (true, true) => name.to_string(),
                (false, true) => format!("{install_arg}{name}"),
                (true, false) => format!("{name}{version}"),
                (false, false) => format!("{install_arg}\"{name}{version}\""),
            }
        } else {
            if kind == ConstraintKind::Comparison {
                return Err(SynthesisError::ComparisonWithLocator {
                    name: name.to_string(),
                    constraint: version.to_string(),
                });
            }
            let locator = self.resolve_pip_locator(package)?;
            format!("{install_arg}\"{name}{version}@git+{locator}\"")
        };

        let line = format!("pip3 install {target}");
        self.with_pre_install_commands(package, line)
    }

    /// `wget <archive> && bash <archive>`, optionally preceded by pre-install commands
    pub fn fem_on_cloud_installation_line(
        &self,
        package: &PackageDescriptor,
    ) -> Result<String, SynthesisError> {
        let name = &package.name;
        let version = if package.version_constraint.is_empty() {
            ""
        } else {
            package
                .version_constraint
                .strip_prefix("==")
                .filter(|version| !version.is_empty())
                .ok_or_else(|| SynthesisError::InvalidArchiveVersion {
                    name: name.to_string(),
                    constraint: package.version_constraint.clone(),
                })?
        };

        let url_prefix = match package.source_locator.as_str() {
            "" => self.provider.releases_url(),
            locator if locator.contains("://") || locator.contains("https") => {
                return Err(SynthesisError::LocatorIsUrl(locator.to_string()));
            }
            CURRENT => {
                let commit = self.resolver.head_hash(
                    &format!("{}.git", self.provider.releases_repository()),
                    self.provider.releases_branch(),
                )?;
                self.provider.releases_url_at(&commit)
            }
            commit => self.provider.releases_url_at(commit),
        };

        let url_suffix = if version.is_empty() {
            ".sh".to_string()
        } else {
            format!("-{version}.sh")
        };
        let url = format!("{url_prefix}/{name}-install{url_suffix}");
        let script = format!("/tmp/{name}-install.sh");

        let mut run = format!("bash \"{script}\"");
        if !package.install_options.is_empty() {
            run.push(' ');
            run.push_str(&substitute_env_vars(&package.install_options, self.env)?);
        }

        let line = format!("wget \"{url}\" -O \"{script}\" && {run}");
        self.with_pre_install_commands(package, line)
    }

    /// Notebook cell source installing the package with the given installer
    pub fn installation_cell(
        &self,
        installer: Installer,
        package: &PackageDescriptor,
    ) -> Result<InstallationCell, SynthesisError> {
        let line = self.installation_line(installer, package)?;
        // An archive "==X" picks a build variant, it never forces an upgrade
        let force = installer == Installer::Pip
            && package.constraint_kind() == ConstraintKind::Comparison;
        let mut source = cell_code(&package.import_name, &line, force);
        if installer == Installer::Pip
            && self.provider == CloudProvider::Colab
            && is_guarded(&package.import_name, force)
            && package.name.contains("itkwidgets")
        {
            source.push_str(ENABLE_CUSTOM_WIDGET_MANAGER);
        }
        debug!(package = %package.name, %installer, "synthesized installation cell");
        Ok(InstallationCell {
            package_name: package.name.clone(),
            import_name: package.import_name.clone(),
            dependent_import_names: package.dependent_import_names.clone(),
            installer,
            id: package.cell_id(),
            source,
        })
    }

    /// Cells for every descriptor, in order
    pub fn installation_cells(
        &self,
        installer: Installer,
        packages: &[PackageDescriptor],
    ) -> Result<Vec<InstallationCell>, SynthesisError> {
        packages
            .iter()
            .map(|package| self.installation_cell(installer, package))
            .collect()
    }

    fn resolve_pip_locator(&self, package: &PackageDescriptor) -> Result<String, SynthesisError> {
        let locator = &package.source_locator;
        if !locator.contains("://") {
            return Err(SynthesisError::LocatorNotUrl {
                name: package.name.clone(),
                locator: locator.clone(),
            });
        }
        match locator.strip_suffix(CURRENT_SUFFIX) {
            Some(repository) => {
                let commit = self.resolver.head_hash(repository, "HEAD")?;
                Ok(format!("{repository}@{commit}"))
            }
            None => Ok(locator.clone()),
        }
    }

    fn with_pre_install_commands(
        &self,
        package: &PackageDescriptor,
        line: String,
    ) -> Result<String, SynthesisError> {
        if package.pre_install_commands.is_empty() {
            Ok(line)
        } else {
            let commands = substitute_env_vars(&package.pre_install_commands, self.env)?;
            Ok(format!("{commands} && {line}"))
        }
    }
}

const ENABLE_CUSTOM_WIDGET_MANAGER: &str = "
finally:
    import google.colab
    google.colab.output.enable_custom_widget_manager()";

fn is_guarded(import_name: &str, force: bool) -> bool {
    !import_name.is_empty() && !force
}

/// Wrap an install line in an import guard.
///
/// Without an import name, or when an upgrade is forced, the line runs
/// unconditionally.
pub fn cell_code(import_name: &str, line: &str, force: bool) -> String {
    if is_guarded(import_name, force) {
        format!(
            "try:
    import {import_name}
except ImportError:
    !{line}
    import {import_name}"
        )
    } else {
        format!("!{line}")
    }
}
