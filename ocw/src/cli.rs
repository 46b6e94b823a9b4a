use clap::{Parser, Subcommand, ValueEnum};
use open_in_cloud_core::Installer;
use std::path::PathBuf;

/// Prepare Jupyter notebooks for Google Colab and Kaggle
#[derive(Parser, Debug, Clone)]
#[command(name = "ocw")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML file providing default option values
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Add installation cells on top of every matching notebook
    AddInstallationCells {
        /// Absolute path of the work directory
        #[arg(long, value_name = "DIR")]
        work_dir: PathBuf,

        /// Newline separated notebook patterns, relative to the work directory
        #[arg(long)]
        pattern: Option<String>,

        /// Target platform (colab or kaggle)
        #[arg(long)]
        cloud_provider: Option<String>,

        /// Newline separated FEM on Cloud package descriptors
        #[arg(long)]
        fem_on_cloud_packages: Option<String>,

        /// Newline separated pip package descriptors
        #[arg(long)]
        pip_packages: Option<String>,
    },

    /// Embed local images in markdown cells as base64 data
    ReplaceImages {
        /// Absolute path of the work directory
        #[arg(long, value_name = "DIR")]
        work_dir: PathBuf,

        /// Newline separated notebook patterns, relative to the work directory
        #[arg(long)]
        pattern: Option<String>,
    },

    /// Point links to local notebooks at their published versions
    ReplaceLinks {
        /// Absolute path of the work directory
        #[arg(long, value_name = "DIR")]
        work_dir: PathBuf,

        /// Newline separated notebook patterns, relative to the work directory
        #[arg(long)]
        pattern: Option<String>,

        /// Target platform (colab or kaggle)
        #[arg(long)]
        cloud_provider: Option<String>,

        /// artifact@<name>, drive@<directory> or github@<repository>@<branch>
        #[arg(long)]
        publish_on: Option<String>,
    },

    /// Show where notebooks will be published
    PublishOn {
        /// artifact@<name>, drive@<directory> or github@<repository>@<branch>
        #[arg(value_name = "PUBLISHER")]
        publish_on: Option<String>,
    },

    /// Parse package descriptors and show what they expand to
    Packages {
        /// Newline separated package descriptors
        #[arg(value_name = "DESCRIPTORS")]
        descriptors: String,

        /// Installer the descriptors are meant for
        #[arg(long, value_enum, default_value_t = InstallerArg::Pip)]
        installer: InstallerArg,

        /// Target platform (colab or kaggle), needed with --cells
        #[arg(long)]
        cloud_provider: Option<String>,

        /// Also print the generated installation cells
        #[arg(long)]
        cells: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerArg {
    Pip,
    FemOnCloud,
}

impl From<InstallerArg> for Installer {
    fn from(arg: InstallerArg) -> Self {
        match arg {
            InstallerArg::Pip => Installer::Pip,
            InstallerArg::FemOnCloud => Installer::FemOnCloud,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_installation_cells() {
        let args = Args::parse_from([
            "ocw",
            "add-installation-cells",
            "--work-dir",
            "/work",
            "--cloud-provider",
            "colab",
            "--pip-packages",
            "numpy",
        ]);
        match args.command {
            Command::AddInstallationCells {
                work_dir,
                cloud_provider,
                pip_packages,
                pattern,
                ..
            } => {
                assert_eq!(work_dir, PathBuf::from("/work"));
                assert_eq!(cloud_provider.as_deref(), Some("colab"));
                assert_eq!(pip_packages.as_deref(), Some("numpy"));
                assert!(pattern.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_packages_defaults() {
        let args = Args::parse_from(["ocw", "packages", "numpy", "-v"]);
        assert!(args.verbose);
        match args.command {
            Command::Packages {
                installer, cells, json, ..
            } => {
                assert_eq!(installer, InstallerArg::Pip);
                assert!(!cells);
                assert!(!json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_installer_conversion() {
        assert_eq!(Installer::from(InstallerArg::FemOnCloud), Installer::FemOnCloud);
    }
}
