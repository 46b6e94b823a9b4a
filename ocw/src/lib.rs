pub mod cells;
pub mod cli;
pub mod config;
pub mod drive;
pub mod files;
pub mod images;
pub mod links;
pub mod logging;
pub mod notebook;
pub mod output;
pub mod publish;

pub use cells::{add_installation_cells, installation_cells};
pub use config::{Config, WorkflowConfig};
pub use notebook::{Cell, CellType, Notebook};
pub use publish::PublishOn;

// Re-export core types for convenience
pub use open_in_cloud_core::{
    CloudProvider, InstallationCell, InstallationSynthesizer, Installer, PackageColumns,
    PackageDescriptor,
};
