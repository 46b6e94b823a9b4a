use colored::Colorize;
use open_in_cloud_core::{ConstraintKind, InstallationCell, PackageDescriptor};

/// Renders parsed package descriptors in a table format
pub struct PackageTableRenderer {
    show_colors: bool,
}

impl PackageTableRenderer {
    pub fn new(show_colors: bool) -> Self {
        Self { show_colors }
    }

    /// Render the table as a string
    pub fn render(&self, packages: &[PackageDescriptor]) -> String {
        if packages.is_empty() {
            return "No packages.\n".to_string();
        }

        let max_name = packages.iter().map(|p| p.name.len()).max().unwrap_or(0).max(4);
        let max_version = packages
            .iter()
            .map(|p| p.version_constraint.len())
            .max()
            .unwrap_or(0)
            .max(7);
        let max_import = packages
            .iter()
            .map(|p| p.import_name.len())
            .max()
            .unwrap_or(0)
            .max(6);

        let mut out = format!(
            "{:<max_name$}  {:<max_version$}  {:<max_import$}  source\n",
            "name", "version", "import"
        );
        for package in packages {
            out.push_str(&self.format_row(package, max_name, max_version, max_import));
            out.push('\n');
        }
        out
    }

    fn format_row(
        &self,
        package: &PackageDescriptor,
        name_width: usize,
        version_width: usize,
        import_width: usize,
    ) -> String {
        let version = format!("{:<version_width$}", package.version_constraint);
        let version = if self.show_colors {
            match package.constraint_kind() {
                ConstraintKind::Comparison => version.yellow().to_string(),
                ConstraintKind::Extras => version.cyan().to_string(),
                ConstraintKind::None => version,
            }
        } else {
            version
        };

        let import = if package.import_name.is_empty() {
            format!("{:<import_width$}", "-")
        } else {
            format!("{:<import_width$}", package.import_name)
        };

        let mut row = format!(
            "{:<name_width$}  {version}  {import}  {}",
            package.name, package.source_locator
        );
        if !package.dependent_import_names.is_empty() {
            let also = format!("  (also for {})", package.dependent_import_names.join(", "));
            row.push_str(&self.dim(&also));
        }
        row.trim_end().to_string()
    }

    /// Render generated cells, one block per package
    pub fn render_cells(&self, cells: &[InstallationCell]) -> String {
        let mut out = String::new();
        for cell in cells {
            let header = format!("# {} ({})", cell.id, cell.installer);
            out.push_str(&self.dim(&header));
            out.push('\n');
            out.push_str(&cell.source);
            out.push_str("\n\n");
        }
        out
    }

    fn dim(&self, text: &str) -> String {
        if self.show_colors {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }
}
