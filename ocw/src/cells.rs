use crate::notebook::Cell;
use anyhow::{Context, Result};
use open_in_cloud_core::{
    InstallationCell, InstallationSynthesizer, Installer, parse_packages,
};
use tracing::{debug, info};

/// Check whether a cell imports the given module (`import X` or `from X`)
pub fn is_imported(import_name: &str, cell: &Cell) -> bool {
    cell.source.contains(&format!("import {import_name}"))
        || cell.source.contains(&format!("from {import_name}"))
}

/// Check whether any code cell needs the package installed
pub fn needs_installation(installation: &InstallationCell, cells: &[Cell]) -> bool {
    cells
        .iter()
        .filter(|cell| cell.is_code())
        .any(|cell| installation.import_names().any(|name| is_imported(name, cell)))
}

/// Generate the installation cells for both descriptor strings.
/// FEM on Cloud packages come first, then pip packages.
pub fn installation_cells(
    synthesizer: &InstallationSynthesizer<'_>,
    fem_on_cloud_packages: &str,
    pip_packages: &str,
) -> Result<Vec<InstallationCell>> {
    let fem_on_cloud = parse_packages(fem_on_cloud_packages)
        .context("Invalid FEM on Cloud packages")?;
    let pip = parse_packages(pip_packages).context("Invalid pip packages")?;

    let mut cells = synthesizer
        .installation_cells(Installer::FemOnCloud, &fem_on_cloud)
        .context("Failed to prepare FEM on Cloud installation cells")?;
    cells.extend(
        synthesizer
            .installation_cells(Installer::Pip, &pip)
            .context("Failed to prepare pip installation cells")?,
    );
    Ok(cells)
}

/// Insert the needed installation cells before the first code cell.
///
/// Returns the updated cells and the position of every inserted cell.
pub fn add_installation_cells(
    cells: &[Cell],
    installations: &[InstallationCell],
) -> (Vec<Cell>, Vec<usize>) {
    let mut position = cells
        .iter()
        .position(Cell::is_code)
        .unwrap_or(cells.len());

    let mut updated = cells.to_vec();
    let mut inserted = Vec::new();
    for installation in installations {
        if needs_installation(installation, cells) {
            debug!(package = %installation.package_name, position, "inserting installation cell");
            updated.insert(
                position,
                Cell::code(installation.id.clone(), installation.source.clone()),
            );
            inserted.push(position);
            position += 1;
        }
    }
    info!(inserted = inserted.len(), "added installation cells");
    (updated, inserted)
}
