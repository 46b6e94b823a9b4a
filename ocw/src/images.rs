//! Embedding of local images in markdown cells as base64 data URIs.

use crate::files::{glob_files, relative_path};
use crate::notebook::Cell;
use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

/// Image extensions looked for, with the commands able to convert them to PNG.
/// Commands are tried in order until one succeeds.
const IMAGE_CONVERSIONS: [(&str, &[&str]); 3] = [
    ("png", &[]),
    ("jpg", &["convert {image} {png}"]),
    (
        "svg",
        &[
            "inkscape -e {png} {image}",
            "inkscape --export-filename={png} {image}",
        ],
    ),
];

/// Find every image in the work directory and compute its data URI.
///
/// Images without a sibling PNG are converted first.
pub fn glob_images(work_dir: &Path) -> Result<BTreeMap<PathBuf, String>> {
    let mut images = BTreeMap::new();
    for (extension, conversions) in IMAGE_CONVERSIONS {
        for image in glob_files(work_dir, &format!("**/*.{extension}"))? {
            let png = image.with_extension("png");
            if !png.is_file() {
                convert_to_png(&image, &png, conversions)?;
            }
            if images.contains_key(&image) {
                anyhow::bail!("Image found twice: {}", image.display());
            }
            images.insert(image, to_base64(&png)?);
        }
    }
    Ok(images)
}

fn convert_to_png(image: &Path, png: &Path, conversions: &[&str]) -> Result<()> {
    for conversion in conversions {
        let command = conversion
            .replace("{image}", &image.to_string_lossy())
            .replace("{png}", &png.to_string_lossy());
        let mut parts = command.split(' ');
        let Some(program) = parts.next() else {
            continue;
        };
        debug!(%command, "converting image");
        let status = Command::new(program)
            .args(parts)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match status {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => warn!(%command, %status, "image conversion failed"),
            Err(err) => warn!(%command, %err, "image conversion could not run"),
        }
    }
    anyhow::bail!("Image conversion failed for {}", image.display())
}

/// `data:image/png;base64,...` for a PNG file
pub fn to_base64(png: &Path) -> Result<String> {
    if png.extension().and_then(|e| e.to_str()) != Some("png") {
        anyhow::bail!("Expected a PNG image: {}", png.display());
    }
    let content =
        fs::read(png).with_context(|| format!("Failed to read image: {}", png.display()))?;
    Ok(format!("data:image/png;base64,{}", STANDARD.encode(content)))
}

/// Re-key the images by their path relative to a notebook directory
pub fn images_relative_to(
    images: &BTreeMap<PathBuf, String>,
    notebook_dir: &Path,
) -> BTreeMap<String, String> {
    images
        .iter()
        .map(|(image, data)| {
            (
                relative_path(image, notebook_dir).to_string_lossy().into_owned(),
                data.clone(),
            )
        })
        .collect()
}

/// Replace image paths with their data URIs in markdown cells.
///
/// Longer paths are replaced first so that `a.png` never clobbers the tail
/// of `images/a.png`.
pub fn replace_images_in_markdown(
    cells: &[Cell],
    images_as_base64: &BTreeMap<String, String>,
) -> Vec<Cell> {
    let mut images: Vec<(&String, &String)> = images_as_base64.iter().collect();
    images.sort_by_key(|(image, _)| std::cmp::Reverse(image.len()));

    cells
        .iter()
        .map(|cell| {
            let mut cell = cell.clone();
            if cell.is_markdown() {
                for (image, data) in &images {
                    cell.source = cell.source.replace(image.as_str(), data);
                }
            }
            cell
        })
        .collect()
}
