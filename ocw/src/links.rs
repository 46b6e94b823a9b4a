use crate::drive::Drive;
use crate::files::{glob_files, relative_path};
use crate::notebook::Cell;
use crate::publish::PublishOn;
use anyhow::Result;
use open_in_cloud_core::{CloudProvider, EnvReader};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Published URL of every file matching the patterns; `None` for files
/// that are not published yet.
pub fn glob_links(
    work_dir: &Path,
    patterns: &str,
    provider: CloudProvider,
    publisher: &PublishOn,
    env: &dyn EnvReader,
) -> Result<BTreeMap<PathBuf, Option<String>>> {
    if matches!(publisher, PublishOn::Artifact { .. }) {
        return Ok(BTreeMap::new());
    }

    let mut links = BTreeMap::new();
    for local_file in glob_files(work_dir, patterns)? {
        let relative = relative_path(&local_file, work_dir);
        let url = publisher.url(provider, &relative.to_string_lossy(), env)?;
        links.insert(local_file, url);
    }
    Ok(links)
}

/// Like [`glob_links`], but files missing on Drive are uploaded first.
/// Every returned file has a URL.
pub fn resolve_links(
    work_dir: &Path,
    patterns: &str,
    provider: CloudProvider,
    publisher: &PublishOn,
    env: &dyn EnvReader,
) -> Result<BTreeMap<PathBuf, String>> {
    let mut links = glob_links(work_dir, patterns, provider, publisher, env)?;

    if let PublishOn::Drive { root_directory } = publisher {
        let missing: Vec<String> = links
            .iter()
            .filter(|(_, url)| url.is_none())
            .map(|(file, _)| relative_path(file, work_dir).to_string_lossy().into_owned())
            .collect();
        if !missing.is_empty() {
            for file in &missing {
                info!(%file, "will be created anew on drive");
            }
            let missing = missing.join("\n");
            Drive::new(root_directory.as_str(), env).upload(work_dir, &missing)?;
            links.extend(glob_links(work_dir, &missing, provider, publisher, env)?);
        }
    }

    links
        .into_iter()
        .map(|(file, url)| match url {
            Some(url) => Ok((file, url)),
            None => anyhow::bail!("No published URL for {}", file.display()),
        })
        .collect()
}

/// Replace links to local files with their published URLs in markdown cells.
///
/// A link is replaced only when wrapped in double quotes, single quotes or
/// parentheses, as in HTML attributes and markdown links.
pub fn replace_links_in_markdown(
    cells: &[Cell],
    notebook_dir: &Path,
    links: &BTreeMap<PathBuf, String>,
) -> Vec<Cell> {
    let wrappers: [fn(&str) -> String; 3] = [
        |text| format!("\"{text}\""),
        |text| format!("'{text}'"),
        |text| format!("({text})"),
    ];

    cells
        .iter()
        .map(|cell| {
            let mut cell = cell.clone();
            if cell.is_markdown() {
                for (local_file, url) in links {
                    let local = relative_path(local_file, notebook_dir);
                    let local = local.to_string_lossy();
                    for wrap in wrappers {
                        cell.source = cell.source.replace(&wrap(&local), &wrap(url));
                    }
                }
            }
            cell
        })
        .collect()
}
