use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use ocw::cells::{add_installation_cells, installation_cells};
use ocw::cli::{Args, Command};
use ocw::config::{Config, resolve};
use ocw::files::{glob_files, relative_path};
use ocw::images::{glob_images, images_relative_to, replace_images_in_markdown};
use ocw::links::{replace_links_in_markdown, resolve_links};
use ocw::notebook::Notebook;
use ocw::output::PackageTableRenderer;
use ocw::publish::PublishOn;
use open_in_cloud_core::{
    CloudProvider, GitLsRemote, Installer, InstallationSynthesizer, PackageColumns, ProcessEnv,
    parse_packages,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    ocw::logging::init(args.verbose);

    let config = Config::load_optional(args.config.as_deref())?;
    let workflow = &config.workflow;

    match &args.command {
        Command::AddInstallationCells {
            work_dir,
            pattern,
            cloud_provider,
            fem_on_cloud_packages,
            pip_packages,
        } => {
            let pattern = resolve(
                pattern.as_deref(),
                workflow.notebook_pattern.as_deref(),
                "pattern",
            )?;
            let provider = parse_provider(
                cloud_provider.as_deref(),
                workflow.cloud_provider.as_deref(),
            )?;
            let fem_on_cloud_packages = fem_on_cloud_packages
                .as_deref()
                .or(workflow.fem_on_cloud_packages.as_deref())
                .unwrap_or_default();
            let pip_packages = pip_packages
                .as_deref()
                .or(workflow.pip_packages.as_deref())
                .unwrap_or_default();
            run_add_installation_cells(
                work_dir,
                &pattern,
                provider,
                fem_on_cloud_packages,
                pip_packages,
            )
        }
        Command::ReplaceImages { work_dir, pattern } => {
            let pattern = resolve(
                pattern.as_deref(),
                workflow.notebook_pattern.as_deref(),
                "pattern",
            )?;
            run_replace_images(work_dir, &pattern)
        }
        Command::ReplaceLinks {
            work_dir,
            pattern,
            cloud_provider,
            publish_on,
        } => {
            let pattern = resolve(
                pattern.as_deref(),
                workflow.notebook_pattern.as_deref(),
                "pattern",
            )?;
            let provider = parse_provider(
                cloud_provider.as_deref(),
                workflow.cloud_provider.as_deref(),
            )?;
            let publisher: PublishOn =
                resolve(publish_on.as_deref(), workflow.publish_on.as_deref(), "publish-on")?
                    .parse()?;
            run_replace_links(work_dir, &pattern, provider, &publisher)
        }
        Command::PublishOn { publish_on } => {
            let publisher: PublishOn =
                resolve(publish_on.as_deref(), workflow.publish_on.as_deref(), "publish-on")?
                    .parse()?;
            println!("{publisher}");
            Ok(())
        }
        Command::Packages {
            descriptors,
            installer,
            cloud_provider,
            cells,
            json,
        } => {
            let provider = if *cells {
                Some(parse_provider(
                    cloud_provider.as_deref(),
                    workflow.cloud_provider.as_deref(),
                )?)
            } else {
                None
            };
            run_packages(descriptors, (*installer).into(), provider, *json)
        }
    }
}

fn parse_provider(cli: Option<&str>, config: Option<&str>) -> Result<CloudProvider> {
    let provider = resolve(cli, config, "cloud-provider")?;
    Ok(provider.parse::<CloudProvider>()?)
}

/// Notebooks matching the pattern, after checking the work directory
fn notebooks(work_dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let notebooks: Vec<PathBuf> = glob_files(work_dir, pattern)?.into_iter().collect();
    if !work_dir.is_dir() {
        anyhow::bail!("Work directory does not exist: {}", work_dir.display());
    }
    if notebooks.is_empty() {
        println!("No notebooks matching {pattern:?} in {}", work_dir.display());
    }
    Ok(notebooks)
}

fn notebook_dir(notebook: &Path) -> &Path {
    notebook.parent().unwrap_or(Path::new(""))
}

fn run_add_installation_cells(
    work_dir: &Path,
    pattern: &str,
    provider: CloudProvider,
    fem_on_cloud_packages: &str,
    pip_packages: &str,
) -> Result<()> {
    // 1. Generate the installation cells once for every notebook
    let resolver = GitLsRemote::new();
    let synthesizer = InstallationSynthesizer::new(provider, &resolver, &ProcessEnv);
    let installations = installation_cells(&synthesizer, fem_on_cloud_packages, pip_packages)?;
    info!(cells = installations.len(), %provider, "prepared installation cells");

    // 2. Insert the ones each notebook needs
    for path in notebooks(work_dir, pattern)? {
        let mut notebook = Notebook::read(&path)?;
        let (cells, inserted) = add_installation_cells(&notebook.cells, &installations);
        notebook.cells = cells;
        notebook.write(&path)?;

        let relative = relative_path(&path, work_dir);
        if inserted.is_empty() {
            println!("{}: {}", relative.display(), "no installation needed".dimmed());
        } else {
            let ids: Vec<&str> = inserted
                .iter()
                .filter_map(|&position| notebook.cells[position].id.as_deref())
                .collect();
            println!("{}: {}", relative.display(), ids.join(", ").green());
        }
    }
    Ok(())
}

fn run_replace_images(work_dir: &Path, pattern: &str) -> Result<()> {
    let notebooks = notebooks(work_dir, pattern)?;
    if notebooks.is_empty() {
        return Ok(());
    }

    let images = glob_images(work_dir)?;
    info!(images = images.len(), "encoded images");

    for path in notebooks {
        let mut notebook = Notebook::read(&path)?;
        let relative_images = images_relative_to(&images, notebook_dir(&path));
        let cells = replace_images_in_markdown(&notebook.cells, &relative_images);
        let changed = cells != notebook.cells;
        notebook.cells = cells;
        notebook.write(&path)?;

        let status = if changed {
            "images embedded".green()
        } else {
            "unchanged".dimmed()
        };
        println!("{}: {status}", relative_path(&path, work_dir).display());
    }
    Ok(())
}

fn run_replace_links(
    work_dir: &Path,
    pattern: &str,
    provider: CloudProvider,
    publisher: &PublishOn,
) -> Result<()> {
    // 1. Published URL of every notebook
    let links = resolve_links(work_dir, pattern, provider, publisher, &ProcessEnv)
        .context("Failed to resolve published URLs")?;
    if links.is_empty() {
        println!("{}", "No published URLs, links left unchanged.".dimmed());
        return Ok(());
    }
    for (file, url) in &links {
        println!("{} -> {}", relative_path(file, work_dir).display(), url.cyan());
    }

    // 2. Point markdown links at them
    for path in links.keys() {
        let mut notebook = Notebook::read(path)?;
        notebook.cells = replace_links_in_markdown(&notebook.cells, notebook_dir(path), &links);
        notebook.write(path)?;
    }
    Ok(())
}

fn run_packages(
    descriptors: &str,
    installer: Installer,
    provider: Option<CloudProvider>,
    json: bool,
) -> Result<()> {
    let packages = parse_packages(descriptors).context("Invalid package descriptors")?;

    let cells = match provider {
        Some(provider) => {
            let resolver = GitLsRemote::new();
            let synthesizer = InstallationSynthesizer::new(provider, &resolver, &ProcessEnv);
            Some(synthesizer.installation_cells(installer, &packages)?)
        }
        None => None,
    };

    if json {
        let output = serde_json::json!({
            "installer": installer,
            "columns": PackageColumns::from(packages.as_slice()),
            "cells": cells,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let renderer = PackageTableRenderer::new(std::io::stdout().is_terminal());
    print!("{}", renderer.render(&packages));
    if let Some(cells) = cells {
        println!();
        print!("{}", renderer.render_cells(&cells));
    }
    Ok(())
}
