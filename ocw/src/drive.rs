//! Google Drive access through rclone.

use anyhow::{Context, Result};
use open_in_cloud_core::EnvReader;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info, warn};

const DRIVE_OPEN_PREFIX: &str = "https://drive.google.com/open?id=";

/// Credential variables forwarded to rclone
const RCLONE_CREDENTIALS: [&str; 3] = [
    "RCLONE_CONFIG_DRIVE_CLIENT_ID",
    "RCLONE_CONFIG_DRIVE_CLIENT_SECRET",
    "RCLONE_CONFIG_DRIVE_TOKEN",
];

/// Environment configuring an rclone remote named `drive`
pub fn rclone_env(env: &dyn EnvReader) -> Result<Vec<(String, String)>> {
    let mut vars = vec![
        ("RCLONE_CONFIG_DRIVE_TYPE".to_string(), "drive".to_string()),
        ("RCLONE_CONFIG_DRIVE_SCOPE".to_string(), "drive".to_string()),
    ];
    for name in RCLONE_CREDENTIALS {
        let value = env
            .var(name)
            .with_context(|| format!("Environment variable {name} is not set"))?;
        vars.push((name.to_string(), value));
    }
    Ok(vars)
}

/// Google Drive access for a root directory
pub struct Drive<'a> {
    root_directory: String,
    env: &'a dyn EnvReader,
}

impl<'a> Drive<'a> {
    pub fn new(root_directory: impl Into<String>, env: &'a dyn EnvReader) -> Self {
        Self {
            root_directory: root_directory.into(),
            env,
        }
    }

    /// Shareable link of a file, `None` if the file is not on Drive yet
    pub fn url(&self, relative_path: &str) -> Result<Option<String>> {
        let remote = format!(
            "drive:{}",
            Path::new(&self.root_directory).join(relative_path).display()
        );
        debug!(%remote, "querying drive link");
        let output = Command::new("rclone")
            .args(["-q", "link", &remote])
            .envs(rclone_env(self.env)?)
            .output()
            .context("Failed to run rclone")?;

        if !output.status.success() {
            warn!(%remote, "no drive link available");
            return Ok(None);
        }
        let link = String::from_utf8_lossy(&output.stdout)
            .trim_matches('\n')
            .to_string();
        Ok(Some(link))
    }

    /// Upload every file matching the newline separated patterns
    pub fn upload(&self, work_dir: &Path, patterns: &str) -> Result<()> {
        let destination = format!("drive:{}", self.root_directory);
        for pattern in patterns.lines().filter(|p| !p.is_empty()) {
            info!(pattern, %destination, "uploading to drive");
            let status = Command::new("rclone")
                .arg("-q")
                .arg("copy")
                .arg(work_dir)
                .arg(&destination)
                .args(["--include", pattern])
                .envs(rclone_env(self.env)?)
                .status()
                .context("Failed to run rclone")?;
            if !status.success() {
                anyhow::bail!("Upload of {pattern} to {destination} failed: {status}");
            }
        }
        Ok(())
    }
}

/// Drive link opened in Colab
pub fn colab_drive_url(drive_url: &str) -> String {
    drive_url.replace(DRIVE_OPEN_PREFIX, "https://colab.research.google.com/drive/")
}

/// Drive link opened in Kaggle
pub fn kaggle_drive_url(drive_url: &str) -> String {
    drive_url.replace(
        DRIVE_OPEN_PREFIX,
        "https://kaggle.com/kernels/welcome?src=https://drive.google.com/uc?id=",
    )
}
