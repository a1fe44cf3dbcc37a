use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::env::{EnvSource, WEBSITE_INSTANCE_ID};
use crate::utils::error::Result;

/// Ephemeral storage provided by the function host.
pub const CLOUD_BASE_DIR: &str = "/tmp";
pub const LOGS_DIR: &str = "logs";
pub const RESULT_DIR: &str = "rtr-result";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentContext {
    Cloud,
    Local,
}

impl DeploymentContext {
    /// Cloud when the host's instance marker is present, whatever its value.
    pub fn detect(source: &impl EnvSource) -> Self {
        if source.contains(WEBSITE_INSTANCE_ID) {
            DeploymentContext::Cloud
        } else {
            DeploymentContext::Local
        }
    }

    pub fn base_dir(self, cwd: &Path) -> PathBuf {
        match self {
            DeploymentContext::Cloud => PathBuf::from(CLOUD_BASE_DIR),
            DeploymentContext::Local => cwd.to_path_buf(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkDirs {
    pub logs_dir: PathBuf,
    pub result_dir: PathBuf,
}

impl WorkDirs {
    pub fn under(base: &Path) -> Self {
        Self {
            logs_dir: base.join(LOGS_DIR),
            result_dir: base.join(RESULT_DIR),
        }
    }

    /// `(logs, result)`.
    pub fn into_pair(self) -> (PathBuf, PathBuf) {
        (self.logs_dir, self.result_dir)
    }
}

/// Creates the logs and result directories under `base`. Existing directories are left alone.
pub fn ensure_directories_in(base: &Path) -> Result<WorkDirs> {
    let dirs = WorkDirs::under(base);
    fs::create_dir_all(&dirs.logs_dir)?;
    fs::create_dir_all(&dirs.result_dir)?;
    Ok(dirs)
}

pub fn ensure_directories(source: &impl EnvSource) -> Result<WorkDirs> {
    let context = DeploymentContext::detect(source);
    let cwd = std::env::current_dir()?;
    let base = context.base_dir(&cwd);
    tracing::debug!("Using {:?} storage base {}", context, base.display());
    ensure_directories_in(&base)
}
