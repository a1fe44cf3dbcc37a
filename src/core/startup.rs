use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::env::{EnvSource, ProcessEnv};
use crate::config::{load_config, load_from_env, RtrConfig};
use crate::core::dirs::{ensure_directories, ensure_directories_in, DeploymentContext, WorkDirs};
use crate::utils::error::Result;
use crate::utils::logger::{LogRegistry, Logger, Thresholds};

pub const DEFAULT_LOG_NAME: &str = "rtr";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFile {
    /// `<logs_dir>/<log_name>.log`
    Default,
    Path(PathBuf),
    Disabled,
}

#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub log_name: String,
    pub log_file: LogFile,
    pub thresholds: Thresholds,
}

impl Default for StartupOptions {
    fn default() -> Self {
        Self {
            log_name: DEFAULT_LOG_NAME.to_string(),
            log_file: LogFile::Default,
            thresholds: Thresholds::default(),
        }
    }
}

/// Everything a function invocation needs before it starts running scripts.
#[derive(Debug, Clone)]
pub struct Startup {
    pub context: DeploymentContext,
    pub dirs: WorkDirs,
    pub log_file: Option<PathBuf>,
    pub logger: Logger,
    pub config: RtrConfig,
}

#[derive(Debug, Serialize)]
pub struct StartupSummary<'a> {
    pub context: DeploymentContext,
    pub logs_dir: &'a Path,
    pub result_dir: &'a Path,
    pub log_file: Option<&'a Path>,
    pub config: &'a RtrConfig,
}

impl Startup {
    /// Creates the work directories, sets up the logger inside the logs
    /// directory, then reads the configuration.
    pub fn run(
        registry: &mut LogRegistry,
        source: &impl EnvSource,
        cwd: &Path,
        options: &StartupOptions,
    ) -> Result<Self> {
        let context = DeploymentContext::detect(source);
        let dirs = ensure_directories_in(&context.base_dir(cwd))?;
        Self::assemble(registry, context, dirs, options, || load_config(source))
    }

    /// Runs against the process environment. `.env` in the working directory
    /// is loaded with the configuration, after the directories and logger exist.
    pub fn from_process_env(registry: &mut LogRegistry, options: &StartupOptions) -> Result<Self> {
        let context = DeploymentContext::detect(&ProcessEnv);
        let dirs = ensure_directories(&ProcessEnv)?;
        Self::assemble(registry, context, dirs, options, load_from_env)
    }

    fn assemble(
        registry: &mut LogRegistry,
        context: DeploymentContext,
        dirs: WorkDirs,
        options: &StartupOptions,
        load: impl FnOnce() -> Result<RtrConfig>,
    ) -> Result<Self> {
        let log_file = match &options.log_file {
            LogFile::Default => Some(dirs.logs_dir.join(format!("{}.log", options.log_name))),
            LogFile::Path(path) => Some(path.clone()),
            LogFile::Disabled => None,
        };
        let logger =
            registry.setup_with(&options.log_name, log_file.as_deref(), options.thresholds)?;

        let config = logger.in_scope(|| {
            tracing::info!("Starting in {:?} context", context);
            tracing::debug!("Logs directory: {}", dirs.logs_dir.display());
            tracing::debug!("Result directory: {}", dirs.result_dir.display());

            let config = load();
            match &config {
                Ok(config) => tracing::info!(
                    "Loaded {} script(s), upload to BloodHound: {}",
                    config.script_names.len(),
                    config.upload_to_bh
                ),
                Err(e) => tracing::error!("Configuration failed: {}", e),
            }
            config
        })?;

        Ok(Self {
            context,
            dirs,
            log_file,
            logger,
            config,
        })
    }

    pub fn summary(&self) -> StartupSummary<'_> {
        StartupSummary {
            context: self.context,
            logs_dir: &self.dirs.logs_dir,
            result_dir: &self.dirs.result_dir,
            log_file: self.log_file.as_deref(),
            config: &self.config,
        }
    }
}
