pub mod config;
pub mod core;
pub mod utils;

pub use crate::config::env::{EnvSource, ProcessEnv};
pub use crate::config::{load_config, load_from_env, RtrConfig};
pub use crate::core::dirs::{ensure_directories, ensure_directories_in, DeploymentContext, WorkDirs};
pub use crate::core::startup::{LogFile, Startup, StartupOptions};
pub use crate::utils::error::{BootstrapError, Result};
pub use crate::utils::logger::{LogRegistry, LogTarget, Logger, Thresholds};
