pub mod env;

use serde::Serialize;

use crate::utils::error::{BootstrapError, Result};
use crate::utils::parse::{parse_or_default, parse_truthy, split_list};
use self::env::{EnvSource, ProcessEnv, MAX_RETRIES, RETRY_DELAY, SCRIPT_FILE_NAMES, UPLOAD_TO_BLOODHOUND};

pub const DEFAULT_MAX_RETRIES: i64 = 10;
pub const DEFAULT_RETRY_DELAY: i64 = 5;

/// Settings for an RTR script run, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RtrConfig {
    pub script_names: Vec<String>,
    pub upload_to_bh: bool,
    pub max_retries: i64,
    pub retry_delay: i64,
}

/// Reads the configuration from `source`.
///
/// `SCRIPT_FILE_NAMES` is required and fails hard when unset or empty. The
/// retry settings fall back to their defaults when malformed.
pub fn load_config(source: &impl EnvSource) -> Result<RtrConfig> {
    let raw_names = source
        .get(SCRIPT_FILE_NAMES)
        .filter(|value| !value.is_empty())
        .ok_or(BootstrapError::MissingConfig {
            var: SCRIPT_FILE_NAMES,
            expected: "comma-separated script filenames",
        })?;

    Ok(RtrConfig {
        script_names: split_list(&raw_names),
        upload_to_bh: parse_truthy(source.get(UPLOAD_TO_BLOODHOUND).as_deref(), false),
        max_retries: parse_or_default(source.get(MAX_RETRIES).as_deref(), DEFAULT_MAX_RETRIES),
        retry_delay: parse_or_default(source.get(RETRY_DELAY).as_deref(), DEFAULT_RETRY_DELAY),
    })
}

/// Loads `.env` from the working directory when present, then reads the process environment.
pub fn load_from_env() -> Result<RtrConfig> {
    env::load_local_dotenv()?;
    load_config(&ProcessEnv)
}
