use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::utils::error::Result;

pub const SCRIPT_FILE_NAMES: &str = "SCRIPT_FILE_NAMES";
pub const UPLOAD_TO_BLOODHOUND: &str = "UPLOAD_TO_BLOODHOUND";
pub const MAX_RETRIES: &str = "MAX_RETRIES";
pub const RETRY_DELAY: &str = "RETRY_DELAY";
/// Set by the function host in the cloud; absent under local runs.
pub const WEBSITE_INSTANCE_ID: &str = "WEBSITE_INSTANCE_ID";

pub const DOTENV_FILE: &str = ".env";

/// Key/value source that configuration is read from.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn contains(&self, key: &str) -> bool {
        std::env::var_os(key).is_some()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// Loads `dir/.env` into the process environment if the file exists.
///
/// Variables that are already set keep their values. Malformed lines are
/// skipped with a warning. Returns whether a file was loaded.
pub fn load_dotenv_in(dir: &Path) -> Result<bool> {
    let path = dir.join(DOTENV_FILE);
    if !path.is_file() {
        return Ok(false);
    }

    for item in dotenvy::from_path_iter(&path)? {
        match item {
            Ok((key, value)) => {
                if std::env::var_os(&key).is_none() {
                    std::env::set_var(&key, value);
                }
            }
            Err(e) => tracing::warn!("Skipping malformed line in {}: {}", path.display(), e),
        }
    }
    tracing::debug!("Loaded environment from {}", path.display());
    Ok(true)
}

/// Loads `.env` from the current working directory, if present.
pub fn load_local_dotenv() -> Result<bool> {
    let cwd = std::env::current_dir()?;
    load_dotenv_in(&cwd)
}
