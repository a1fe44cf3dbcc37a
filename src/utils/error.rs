use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("{var} environment variable not set. Provide {expected}.")]
    MissingConfig {
        var: &'static str,
        expected: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Failed to install logger: {0}")]
    LoggerInstall(#[from] tracing::dispatcher::SetGlobalDefaultError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    FileSystem,
    Logging,
}

impl BootstrapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BootstrapError::MissingConfig { .. } | BootstrapError::Dotenv(_) => {
                ErrorCategory::Configuration
            }
            BootstrapError::Io(_) => ErrorCategory::FileSystem,
            BootstrapError::LoggerInstall(_) => ErrorCategory::Logging,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            BootstrapError::MissingConfig { var, .. } => format!(
                "Set {} in the function's application settings, or in a local .env file",
                var
            ),
            BootstrapError::Dotenv(_) => {
                "Check that the .env file in the working directory is readable".to_string()
            }
            BootstrapError::Io(e) => match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    "Check write permissions on the storage directory".to_string()
                }
                std::io::ErrorKind::NotFound => {
                    "Check that the parent directory of the log file exists".to_string()
                }
                _ => "Check available disk space and the storage path".to_string(),
            },
            BootstrapError::LoggerInstall(_) => {
                "A global logger is already installed; install only once per process".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, BootstrapError>;
