use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Credentials file not found. Looked for:\n\
        - $LOFLEET_CONFIG_PATH\n\
        - current directory: creds.local.yaml, creds.yaml\n\
        - ./.lofleet/ directory\n\
        - ~/.config/lofleet/creds.yaml"
    )]
    CredsFileNotFound,

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Missing required setting '{0}'")]
    MissingSetting(&'static str),

    #[error("Setting '{0}' must be at least 1 second")]
    ZeroInterval(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
