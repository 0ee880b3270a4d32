use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse menu document: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid menu configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = MenuError> = std::result::Result<T, E>;
