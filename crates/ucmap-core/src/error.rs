use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown sort mode: {0}")]
    UnknownSortMode(String),

    #[error("invalid overlay document: {0}")]
    InvalidOverlay(String),

    #[error("token store I/O error at {path}: {source}")]
    TokenIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while loading configuration from the environment or disk.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read palette file {path}: {source}")]
    PaletteFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse palette file: {0}")]
    PaletteFileParse(#[from] serde_yaml::Error),

    #[error("palette validation failed: {0}")]
    Validation(String),
}
