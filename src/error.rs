use std::path::PathBuf;

/// Errors that can occur when resolving a board.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("no board state provided")]
    EmptyBoard,

    #[error("malformed board: row {row} has {found} cells, expected {expected}")]
    MalformedBoard {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("failed to build search thread pool: {0}")]
    ThreadPool(String),

    #[error("invalid resolver configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
