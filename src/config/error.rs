use std::path::PathBuf;

/// Problems reading, writing or interpreting `config.yml`.
///
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `save` was called before any config directory was chosen.
    #[error("No config.yml location chosen yet; nothing to save")]
    NotLoaded,

    #[error(
        "No document store configured: set project_id or base_url in config.yml \
         (or SYNCHO_PROJECT_ID / SYNCHO_BASE_URL), or run with --memory"
    )]
    StoreNotConfigured,

    #[error("Cannot locate a home directory for ~/.config/syncho")]
    NoHomeDirectory,

    #[error("Cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot create config directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot encode settings as YAML: {0}")]
    Encode(#[source] serde_yaml::Error),

    #[error("config.yml is not valid: {0}")]
    Parse(#[source] serde_yaml::Error),
}
