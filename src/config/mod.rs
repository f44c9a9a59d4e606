//! Configuration management module.
//!
//! This module handles loading and saving the application configuration:
//! store credentials, the last opened workspace and sync timings.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use crate::store::FirestoreStore;
use crate::sync::{RetryPolicy, SyncConfig};
use log::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/syncho";

pub const PROJECT_ID_VAR: &str = "SYNCHO_PROJECT_ID";
pub const API_KEY_VAR: &str = "SYNCHO_API_KEY";
pub const BASE_URL_VAR: &str = "SYNCHO_BASE_URL";

/// Retry settings as written in the configuration file.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RetrySpec {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetrySpec {
    fn default() -> Self {
        RetrySpec {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// Define the shape of the configuration file.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct FileSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_workspace: Option<String>,
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_whiteboard_debounce_ms")]
    pub whiteboard_debounce_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_activation_distance")]
    pub activation_distance: u16,
    #[serde(default)]
    pub retry: RetrySpec,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_whiteboard_debounce_ms() -> u64 {
    1000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_activation_distance() -> u16 {
    crate::board::DEFAULT_ACTIVATION_DISTANCE
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    250
}

fn default_max_delay_ms() -> u64 {
    4000
}

/// Credentials taken from the environment. They win over the file and are
/// never written back to it.
///
#[derive(Clone, Debug, Default, PartialEq)]
struct Overrides {
    project_id: Option<String>,
    api_key: Option<String>,
    base_url: Option<String>,
}

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub project_id: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub last_workspace: Option<String>,
    pub debounce_ms: u64,
    pub whiteboard_debounce_ms: u64,
    pub poll_interval_ms: u64,
    pub activation_distance: u16,
    pub retry: RetrySpec,
    overrides: Overrides,
    file_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

impl From<FileSpec> for Config {
    fn from(data: FileSpec) -> Self {
        Config {
            project_id: data.project_id,
            api_key: data.api_key,
            base_url: data.base_url,
            last_workspace: data.last_workspace,
            debounce_ms: data.debounce_ms,
            whiteboard_debounce_ms: data.whiteboard_debounce_ms,
            poll_interval_ms: data.poll_interval_ms,
            activation_distance: data.activation_distance,
            retry: data.retry,
            overrides: Overrides::default(),
            file_path: None,
        }
    }
}

impl Config {
    /// Return a new instance with every setting at its default.
    ///
    pub fn new() -> Config {
        Config {
            project_id: None,
            api_key: None,
            base_url: None,
            last_workspace: None,
            debounce_ms: default_debounce_ms(),
            whiteboard_debounce_ms: default_whiteboard_debounce_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            activation_distance: default_activation_distance(),
            retry: RetrySpec::default(),
            overrides: Overrides::default(),
            file_path: None,
        }
    }

    /// Load the configuration from the disk using the custom directory if
    /// provided, then apply environment overrides. A missing file leaves the
    /// defaults in place.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        // Use default path unless custom path provided
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };

        if !dir_path.exists() {
            fs::create_dir_all(&dir_path).map_err(|e| ConfigError::CreateDirectory {
                path: dir_path.clone(),
                source: e,
            })?;
        }

        let file_path = dir_path.join(Path::new(FILE_NAME));
        if file_path.exists() {
            let contents = fs::read_to_string(&file_path).map_err(|e| ConfigError::Read {
                path: file_path.clone(),
                source: e,
            })?;
            *self = Config::parse(&contents)?;
            debug!("Loaded configuration from {}.", file_path.display());
        }
        self.file_path = Some(file_path);
        self.apply_overrides(|name| std::env::var(name).ok());
        Ok(())
    }

    fn parse(contents: &str) -> Result<Config, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Config::new());
        }
        let data: FileSpec = serde_yaml::from_str(contents)
            .map_err(ConfigError::Parse)?;
        Ok(data.into())
    }

    /// Take credentials from the given variable lookup, ignoring blank values.
    ///
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        self.overrides = Overrides {
            project_id: get(PROJECT_ID_VAR),
            api_key: get(API_KEY_VAR),
            base_url: get(BASE_URL_VAR),
        };
    }

    pub fn effective_project_id(&self) -> Option<&str> {
        self.overrides
            .project_id
            .as_deref()
            .or(self.project_id.as_deref())
    }

    pub fn effective_api_key(&self) -> Option<&str> {
        self.overrides.api_key.as_deref().or(self.api_key.as_deref())
    }

    /// Document API root: an explicit base URL, else the one derived from
    /// the project id.
    ///
    pub fn store_url(&self) -> Result<String, ConfigError> {
        if let Some(url) = self.overrides.base_url.as_deref().or(self.base_url.as_deref()) {
            return Ok(url.trim_end_matches('/').to_owned());
        }
        self.effective_project_id()
            .map(FirestoreStore::base_url_for)
            .ok_or(ConfigError::StoreNotConfigured)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retry.max_retries,
            initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            max_delay: Duration::from_millis(self.retry.max_delay_ms),
            ..RetryPolicy::default()
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            whiteboard_debounce: Duration::from_millis(self.whiteboard_debounce_ms),
            retry: self.retry_policy(),
        }
    }

    fn file_spec(&self) -> FileSpec {
        FileSpec {
            project_id: self.project_id.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            last_workspace: self.last_workspace.clone(),
            debounce_ms: self.debounce_ms,
            whiteboard_debounce_ms: self.whiteboard_debounce_ms,
            poll_interval_ms: self.poll_interval_ms,
            activation_distance: self.activation_distance,
            retry: self.retry.clone(),
        }
    }

    /// Save the current configuration to disk.
    ///
    pub fn save(&self) -> Result<(), AppError> {
        let file_path = self.file_path.as_ref().ok_or(ConfigError::NotLoaded)?;
        let content = serde_yaml::to_string(&self.file_spec())
            .map_err(ConfigError::Encode)?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| ConfigError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let mut file = fs::File::create(file_path).map_err(|e| ConfigError::Write {
            path: file_path.clone(),
            source: e,
        })?;
        write!(file, "{}", content).map_err(|e| ConfigError::Write {
            path: file_path.clone(),
            source: e,
        })?;
        file.flush().map_err(|e| ConfigError::Write {
            path: file_path.clone(),
            source: e,
        })?;
        debug!("Saved configuration to {}.", file_path.display());
        Ok(())
    }

    /// Returns the path buffer for the default configuration directory or an
    /// error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => Ok(Path::new(&home).join(Path::new(DEFAULT_DIRECTORY_PATH))),
            None => Err(ConfigError::NoHomeDirectory.into()),
        }
    }
}
