use std::{fs, path::PathBuf};

use common::endpoint::EndpointTable;
use common::error::PodError;
use common::pod::PodConfig;
use common::session::Manifest;
use object_store::ObjectStoreConfig;
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "polypod";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const ENDPOINTS_FILE_NAME: &str = "endpoints.json";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
pub const STORE_DIR_NAME: &str = "store";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Endpoint allow-list, relative to the pod directory
    #[serde(default = "default_endpoints_file")]
    pub endpoints_file: String,
    /// Feature manifest, relative to the pod directory
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    /// Where archives and quads are kept
    pub storage: ObjectStoreConfig,
}

fn default_endpoints_file() -> String {
    ENDPOINTS_FILE_NAME.to_string()
}

fn default_manifest_file() -> String {
    MANIFEST_FILE_NAME.to_string()
}

impl AppConfig {
    /// Local storage under `pod_dir`.
    pub fn local(pod_dir: &std::path::Path) -> Self {
        Self {
            endpoints_file: default_endpoints_file(),
            manifest_file: default_manifest_file(),
            storage: ObjectStoreConfig::Local {
                path: pod_dir.join(STORE_DIR_NAME),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the pod directory (~/.polypod)
    pub pod_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    pub endpoints_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the pod directory path (custom or default ~/.polypod)
    pub fn pod_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new pod directory
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
        feature_name: &str,
    ) -> Result<Self, StateError> {
        let pod_dir = Self::pod_dir(custom_path)?;

        if pod_dir.exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&pod_dir)?;

        let config = config.unwrap_or_else(|| AppConfig::local(&pod_dir));
        if let ObjectStoreConfig::Local { path } = &config.storage {
            fs::create_dir_all(path)?;
        }
        let config_path = pod_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        // an empty allow-list: no endpoint is reachable until one is added
        let endpoints_path = pod_dir.join(&config.endpoints_file);
        fs::write(
            &endpoints_path,
            serde_json::to_string_pretty(&EndpointTable::default())?,
        )?;

        let manifest_path = pod_dir.join(&config.manifest_file);
        fs::write(
            &manifest_path,
            serde_json::to_string_pretty(&Manifest::new(feature_name))?,
        )?;

        Ok(Self {
            pod_dir,
            config_path,
            endpoints_path,
            manifest_path,
            config,
        })
    }

    /// Load existing state from the pod directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let pod_dir = Self::pod_dir(custom_path)?;

        if !pod_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = pod_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }
        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        let endpoints_path = pod_dir.join(&config.endpoints_file);
        if !endpoints_path.exists() {
            return Err(StateError::MissingFile(config.endpoints_file.clone()));
        }
        let manifest_path = pod_dir.join(&config.manifest_file);

        Ok(Self {
            pod_dir,
            config_path,
            endpoints_path,
            manifest_path,
            config,
        })
    }

    /// Everything needed to open the pod. A missing manifest falls back to
    /// one named after the app.
    pub async fn pod_config(&self) -> Result<PodConfig, StateError> {
        let endpoints = EndpointTable::load(&self.endpoints_path).await?;
        let manifest = if self.manifest_path.exists() {
            Manifest::load(&self.manifest_path).await?
        } else {
            Manifest::new(APP_NAME)
        };
        Ok(PodConfig {
            storage: self.config.storage.clone(),
            endpoints,
            manifest,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("polypod directory not initialized. Run 'polypod-local init' first")]
    NotInitialized,

    #[error("polypod directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error(transparent)]
    Pod(#[from] PodError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
