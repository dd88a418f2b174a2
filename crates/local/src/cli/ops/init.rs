use clap::Args;
use object_store::ObjectStoreConfig;

use crate::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Feature name written to the manifest
    #[arg(long, default_value = "polypod-local")]
    pub name: String,

    /// Keep nothing on disk; every command starts from an empty pod
    #[arg(long)]
    pub memory: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod_dir = AppState::pod_dir(ctx.config_path.clone())?;
        let mut config = AppConfig::local(&pod_dir);
        if self.memory {
            config.storage = ObjectStoreConfig::Memory;
        }

        let state = AppState::init(Some(pod_dir), Some(config), &self.name)?;

        let storage = match &state.config.storage {
            ObjectStoreConfig::Memory => "memory".to_string(),
            ObjectStoreConfig::Local { path } => path.display().to_string(),
        };
        Ok(format!(
            "Initialized polypod directory at: {}\n\
             - Config: {}\n\
             - Endpoints: {}\n\
             - Manifest: {}\n\
             - Storage: {}",
            state.pod_dir.display(),
            state.config_path.display(),
            state.endpoints_path.display(),
            state.manifest_path.display(),
            storage
        ))
    }
}
