//! Runtime identification for features.

use async_trait::async_trait;

use crate::error::Result;
use crate::version::build_info;

/// Name reported by [`Info::get_runtime`].
pub const RUNTIME_NAME: &str = "polypod-rs";

#[async_trait]
pub trait Info: Send + Sync {
    async fn get_runtime(&self) -> Result<String>;

    async fn get_version(&self) -> Result<String>;
}

/// Reports this build of the runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeInfo;

#[async_trait]
impl Info for RuntimeInfo {
    async fn get_runtime(&self) -> Result<String> {
        Ok(RUNTIME_NAME.to_string())
    }

    async fn get_version(&self) -> Result<String> {
        Ok(build_info().version.to_string())
    }
}
