use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use common::pod::Pod;

use crate::host::TerminalHost;
use crate::state::{AppState, StateError};

#[derive(Clone)]
pub struct OpContext {
    /// Optional custom config path (defaults to ~/.polypod)
    pub config_path: Option<PathBuf>,
    /// Approve consent prompts without asking
    pub assume_yes: bool,
}

impl OpContext {
    pub fn new(config_path: Option<PathBuf>, assume_yes: bool) -> Self {
        Self {
            config_path,
            assume_yes,
        }
    }

    /// Open the pod kept in the config directory, with the terminal as host.
    pub async fn open_pod(&self) -> Result<Pod, StateError> {
        let state = AppState::load(self.config_path.clone())?;
        let config = state.pod_config().await?;
        let host = Arc::new(TerminalHost::new(self.assume_yes));
        Ok(Pod::open(&config, host).await?)
    }
}

#[async_trait::async_trait]
pub trait Op: Send + Sync {
    type Error: Error + Send + Sync + 'static;
    type Output;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $type:ty)),* $(,)?) => {
        #[derive(Subcommand, Debug, Clone)]
        pub enum Command {
            $($variant($type),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$type as $crate::cli::op::Op>::Output),)*
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$type as $crate::cli::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::cli::op::Op for Command {
            type Output = OpOutput;
            type Error = OpError;

            async fn execute(&self, ctx: &$crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => {
                            op.execute(ctx).await
                                .map(OpOutput::$variant)
                                .map_err(OpError::$variant)
                        },
                    )*
                }
            }
        }

        impl std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        OpOutput::$variant(output) => write!(f, "{}", output),
                    )*
                }
            }
        }
    };
}
