pub mod archive;
pub mod endpoint;
pub mod info;
pub mod init;
pub mod quads;
pub mod sparql;
pub mod version;

pub use archive::Archive;
pub use endpoint::Endpoint;
pub use info::Info;
pub use init::Init;
pub use quads::Quads;
pub use sparql::{Query, Update};
pub use version::Version;

use common::error::PodError;

use crate::state::StateError;

/// Failure of an op that opens the pod and calls into it.
#[derive(Debug, thiserror::Error)]
pub enum PodOpError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Pod(#[from] PodError),
}
