//! The Pod facade: every capability a feature is granted, in one value.
//!
//! A [`Pod`] is assembled once and never reconfigured. [`Pod::open`] builds
//! the durable runtime; [`Pod::deferred`] hands out a pod whose backend is
//! still being established, with every call waiting on that resolution.

mod deferred;

use std::future::Future;
use std::sync::Arc;

use object_store::{ObjectStoreConfig, Storage};
use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, EndpointTable, HttpEndpoint};
use crate::error::Result;
use crate::info::{Info, RuntimeInfo};
use crate::nav::{Host, HostNav, PolyNav};
use crate::poly_in::{PolyIn, QuadStore, Triplestore};
use crate::poly_out::{ArchiveStore, Fetch, PolyOut, UrlFetcher};
use crate::session::{Manifest, Session};

pub use deferred::Deferred;

/// Everything needed to open a durable pod.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PodConfig {
    #[serde(default)]
    pub storage: ObjectStoreConfig,
    #[serde(default)]
    pub endpoints: EndpointTable,
    #[serde(default)]
    pub manifest: Manifest,
}

#[derive(Clone)]
pub struct Pod {
    poly_out: Arc<dyn PolyOut>,
    poly_in: Arc<dyn PolyIn>,
    triplestore: Arc<dyn Triplestore>,
    poly_nav: Arc<dyn PolyNav>,
    endpoint: Arc<dyn Endpoint>,
    info: Arc<dyn Info>,
}

impl Pod {
    pub fn new(
        poly_out: Arc<dyn PolyOut>,
        poly_in: Arc<dyn PolyIn>,
        triplestore: Arc<dyn Triplestore>,
        poly_nav: Arc<dyn PolyNav>,
        endpoint: Arc<dyn Endpoint>,
        info: Arc<dyn Info>,
    ) -> Self {
        Self {
            poly_out,
            poly_in,
            triplestore,
            poly_nav,
            endpoint,
            info,
        }
    }

    /// Open the pod described by `config`, with `host` answering for the user.
    ///
    /// Imports fetch `data:` and `http(s)://` sources, plus the files the
    /// user picks during this session.
    pub async fn open(config: &PodConfig, host: Arc<dyn Host>) -> Result<Self> {
        Self::assemble(config, host, |session| {
            Arc::new(UrlFetcher::for_session(session))
        })
        .await
    }

    /// Like [`Pod::open`], downloading archives through `fetcher`.
    pub async fn open_with_fetcher(
        config: &PodConfig,
        host: Arc<dyn Host>,
        fetcher: Arc<dyn Fetch>,
    ) -> Result<Self> {
        Self::assemble(config, host, |_| fetcher).await
    }

    async fn assemble(
        config: &PodConfig,
        host: Arc<dyn Host>,
        fetcher: impl FnOnce(Arc<Session>) -> Arc<dyn Fetch>,
    ) -> Result<Self> {
        let session = Arc::new(Session::new(config.manifest.clone()));
        let fetcher = fetcher(session.clone());
        let storage = Storage::new(config.storage.clone()).await?;
        let quads = Arc::new(QuadStore::open(storage.clone()).await?);
        tracing::info!(feature = %config.manifest.name, "pod opened");

        Ok(Self::new(
            Arc::new(ArchiveStore::with_fetcher(storage, fetcher)),
            quads.clone(),
            quads,
            Arc::new(HostNav::new(host.clone(), session.clone())),
            Arc::new(HttpEndpoint::new(
                Arc::new(config.endpoints.clone()),
                host,
                session,
            )),
            Arc::new(RuntimeInfo),
        ))
    }

    /// A pod usable immediately whose calls wait until `pod` resolves.
    ///
    /// Every capability forwards to the same resolved pod; if `pod` fails,
    /// every call fails with that error.
    pub fn deferred<F>(pod: F) -> Self
    where
        F: Future<Output = Result<Pod>> + Send + 'static,
    {
        let pod = Deferred::new(async move { pod.await.map(Arc::new) });
        Self::new(
            Arc::new(pod.project(|pod| pod.poly_out.clone())),
            Arc::new(pod.project(|pod| pod.poly_in.clone())),
            Arc::new(pod.project(|pod| pod.triplestore.clone())),
            Arc::new(pod.project(|pod| pod.poly_nav.clone())),
            Arc::new(pod.project(|pod| pod.endpoint.clone())),
            Arc::new(pod.project(|pod| pod.info.clone())),
        )
    }

    pub fn poly_out(&self) -> &Arc<dyn PolyOut> {
        &self.poly_out
    }

    pub fn poly_in(&self) -> &Arc<dyn PolyIn> {
        &self.poly_in
    }

    pub fn triplestore(&self) -> &Arc<dyn Triplestore> {
        &self.triplestore
    }

    pub fn poly_nav(&self) -> &Arc<dyn PolyNav> {
        &self.poly_nav
    }

    pub fn endpoint(&self) -> &Arc<dyn Endpoint> {
        &self.endpoint
    }

    pub fn info(&self) -> &Arc<dyn Info> {
        &self.info
    }
}
