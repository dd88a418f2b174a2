use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::{BoxFuture, FutureExt, Shared};

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::info::Info;
use crate::nav::{Action, ExternalFile, PolyNav};
use crate::poly_in::{PolyIn, QueryResult, Triplestore};
use crate::poly_out::{Entry, PolyOut, Stats};
use crate::rdf::{Matcher, Quad};

/// A capability that is not available yet.
///
/// Holds a shared pending resolution of the real implementation. Every
/// forwarded call awaits that same resolution first, so all callers observe
/// one target (or one failure) no matter when they arrived.
pub struct Deferred<T: ?Sized> {
    target: Shared<BoxFuture<'static, Result<Arc<T>>>>,
}

impl<T: ?Sized> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> Deferred<T> {
    pub fn new<F>(target: F) -> Self
    where
        F: Future<Output = Result<Arc<T>>> + Send + 'static,
    {
        Self {
            target: target.boxed().shared(),
        }
    }

    pub async fn resolve(&self) -> Result<Arc<T>> {
        self.target.clone().await
    }

    /// Defer a part of the target, resolved from the same pending target.
    pub fn project<U, F>(&self, part: F) -> Deferred<U>
    where
        U: ?Sized + Send + Sync + 'static,
        F: FnOnce(&T) -> Arc<U> + Send + 'static,
    {
        let whole = self.clone();
        Deferred::new(async move { whole.resolve().await.map(|target| part(&*target)) })
    }
}

#[async_trait]
impl PolyOut for Deferred<dyn PolyOut> {
    async fn read_file(&self, id: &str) -> Result<Bytes> {
        self.resolve().await?.read_file(id).await
    }

    async fn write_file(&self, id: &str, content: Bytes) -> Result<()> {
        self.resolve().await?.write_file(id, content).await
    }

    async fn stat(&self, id: &str) -> Result<Stats> {
        self.resolve().await?.stat(id).await
    }

    async fn read_dir(&self, id: &str) -> Result<Vec<Entry>> {
        self.resolve().await?.read_dir(id).await
    }

    async fn import_archive(&self, url: &str, dest: Option<&str>) -> Result<String> {
        self.resolve().await?.import_archive(url, dest).await
    }

    async fn remove_archive(&self, id: &str) -> Result<()> {
        self.resolve().await?.remove_archive(id).await
    }
}

#[async_trait]
impl PolyIn for Deferred<dyn PolyIn> {
    async fn r#match(&self, matcher: &Matcher) -> Result<Vec<Quad>> {
        self.resolve().await?.r#match(matcher).await
    }

    async fn add(&self, quad: &Quad) -> Result<()> {
        self.resolve().await?.add(quad).await
    }

    async fn delete(&self, quad: &Quad) -> Result<()> {
        self.resolve().await?.delete(quad).await
    }

    async fn has(&self, quad: &Quad) -> Result<bool> {
        self.resolve().await?.has(quad).await
    }
}

#[async_trait]
impl Triplestore for Deferred<dyn Triplestore> {
    async fn query(&self, sparql: &str) -> Result<QueryResult> {
        self.resolve().await?.query(sparql).await
    }

    async fn update(&self, sparql: &str) -> Result<()> {
        self.resolve().await?.update(sparql).await
    }
}

#[async_trait]
impl PolyNav for Deferred<dyn PolyNav> {
    async fn open_url(&self, link: &str) -> Result<()> {
        self.resolve().await?.open_url(link).await
    }

    async fn set_active_actions(&self, actions: &[Action]) -> Result<()> {
        self.resolve().await?.set_active_actions(actions).await
    }

    async fn set_title(&self, title: &str) -> Result<()> {
        self.resolve().await?.set_title(title).await
    }

    async fn pick_file(&self, mime_type: Option<&str>) -> Result<Option<ExternalFile>> {
        self.resolve().await?.pick_file(mime_type).await
    }
}

#[async_trait]
impl Endpoint for Deferred<dyn Endpoint> {
    async fn send(
        &self,
        endpoint_id: &str,
        payload: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<()> {
        self.resolve()
            .await?
            .send(endpoint_id, payload, content_type, auth_token)
            .await
    }

    async fn get(
        &self,
        endpoint_id: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<String> {
        self.resolve()
            .await?
            .get(endpoint_id, content_type, auth_token)
            .await
    }
}

#[async_trait]
impl Info for Deferred<dyn Info> {
    async fn get_runtime(&self) -> Result<String> {
        self.resolve().await?.get_runtime().await
    }

    async fn get_version(&self) -> Result<String> {
        self.resolve().await?.get_version().await
    }
}
