use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::messages::{
    BridgeRequest as Req, BridgeResponse as Res, Payload, RequestEnvelope, ResponseEnvelope,
};
use super::BridgePort;
use crate::endpoint::Endpoint;
use crate::error::{PodError, Result};
use crate::info::Info;
use crate::nav::{Action, ExternalFile, PolyNav};
use crate::poly_in::{PolyIn, QueryResult, Triplestore};
use crate::poly_out::{Entry, PolyOut, Stats};
use crate::pod::Pod;
use crate::rdf::{Matcher, Quad};

type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Res>>>>>;

macro_rules! expect_reply {
    ($reply:expr, $pattern:pat => $value:expr) => {
        match $reply {
            $pattern => Ok($value),
            other => Err(unexpected(other)),
        }
    };
}

fn unexpected(reply: Res) -> PodError {
    PodError::Bridge(format!("unexpected reply {:?}", reply))
}

/// Feature side of the bridge. Implements every capability by forwarding
/// the call to the host and waiting for the matching reply.
pub struct BridgeClient {
    port: BridgePort,
    next_id: AtomicU64,
    pending: Pending,
}

impl BridgeClient {
    /// Wrap `port` and start routing replies. Must run inside a tokio runtime.
    pub fn start(port: BridgePort) -> Arc<Self> {
        let pending: Pending = Arc::default();
        tokio::spawn(route_replies(port.incoming.clone(), pending.clone()));
        Arc::new(Self {
            port,
            next_id: AtomicU64::new(1),
            pending,
        })
    }

    pub async fn call(&self, request: Req) -> Result<Res> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let message = serde_json::to_string(&RequestEnvelope { id, request })
            .map_err(|e| PodError::Bridge(e.to_string()))?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        if let Err(e) = self.port.send(message).await {
            self.pending.lock().remove(&id);
            return Err(e);
        }
        rx.await
            .map_err(|_| PodError::Bridge("bridge closed before the reply arrived".to_string()))?
    }

    pub fn into_pod(self: Arc<Self>) -> Pod {
        Pod::new(
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self.clone(),
            self,
        )
    }
}

async fn route_replies(incoming: flume::Receiver<String>, pending: Pending) {
    while let Ok(message) = incoming.recv_async().await {
        let envelope: ResponseEnvelope = match serde_json::from_str(&message) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "bridge: dropping undecodable reply");
                continue;
            }
        };
        match pending.lock().remove(&envelope.id) {
            Some(waiter) => {
                let _ = waiter.send(envelope.result);
            }
            None => tracing::warn!(id = envelope.id, "bridge: reply to unknown request"),
        }
    }
    // fail everything still waiting
    pending.lock().clear();
}

/// A pod served over `port`, usable before the host has answered the
/// handshake.
pub fn connect(port: BridgePort) -> Pod {
    let handshake = tokio::spawn(async move {
        let client = BridgeClient::start(port);
        let runtime = expect_reply!(client.call(Req::Hello).await?, Res::Hello { runtime } => runtime)?;
        tracing::info!(runtime, "bridge: connected");
        Ok::<_, PodError>(client.into_pod())
    });
    Pod::deferred(async move {
        handshake
            .await
            .map_err(|e| PodError::Bridge(e.to_string()))?
    })
}

#[async_trait]
impl PolyOut for BridgeClient {
    async fn read_file(&self, id: &str) -> Result<Bytes> {
        let reply = self.call(Req::ReadFile { id: id.to_string() }).await?;
        expect_reply!(reply, Res::Bytes(Payload(bytes)) => bytes)
    }

    async fn write_file(&self, id: &str, content: Bytes) -> Result<()> {
        let reply = self
            .call(Req::WriteFile {
                id: id.to_string(),
                content: content.into(),
            })
            .await?;
        expect_reply!(reply, Res::Unit => ())
    }

    async fn stat(&self, id: &str) -> Result<Stats> {
        let reply = self.call(Req::Stat { id: id.to_string() }).await?;
        expect_reply!(reply, Res::Stats(stats) => stats)
    }

    async fn read_dir(&self, id: &str) -> Result<Vec<Entry>> {
        let reply = self.call(Req::ReadDir { id: id.to_string() }).await?;
        expect_reply!(reply, Res::Entries(entries) => entries)
    }

    async fn import_archive(&self, url: &str, dest: Option<&str>) -> Result<String> {
        let reply = self
            .call(Req::ImportArchive {
                url: url.to_string(),
                dest: dest.map(str::to_string),
            })
            .await?;
        expect_reply!(reply, Res::Id(id) => id)
    }

    async fn remove_archive(&self, id: &str) -> Result<()> {
        let reply = self.call(Req::RemoveArchive { id: id.to_string() }).await?;
        expect_reply!(reply, Res::Unit => ())
    }
}

#[async_trait]
impl PolyIn for BridgeClient {
    async fn r#match(&self, matcher: &Matcher) -> Result<Vec<Quad>> {
        let reply = self
            .call(Req::Match {
                matcher: matcher.clone(),
            })
            .await?;
        expect_reply!(reply, Res::Quads(quads) => quads)
    }

    async fn add(&self, quad: &Quad) -> Result<()> {
        let reply = self.call(Req::Add { quad: quad.clone() }).await?;
        expect_reply!(reply, Res::Unit => ())
    }

    async fn delete(&self, quad: &Quad) -> Result<()> {
        let reply = self.call(Req::Delete { quad: quad.clone() }).await?;
        expect_reply!(reply, Res::Unit => ())
    }

    async fn has(&self, quad: &Quad) -> Result<bool> {
        let reply = self.call(Req::Has { quad: quad.clone() }).await?;
        expect_reply!(reply, Res::Bool(found) => found)
    }
}

#[async_trait]
impl Triplestore for BridgeClient {
    async fn query(&self, sparql: &str) -> Result<QueryResult> {
        let reply = self
            .call(Req::Query {
                sparql: sparql.to_string(),
            })
            .await?;
        expect_reply!(reply, Res::QueryResult(result) => result)
    }

    async fn update(&self, sparql: &str) -> Result<()> {
        let reply = self
            .call(Req::Update {
                sparql: sparql.to_string(),
            })
            .await?;
        expect_reply!(reply, Res::Unit => ())
    }
}

#[async_trait]
impl PolyNav for BridgeClient {
    async fn open_url(&self, link: &str) -> Result<()> {
        let reply = self
            .call(Req::OpenUrl {
                link: link.to_string(),
            })
            .await?;
        expect_reply!(reply, Res::Unit => ())
    }

    async fn set_active_actions(&self, actions: &[Action]) -> Result<()> {
        let reply = self
            .call(Req::SetActiveActions {
                actions: actions.to_vec(),
            })
            .await?;
        expect_reply!(reply, Res::Unit => ())
    }

    async fn set_title(&self, title: &str) -> Result<()> {
        let reply = self
            .call(Req::SetTitle {
                title: title.to_string(),
            })
            .await?;
        expect_reply!(reply, Res::Unit => ())
    }

    async fn pick_file(&self, mime_type: Option<&str>) -> Result<Option<ExternalFile>> {
        let reply = self
            .call(Req::PickFile {
                mime_type: mime_type.map(str::to_string),
            })
            .await?;
        expect_reply!(reply, Res::File(file) => file)
    }
}

#[async_trait]
impl Endpoint for BridgeClient {
    async fn send(
        &self,
        endpoint_id: &str,
        payload: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<()> {
        let reply = self
            .call(Req::EndpointSend {
                endpoint_id: endpoint_id.to_string(),
                payload: payload.to_string(),
                content_type: content_type.map(str::to_string),
                auth_token: auth_token.map(str::to_string),
            })
            .await?;
        expect_reply!(reply, Res::Unit => ())
    }

    async fn get(
        &self,
        endpoint_id: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<String> {
        let reply = self
            .call(Req::EndpointGet {
                endpoint_id: endpoint_id.to_string(),
                content_type: content_type.map(str::to_string),
                auth_token: auth_token.map(str::to_string),
            })
            .await?;
        expect_reply!(reply, Res::Text(body) => body)
    }
}

#[async_trait]
impl Info for BridgeClient {
    async fn get_runtime(&self) -> Result<String> {
        let reply = self.call(Req::GetRuntime).await?;
        expect_reply!(reply, Res::Text(runtime) => runtime)
    }

    async fn get_version(&self) -> Result<String> {
        let reply = self.call(Req::GetVersion).await?;
        expect_reply!(reply, Res::Text(version) => version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::channel;

    #[tokio::test]
    async fn test_calls_fail_when_host_is_gone() {
        let (host, feature) = channel();
        drop(host);

        let pod = connect(feature);
        assert!(matches!(
            pod.info().get_runtime().await,
            Err(PodError::Bridge(_))
        ));
    }

    #[tokio::test]
    async fn test_replies_are_matched_by_id() {
        let (host, feature) = channel();
        let client = BridgeClient::start(feature);

        let first = tokio::spawn({
            let client = client.clone();
            async move { client.get_runtime().await }
        });
        let second = tokio::spawn({
            let client = client.clone();
            async move { client.get_version().await }
        });

        let mut ids = Vec::new();
        for _ in 0..2 {
            let envelope: RequestEnvelope =
                serde_json::from_str(&host.recv().await.unwrap()).unwrap();
            ids.push((envelope.id, envelope.request));
        }
        // answer in reverse order
        for (id, request) in ids.into_iter().rev() {
            let text = match request {
                Req::GetRuntime => "runtime",
                Req::GetVersion => "version",
                other => panic!("unexpected request {:?}", other),
            };
            let reply = ResponseEnvelope {
                id,
                result: Ok(Res::Text(text.to_string())),
            };
            host.send(serde_json::to_string(&reply).unwrap()).await.unwrap();
        }

        assert_eq!(first.await.unwrap().unwrap(), "runtime");
        assert_eq!(second.await.unwrap().unwrap(), "version");
    }
}
