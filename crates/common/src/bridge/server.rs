use super::messages::{BridgeRequest, BridgeResponse, RequestEnvelope, ResponseEnvelope};
use super::BridgePort;
use crate::error::{PodError, Result};
use crate::pod::Pod;

/// Mutations of one component, applied one at a time in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lane {
    Files,
    Quads,
}

fn lane(request: &BridgeRequest) -> Option<Lane> {
    match request {
        BridgeRequest::WriteFile { .. }
        | BridgeRequest::ImportArchive { .. }
        | BridgeRequest::RemoveArchive { .. } => Some(Lane::Files),
        BridgeRequest::Add { .. } | BridgeRequest::Delete { .. } | BridgeRequest::Update { .. } => {
            Some(Lane::Quads)
        }
        _ => None,
    }
}

/// Start the worker draining one lane.
fn spawn_lane(pod: Pod, port: BridgePort) -> flume::Sender<RequestEnvelope> {
    let (tx, rx) = flume::unbounded::<RequestEnvelope>();
    tokio::spawn(async move {
        while let Ok(envelope) = rx.recv_async().await {
            handle(&pod, &port, envelope).await;
        }
    });
    tx
}

/// Answer requests arriving on `port` from `pod` until the peer hangs up.
///
/// Reads, prompts and network calls run concurrently. Mutations of the same
/// component commit in the order they arrived. Replies carry the id of the
/// request they answer.
pub async fn serve(pod: Pod, port: BridgePort) -> Result<()> {
    tracing::info!("bridge: serving pod");
    let files = spawn_lane(pod.clone(), port.clone());
    let quads = spawn_lane(pod.clone(), port.clone());

    while let Some(message) = port.recv().await {
        let envelope: RequestEnvelope = match serde_json::from_str(&message) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, "bridge: dropping undecodable request");
                continue;
            }
        };

        let queue = match lane(&envelope.request) {
            Some(Lane::Files) => &files,
            Some(Lane::Quads) => &quads,
            None => {
                let pod = pod.clone();
                let port = port.clone();
                tokio::spawn(async move { handle(&pod, &port, envelope).await });
                continue;
            }
        };
        if let Err(e) = queue.send(envelope) {
            tracing::warn!(id = e.0.id, "bridge: lane worker is gone");
        }
    }
    tracing::info!("bridge: peer disconnected");
    Ok(())
}

async fn handle(pod: &Pod, port: &BridgePort, envelope: RequestEnvelope) {
    let id = envelope.id;
    let method = envelope.request.method();
    tracing::debug!(id, method, "bridge: request");
    let result = dispatch(pod, envelope.request).await;
    if let Err(e) = &result {
        tracing::debug!(id, method, error = %e, "bridge: request failed");
    }
    if let Err(e) = reply(port, ResponseEnvelope { id, result }).await {
        tracing::warn!(id, error = %e, "bridge: unable to deliver reply");
    }
}

async fn reply(port: &BridgePort, envelope: ResponseEnvelope) -> Result<()> {
    let message =
        serde_json::to_string(&envelope).map_err(|e| PodError::Bridge(e.to_string()))?;
    port.send(message).await
}

async fn dispatch(pod: &Pod, request: BridgeRequest) -> Result<BridgeResponse> {
    use BridgeRequest as Req;
    use BridgeResponse as Res;

    Ok(match request {
        Req::Hello => Res::Hello {
            runtime: pod.info().get_runtime().await?,
        },

        Req::ReadFile { id } => Res::Bytes(pod.poly_out().read_file(&id).await?.into()),
        Req::WriteFile { id, content } => {
            pod.poly_out().write_file(&id, content.0).await?;
            Res::Unit
        }
        Req::Stat { id } => Res::Stats(pod.poly_out().stat(&id).await?),
        Req::ReadDir { id } => Res::Entries(pod.poly_out().read_dir(&id).await?),
        Req::ImportArchive { url, dest } => Res::Id(
            pod.poly_out()
                .import_archive(&url, dest.as_deref())
                .await?,
        ),
        Req::RemoveArchive { id } => {
            pod.poly_out().remove_archive(&id).await?;
            Res::Unit
        }

        Req::Match { matcher } => Res::Quads(pod.poly_in().r#match(&matcher).await?),
        Req::Add { quad } => {
            pod.poly_in().add(&quad).await?;
            Res::Unit
        }
        Req::Delete { quad } => {
            pod.poly_in().delete(&quad).await?;
            Res::Unit
        }
        Req::Has { quad } => Res::Bool(pod.poly_in().has(&quad).await?),
        Req::Query { sparql } => Res::QueryResult(pod.triplestore().query(&sparql).await?),
        Req::Update { sparql } => {
            pod.triplestore().update(&sparql).await?;
            Res::Unit
        }

        Req::OpenUrl { link } => {
            pod.poly_nav().open_url(&link).await?;
            Res::Unit
        }
        Req::SetActiveActions { actions } => {
            pod.poly_nav().set_active_actions(&actions).await?;
            Res::Unit
        }
        Req::SetTitle { title } => {
            pod.poly_nav().set_title(&title).await?;
            Res::Unit
        }
        Req::PickFile { mime_type } => {
            Res::File(pod.poly_nav().pick_file(mime_type.as_deref()).await?)
        }

        Req::EndpointSend {
            endpoint_id,
            payload,
            content_type,
            auth_token,
        } => {
            pod.endpoint()
                .send(
                    &endpoint_id,
                    &payload,
                    content_type.as_deref(),
                    auth_token.as_deref(),
                )
                .await?;
            Res::Unit
        }
        Req::EndpointGet {
            endpoint_id,
            content_type,
            auth_token,
        } => Res::Text(
            pod.endpoint()
                .get(&endpoint_id, content_type.as_deref(), auth_token.as_deref())
                .await?,
        ),

        Req::GetRuntime => Res::Text(pod.info().get_runtime().await?),
        Req::GetVersion => Res::Text(pod.info().get_version().await?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{Quad, Term};

    #[test]
    fn test_only_mutations_are_laned() {
        let quad = Quad::new(
            Term::named("http://a"),
            Term::named("http://b"),
            Term::named("http://c"),
        );
        assert_eq!(
            lane(&BridgeRequest::Add { quad: quad.clone() }),
            Some(Lane::Quads)
        );
        assert_eq!(
            lane(&BridgeRequest::Update {
                sparql: "CLEAR DEFAULT".to_string()
            }),
            Some(Lane::Quads)
        );
        assert_eq!(
            lane(&BridgeRequest::RemoveArchive {
                id: "polypod://a".to_string()
            }),
            Some(Lane::Files)
        );
        assert_eq!(lane(&BridgeRequest::Has { quad }), None);
        assert_eq!(
            lane(&BridgeRequest::PickFile { mime_type: None }),
            None
        );
    }
}
