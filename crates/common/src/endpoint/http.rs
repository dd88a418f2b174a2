use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use url::Url;

use super::{Endpoint, EndpointInfo, EndpointTable};
use crate::error::{PodError, Result};
use crate::nav::Host;
use crate::session::Session;

/// Endpoint gateway over HTTP, gated by the allow-list and the user.
pub struct HttpEndpoint {
    client: Client,
    table: Arc<EndpointTable>,
    host: Arc<dyn Host>,
    session: Arc<Session>,
}

impl HttpEndpoint {
    pub fn new(table: Arc<EndpointTable>, host: Arc<dyn Host>, session: Arc<Session>) -> Self {
        Self::with_client(Client::new(), table, host, session)
    }

    pub fn with_client(
        client: Client,
        table: Arc<EndpointTable>,
        host: Arc<dyn Host>,
        session: Arc<Session>,
    ) -> Self {
        Self {
            client,
            table,
            host,
            session,
        }
    }

    /// Resolve, confirm and check the endpoint, in that order. Nothing
    /// touches the network before this returns.
    async fn authorize(&self, operation: &str, endpoint_id: &str) -> Result<(&EndpointInfo, Url)> {
        let info = self
            .table
            .get(endpoint_id)
            .ok_or_else(|| PodError::UnknownEndpoint {
                operation: operation.to_string(),
                endpoint: endpoint_id.to_string(),
            })?;

        let message = format!(
            "{} wants to contact the endpoint: {}. \n Proceed?",
            self.session.feature_name(),
            endpoint_id
        );
        if !self.host.confirm(&message).await {
            tracing::warn!(endpoint_id, operation, "user denied endpoint request");
            return Err(PodError::PermissionDenied(format!(
                "user denied request to {}",
                endpoint_id
            )));
        }

        let url = Url::parse(&info.url).map_err(|e| PodError::transport(operation, e))?;
        if url.scheme() != "https" && !info.allow_insecure {
            return Err(PodError::transport(
                operation,
                format!("refusing insecure url {}", url),
            ));
        }
        Ok((info, url))
    }

    fn request(
        &self,
        method: Method,
        url: Url,
        info: &EndpointInfo,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let token = auth_token
            .filter(|token| !token.is_empty())
            .or(Some(info.auth.as_str()).filter(|token| !token.is_empty()));
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Basic {}", STANDARD.encode(token)));
        }
        request
    }

    async fn execute(&self, operation: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(|e| PodError::transport(operation, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PodError::transport(operation, format!("status {}", status)));
        }
        Ok(response)
    }
}

#[async_trait]
impl Endpoint for HttpEndpoint {
    async fn send(
        &self,
        endpoint_id: &str,
        payload: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<()> {
        tracing::debug!(endpoint_id, bytes = payload.len(), "endpoint: send");
        let (info, url) = self.authorize("send", endpoint_id).await?;
        let request = self
            .request(Method::POST, url, info, content_type, auth_token)
            .body(payload.to_string());
        self.execute("send", request).await?;
        tracing::info!(endpoint_id, "endpoint: payload sent");
        Ok(())
    }

    async fn get(
        &self,
        endpoint_id: &str,
        content_type: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<String> {
        tracing::debug!(endpoint_id, "endpoint: get");
        let (info, url) = self.authorize("get", endpoint_id).await?;
        let request = self.request(Method::GET, url, info, content_type, auth_token);
        let body = self
            .execute("get", request)
            .await?
            .text()
            .await
            .map_err(|e| PodError::transport("get", e))?;
        if body.is_empty() {
            return Err(PodError::transport("get", "endpoint returned no payload"));
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;
    use crate::session::Manifest;
    use crate::testkit::ScriptedHost;

    /// Serve one canned HTTP response and hand back the raw request.
    async fn one_shot_server(response: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());
        });
        (format!("http://{}/", addr), rx)
    }

    fn gateway(host: Arc<ScriptedHost>, table: EndpointTable) -> HttpEndpoint {
        HttpEndpoint::with_client(
            Client::builder().no_proxy().build().unwrap(),
            Arc::new(table),
            host,
            Arc::new(Session::new(Manifest::new("Explorer"))),
        )
    }

    fn info(url: &str, allow_insecure: bool) -> EndpointInfo {
        EndpointInfo {
            url: url.to_string(),
            auth: "feature:secret".to_string(),
            allow_insecure,
        }
    }

    #[tokio::test]
    async fn test_unknown_endpoint_fails_without_prompt() {
        let host = Arc::new(ScriptedHost::new());
        let endpoint = gateway(host.clone(), EndpointTable::default());

        let err = endpoint
            .send("unknownEndpoint", "{}", None, None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PodError::UnknownEndpoint {
                operation: "send".to_string(),
                endpoint: "unknownEndpoint".to_string(),
            }
        );
        assert!(host.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_declined_prompt() {
        let host = Arc::new(ScriptedHost::new());
        let table = EndpointTable::default().with_endpoint("report", info("https://example.org", false));
        let endpoint = gateway(host.clone(), table);

        host.answer_next(false);
        assert!(matches!(
            endpoint.get("report", None, None).await,
            Err(PodError::PermissionDenied(_))
        ));
        assert_eq!(
            host.prompts(),
            vec!["Explorer wants to contact the endpoint: report. \n Proceed?".to_string()]
        );
    }

    #[tokio::test]
    async fn test_insecure_url_is_refused() {
        let host = Arc::new(ScriptedHost::new());
        let table =
            EndpointTable::default().with_endpoint("plain", info("http://127.0.0.1:9/", false));
        let endpoint = gateway(host.clone(), table);

        host.answer_next(true);
        let err = endpoint.send("plain", "{}", None, None).await.unwrap_err();
        assert!(matches!(err, PodError::Transport { ref operation, .. } if operation == "send"));
    }

    #[tokio::test]
    async fn test_get_with_default_credentials() {
        let (url, request) = one_shot_server(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;
        let host = Arc::new(ScriptedHost::new());
        let endpoint = gateway(
            host.clone(),
            EndpointTable::default().with_endpoint("demo", info(&url, true)),
        );

        host.answer_next(true);
        let body = endpoint
            .get("demo", Some("application/json"), None)
            .await
            .unwrap();
        assert_eq!(body, "hello");

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get / "));
        assert!(request.contains("content-type: application/json"));
        let expected = format!("authorization: basic {}", STANDARD.encode("feature:secret"));
        assert!(request.contains(&expected.to_lowercase()));
    }

    #[tokio::test]
    async fn test_error_status_is_transport_failure() {
        let (url, _request) = one_shot_server(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;
        let host = Arc::new(ScriptedHost::new());
        let endpoint = gateway(
            host.clone(),
            EndpointTable::default().with_endpoint("demo", info(&url, true)),
        );

        host.answer_next(true);
        let err = endpoint
            .send("demo", "payload", None, Some("caller:token"))
            .await
            .unwrap_err();
        assert!(matches!(err, PodError::Transport { ref cause, .. } if cause.contains("500")));
    }
}
