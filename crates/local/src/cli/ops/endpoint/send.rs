use clap::Args;

use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct SendPayload {
    /// Endpoint name from the allow-list
    pub endpoint_id: String,

    pub payload: String,

    #[arg(long)]
    pub content_type: Option<String>,

    /// Credential sent as basic auth; defaults to the configured one
    #[arg(long)]
    pub auth_token: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for SendPayload {
    type Error = PodOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await?;
        pod.endpoint()
            .send(
                &self.endpoint_id,
                &self.payload,
                self.content_type.as_deref(),
                self.auth_token.as_deref(),
            )
            .await?;
        Ok(format!("Sent {} bytes to {}", self.payload.len(), self.endpoint_id))
    }
}
