use clap::Args;

use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Endpoint name from the allow-list
    pub endpoint_id: String,

    #[arg(long)]
    pub content_type: Option<String>,

    /// Credential sent as basic auth; defaults to the configured one
    #[arg(long)]
    pub auth_token: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Get {
    type Error = PodOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await?;
        let body = pod
            .endpoint()
            .get(
                &self.endpoint_id,
                self.content_type.as_deref(),
                self.auth_token.as_deref(),
            )
            .await?;
        Ok(body)
    }
}
