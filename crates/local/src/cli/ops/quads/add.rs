use clap::Args;

use super::{parse_quad, QuadsError};
use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct Add {
    pub subject: String,
    pub predicate: String,
    pub object: String,

    /// Graph term; only the default graph is writable
    #[arg(long)]
    pub graph: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Add {
    type Error = QuadsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let quad = parse_quad(
            &self.subject,
            &self.predicate,
            &self.object,
            self.graph.as_deref(),
        )?;
        let pod = ctx.open_pod().await.map_err(PodOpError::from)?;
        pod.poly_in().add(&quad).await?;
        Ok(format!("Added {}", quad))
    }
}
