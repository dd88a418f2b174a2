use clap::Args;

use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct Rm {
    /// Archive id to remove
    pub id: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Rm {
    type Error = PodOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await?;
        pod.poly_out().remove_archive(&self.id).await?;
        Ok(format!("Removed {}", self.id))
    }
}
