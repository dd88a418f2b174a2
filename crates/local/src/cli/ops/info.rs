use clap::Args;

use super::PodOpError;

/// Report what the pod says about its runtime
#[derive(Args, Debug, Clone)]
pub struct Info;

#[async_trait::async_trait]
impl crate::cli::op::Op for Info {
    type Error = PodOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await?;
        let runtime = pod.info().get_runtime().await?;
        let version = pod.info().get_version().await?;
        Ok(format!("{} {}", runtime, version))
    }
}
