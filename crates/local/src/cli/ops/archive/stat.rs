use clap::Args;

use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct Stat {
    /// Archive or entry id; omit for the storage root
    #[arg(default_value = "")]
    pub id: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Stat {
    type Error = PodOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await?;
        let stats = pod.poly_out().stat(&self.id).await?;

        let time = stats
            .time
            .map(|time| time.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        Ok(format!(
            "Id: {}\nName: {}\nSize: {} bytes\nModified: {}\nDirectory: {}",
            stats.id, stats.name, stats.size, time, stats.directory
        ))
    }
}
