use clap::Args;

use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct Ls {
    /// Archive to list; omit to list all archives
    #[arg(default_value = "")]
    pub id: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Ls {
    type Error = PodOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await?;
        let entries = pod.poly_out().read_dir(&self.id).await?;

        if entries.is_empty() {
            return Ok("(empty)".to_string());
        }
        Ok(entries
            .iter()
            .map(|entry| {
                if self.id.is_empty() {
                    entry.id.clone()
                } else {
                    format!("{}\t{}", entry.path, entry.id)
                }
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
