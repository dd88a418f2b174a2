use clap::Args;

use crate::cli::ops::PodOpError;

#[derive(Args, Debug, Clone)]
pub struct Cat {
    /// Archive or entry id (<archive>/<path/in/zip>)
    pub id: String,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Cat {
    type Error = PodOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await?;
        let data = pod.poly_out().read_file(&self.id).await?;

        // Try to convert to UTF-8 string, or show hex if binary
        match std::str::from_utf8(&data) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Ok(format!(
                "Size: {} bytes\nBinary content (hex): {}",
                data.len(),
                hex::encode(&data)
            )),
        }
    }
}
