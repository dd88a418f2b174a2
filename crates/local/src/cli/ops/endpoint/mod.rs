use clap::{Args, Subcommand};

pub mod get;
pub mod send;

use crate::cli::op::Op;

crate::command_enum! {
    (Get, get::Get),
    (Send, send::SendPayload),
}

pub type EndpointCommand = Command;

/// Talk to an allow-listed endpoint
#[derive(Args, Debug, Clone)]
pub struct Endpoint {
    #[command(subcommand)]
    pub command: EndpointCommand,
}

#[async_trait::async_trait]
impl Op for Endpoint {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
