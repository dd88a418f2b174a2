use clap::{Args, Subcommand};

pub mod cat;
pub mod import;
pub mod ls;
pub mod rm;
pub mod stat;

use crate::cli::op::Op;

crate::command_enum! {
    (Import, import::Import),
    (Ls, ls::Ls),
    (Stat, stat::Stat),
    (Cat, cat::Cat),
    (Rm, rm::Rm),
}

pub type ArchiveCommand = Command;

/// Imported archives and the files inside them
#[derive(Args, Debug, Clone)]
pub struct Archive {
    #[command(subcommand)]
    pub command: ArchiveCommand,
}

#[async_trait::async_trait]
impl Op for Archive {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
