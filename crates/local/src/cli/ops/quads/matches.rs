use clap::Args;
use common::rdf::Matcher;

use super::{parse_term, QuadsError};

#[derive(Args, Debug, Clone)]
pub struct Match {
    #[arg(long, short)]
    pub subject: Option<String>,

    #[arg(long, short)]
    pub predicate: Option<String>,

    #[arg(long, short)]
    pub object: Option<String>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Match {
    type Error = QuadsError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut matcher = Matcher::default();
        if let Some(subject) = &self.subject {
            matcher = matcher.subject(parse_term(subject)?);
        }
        if let Some(predicate) = &self.predicate {
            matcher = matcher.predicate(parse_term(predicate)?);
        }
        if let Some(object) = &self.object {
            matcher = matcher.object(parse_term(object)?);
        }

        let pod = ctx.open_pod().await.map_err(crate::cli::ops::PodOpError::from)?;
        let quads = pod.poly_in().r#match(&matcher).await?;
        Ok(quads
            .iter()
            .map(|quad| quad.to_string())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
