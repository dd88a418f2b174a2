use clap::Args;
use common::poly_in::QueryResult;

use super::PodOpError;

/// Run a SPARQL query against the triple store
#[derive(Args, Debug, Clone)]
pub struct Query {
    pub sparql: String,
}

/// Run a SPARQL update against the triple store
#[derive(Args, Debug, Clone)]
pub struct Update {
    pub sparql: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SparqlError {
    #[error(transparent)]
    Pod(#[from] PodOpError),
    #[error("unable to render result: {0}")]
    Render(#[from] serde_json::Error),
}

impl From<common::error::PodError> for SparqlError {
    fn from(err: common::error::PodError) -> Self {
        SparqlError::Pod(err.into())
    }
}

fn render(result: &QueryResult) -> Result<String, serde_json::Error> {
    match result {
        QueryResult::Boolean(value) => Ok(value.to_string()),
        QueryResult::Graph(quads) => Ok(quads
            .iter()
            .map(|quad| quad.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        QueryResult::Solutions(rows) => {
            let rows: Vec<_> = rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|(variable, term)| (variable.clone(), term.to_string()))
                        .collect::<std::collections::BTreeMap<_, _>>()
                })
                .collect();
            serde_json::to_string_pretty(&rows)
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Query {
    type Error = SparqlError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await.map_err(PodOpError::from)?;
        let result = pod.triplestore().query(&self.sparql).await?;
        Ok(render(&result)?)
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Update {
    type Error = SparqlError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let pod = ctx.open_pod().await.map_err(PodOpError::from)?;
        pod.triplestore().update(&self.sparql).await?;
        Ok("Update applied".to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use common::rdf::{Quad, Term};

    use super::*;

    #[test]
    fn test_render_results() {
        assert_eq!(render(&QueryResult::Boolean(true)).unwrap(), "true");

        let quad = Quad::new(
            Term::named("http://a"),
            Term::named("http://p"),
            Term::literal("o"),
        );
        assert_eq!(
            render(&QueryResult::Graph(vec![quad])).unwrap(),
            "<http://a> <http://p> \"o\" ."
        );

        let row = BTreeMap::from([("name".to_string(), Term::literal("Alice"))]);
        let rendered = render(&QueryResult::Solutions(vec![row])).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed[0]["name"], "\"Alice\"");
    }
}
