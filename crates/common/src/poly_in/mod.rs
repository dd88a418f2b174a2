//! Triple store (PolyIn / Triplestore)
//!
//! Features keep their structured data as RDF quads, always in the default
//! graph. [`PolyIn`] is the pattern-level surface, [`Triplestore`] hands
//! SPARQL straight to the engine.

mod convert;
mod quad_store;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rdf::{Matcher, Quad, Term};

pub use quad_store::QuadStore;

#[async_trait]
pub trait PolyIn: Send + Sync {
    /// Quads matching `matcher`. An absent graph means the default graph.
    async fn r#match(&self, matcher: &Matcher) -> Result<Vec<Quad>>;

    async fn add(&self, quad: &Quad) -> Result<()>;

    async fn delete(&self, quad: &Quad) -> Result<()>;

    async fn has(&self, quad: &Quad) -> Result<bool>;
}

#[async_trait]
pub trait Triplestore: Send + Sync {
    async fn query(&self, sparql: &str) -> Result<QueryResult>;

    /// Resolves once the update is durable.
    async fn update(&self, sparql: &str) -> Result<()>;
}

/// An owned SPARQL result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum QueryResult {
    Boolean(bool),
    /// One map of variable name to bound term per solution
    Solutions(Vec<BTreeMap<String, Term>>),
    Graph(Vec<Quad>),
}
