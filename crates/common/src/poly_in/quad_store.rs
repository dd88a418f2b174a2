use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use object_store::{Keyspace, Storage};
use oxigraph::io::RdfFormat;
use oxigraph::model::GraphNameRef;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use tokio::sync::Mutex;

use super::convert;
use super::{PolyIn, QueryResult, Triplestore};
use crate::error::{PodError, Result};
use crate::rdf::{Matcher, Quad, Term};

/// Key of the N-Quads snapshot inside the quads keyspace.
const SNAPSHOT_KEY: &str = "0";

fn engine_error(err: impl ToString) -> PodError {
    PodError::Rdf(err.to_string())
}

fn backend_error(err: impl ToString) -> PodError {
    PodError::BackendUnavailable(err.to_string())
}

/// Durable side of a [`QuadStore`].
///
/// `persisted` is the single flush slot: it is held for the whole
/// dump-and-write and records the generation the last write covered.
struct Persistence {
    storage: Storage,
    persisted: Mutex<u64>,
    flushes: AtomicU64,
}

/// Quad store on an in-memory oxigraph engine, optionally snapshotted to
/// [`Storage`] after every mutation.
pub struct QuadStore {
    store: Store,
    /// Bumped after every mutation has been applied to `store`
    generation: AtomicU64,
    persistence: Option<Persistence>,
}

impl QuadStore {
    /// A store that lives only as long as this value.
    pub fn memory() -> Result<Self> {
        Ok(Self {
            store: Store::new().map_err(backend_error)?,
            generation: AtomicU64::new(0),
            persistence: None,
        })
    }

    /// Open the store persisted in `storage`, loading its last snapshot.
    pub async fn open(storage: Storage) -> Result<Self> {
        let store = Store::new().map_err(backend_error)?;
        if let Some(snapshot) = storage.get(Keyspace::Quads, SNAPSHOT_KEY).await? {
            store
                .load_from_reader(RdfFormat::NQuads, snapshot.as_ref())
                .map_err(backend_error)?;
            tracing::info!(bytes = snapshot.len(), "poly_in: loaded quad snapshot");
        }
        Ok(Self {
            store,
            generation: AtomicU64::new(0),
            persistence: Some(Persistence {
                storage,
                persisted: Mutex::new(0),
                flushes: AtomicU64::new(0),
            }),
        })
    }

    /// Record a mutation and wait until a snapshot covering it is durable.
    ///
    /// Writers queue on the flush slot. Whoever holds it dumps the state as
    /// of the latest generation, so later waiters whose mutation was already
    /// covered return without writing again.
    async fn flush(&self) -> Result<()> {
        let mine = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(persistence) = &self.persistence else {
            return Ok(());
        };

        let mut persisted = persistence.persisted.lock().await;
        if *persisted >= mine {
            return Ok(());
        }
        let covered = self.generation.load(Ordering::SeqCst);
        let snapshot = self
            .store
            .dump_to_writer(RdfFormat::NQuads, Vec::new())
            .map_err(backend_error)?;
        persistence
            .storage
            .put(Keyspace::Quads, SNAPSHOT_KEY, Bytes::from(snapshot))
            .await?;
        *persisted = covered;
        persistence.flushes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(generation = covered, "poly_in: flushed quad snapshot");
        Ok(())
    }

    fn default_graph_only(quad: &Quad, operation: &str) -> Result<()> {
        if quad.graph.is_default_graph() {
            return Ok(());
        }
        tracing::warn!(%quad, operation, "rejected quad outside the default graph");
        Err(PodError::InvalidMutation)
    }
}

#[async_trait]
impl PolyIn for QuadStore {
    async fn r#match(&self, matcher: &Matcher) -> Result<Vec<Quad>> {
        tracing::debug!(?matcher, "poly_in: match");
        let subject = matcher.subject.as_ref().map(convert::subject).transpose()?;
        let predicate = matcher
            .predicate
            .as_ref()
            .map(convert::predicate)
            .transpose()?;
        let object = matcher.object.as_ref().map(convert::object).transpose()?;
        let graph = matcher
            .graph
            .as_ref()
            .map(convert::graph_name)
            .transpose()?;

        self.store
            .quads_for_pattern(
                subject.as_ref().map(|s| s.as_ref()),
                predicate.as_ref().map(|p| p.as_ref()),
                object.as_ref().map(|o| o.as_ref()),
                Some(
                    graph
                        .as_ref()
                        .map(|g| g.as_ref())
                        .unwrap_or(GraphNameRef::DefaultGraph),
                ),
            )
            .map(|quad| convert::from_quad(quad.map_err(backend_error)?))
            .collect()
    }

    async fn add(&self, quad: &Quad) -> Result<()> {
        tracing::debug!(%quad, "poly_in: add");
        Self::default_graph_only(quad, "add")?;
        let quad = convert::quad(quad)?;
        if self.store.insert(&quad).map_err(backend_error)? {
            self.flush().await?;
        }
        Ok(())
    }

    async fn delete(&self, quad: &Quad) -> Result<()> {
        tracing::debug!(%quad, "poly_in: delete");
        Self::default_graph_only(quad, "delete")?;
        let quad = convert::quad(quad)?;
        if self.store.remove(&quad).map_err(backend_error)? {
            self.flush().await?;
        }
        Ok(())
    }

    async fn has(&self, quad: &Quad) -> Result<bool> {
        tracing::debug!(%quad, "poly_in: has");
        Self::default_graph_only(quad, "has")?;
        let quad = convert::quad(quad)?;
        self.store.contains(&quad).map_err(backend_error)
    }
}

#[async_trait]
impl Triplestore for QuadStore {
    async fn query(&self, sparql: &str) -> Result<QueryResult> {
        tracing::debug!(sparql, "triplestore: query");
        match self.store.query(sparql).map_err(engine_error)? {
            QueryResults::Boolean(value) => Ok(QueryResult::Boolean(value)),
            QueryResults::Solutions(solutions) => {
                let mut rows = Vec::new();
                for solution in solutions {
                    let solution = solution.map_err(engine_error)?;
                    let row: BTreeMap<String, Term> = solution
                        .iter()
                        .map(|(variable, term)| {
                            Ok((variable.as_str().to_string(), convert::from_term(term.clone())?))
                        })
                        .collect::<Result<_>>()?;
                    rows.push(row);
                }
                Ok(QueryResult::Solutions(rows))
            }
            QueryResults::Graph(triples) => triples
                .map(|triple| convert::from_triple(triple.map_err(engine_error)?))
                .collect::<Result<_>>()
                .map(QueryResult::Graph),
        }
    }

    async fn update(&self, sparql: &str) -> Result<()> {
        tracing::debug!(sparql, "triplestore: update");
        self.store.update(sparql).map_err(engine_error)?;
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn quad(object: &str) -> Quad {
        Quad::new(
            Term::named("http://example.org/alice"),
            Term::named("http://xmlns.com/foaf/0.1/name"),
            Term::literal(object),
        )
    }

    fn in_named_graph(object: &str) -> Quad {
        Quad {
            graph: Term::named("http://example.org/graph"),
            ..quad(object)
        }
    }

    #[tokio::test]
    async fn test_add_has_delete() {
        let store = QuadStore::memory().unwrap();
        let q = quad("Alice");

        store.add(&q).await.unwrap();
        assert!(store.has(&q).await.unwrap());
        store.delete(&q).await.unwrap();
        assert!(!store.has(&q).await.unwrap());
    }

    #[tokio::test]
    async fn test_named_graph_mutations_are_rejected() {
        let store = QuadStore::memory().unwrap();
        store.add(&quad("Alice")).await.unwrap();
        let before = store.r#match(&Matcher::default()).await.unwrap();

        let q = in_named_graph("Mallory");
        assert_eq!(store.add(&q).await, Err(PodError::InvalidMutation));
        assert_eq!(store.delete(&q).await, Err(PodError::InvalidMutation));
        assert_eq!(store.has(&q).await, Err(PodError::InvalidMutation));

        assert_eq!(store.r#match(&Matcher::default()).await.unwrap(), before);
        assert_eq!(store.generation.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_match_with_wildcards() {
        let store = QuadStore::memory().unwrap();
        store.add(&quad("Alice")).await.unwrap();
        store
            .add(&Quad::new(
                Term::named("http://example.org/bob"),
                Term::named("http://xmlns.com/foaf/0.1/name"),
                Term::literal("Bob"),
            ))
            .await
            .unwrap();

        let all = store.r#match(&Matcher::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|q| q.graph.is_default_graph()));

        let alice = store
            .r#match(&Matcher::default().subject(Term::named("http://example.org/alice")))
            .await
            .unwrap();
        assert_eq!(alice, vec![quad("Alice")]);
    }

    #[tokio::test]
    async fn test_update_then_query() {
        let store = QuadStore::memory().unwrap();
        store
            .update(
                "INSERT DATA { <http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" }",
            )
            .await
            .unwrap();

        let result = store
            .query("SELECT ?name WHERE { ?s <http://xmlns.com/foaf/0.1/name> ?name }")
            .await
            .unwrap();
        let QueryResult::Solutions(rows) = result else {
            panic!("expected solutions, got {:?}", result);
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], Term::literal("Alice"));

        assert_eq!(
            store.query("ASK { ?s ?p \"Alice\" }").await.unwrap(),
            QueryResult::Boolean(true)
        );

        let constructed = store
            .query("CONSTRUCT { ?s <http://example.org/label> ?o } WHERE { ?s ?p ?o }")
            .await
            .unwrap();
        assert!(matches!(constructed, QueryResult::Graph(ref quads) if quads.len() == 1));
    }

    #[tokio::test]
    async fn test_bad_sparql_is_an_engine_error() {
        let store = QuadStore::memory().unwrap();
        assert!(matches!(store.query("SELEKT").await, Err(PodError::Rdf(_))));
        assert!(matches!(store.update("DELETE").await, Err(PodError::Rdf(_))));
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let storage = Storage::memory();
        {
            let store = QuadStore::open(storage.clone()).await.unwrap();
            store.add(&quad("Alice")).await.unwrap();
            store.add(&quad("Alicia")).await.unwrap();
            store.delete(&quad("Alicia")).await.unwrap();
        }

        let reopened = QuadStore::open(storage).await.unwrap();
        assert_eq!(
            reopened.r#match(&Matcher::default()).await.unwrap(),
            vec![quad("Alice")]
        );
    }

    #[tokio::test]
    async fn test_waiting_writers_share_one_flush() {
        let storage = Storage::memory();
        let store = Arc::new(QuadStore::open(storage.clone()).await.unwrap());
        let persistence = store.persistence.as_ref().unwrap();

        // occupy the flush slot so both writers queue behind it
        let slot = persistence.persisted.lock().await;
        let first = tokio::spawn({
            let store = store.clone();
            async move { store.add(&quad("one")).await }
        });
        let second = tokio::spawn({
            let store = store.clone();
            async move { store.add(&quad("two")).await }
        });
        while store.generation.load(Ordering::SeqCst) < 2 {
            tokio::task::yield_now().await;
        }
        drop(slot);

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();
        assert_eq!(persistence.flushes.load(Ordering::SeqCst), 1);

        let reopened = QuadStore::open(storage).await.unwrap();
        assert_eq!(reopened.r#match(&Matcher::default()).await.unwrap().len(), 2);
    }
}
