use clap::{Args, Subcommand};
use common::error::PodError;
use common::rdf::{Quad, Term};

pub mod add;
pub mod delete;
pub mod matches;

use crate::cli::op::Op;
use crate::cli::ops::PodOpError;

crate::command_enum! {
    (Match, matches::Match),
    (Add, add::Add),
    (Delete, delete::Delete),
}

pub type QuadsCommand = Command;

/// Pattern-level access to the triple store
#[derive(Args, Debug, Clone)]
pub struct Quads {
    #[command(subcommand)]
    pub command: QuadsCommand,
}

#[async_trait::async_trait]
impl Op for Quads {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuadsError {
    #[error(transparent)]
    Pod(#[from] PodOpError),
    #[error("cannot parse term {0:?}")]
    BadTerm(String),
}

impl From<PodError> for QuadsError {
    fn from(err: PodError) -> Self {
        QuadsError::Pod(err.into())
    }
}

/// Terms as written on the command line, in N-Triples style:
/// `<iri>`, `_:label`, `"text"`, `"text"@lang`, `"text"^^<datatype>`.
/// A bare word is taken as an IRI.
pub fn parse_term(input: &str) -> Result<Term, QuadsError> {
    let bad = || QuadsError::BadTerm(input.to_string());
    let input = input.trim();

    if let Some(label) = input.strip_prefix("_:") {
        if label.is_empty() {
            return Err(bad());
        }
        return Ok(Term::blank(label));
    }
    if let Some(iri) = input.strip_prefix('<') {
        return iri.strip_suffix('>').map(Term::named).ok_or_else(bad);
    }
    if let Some(rest) = input.strip_prefix('"') {
        let close = rest.rfind('"').ok_or_else(bad)?;
        let (value, suffix) = (&rest[..close], &rest[close + 1..]);
        return match suffix {
            "" => Ok(Term::literal(value)),
            _ if suffix.starts_with('@') && suffix.len() > 1 => {
                Ok(Term::lang_literal(value, &suffix[1..]))
            }
            _ => match suffix.strip_prefix("^^<").and_then(|s| s.strip_suffix('>')) {
                Some(datatype) => Ok(Term::typed_literal(value, datatype)),
                None => Err(bad()),
            },
        };
    }
    if input.is_empty() || input.contains(char::is_whitespace) {
        return Err(bad());
    }
    Ok(Term::named(input))
}

/// Assemble a quad from command-line terms; no graph means the default graph.
pub fn parse_quad(
    subject: &str,
    predicate: &str,
    object: &str,
    graph: Option<&str>,
) -> Result<Quad, QuadsError> {
    let graph = match graph {
        Some(graph) => parse_term(graph)?,
        None => Term::DefaultGraph,
    };
    Ok(Quad::in_graph(
        parse_term(subject)?,
        parse_term(predicate)?,
        parse_term(object)?,
        graph,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_terms() {
        assert_eq!(
            parse_term("<http://example.org/a>").unwrap(),
            Term::named("http://example.org/a")
        );
        assert_eq!(
            parse_term("http://example.org/a").unwrap(),
            Term::named("http://example.org/a")
        );
        assert_eq!(parse_term("_:b0").unwrap(), Term::blank("b0"));
        assert_eq!(parse_term("\"hi\"").unwrap(), Term::literal("hi"));
        assert_eq!(
            parse_term("\"hallo\"@de").unwrap(),
            Term::lang_literal("hallo", "de")
        );
        assert_eq!(
            parse_term("\"5\"^^<http://www.w3.org/2001/XMLSchema#integer>").unwrap(),
            Term::typed_literal("5", "http://www.w3.org/2001/XMLSchema#integer")
        );
    }

    #[test]
    fn test_reject_malformed_terms() {
        for input in ["", "<unterminated", "\"open", "\"x\"@", "\"x\"^^dt", "two words", "_:"] {
            assert!(parse_term(input).is_err(), "{:?} should not parse", input);
        }
    }

    #[test]
    fn test_parse_quad_defaults_to_default_graph() {
        let quad = parse_quad("<http://a>", "<http://p>", "\"o\"", None).unwrap();
        assert!(quad.graph.is_default_graph());
        let quad = parse_quad("<http://a>", "<http://p>", "\"o\"", Some("<http://g>")).unwrap();
        assert_eq!(quad.graph, Term::named("http://g"));
    }
}
