//! Conversions between the crate's term model and oxigraph's.

use oxigraph::model::{self as ox, GraphName, NamedNode, Subject};

use crate::error::{PodError, Result};
use crate::rdf::{Quad, Term, XSD_STRING};

fn invalid(position: &str, term: &Term) -> PodError {
    PodError::InvalidTerm(format!("{} cannot be a {}", term, position))
}

pub fn named_node(iri: &str) -> Result<NamedNode> {
    NamedNode::new(iri).map_err(|e| PodError::InvalidTerm(format!("<{}>: {}", iri, e)))
}

fn blank_node(id: &str) -> Result<ox::BlankNode> {
    ox::BlankNode::new(id).map_err(|e| PodError::InvalidTerm(format!("_:{}: {}", id, e)))
}

fn literal(value: &str, language: Option<&str>, datatype: &str) -> Result<ox::Literal> {
    match language {
        Some(language) => ox::Literal::new_language_tagged_literal(value, language)
            .map_err(|e| PodError::InvalidTerm(format!("@{}: {}", language, e))),
        None if datatype == XSD_STRING => Ok(ox::Literal::new_simple_literal(value)),
        None => Ok(ox::Literal::new_typed_literal(value, named_node(datatype)?)),
    }
}

pub fn subject(term: &Term) -> Result<Subject> {
    match term {
        Term::NamedNode { value } => Ok(named_node(value)?.into()),
        Term::BlankNode { value } => Ok(blank_node(value)?.into()),
        other => Err(invalid("subject", other)),
    }
}

pub fn predicate(term: &Term) -> Result<NamedNode> {
    match term {
        Term::NamedNode { value } => named_node(value),
        other => Err(invalid("predicate", other)),
    }
}

pub fn object(term: &Term) -> Result<ox::Term> {
    match term {
        Term::NamedNode { value } => Ok(named_node(value)?.into()),
        Term::BlankNode { value } => Ok(blank_node(value)?.into()),
        Term::Literal {
            value,
            language,
            datatype,
        } => Ok(literal(value, language.as_deref(), datatype)?.into()),
        other => Err(invalid("object", other)),
    }
}

pub fn graph_name(term: &Term) -> Result<GraphName> {
    match term {
        Term::DefaultGraph => Ok(GraphName::DefaultGraph),
        Term::NamedNode { value } => Ok(named_node(value)?.into()),
        Term::BlankNode { value } => Ok(blank_node(value)?.into()),
        other => Err(invalid("graph", other)),
    }
}

pub fn quad(quad: &Quad) -> Result<ox::Quad> {
    Ok(ox::Quad::new(
        subject(&quad.subject)?,
        predicate(&quad.predicate)?,
        object(&quad.object)?,
        graph_name(&quad.graph)?,
    ))
}

#[allow(unreachable_patterns)]
pub fn from_term(term: ox::Term) -> Result<Term> {
    match term {
        ox::Term::NamedNode(node) => Ok(Term::named(node.into_string())),
        ox::Term::BlankNode(node) => Ok(Term::blank(node.into_string())),
        ox::Term::Literal(literal) => Ok(Term::Literal {
            value: literal.value().to_string(),
            language: literal.language().map(str::to_string),
            datatype: literal.datatype().as_str().to_string(),
        }),
        other => Err(PodError::Rdf(format!("unsupported term {}", other))),
    }
}

#[allow(unreachable_patterns)]
pub fn from_subject(subject: Subject) -> Result<Term> {
    match subject {
        Subject::NamedNode(node) => Ok(Term::named(node.into_string())),
        Subject::BlankNode(node) => Ok(Term::blank(node.into_string())),
        other => Err(PodError::Rdf(format!("unsupported subject {}", other))),
    }
}

pub fn from_graph_name(graph: GraphName) -> Term {
    match graph {
        GraphName::NamedNode(node) => Term::named(node.into_string()),
        GraphName::BlankNode(node) => Term::blank(node.into_string()),
        GraphName::DefaultGraph => Term::DefaultGraph,
    }
}

pub fn from_quad(quad: ox::Quad) -> Result<Quad> {
    Ok(Quad::in_graph(
        from_subject(quad.subject)?,
        Term::named(quad.predicate.into_string()),
        from_term(quad.object)?,
        from_graph_name(quad.graph_name),
    ))
}

pub fn from_triple(triple: ox::Triple) -> Result<Quad> {
    Ok(Quad::new(
        from_subject(triple.subject)?,
        Term::named(triple.predicate.into_string()),
        from_term(triple.object)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_subject_is_rejected() {
        let quad_with_literal_subject = Quad::new(
            Term::literal("oops"),
            Term::named("http://example.org/p"),
            Term::literal("o"),
        );
        assert!(matches!(
            quad(&quad_with_literal_subject),
            Err(PodError::InvalidTerm(_))
        ));
    }

    #[test]
    fn test_relative_iri_is_rejected() {
        assert!(matches!(named_node("not an iri"), Err(PodError::InvalidTerm(_))));
    }

    #[test]
    fn test_literals_survive_conversion() {
        for term in [
            Term::literal("plain"),
            Term::lang_literal("hallo", "de"),
            Term::typed_literal("5", "http://www.w3.org/2001/XMLSchema#integer"),
        ] {
            assert_eq!(from_term(object(&term).unwrap()).unwrap(), term);
        }
    }
}
