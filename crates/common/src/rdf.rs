//! Engine-independent RDF data model.
//!
//! Terms are tagged by `termType` the way RDF/JS does it, so quads survive a
//! JSON round trip across the bridge without the engine's own types.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "termType")]
pub enum Term {
    NamedNode {
        value: String,
    },
    BlankNode {
        value: String,
    },
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        datatype: String,
    },
    DefaultGraph,
}

impl Term {
    pub fn named(iri: impl Into<String>) -> Self {
        Term::NamedNode { value: iri.into() }
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Term::BlankNode { value: id.into() }
    }

    /// A plain `xsd:string` literal
    pub fn literal(value: impl Into<String>) -> Self {
        Term::typed_literal(value, XSD_STRING)
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            language: None,
            datatype: datatype.into(),
        }
    }

    pub fn lang_literal(value: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            value: value.into(),
            language: Some(language.into()),
            datatype: RDF_LANG_STRING.to_string(),
        }
    }

    pub fn is_default_graph(&self) -> bool {
        matches!(self, Term::DefaultGraph)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::NamedNode { value } => write!(f, "<{}>", value),
            Term::BlankNode { value } => write!(f, "_:{}", value),
            Term::Literal {
                value,
                language: Some(language),
                ..
            } => write!(f, "{:?}@{}", value, language),
            Term::Literal {
                value, datatype, ..
            } if datatype == XSD_STRING => write!(f, "{:?}", value),
            Term::Literal {
                value, datatype, ..
            } => write!(f, "{:?}^^<{}>", value, datatype),
            Term::DefaultGraph => Ok(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quad {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub graph: Term,
}

impl Quad {
    /// A quad in the default graph
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self::in_graph(subject, predicate, object, Term::DefaultGraph)
    }

    pub fn in_graph(subject: Term, predicate: Term, object: Term, graph: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
            graph,
        }
    }
}

impl fmt::Display for Quad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if !self.graph.is_default_graph() {
            write!(f, " {}", self.graph)?;
        }
        f.write_str(" .")
    }
}

/// Quad pattern; `None` fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<Term>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicate: Option<Term>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<Term>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<Term>,
}

impl Matcher {
    pub fn subject(mut self, term: Term) -> Self {
        self.subject = Some(term);
        self
    }

    pub fn predicate(mut self, term: Term) -> Self {
        self.predicate = Some(term);
        self
    }

    pub fn object(mut self, term: Term) -> Self {
        self.object = Some(term);
        self
    }
}
