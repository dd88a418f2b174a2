/**
 * Failure taxonomy shared by every capability.
 */
pub mod error;
/**
 * The private `polypod://` identifier scheme
 *  for archives and the files inside them.
 */
pub mod uri;
/**
 * Engine-independent RDF terms, quads
 *  and match patterns.
 */
pub mod rdf;
/**
 * Per-session state: the feature manifest
 *  and its current title.
 */
pub mod session;
/**
 * File storage (PolyOut).
 *  Imported archives and the zip entries inside them.
 */
pub mod poly_out;
/**
 * Triple store (PolyIn / Triplestore).
 *  Default-graph quads on an oxigraph engine.
 */
pub mod poly_in;
/**
 * Navigation gateway (PolyNav) and the
 *  host interface it talks to.
 */
pub mod nav;
/**
 * Endpoint gateway: allow-listed, user-confirmed
 *  HTTP calls.
 */
pub mod endpoint;
pub mod info;
/**
 * The Pod facade and its deferred variant.
 */
pub mod pod;
/**
 * Native bridge: a Pod served over a
 *  message channel.
 */
pub mod bridge;
/**
 * Scripted stand-ins for hosts and downloads,
 *  for tests.
 */
pub mod testkit;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::endpoint::{Endpoint, EndpointInfo, EndpointTable};
    pub use crate::error::{PodError, Result};
    pub use crate::info::Info;
    pub use crate::nav::{Action, ExternalFile, Host, PickerEvent, PolyNav};
    pub use crate::poly_in::{PolyIn, QueryResult, Triplestore};
    pub use crate::poly_out::{Entry, PolyOut, Stats};
    pub use crate::pod::{Pod, PodConfig};
    pub use crate::rdf::{Matcher, Quad, Term};
    pub use crate::session::Manifest;
    pub use crate::uri::PolyUri;
    pub use crate::version::build_info;
}
