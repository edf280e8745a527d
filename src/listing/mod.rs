//! # Listing
//!
//! List endpoints built on the query engine. Each endpoint is a catalog
//! entry; the service turns a request for it into one builder run and a
//! `{ meta, result }` envelope.

mod endpoint;
mod errors;
mod service;

pub use endpoint::{Catalog, ListEndpoint};
pub use errors::{ListError, ListResult};
pub use service::{ListEnvelope, ListService};
