//! schooldesk - list endpoints for a multi-tenant school backend
//!
//! The core is a query composition engine: request parameters plus a base
//! query (or a stage pipeline) become a filtered, searched, sorted and
//! paginated page with a `{ page, limit, total, totalPage }` summary.

pub mod cli;
pub mod config;
pub mod http_server;
pub mod listing;
pub mod observability;
pub mod query;
pub mod store;
