//! # HTTP Server Module
//!
//! axum surface over the listing service.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/lists` - Configured list endpoints
//! - `/api/v1/lists/{endpoint}` - `{ meta, result }` for one page

pub mod config;
pub mod errors;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use routes::TENANT_HEADER;
pub use server::HttpServer;
