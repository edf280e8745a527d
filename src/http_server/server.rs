//! # HTTP Server
//!
//! Combines the health and list routers behind CORS and request tracing.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::routes::{health_routes, list_routes};
use crate::listing::ListService;
use crate::observability::Event;

/// HTTP server for the list API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server over a list service
    pub fn new(config: HttpServerConfig, service: ListService) -> Self {
        let router = Self::build_router(&config, service);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(config: &HttpServerConfig, service: ListService) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .nest(&config.base_path, list_routes(service))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Address `start` will bind
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.config.bind_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the listener fails
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.bind_addr().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid listen host '{}': {}", self.config.host, e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(event = %Event::ServerListening, %addr, "serving list API");
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::Catalog;
    use crate::store::InMemoryStore;
    use std::sync::Arc;

    fn service() -> ListService {
        ListService::new(Arc::new(InMemoryStore::new()), Catalog::builtin())
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig {
            port: 8080,
            ..Default::default()
        };
        let server = HttpServer::new(config, service());
        assert_eq!(server.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_router_builds_with_origin_list() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:3000".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::new(config, service()).router();
    }
}
