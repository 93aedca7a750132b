//! # HTTP Server
//!
//! Combines the search, health and observability routers behind CORS.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::observability::{log_event_with_fields, Event};
use crate::search::SearchService;
use crate::store::QueryStore;

use super::config::HttpServerConfig;
use super::observability_routes::{health_routes, observability_routes};
use super::search_routes::{search_routes, SEARCH_PATH};

/// HTTP server for the search endpoint
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server for a search service
    pub fn with_config<S: QueryStore>(
        config: HttpServerConfig,
        service: Arc<SearchService<S>>,
    ) -> Self {
        let router = Self::build_router(&config, service);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router<S: QueryStore>(
        config: &HttpServerConfig,
        service: Arc<SearchService<S>>,
    ) -> Router {
        let metrics = Arc::clone(service.metrics());

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
            .merge(search_routes(service))
            .nest("/observability", observability_routes(metrics))
            .layer(ServiceBuilder::new().layer(cors))
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(
            Event::Serving,
            &[("addr", &addr.to_string()), ("search", SEARCH_PATH)],
        );
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::FanOutExecutor;
    use crate::geo::GeoDataset;
    use crate::store::MemoryStore;

    fn service() -> Arc<SearchService<MemoryStore>> {
        let executor = FanOutExecutor::new(Arc::new(MemoryStore::default()));
        Arc::new(SearchService::new(executor, Arc::new(GeoDataset::empty())))
    }

    #[test]
    fn test_server_with_custom_port() {
        let config = HttpServerConfig::with_port(8181);
        let server = HttpServer::with_config(config, service());
        assert_eq!(server.socket_addr(), "0.0.0.0:8181");
    }

    #[test]
    fn test_router_builds_with_origins() {
        let config = HttpServerConfig {
            cors_origins: vec!["http://localhost:5173".to_string()],
            ..Default::default()
        };
        let _router = HttpServer::with_config(config, service()).router();
    }
}
