//! ClientBook Server
//!
//! REST API for client records:
//! - Client CRUD under `/v1/clients`
//! - Health at `/health`, OpenAPI at `/q/openapi`, Swagger UI at `/swagger-ui`
//!
//! ## Configuration
//!
//! Read from the first TOML file found (`CLIENTBOOK_CONFIG`, `config.toml`,
//! `clientbook.toml`, `./config/config.toml`, `/etc/clientbook/config.toml`),
//! then overridden by environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CLIENTBOOK_HTTP_PORT` | `3000` | HTTP API port |
//! | `CLIENTBOOK_HTTP_HOST` | `0.0.0.0` | Bind address |
//! | `CLIENTBOOK_CORS_ORIGINS` | `*` | Comma-separated allowed origins |
//! | `CLIENTBOOK_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `CLIENTBOOK_MONGODB_DATABASE` | `clientbook` | MongoDB database name |
//! | `CLIENTBOOK_MONGODB_CREATE_INDEXES` | `true` | Create indexes on startup |
//! | `CLIENTBOOK_STORAGE_BACKEND` | `mongodb` | `mongodb` or `memory` |
//! | `CLIENTBOOK_PAGINATION_DEFAULT_LIMIT` | `10` | Default page size |
//! | `CLIENTBOOK_PAGINATION_MAX_LIMIT` | `100` | Largest page size |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | `text` | `json` for structured output |

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use cb_config::{AppConfig, ConfigLoader, StorageBackend};
use cb_platform::client::{ClientService, ClientsState};
use cb_platform::shared::{initialize_indexes, HealthState, PageLimits};
use cb_platform::{
    build_router, ClientRepository, InMemoryClientRepository, InMemoryUserRepository, MongoClientRepository,
    MongoUserRepository, UserRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    cb_common::logging::init_logging("cb-server");

    let config = ConfigLoader::new().load().context("Failed to load configuration")?;
    info!(
        port = config.http.port,
        backend = ?config.storage.backend,
        "Starting ClientBook Server"
    );

    let version = Some(env!("CARGO_PKG_VERSION").to_string());
    let limits = PageLimits {
        default_limit: config.pagination.default_limit,
        max_limit: config.pagination.max_limit,
    };

    let (clients, users, health_state): (Arc<dyn ClientRepository>, Arc<dyn UserRepository>, HealthState) =
        match config.storage.backend {
            StorageBackend::Mongodb => {
                info!("Connecting to MongoDB...");
                let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri)
                    .await
                    .context("Failed to connect to MongoDB")?;
                let db = mongo_client.database(&config.mongodb.database);
                info!(database = %config.mongodb.database, "Connected to MongoDB");

                if config.mongodb.create_indexes {
                    initialize_indexes(&db).await.context("Failed to create MongoDB indexes")?;
                }

                (
                    Arc::new(MongoClientRepository::new(&db)),
                    Arc::new(MongoUserRepository::new(&db)),
                    HealthState::new(Some(db), version),
                )
            }
            StorageBackend::Memory => {
                warn!("Using in-memory storage; data is lost on shutdown");
                (
                    Arc::new(InMemoryClientRepository::new()),
                    Arc::new(InMemoryUserRepository::new()),
                    HealthState::new(None, version),
                )
            }
        };

    let clients_state = ClientsState::new(ClientService::new(clients, users), limits);

    let app = build_router(clients_state, health_state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    let addr = config.http.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("API server listening on http://{}", addr);
    info!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("ClientBook Server shutdown complete");
    Ok(())
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.http.cors_origins;
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received...");
}
