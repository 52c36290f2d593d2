//! Timesheet RS server
//!
//! Composition root: loads configuration, connects to PostgreSQL, bootstraps
//! the schema and seed admin, and serves the API with graceful shutdown.

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ts_api::AppState;
use ts_auth::JwtService;
use ts_core::config::AppConfig;
use ts_db::{schema, Database, DatabaseConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    dotenvy::dotenv().ok();
    let config = AppConfig::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        AppConfig::default()
    });

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.server.host,
        port = config.server.port,
        "Starting Timesheet RS"
    );

    // Connect to database; the router still comes up without one so health
    // checks can report the outage.
    let db_config = DatabaseConfig::with_url(&config.database.url);
    let db = match Database::connect(&db_config).await {
        Ok(db) => {
            info!("Connected to database");
            Some(db)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to database: {}. Running without database.", e);
            None
        }
    };

    let pool = db.as_ref().map(|d| d.pool().clone());
    if let Some(ref pool) = pool {
        schema::bootstrap(pool).await?;
        seed_admin(pool).await?;
    }

    let jwt = Arc::new(JwtService::new(
        config.auth.jwt_secret.as_bytes(),
        config.auth.token_expiration_seconds as i64,
    ));
    let state = AppState::new(pool.clone(), jwt);

    let app = build_router(state, pool);

    let addr = config.server_addr();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ts_server=debug,ts_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Seed the initial admin account when the users table has none.
///
/// Credentials come from ADMIN_USERNAME / ADMIN_PASSWORD; the default
/// password only exists so a dev database is usable out of the box.
async fn seed_admin(pool: &PgPool) -> anyhow::Result<()> {
    let username = std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    let hash = ts_auth::hash_password(&password)
        .map_err(|e| anyhow::anyhow!("failed to hash admin password: {e}"))?;
    schema::ensure_admin(pool, &username, &hash)
        .await
        .map_err(|e| anyhow::anyhow!("failed to seed admin: {e}"))?;
    Ok(())
}

/// Build the application router
fn build_router(state: AppState, pool: Option<PgPool>) -> Router {
    let health_routes = Router::new()
        .route("/health", get(health))
        .with_state(pool);

    ts_api::router(state).merge(health_routes).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    )
}

/// GET /health
async fn health(State(pool): State<Option<PgPool>>) -> Json<serde_json::Value> {
    let db = match pool {
        Some(pool) => match sqlx::query("SELECT 1").execute(&pool).await {
            Ok(_) => "connected",
            Err(_) => "disconnected",
        },
        None => "disconnected",
    };

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "db": db,
    }))
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_app() -> Router {
        let jwt = Arc::new(JwtService::new(b"test-secret-key-at-least-32-bytes", 3600));
        build_router(AppState::new(None, jwt), None)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_api_routes_are_mounted() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/user/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
