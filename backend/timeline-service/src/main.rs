use actix_web::{web, App, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timeline_service::db::{PgCandidateStore, PgFollowStore, PgInteractionStore, PgMediaStore};
use timeline_service::handlers::{self, FeedHandlerState};
use timeline_service::middleware::JwtAuthMiddleware;
use timeline_service::{metrics, Config, FeedService};

struct HealthState {
    db_pool: sqlx::PgPool,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match sqlx::query("SELECT 1").execute(&state.db_pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "timeline-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "timeline-service"
        })),
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = terminate.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    info!("Starting timeline-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);

    // Initialize database pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    // Verify database connection
    sqlx::query("SELECT 1")
        .execute(&db_pool)
        .await
        .context("Failed to verify database connection")?;
    info!("Database pool created and verified");

    // Run database migrations
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    let feed_service = Arc::new(FeedService::new(
        Arc::new(PgCandidateStore::new(db_pool.clone())),
        Arc::new(PgFollowStore::new(db_pool.clone())),
        Arc::new(PgInteractionStore::new(db_pool.clone())),
        Arc::new(PgMediaStore::new(db_pool.clone())),
        config.feed.clone(),
    ));

    // Root token; every in-flight request holds a child and aborts on cancel.
    let shutdown = CancellationToken::new();

    let feed_state = web::Data::new(FeedHandlerState {
        feed: feed_service,
        shutdown: shutdown.clone(),
    });
    let health_state = web::Data::new(HealthState {
        db_pool: db_pool.clone(),
    });

    let bind_addr = format!("{}:{}", config.app.host, config.app.port);
    let jwt_secret = config.auth.jwt_secret.clone();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(feed_state.clone())
            .app_data(health_state.clone())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(metrics::serve_metrics))
            .route("/health", web::get().to(health_summary))
            .service(
                web::scope("/api/v1")
                    .wrap(JwtAuthMiddleware::new(&jwt_secret))
                    .service(web::scope("/feed").route("", web::get().to(handlers::get_feed))),
            )
    })
    .bind(&bind_addr)
    .context("Failed to bind HTTP server")?
    .run();

    info!("HTTP server listening on http://{}", bind_addr);

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    shutdown_signal().await;
    info!("Shutdown signal received");

    // Cancel in-flight feed requests, then drain the HTTP workers.
    shutdown.cancel();
    server_handle.stop(true).await;
    server_task
        .await
        .context("HTTP server task panicked")?
        .context("HTTP server error")?;

    info!("timeline-service shutting down");
    Ok(())
}
