//! yomu server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::middleware;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yomu_api::{AppState, actor_middleware, router as api_router};
use yomu_common::Config;
use yomu_core::{
    CommentService, DbCatalog, FavoriteService, NotificationService, ReportService,
    SubmissionService, SuspensionService, UserService,
};
use yomu_db::repositories::{
    CatalogRepository, CommentRepository, FavoriteRepository, NotificationRepository,
    PendingContentRepository, ReportRepository, SuspensionRepository, UserRepository,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "yomu=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting yomu server...");

    dotenvy::dotenv().ok();
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = Arc::new(yomu_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    yomu_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let user_repo = UserRepository::new(db.clone());
    let suspension_repo = SuspensionRepository::new(db.clone());
    let comment_repo = CommentRepository::new(db.clone());
    let report_repo = ReportRepository::new(db.clone());
    let pending_repo = PendingContentRepository::new(db.clone());
    let notification_repo = NotificationRepository::new(db.clone());
    let favorite_repo = FavoriteRepository::new(db.clone());
    let catalog_repo = CatalogRepository::new(db.clone());

    // Services
    let notification_service = NotificationService::new(
        notification_repo,
        user_repo.clone(),
        &config.moderation,
    );
    let suspension_service = SuspensionService::new(
        suspension_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let catalog = DbCatalog::new(catalog_repo).into_shared();
    let submission_service = SubmissionService::new(
        pending_repo.clone(),
        user_repo.clone(),
        favorite_repo.clone(),
        catalog,
        notification_service.clone(),
    );
    let comment_service = CommentService::new(
        comment_repo.clone(),
        user_repo.clone(),
        suspension_service.clone(),
        notification_service.clone(),
    );
    let report_service = ReportService::new(
        report_repo.clone(),
        comment_repo.clone(),
        user_repo.clone(),
        notification_service.clone(),
    );
    let user_service = UserService::new(
        user_repo.clone(),
        suspension_repo,
        comment_repo,
        report_repo,
        pending_repo,
        favorite_repo.clone(),
        notification_service.clone(),
    );
    let favorite_service = FavoriteService::new(favorite_repo, user_repo);

    let state = AppState {
        user_service,
        suspension_service,
        submission_service,
        comment_service,
        report_service,
        notification_service,
        favorite_service,
    };

    let app = api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            actor_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
