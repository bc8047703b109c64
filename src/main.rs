use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use gym_server::config::Config;
use gym_server::notify::{EmailDispatcher, LogMailer};
use gym_server::routes::create_routes;
use gym_server::state::AppState;
use gym_server::store::{GymStore, PgStore};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gym_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let database_url = config
        .database_url
        .as_deref()
        .expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Successfully connected to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    let store: Arc<dyn GymStore> = Arc::new(PgStore::new(pool));
    let state = AppState::new(store.clone(), &config);

    let dispatcher = EmailDispatcher::new(
        store,
        Arc::new(LogMailer::new(config.mail_from.clone())),
        state.outbox.clone(),
        config.email_dispatch_interval,
    )
    .spawn();

    let app: Router = create_routes(state, &config);

    tracing::info!("Server running at http://{}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    dispatcher.abort();
    tracing::info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
