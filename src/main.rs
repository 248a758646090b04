use decor_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{MongoRepository, RepositoryState},
    storage::{LocalStorage, StorageState},
};
use mongodb::{Client, bson::doc};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point, responsible for initializing configuration,
/// logging, the document store, upload storage, and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading (fail-fast).
    dotenv::dotenv().ok();
    // AppConfig::load() aborts on missing required secrets.
    let config = AppConfig::load();

    // 2. Logging filter: RUST_LOG wins, with sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "decor_portal=debug,tower_http=info,axum=trace".into());

    // 3. Structured logging format selected by environment: pretty output
    // for local debugging, JSON for log aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Document store initialization. The ping makes connection problems
    // surface at startup instead of on the first request.
    let client = Client::with_uri_str(&config.mongo_uri)
        .await
        .expect("FATAL: Invalid MongoDB connection string. Check MONGODB_URI.");
    client
        .database(&config.db_name)
        .run_command(doc! {"ping": 1})
        .await
        .expect("FATAL: Failed to reach MongoDB. Check MONGODB_URI.");

    let repo = Arc::new(MongoRepository::new(&client, &config.db_name)) as RepositoryState;

    // 5. Upload storage beneath the publicly servable directory.
    let storage = Arc::new(LocalStorage::new(config.public_dir.clone())) as StorageState;

    // 6. Unified state assembly.
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        storage,
        config,
    };

    // 7. Router and server startup.
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind listen address. Check BIND_ADDR.");

    tracing::info!("HTTP server bound successfully.");
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated");
}
