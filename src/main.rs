use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn};

use product_api::app::product::{
    service::ProductService,
    store::{InMemoryProductStore, ProductStore},
};
use product_api::config::{self, StoreBackend};
use product_api::infrastructure::logger::Logger;

#[cfg(feature = "database")]
use product_api::infrastructure::{database::DatabaseManager, product_repository::PgProductStore};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, source) = config::load_config()?;
    Logger::init(&config.logging)?;

    match &source {
        Some(path) => info!("Loaded configuration from {}", path.display()),
        None => info!("No configuration file found, using defaults"),
    }

    #[cfg(feature = "database")]
    let mut database: Option<DatabaseManager> = None;

    let store: Arc<dyn ProductStore> = match config.database.backend {
        #[cfg(feature = "database")]
        StoreBackend::Postgres => {
            let db = DatabaseManager::new(&config.database).await?;
            if config.database.run_migrations {
                db.migrate().await?;
            }
            let store = PgProductStore::new(db.get_pool().clone());
            database = Some(db);
            Arc::new(store)
        }
        #[cfg(not(feature = "database"))]
        StoreBackend::Postgres => unreachable!("rejected by Config::validate"),
        StoreBackend::Memory => {
            warn!("Using in-memory product store, data will not survive a restart");
            Arc::new(InMemoryProductStore::new())
        }
    };

    let app = product_api::build_app(ProductService::new(store), &config.http);

    let listener = TcpListener::bind((config.http.bind_address.as_str(), config.http.port)).await?;
    let addr = listener.local_addr()?;

    info!("🚀 Product API running on http://{}", addr);
    info!("📖 Available endpoints:");
    info!("   GET    /health              - Health check");
    info!("   GET    /product/list?page=N - List products, 10 per page");
    info!("   GET    /product/:id/info    - Get product by id");
    info!("   POST   /product/add         - Create product");
    info!("   PUT    /product/:id/update  - Partially update product");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    #[cfg(feature = "database")]
    {
        if let Some(db) = database {
            db.close().await;
        }
    }

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
