use std::{sync::Arc, time::Duration};

use analysis::{
    AnalysisError, AnalysisProvider, GenerativeProvider, HeuristicProvider, ProviderKind,
    ServiceProvider,
};
use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "edufinance={level},server={level},engine={level},analysis={level}",
            level = settings.app.level
        ))
        .init();

    let provider: Arc<dyn AnalysisProvider> = match build_provider(&settings.analysis) {
        Ok(provider) => provider,
        Err(err) => {
            tracing::warn!("analysis provider unavailable ({err}), using heuristic analysis");
            Arc::new(HeuristicProvider)
        }
    };
    let default_total_fee = settings.ledger.default_total_fee;

    if let Some(server) = settings.server {
        tasks.spawn(async move {
            tracing::info!("Found server settings...");
            let db = match parse_database(&server.database).await {
                Ok(db) => db,
                Err(err) => {
                    tracing::error!("failed to initialize database: {err}");
                    return;
                }
            };

            let engine = match engine::Engine::builder()
                .database(db)
                .default_total_fee(default_total_fee)
                .build()
                .await
            {
                Ok(engine) => engine,
                Err(err) => {
                    tracing::error!("failed to build engine from database: {err}");
                    return;
                }
            };
            let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
            let addr = format!("{}:{}", bind, server.port);
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(err) => {
                    tracing::error!("failed to bind server listener: {err}");
                    return;
                }
            };
            if let Err(err) = server::run_with_listener(engine, provider, listener).await {
                tracing::error!("server failed: {err}");
            }
        });
    } else {
        tracing::warn!("no [server] section configured, nothing to run");
    }

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

fn build_provider(
    config: &settings::Analysis,
) -> Result<Arc<dyn AnalysisProvider>, AnalysisError> {
    let timeout = Duration::from_secs(config.timeout_secs);

    let provider: Arc<dyn AnalysisProvider> = match config.provider {
        ProviderKind::Service => Arc::new(ServiceProvider::new(
            config.url.clone().unwrap_or_default(),
            timeout,
        )?),
        ProviderKind::Generative => Arc::new(GenerativeProvider::new(
            config
                .url
                .clone()
                .unwrap_or_else(|| analysis::generative::DEFAULT_BASE_URL.to_string()),
            config.api_key.clone().unwrap_or_default(),
            config.model.clone(),
            timeout,
        )?),
        ProviderKind::Heuristic => Arc::new(HeuristicProvider),
    };
    Ok(provider)
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
