use anyhow::Result;
use order_desk::config::DeskConfig;
use order_desk::server::ServerBuilder;
use tracing_subscriber::EnvFilter;

/// Config file path comes from `ORDER_DESK_CONFIG`; without it the built-in
/// defaults are used. Environment overrides apply in both cases.
fn load_config() -> Result<DeskConfig> {
    let config = match std::env::var("ORDER_DESK_CONFIG") {
        Ok(path) if !path.is_empty() => DeskConfig::from_yaml_file(&path)?,
        _ => DeskConfig::default_config(),
    };
    Ok(config.with_env_overrides())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    let builder = ServerBuilder::new();

    #[cfg(feature = "mysql")]
    let builder = {
        let pool = order_desk::storage::mysql::connect(&config.database).await?;
        tracing::info!("Connected to MySQL");
        builder.with_store(order_desk::storage::MysqlOrderStore::new(pool))
    };

    #[cfg(not(feature = "mysql"))]
    let builder = {
        tracing::warn!("Built without the mysql feature, serving an empty in-memory store");
        builder.with_store(order_desk::storage::InMemoryOrderStore::new())
    };

    builder.with_config(config).serve().await
}
