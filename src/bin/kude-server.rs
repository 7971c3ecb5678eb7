use kude::server::{ServerConfig, init_logger, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    init_logger(&config.log_level, config.log_dir.as_deref());

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kude-server starting");

    if let Err(e) = serve(config).await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }
    Ok(())
}
