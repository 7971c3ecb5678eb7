//! HTTP entry point that turns signed XML into a KuDE PDF.
//!
//! `POST /generarPdfDesdeXML` (also `/generar-pdf`) takes the document in
//! the `xmlConQR` form field and answers with the PDF inline.

mod config;
mod logger;
mod renderer;
mod routes;

use std::sync::Arc;

pub use config::ServerConfig;
pub use logger::init_logger;
pub use renderer::CommandRenderer;
pub use routes::{AppState, PAYLOAD_FIELD, ServerError, build_app};

use crate::core::KudeError;

/// Bind and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> Result<(), KudeError> {
    let renderer = Arc::new(CommandRenderer::new(
        config.pdf_command.clone(),
        config.pdf_args.clone(),
    ));
    let app = build_app(renderer, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.http_addr)
        .await
        .map_err(|e| KudeError::Config(format!("cannot bind {}: {e}", config.http_addr)))?;
    tracing::info!(
        addr = %config.http_addr,
        renderer = %config.pdf_command,
        "KuDE server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await
        .map_err(|e| KudeError::Network(e.to_string()))
}
