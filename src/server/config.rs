use std::net::SocketAddr;

use crate::core::KudeError;

/// Runtime settings of the KuDE server.
///
/// | Variable | Default | |
/// |----------|---------|--|
/// | `KUDE_HTTP_ADDR` | `0.0.0.0:8080` | listen address |
/// | `KUDE_LOG_LEVEL` | `info` | tracing filter |
/// | `KUDE_LOG_DIR` | unset | daily log files go here when set |
/// | `KUDE_PDF_COMMAND` | `wkhtmltopdf` | HTML-to-PDF executable |
/// | `KUDE_PDF_ARGS` | `--quiet - -` | its arguments, whitespace separated |
/// | `KUDE_MAX_BODY_BYTES` | `10485760` | request body limit |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_addr: SocketAddr,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub pdf_command: String,
    pub pdf_args: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".into(),
            log_dir: None,
            pdf_command: "wkhtmltopdf".into(),
            pdf_args: split_args("--quiet - -"),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Load from the environment, reading `.env` first when present.
    pub fn from_env() -> Result<Self, KudeError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or empty variables
    /// take their default; unparseable ones are an error.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, KudeError> {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("KUDE_HTTP_ADDR") {
            config.http_addr = addr
                .trim()
                .parse()
                .map_err(|e| KudeError::Config(format!("KUDE_HTTP_ADDR={addr}: {e}")))?;
        }
        if let Some(level) = get("KUDE_LOG_LEVEL") {
            config.log_level = level;
        }
        config.log_dir = get("KUDE_LOG_DIR");
        if let Some(cmd) = get("KUDE_PDF_COMMAND") {
            config.pdf_command = cmd;
        }
        if let Some(args) = get("KUDE_PDF_ARGS") {
            config.pdf_args = split_args(&args);
        }
        if let Some(limit) = get("KUDE_MAX_BODY_BYTES") {
            config.max_body_bytes = limit
                .trim()
                .parse()
                .map_err(|e| KudeError::Config(format!("KUDE_MAX_BODY_BYTES={limit}: {e}")))?;
        }
        Ok(config)
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
