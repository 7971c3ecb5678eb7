use serde::de::DeserializeOwned;

use super::types::*;
use crate::core::{CompleteInvoiceStructure, KudeError};

const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Where the invoicing backend lives and how to authenticate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:3000/api`.
    pub base_url: String,
    /// Bearer token; requests go out unauthenticated when unset.
    pub token: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// `KUDE_API_URL` and `KUDE_API_TOKEN`.
    pub fn from_env() -> Self {
        let base = std::env::var("KUDE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let mut config = Self::new(base);
        config.token = std::env::var("KUDE_API_TOKEN").ok().filter(|t| !t.is_empty());
        config
    }
}

/// Client for the backend's document endpoints.
///
/// Requests are neither retried nor timed out: a failed call is returned to
/// the caller as is.
#[derive(Debug, Clone)]
pub struct DocumentApi {
    http: reqwest::Client,
    config: ApiConfig,
}

impl DocumentApi {
    pub fn new(config: ApiConfig) -> Result<Self, KudeError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| KudeError::Config(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    fn authorized(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// `POST /generar-documento/crear`.
    pub async fn create_document(
        &self,
        invoice: &CompleteInvoiceStructure,
    ) -> Result<CreatedDocument, KudeError> {
        let req = self
            .http
            .post(self.url("/generar-documento/crear"))
            .json(invoice);
        let ack: CreatedDocument = send(self.authorized(req), "Error al crear documento").await?;
        tracing::info!(items = invoice.items.len(), "document submitted to backend");
        Ok(ack)
    }

    /// `GET /generar-documento/listar`.
    pub async fn list_documents(
        &self,
        params: &ListDocumentsParams,
    ) -> Result<DocumentList, KudeError> {
        let req = self
            .http
            .get(self.url("/generar-documento/listar"))
            .query(&params.query_pairs());
        let list: DocumentList = send(self.authorized(req), "Error al listar documentos").await?;
        tracing::debug!(
            count = list.documentos.len(),
            total = list.paginacion.total,
            "listed documents"
        );
        Ok(list)
    }
}

async fn send<T: DeserializeOwned>(
    req: reqwest::RequestBuilder,
    default_message: &str,
) -> Result<T, KudeError> {
    let resp = req.send().await.map_err(|e| {
        tracing::error!(error = %e, "backend request failed");
        KudeError::Network(e.to_string())
    })?;

    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| KudeError::Network(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_message.to_string());
        tracing::warn!(status = status.as_u16(), %message, "backend rejected request");
        return Err(KudeError::Api {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| KudeError::Network(format!("unexpected response body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_loses_trailing_slash() {
        let config = ApiConfig::new("http://h:1/api/").with_token("t");
        assert_eq!(config.base_url, "http://h:1/api");
        assert_eq!(config.token.as_deref(), Some("t"));
        let api = DocumentApi::new(config).unwrap();
        assert_eq!(
            api.url("/generar-documento/listar"),
            "http://h:1/api/generar-documento/listar"
        );
    }

    #[test]
    fn default_points_at_local_backend() {
        assert_eq!(ApiConfig::default().base_url, "http://localhost:3000/api");
    }
}
