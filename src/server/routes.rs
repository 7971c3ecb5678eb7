use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Form, Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::core::KudeError;
use crate::kude::{PdfRenderer, RenderedKude, render_kude};

/// Form field carrying the signed XML.
pub const PAYLOAD_FIELD: &str = "xmlConQR";

const MISSING_PAYLOAD: &str = "Error: Datos requeridos no recibidos";
const PAYLOAD_TOO_LARGE: &str = "Error: Documento demasiado grande";

#[derive(Clone)]
pub struct AppState {
    renderer: Arc<dyn PdfRenderer>,
}

impl AppState {
    pub fn new(renderer: Arc<dyn PdfRenderer>) -> Self {
        Self { renderer }
    }
}

/// All routes with CORS, request tracing and the body limit applied.
pub fn build_app(renderer: Arc<dyn PdfRenderer>, max_body_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(health))
        .route("/generarPdfDesdeXML", any(generate_pdf))
        .route("/generar-pdf", any(generate_pdf))
        .with_state(AppState::new(renderer))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn generate_pdf(State(state): State<AppState>, req: Request) -> Response {
    match *req.method() {
        Method::POST => {}
        Method::OPTIONS => return StatusCode::OK.into_response(),
        _ => return (StatusCode::BAD_REQUEST, MISSING_PAYLOAD).into_response(),
    }

    let payload = match read_payload(req).await {
        Ok(payload) => payload,
        Err(StatusCode::PAYLOAD_TOO_LARGE) => {
            tracing::warn!("PDF request over the body limit");
            return (StatusCode::PAYLOAD_TOO_LARGE, PAYLOAD_TOO_LARGE).into_response();
        }
        Err(status) => {
            tracing::debug!(%status, "PDF request without {PAYLOAD_FIELD}");
            return (StatusCode::BAD_REQUEST, MISSING_PAYLOAD).into_response();
        }
    };

    match render_kude(&payload, state.renderer.as_ref()).await {
        Ok(kude) => pdf_response(kude),
        Err(e) => ServerError(e).into_response(),
    }
}

/// `xmlConQR` from a urlencoded or multipart form.
///
/// Fails with the extractor's status on a rejected body, or 400 when the
/// field is absent or blank.
async fn read_payload(req: Request) -> Result<String, StatusCode> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let value = if is_multipart {
        let mut form = Multipart::from_request(req, &())
            .await
            .map_err(|r| r.status())?;
        let mut found = None;
        while let Some(field) = form.next_field().await.map_err(|e| e.status())? {
            if field.name() == Some(PAYLOAD_FIELD) {
                found = Some(field.text().await.map_err(|e| e.status())?);
                break;
            }
        }
        found.ok_or(StatusCode::BAD_REQUEST)?
    } else {
        let Form(mut fields) = Form::<HashMap<String, String>>::from_request(req, &())
            .await
            .map_err(|r| r.status())?;
        fields.remove(PAYLOAD_FIELD).ok_or(StatusCode::BAD_REQUEST)?
    };

    if value.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(value)
}

fn pdf_response(kude: RenderedKude) -> Response {
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{}\"", kude.file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        kude.pdf,
    )
        .into_response()
}

/// Maps failures to a status and a short plain-text message.
pub struct ServerError(pub KudeError);

impl From<KudeError> for ServerError {
    fn from(e: KudeError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            KudeError::MissingClient => StatusCode::BAD_REQUEST,
            KudeError::MalformedDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            KudeError::Render(_) | KudeError::Network(_) | KudeError::Api { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        (status, format!("Error: {}", self.0.user_message())).into_response()
    }
}
