#![cfg(all(feature = "api", feature = "server"))]

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use kude::api::*;
use kude::core::*;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

const TOKEN: &str = "test-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test-token")
}

async fn list(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "Token inválido"})));
    }
    let estado = q.get("estado").cloned().unwrap_or_else(|| "PENDIENTE".into());
    let page: u32 = q.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    (
        StatusCode::OK,
        Json(json!({
            "documentos": [{
                "id": 1,
                "numeroDocumento": "001-001-0000123",
                "estado": estado,
                "cdc": q.get("cdc").cloned().unwrap_or_default(),
                "lote": {"numeroLote": "L-1", "estado": "ENVIADO"},
                "fechaCreacion": "2024-03-15T10:30:00Z",
                "xmlConQR": "<rDE/>",
            }],
            "paginacion": {
                "total": 21, "page": page, "totalPages": 3,
                "hasNextPage": page < 3, "hasPrevPage": page > 1
            }
        })),
    )
}

async fn create(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({})));
    }
    if body["cliente"]["documentoNumero"] != "800123456" {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "RUC inválido"})));
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": "Documento creado", "id": 99, "items": body["items"].as_array().map(Vec::len)})),
    )
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/generar-documento/listar", get(list))
        .route("/api/generar-documento/crear", post(create));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn invoice(ruc: &str) -> CompleteInvoiceStructure {
    let mut ui = UiInvoice::new(
        UiClient {
            name: "Cliente SA".into(),
            ruc: ruc.into(),
            ..Default::default()
        },
        "contado",
    );
    ui.add_item(UiLineItem {
        id: "1".into(),
        code: "A".into(),
        description: "Arroz".into(),
        unit: "KG".into(),
        quantity: dec!(2),
        unit_price: dec!(7500),
        tax_type: TaxType::Iva5,
    });
    InvoiceTransformer::new()
        .clock(|| {
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        })
        .security_code(|| "123456".into())
        .transform(&ui, &DocumentMetadataOverrides::default())
        .unwrap()
}

#[tokio::test]
async fn lists_documents_with_filters() {
    let base = spawn_backend().await;
    let api = DocumentApi::new(ApiConfig::new(base).with_token(TOKEN)).unwrap();

    let params = ListDocumentsParams {
        status: Some(DocumentStatus::Aprobado),
        cdc: Some("0180".into()),
        page: Some(2),
        limit: Some(10),
        sort_by: Some("fechaCreacion".into()),
        sort_order: Some(SortOrder::Desc),
        ..Default::default()
    };
    let list = api.list_documents(&params).await.unwrap();

    assert_eq!(list.documentos.len(), 1);
    let doc = &list.documentos[0];
    assert_eq!(doc.estado, DocumentStatus::Aprobado);
    assert_eq!(doc.cdc, "0180");
    assert_eq!(doc.lote.numero_lote, "L-1");
    assert_eq!(list.paginacion.page, 2);
    assert!(list.paginacion.has_next_page);
    assert!(list.paginacion.has_prev_page);
}

#[tokio::test]
async fn creates_document() {
    let base = spawn_backend().await;
    let api = DocumentApi::new(ApiConfig::new(base).with_token(TOKEN)).unwrap();

    let ack = api.create_document(&invoice("80012345-6")).await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Documento creado"));
    assert_eq!(ack.data["id"], 99);
    assert_eq!(ack.data["items"], 1);
}

#[tokio::test]
async fn backend_message_is_surfaced() {
    let base = spawn_backend().await;
    let api = DocumentApi::new(ApiConfig::new(base).with_token(TOKEN)).unwrap();

    let err = api.create_document(&invoice("X")).await.unwrap_err();
    match err {
        KudeError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "RUC inválido");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn default_message_when_backend_gives_none() {
    let base = spawn_backend().await;
    let api = DocumentApi::new(ApiConfig::new(base)).unwrap();

    let err = api.create_document(&invoice("80012345-6")).await.unwrap_err();
    assert!(matches!(
        err,
        KudeError::Api { status: 401, ref message } if message == "Error al crear documento"
    ));

    let err = api
        .list_documents(&ListDocumentsParams::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        KudeError::Api { status: 401, ref message } if message == "Token inválido"
    ));
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = DocumentApi::new(ApiConfig::new(format!("http://{addr}/api"))).unwrap();
    let err = api
        .list_documents(&ListDocumentsParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, KudeError::Network(_)));
    assert_eq!(err.user_message(), "No se pudo conectar con el servidor");
}
