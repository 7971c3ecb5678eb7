use serde::{Deserialize, Serialize};

/// Processing state of a document at the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentStatus {
    Pendiente,
    Enviado,
    Aprobado,
    Rechazado,
}

impl DocumentStatus {
    pub const ALL: [Self; 4] = [Self::Pendiente, Self::Enviado, Self::Aprobado, Self::Rechazado];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pendiente => "PENDIENTE",
            Self::Enviado => "ENVIADO",
            Self::Aprobado => "APROBADO",
            Self::Rechazado => "RECHAZADO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Filters for `GET /generar-documento/listar`. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDocumentsParams {
    pub status: Option<DocumentStatus>,
    pub document_number: Option<String>,
    pub cdc: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListDocumentsParams {
    /// Query pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(s) = self.status {
            q.push(("estado", s.as_str().to_string()));
        }
        if let Some(n) = self.document_number.as_deref().filter(|n| !n.is_empty()) {
            q.push(("numeroDocumento", n.to_string()));
        }
        if let Some(c) = self.cdc.as_deref().filter(|c| !c.is_empty()) {
            q.push(("cdc", c.to_string()));
        }
        if let Some(p) = self.page.filter(|p| *p > 0) {
            q.push(("page", p.to_string()));
        }
        if let Some(l) = self.limit.filter(|l| *l > 0) {
            q.push(("limit", l.to_string()));
        }
        if let Some(s) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            q.push(("sortBy", s.to_string()));
        }
        if let Some(o) = self.sort_order {
            q.push(("sortOrder", o.as_str().to_string()));
        }
        q
    }
}

/// Submission batch a document belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Lote {
    pub numero_lote: String,
    pub estado: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
    pub id: serde_json::Value,
    pub numero_documento: String,
    pub estado: DocumentStatus,
    #[serde(default)]
    pub cdc: String,
    #[serde(default)]
    pub lote: Lote,
    pub fecha_creacion: String,
    /// Signed XML including the QR, ready for KuDE rendering.
    #[serde(rename = "xmlConQR", default)]
    pub xml_con_qr: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentList {
    pub documentos: Vec<DocumentItem>,
    #[serde(default)]
    pub paginacion: Pagination,
}

/// Acknowledgment of `POST /generar-documento/crear`.
///
/// The backend's payload varies between versions, so everything except the
/// optional message is kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedDocument {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Error body returned on non-success statuses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
