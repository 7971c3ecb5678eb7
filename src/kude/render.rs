use async_trait::async_trait;
use serde::Serialize;

use super::layout::KudeLayout;
use crate::core::KudeError;
use crate::sifen::SifenDocument;

/// HTML-to-PDF engine with QR barcode support.
///
/// Implementations receive the assembled layout and return the PDF bytes.
/// Failures should be reported as [`KudeError::Render`].
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render(&self, layout: &KudeLayout) -> Result<Vec<u8>, KudeError>;
}

/// A rendered KuDE ready to be served inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedKude {
    pub file_name: String,
    pub cdc: String,
    #[serde(skip)]
    pub pdf: Vec<u8>,
}

/// Parse a signed document, lay out its KuDE and hand it to `renderer`.
///
/// # Errors
///
/// [`KudeError::MalformedDocument`] when the payload is not well-formed;
/// whatever the renderer returns otherwise.
pub async fn render_kude(
    payload: &str,
    renderer: &dyn PdfRenderer,
) -> Result<RenderedKude, KudeError> {
    let doc = SifenDocument::parse(payload)?;
    let layout = KudeLayout::from_document(&doc);
    let pdf = renderer.render(&layout).await?;
    if pdf.is_empty() {
        return Err(KudeError::Render("renderer returned an empty document".into()));
    }
    tracing::info!(
        cdc = %doc.fields().document.cdc,
        file = %layout.file_name,
        items = doc.fields().items.len(),
        bytes = pdf.len(),
        "rendered KuDE"
    );
    Ok(RenderedKude {
        file_name: layout.file_name,
        cdc: doc.into_fields().document.cdc,
        pdf,
    })
}
