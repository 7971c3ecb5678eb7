use thiserror::Error;

/// Errors that can occur while building, extracting, or rendering documents.
///
/// Missing QR codes and missing individual XML fields are not errors: they
/// show up as `None` or empty values on the extracted data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KudeError {
    /// The invoice has no recipient; a document cannot be built without one.
    #[error("invoice has no client")]
    MissingClient,

    /// The XML payload could not be parsed after envelope isolation.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// The HTML-to-PDF engine failed.
    #[error("render error: {0}")]
    Render(String),

    /// Transport-level failure talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Invalid runtime configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl KudeError {
    /// Short message suitable for showing to an end user.
    ///
    /// Never includes parser internals or backend payloads.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingClient => "Cliente es requerido",
            Self::MalformedDocument(_) => "XML inválido",
            Self::Render(_) => "Error al generar PDF",
            Self::Network(_) => "No se pudo conectar con el servidor",
            Self::Api { .. } => "El servidor rechazó la solicitud",
            Self::Config(_) => "Configuración inválida",
        }
    }
}
