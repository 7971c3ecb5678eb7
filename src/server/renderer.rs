use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::core::KudeError;
use crate::kude::{KudeLayout, PdfRenderer};

/// Renders by piping the HTML page through an external command.
///
/// The command reads HTML on stdin and writes PDF on stdout, as
/// `wkhtmltopdf --quiet - -` does.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait]
impl PdfRenderer for CommandRenderer {
    async fn render(&self, layout: &KudeLayout) -> Result<Vec<u8>, KudeError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| KudeError::Render(format!("cannot start {}: {e}", self.program)))?;

        let html = layout.to_html_document();
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| KudeError::Render("stdin not captured".into()))?;
        // Feed stdin while stdout is drained.
        let writer = tokio::spawn(async move {
            let res = stdin.write_all(html.as_bytes()).await;
            drop(stdin);
            res
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| KudeError::Render(e.to_string()))?;
        writer
            .await
            .map_err(|e| KudeError::Render(e.to_string()))?
            .map_err(|e| KudeError::Render(format!("writing HTML: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(program = %self.program, status = %output.status, %stderr, "PDF command failed");
            return Err(KudeError::Render(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }
        Ok(output.stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::qr::normalize;
    use crate::sifen::InvoiceDocumentFields;

    fn layout() -> KudeLayout {
        KudeLayout::build(&InvoiceDocumentFields::default(), normalize(""))
    }

    #[tokio::test]
    async fn pipes_html_through_command() {
        let renderer = CommandRenderer::new("cat", Vec::new());
        let out = renderer.render(&layout()).await.unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("<!DOCTYPE html>"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_render_error() {
        let renderer = CommandRenderer::new("false", Vec::new());
        let err = renderer.render(&layout()).await.unwrap_err();
        assert!(matches!(err, KudeError::Render(_)));
    }

    #[tokio::test]
    async fn missing_program_is_render_error() {
        let renderer = CommandRenderer::new("kude-no-such-renderer", Vec::new());
        let err = renderer.render(&layout()).await.unwrap_err();
        assert!(matches!(err, KudeError::Render(_)));
    }
}
