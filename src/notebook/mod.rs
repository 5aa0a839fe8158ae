//! Notebook recording.
//!
//! Each kernel gets a companion notebook document (`{kernel_id}.ipynb`)
//! provisioned at creation time; when a caller opts in, executed code and
//! its collected outputs are appended to it as one code cell per
//! execution.

mod types;

use serde_json::json;
use tracing::{debug, warn};

use crate::client::{ClientError, ClientResult};
use crate::config::Config;

pub use types::{Cell, CellOutput, Notebook};
pub(crate) use types::NotebookResource;

/// Appends execution records to a kernel's notebook document.
///
/// The append is a plain fetch → modify → write back; there is no
/// compare-and-swap, so two concurrent recorded executions against the
/// same kernel can lose one of the two cells. Callers needing atomicity
/// must serialize their recorded executions per kernel.
pub struct NotebookRecorder<'a> {
    pub(crate) http: &'a reqwest::Client,
    pub(crate) config: &'a Config,
}

impl NotebookRecorder<'_> {
    /// Append one code cell to the kernel's notebook.
    pub async fn record(
        &self,
        kernel_id: &str,
        code: &str,
        outputs: Vec<CellOutput>,
    ) -> ClientResult<()> {
        let mut notebook = self.fetch(kernel_id).await?;
        notebook.push_code_cell(code, outputs);
        self.put(kernel_id, &notebook).await?;
        debug!(kernel_id, cells = notebook.cells.len(), "notebook updated");
        Ok(())
    }

    async fn fetch(&self, kernel_id: &str) -> ClientResult<Notebook> {
        let url = self
            .config
            .api_url(&format!("api/contents/{kernel_id}.ipynb"));
        let response = self
            .http
            .get(&url)
            .header("Authorization", self.config.authorization())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(kernel_id, %status, "failed to fetch notebook");
            return Err(ClientError::UnexpectedStatus { status, url });
        }

        let resource: NotebookResource = response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("notebook resource: {e}")))?;
        Ok(resource.content)
    }

    async fn put(&self, kernel_id: &str, notebook: &Notebook) -> ClientResult<()> {
        let url = self
            .config
            .api_url(&format!("api/contents/{kernel_id}.ipynb"));
        let response = self
            .http
            .put(&url)
            .header("Authorization", self.config.authorization())
            .json(&json!({ "type": "notebook", "content": notebook }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(kernel_id, %status, "failed to update notebook");
            return Err(ClientError::UnexpectedStatus { status, url });
        }
        Ok(())
    }
}
