//! Kernel server client.
//!
//! `KernelClient` is the facade over the whole crate: kernel lifecycle
//! over HTTP, code execution over the kernel's message channel, optional
//! notebook recording, and file upload.

mod error;
mod types;

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::channel::WsChannel;
use crate::config::Config;
use crate::execution::{self, Outcome};
use crate::notebook::{Notebook, NotebookRecorder};
use crate::protocol::ExecuteRequest;

pub use error::{ClientError, ClientResult};
pub use types::{ExecuteOptions, KernelCreation};

use types::{KernelInfo, KernelSpecsResponse};

/// Client for a remote Jupyter-style kernel server.
#[derive(Debug, Clone)]
pub struct KernelClient {
    http: reqwest::Client,
    config: Config,
}

impl KernelClient {
    /// Create a new client. The config's token authorizes every call.
    pub fn new(config: Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, config }
    }

    /// List the kernel type names the server supports.
    ///
    /// Idempotent: repeated calls against an unchanged server return the
    /// same set, in sorted order.
    pub async fn kernel_specs(&self) -> ClientResult<Vec<String>> {
        let url = self.config.api_url("api/kernelspecs");
        let response = self
            .http
            .get(&url)
            .header("Authorization", self.config.authorization())
            .send()
            .await?;

        let specs: KernelSpecsResponse = self.handle_response(response, &url).await?;
        let mut names: Vec<String> = specs.kernelspecs.into_keys().collect();
        names.sort();
        debug!(?names, "kernel specs listed");
        Ok(names)
    }

    /// Start a kernel of the given type and provision its companion
    /// notebook document.
    ///
    /// The requested type is validated against the server's supported set
    /// first; an unknown type yields [`KernelCreation::Unsupported`]
    /// without attempting creation. The returned id is the caller's to
    /// manage; a kernel that is never deleted keeps running server-side.
    pub async fn create_kernel(&self, kind: &str) -> ClientResult<KernelCreation> {
        let supported = self.kernel_specs().await?;
        if !supported.iter().any(|name| name == kind) {
            info!(requested = kind, "kernel type not supported by server");
            return Ok(KernelCreation::Unsupported {
                requested: kind.to_string(),
                supported,
            });
        }

        let url = self.config.api_url("api/kernels");
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.config.authorization())
            .json(&json!({ "name": kind }))
            .send()
            .await?;
        let kernel: KernelInfo = self.handle_response(response, &url).await?;
        info!(kernel_id = %kernel.id, "kernel started");

        let url = self
            .config
            .api_url(&format!("api/contents/{}.ipynb", kernel.id));
        let response = self
            .http
            .put(&url)
            .header("Authorization", self.config.authorization())
            .json(&json!({ "type": "notebook", "content": Notebook::empty() }))
            .send()
            .await?;
        self.expect_success(response, &url)?;
        info!(kernel_id = %kernel.id, "notebook created");

        Ok(KernelCreation::Created { id: kernel.id })
    }

    /// Shut down a kernel.
    pub async fn delete_kernel(&self, kernel_id: &str) -> ClientResult<()> {
        let url = self.config.api_url(&format!("api/kernels/{kernel_id}"));
        let response = self
            .http
            .delete(&url)
            .header("Authorization", self.config.authorization())
            .send()
            .await?;
        self.expect_success(response, &url)?;
        info!(kernel_id, "kernel deleted");
        Ok(())
    }

    /// Execute `code` on a kernel and collect its output.
    ///
    /// Returns the byte-exact concatenation of everything the kernel
    /// emitted on its output streams before the execution completed. Three
    /// caveats callers must know:
    ///
    /// - A remote runtime error is NOT an `Err`: the traceback text is
    ///   embedded in the returned string, and inspecting it is the only
    ///   way to tell failure from success.
    /// - A receive window elapsing without a message ends the call with
    ///   whatever was accumulated, possibly the empty string, silently.
    ///   The kernel keeps running remotely; nothing interrupts it.
    /// - `Err` is returned only when the channel cannot be opened or fails
    ///   mid-stream.
    ///
    /// The channel is released exactly once on every path.
    pub async fn execute(
        &self,
        kernel_id: &str,
        code: &str,
        options: ExecuteOptions,
    ) -> ClientResult<String> {
        let request = ExecuteRequest::with_flags(code, options.session.clone(), options.flags);
        let channel =
            WsChannel::connect(&self.config, kernel_id, request.session(), options.timeout)
                .await?;

        let (outcome, output) = execution::run(channel, &request).await;

        match outcome {
            Outcome::Done | Outcome::TimedOut => {
                if options.record {
                    // Recording is a side effect; output that was produced
                    // is never lost because the notebook write failed.
                    if let Err(e) = self
                        .recorder()
                        .record(kernel_id, code, output.outputs)
                        .await
                    {
                        warn!(kernel_id, error = %e, "failed to record cell");
                    }
                }
                Ok(output.text)
            }
            Outcome::Aborted(e) => Err(e.into()),
        }
    }

    /// The notebook recorder bound to this client's credentials.
    pub fn recorder(&self) -> NotebookRecorder<'_> {
        NotebookRecorder {
            http: &self.http,
            config: &self.config,
        }
    }

    /// Upload a local file to the server's contents store.
    pub async fn upload_file(&self, source: &Path, remote_path: &str) -> ClientResult<String> {
        let bytes = tokio::fs::read(source).await?;
        self.put_file(remote_path, &bytes).await
    }

    /// Store `bytes` as a file resource under `remote_path`.
    pub async fn put_file(&self, remote_path: &str, bytes: &[u8]) -> ClientResult<String> {
        let file_name = remote_path.rsplit('/').next().unwrap_or(remote_path);
        let url = self.config.api_url(&format!("api/contents/{file_name}"));
        let response = self
            .http
            .put(&url)
            .header("Authorization", self.config.authorization())
            .json(&json!({
                "content": BASE64.encode(bytes),
                "format": "base64",
                "name": file_name,
                "path": remote_path,
                "type": "file",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus { status, url });
        }
        info!(remote_path, size = bytes.len(), "file uploaded");
        response.text().await.map_err(ClientError::from)
    }

    /// Handle a response and parse its JSON body, or map the status to an
    /// error.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        url: &str,
    ) -> ClientResult<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("{url}: {e}")))
    }

    fn expect_success(&self, response: reqwest::Response, url: &str) -> ClientResult<()> {
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::UnexpectedStatus {
                status,
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = KernelClient::new(Config::new("localhost:8888", "secret"));
        assert_eq!(client.config.host, "localhost:8888");
    }
}
