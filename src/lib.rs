//! Async client for remote Jupyter-style kernel servers.
//!
//! Provisions kernels over HTTP, submits code over the kernel's message
//! channel, folds the multiplexed reply stream into one ordered result,
//! and optionally records executions into the kernel's notebook document.
//!
//! ```no_run
//! use nbexec::{Config, ExecuteOptions, KernelClient};
//!
//! # async fn example() -> nbexec::ClientResult<()> {
//! let client = KernelClient::new(Config::new("localhost:8888", "my-token"));
//!
//! if let Some(id) = client.create_kernel("python3").await?.id().map(str::to_owned) {
//!     let output = client
//!         .execute(&id, "print('hello world')", ExecuteOptions::default())
//!         .await?;
//!     assert_eq!(output, "hello world\n");
//!     client.delete_kernel(&id).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod channel;
pub mod client;
pub mod config;
pub mod execution;
pub mod notebook;
pub mod protocol;

pub use channel::{ChannelError, KernelChannel, WsChannel};
pub use client::{ClientError, ClientResult, ExecuteOptions, KernelClient, KernelCreation};
pub use config::{Config, Scheme};
