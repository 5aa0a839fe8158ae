//! Command-line frontend: run code or upload files against a kernel
//! server.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use nbexec::{Config, ExecuteOptions, KernelClient, KernelCreation};

#[derive(Debug, Parser)]
#[command(name = "nbexec", about = "Execute code on a remote kernel server")]
struct Cli {
    /// Server host and port.
    #[arg(long, env = "JUPYTER_HOST", default_value = "localhost:8888")]
    host: String,

    /// API token.
    #[arg(long, env = "JUPYTER_TOKEN")]
    token: String,

    /// Connect over TLS.
    #[arg(long)]
    https: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the kernel types the server supports.
    Specs,

    /// Run a snippet on a fresh kernel and print its output.
    Run {
        /// The code to execute.
        code: String,

        /// Kernel type to start.
        #[arg(long, default_value = "python3")]
        kernel: String,

        /// Per-receive timeout in seconds.
        #[arg(long, default_value_t = 20)]
        timeout: u64,

        /// Record the execution into the kernel's notebook.
        #[arg(long)]
        record: bool,
    },

    /// Upload a local file to the server.
    Upload {
        /// Local file to upload.
        source: PathBuf,

        /// Remote path; defaults to the source file name.
        #[arg(long)]
        dest: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nbexec=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = if cli.https {
        Config::https(cli.host, cli.token)
    } else {
        Config::new(cli.host, cli.token)
    };
    let client = KernelClient::new(config);

    match cli.command {
        Command::Specs => {
            for name in client.kernel_specs().await.context("listing kernel specs")? {
                println!("{name}");
            }
        }
        Command::Run {
            code,
            kernel,
            timeout,
            record,
        } => {
            let kernel_id = match client
                .create_kernel(&kernel)
                .await
                .context("creating kernel")?
            {
                KernelCreation::Created { id } => id,
                unsupported @ KernelCreation::Unsupported { .. } => bail!("{unsupported}"),
            };

            let options = ExecuteOptions {
                timeout: Duration::from_secs(timeout),
                record,
                ..ExecuteOptions::default()
            };
            let result = client.execute(&kernel_id, &code, options).await;

            // Tear the kernel down before surfacing any execution error.
            if let Err(e) = client.delete_kernel(&kernel_id).await {
                eprintln!("warning: failed to delete kernel {kernel_id}: {e}");
            }

            print!("{}", result.context("executing code")?);
        }
        Command::Upload { source, dest } => {
            let dest = match dest {
                Some(dest) => dest,
                None => source
                    .file_name()
                    .context("source path has no file name")?
                    .to_string_lossy()
                    .into_owned(),
            };
            client
                .upload_file(&source, &dest)
                .await
                .context("uploading file")?;
            println!("uploaded {} -> {dest}", source.display());
        }
    }

    Ok(())
}
