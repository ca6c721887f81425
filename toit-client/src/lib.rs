pub mod auth;
pub mod config;
pub mod devices;
pub mod error;
pub mod server;
pub mod session;
pub mod util;

// === CLI entrypoint ===
pub mod cli;

pub use error::Error;

/// Entrypoint used by `main.rs` to run the full CLI.
pub async fn run_cli() -> anyhow::Result<()> {
    cli::cli().await
}
