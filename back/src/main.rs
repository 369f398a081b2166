use std::{net::SocketAddr, path::PathBuf};

use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use kanban_back::store::TaskStore;
use tracing::info;

#[derive(Debug, Parser)]
#[command(about = "Serves the task board API")]
struct Args {
    /// Port to listen on.
    #[arg(long, env = "KANBAN_PORT", default_value_t = 7890)]
    port: u16,

    /// SQLite database to keep tasks in.
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://tasks.db")]
    database_url: String,

    /// PEM certificate; serves over TLS together with `--tls-key`.
    #[arg(long, env = "SSL_CERT")]
    tls_cert: Option<PathBuf>,

    #[arg(long, env = "SSL_KEY")]
    tls_key: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let store = TaskStore::connect(&args.database_url).await?;
    info!(database = %args.database_url, "opened task store");

    let app = kanban_back::app(store);
    let addr = SocketAddr::from(([0; 4], args.port));

    match (args.tls_cert, args.tls_key) {
        (Some(cert), Some(key)) => {
            let config = RustlsConfig::from_pem_file(cert, key).await?;
            info!(%addr, "listening with tls");

            axum_server::bind_rustls(addr, config)
                .serve(app.into_make_service())
                .await?;
        }
        (None, None) => {
            info!(%addr, "listening");

            axum_server::bind(addr)
                .serve(app.into_make_service())
                .await?;
        }
        _ => eyre::bail!("--tls-cert and --tls-key must be given together"),
    }

    Ok(())
}
