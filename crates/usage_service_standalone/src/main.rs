use std::env;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "usage_service", about = "PixelFly usage tracking service")]
struct Args {
    /// Port to listen on; APP_PORT is used when not given
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding usage.db
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();

    let args = Args::parse();
    let port = args
        .port
        .or_else(|| env::var("APP_PORT").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(8080);

    tracing::info!("Starting standalone usage service...");
    if let Err(e) = usage_service::server::run(args.data_dir, port).await {
        tracing::error!("Failed to run usage service: {}", e);
        std::process::exit(1);
    }
}
