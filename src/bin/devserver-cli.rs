use std::path::PathBuf;

use clap::{Parser, Subcommand};

use frontend_devserver::config::DEFAULT_MODE;
use frontend_devserver::lifecycle::startup::{prepare, StartupOptions};
use frontend_devserver::view::{HealthView, HttpHealthProbe};

#[derive(Parser)]
#[command(name = "devserver-cli")]
#[command(about = "Inspect the frontend dev server and its backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one health check and print what the page would show
    Health {
        /// Dev server or backend origin
        #[arg(short, long, default_value = "http://localhost:5173")]
        url: String,

        /// Health endpoint path
        #[arg(short, long, default_value = "/health")]
        path: String,

        /// Skip TLS certificate verification
        #[arg(long)]
        insecure: bool,
    },
    /// Print the backend URL a request path would be forwarded to
    Resolve {
        /// Request path, optionally with a query string
        path: String,

        #[arg(short, long)]
        config: Option<PathBuf>,

        #[arg(short, long, default_value = DEFAULT_MODE)]
        mode: String,

        #[arg(long, default_value = ".")]
        env_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Health { url, path, insecure } => {
            let client = reqwest::Client::builder()
                .danger_accept_invalid_certs(insecure)
                .build()?;
            let target = format!("{}{}", url.trim_end_matches('/'), path);

            let mut view = HealthView::mount(HttpHealthProbe::new(client, target));
            println!("{}", view.settled().await);
        }
        Commands::Resolve { path, config, mode, env_dir } => {
            let prepared = prepare(&StartupOptions {
                config_path: config,
                mode,
                env_dir,
                ..StartupOptions::default()
            })?;

            match prepared.routes.resolve(&path) {
                Some(target) => println!("{}", target),
                None => println!("no proxy rule matches {}", path),
            }
        }
    }

    Ok(())
}
