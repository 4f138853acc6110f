use anyhow::Result;
use chart_analyzer::app::App;
use chart_analyzer::models::Config;
use chart_analyzer::render::render_response;
use chart_analyzer::server::{failure_envelope, start_server};
use chart_analyzer::store::{FileStore, ResultCache};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CACHE_PATH: &str = ".chart-analyzer/last-result.json";

#[derive(Debug, Parser)]
#[command(name = "chart-analyzer")]
#[command(about = "Analyze trading-chart screenshots with a multimodal model")]
struct CliArgs {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Listen address, overrides BIND_ADDR.
        #[arg(long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },
    /// Analyze a local chart image and remember the result.
    Analyze {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long, value_name = "PATH", default_value = DEFAULT_CACHE_PATH)]
        cache: PathBuf,
    },
    /// Show the last remembered result.
    Show {
        #[arg(long, value_name = "PATH", default_value = DEFAULT_CACHE_PATH)]
        cache: PathBuf,
    },
    /// Forget the last remembered result.
    Clear {
        #[arg(long, value_name = "PATH", default_value = DEFAULT_CACHE_PATH)]
        cache: PathBuf,
    },
}

async fn serve(bind: Option<SocketAddr>) -> Result<()> {
    let config = Config::from_env()?;
    let addr = bind.unwrap_or(config.bind_addr);
    let app = App::from_config(&config);
    start_server(app, addr).await
}

async fn analyze(path: PathBuf, cache: PathBuf) -> Result<bool> {
    let config = Config::from_env()?;
    let app = App::from_config(&config);
    let cache = ResultCache::new(FileStore::new(cache));

    let (response, preview) = match app.analyze_file(&path).await {
        Ok((response, payload)) => (response, Some(payload.to_data_url())),
        Err(e) => {
            error!("Analysis error: {}", e);
            (failure_envelope(&e), None)
        }
    };

    let analysis = cache.record(&response, preview.as_deref())?;
    print!("{}", render_response(&response, analysis.as_ref()));
    Ok(response.success)
}

fn show(cache: PathBuf) -> Result<()> {
    let cached = ResultCache::new(FileStore::new(cache)).load()?;
    match &cached.response {
        Some(response) => print!("{}", render_response(response, cached.analysis.as_ref())),
        None => println!("No saved analysis."),
    }
    Ok(())
}

fn clear(cache: PathBuf) -> Result<()> {
    ResultCache::new(FileStore::new(cache)).clear()?;
    println!("Cleared saved analysis.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chart_analyzer=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let outcome = match args.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => {
            info!("Starting chart-analyzer server");
            serve(bind).await.map(|_| true)
        }
        Command::Analyze { path, cache } => analyze(path, cache).await,
        Command::Show { cache } => show(cache).map(|_| true),
        Command::Clear { cache } => clear(cache).map(|_| true),
    };

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
