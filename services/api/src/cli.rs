use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use krew_leads::config::AppConfig;
use krew_leads::error::AppError;
use krew_leads::export::{ExportOutcome, LeadExporter};
use krew_leads::storage::StorageBackend;

use crate::demo::{run_demo, DemoArgs};
use crate::infra::JsonFileBackend;
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Neighborhood Krew Leads",
    about = "Run and exercise the Neighborhood Krew lead-capture service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Export captured leads as CSV to a file or stdout
    Export(ExportArgs),
    /// Run an end-to-end CLI demo covering the funnel, promo opt-in,
    /// gallery, and export
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured data directory for collection files
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Write the CSV here instead of stdout
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
    /// Override the configured data directory for collection files
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Export(args) => run_export(args),
        Command::Demo(args) => run_demo(args).await,
    }
}

fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(data_dir) = args.data_dir {
        config.storage.data_dir = data_dir;
    }

    let backend: Arc<dyn StorageBackend> =
        Arc::new(JsonFileBackend::new(&config.storage.data_dir)?);
    let exporter = LeadExporter::new(backend);

    match exporter.export().map_err(AppError::from)? {
        ExportOutcome::NoLeads => {
            println!("No leads yet to export");
        }
        ExportOutcome::Document(document) => match args.out {
            Some(path) => {
                std::fs::write(&path, document.content)?;
                println!("Wrote {} to {}", document.file_name, path.display());
            }
            None => {
                println!("{}", document.content);
            }
        },
    }

    Ok(())
}
