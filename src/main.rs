// ABOUTME: Entry point for the imgdrop CLI application.
// ABOUTME: Parses arguments, wires the registry to its stores, and dispatches commands.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use imgdrop::Registry;
use imgdrop::config::{self, CONFIG_FILENAME, Config, SimulatedConfig, TransportConfig};
use imgdrop::error::Result;
use imgdrop::output::{Output, OutputMode};
use imgdrop::remote::{HttpListingClient, NoListing, RemoteListing};
use imgdrop::storage::{DATABASE_FILENAME, JsonFileStore, SqliteStore};
use imgdrop::types::ImageId;
use imgdrop::upload::{HttpTransport, SimulatedTransport, UploadClient, UploadFile, UploadTransport};
use imgdrop::view;
use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let mut output = Output::new(mode);

    if let Err(e) = run(cli, &mut output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &mut Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init { server, force } => {
            config::init_config(&cwd, server.as_deref(), force)?;
            output.success(&format!("Created {CONFIG_FILENAME}"));
            Ok(())
        }
        Commands::Upload { file, simulate } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            let mut registry = open_registry(&config, simulate).await?;

            let upload = UploadFile::from_path(&file).await?;
            output.progress(&format!("Uploading {}...", upload.name));
            output.start_timer();

            let record = registry.upload(&upload).await?;
            output.success(&record.url);
            Ok(())
        }
        Commands::List { no_refresh } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            let mut registry = open_registry(&config, false).await?;

            if !no_refresh {
                registry.refresh_remote().await;
            }
            output.rows(&view::render_rows(registry.records()));
            Ok(())
        }
        Commands::Select {
            pattern,
            all,
            no_refresh,
        } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            let mut registry = open_registry(&config, false).await?;
            if !no_refresh {
                registry.refresh_remote().await;
            }

            let ids: Vec<String> = registry
                .records()
                .iter()
                .filter(|r| all || pattern.as_deref().is_some_and(|p| r.name.contains(p)))
                .map(|r| r.id.to_string())
                .collect();
            output.list(&ids);
            Ok(())
        }
        Commands::Delete {
            ids,
            yes,
            no_refresh,
        } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            let mut registry = open_registry(&config, false).await?;
            if !no_refresh {
                registry.refresh_remote().await;
            }

            let ids: Vec<ImageId> = ids.into_iter().map(ImageId::new).collect();
            for id in ids.iter().filter(|id| registry.get(id).is_none()) {
                output.warn(&format!("no image with id {id}"));
            }

            let prompt = format!("Are you sure you want to delete {} image(s)?", ids.len());
            if !yes && !confirm(&prompt)? {
                output.progress("Cancelled");
                return Ok(());
            }

            let removed = registry.remove_many(&ids).await;
            output.success(&format!("Deleted {removed} image(s)"));
            Ok(())
        }
        Commands::Clear { yes } => {
            let config = load_config(cli.config.as_deref(), &cwd)?;
            let mut registry = open_registry(&config, false).await?;

            let prompt = "Are you sure you want to delete all images? This action cannot be undone.";
            if !yes && !confirm(prompt)? {
                output.progress("Cancelled");
                return Ok(());
            }

            registry.clear().await;
            output.success("Cleared all images");
            Ok(())
        }
    }
}

/// Load the explicit config file, or discover one in `cwd`, then apply env overrides.
fn load_config(path: Option<&Path>, cwd: &Path) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover_or_default(cwd)?,
    };
    let config = config.with_env_overrides()?;
    config.validate()?;
    Ok(config)
}

/// Build the registry from config and restore persisted state.
async fn open_registry(config: &Config, simulate: bool) -> Result<Registry> {
    let data_dir = &config.storage.data_dir;
    let backup = JsonFileStore::new(data_dir).with_quota(config.storage.backup_quota);
    let catalog = SqliteStore::open_or_unavailable(&data_dir.join(DATABASE_FILENAME));

    let transport_config = if simulate && !config.transport.is_simulated() {
        TransportConfig::Simulated(SimulatedConfig::default())
    } else {
        config.transport.clone()
    };

    let endpoints = &config.endpoints;
    let transport: Arc<dyn UploadTransport>;
    let listing: Arc<dyn RemoteListing>;
    match transport_config {
        TransportConfig::Http => {
            let endpoint = config.endpoint()?;
            transport = Arc::new(HttpTransport::new(endpoint.clone(), &endpoints.upload_path));
            listing = Arc::new(HttpListingClient::new(
                endpoint,
                &endpoints.list_path,
                &endpoints.images_prefix,
            ));
        }
        TransportConfig::Simulated(sim) => {
            transport = Arc::new(SimulatedTransport::new(
                sim.success_rate,
                sim.latency,
                sim.share_host,
            ));
            listing = Arc::new(NoListing);
        }
    }

    let uploader = UploadClient::new(transport, &endpoints.images_prefix);
    let mut registry = Registry::new(Arc::new(backup), Arc::new(catalog), listing, uploader);
    registry.load().await;
    Ok(registry)
}

fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
