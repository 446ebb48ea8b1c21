//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `catalog_core` linkage without the Flutter/FFI runtime.
//! - Run one detail load (and optional toggle) against the configured
//!   catalog service and favorites database.

use catalog_core::{
    CatalogConfig, DetailController, FetchOutcome, HttpCatalogClient, PosterSource,
    SqliteFavoritesStore,
};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "catalog_cli", version, about = "Catalog detail core probe")]
struct Cli {
    /// Directory for rolling log files; logging stays off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,
    /// Log level used together with `--log-dir`.
    #[arg(long, global = true, default_value_t = catalog_core::default_log_level().to_string())]
    log_level: String,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Load one item detail using `CATALOG_*` environment configuration.
    Detail {
        /// Item identifier as addressed by the catalog service.
        id: String,
        /// Toggle the favorite flag after loading.
        #[arg(long)]
        toggle: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = catalog_core::init_logging(cli.log_level.as_str(), log_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }
    match cli.command.unwrap_or(Command::Ping) {
        Command::Ping => {
            println!("catalog_core ping={}", catalog_core::ping());
            println!("catalog_core version={}", catalog_core::core_version());
            ExitCode::SUCCESS
        }
        Command::Detail { id, toggle } => match run_detail(id.as_str(), toggle).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                eprintln!("error: {message}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_detail(id: &str, toggle: bool) -> Result<(), String> {
    let config = CatalogConfig::from_env().map_err(|err| err.to_string())?;
    let client = HttpCatalogClient::new(&config).map_err(|err| err.to_string())?;
    let store = SqliteFavoritesStore::open(&config.db_path).map_err(|err| err.to_string())?;
    let controller = DetailController::new(
        Arc::new(client),
        Arc::new(store),
        config.favorites_namespace.clone(),
    );

    if let FetchOutcome::Failed(failure) = controller.start(id).await {
        return Err(format!("{} ({})", failure, failure.code()));
    }
    if toggle {
        let saved = controller
            .toggle_favorite()
            .await
            .map_err(|err| err.to_string())?;
        println!("favorite toggled saved={saved}");
    }

    let state = controller.snapshot();
    let Some(item) = state.item.as_ref() else {
        return Err("detail view finished without an item".to_string());
    };
    println!("id={}", item.id);
    println!("title={}", item.title);
    println!("rating={}", item.rating_label());
    println!("overview={}", item.overview_or_fallback());
    match item.poster_source(config.image_base_url.as_str()) {
        PosterSource::Remote(url) => println!("poster={url}"),
        PosterSource::Fallback => println!("poster=<fallback>"),
    }
    println!("homepage={}", item.homepage_link().unwrap_or("<none>"));
    let genres = item
        .genres
        .iter()
        .map(|genre| genre.name.as_str())
        .collect::<Vec<_>>();
    println!("genres={}", genres.join(","));
    println!("favorite={}", state.is_favorite());

    controller.retire();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn log_level_defaults_to_core_default() {
        let cli = Cli::parse_from(["catalog_cli", "--log-dir", "/tmp/catalog-logs", "ping"]);

        assert_eq!(cli.log_dir.as_deref(), Some("/tmp/catalog-logs"));
        assert_eq!(cli.log_level, catalog_core::default_log_level());
        assert!(matches!(cli.command, Some(Command::Ping)));
    }

    #[test]
    fn detail_accepts_toggle_and_explicit_level() {
        let cli = Cli::parse_from(["catalog_cli", "detail", "42", "--toggle", "--log-level", "warn"]);

        assert_eq!(cli.log_level, "warn");
        assert!(cli.log_dir.is_none());
        match cli.command {
            Some(Command::Detail { id, toggle }) => {
                assert_eq!(id, "42");
                assert!(toggle);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
