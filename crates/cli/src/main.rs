//! Maison CLI - session store migrations and operator tools.
//!
//! # Usage
//!
//! ```bash
//! # Create the storefront session table
//! maison-cli migrate storefront
//!
//! # Create the admin session table
//! maison-cli migrate admin
//!
//! # Both
//! maison-cli migrate all
//!
//! # Save the inventory export to a file
//! maison-cli inventory export --format xlsx --output stock.xlsx
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run session store migrations
//! - `inventory export` - Download the inventory as CSV or XLSX

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use maison_core::inventory::ExportFormat;

mod commands;

#[derive(Parser)]
#[command(name = "maison-cli")]
#[command(author, version, about = "Maison operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run session store migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Inventory tools
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run storefront database migrations
    Storefront,
    /// Run admin database migrations
    Admin,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum InventoryAction {
    /// Download the inventory export and save it to a file
    Export {
        /// File format (`csv` or `xlsx`)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Output path (default: the backend's file name in the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace the output file if it exists
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Storefront => commands::migrate::storefront().await?,
            MigrateTarget::Admin => commands::migrate::admin().await?,
            MigrateTarget::All => {
                commands::migrate::storefront().await?;
                commands::migrate::admin().await?;
            }
        },
        Commands::Inventory { action } => match action {
            InventoryAction::Export {
                format,
                output,
                force,
            } => {
                let options = commands::inventory::ExportOptions {
                    format,
                    output,
                    force,
                };
                let path = commands::inventory::export(&options).await?;
                #[allow(clippy::print_stdout)]
                {
                    println!("{}", path.display());
                }
            }
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_export_flags() {
        let cli = Cli::try_parse_from([
            "maison-cli",
            "inventory",
            "export",
            "--format",
            "XLSX",
            "-o",
            "stock.xlsx",
        ])
        .unwrap();
        let Commands::Inventory {
            action:
                InventoryAction::Export {
                    format,
                    output,
                    force,
                },
        } = cli.command
        else {
            panic!("expected inventory export");
        };
        assert_eq!(format, ExportFormat::Xlsx);
        assert_eq!(output, Some(PathBuf::from("stock.xlsx")));
        assert!(!force);

        assert!(Cli::try_parse_from(["maison-cli", "inventory", "export", "-f", "pdf"]).is_err());
    }
}
