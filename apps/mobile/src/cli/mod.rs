//! # Command-Line Shell
//!
//! `mariam-pos`: a terminal front end over the same ledger, checkout and
//! settings the mobile UI uses.
//!
//! ```text
//! mariam-pos show                           list the cart
//! mariam-pos add 12 "Cuaderno" 35 -q 2      add a line by hand
//! mariam-pos search cuaderno                search the catalog
//! mariam-pos scan 7501234567890             look up a barcode, add one unit
//! mariam-pos pick 7501234567890 -p 2        add a presentation pack
//! mariam-pos add-bulk 7501234567890 37,50   add bulk goods by price
//! mariam-pos set-qty 12 5                   change a quantity (<= 0 removes)
//! mariam-pos remove 12                      remove a line
//! mariam-pos clear                          empty the cart
//! mariam-pos send "Ana"                     send the cart to the cashier
//! mariam-pos pending list | delete <id>     manage pending sales
//! mariam-pos config show | set-api-url <u>  view / change settings
//! ```

pub mod render;
pub mod run;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mariam_core::SaleType;

pub use run::run;

/// Mariam POS mobile client shell
#[derive(Debug, Parser)]
#[command(name = "mariam-pos", version, about = "Mariam POS mobile client", long_about = None)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true, env = "MARIAM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local store path (overrides the config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Backend URL for this run only (overrides the saved setting)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the cart
    Show,

    /// Add a line by hand
    Add(AddArgs),

    /// Search the catalog by name or code
    Search(SearchArgs),

    /// Look a barcode up and add one unit
    Scan(ScanArgs),

    /// Look a barcode up and add the chosen presentation's pack quantity
    Pick(ScanArgs),

    /// Look a barcode up and add bulk goods for an entered price
    AddBulk(AddBulkArgs),

    /// Set the quantity of a line (zero or less removes it)
    SetQty(SetQtyArgs),

    /// Remove a line
    Remove(LineArgs),

    /// Empty the cart
    Clear,

    /// Send the cart to the cashier as a pending sale
    Send(SendArgs),

    /// Pending sales at the cashier
    #[command(subcommand)]
    Pending(PendingCommands),

    /// Client settings
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub product_id: String,
    pub name: String,
    pub unit_price: f64,

    #[arg(short, long, default_value_t = 1.0)]
    pub quantity: f64,

    /// Overrides the unit price for totals
    #[arg(long)]
    pub base_price: Option<f64>,

    #[arg(long, requires = "presentation_name")]
    pub presentation_id: Option<String>,

    #[arg(long, requires = "presentation_id")]
    pub presentation_name: Option<String>,

    /// Pieza or Granel
    #[arg(long)]
    pub sale_type: Option<SaleType>,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    pub text: String,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    pub code: String,

    /// Presentation id, required when the product has several
    #[arg(short, long)]
    pub presentation: Option<String>,
}

#[derive(Debug, Args)]
pub struct AddBulkArgs {
    pub code: String,

    /// Total price to sell, e.g. "37.50" or "37,50"
    pub amount: String,

    #[arg(short, long)]
    pub presentation: Option<String>,
}

#[derive(Debug, Args)]
pub struct LineArgs {
    pub product_id: String,

    #[arg(short, long)]
    pub presentation: Option<String>,
}

#[derive(Debug, Args)]
pub struct SetQtyArgs {
    pub product_id: String,

    #[arg(allow_negative_numbers = true)]
    pub quantity: f64,

    #[arg(short, long)]
    pub presentation: Option<String>,
}

#[derive(Debug, Args)]
pub struct SendArgs {
    pub client_name: String,
}

#[derive(Debug, Subcommand)]
pub enum PendingCommands {
    /// List pending sales
    List,
    /// Delete a pending sale
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Save the backend URL
    SetApiUrl { url: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_with_presentation() {
        let cli = Cli::try_parse_from([
            "mariam-pos",
            "add",
            "40",
            "Azúcar",
            "24",
            "-q",
            "1.5",
            "--presentation-id",
            "7",
            "--presentation-name",
            "Kilo",
            "--sale-type",
            "granel",
        ])
        .unwrap();

        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.quantity, 1.5);
                assert_eq!(args.presentation_id.as_deref(), Some("7"));
                assert_eq!(args.sale_type, Some(SaleType::Granel));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_negative_quantity_and_globals() {
        let cli =
            Cli::try_parse_from(["mariam-pos", "set-qty", "12", "-3", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::SetQty(SetQtyArgs { quantity, .. }) if quantity == -3.0));

        let cli = Cli::try_parse_from(["mariam-pos", "pending", "delete", "9"]).unwrap();
        assert!(matches!(cli.command, Commands::Pending(PendingCommands::Delete { id }) if id == "9"));
    }

    #[test]
    fn test_parse_search_scan_and_pick() {
        let cli = Cli::try_parse_from(["mariam-pos", "search", "cuaderno"]).unwrap();
        assert!(matches!(cli.command, Commands::Search(SearchArgs { text }) if text == "cuaderno"));

        let cli = Cli::try_parse_from(["mariam-pos", "scan", "7501", "-p", "2"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Scan(ScanArgs { code, presentation: Some(p) }) if code == "7501" && p == "2"
        ));

        let cli = Cli::try_parse_from(["mariam-pos", "pick", "7501"]).unwrap();
        assert!(matches!(cli.command, Commands::Pick(ScanArgs { presentation: None, .. })));
    }
}
