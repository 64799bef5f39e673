//! Command execution.

use serde::Serialize;
use tracing::debug;

use mariam_core::catalog::{bulk_candidate, piece_candidate, scan_candidate};
use mariam_core::validation::parse_entered_amount;
use mariam_core::{NewCartLine, Presentation, Product};

use super::{render, AddArgs, Cli, Commands, ConfigCommands, PendingCommands};
use crate::api::PendingSaleApi;
use crate::checkout::send_to_cashier;
use crate::error::{ApiError, ApiResult};
use crate::state::ClientConfig;
use crate::App;

/// Runs one CLI invocation end to end.
pub async fn run(cli: Cli) -> ApiResult<()> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db.clone() {
        config.database_path = Some(db);
    }
    if let Some(url) = cli.api_url.clone() {
        config.api_url = Some(url);
        config.validate()?;
    }

    let app = App::init(config).await?;
    app.ledger.ready().await;

    let result = execute(&app, cli.command, cli.json).await;
    app.shutdown().await;
    result
}

async fn execute(app: &App, command: Commands, json: bool) -> ApiResult<()> {
    debug!(?command, "Executing command");

    match command {
        Commands::Show => show_cart(app, json),

        Commands::Add(args) => {
            app.ledger.add_line(candidate_from_args(args));
            show_cart(app, json)
        }

        Commands::Search(args) => {
            let products = app.api().await?.search_products(&args.text).await?;
            output(json, &products, || render::products(&products))
        }

        Commands::Scan(args) => {
            let product = lookup_piece(app, &args.code).await?;
            let presentation = scan_presentation(&product, args.presentation.as_deref())?;
            app.ledger.add_line(scan_candidate(&product, presentation));
            show_cart(app, json)
        }

        Commands::Pick(args) => {
            let product = lookup_piece(app, &args.code).await?;
            let presentation = resolve_presentation(&product, args.presentation.as_deref())?;
            app.ledger.add_line(piece_candidate(&product, presentation));
            show_cart(app, json)
        }

        Commands::AddBulk(args) => {
            let amount = parse_entered_amount(&args.amount)?;
            let product = lookup(app, &args.code).await?;
            let presentation = resolve_presentation(&product, args.presentation.as_deref())?;
            app.ledger
                .add_line(bulk_candidate(&product, presentation, amount)?);
            show_cart(app, json)
        }

        Commands::SetQty(args) => {
            let presentation = args.presentation.as_deref();
            if !app.ledger.update_quantity(&args.product_id, presentation, args.quantity) {
                return Err(ApiError::not_found("Cart line", &args.product_id));
            }
            show_cart(app, json)
        }

        Commands::Remove(args) => {
            if !app
                .ledger
                .remove_line(&args.product_id, args.presentation.as_deref())
            {
                return Err(ApiError::not_found("Cart line", &args.product_id));
            }
            show_cart(app, json)
        }

        Commands::Clear => {
            app.ledger.clear();
            show_cart(app, json)
        }

        Commands::Send(args) => {
            let api = app.api().await?;
            let receipt = send_to_cashier(&app.ledger, &api, &app.config, &args.client_name).await?;
            output(json, &receipt, || render::receipt(&receipt))
        }

        Commands::Pending(PendingCommands::List) => {
            let sales = app.api().await?.list_pending_sales().await?;
            output(json, &sales, || render::pending_sales(&sales))
        }

        Commands::Pending(PendingCommands::Delete { id }) => {
            app.api().await?.delete_pending_sale(&id).await?;
            output(json, &id, || format!("Deleted pending sale {}\n", id))
        }

        Commands::Config(ConfigCommands::Show) => {
            let view = ConfigView {
                effective_api_url: app.api_url().await,
                config: &app.config,
            };
            output(json, &view, || {
                format!(
                    "apiUrl        {}\nbranch        {}\ncashRegister  {}\nsound         {}\ntimeout       {}s\n",
                    view.effective_api_url,
                    view.config.branch,
                    view.config.cash_register,
                    if view.config.sound_enabled { "on" } else { "off" },
                    view.config.request_timeout_secs,
                )
            })
        }

        Commands::Config(ConfigCommands::SetApiUrl { url }) => {
            let saved = app.settings.save_api_url(&url).await?;
            output(json, &saved, || format!("API URL saved: {}\n", saved))
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigView<'a> {
    effective_api_url: String,
    #[serde(flatten)]
    config: &'a ClientConfig,
}

fn show_cart(app: &App, json: bool) -> ApiResult<()> {
    let lines = app.ledger.lines();
    output(json, &lines, || render::cart(&lines, &app.ledger.totals()))
}

fn output<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce() -> String) -> ApiResult<()> {
    if json {
        let rendered = serde_json::to_string_pretty(value)
            .map_err(|e| ApiError::internal(format!("Failed to render JSON: {}", e)))?;
        println!("{}", rendered);
    } else {
        print!("{}", text());
    }
    Ok(())
}

async fn lookup(app: &App, code: &str) -> ApiResult<Product> {
    app.api()
        .await?
        .product_by_code(code)
        .await?
        .ok_or_else(|| ApiError::not_found("Product with code", code))
}

/// Looks a product up for a piece add; bulk goods are sent to `add-bulk`.
async fn lookup_piece(app: &App, code: &str) -> ApiResult<Product> {
    let product = lookup(app, code).await?;
    if product.is_bulk() {
        return Err(ApiError::validation(format!(
            "{} is sold by amount; use add-bulk {} <amount>",
            product.name, code
        )));
    }
    Ok(product)
}

fn candidate_from_args(args: AddArgs) -> NewCartLine {
    let mut candidate =
        NewCartLine::new(args.product_id, args.name, args.quantity, args.unit_price);
    if let (Some(id), Some(name)) = (args.presentation_id, args.presentation_name) {
        candidate = candidate.with_presentation(id, name);
    }
    if let Some(base) = args.base_price {
        candidate = candidate.with_base_price(base);
    }
    if let Some(sale_type) = args.sale_type {
        candidate = candidate.with_sale_type(sale_type);
    }
    candidate
}

/// Picks the presentation to add from a product listing.
///
/// An explicit id must exist. Without one, a product with several
/// presentations needs a choice; otherwise the default (or only) one is used.
pub fn resolve_presentation<'a>(
    product: &'a Product,
    requested: Option<&str>,
) -> ApiResult<Option<&'a Presentation>> {
    if let Some(id) = requested {
        return requested_presentation(product, id).map(Some);
    }

    match product.presentations.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(only)),
        _ => product
            .default_presentation()
            .map(Some)
            .ok_or_else(|| presentation_required(product)),
    }
}

/// Picks the presentation for a scanned barcode.
///
/// A product with several presentations is only scanned with an explicit
/// `--presentation`. Otherwise the presentation flagged as default is used,
/// if there is one.
pub fn scan_presentation<'a>(
    product: &'a Product,
    requested: Option<&str>,
) -> ApiResult<Option<&'a Presentation>> {
    if let Some(id) = requested {
        return requested_presentation(product, id).map(Some);
    }
    if product.presentations.len() > 1 {
        return Err(presentation_required(product));
    }
    Ok(product.default_presentation())
}

fn requested_presentation<'a>(product: &'a Product, id: &str) -> ApiResult<&'a Presentation> {
    product
        .presentation(id)
        .ok_or_else(|| ApiError::not_found("Presentation", id))
}

fn presentation_required(product: &Product) -> ApiError {
    let options: Vec<String> = product
        .presentations
        .iter()
        .map(|p| format!("{} ({})", p.id, p.name))
        .collect();
    ApiError::validation(format!(
        "{} has several presentations; pass --presentation with one of: {}",
        product.name,
        options.join(", ")
    ))
}
