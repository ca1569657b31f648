//! Ferretería CLI - storefront and back office from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Write the starter catalog, demo accounts, clients and suppliers
//! fx-cli seed
//!
//! # Sign in and shop
//! fx-cli login -e usuario@test.com -p user123
//! fx-cli cart add 3 --quantity 12
//! fx-cli checkout --payment efectivo
//!
//! # Back office (admin session)
//! fx-cli login -e admin@ferreteria.com -p admin123
//! fx-cli invoices create 1712345678901
//! fx-cli reports sales --from 2026-10-01 --to 2026-10-31
//! fx-cli backup export -o respaldo.json
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr; set `RUST_LOG`
//! to change the level and `FERRETERIA_LOG_JSON=1` for JSON logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use ferreteria_core::{ClientId, ClientKind, OrderId, OrderStatus, ProductId, SupplierId};

mod commands;

use commands::CommandResult;

#[derive(Parser)]
#[command(name = "fx-cli")]
#[command(author, version, about = "Ferretería storefront and back office")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write default catalog, accounts, clients, orders and suppliers where missing
    Seed,
    /// Create a user account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in session and resolved role
    Whoami,
    /// Switch the administrator between admin and user views
    ToggleRole,
    /// Product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Cart of the current session
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Turn the cart into an order
    Checkout {
        /// Payment method: efectivo or tarjeta
        #[arg(long)]
        payment: Option<String>,
        /// Customer name, defaults to the signed-in user
        #[arg(long)]
        customer: Option<String>,
    },
    /// Order ledger
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Client registry
    Clients {
        #[command(subcommand)]
        action: ClientAction,
    },
    /// Invoices
    Invoices {
        #[command(subcommand)]
        action: InvoiceAction,
    },
    /// Supplier directory
    Suppliers {
        #[command(subcommand)]
        action: SupplierAction,
    },
    /// Sales reports
    Reports {
        #[command(subcommand)]
        action: ReportAction,
    },
    /// Export and restore back-office data
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },
}

#[derive(Args)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long, default_value_t = 0)]
    stock: u32,
    #[arg(long)]
    category: String,
    #[arg(long)]
    supplier: String,
    #[arg(long)]
    image: Option<String>,
}

#[derive(Subcommand)]
enum ProductAction {
    /// List every product
    List,
    /// Case-insensitive search over name, description and category
    Search { query: String },
    /// Add a product (admin)
    Add(ProductFields),
    /// Replace a product's fields (admin)
    Update {
        id: ProductId,
        #[command(flatten)]
        fields: ProductFields,
    },
    /// Remove a product (admin)
    Delete { id: ProductId },
}

#[derive(Subcommand)]
enum CartAction {
    /// Lines and totals
    Show,
    /// Add a catalog product
    Add {
        product: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity, 0 removes it
    Set { product: ProductId, quantity: u32 },
    /// Remove a line
    Remove { product: ProductId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Orders visible to the current role
    List {
        #[arg(long)]
        status: Option<OrderStatus>,
        #[arg(long)]
        customer: Option<String>,
    },
    /// Change an order's status (admin)
    Status { id: OrderId, status: OrderStatus },
    /// Remove an order (admin)
    Delete { id: OrderId },
}

#[derive(Subcommand)]
enum ClientAction {
    /// All clients
    List,
    /// Search by name, email, phone, contact or RFC
    Search { query: String },
    /// Register a client (admin)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
        #[arg(long, default_value = "")]
        contact: String,
        #[arg(long, default_value = "individual")]
        kind: ClientKind,
        #[arg(long)]
        rfc: Option<String>,
        #[arg(long)]
        seller: Option<String>,
    },
    /// Mark a client inactive (admin)
    Deactivate { id: ClientId },
    /// Purchase statistics of one client
    Stats { id: ClientId },
    /// Dashboard figures
    Summary,
}

#[derive(Subcommand)]
enum InvoiceAction {
    /// All invoices
    List,
    /// Invoice an order (admin)
    Create { order: OrderId },
    /// Cancel an invoice (admin)
    Cancel {
        uuid: Uuid,
        #[arg(long)]
        reason: String,
    },
}

#[derive(Subcommand)]
enum SupplierAction {
    /// All suppliers
    List,
    /// Add a supplier (admin)
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        /// Start of the relationship, `YYYY-MM-DD`
        #[arg(long)]
        since: NaiveDate,
    },
    /// Remove a supplier (admin)
    Delete { id: SupplierId },
}

#[derive(Subcommand)]
enum ReportAction {
    /// Completed sales between two dates, inclusive
    Sales {
        #[arg(long)]
        from: NaiveDate,
        #[arg(long)]
        to: NaiveDate,
    },
    /// Commission per seller, optionally limited to a date range
    Commissions {
        #[arg(long, requires = "to")]
        from: Option<NaiveDate>,
        #[arg(long, requires = "from")]
        to: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum BackupAction {
    /// Write a backup, to stdout unless a file is given
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Restore a backup file (admin)
    Restore { file: PathBuf },
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ferreteria=info".into());

    let json = std::env::var("FERRETERIA_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        commands::report_failure(&*e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CommandResult {
    let state = commands::open_state()?;

    match cli.command {
        Commands::Seed => commands::session::seed(&state),
        Commands::Register {
            username,
            email,
            password,
        } => commands::session::register(&state, &username, &email, password),
        Commands::Login { email, password } => commands::session::login(&state, &email, password),
        Commands::Logout => commands::session::logout(&state),
        Commands::Whoami => commands::session::whoami(&state),
        Commands::ToggleRole => commands::session::toggle_role(&state),
        Commands::Products { action } => match action {
            ProductAction::List => commands::catalog::list(&state),
            ProductAction::Search { query } => commands::catalog::search(&state, &query),
            ProductAction::Add(fields) => commands::catalog::add(&state, fields.into()),
            ProductAction::Update { id, fields } => {
                commands::catalog::update(&state, id, fields.into())
            }
            ProductAction::Delete { id } => commands::catalog::delete(&state, id),
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state),
            CartAction::Add { product, quantity } => commands::cart::add(&state, product, quantity),
            CartAction::Set { product, quantity } => commands::cart::set(&state, product, quantity),
            CartAction::Remove { product } => commands::cart::remove(&state, product),
            CartAction::Clear => commands::cart::clear(&state),
        },
        Commands::Checkout { payment, customer } => {
            commands::cart::checkout(&state, payment.as_deref(), customer)
        }
        Commands::Orders { action } => match action {
            OrderAction::List { status, customer } => {
                commands::orders::list(&state, status, customer)
            }
            OrderAction::Status { id, status } => commands::orders::set_status(&state, id, status),
            OrderAction::Delete { id } => commands::orders::delete(&state, id),
        },
        Commands::Clients { action } => match action {
            ClientAction::List => commands::crm::list_clients(&state),
            ClientAction::Search { query } => commands::crm::search_clients(&state, &query),
            ClientAction::Add {
                name,
                email,
                phone,
                contact,
                kind,
                rfc,
                seller,
            } => commands::crm::add_client(
                &state,
                commands::crm::client_input(name, email, phone, contact, kind, rfc, seller),
            ),
            ClientAction::Deactivate { id } => commands::crm::deactivate_client(&state, id),
            ClientAction::Stats { id } => commands::crm::client_stats(&state, id),
            ClientAction::Summary => commands::crm::summary(&state),
        },
        Commands::Invoices { action } => match action {
            InvoiceAction::List => commands::crm::list_invoices(&state),
            InvoiceAction::Create { order } => commands::crm::create_invoice(&state, order),
            InvoiceAction::Cancel { uuid, reason } => {
                commands::crm::cancel_invoice(&state, uuid, &reason)
            }
        },
        Commands::Suppliers { action } => match action {
            SupplierAction::List => commands::crm::list_suppliers(&state),
            SupplierAction::Add {
                name,
                company,
                phone,
                email,
                since,
            } => commands::crm::add_supplier(
                &state,
                ferreteria_admin::models::NewSupplier {
                    name,
                    phone,
                    company,
                    email,
                    since,
                },
            ),
            SupplierAction::Delete { id } => commands::crm::delete_supplier(&state, id),
        },
        Commands::Reports { action } => match action {
            ReportAction::Sales { from, to } => commands::reports::sales(&state, from, to),
            ReportAction::Commissions { from, to } => {
                commands::reports::commissions(&state, from.zip(to))
            }
        },
        Commands::Backup { action } => match action {
            BackupAction::Export { output } => commands::reports::export(&state, output.as_deref()),
            BackupAction::Restore { file } => commands::reports::restore(&state, &file),
        },
    }
}

impl From<ProductFields> for ferreteria_storefront::models::NewProduct {
    fn from(fields: ProductFields) -> Self {
        Self {
            name: fields.name,
            description: fields.description,
            price: fields.price.into(),
            stock: fields.stock,
            category: fields.category,
            supplier: fields.supplier,
            image: fields.image,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add() {
        let cli = Cli::try_parse_from(["fx-cli", "cart", "add", "3", "-q", "12"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Cart {
                action: CartAction::Add { quantity: 12, .. }
            })
        ));
    }

    #[test]
    fn test_commission_range_needs_both_ends() {
        assert!(Cli::try_parse_from(["fx-cli", "reports", "commissions", "--from", "2026-10-01"]).is_err());
        assert!(Cli::try_parse_from(["fx-cli", "reports", "commissions"]).is_ok());
    }

    #[test]
    fn test_order_status_parses() {
        let cli = Cli::try_parse_from(["fx-cli", "orders", "status", "7", "pagado"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Orders {
                action: OrderAction::Status {
                    status: OrderStatus::Paid,
                    ..
                }
            })
        ));
    }
}
