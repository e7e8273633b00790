use crate::api::SortOrder;
use crate::workflows::OrderStatus;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "roastery")]
#[command(about = "Operator console for the coffee roastery back office")]
#[command(long_about = "Roastery lets shop operators move orders through confirm, roasting, \
                       shipped and complete, and manage the bean, form and product catalog. \
                       Get started with 'roastery login'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in as an admin or super admin operator
    Login {
        #[arg(long, help = "Operator email address")]
        email: String,
        /// Read from stdin when omitted
        #[arg(long, help = "Password (prompted for when omitted)")]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in operator's profile
    Whoami,
    /// List, inspect and advance customer orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommand,
    },
    /// Manage coffee bean varieties
    Beans {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Manage product forms (whole bean, ground, ...)
    Forms {
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Manage sellable products
    Products {
        #[command(subcommand)]
        command: ProductsCommand,
    },
    /// Print the status that follows the given one
    NextStatus {
        #[arg(help = "One of: confirm, roasting, shipped, complete, cancelled")]
        status: String,
    },
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List orders, newest page first
    List {
        #[arg(long, help = "Only show orders with this status")]
        status: Option<OrderStatus>,
        #[arg(long, default_value = "asc", help = "Sort by creation date: asc or desc")]
        sort: SortOrder,
        #[arg(long, default_value = "1", help = "Page number, starting at 1")]
        page: u32,
        #[arg(long, help = "Rows per page (defaults to pagination.default_limit)")]
        limit: Option<u32>,
    },
    /// Show a single order with its items
    Show { id: String },
    /// Move an order to its next status
    Advance {
        id: String,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommand {
    List,
    Show {
        id: u64,
    },
    Add {
        name: String,
    },
    Rename {
        id: u64,
        name: String,
    },
    Delete {
        id: u64,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ProductsCommand {
    List {
        #[arg(long)]
        bean: Option<String>,
        #[arg(long)]
        form: Option<String>,
        #[arg(long, help = "Roast level filter")]
        roast: Option<String>,
        #[arg(long)]
        sort: Option<SortOrder>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
    Show {
        id: u64,
    },
    Create(ProductArgs),
    Edit {
        id: u64,
        #[command(flatten)]
        product: ProductArgs,
    },
    Delete {
        id: u64,
        #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProductArgs {
    #[arg(long)]
    pub bean: String,
    #[arg(long, help = "Roast level, e.g. light, medium, dark")]
    pub roasted: String,
    #[arg(long)]
    pub form: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub quantity: u32,
    #[arg(long, help = "Image file uploaded with the product")]
    pub image: Option<PathBuf>,
}
