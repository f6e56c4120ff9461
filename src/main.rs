use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use spendwise::api::{self, AppState};
use spendwise::cli::{
    handle_budget_command, handle_category_command, handle_expense_command, handle_export_command,
    handle_report_command, handle_user_command, resolve_user, BudgetCommands, CategoryCommands,
    ExpenseCommands, ExportCommands, ReportCommands, UserCommands,
};
use spendwise::config::{paths::SpendwisePaths, settings::Settings};
use spendwise::models::GLOBAL_DEFAULTS;
use spendwise::storage::Storage;

#[derive(Parser)]
#[command(
    name = "spendwise",
    version,
    about = "Personal expense tracker with budgets, reports and a REST API",
    long_about = "Spendwise tracks expenses in USD and NGN against monthly budgets. \
                  Run 'spendwise serve' for the HTTP API, or manage data directly \
                  from the command line."
)]
struct Cli {
    /// Email of the user to act as (defaults to the only user)
    #[arg(long, global = true, env = "SPENDWISE_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides config and SPENDWISE_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// User management commands
    #[command(subcommand)]
    User(UserCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Expense management commands
    #[command(subcommand, alias = "exp")]
    Expense(ExpenseCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export expenses
    #[command(subcommand)]
    Export(ExportCommands),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    // Initialize paths and settings
    let paths = SpendwisePaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    settings.apply_env_overrides()?;

    // Initialize storage
    let storage = Storage::open(paths.clone())?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                settings.port = port;
            }
            info!("Starting Spendwise API from {}", paths.base_dir().display());
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(api::serve(AppState::new(storage, settings)))?;
        }
        Some(Commands::Init) => {
            println!("Initializing Spendwise at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("Global categories available to every user:");
            let names: Vec<_> = GLOBAL_DEFAULTS.iter().map(|(name, _)| *name).collect();
            println!("  {}", names.join(", "));
            println!();
            println!("Run 'spendwise user add <name> <email>' to create a user.");
        }
        Some(Commands::Config) => {
            println!("Spendwise Configuration");
            println!("=======================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Data directory: {}", paths.data_dir().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Listen address:     {}", settings.socket_addr());
            if settings.cors_allowed_origins.is_empty() {
                println!("  CORS origins:       any");
            } else {
                println!("  CORS origins:       {}", settings.cors_allowed_origins.join(", "));
            }
            println!("  Trend months:       {}", settings.default_trend_months);
            println!("  Export row limit:   {}", settings.export_row_limit);
            println!("  Date format:        {}", settings.date_format);
        }
        Some(Commands::User(cmd)) => {
            handle_user_command(&storage, cmd)?;
        }
        Some(Commands::Category(cmd)) => {
            let user = resolve_user(&storage, cli.user.as_deref())?;
            handle_category_command(&storage, &user, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            let user = resolve_user(&storage, cli.user.as_deref())?;
            handle_expense_command(&storage, &settings, &user, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            let user = resolve_user(&storage, cli.user.as_deref())?;
            handle_budget_command(&storage, &user, cmd)?;
        }
        Some(Commands::Report(cmd)) => {
            let user = resolve_user(&storage, cli.user.as_deref())?;
            handle_report_command(&storage, &settings, &user, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            let user = resolve_user(&storage, cli.user.as_deref())?;
            handle_export_command(&storage, &settings, &user, cmd)?;
        }
        None => {
            println!("Spendwise - personal expense tracking");
            println!();
            println!("Run 'spendwise --help' for usage information.");
            println!("Run 'spendwise serve' to start the HTTP API.");
        }
    }

    Ok(())
}
