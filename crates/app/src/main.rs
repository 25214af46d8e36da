//! Stallhub Application CLI

use std::{path::PathBuf, process, sync::Arc};

use clap::{Args, Parser, Subcommand};
use stallhub_app::{
    auth::{Caller, CallerUuid, Role},
    clock::SystemClock,
    context::{AppServices, AppSettings, StorageSettings},
    database,
    domain::{
        carts::{CartPolicy, CartsService},
        catalog::models::BusinessUuid,
        orders::OrderPolicy,
    },
    seed::Seed,
    store::PgRowStore,
};

#[derive(Debug, Parser)]
#[command(name = "stallhub-app", about = "Stallhub CLI", long_about = None)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Load reference data and API tokens from a JSON file
    Seed(SeedArgs),

    Caller(CallerCommand),

    Carts(CartsCommand),
}

#[derive(Debug, Args)]
struct SeedArgs {
    /// Path to the seed document
    #[arg(long)]
    file: PathBuf,
}

#[derive(Debug, Args)]
struct CallerCommand {
    #[command(subcommand)]
    command: CallerSubcommand,
}

#[derive(Debug, Subcommand)]
enum CallerSubcommand {
    /// Issue an API token for a caller
    Create(CreateCallerArgs),
}

#[derive(Debug, Args)]
struct CreateCallerArgs {
    /// customer, staff, owner or admin
    #[arg(long)]
    role: Role,

    /// Business the caller works for; required for staff and owners
    #[arg(long)]
    business_uuid: Option<BusinessUuid>,

    /// Optional caller UUID; generated when omitted
    #[arg(long)]
    caller_uuid: Option<CallerUuid>,
}

#[derive(Debug, Args)]
struct CartsCommand {
    #[command(subcommand)]
    command: CartsSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartsSubcommand {
    /// Delete every expired cart
    EvictExpired,
}

#[tokio::main]
pub async fn main() {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = run(cli).await {
        eprintln!("{error}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let database_url = cli
        .database_url
        .ok_or_else(|| "DATABASE_URL or --database-url is required".to_string())?;

    match cli.command {
        Commands::Migrate => migrate(&database_url).await,
        Commands::Seed(args) => seed(&database_url, args).await,
        Commands::Caller(CallerCommand {
            command: CallerSubcommand::Create(args),
        }) => create_caller(&database_url, args).await,
        Commands::Carts(CartsCommand {
            command: CartsSubcommand::EvictExpired,
        }) => evict_expired(&database_url).await,
    }
}

async fn migrate(database_url: &str) -> Result<(), String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    database::migrate(&pool)
        .await
        .map_err(|error| format!("failed to apply migrations: {error}"))?;

    println!("migrations applied");

    Ok(())
}

async fn services(database_url: &str) -> Result<AppServices, String> {
    let pool = database::connect(database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let settings = AppSettings {
        storage: StorageSettings::Postgres {
            database_url: database_url.to_string(),
        },
        carts: CartPolicy::default(),
        orders: OrderPolicy::default(),
    };

    Ok(AppServices::from_store(
        Arc::new(PgRowStore::new(pool)),
        Arc::new(SystemClock),
        &settings,
    ))
}

async fn seed(database_url: &str, args: SeedArgs) -> Result<(), String> {
    let seed = Seed::from_file(&args.file)
        .await
        .map_err(|error| format!("failed to load {}: {error}", args.file.display()))?;

    services(database_url)
        .await?
        .seed(&seed)
        .await
        .map_err(|error| format!("failed to seed: {error}"))?;

    println!("businesses: {}", seed.catalog.businesses.len());
    println!("stalls: {}", seed.catalog.stalls.len());
    println!("products: {}", seed.catalog.products.len());
    println!("api_tokens: {}", seed.api_tokens.len());

    Ok(())
}

async fn create_caller(database_url: &str, args: CreateCallerArgs) -> Result<(), String> {
    if matches!(args.role, Role::Staff | Role::Owner) && args.business_uuid.is_none() {
        return Err(format!("--business-uuid is required for {}", args.role));
    }

    let caller = Caller {
        uuid: args.caller_uuid.unwrap_or_default(),
        role: args.role,
        business_uuid: args.business_uuid,
    };

    let token = services(database_url)
        .await?
        .auth
        .issue_api_token(caller.clone())
        .await
        .map_err(|error| format!("failed to issue token: {error}"))?;

    println!("caller_uuid: {}", caller.uuid);
    println!("role: {}", caller.role);
    println!("api_token: {token}");
    println!("store this token now; it is only shown once");

    Ok(())
}

async fn evict_expired(database_url: &str) -> Result<(), String> {
    let evicted = services(database_url)
        .await?
        .carts
        .evict_expired_carts()
        .await
        .map_err(|error| format!("failed to evict carts: {error}"))?;

    println!("evicted_carts: {evicted}");

    Ok(())
}
