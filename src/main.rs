use anyhow::Result;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use clap::{Parser, Subcommand};
use delivery::types::DeliveryOn;
use delivery::{calendar, grouping, holiday};
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions};

/// mealdrop - meal subscription delivery operations
#[derive(Parser)]
#[command(name = "mealdrop")]
#[command(about = "Meal subscription scheduling and packing operations", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Drop database if exists and recreate with migrations
    Reset,
    /// Print the holiday-resolved delivery calendar a subscription over the
    /// given range would produce
    Preview {
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
        /// Comma-separated weekdays, e.g. monday,wednesday,friday
        #[arg(long, value_delimiter = ',')]
        on: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = mealdrop::config::Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    mealdrop::observability::init_observability(
        "mealdrop",
        &config.observability.log_level,
    )?;

    match cli.command {
        Commands::Migrate => migrate_command(config).await,
        Commands::Reset => reset_command(config).await,
        Commands::Preview { start, end, on } => preview_command(config, start, end, on).await,
    }
}

#[tracing::instrument(skip(config))]
async fn migrate_command(config: mealdrop::config::Config) -> Result<()> {
    tracing::info!("Running database migrations...");

    if !sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::info!("Database does not exist, creating: {}", config.database.url);
        sqlx::Sqlite::create_database(&config.database.url).await?;
    }

    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&config.database.url)
        .await?;

    delivery::MIGRATOR.run(&db_pool).await?;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn reset_command(config: mealdrop::config::Config) -> Result<()> {
    tracing::info!("Resetting database...");

    if sqlx::Sqlite::database_exists(&config.database.url).await? {
        tracing::warn!("Dropping existing database: {}", config.database.url);
        sqlx::Sqlite::drop_database(&config.database.url).await?;
    } else {
        tracing::info!("Database does not exist, nothing to drop");
    }

    migrate_command(config).await?;

    tracing::info!("Database reset completed successfully");

    Ok(())
}

#[tracing::instrument(skip(config))]
async fn preview_command(
    config: mealdrop::config::Config,
    start: String,
    end: String,
    on: Vec<String>,
) -> Result<()> {
    let start: NaiveDate = start
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid start date: {start}"))?;
    let end: NaiveDate = end
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid end date: {end}"))?;

    let mut delivery_on = DeliveryOn::default();
    for day in &on {
        let weekday: Weekday = day
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("unrecognized weekday: {day}"))?;
        delivery_on.enable(weekday);
    }

    let db_pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    let dates = calendar::generate_delivery_dates(&delivery_on, start, end);
    let holidays = holiday::fetch_range(
        &db_pool,
        start,
        end + Days::new(holiday::HOLIDAY_LOOKAHEAD_DAYS),
    )
    .await?;
    let resolved = holiday::resolve_dates(&dates, &holidays);

    if resolved.is_empty() {
        println!("no deliveries in range");
        return Ok(());
    }

    for (planned, resolved) in dates.iter().zip(&resolved) {
        let group = grouping::group_key(*resolved);
        if planned == resolved {
            println!("{resolved}  {:9}  {group}", resolved.weekday().to_string());
        } else {
            println!(
                "{planned} -> {resolved}  {:9}  {group}  (holiday shift)",
                resolved.weekday().to_string()
            );
        }
    }

    Ok(())
}
