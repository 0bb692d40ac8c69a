use anyhow::Context;
use clap::Parser;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::settings::Settings;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(default_value = "serve")]
    command: Command,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum Command {
    /// Apply migrations, then serve the HTTP API
    Serve,
    /// Apply migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;
    let pool = establish_connection(&settings.database.path, settings.database.max_connections)
        .await
        .with_context(|| {
            format!(
                "Cannot open database {}",
                settings.database.path.display()
            )
        })?;

    tracing::info!("Running db migrations...");
    run_migrations(&pool).await.context("Migrations failed")?;

    match cli.command {
        Command::Serve => run_server(pool, &settings.server).await?,
        Command::Migrate => tracing::info!("Migrations applied"),
    }
    Ok(())
}
