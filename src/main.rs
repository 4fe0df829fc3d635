//! shelfmove - legacy library migration

use clap::Parser;

use shelfmove::cli::App;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let app = App::parse();

    // Initialize logging; stdout is reserved for --json output
    let filter = if app.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting shelfmove");

    app.run().await
}
