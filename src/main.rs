mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting gocanvas");

    // Load configuration
    let config = startup::load_config()?;

    // Print the dashboard until done or interrupted
    startup::start(config).await
}
