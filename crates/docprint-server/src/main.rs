use clap::Parser;
use docprint_server::{config, telemetry, CliArgs};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliArgs::parse();
    let settings = config::load(&cli)?;
    telemetry::init(&settings.logging);

    docprint_server::serve(settings).await
}
