use anyhow::Context;
use plantpick_api::{config::Config, server, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    telemetry::init_tracing(&config.logging)?;

    server::serve(config).await
}
