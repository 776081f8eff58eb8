use anyhow::{Context, Result};
use farewatch_core::{FarewatchConfig, FlightSearchClient, SheetClient, SheetVariant, sync};

use crate::render::Render;

pub async fn run(config: &FarewatchConfig) -> Result<()> {
    if config.sheet.variant != SheetVariant::Update {
        anyhow::bail!(
            "Sync writes codes back with PUT, which the '{}' sheet variant doesn't allow.\n\
            Set sheet.variant = \"update\" in your config.",
            config.sheet.variant
        );
    }

    let mut search = FlightSearchClient::connect(&config.flight_search)
        .await
        .context("Failed to authenticate with the flight search API")?;

    let store = SheetClient::new(config.sheet.clone());

    let report = sync::run(&store, &mut search).await;
    println!("{}", report.render());

    Ok(())
}
