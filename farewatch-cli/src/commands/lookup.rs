use anyhow::{Context, Result};
use farewatch_core::{FarewatchConfig, FlightSearchClient, Resolution};
use owo_colors::OwoColorize;

pub async fn run(config: &FarewatchConfig, city: &str) -> Result<()> {
    let mut search = FlightSearchClient::connect(&config.flight_search)
        .await
        .context("Failed to authenticate with the flight search API")?;

    match search.resolve_iata(city).await? {
        Resolution::Found(code) => println!("{} {}", city, code.green()),
        Resolution::NotFound(reason) => println!("{} {}", city, reason.to_string().yellow()),
    }

    Ok(())
}
