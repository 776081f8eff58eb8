use anyhow::Result;
use farewatch_core::{FarewatchConfig, SheetClient};
use owo_colors::OwoColorize;
use serde_json::{Map, Value};

pub async fn run(
    config: &FarewatchConfig,
    city: String,
    iata: Option<String>,
    fields: Vec<(String, Value)>,
) -> Result<()> {
    let mut row = Map::new();
    row.insert("city".to_string(), Value::String(city.clone()));
    if let Some(code) = iata {
        row.insert("iataCode".to_string(), Value::String(code));
    }
    row.extend(fields);

    let store = SheetClient::new(config.sheet.clone());
    let created = store.append_row(row).await?;

    match created.get("id") {
        Some(id) => println!("{} {} {}", "+".green(), city, format!("(row {id})").dimmed()),
        None => println!("{} {}", "+".green(), city),
    }

    Ok(())
}
