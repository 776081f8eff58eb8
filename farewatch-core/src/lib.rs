//! Core types for farewatch.
//!
//! This crate provides everything the `farewatch` binary needs to keep a
//! flight-price sheet's airport codes filled in:
//! - `sheet` for reading and writing rows through the Sheety REST proxy
//! - `flight_search` for resolving city names to IATA codes via Amadeus
//! - `sync` for the loop that ties the two together

pub mod config;
pub mod error;
pub mod flight_search;
pub mod row;
pub mod sheet;
pub mod sync;

pub use crate::config::{FarewatchConfig, FlightSearchConfig, SheetConfig, SheetVariant};
pub use error::{FarewatchError, FarewatchResult};
pub use flight_search::{FlightSearchClient, NotFoundReason, Resolution};
pub use row::Row;
pub use sheet::SheetClient;
pub use sync::{IataResolver, RowOutcome, RowStatus, SheetStore, SyncReport};
