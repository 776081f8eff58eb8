//! Amadeus flight search client.
//!
//! Only the city lookup is used: a city name goes in, the IATA code of the
//! first airport-type match comes out.

pub mod session;

use std::fmt;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::FlightSearchConfig;
use crate::error::{FarewatchError, FarewatchResult};
use crate::sync::IataResolver;
use session::Session;

const SERVICE: &str = "flight search";

/// Candidate matches requested per lookup.
const MAX_MATCHES: &str = "2";

/// Location subtype the lookup is restricted to.
const LOCATION_KIND: &str = "AIRPORTS";

/// Outcome of a successful city lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    NotFound(NotFoundReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundReason {
    /// The lookup returned an empty match list.
    NoMatches,
    /// The first match carried no IATA code.
    MissingCode,
}

impl NotFoundReason {
    /// Marker the original sheet workflow wrote for each case.
    pub fn legacy_marker(&self) -> &'static str {
        match self {
            NotFoundReason::NoMatches => "N/A",
            NotFoundReason::MissingCode => "Not Found",
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::NoMatches => f.write_str("no matching airport"),
            NotFoundReason::MissingCode => f.write_str("first match has no IATA code"),
        }
    }
}

#[derive(Deserialize)]
struct LocationsResponse {
    data: Option<Vec<Location>>,
}

#[derive(Deserialize)]
struct Location {
    #[serde(rename = "iataCode")]
    iata_code: Option<String>,
}

pub struct FlightSearchClient {
    http: reqwest::Client,
    locations_url: String,
    session: Session,
}

impl FlightSearchClient {
    /// Acquire a token and build the client. Fails if the token exchange fails.
    pub async fn connect(config: &FlightSearchConfig) -> FarewatchResult<Self> {
        let http = reqwest::Client::new();
        let session = Session::acquire(&http, config.token_url(), config.credentials()).await?;

        Ok(Self {
            http,
            locations_url: config.locations_url(),
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn resolve_iata(&mut self, city: &str) -> FarewatchResult<Resolution> {
        let result = self.lookup(city).await;

        match &result {
            Ok(Resolution::Found(code)) => debug!(city, code = code.as_str(), "Resolved city"),
            Ok(Resolution::NotFound(reason)) => info!(city, %reason, "No airport code found"),
            Err(e) => warn!(city, error = %e, "City lookup failed"),
        }

        result
    }

    async fn lookup(&mut self, city: &str) -> FarewatchResult<Resolution> {
        self.session.refresh_if_needed(&self.http).await?;

        let response = self
            .http
            .get(&self.locations_url)
            .bearer_auth(self.session.access_token())
            .query(&[
                ("keyword", city),
                ("max", MAX_MATCHES),
                ("include", LOCATION_KIND),
            ])
            .send()
            .await
            .map_err(|source| FarewatchError::Transport {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FarewatchError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let body: LocationsResponse =
            response.json().await.map_err(|e| FarewatchError::Malformed {
                service: SERVICE,
                message: e.to_string(),
            })?;

        first_code(body)
    }
}

impl IataResolver for FlightSearchClient {
    async fn resolve_iata(&mut self, city: &str) -> FarewatchResult<Resolution> {
        FlightSearchClient::resolve_iata(self, city).await
    }
}

fn first_code(body: LocationsResponse) -> FarewatchResult<Resolution> {
    let data = body.data.ok_or_else(|| FarewatchError::MissingField {
        service: SERVICE,
        field: "data".to_string(),
    })?;

    let Some(first) = data.into_iter().next() else {
        return Ok(Resolution::NotFound(NotFoundReason::NoMatches));
    };

    match first.iata_code {
        Some(code) if !code.trim().is_empty() => Ok(Resolution::Found(code)),
        _ => Ok(Resolution::NotFound(NotFoundReason::MissingCode)),
    }
}
