//! farewatch configuration.
//!
//! Sources, lowest precedence first:
//!   ~/.config/farewatch/config.toml (or an explicit path)
//!   FAREWATCH_* environment variables, e.g. FAREWATCH_SHEET__URL
//!   SHEETY_* / AMADEUS_* environment variables

use std::fmt;
use std::path::{Path, PathBuf};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat, Source};
use serde::Deserialize;

use crate::error::{FarewatchError, FarewatchResult};
use crate::flight_search::session::Credentials;

static DEFAULT_FLIGHT_SEARCH_URL: &str = "https://test.api.amadeus.com";
static DEFAULT_COLLECTION: &str = "prices";
static DEFAULT_RECORD: &str = "price";

/// Environment variables carried over from the original `.env` layout,
/// mapped onto their config keys.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("SHEETY_URL", "sheet.url"),
    ("SHEETY_API_KEY", "sheet.api_key"),
    ("AMADEUS_ENDPOINT", "flight_search.base_url"),
    ("AMADEUS_API_KEY", "flight_search.api_key"),
    ("AMADEUS_API_SECRET", "flight_search.api_secret"),
];

fn default_flight_search_url() -> String {
    DEFAULT_FLIGHT_SEARCH_URL.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_record() -> String {
    DEFAULT_RECORD.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct FarewatchConfig {
    pub sheet: SheetConfig,
    pub flight_search: FlightSearchConfig,
}

/// Which write operations the sheet client is allowed to perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetVariant {
    /// GET rows, PUT a single row's airport code.
    #[default]
    Update,
    /// GET rows, POST new rows.
    Append,
}

impl SheetVariant {
    pub fn name(&self) -> &'static str {
        match self {
            SheetVariant::Update => "update",
            SheetVariant::Append => "append",
        }
    }
}

impl fmt::Display for SheetVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SheetConfig {
    /// Full Sheety endpoint, e.g. https://api.sheety.co/<user>/<project>/prices
    pub url: String,
    pub api_key: String,

    #[serde(default)]
    pub variant: SheetVariant,

    /// Plural key wrapping the row list in GET responses.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Singular key wrapping a row in PUT/POST bodies.
    #[serde(default = "default_record")]
    pub record: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlightSearchConfig {
    #[serde(default = "default_flight_search_url")]
    pub base_url: String,

    /// Defaults to `{base_url}/v1/security/oauth2/token`.
    #[serde(default)]
    pub token_url: Option<String>,

    pub api_key: String,
    pub api_secret: String,
}

impl FlightSearchConfig {
    pub fn token_url(&self) -> String {
        match &self.token_url {
            Some(url) => url.clone(),
            None => format!(
                "{}/v1/security/oauth2/token",
                self.base_url.trim_end_matches('/')
            ),
        }
    }

    pub fn locations_url(&self) -> String {
        format!(
            "{}/v1/reference-data/locations/cities",
            self.base_url.trim_end_matches('/')
        )
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            key: self.api_key.clone(),
            secret: self.api_secret.clone(),
        }
    }
}

impl FarewatchConfig {
    pub fn config_path() -> FarewatchResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FarewatchError::Config("Could not determine config directory".into()))?
            .join("farewatch");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the config file (if any) plus the environment.
    pub fn load(path: Option<&Path>) -> FarewatchResult<Self> {
        dotenvy::dotenv().ok();

        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        Self::from_sources(File::from(path).required(false), std::env::vars().collect())
    }

    /// Layer `file` under the given environment: `FAREWATCH_*` keys first,
    /// then the legacy `SHEETY_*` / `AMADEUS_*` names on top.
    fn from_sources<S>(file: S, env: config::Map<String, String>) -> FarewatchResult<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix("FAREWATCH")
                .prefix_separator("_")
                .separator("__")
                .source(Some(env.clone())),
        );

        for (var, key) in LEGACY_ENV {
            builder = builder
                .set_override_option(*key, env.get(*var).cloned())
                .map_err(|e| FarewatchError::Config(e.to_string()))?;
        }

        Self::from_builder(builder)
    }

    /// Load from TOML text only, ignoring the environment.
    pub fn from_toml(contents: &str) -> FarewatchResult<Self> {
        Self::from_builder(
            Config::builder().add_source(File::from_str(contents, FileFormat::Toml)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> FarewatchResult<Self> {
        let config: FarewatchConfig = builder
            .build()
            .map_err(|e| FarewatchError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| FarewatchError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> FarewatchResult<()> {
        check_url("sheet.url", &self.sheet.url)?;
        check_url("flight_search.base_url", &self.flight_search.base_url)?;
        if let Some(token_url) = &self.flight_search.token_url {
            check_url("flight_search.token_url", token_url)?;
        }

        let required = [
            ("sheet.api_key", &self.sheet.api_key),
            ("flight_search.api_key", &self.flight_search.api_key),
            ("flight_search.api_secret", &self.flight_search.api_secret),
            ("sheet.collection", &self.sheet.collection),
            ("sheet.record", &self.sheet.record),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(FarewatchError::Config(format!("'{key}' must not be empty")));
            }
        }

        Ok(())
    }
}

fn check_url(key: &str, value: &str) -> FarewatchResult<()> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| FarewatchError::Config(format!("'{key}' is not a valid URL ({e}): {value}")))
}
