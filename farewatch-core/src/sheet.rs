//! Sheety client for the flight-price sheet.
//!
//! Sheety wraps rows in a plural key on reads (`{"prices": [...]}`) and a
//! singular key on writes (`{"price": {...}}`). Both keys come from config.

use reqwest::RequestBuilder;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use crate::config::{SheetConfig, SheetVariant};
use crate::error::{FarewatchError, FarewatchResult};
use crate::row::Row;
use crate::sync::SheetStore;

const SERVICE: &str = "sheet store";

pub struct SheetClient {
    http: reqwest::Client,
    config: SheetConfig,
}

impl SheetClient {
    pub fn new(config: SheetConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn variant(&self) -> SheetVariant {
        self.config.variant
    }

    /// GET {url}. Rows that don't parse (e.g. no `city`) are logged and left out.
    pub async fn fetch_rows(&self) -> FarewatchResult<Vec<Row>> {
        let result = self.get_rows().await;

        match &result {
            Ok(rows) => debug!(count = rows.len(), "Fetched rows"),
            Err(e) => warn!(error = %e, "Failed to fetch rows"),
        }

        result
    }

    /// PUT {url}/{id}, setting only the row's airport code.
    pub async fn update_row(&self, id: i64, iata_code: &str) -> FarewatchResult<Value> {
        let result = self.put_iata_code(id, iata_code).await;

        match &result {
            Ok(_) => debug!(id, iata_code, "Updated row"),
            Err(e) => warn!(id, error = %e, "Failed to update row"),
        }

        result
    }

    /// POST {url} with arbitrary column values.
    pub async fn append_row(&self, fields: Map<String, Value>) -> FarewatchResult<Value> {
        let result = self.post_row(fields).await;

        match &result {
            Ok(_) => debug!("Appended row"),
            Err(e) => warn!(error = %e, "Failed to append row"),
        }

        result
    }

    async fn get_rows(&self) -> FarewatchResult<Vec<Row>> {
        let mut body = self.send(self.http.get(&self.config.url)).await?;

        let rows = match take_field(&mut body, &self.config.collection)? {
            Value::Array(rows) => rows,
            other => {
                return Err(FarewatchError::Malformed {
                    service: SERVICE,
                    message: format!("'{}' is not a list: {other}", self.config.collection),
                });
            }
        };

        Ok(rows.into_iter().filter_map(parse_row).collect())
    }

    async fn put_iata_code(&self, id: i64, iata_code: &str) -> FarewatchResult<Value> {
        self.require(SheetVariant::Update, "update_row")?;

        let payload = self.wrap(json!({ "iataCode": iata_code }));
        let request = self.http.put(self.row_url(id)).json(&payload);

        let mut body = self.send(request).await?;
        take_field(&mut body, &self.config.record)
    }

    async fn post_row(&self, fields: Map<String, Value>) -> FarewatchResult<Value> {
        self.require(SheetVariant::Append, "append_row")?;

        let payload = self.wrap(Value::Object(fields));
        let request = self.http.post(&self.config.url).json(&payload);

        let mut body = self.send(request).await?;
        take_field(&mut body, &self.config.record)
    }

    fn require(&self, variant: SheetVariant, operation: &'static str) -> FarewatchResult<()> {
        if self.config.variant == variant {
            Ok(())
        } else {
            Err(FarewatchError::Unsupported {
                operation,
                variant: self.config.variant.name(),
            })
        }
    }

    fn wrap(&self, record: Value) -> Value {
        let mut body = Map::new();
        body.insert(self.config.record.clone(), record);
        Value::Object(body)
    }

    fn row_url(&self, id: i64) -> String {
        format!("{}/{}", self.config.url.trim_end_matches('/'), id)
    }

    async fn send(&self, request: RequestBuilder) -> FarewatchResult<Value> {
        let response = request
            .bearer_auth(&self.config.api_key)
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

        response.json().await.map_err(|e| FarewatchError::Malformed {
            service: SERVICE,
            message: e.to_string(),
        })
    }
}

impl SheetStore for SheetClient {
    async fn fetch_rows(&self) -> FarewatchResult<Vec<Row>> {
        SheetClient::fetch_rows(self).await
    }

    async fn update_row(&self, id: i64, iata_code: &str) -> FarewatchResult<()> {
        SheetClient::update_row(self, id, iata_code).await.map(|_| ())
    }
}

fn parse_row(value: Value) -> Option<Row> {
    match serde_json::from_value::<Row>(value.clone()) {
        Ok(row) => Some(row),
        Err(e) => {
            warn!(row = %value, error = %e, "Skipping unreadable row");
            None
        }
    }
}

fn take_field(body: &mut Value, field: &str) -> FarewatchResult<Value> {
    body.as_object_mut()
        .and_then(|object| object.remove(field))
        .ok_or_else(|| FarewatchError::MissingField {
            service: SERVICE,
            field: field.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(variant: SheetVariant) -> SheetClient {
        SheetClient::new(SheetConfig {
            url: "https://api.sheety.co/abc/flightDeals/prices/".to_string(),
            api_key: "key".to_string(),
            variant,
            collection: "prices".to_string(),
            record: "price".to_string(),
        })
    }

    #[test]
    fn test_row_url_strips_trailing_slash() {
        assert_eq!(
            client(SheetVariant::Update).row_url(7),
            "https://api.sheety.co/abc/flightDeals/prices/7"
        );
    }

    #[test]
    fn test_take_field_reports_missing_key() {
        let mut body = json!({"sheet": []});

        let err = take_field(&mut body, "prices").unwrap_err();
        assert!(matches!(err, FarewatchError::MissingField { ref field, .. } if field == "prices"));
    }

    #[test]
    fn test_parse_row_skips_row_without_city() {
        assert!(parse_row(json!({"id": 2, "iataCode": ""})).is_none());
        assert_eq!(
            parse_row(json!({"id": 1, "city": "London"})),
            Some(Row::new(1, "London", ""))
        );
    }

    #[test]
    fn test_take_field_on_non_object() {
        let mut body = json!([1, 2, 3]);
        assert!(take_field(&mut body, "prices").is_err());
    }

    #[tokio::test]
    async fn test_update_rejected_on_append_variant() {
        let err = client(SheetVariant::Append)
            .update_row(1, "LHR")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FarewatchError::Unsupported {
                operation: "update_row",
                variant: "append"
            }
        ));
    }

    #[tokio::test]
    async fn test_append_rejected_on_update_variant() {
        let err = client(SheetVariant::Update)
            .append_row(Map::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FarewatchError::Unsupported {
                operation: "append_row",
                ..
            }
        ));
    }
}
