use farewatch_core::{FarewatchError, Row, SheetClient, SheetConfig, SheetVariant};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sheet_config(base: &str, variant: SheetVariant) -> SheetConfig {
    SheetConfig {
        url: format!("{base}/prices"),
        api_key: "sheet-key".to_string(),
        variant,
        collection: "prices".to_string(),
        record: "price".to_string(),
    }
}

#[tokio::test]
async fn fetch_rows_reads_named_list_with_bearer_auth() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .and(header("authorization", "Bearer sheet-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prices": [
                {"id": 2, "city": "Paris", "iataCode": "PAR", "lowestPrice": 54},
                {"id": 3, "city": "Frankfurt", "iataCode": "", "lowestPrice": 42},
                {"id": 4, "city": "Tokyo", "lowestPrice": 485}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Update));
    let rows = client.fetch_rows().await.unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].iata_code, "PAR");
    assert!(rows[1].needs_code());
    assert!(rows[2].needs_code());
    assert_eq!(rows[2].extra.get("lowestPrice"), Some(&json!(485)));
}

#[tokio::test]
async fn fetch_rows_fails_on_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Insufficient permissions"))
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Update));
    let err = client.fetch_rows().await.unwrap_err();

    assert!(matches!(err, FarewatchError::Status { status: 401, .. }));
}

#[tokio::test]
async fn fetch_rows_fails_when_list_is_missing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sheet1": []})))
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Update));
    let err = client.fetch_rows().await.unwrap_err();

    assert!(matches!(err, FarewatchError::MissingField { ref field, .. } if field == "prices"));
}

#[tokio::test]
async fn fetch_rows_fails_when_server_is_down() {
    // Bind and release a port so nothing is listening on it.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let client = SheetClient::new(sheet_config(&uri, SheetVariant::Update));
    let err = client.fetch_rows().await.unwrap_err();

    assert!(matches!(err, FarewatchError::Transport { .. }));
}

#[tokio::test]
async fn update_row_puts_only_the_iata_code() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/prices/1"))
        .and(header("authorization", "Bearer sheet-key"))
        .and(body_json(json!({"price": {"iataCode": "LHR"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "price": {"id": 1, "city": "London", "iataCode": "LHR"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Update));
    let updated = client.update_row(1, "LHR").await.unwrap();

    assert_eq!(updated["iataCode"], json!("LHR"));
}

#[tokio::test]
async fn update_row_accepts_partial_record_in_response() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/prices/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "price": {"id": 1, "iataCode": "LHR"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Update));
    let updated = client.update_row(1, "LHR").await.unwrap();

    assert_eq!(updated["id"], json!(1));
}

#[tokio::test]
async fn fetch_rows_skips_rows_that_do_not_parse() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "prices": [
                {"id": 1, "city": "London", "iataCode": ""},
                {"id": 2, "iataCode": ""},
                {"city": "Lisbon"},
                {"id": 4, "city": "Paris", "iataCode": "PAR"}
            ]
        })))
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Update));
    let rows = client.fetch_rows().await.unwrap();

    assert_eq!(rows, vec![Row::new(1, "London", ""), Row::new(4, "Paris", "PAR")]);
}

#[tokio::test]
async fn fetch_rows_fails_when_collection_is_not_a_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/prices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"prices": {"id": 1}})))
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Update));
    let err = client.fetch_rows().await.unwrap_err();

    assert!(matches!(err, FarewatchError::Malformed { .. }));
}

#[tokio::test]
async fn append_row_posts_fields_under_record_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/prices"))
        .and(body_json(json!({"price": {"city": "Oslo", "iataCode": "OSL"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "price": {"id": 9, "city": "Oslo", "iataCode": "OSL"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = serde_json::Map::new();
    fields.insert("city".to_string(), json!("Oslo"));
    fields.insert("iataCode".to_string(), json!("OSL"));

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Append));
    let created = client.append_row(fields).await.unwrap();

    assert_eq!(created["id"], json!(9));
}

#[tokio::test]
async fn disallowed_write_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = SheetClient::new(sheet_config(&server.uri(), SheetVariant::Append));
    let err = client.update_row(1, "LHR").await.unwrap_err();

    assert!(matches!(err, FarewatchError::Unsupported { .. }));
}
