mod common;

use scc_toolkit::http::ApiError;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client, TOKEN};

#[tokio::test]
async fn get_sends_bearer_token_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/inventory/devices"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(query_param("q", "name:edge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let value: Value = client(&server)
        .get_json("/v1/inventory/devices", &[("q", "name:edge".to_string())])
        .await
        .unwrap();
    assert_eq!(value["count"], 0);
}

#[tokio::test]
async fn derived_client_uses_its_own_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/token"))
        .and(header("authorization", "Bearer tenant-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let msp = client(&server);
    let tenant = msp.with_token("tenant-token");
    assert_eq!(msp.api_token(), TOKEN);

    let _: Value = tenant.get_json("/v1/token", &[]).await.unwrap();
}

#[tokio::test]
async fn get_retries_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/msp/tenants/t-1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/msp/tenants/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"uid": "t-1", "name": "CDO_acme"})))
        .expect(1)
        .mount(&server)
        .await;

    let tenant: Value = client(&server)
        .get_json("/v1/msp/tenants/t-1", &[])
        .await
        .unwrap();
    assert_eq!(tenant["name"], "CDO_acme");
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/inventory/devices/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such device"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<Value>("/v1/inventory/devices/missing", &[])
        .await
        .unwrap_err();

    assert!(!err.is_retriable());
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(err.to_string().contains("no such device"));
}

#[tokio::test]
async fn post_is_sent_once_even_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/msp/tenants/create"))
        .and(body_json(json!({"tenantName": "acme", "displayName": "Acme"})))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .post_json::<_, Value>(
            "/v1/msp/tenants/create",
            &json!({"tenantName": "acme", "displayName": "Acme"}),
        )
        .await
        .unwrap_err();
    assert!(err.is_retriable());
}

#[tokio::test]
async fn empty_body_decodes_as_unit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/msp/tenants/t-1/cdfmc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client(&server)
        .post_empty::<()>("/v1/msp/tenants/t-1/cdfmc")
        .await
        .unwrap();
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/transactions/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_json::<Value>("/v1/transactions/t-1", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}
