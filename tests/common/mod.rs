#![allow(dead_code)]

use scc_toolkit::http::ApiClient;
use scc_toolkit::retry::RetryConfig;
use scc_toolkit::transaction::PollSettings;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "msp-token";

/// Client against the mock server with a quick, deterministic retry schedule
pub fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), TOKEN, Duration::from_secs(5))
        .unwrap()
        .with_retry_config(RetryConfig {
            max_retries: 3,
            initial_backoff_ms: 5,
            backoff_factor: 2.0,
            max_backoff_ms: 20,
            add_jitter: false,
        })
}

pub fn fast_poll() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(10),
        timeout: Some(Duration::from_secs(5)),
        cancel: CancellationToken::new(),
    }
}

pub fn transaction(uid: &str, status: &str, entity_uid: Option<&str>) -> Value {
    json!({
        "transactionUid": uid,
        "entityUid": entity_uid,
        "cdoTransactionStatus": status,
        "transactionDetails": {},
    })
}

/// Serves the transaction as DONE on the first poll
pub async fn mount_done_transaction(server: &MockServer, uid: &str, entity_uid: Option<&str>) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/transactions/{}", uid)))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction(uid, "DONE", entity_uid)))
        .mount(server)
        .await;
}
