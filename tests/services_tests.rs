mod common;

use scc_toolkit::models::{
    License, MspManagedTenant, UpgradeAsaDeviceInput, ZtpOnboardingInput,
};
use scc_toolkit::services::{
    CdFmcApiService, CliApiService, DeviceUpgradeApiService, InventoryApiService, MspApiService,
    TokenValidationService,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client, fast_poll, mount_done_transaction, transaction};

fn tenant() -> MspManagedTenant {
    MspManagedTenant {
        uid: "tenant-1".into(),
        name: "CDO_acme__42".into(),
        display_name: Some("Acme".into()),
        region: Some("us".into()),
    }
}

fn device(uid: &str, name: &str) -> serde_json::Value {
    json!({"uid": uid, "name": name, "softwareVersion": "7.4.1"})
}

#[tokio::test]
async fn inventory_collects_every_page() {
    let server = MockServer::start().await;
    let first_page: Vec<_> = (0..200).map(|i| device(&format!("d-{}", i), "edge")).collect();
    Mock::given(method("GET"))
        .and(path("/v1/inventory/devices"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", "200"))
        .and(query_param("q", "deviceType:ASA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 201, "limit": 200, "offset": 0, "items": first_page,
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/inventory/devices"))
        .and(query_param("offset", "200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 201, "limit": 200, "offset": 200, "items": [device("d-200", "edge")],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let devices = InventoryApiService::new(&api, fast_poll())
        .get_devices(Some("deviceType:ASA"))
        .await
        .unwrap();
    assert_eq!(devices.len(), 201);
    assert_eq!(devices[200].uid, "d-200");
}

#[tokio::test]
async fn ztp_onboarding_looks_the_device_up_by_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inventory/devices/ftds/ztp"))
        .and(body_partial_json(json!({"name": "edge-1", "serialNumber": "JAD1", "licenses": ["BASE"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction("tx-1", "PENDING", None)))
        .expect(1)
        .mount(&server)
        .await;
    mount_done_transaction(&server, "tx-1", None).await;
    Mock::given(method("GET"))
        .and(path("/v1/inventory/devices"))
        .and(query_param("q", "name:edge-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "items": [device("ftd-1", "edge-1")],
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let input = ZtpOnboardingInput {
        name: "edge-1".into(),
        serial_number: "JAD1".into(),
        admin_password: None,
        fmc_access_policy_uid: "policy".into(),
        device_group_uid: None,
        licenses: vec![License::Base],
    };
    let onboarded = InventoryApiService::new(&api, fast_poll())
        .onboard_ftd_ztp_device(&input)
        .await
        .unwrap();
    assert_eq!(onboarded.uid, "ftd-1");
}

#[tokio::test]
async fn tenant_token_requires_exactly_one_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/msp/tenants/tenant-1/users"))
        .and(query_param("q", "name:acme-api-only-user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "items": []})))
        .mount(&server)
        .await;

    let api = client(&server);
    let err = MspApiService::new(&api, fast_poll())
        .generate_managed_tenant_api_token(&tenant(), &tenant().default_api_user_name())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("acme-api-only-user"), "{}", err);
}

#[tokio::test]
async fn tenant_token_is_generated_for_the_found_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/msp/tenants/tenant-1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "items": [{"uid": "user-9", "name": "bot", "apiOnlyUser": true}],
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/msp/tenants/tenant-1/users/user-9/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"apiToken": "tenant-token"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let token = MspApiService::new(&api, fast_poll())
        .generate_managed_tenant_api_token(&tenant(), "bot")
        .await
        .unwrap();
    assert_eq!(token, "tenant-token");
}

#[tokio::test]
async fn created_tenant_is_fetched_after_transaction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/msp/tenants/create"))
        .and(body_json(json!({"tenantName": "acme", "displayName": "Acme"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction("tx-2", "PENDING", None)))
        .mount(&server)
        .await;
    mount_done_transaction(&server, "tx-2", Some("tenant-1")).await;
    Mock::given(method("GET"))
        .and(path("/v1/msp/tenants/tenant-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "tenant-1", "name": "CDO_acme", "displayName": "Acme", "region": "us",
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let created = MspApiService::new(&api, fast_poll())
        .create_tenant("acme", "Acme")
        .await
        .unwrap();
    assert_eq!(created.uid, "tenant-1");
}

#[tokio::test]
async fn cdfmc_wait_follows_the_tenant_transaction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/msp/tenants/tenant-1/cdfmc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction("msp-tx", "PENDING", None)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/transactions/msp-tx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "transactionUid": "msp-tx",
            "cdoTransactionStatus": "DONE",
            "transactionDetails": {"TRANSACTION_UID_IN_TARGET_TENANT": "tenant-tx"},
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/transactions/tenant-tx"))
        .and(header("authorization", "Bearer tenant-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction("tenant-tx", "DONE", None)))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    MspApiService::new(&api, fast_poll())
        .provision_cdfmc(&tenant(), Some("tenant-token"), true)
        .await
        .unwrap();
}

#[tokio::test]
async fn cli_error_message_fails_the_command() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inventory/devices/cli/execute"))
        .and(body_json(json!({"deviceUids": ["asa-1"], "script": "show version"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction("tx-3", "PENDING", None)))
        .mount(&server)
        .await;
    mount_done_transaction(&server, "tx-3", Some("cli-1")).await;
    Mock::given(method("GET"))
        .and(path("/v1/inventory/devices/cli/cli-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uid": "cli-1", "errorMsg": "ERROR: % Invalid input",
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let err = CliApiService::new(&api, fast_poll())
        .execute_command_and_get_result(&["asa-1".to_string()], "show version")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Invalid input"));
}

#[tokio::test]
async fn asa_upgrade_sends_only_selected_components() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/inventory/devices/asas/asa-1/upgrades/trigger"))
        .and(body_json(json!({"asdmVersion": "7.20.1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(transaction("tx-4", "PENDING", None)))
        .expect(1)
        .mount(&server)
        .await;
    mount_done_transaction(&server, "tx-4", Some("asa-1")).await;

    let api = client(&server);
    let upgrades = DeviceUpgradeApiService::new(&api, fast_poll());
    upgrades
        .upgrade_asa(
            "asa-1",
            &UpgradeAsaDeviceInput {
                software_version: None,
                asdm_version: Some("7.20.1".into()),
            },
        )
        .await
        .unwrap();

    assert!(upgrades
        .upgrade_asa("asa-1", &UpgradeAsaDeviceInput::default())
        .await
        .is_err());
}

#[tokio::test]
async fn ftd_versions_are_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/inventory/devices/ftds/ftd-1/upgrades/versions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "items": [
                {"softwareVersion": "7.4.2", "upgradePackageUid": "pkg-1", "isSuggestedVersion": true},
                {"softwareVersion": "7.6.0", "upgradePackageUid": "pkg-2"},
            ],
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let versions = DeviceUpgradeApiService::new(&api, fast_poll())
        .get_compatible_ftd_versions("ftd-1")
        .await
        .unwrap();
    let labels: Vec<_> = versions.iter().map(|v| v.display_label()).collect();
    assert_eq!(labels, vec!["7.4.2*", "7.6.0"]);
}

#[tokio::test]
async fn gambling_rule_targets_category_and_any_ipv4() {
    let server = MockServer::start().await;
    let domain = "/v1/cdfmc/api/fmc_config/v1/domain/dom-1";
    Mock::given(method("GET"))
        .and(path("/v1/inventory/managers"))
        .and(query_param("q", "deviceType:CDFMC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "items": [{"uid": "fmc-1", "name": "cdFMC", "fmcDomainUid": "dom-1"}],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/object/urlcategories", domain)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "Games", "id": "cat-1"}, {"name": "Gambling", "id": "cat-2"}],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/object/networks", domain)))
        .and(query_param("filter", "nameOrValue:any-ipv4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"name": "any-ipv4", "id": "net-1"}], "paging": {"count": 1},
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/policy/accesspolicies/pol-1/accessrules", domain)))
        .and(body_partial_json(json!({
            "name": "Block Gambling",
            "action": "BLOCK",
            "sourceNetworks": {"objects": [{"id": "net-1", "name": "any-ipv4"}]},
            "urls": {"urlCategoriesWithReputation": [
                {"reputation": "TRUSTED_AND_UNKNOWN", "category": {"id": "cat-2", "name": "Gambling"}}
            ]},
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "rule-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let cdfmc = CdFmcApiService::connect(&api).await.unwrap();
    assert_eq!(cdfmc.domain_uid(), "dom-1");
    let rule = cdfmc.block_gambling("pol-1").await.unwrap();
    assert_eq!(rule["id"], "rule-1");
}

#[tokio::test]
async fn rejected_token_is_reported_as_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/token"))
        .and(header("authorization", "Bearer good"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"valid": true})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let validator = TokenValidationService::new(Duration::from_secs(5));
    assert!(validator.validate_token(&server.uri(), "good").await.unwrap());
    assert!(!validator.validate_token(&server.uri(), "bad").await.unwrap());
}
