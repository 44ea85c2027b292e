//! Wire-contract tests for the Vault backend against a mocked KV v2 API.
//!
//! These verify the parts of the backend a live Vault would otherwise hide:
//! the percent-encoding of logical keys into paths (including on delete),
//! the `secret_data` envelope, 404 mapping, and list decoding.

use serde_json::json;
use strongroom::errors::Error;
use strongroom::secrets::backends::vault::{VaultBackendConfig, VaultSecretBackend};
use strongroom::secrets::{SecretBackend, SecretWrite};
use wiremock::matchers::{body_partial_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> VaultSecretBackend {
    VaultSecretBackend::new(VaultBackendConfig {
        address: server.uri(),
        token: Some("test-token".to_string()),
        namespace: None,
        kv_mount_path: "secret".to_string(),
    })
    .unwrap()
}

fn kv2_read_body(secret_data: serde_json::Value) -> serde_json::Value {
    json!({
        "request_id": "5c29ff3b-8a9c-4a7e-b7f0-000000000000",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "data": { "secret_data": secret_data },
            "metadata": {
                "created_time": "2026-08-30T12:00:00.000000Z",
                "custom_metadata": null,
                "deletion_time": "",
                "destroyed": false,
                "version": 1
            }
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

fn kv2_write_body() -> serde_json::Value {
    json!({
        "request_id": "7b1607c6-2731-4c36-a0cc-000000000000",
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": {
            "created_time": "2026-08-30T12:00:01.000000Z",
            "custom_metadata": null,
            "deletion_time": "",
            "destroyed": false,
            "version": 2
        },
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

fn not_found_body() -> serde_json::Value {
    json!({ "errors": [] })
}

#[tokio::test]
async fn read_fetches_the_encoded_path_and_unwraps_secret_data() {
    let server = MockServer::start().await;

    // "foo/bar" must hit secret/foo%2Fbar, one node, not a folder
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/foo%2Fbar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv2_read_body(json!({
            "value": "aHVudGVyMg==",
            "creator_id": 7,
            "updater_id": 9,
            "created_at": "2026-08-29T08:00:00Z",
            "updated_at": "2026-08-30T09:30:00Z"
        }))))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let record = backend.read("foo/bar").await.unwrap();

    assert_eq!(record.key, "foo/bar");
    assert_eq!(record.value.unwrap().expose_secret(), b"hunter2");
    assert_eq!(record.creator_id, 7);
    assert_eq!(record.updater_id, 9);
}

#[tokio::test]
async fn read_of_absent_path_maps_to_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/secret/data/absent%2Fkey"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend.read("absent/key").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn write_stores_record_under_secret_data_at_the_encoded_path() {
    let server = MockServer::start().await;

    // No existing node: creator comes from the writing user
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/foo%2Fbar"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/secret/data/foo%2Fbar"))
        .and(body_partial_json(json!({
            "data": { "secret_data": { "value": "aHVudGVyMg==", "creator_id": 5, "updater_id": 5 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv2_write_body()))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let ok = backend.write("foo/bar", &SecretWrite::new("hunter2", 5)).await.unwrap();
    assert!(ok);
}

#[tokio::test]
async fn overwrite_preserves_creator_and_reassigns_updater() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/secret/data/foo%2Fbar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv2_read_body(json!({
            "value": "b2xk",
            "creator_id": 1,
            "updater_id": 1,
            "created_at": "2026-08-29T08:00:00Z",
            "updated_at": "2026-08-29T08:00:00Z"
        }))))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/secret/data/foo%2Fbar"))
        .and(body_partial_json(json!({
            "data": { "secret_data": {
                "creator_id": 1,
                "updater_id": 2,
                "created_at": "2026-08-29T08:00:00Z"
            } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv2_write_body()))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let ok = backend.write("foo/bar", &SecretWrite::new("new-value", 2)).await.unwrap();
    assert!(ok);
}

#[tokio::test]
async fn keys_lists_the_mount_and_decodes_each_entry() {
    let server = MockServer::start().await;

    Mock::given(method("LIST"))
        .and(path_regex("^/v1/secret/metadata/?$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "request_id": "0f1a0f37-0000-0000-0000-000000000000",
            "lease_id": "",
            "renewable": false,
            "lease_duration": 0,
            "data": { "keys": ["foo%2Fbar", "global%2Fapi-token"] },
            "wrap_info": null,
            "warnings": null,
            "auth": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let keys = backend.keys().await.unwrap();
    assert_eq!(keys, vec!["foo/bar", "global/api-token"]);
}

#[tokio::test]
async fn keys_of_an_empty_mount_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("LIST"))
        .and(path_regex("^/v1/secret/metadata/?$"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert!(backend.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_targets_the_encoded_path() {
    let server = MockServer::start().await;

    // Delete goes through the same key encoding as read and write
    Mock::given(method("DELETE"))
        .and(path("/v1/secret/metadata/foo%2Fbar"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    backend.delete("foo/bar").await.unwrap();
}

#[tokio::test]
async fn delete_of_absent_path_is_a_no_op() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/v1/secret/metadata/gone%2Fkey"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found_body()))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    backend.delete("gone/key").await.unwrap();
}
