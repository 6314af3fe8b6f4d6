/*
[INPUT]:  Mock HTTP responses
[OUTPUT]: Test results for the wallet directory client
[POS]:    Integration tests - HTTP endpoints
[UPDATE]: When the listing endpoint changes
*/

mod common;

use std::str::FromStr;

use common::setup_mock_server;
use pumpdash_feed::{
    ClientConfig, DashboardStore, FeedError, HttpWalletDirectory, WalletDirectory, WalletGroup,
};
use rust_decimal::Decimal;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[test]
fn test_directory_creation() {
    let directory = assert_ok!(HttpWalletDirectory::new("http://127.0.0.1:8000"));
    assert_eq!(
        directory.list_url().as_str(),
        "http://127.0.0.1:8000/wallets/list/"
    );
}

#[test]
fn test_directory_rejects_bad_base_url() {
    let err = assert_err!(HttpWalletDirectory::with_config(
        "::not a url::",
        "/wallets/list/",
        ClientConfig::default()
    ));
    assert!(matches!(err, FeedError::UrlParse(_)));
}

#[tokio::test]
async fn test_list_wallets_parses_listing() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/api/wallets/list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "address": "DevAddr", "group": "dev", "name": "dev", "sol_balance": 2.5, "token_balance": 0 },
            { "address": "G1Addr", "group": "group1", "name": "g1_0", "sol_balance": 0.1, "token_balance": 1500 },
            { "address": "ArchAddr", "group": "archive", "name": "old" }
        ])))
        .mount(&server)
        .await;

    let directory = assert_ok!(HttpWalletDirectory::with_config(
        &server.uri(),
        "/api/wallets/list/",
        ClientConfig::default()
    ));
    let wallets = assert_ok!(directory.list_wallets().await);

    assert_eq!(wallets.len(), 3);
    assert_eq!(wallets[0].group, WalletGroup::Dev);
    assert_eq!(wallets[0].sol_balance, Decimal::from_str("2.5").unwrap());
    assert_eq!(wallets[1].token_balance, Decimal::from_str("1500").unwrap());
    assert_eq!(wallets[2].group, WalletGroup::Archive);
    assert_eq!(wallets[2].sol_balance, Decimal::ZERO);
}

#[tokio::test]
async fn test_load_into_replaces_store_wallets() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/wallets/list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "address": "FundAddr", "group": "fund", "name": "fund" }
        ])))
        .mount(&server)
        .await;

    let store = DashboardStore::new();
    let directory = assert_ok!(HttpWalletDirectory::new(&server.uri()));
    let count = assert_ok!(directory.load_into(&store).await);

    assert_eq!(count, 1);
    assert_eq!(store.wallet("fund").unwrap().address, "FundAddr");
}

#[tokio::test]
async fn test_server_error_is_invalid_response() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/wallets/list/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let directory = assert_ok!(HttpWalletDirectory::new(&server.uri()));
    let err = assert_err!(directory.list_wallets().await);
    match err {
        FeedError::InvalidResponse { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("Expected InvalidResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unexpected_body_is_serialization_error() {
    let server = setup_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/wallets/list/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "wallets": []
        })))
        .mount(&server)
        .await;

    let directory = assert_ok!(HttpWalletDirectory::new(&server.uri()));
    let err = assert_err!(directory.list_wallets().await);
    assert!(matches!(err, FeedError::Serialization(_)));
}
