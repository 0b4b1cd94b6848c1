#![cfg(feature = "ledger")]
#![allow(clippy::unwrap_used, reason = "tests can panic on unwrap")]

use std::time::Duration;

use httpmock::Method::GET;
use httpmock::MockServer;
use keeta_rfq_client::error::Kind;
use keeta_rfq_client::ledger::types::ChainRequest;
use keeta_rfq_client::ledger::{Client, Config};
use reqwest::StatusCode;
use serde_json::json;

const ACCOUNT: &str = "keeta_aabmakerwallet";

fn client(server: &MockServer) -> Client {
    Client::new(&server.base_url(), Config::default()).unwrap()
}

#[tokio::test]
async fn history_should_succeed() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = client(&server);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/ledger/v1/accounts/{ACCOUNT}/history"));
        then.status(StatusCode::OK).json_body(json!({
            "history": [{
                "id": "staple-1",
                "timestamp": "2026-10-19T12:00:00Z",
                "blocks": [{
                    "hash": "B1",
                    "account": ACCOUNT,
                    "date": 1_792_400_000_000_i64,
                    "operations": [
                        { "type": "SEND", "to": "keeta_aabtakerwallet", "token": "keeta_anethtoken", "amount": "5000" }
                    ]
                }]
            }]
        }));
    });

    let response = client.history(ACCOUNT).await?;

    assert_eq!(response.history.len(), 1);
    let operations: Vec<_> = response.operations().collect();
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].kind, "SEND");
    assert_eq!(operations[0].amount, Some(5000));
    mock.assert();

    Ok(())
}

#[tokio::test]
async fn history_should_time_out() -> anyhow::Result<()> {
    let server = MockServer::start();
    let config = Config::builder()
        .history_timeout(Duration::from_millis(50))
        .build();
    let client = Client::new(&server.base_url(), config)?;

    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/ledger/v1/accounts/{ACCOUNT}/history"));
        then.status(StatusCode::OK)
            .delay(Duration::from_millis(500))
            .json_body(json!({ "history": [] }));
    });

    let err = client.history(ACCOUNT).await.unwrap_err();

    assert_eq!(err.kind(), Kind::Timeout);
    assert!(err.to_string().contains("ledger history"), "{err}");

    Ok(())
}

#[tokio::test]
async fn empty_shapes_should_succeed() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = client(&server);

    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/ledger/v1/accounts/{ACCOUNT}/operations"));
        then.status(StatusCode::OK).json_body(json!({ "operations": [] }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/ledger/v1/accounts/{ACCOUNT}/balance"));
        then.status(StatusCode::OK).json_body(json!({}));
    });

    assert!(client.operations(ACCOUNT).await?.operations.is_empty(), "no operations");
    assert!(client.balance(ACCOUNT).await?.balances.is_empty(), "no balances");

    Ok(())
}

#[tokio::test]
async fn chain_should_pass_paging() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = client(&server);

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/ledger/v1/accounts/{ACCOUNT}/chain"))
            .query_param("startBlock", "B9")
            .query_param("limit", "2");
        then.status(StatusCode::OK).json_body(json!({
            "blocks": [
                { "hash": "B8", "account": ACCOUNT, "previous": "B7", "date": "2026-10-19T12:00:00Z" },
                { "hash": "B7", "account": ACCOUNT, "date": "2026-10-19T11:00:00Z" }
            ],
            "nextCursor": "B6"
        }));
    });

    let request = ChainRequest::builder().start_block("B9").limit(2).build();
    let response = client.chain(ACCOUNT, &request).await?;

    assert_eq!(response.blocks.len(), 2);
    assert_eq!(response.blocks[0].previous.as_deref(), Some("B7"));
    assert!(response.blocks[1].operations.is_empty(), "operations default to empty");
    assert_eq!(response.next_cursor.as_deref(), Some("B6"));
    mock.assert();

    Ok(())
}

#[tokio::test]
async fn balance_failure_should_return_status() -> anyhow::Result<()> {
    let server = MockServer::start();
    let client = client(&server);

    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/ledger/v1/accounts/{ACCOUNT}/balance"));
        then.status(StatusCode::BAD_GATEWAY);
    });

    let err = client.balance(ACCOUNT).await.unwrap_err();

    assert_eq!(err.kind(), Kind::Status);
    Ok(())
}
