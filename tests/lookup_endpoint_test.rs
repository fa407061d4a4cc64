mod common;

use arcane_dca::datasource::{BridgeApi, PacketData, PacketPage, PacketQuery};
use arcane_dca::{MockBridge, MockNameService};
use axum::http::StatusCode;
use common::{setup_with, Collaborators, OWNER};
use serde_json::json;

fn packet(id: &str, source_chain: &str) -> PacketData {
    serde_json::from_value(json!({
        "packetId": id,
        "version": "1",
        "destinationAddress": OWNER,
        "sourceAddress": "0x00000000000000000000000000000000000000aa",
        "destinationChain": "6694886634403",
        "sourceChain": source_chain,
        "status": "completed",
        "timestamp": 1_700_000_000u64
    }))
    .unwrap()
}

fn collaborators() -> Collaborators {
    let page = PacketPage {
        total_items: 2,
        total_pages: 1,
        current_page: 1,
        data: vec![
            packet("p1", "28556963657430695"),
            packet("p2", "443067135441324596"),
        ],
    };
    Collaborators {
        names: MockNameService::new()
            .with_primary_name(OWNER, "alice.ans")
            .with_resolver("alice.ans", "avatar", "https://img.example/alice.png")
            .with_name_hash("42field", "alice.ans"),
        bridge: MockBridge::new().with_wallet_page(OWNER, page),
        ..Collaborators::default()
    }
}

#[tokio::test]
async fn test_ans_lookups() {
    let app = setup_with(collaborators()).await;

    let (status, body) = app.get(&format!("/v1/ans/primary/{}", OWNER)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "alice.ans");

    let (_, body) = app.get("/v1/ans/address/alice.ans").await;
    assert_eq!(body["address"], OWNER);

    let (_, body) = app.get("/v1/ans/hash/42field").await;
    assert_eq!(body["name"], "alice.ans");

    let (_, body) = app
        .get("/v1/ans/resolver?name=alice.ans&category=avatar")
        .await;
    assert_eq!(body["content"], "https://img.example/alice.png");
}

#[tokio::test]
async fn test_ans_unregistered_reads_as_null() {
    let app = setup_with(collaborators()).await;
    let other = format!("aleo1{}", "z".repeat(58));

    let (status, body) = app.get(&format!("/v1/ans/primary/{}", other)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["name"].is_null());

    let (_, body) = app.get("/v1/ans/hash/nothing").await;
    assert!(body.is_null());

    let (_, body) = app.get(&format!("/v1/ans/display/{}", other)).await;
    assert_eq!(body["display"], "aleo1z...zzzz");
    assert!(body["avatar"].is_null());
}

#[tokio::test]
async fn test_ans_display_prefers_name() {
    let app = setup_with(collaborators()).await;
    let (_, body) = app.get(&format!("/v1/ans/display/{}", OWNER)).await;
    assert_eq!(body["display"], "alice.ans");
    assert_eq!(body["avatar"], "https://img.example/alice.png");
}

#[tokio::test]
async fn test_bridge_status() {
    let app = setup_with(collaborators()).await;
    let (status, body) = app.get("/v1/bridge/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOperational"], true);
    assert_eq!(body["transferLimit"], "100000");
    assert_eq!(body["supportedTokens"], json!(["vUSDC", "vUSDT", "vETH"]));
}

#[tokio::test]
async fn test_bridge_packets_by_wallet_and_chain() {
    let app = setup_with(collaborators()).await;

    let (status, body) = app
        .get(&format!("/v1/bridge/packets?wallet={}&filter=completed", OWNER))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalItems"], 2);

    let (_, body) = app
        .get(&format!(
            "/v1/bridge/packets?wallet={}&chainId=443067135441324596",
            OWNER
        ))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["packetId"], "p2");

    let (_, body) = app.get("/v1/bridge/packets?chainId=1&page=4").await;
    assert_eq!(body["totalItems"], 0);
    assert_eq!(body["currentPage"], 4);
}

#[tokio::test]
async fn test_bridge_packets_need_a_key() {
    let app = setup_with(collaborators()).await;
    let (status, _) = app.get("/v1/bridge/packets").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.get("/v1/bridge/packets?chainId=1&filter=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bridge_transfer_payloads() {
    let app = setup_with(collaborators()).await;

    let (status, body) = app
        .post(
            "/v1/bridge/transfer",
            json!({
                "sourceChainId": "6694886634403",
                "destinationChainId": "28556963657430695",
                "tokenAddress": "vUSDC",
                "amount": "1000",
                "receiver": "0x00000000000000000000000000000000000000aa"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], "aleo");

    let (status, _) = app
        .post(
            "/v1/bridge/transfer",
            json!({
                "sourceChainId": "28556963657430695",
                "destinationChainId": "6694886634403",
                "tokenAddress": "ETH",
                "amount": "1000",
                "receiver": "0xnot-an-aleo-address"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test]
fn test_mock_bridge_defaults_to_empty_page() {
    let bridge = MockBridge::new();
    let page = tokio_test::block_on(bridge.packets_by_chain("1", &PacketQuery::default()));
    tokio_test::assert_ok!(&page);
    assert_eq!(page.unwrap(), PacketPage::empty(1));
}
