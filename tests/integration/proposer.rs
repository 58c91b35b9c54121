use crate::*;

const ZERO_HASH_DIGITS: usize = 64;
const ZERO_PUBKEY_DIGITS: usize = 96;

fn header_path(slot: &str, hash_digits: usize, pubkey_digits: usize) -> String {
    format!(
        "/eth/v1/builder/header/{slot}/0x{}/0x{}",
        "0".repeat(hash_digits),
        "0".repeat(pubkey_digits)
    )
}

fn blinded_block(sig_bytes: usize) -> String {
    serde_json::json!({
        "message": {
            "slot": "123",
            "proposer_index": "7",
            "parent_root": format!("0x{}", hex::encode([0u8; 32])),
            "state_root": format!("0x{}", hex::encode([0u8; 32])),
            "body": { "graffiti": format!("0x{}", hex::encode([0u8; 32])) }
        },
        "signature": format!("0x{}", hex::encode(vec![0u8; sig_bytes])),
    })
    .to_string()
}

#[tokio::test]
async fn test_get_header_without_bid_is_no_content() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let (status, body) = relay
        .get(&header_path("123", ZERO_HASH_DIGITS, ZERO_PUBKEY_DIGITS))
        .await?;
    assert_eq!(status, 204);
    assert!(body.is_empty(), "204 must not carry a body: {body:?}");

    relay.stop().await
}

#[tokio::test]
async fn test_get_header_slot_checked_before_everything() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    for path in [
        header_path("abc", ZERO_HASH_DIGITS, ZERO_PUBKEY_DIGITS),
        header_path("abc", 1, 1),
        header_path("1.5", ZERO_HASH_DIGITS, ZERO_PUBKEY_DIGITS),
        header_path("+123", ZERO_HASH_DIGITS, ZERO_PUBKEY_DIGITS),
    ] {
        let (status, body) = relay.get(&path).await?;
        assert_eq!(status, 400, "{path}");
        assert_eq!(json(&body), serde_json::json!({"code": 400, "message": "invalid slot"}));
    }

    relay.stop().await
}

#[tokio::test]
async fn test_get_header_pubkey_checked_before_hash() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    // 90-character pubkey, malformed hash: pubkey wins
    let (status, body) = relay.get(&header_path("123", 2, 88)).await?;
    assert_eq!(status, 400);
    assert_eq!(json(&body)["message"], "invalid pubkey");

    let (status, body) = relay
        .get(&header_path("123", ZERO_HASH_DIGITS + 2, ZERO_PUBKEY_DIGITS))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(json(&body)["message"], "invalid hash");

    relay.stop().await
}

#[tokio::test]
async fn test_get_header_requires_hex() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let path = format!("/eth/v1/builder/header/1/0x{}/0x{}", "z".repeat(64), "z".repeat(96));
    let (status, body) = relay.get(&path).await?;
    assert_eq!(status, 400);
    assert_eq!(json(&body)["message"], "invalid pubkey");

    let path = format!("/eth/v1/builder/header/1/0x{}/0x{}", "z".repeat(64), "0".repeat(96));
    let (status, body) = relay.get(&path).await?;
    assert_eq!(status, 400);
    assert_eq!(json(&body)["message"], "invalid hash");

    relay.stop().await
}

#[tokio::test]
async fn test_get_payload_short_signature() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let (status, body) = relay
        .post("/eth/v1/builder/blinded_blocks", blinded_block(95))
        .await?;
    assert_eq!(status, 400);
    assert_eq!(json(&body), serde_json::json!({"code": 400, "message": "invalid signature"}));

    relay.stop().await
}

#[tokio::test]
async fn test_get_payload_well_formed() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let (status, body) = relay
        .post("/eth/v1/builder/blinded_blocks", blinded_block(96))
        .await?;
    assert_eq!(status, 200);
    assert_eq!(json(&body), serde_json::json!({}));

    let slot = relay.stats.slot_summary(123).context("slot summary missing")?;
    assert_eq!(slot.num_get_payload_requests, 1);
    assert_eq!(slot.num_payload_sent, 1);

    relay.stop().await
}

#[tokio::test]
async fn test_get_payload_undecodable() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let (status, body) = relay
        .post("/eth/v1/builder/blinded_blocks", "not json".to_string())
        .await?;
    assert_eq!(status, 400);
    let body = json(&body);
    assert_eq!(body["code"], 400);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));

    relay.stop().await
}

#[tokio::test]
async fn test_builder_status() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let (status, body) = relay.get("/eth/v1/builder/status").await?;
    assert_eq!(status, 200);
    assert_eq!(json(&body), serde_json::json!({}));

    relay.stop().await
}
