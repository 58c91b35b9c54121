use crate::*;

#[tokio::test]
async fn test_relay_status() -> Result<()> {
    let (a, b) = (signer(1), signer(2));
    let relay = TestRelay::start("sepolia", &known(&[&a, &b])).await?;

    let (status, body) = relay.get("/relay/v1/status").await?;
    assert_eq!(status, 200);
    let body = json(&body);
    assert_eq!(body["network"], "sepolia");
    assert_eq!(body["ready"], true);
    assert_eq!(body["known_validators"]["count"], 2);
    assert_eq!(
        body["signing_domain"],
        NetworkDomain::resolve("sepolia")?.signing_domain_hex()
    );

    relay.stop().await
}

#[tokio::test]
async fn test_epoch_stats_follow_requests() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let (status, _) = relay.get("/relay/v1/stats/epochs/3").await?;
    assert_eq!(status, 404);

    let path = format!(
        "/eth/v1/builder/header/100/0x{}/0x{}",
        "0".repeat(64),
        "0".repeat(96)
    );
    relay.get(&path).await?;
    relay.get(&path).await?;

    let (status, body) = relay.get("/relay/v1/stats/epochs/3").await?;
    assert_eq!(status, 200);
    let body = json(&body);
    assert_eq!(body["epoch"], 3);
    assert_eq!(body["slot_first"], 96);
    assert_eq!(body["slot_last"], 127);
    assert_eq!(body["num_get_header_requests"], 2);
    assert_eq!(body["num_header_sent_204"], 2);
    assert_eq!(body["is_complete"], false);

    let (status, body) = relay.get("/relay/v1/stats/slots/100").await?;
    assert_eq!(status, 200);
    assert_eq!(json(&body)["proposer_pubkey"], format!("0x{}", "0".repeat(96)));

    relay.stop().await
}

#[tokio::test]
async fn test_rejected_header_keeps_epoch_stats() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let valid = format!(
        "/eth/v1/builder/header/100/0x{}/0x{}",
        "0".repeat(64),
        "0".repeat(96)
    );
    relay.get(&valid).await?;
    let (status, _) = relay
        .get(&format!("/eth/v1/builder/header/{}/0x/0x", u64::MAX))
        .await?;
    assert_eq!(status, 400);

    let (status, body) = relay.get("/relay/v1/stats/epochs/3").await?;
    assert_eq!(status, 200);
    assert_eq!(json(&body)["num_get_header_requests"], 2);
    assert_eq!(relay.stats.current_epoch(), 3);

    relay.stop().await
}

#[tokio::test]
async fn test_server_stops_on_shutdown() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;
    let url = relay.url("/eth/v1/builder/status");
    relay.stop().await?;

    let result = reqwest::Client::new()
        .get(url)
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(result.is_err(), "server still answering after shutdown");
    Ok(())
}
