use crate::*;

#[tokio::test]
async fn test_register_valid_batch() -> Result<()> {
    let (a, b) = (signer(1), signer(2));
    let relay = TestRelay::start("mainnet", &known(&[&a, &b])).await?;

    let regs = [registration(&a, relay.domain, 100), registration(&b, relay.domain, 100)];
    let (status, body) = relay.post("/eth/v1/builder/validators", batch(&regs)).await?;
    assert_eq!(status, 200);
    assert_eq!(json(&body), serde_json::json!({}));
    assert_eq!(relay.store.registration_count(), 2);

    let stored = relay
        .datastore
        .get_validator_registration(&regs[0].pubkey_hex())
        .await?
        .context("registration not stored")?;
    assert_eq!(stored, regs[0]);

    relay.stop().await
}

#[tokio::test]
async fn test_register_mixed_batch_still_200() -> Result<()> {
    let (a, b, c, stranger) = (signer(1), signer(2), signer(3), signer(9));
    let relay = TestRelay::start("mainnet", &known(&[&a, &b, &c])).await?;

    let mut tampered = registration(&b, relay.domain, 100);
    tampered.message.gas_limit = 1;

    let mut short_sig = registration(&c, relay.domain, 100);
    short_sig.signature = HexBytes::from(vec![0u8; 95]);

    let regs = [
        registration(&a, relay.domain, 100),
        tampered,
        short_sig,
        registration(&stranger, relay.domain, 100),
    ];
    let (status, _) = relay.post("/eth/v1/builder/validators", batch(&regs)).await?;
    assert_eq!(status, 200);

    // only the first entry is stored
    assert_eq!(relay.store.registration_count(), 1);
    let epoch = relay.stats.epoch_summary(0).context("epoch summary missing")?;
    assert_eq!(epoch.validator_registrations_total, 4);
    assert_eq!(epoch.validator_registrations_saved, 1);
    assert_eq!(epoch.validator_registrations_received_unverified, 3);
    assert_eq!(epoch.num_register_validator_requests, 1);

    relay.stop().await
}

#[tokio::test]
async fn test_register_signed_for_other_network_rejected() -> Result<()> {
    let a = signer(1);
    let relay = TestRelay::start("mainnet", &known(&[&a])).await?;
    let sepolia = NetworkDomain::resolve("sepolia")?.signing_domain;

    let (status, _) = relay
        .post("/eth/v1/builder/validators", batch(&[registration(&a, sepolia, 1)]))
        .await?;
    assert_eq!(status, 200);
    assert_eq!(relay.store.registration_count(), 0);

    relay.stop().await
}

#[tokio::test]
async fn test_register_last_write_wins_regardless_of_order() -> Result<()> {
    let a = signer(1);
    let relay = TestRelay::start("mainnet", &known(&[&a])).await?;

    let newer = registration(&a, relay.domain, 200);
    let older = registration(&a, relay.domain, 100);

    relay.post("/eth/v1/builder/validators", batch(&[newer.clone()])).await?;
    relay.post("/eth/v1/builder/validators", batch(&[older])).await?;

    let stored = relay
        .datastore
        .get_validator_registration(&newer.pubkey_hex())
        .await?
        .context("registration not stored")?;
    assert_eq!(stored.message.timestamp, 200);

    relay.stop().await
}

#[tokio::test]
async fn test_register_undecodable_body() -> Result<()> {
    let relay = TestRelay::start("mainnet", &[]).await?;

    let (status, body) = relay
        .post("/eth/v1/builder/validators", r#"[{"message": 1}]"#.to_string())
        .await?;
    assert_eq!(status, 400);
    assert_eq!(json(&body)["code"], 400);

    // bad fee recipient length is a decode error, not a per-entry skip
    let a = signer(1);
    let mut value = serde_json::to_value([registration(&a, relay.domain, 1)])?;
    value[0]["message"]["fee_recipient"] = Value::String("0x1234".into());
    let (status, _) = relay
        .post("/eth/v1/builder/validators", value.to_string())
        .await?;
    assert_eq!(status, 400);

    relay.stop().await
}

#[tokio::test]
async fn test_validator_becomes_known_after_refresh() -> Result<()> {
    let a = signer(1);
    let relay =
        TestRelay::start_with_interval("mainnet", &[], Duration::from_millis(200)).await?;

    let reg = registration(&a, relay.domain, 1);
    relay.post("/eth/v1/builder/validators", batch(&[reg.clone()])).await?;
    assert_eq!(relay.store.registration_count(), 0);

    relay.store.replace_known_validators(&known(&[&a])).await?;

    let mut attempts = 0;
    while !relay.datastore.is_known_validator(&reg.pubkey_hex()) {
        attempts += 1;
        anyhow::ensure!(attempts < 50, "refresher never picked up the validator");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    relay.post("/eth/v1/builder/validators", batch(&[reg])).await?;
    assert_eq!(relay.store.registration_count(), 1);

    relay.stop().await
}
