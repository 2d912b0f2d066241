mod support;

use serde_json::json;
use support::{FakeGameClient, connect_relay, next_relay_json, send_frame, spawn_radar, test_settings};

async fn current_page(radar_addr: &str) -> String {
    reqwest::get(format!("http://{radar_addr}/page"))
        .await
        .expect("page request")
        .text()
        .await
        .expect("page body")
}

#[tokio::test]
async fn when_map_is_selected_then_relay_mirrors_events_and_page_flips() {
    let feed = FakeGameClient::bind().await;
    let radar = spawn_radar(test_settings(&feed.url, None)).await;
    let mut relay = connect_relay(&radar).await;
    let mut socket = feed.accept().await;

    assert_eq!(current_page(&radar).await, "waiting");

    send_frame(
        &mut socket,
        r#"{"provider": {}, "map": {"name": "de_dust2"}, "round": {"phase": "freezetime"}}"#,
    )
    .await;

    assert_eq!(
        next_relay_json(&mut relay).await,
        json!({"type": "connection", "data": {"status": "up"}})
    );
    assert_eq!(
        next_relay_json(&mut relay).await,
        json!({"type": "map", "data": "de_dust2"})
    );
    assert_eq!(next_relay_json(&mut relay).await, json!({"type": "pageUpdate"}));
    assert_eq!(
        next_relay_json(&mut relay).await,
        json!({"type": "round", "data": "freezetime"})
    );
    // Settle repeat of the same page change.
    assert_eq!(next_relay_json(&mut relay).await, json!({"type": "pageUpdate"}));

    assert_eq!(current_page(&radar).await, "map");
}

#[tokio::test]
async fn when_lobby_follows_a_map_then_page_returns_to_waiting() {
    let feed = FakeGameClient::bind().await;
    let radar = spawn_radar(test_settings(&feed.url, None)).await;
    let mut relay = connect_relay(&radar).await;
    let mut socket = feed.accept().await;

    send_frame(&mut socket, r#"{"map": {"name": "de_train"}}"#).await;
    send_frame(&mut socket, r#"{"round": {"phase": "over"}}"#).await;

    let mut types = Vec::new();
    while types.len() < 7 {
        let message = next_relay_json(&mut relay).await;
        types.push(message["type"].as_str().unwrap_or_default().to_string());
    }

    assert_eq!(types.iter().filter(|t| *t == "pageUpdate").count(), 4);
    assert_eq!(
        types.iter().filter(|t| *t != "pageUpdate").collect::<Vec<_>>(),
        ["map", "in_lobby", "round"]
    );
    assert_eq!(current_page(&radar).await, "waiting");
}
