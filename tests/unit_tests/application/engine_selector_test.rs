use std::sync::Arc;

use scribeflow::application::services::{EngineSelector, SelectionError, pick_channel};
use scribeflow::domain::{Channel, ChannelStatus, EngineType};
use scribeflow::infrastructure::persistence::InMemoryChannelRepository;

fn channel(name: &str, weight: i32, languages: &[&str], formats: &[&str]) -> Channel {
    let mut channel = Channel::new(name, EngineType::Whisper, "key");
    channel.weight = weight;
    channel.supported_languages = languages.iter().map(|s| s.to_string()).collect();
    channel.supported_formats = formats.iter().map(|s| s.to_string()).collect();
    channel
}

#[test]
fn given_weights_five_twenty_twenty_when_picking_then_first_heaviest_wins() {
    let channels = vec![
        channel("light", 5, &["en"], &["mp3"]),
        channel("heavy-a", 20, &["en"], &["mp3"]),
        channel("heavy-b", 20, &["en"], &["mp3"]),
    ];

    let picked = pick_channel(&channels, "en", "mp3").unwrap();

    assert_eq!(picked.name, "heavy-a");
}

#[test]
fn given_disabled_heavier_channel_when_picking_then_enabled_one_is_used() {
    let mut heavy = channel("heavy", 50, &["en"], &["mp3"]);
    heavy.status = ChannelStatus::AutoDisabled;
    let channels = vec![heavy, channel("light", 1, &["en"], &["mp3"])];

    let picked = pick_channel(&channels, "en", "mp3").unwrap();

    assert_eq!(picked.name, "light");
}

#[test]
fn given_mismatched_language_or_format_when_picking_then_none() {
    let channels = vec![channel("en-only", 10, &["en"], &["mp3"])];

    assert!(pick_channel(&channels, "fr", "mp3").is_none());
    assert!(pick_channel(&channels, "en", "wav").is_none());
}

#[test]
fn given_auto_language_channel_when_picking_for_any_language_then_matches() {
    let channels = vec![channel("any", 10, &["auto"], &["wav"])];
    assert!(pick_channel(&channels, "ja", "wav").is_some());
}

#[tokio::test]
async fn given_no_channels_when_selecting_then_engine_unavailable() {
    let selector = EngineSelector::new(Arc::new(InMemoryChannelRepository::new()));

    let result = selector.select("en", "mp3").await;

    let error = result.unwrap_err();
    assert!(matches!(error, SelectionError::EngineUnavailable { .. }));
    assert_eq!(error.code(), "ENGINE_UNAVAILABLE");
}

#[tokio::test]
async fn given_repository_channels_when_selecting_then_returns_owned_copy() {
    let repo = InMemoryChannelRepository::with_channels(vec![
        channel("a", 1, &["en"], &["mp3"]),
        channel("b", 9, &["en"], &["mp3"]),
    ]);
    let selector = EngineSelector::new(Arc::new(repo));

    let picked = selector.select("en", "mp3").await.unwrap();

    assert_eq!(picked.name, "b");
}
