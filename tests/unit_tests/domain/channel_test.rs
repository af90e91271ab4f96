use scribeflow::domain::{Channel, ChannelStatus, EngineType};

#[test]
fn given_engine_codes_when_converting_then_catalogue_round_trips() {
    for code in 1..=9 {
        let engine = EngineType::from_code(code).unwrap();
        assert_eq!(engine.code(), code);
    }
    assert_eq!(EngineType::from_code(0), None);
    assert_eq!(EngineType::from_code(1), Some(EngineType::Whisper));
    assert_eq!(EngineType::from_code(6), Some(EngineType::Azure));
}

#[test]
fn given_comma_joined_list_when_parsing_then_blanks_are_dropped() {
    let parsed = Channel::parse_list(" mp3, wav,,m4a ,");
    assert_eq!(parsed, vec!["mp3", "wav", "m4a"]);
    assert_eq!(Channel::join_list(&parsed), "mp3,wav,m4a");
}

#[test]
fn given_channel_with_auto_language_when_matching_then_any_language_is_accepted() {
    let mut channel = Channel::new("c", EngineType::Whisper, "key");
    channel.supported_languages = vec!["auto".to_string()];

    assert!(channel.supports_language("fr"));
    assert!(channel.supports_language("zh"));
}

#[test]
fn given_auto_disabled_channel_when_checking_then_not_enabled() {
    let mut channel = Channel::new("c", EngineType::Whisper, "key");
    channel.status = ChannelStatus::AutoDisabled;
    assert!(!channel.is_enabled());
    assert_eq!(channel.status.as_str(), "auto_disabled");
}
