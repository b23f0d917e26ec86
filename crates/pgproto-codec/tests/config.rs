use pgproto_codec::FramerConfig;
use pgproto_codec::config::{DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_MESSAGE_SIZE};

#[test]
fn load_partial_config_from_json() {
    let cfg: FramerConfig = serde_json::from_str(r#"{ "max_message_size": 1048576 }"#).unwrap();
    assert_eq!(cfg.max_message_size, 1_048_576);
    assert_eq!(cfg.initial_capacity, DEFAULT_INITIAL_CAPACITY);
}

#[test]
fn empty_object_gives_defaults() {
    let cfg: FramerConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(cfg, FramerConfig::default());
    assert_eq!(cfg.max_message_size, DEFAULT_MAX_MESSAGE_SIZE);
}

#[test]
fn nested_in_application_config() {
    #[derive(serde::Deserialize)]
    struct AppConfig {
        database_url: String,
        #[serde(default)]
        framer: FramerConfig,
    }

    let app: AppConfig = serde_json::from_str(
        r#"{ "database_url": "postgres://localhost/app", "framer": { "initial_capacity": 512 } }"#,
    )
    .unwrap();
    assert_eq!(app.database_url, "postgres://localhost/app");
    assert_eq!(app.framer.initial_capacity, 512);
}

#[test]
fn serializes_back() {
    let cfg = FramerConfig::new().max_message_size(64);
    let json = serde_json::to_value(&cfg).unwrap();
    assert_eq!(json["max_message_size"], 64);
}
