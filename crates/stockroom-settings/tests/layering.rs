use std::path::Path;

use figment::Jail;
use pretty_assertions::assert_eq;
use stockroom_settings::{LogFormat, SettingsError, load_settings_from_path};

#[test]
fn missing_file_yields_defaults() {
    Jail::expect_with(|_jail| {
        let settings = load_settings_from_path(Path::new("absent.json")).expect("defaults load");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.logging.format, LogFormat::Compact);
        Ok(())
    });
}

#[test]
fn file_overrides_defaults_per_key() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "settings.json",
            r#"{"server": {"port": 9100}, "events": {"keepalive_secs": 5}}"#,
        )?;
        let settings = load_settings_from_path(Path::new("settings.json")).expect("file loads");
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.events.keepalive_secs, 5);
        assert_eq!(settings.events.subscriber_buffer, 64);
        Ok(())
    });
}

#[test]
fn env_beats_file() {
    Jail::expect_with(|jail| {
        jail.create_file("settings.json", r#"{"server": {"port": 9100}}"#)?;
        jail.set_env("STOCKROOM_SERVER__PORT", "9200");
        jail.set_env("STOCKROOM_LOGGING__FORMAT", "json");
        jail.set_env("STOCKROOM_DATABASE__PATH", "/data/stock.db");
        let settings = load_settings_from_path(Path::new("settings.json")).expect("env loads");
        assert_eq!(settings.server.port, 9200);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.database.path, Path::new("/data/stock.db"));
        Ok(())
    });
}

#[test]
fn invalid_values_are_rejected() {
    Jail::expect_with(|jail| {
        jail.set_env("STOCKROOM_DATABASE__POOL_SIZE", "0");
        let err = load_settings_from_path(Path::new("absent.json")).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue(_)));
        Ok(())
    });
}

#[test]
fn malformed_json_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file("settings.json", "{not json")?;
        let err = load_settings_from_path(Path::new("settings.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Figment(_)));
        Ok(())
    });
}
