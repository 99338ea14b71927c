use stagekit_settings::{MovementSettings, SettingsError, WiggleSettings};
use tempfile::TempDir;

fn custom_settings() -> MovementSettings {
    MovementSettings {
        speed_xy: 750.0,
        speed_z: 35.5,
        acceleration_xy: 1200.0,
        z_lift: 42.0,
        min_fiber_distance: 150.0,
        wiggle: WiggleSettings {
            distance: 250.0,
            speed: 500.0,
            pause_ms: 100,
        },
    }
}

#[test]
fn test_save_and_load_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("movement.json");

    custom_settings().save_to_file(&path).unwrap();
    let loaded = MovementSettings::load_from_file(&path).unwrap();
    assert_eq!(loaded, custom_settings());
}

#[test]
fn test_save_and_load_toml_in_new_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("movement.toml");

    custom_settings().save_to_file(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("[wiggle]"));

    let loaded = MovementSettings::load_from_file(&path).unwrap();
    assert_eq!(loaded, custom_settings());
}

#[test]
fn test_load_rejects_invalid_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("movement.json");
    std::fs::write(&path, r#"{"speed_xy": -5.0}"#).unwrap();

    let err = MovementSettings::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::InvalidSetting { ref key, .. } if key == "speed_xy"));
}

#[test]
fn test_load_reports_malformed_document() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("movement.toml");
    std::fs::write(&path, "speed_xy = [").unwrap();

    let err = MovementSettings::load_from_file(&path).unwrap_err();
    assert!(matches!(err, SettingsError::TomlError(_)));
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = MovementSettings::load_from_file(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, SettingsError::LoadError(_)));
}

#[test]
fn test_save_refuses_invalid_settings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("movement.json");
    let mut settings = custom_settings();
    settings.z_lift = -1.0;

    assert!(settings.save_to_file(&path).is_err());
    assert!(!path.exists());
}
