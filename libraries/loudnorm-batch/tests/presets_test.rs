//! Preset store tests

use loudnorm_batch::{Preset, PresetStore};
use loudnorm_core::{CompressorParams, NormalizerError};

fn podcast() -> Preset {
    Preset::new(
        CompressorParams {
            threshold_db: -18.0,
            ratio: 3.0,
            attack_ms: 10.0,
            release_ms: 100.0,
        },
        -1.5,
    )
}

#[test]
fn save_load_list_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path().join("presets"));
    assert!(store.list().unwrap().is_empty());

    store.save("podcast", &podcast()).unwrap();
    store.save("music", &Preset::default()).unwrap();
    std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();

    assert_eq!(store.list().unwrap(), vec!["music", "podcast"]);
    assert_eq!(store.load("podcast").unwrap(), podcast());

    store.delete("podcast").unwrap();
    assert_eq!(store.list().unwrap(), vec!["music"]);
    assert!(matches!(
        store.load("podcast"),
        Err(NormalizerError::PresetNotFound(_))
    ));
    assert!(matches!(
        store.delete("podcast"),
        Err(NormalizerError::PresetNotFound(_))
    ));
}

#[test]
fn file_format_uses_short_keys_and_four_space_indent() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path());
    let path = store.save("voice", &podcast()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\n    \"threshold\": -18.0"), "{text}");
    assert!(text.contains("\"peak_limit_target\": -1.5"));

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 5);
    for key in ["threshold", "ratio", "attack", "release", "peak_limit_target"] {
        assert!(keys.contains(&key), "missing {key}");
    }
}

#[test]
fn hand_written_preset_loads() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("legacy.json"),
        r#"{"threshold": -24, "ratio": 4, "attack": 1, "release": 200, "peak_limit_target": -2}"#,
    )
    .unwrap();

    let preset = PresetStore::new(dir.path()).load("legacy").unwrap();
    assert_eq!(preset.ratio, 4.0);
    assert_eq!(preset.peak_limit_dbfs, -2.0);
}

#[test]
fn invalid_values_are_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let store = PresetStore::new(dir.path());
    let mut preset = Preset::default();
    preset.ratio = 0.0;

    assert!(matches!(
        store.save("broken", &preset),
        Err(NormalizerError::Validation(_))
    ));
    assert!(store.list().unwrap().is_empty());
}
