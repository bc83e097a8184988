//! Integration tests for settings and chat preferences

use assis::preferences::{ChatPreferences, MODEL_OPTIONS, TEMPERATURE_KEY};
use assis::AssisError;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use serde_json::json;

mod common;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct WindowLayout {
    sidebar_width: u32,
    collapsed: bool,
    pinned: Vec<i64>,
}

#[test]
fn test_setting_round_trip_for_structured_value() {
    let (store, _tmp) = common::create_temp_store();
    let layout = WindowLayout {
        sidebar_width: 320,
        collapsed: false,
        pinned: vec![3, 1, 4],
    };

    store.save_setting("layout", &layout).unwrap();
    let loaded: WindowLayout = store
        .get_setting(
            "layout",
            WindowLayout {
                sidebar_width: 0,
                collapsed: true,
                pinned: vec![],
            },
        )
        .unwrap();
    assert_eq!(loaded, layout);
}

#[test]
fn test_missing_key_returns_exact_default() {
    let (store, _tmp) = common::create_temp_store();
    let default = json!({"any": ["shape", 1]});
    let loaded: serde_json::Value = store.get_setting("absent", default.clone()).unwrap();
    assert_eq!(loaded, default);
}

#[test]
fn test_stored_null_is_not_treated_as_missing() {
    let (store, _tmp) = common::create_temp_store();
    store.save_setting("nullable", &serde_json::Value::Null).unwrap();
    let loaded: serde_json::Value = store.get_setting("nullable", json!("default")).unwrap();
    assert_eq!(loaded, serde_json::Value::Null);
}

#[test]
fn test_corrupted_row_surfaces_corrupt_setting() {
    let (store, _tmp) = common::create_temp_store();
    let conn = Connection::open(store.db_path()).unwrap();
    conn.execute(
        "INSERT INTO settings (key, value) VALUES (?1, ?2)",
        params![TEMPERATURE_KEY, "0.7.1"],
    )
    .unwrap();

    let err = store.get_setting(TEMPERATURE_KEY, 0.7_f32).unwrap_err();
    match err.downcast_ref::<AssisError>() {
        Some(AssisError::CorruptSetting { key, .. }) => assert_eq!(key, TEMPERATURE_KEY),
        other => panic!("expected CorruptSetting, got {:?}", other),
    }

    let prefs_err = ChatPreferences::load(&store).unwrap_err();
    assert!(matches!(
        prefs_err.downcast_ref::<AssisError>(),
        Some(AssisError::CorruptSetting { .. })
    ));
}

#[test]
fn test_preferences_persist_across_store_instances() {
    let (store, tmp) = common::create_temp_store();
    let prefs = ChatPreferences {
        model: MODEL_OPTIONS[2].to_string(),
        temperature: 0.3,
        max_tokens: 512,
        preset: "Project Mentor".to_string(),
    };
    prefs.save(&store).unwrap();
    drop(store);

    let reopened = assis::ConversationStore::new_with_path(tmp.path().join("assis.db")).unwrap();
    assert_eq!(ChatPreferences::load(&reopened).unwrap(), prefs);
}

#[test]
fn test_settings_survive_conversation_deletes() {
    let (store, _tmp) = common::create_temp_store();
    store.save_setting("model", MODEL_OPTIONS[0]).unwrap();
    let id = store.create_conversation(None).unwrap();
    store.delete_conversation(id).unwrap();

    let model: String = store.get_setting("model", String::new()).unwrap();
    assert_eq!(model, MODEL_OPTIONS[0]);
}
