use feedreply_core_types::Tone;
use feedreply_store::{
    FileStore, PreferenceStore, Settings, StoreError, CREDENTIAL_KEY, EMOJI_KEY, TONE_KEY,
};
use serde_json::{json, Value};
use tempfile::TempDir;

#[tokio::test]
async fn missing_file_reads_as_empty() {
    let dir = TempDir::new().expect("tempdir");
    let store = FileStore::new(dir.path().join("prefs.json"));
    assert_eq!(store.get(CREDENTIAL_KEY).await.unwrap(), None);
    assert_eq!(Settings::load(&store).await.unwrap(), Settings::default());
}

#[tokio::test]
async fn writes_pretty_json_and_notifies() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("nested").join("prefs.json");
    let store = FileStore::new(&path);
    let mut rx = store.subscribe();

    store.set(CREDENTIAL_KEY, json!("tok-9")).await.unwrap();
    store.set(TONE_KEY, json!("value")).await.unwrap();
    store.set(EMOJI_KEY, json!(false)).await.unwrap();

    let written = std::fs::read_to_string(&path).expect("read store file");
    assert!(written.contains("\n  \"credential\": \"tok-9\""));
    let parsed: Value = serde_json::from_str(&written).unwrap();
    assert_eq!(parsed["toneSetting"], "value");

    assert_eq!(rx.recv().await.unwrap().key, CREDENTIAL_KEY);
    assert_eq!(rx.recv().await.unwrap().key, TONE_KEY);
    assert_eq!(rx.recv().await.unwrap().key, EMOJI_KEY);

    let settings = Settings::load(&store).await.unwrap();
    assert_eq!(settings.credential.as_deref(), Some("tok-9"));
    assert_eq!(settings.tone, Some(Tone::Value));
    assert!(!settings.emoji_enabled);
}

#[tokio::test]
async fn external_edits_are_seen_without_reload() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("prefs.json");
    let store = FileStore::new(&path);
    store.set(CREDENTIAL_KEY, json!("old")).await.unwrap();

    std::fs::write(&path, r#"{"credential": "rotated"}"#).unwrap();
    assert_eq!(
        store.get(CREDENTIAL_KEY).await.unwrap(),
        Some(json!("rotated"))
    );

    store.remove(CREDENTIAL_KEY).await.unwrap();
    assert!(!Settings::load(&store).await.unwrap().has_credential());
}

#[tokio::test]
async fn corrupt_file_is_malformed() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();
    let store = FileStore::new(&path);
    assert!(matches!(
        store.get(CREDENTIAL_KEY).await,
        Err(StoreError::Malformed(_))
    ));
}
