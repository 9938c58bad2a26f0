//! Preference store the engine reads credentials and reply settings from.
//!
//! The engine never writes here; a companion sign-in flow owns `credential`
//! and a settings surface owns the rest. Values can change at any moment, so
//! callers load [`Settings`] fresh for every activation and never cache them.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use feedreply_core_types::{PlatformVariant, ReplyError, Tone};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

mod file;

pub use file::FileStore;

pub const CREDENTIAL_KEY: &str = "credential";
pub const TONE_KEY: &str = "toneSetting";
pub const EMOJI_KEY: &str = "emojiEnabled";

const CHANGE_CAPACITY: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("preference store unavailable: {0}")]
    Unavailable(String),
    #[error("preference store i/o failed: {0}")]
    Io(String),
    #[error("malformed preference store: {0}")]
    Malformed(String),
}

impl From<StoreError> for ReplyError {
    fn from(err: StoreError) -> Self {
        ReplyError::Configuration(err.to_string())
    }
}

/// A key written or removed by some collaborator.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StoreChange {
    pub key: String,
    pub value: Option<Value>,
}

/// Asynchronous key-value store with change notification.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    async fn remove(&self, key: &str) -> Result<(), StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}

/// Typed view of the three keys the engine cares about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Settings {
    #[serde(skip_serializing)]
    pub credential: Option<String>,
    pub tone: Option<Tone>,
    pub emoji_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credential: None,
            tone: None,
            emoji_enabled: true,
        }
    }
}

impl Settings {
    /// Reads every key once. A blank credential counts as absent, an
    /// unrecognised tone as unset, and a missing emoji flag as enabled.
    pub async fn load(store: &dyn PreferenceStore) -> Result<Self, StoreError> {
        let credential = store
            .get(CREDENTIAL_KEY)
            .await?
            .and_then(|value| value.as_str().map(str::trim).map(str::to_string))
            .filter(|token| !token.is_empty());

        let tone = match store.get(TONE_KEY).await? {
            Some(Value::String(raw)) => match raw.parse::<Tone>() {
                Ok(tone) => Some(tone),
                Err(reason) => {
                    debug!(%reason, "ignoring stored tone");
                    None
                }
            },
            _ => None,
        };

        let emoji_enabled = store
            .get(EMOJI_KEY)
            .await?
            .and_then(|value| value.as_bool())
            .unwrap_or(true);

        Ok(Self {
            credential,
            tone,
            emoji_enabled,
        })
    }

    /// Stored tone, or the platform's default when none is stored.
    pub fn tone_for(&self, platform: PlatformVariant) -> Tone {
        self.tone.unwrap_or_else(|| Tone::default_for(platform))
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

/// Process-local store backed by a concurrent map.
pub struct MemoryStore {
    values: DashMap<String, Value>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            values: DashMap::new(),
            changes,
        }
    }

    /// Builder-style insert for fixtures; does not notify.
    pub fn with(self, key: &str, value: Value) -> Self {
        self.values.insert(key.to_string(), value);
        self
    }

    pub fn shared(self) -> Arc<dyn PreferenceStore> {
        Arc::new(self)
    }

    fn notify(&self, key: &str, value: Option<Value>) {
        // Nobody listening is normal.
        let _ = self.changes.send(StoreChange {
            key: key.to_string(),
            value,
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.clone());
        self.notify(key, Some(value));
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        if self.values.remove(key).is_some() {
            self.notify(key, None);
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

/// Stands in for an execution context with no store access at all.
pub struct UnavailableStore {
    reason: String,
    changes: broadcast::Sender<StoreChange>,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(1);
        Self {
            reason: reason.into(),
            changes,
        }
    }
}

#[async_trait]
impl PreferenceStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn defaults_when_empty() {
        let store = MemoryStore::new();
        let settings = Settings::load(&store).await.unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.emoji_enabled);
        assert_eq!(settings.tone_for(PlatformVariant::ProfessionalFeed), Tone::Value);
        assert_eq!(settings.tone_for(PlatformVariant::Microblog), Tone::Funny);
    }

    #[tokio::test]
    async fn reads_typed_values() {
        let store = MemoryStore::new()
            .with(CREDENTIAL_KEY, json!("  tok-123 "))
            .with(TONE_KEY, json!("funny"))
            .with(EMOJI_KEY, json!(false));
        let settings = Settings::load(&store).await.unwrap();
        assert_eq!(settings.credential.as_deref(), Some("tok-123"));
        assert_eq!(settings.tone_for(PlatformVariant::ProfessionalFeed), Tone::Funny);
        assert!(!settings.emoji_enabled);
    }

    #[tokio::test]
    async fn tolerates_junk_values() {
        let store = MemoryStore::new()
            .with(CREDENTIAL_KEY, json!("   "))
            .with(TONE_KEY, json!("sarcastic"))
            .with(EMOJI_KEY, json!("yes"));
        let settings = Settings::load(&store).await.unwrap();
        assert!(!settings.has_credential());
        assert_eq!(settings.tone, None);
        assert!(settings.emoji_enabled);
    }

    #[tokio::test]
    async fn changes_are_broadcast() {
        let store = MemoryStore::new();
        let mut rx = store.subscribe();
        store.set(CREDENTIAL_KEY, json!("tok")).await.unwrap();
        store.remove(CREDENTIAL_KEY).await.unwrap();
        store.remove(CREDENTIAL_KEY).await.unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreChange {
                key: CREDENTIAL_KEY.into(),
                value: Some(json!("tok"))
            }
        );
        assert_eq!(rx.recv().await.unwrap().value, None);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unavailable_store_is_a_configuration_error() {
        let store = UnavailableStore::new("extension context invalidated");
        let err = Settings::load(&store).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(matches!(
            ReplyError::from(err),
            ReplyError::Configuration(_)
        ));
    }
}
