use std::sync::Arc;

use feedreply_core_types::{GenerationRequest, GenerationResult, PlatformVariant, Tone};
use feedreply_store::{PreferenceStore, Settings};
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::GenerationConfig;
use crate::errors::GenerationError;

/// Request body as the service expects it.
#[derive(Debug, Serialize)]
struct ReplyPayload<'a> {
    text: &'a str,
    tone: Tone,
    #[serde(rename = "emojiBool")]
    emoji_bool: bool,
}

impl<'a> From<&'a GenerationRequest> for ReplyPayload<'a> {
    fn from(request: &'a GenerationRequest) -> Self {
        Self {
            text: &request.text,
            tone: request.tone,
            emoji_bool: request.include_emojis,
        }
    }
}

pub struct GenerationClient {
    http: Client,
    config: GenerationConfig,
    store: Arc<dyn PreferenceStore>,
}

impl GenerationClient {
    pub fn new(
        config: GenerationConfig,
        store: Arc<dyn PreferenceStore>,
    ) -> Result<Self, GenerationError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|err| GenerationError::Client(err.to_string()))?;
        Ok(Self {
            http,
            config,
            store,
        })
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Reads credential and preferences for one activation. Fails before any
    /// page work happens when the store is unreachable or holds no credential.
    pub async fn session(
        &self,
        platform: PlatformVariant,
    ) -> Result<GenerationSession<'_>, GenerationError> {
        let settings = Settings::load(self.store.as_ref()).await?;
        let credential = settings
            .credential
            .clone()
            .ok_or(GenerationError::MissingCredential)?;
        Ok(GenerationSession {
            client: self,
            platform,
            credential,
            tone: settings.tone_for(platform),
            include_emojis: settings.emoji_enabled,
        })
    }

    /// One-shot form of [`GenerationClient::session`] followed by
    /// [`GenerationSession::generate`].
    pub async fn generate(
        &self,
        text: &str,
        platform: PlatformVariant,
    ) -> Result<GenerationResult, GenerationError> {
        self.session(platform).await?.generate(text).await
    }

    #[instrument(skip_all, fields(platform = %request.platform, tone = request.tone.as_str()))]
    async fn send(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, GenerationError> {
        let url = self.config.endpoint(request.platform)?;
        debug!(%url, chars = request.text.chars().count(), "requesting reply");

        let response = self
            .http
            .post(url)
            .bearer_auth(credential)
            .json(&ReplyPayload::from(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response unavailable>".to_string());
            warn!(status = status.as_u16(), body = %body, "generation request rejected");
            return Err(GenerationError::from_status(status.as_u16(), body));
        }

        let result: GenerationResult = response
            .json()
            .await
            .map_err(|err| GenerationError::Decode(err.to_string()))?;
        if result.reply.trim().is_empty() {
            return Err(GenerationError::EmptyReply);
        }
        match &result.usage {
            Some(usage) => info!(%usage, "reply generated"),
            None => info!("reply generated"),
        }
        Ok(result)
    }
}

/// Credential and preferences captured for one activation.
pub struct GenerationSession<'a> {
    client: &'a GenerationClient,
    platform: PlatformVariant,
    credential: String,
    tone: Tone,
    include_emojis: bool,
}

impl GenerationSession<'_> {
    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn include_emojis(&self) -> bool {
        self.include_emojis
    }

    pub async fn generate(&self, text: &str) -> Result<GenerationResult, GenerationError> {
        let request =
            GenerationRequest::new(text, self.tone, self.include_emojis, self.platform)
                .map_err(|_| GenerationError::EmptyText)?;
        self.client.send(&self.credential, &request).await
    }
}

impl std::fmt::Debug for GenerationSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationSession")
            .field("platform", &self.platform)
            .field("credential", &"<redacted>")
            .field("tone", &self.tone)
            .field("include_emojis", &self.include_emojis)
            .finish()
    }
}
