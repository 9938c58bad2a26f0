use thiserror::Error;

/// Why the credential could not be used.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthFailure {
    /// No credential in the store.
    Missing,
    /// The service rejected the credential (expired or revoked).
    Rejected,
}

/// Problems the user can fix by changing page context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UsageProblem {
    /// Nothing extractable in the content unit.
    NoText,
    /// No reply/comment input surface on the page.
    NoInput,
}

/// Failure taxonomy for one activation cycle. Every error raised inside a
/// cycle ends up here and is rendered on that control only.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ReplyError {
    #[error("settings store unavailable: {0}")]
    Configuration(String),
    #[error("authentication failed: {0:?}")]
    Auth(AuthFailure),
    #[error("usage limit reached: {0}")]
    Quota(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("usage error: {0:?}")]
    Usage(UsageProblem),
}

impl ReplyError {
    /// Short message shown in the control's status line.
    pub fn user_message(&self) -> String {
        match self {
            ReplyError::Configuration(_) => {
                "Extension storage is unavailable. Reload the page.".to_string()
            }
            ReplyError::Auth(AuthFailure::Missing) => "Please sign in first.".to_string(),
            ReplyError::Auth(AuthFailure::Rejected) => {
                "Session expired. Please sign in again.".to_string()
            }
            ReplyError::Quota(_) => "Usage limit reached. Upgrade to continue.".to_string(),
            ReplyError::Transport(detail) => format!("Error: {detail}"),
            ReplyError::Usage(UsageProblem::NoText) => "Could not extract post text.".to_string(),
            ReplyError::Usage(UsageProblem::NoInput) => {
                "Could not find the reply box. Click into it first.".to_string()
            }
        }
    }

    /// Credential problems additionally raise a blocking notice.
    pub fn requires_reauth(&self) -> bool {
        matches!(self, ReplyError::Auth(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReplyError::Configuration(_) => "configuration",
            ReplyError::Auth(_) => "auth",
            ReplyError::Quota(_) => "quota",
            ReplyError::Transport(_) => "transport",
            ReplyError::Usage(_) => "usage",
        }
    }
}
