use feedreply_core_types::{AuthFailure, ReplyError, UsageProblem};
use feedreply_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no credential stored")]
    MissingCredential,

    #[error("credential rejected: {body}")]
    Unauthorized { body: String },

    #[error("usage limit reached: {body}")]
    QuotaExceeded { body: String },

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error("service returned an empty reply")]
    EmptyReply,

    #[error("nothing to reply to")]
    EmptyText,

    #[error("no endpoint for this page")]
    UnsupportedPlatform,

    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl GenerationError {
    /// Classifies a non-success status: 401 is an auth failure, 402 a quota
    /// failure, anything else a transport failure.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => GenerationError::Unauthorized { body },
            402 => GenerationError::QuotaExceeded { body },
            _ => GenerationError::Status { status, body },
        }
    }
}

impl From<GenerationError> for ReplyError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Store(err) => err.into(),
            GenerationError::MissingCredential => ReplyError::Auth(AuthFailure::Missing),
            GenerationError::Unauthorized { .. } => ReplyError::Auth(AuthFailure::Rejected),
            GenerationError::QuotaExceeded { body } => ReplyError::Quota(body),
            GenerationError::EmptyText => ReplyError::Usage(UsageProblem::NoText),
            GenerationError::Status { status, .. } => {
                ReplyError::Transport(format!("server returned {status}"))
            }
            GenerationError::Network(err) if err.is_timeout() => {
                ReplyError::Transport("request timed out".to_string())
            }
            GenerationError::Network(_) => {
                ReplyError::Transport("could not reach the server".to_string())
            }
            other => ReplyError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification_is_fixed() {
        let cases = [
            (401, "auth"),
            (402, "quota"),
            (400, "transport"),
            (403, "transport"),
            (429, "transport"),
            (500, "transport"),
            (503, "transport"),
        ];
        for (status, kind) in cases {
            let err: ReplyError = GenerationError::from_status(status, String::new()).into();
            assert_eq!(err.kind(), kind, "status {status}");
        }
        assert_eq!(
            ReplyError::from(GenerationError::from_status(401, "expired".into())),
            ReplyError::Auth(AuthFailure::Rejected)
        );
    }

    #[test]
    fn store_failures_stay_configuration_errors() {
        let err: ReplyError =
            GenerationError::Store(StoreError::Unavailable("gone".into())).into();
        assert_eq!(err.kind(), "configuration");
        assert_eq!(
            ReplyError::from(GenerationError::MissingCredential),
            ReplyError::Auth(AuthFailure::Missing)
        );
    }
}
