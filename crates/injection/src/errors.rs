use feedreply_core_types::{ReplyError, UsageProblem};
use feedreply_page_dom::{DomError, NodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InjectionError {
    #[error("no input surface found")]
    NoSurface,
    #[error("input surface {0} left the document")]
    Detached(NodeId),
    #[error("document write failed: {0}")]
    Dom(#[from] DomError),
}

impl From<InjectionError> for ReplyError {
    fn from(_: InjectionError) -> Self {
        // Whatever went wrong, the user's remedy is the same: put the reply
        // box on screen and try again.
        ReplyError::Usage(UsageProblem::NoInput)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_failure_asks_for_an_input_box() {
        for err in [
            InjectionError::NoSurface,
            InjectionError::Detached(NodeId(4)),
            InjectionError::Dom(DomError::UnknownNode(NodeId(4))),
        ] {
            assert_eq!(
                ReplyError::from(err),
                ReplyError::Usage(UsageProblem::NoInput)
            );
        }
    }
}
