use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by authorization.
///
/// A denial is only an error once the caller asks for one through
/// [`AuthorizationDecision::into_result`](crate::AuthorizationDecision::into_result)
/// or a [`Gate`](crate::Gate). Everything else here is fatal for the request.
#[derive(Error, Debug)]
pub enum Error {
    /// One or more requirements failed
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Wiring defect, a requirement type has no handler
    #[error("no authorization handler registered for requirement '{requirement}'")]
    NoHandler { requirement: &'static str },

    /// Wiring defect, a requirement type has more than one handler
    #[error(
        "{count} authorization handlers registered for requirement '{requirement}', expected exactly one"
    )]
    MultipleHandlers {
        requirement: &'static str,
        count: usize,
    },

    /// A handler failed while computing its result
    #[error("authorization handler for requirement '{requirement}' failed")]
    Handler {
        requirement: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("authorization handler for requirement '{requirement}' timed out after {timeout:?}")]
    HandlerTimeout {
        requirement: &'static str,
        timeout: Duration,
    },

    #[error("authorization was cancelled")]
    Cancelled,
}

impl Error {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_))
    }

    /// Whether the error comes from handler registration rather than from the
    /// request itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::NoHandler { .. } | Error::MultipleHandlers { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
