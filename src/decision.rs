use crate::error::Error;

/// Outcome of a single requirement handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    /// The requirement holds
    Succeeded,
    /// The requirement does not hold, with a reason shown to the caller
    Failed(String),
}

impl AuthorizationResult {
    pub fn succeed() -> Self {
        Self::Succeeded
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Succeeded => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

/// The reason a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denial {
    reason: String,
    failures: usize,
}

impl Denial {
    /// Reason of the first failed requirement, in requirement set order.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Number of requirements that failed in the evaluation.
    pub fn failures(&self) -> usize {
        self.failures
    }
}

/// Aggregate of all requirement results for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationDecision {
    Succeeded,
    Denied(Denial),
}

impl AuthorizationDecision {
    /// Folds per-requirement results into one decision. The first failure in
    /// iteration order provides the reason, later failures are only counted.
    pub fn aggregate<I>(results: I) -> Self
    where
        I: IntoIterator<Item = AuthorizationResult>,
    {
        let mut first_reason = None;
        let mut failures = 0;
        for result in results {
            let AuthorizationResult::Failed(reason) = result else {
                continue;
            };
            failures += 1;
            if first_reason.is_none() {
                first_reason = Some(reason);
            }
        }

        match first_reason {
            Some(reason) => Self::Denied(Denial { reason, failures }),
            None => Self::Succeeded,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Succeeded => None,
            Self::Denied(denial) => Some(denial),
        }
    }

    /// Converts a denial into [`Error::Unauthorized`], for callers that
    /// propagate with `?`.
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            Self::Succeeded => Ok(()),
            Self::Denied(denial) => Err(Error::Unauthorized(denial.reason)),
        }
    }
}
