use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::config::{EvaluationMode, EvaluatorConfig};
use crate::decision::{AuthorizationDecision, AuthorizationResult};
use crate::error::Error;
use crate::handler::DynHandler;
use crate::registry::HandlerResolver;
use crate::requirement::{AnyRequirement, RequirementSet};

/// Runs the handlers of a requirement set and folds their results into one
/// [`AuthorizationDecision`].
///
/// Every requirement is evaluated, a failure does not stop the others. Only
/// the first failure in set order provides the denial reason. The evaluator
/// holds no per-request state and can be shared between concurrent requests.
pub struct Evaluator {
    resolver: Arc<dyn HandlerResolver>,
    mode: EvaluationMode,
    timeout: Option<Duration>,
}

impl Evaluator {
    pub fn new(resolver: Arc<dyn HandlerResolver>) -> Self {
        Self {
            resolver,
            mode: EvaluationMode::Concurrent,
            timeout: None,
        }
    }

    /// Creates an evaluator from a completed [`EvaluatorConfig`].
    pub fn with_config(resolver: Arc<dyn HandlerResolver>, cfg: &EvaluatorConfig) -> Self {
        Self {
            resolver,
            mode: cfg.mode,
            timeout: cfg.timeout,
        }
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Evaluates `requirements`.
    ///
    /// # Returns
    /// * `Ok(decision)` - Every handler ran; the decision may be a denial
    /// * `Err(NoHandler | MultipleHandlers)` - Handler wiring is broken, no
    ///   handler was invoked
    /// * `Err(Handler | HandlerTimeout)` - A handler could not decide
    /// * `Err(Cancelled)` - `cancel` fired before every handler completed
    pub async fn evaluate(
        &self,
        requirements: &RequirementSet,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationDecision, Error> {
        if requirements.is_empty() {
            debug!("No requirements, authorization succeeded");
            return Ok(AuthorizationDecision::Succeeded);
        }

        let plan = self.resolve_handlers(requirements)?;
        debug!(
            "Evaluating {} requirement(s) in {:?} mode",
            plan.len(),
            self.mode
        );

        let results = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("Authorization cancelled");
                return Err(Error::Cancelled);
            }
            results = self.run_handlers(&plan, cancel) => results?,
        };

        let decision = AuthorizationDecision::aggregate(results);
        if let Some(denial) = decision.denial() {
            info!(
                "Authorization denied ({} of {} requirement(s) failed): {}",
                denial.failures(),
                plan.len(),
                denial.reason()
            );
        }

        Ok(decision)
    }

    fn resolve_handlers<'a>(
        &self,
        requirements: &'a RequirementSet,
    ) -> Result<Vec<(&'a AnyRequirement, Arc<dyn DynHandler>)>, Error> {
        let mut plan = Vec::with_capacity(requirements.len());
        for requirement in requirements {
            let mut handlers = self.resolver.resolve(requirement.type_id());
            let handler = match handlers.len() {
                1 => handlers.remove(0),
                0 => {
                    warn!("No handler registered for '{}'", requirement.type_name());
                    return Err(Error::NoHandler {
                        requirement: requirement.type_name(),
                    });
                }
                count => {
                    warn!(
                        "{count} handlers registered for '{}'",
                        requirement.type_name()
                    );
                    return Err(Error::MultipleHandlers {
                        requirement: requirement.type_name(),
                        count,
                    });
                }
            };
            plan.push((requirement, handler));
        }
        Ok(plan)
    }

    async fn run_handlers(
        &self,
        plan: &[(&AnyRequirement, Arc<dyn DynHandler>)],
        cancel: &CancellationToken,
    ) -> Result<Vec<AuthorizationResult>, Error> {
        match self.mode {
            EvaluationMode::Concurrent => {
                let invocations = plan
                    .iter()
                    .map(|(requirement, handler)| self.invoke(requirement, handler, cancel));
                join_all(invocations).await.into_iter().collect()
            }
            EvaluationMode::Sequential => {
                let mut results = Vec::with_capacity(plan.len());
                for (requirement, handler) in plan {
                    results.push(self.invoke(requirement, handler, cancel).await?);
                }
                Ok(results)
            }
        }
    }

    async fn invoke(
        &self,
        requirement: &AnyRequirement,
        handler: &Arc<dyn DynHandler>,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationResult, Error> {
        let name = requirement.type_name();
        let invocation = handler.handle_any(requirement, cancel);
        let result = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, invocation)
                .await
                .map_err(|_| Error::HandlerTimeout {
                    requirement: name,
                    timeout,
                })?,
            None => invocation.await,
        };

        let result = result.map_err(|source| Error::Handler {
            requirement: name,
            source,
        })?;
        debug!("Requirement {:?}: {:?}", requirement, result);
        Ok(result)
    }
}
