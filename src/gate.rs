use std::future::Future;
use std::sync::Arc;

use log::debug;
use tokio_util::sync::CancellationToken;

use crate::authorizer::Authorizer;
use crate::decision::AuthorizationDecision;
use crate::error::Error;
use crate::evaluator::Evaluator;
use crate::requirement::RequirementSet;

/// Authorization step placed in front of the processing of requests of
/// type `R`.
///
/// The gate holds every authorizer registered for the request type. Their
/// requirement sets are merged, so a requirement declared by two authorizers
/// is still evaluated once.
pub struct Gate<R: ?Sized> {
    authorizers: Vec<Arc<dyn Authorizer<R>>>,
    evaluator: Arc<Evaluator>,
}

impl<R: ?Sized> Gate<R> {
    pub fn new(evaluator: Arc<Evaluator>) -> Self {
        Self {
            authorizers: Vec::new(),
            evaluator,
        }
    }

    pub fn with_authorizer<A>(mut self, authorizer: A) -> Self
    where
        A: Authorizer<R> + 'static,
    {
        self.authorizers.push(Arc::new(authorizer));
        self
    }

    pub fn with_shared_authorizer(mut self, authorizer: Arc<dyn Authorizer<R>>) -> Self {
        self.authorizers.push(authorizer);
        self
    }

    /// The distinct requirements of every authorizer for `request`.
    pub fn policy(&self, request: &R) -> RequirementSet {
        let mut requirements = RequirementSet::new();
        for authorizer in self.authorizers.iter() {
            requirements.merge(&authorizer.policy(request));
        }
        requirements
    }

    pub async fn authorize(
        &self,
        request: &R,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationDecision, Error> {
        let requirements = self.policy(request);
        debug!(
            "Built policy with {} requirement(s) from {} authorizer(s)",
            requirements.len(),
            self.authorizers.len()
        );
        self.evaluator.evaluate(&requirements, cancel).await
    }

    /// Authorizes `request`, then runs `next` only if it was allowed.
    ///
    /// A denial is returned as [`Error::Unauthorized`] and `next` is never
    /// called.
    pub async fn run<F, Fut, T>(
        &self,
        request: &R,
        cancel: &CancellationToken,
        next: F,
    ) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.authorize(request, cancel).await?.into_result()?;
        Ok(next().await)
    }
}
