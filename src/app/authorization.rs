use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use reqgate::{
    AuthorizationHandler, AuthorizationResult, Authorizer, CancellationToken, PolicyBuilder,
    Requirement,
};

use super::session::SessionStore;

/// The request may only be processed for a signed-in user.
#[derive(Debug, PartialEq)]
pub struct MustBeAuthenticated;

impl Requirement for MustBeAuthenticated {}

pub struct MustBeAuthenticatedHandler {
    session: Arc<SessionStore>,
}

impl MustBeAuthenticatedHandler {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl AuthorizationHandler<MustBeAuthenticated> for MustBeAuthenticatedHandler {
    async fn handle(
        &self,
        _requirement: &MustBeAuthenticated,
        _cancel: &CancellationToken,
    ) -> Result<AuthorizationResult> {
        if self.session.is_authenticated() {
            return Ok(AuthorizationResult::succeed());
        }

        Ok(AuthorizationResult::fail("You must be logged in."))
    }
}

/// Requires a signed-in user for every request of type `R`.
pub struct GlobalAuthorizer<R: ?Sized> {
    _request: PhantomData<fn(&R)>,
}

impl<R: ?Sized> GlobalAuthorizer<R> {
    pub fn new() -> Self {
        Self {
            _request: PhantomData,
        }
    }
}

impl<R: ?Sized> Default for GlobalAuthorizer<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ?Sized> Authorizer<R> for GlobalAuthorizer<R> {
    fn build_policy(&self, _request: &R, policy: &mut PolicyBuilder) {
        policy.use_requirement(MustBeAuthenticated);
    }
}
