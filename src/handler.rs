use std::any;
use std::marker::PhantomData;

use anyhow::{bail, Result};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::decision::AuthorizationResult;
use crate::requirement::{AnyRequirement, Requirement};

/// Decides whether requirements of type `Q` hold.
///
/// A failed requirement is reported as [`AuthorizationResult::Failed`]. An
/// `Err` means the handler could not decide at all (missing configuration, a
/// session store that is down, ...) and is propagated to the caller as is.
#[async_trait]
pub trait AuthorizationHandler<Q: Requirement>: Send + Sync {
    async fn handle(
        &self,
        requirement: &Q,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationResult>;
}

/// Object-safe form of [`AuthorizationHandler`], as stored in a
/// [`HandlerRegistry`](crate::HandlerRegistry).
#[async_trait]
pub trait DynHandler: Send + Sync {
    async fn handle_any(
        &self,
        requirement: &AnyRequirement,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationResult>;
}

pub(crate) struct TypedHandler<Q, H> {
    handler: H,
    _requirement: PhantomData<fn(&Q)>,
}

impl<Q, H> TypedHandler<Q, H> {
    pub(crate) fn new(handler: H) -> Self {
        Self {
            handler,
            _requirement: PhantomData,
        }
    }
}

#[async_trait]
impl<Q, H> DynHandler for TypedHandler<Q, H>
where
    Q: Requirement,
    H: AuthorizationHandler<Q>,
{
    async fn handle_any(
        &self,
        requirement: &AnyRequirement,
        cancel: &CancellationToken,
    ) -> Result<AuthorizationResult> {
        let Some(typed) = requirement.downcast_ref::<Q>() else {
            bail!(
                "handler for '{}' received requirement '{}'",
                any::type_name::<Q>(),
                requirement.type_name()
            );
        };
        self.handler.handle(typed, cancel).await
    }
}

/// Handler backed by a synchronous closure, for rules that need no I/O.
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<Q, F> AuthorizationHandler<Q> for FnHandler<F>
where
    Q: Requirement,
    F: Fn(&Q) -> AuthorizationResult + Send + Sync,
{
    async fn handle(
        &self,
        requirement: &Q,
        _cancel: &CancellationToken,
    ) -> Result<AuthorizationResult> {
        Ok((self.func)(requirement))
    }
}
