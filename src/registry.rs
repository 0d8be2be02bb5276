use std::any::{self, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::debug;

use crate::decision::AuthorizationResult;
use crate::handler::{AuthorizationHandler, DynHandler, FnHandler, TypedHandler};
use crate::requirement::Requirement;

/// Looks up the handlers registered for a concrete requirement type.
///
/// The evaluator requires exactly one handler per type; returning zero or
/// several is reported as a configuration error.
pub trait HandlerResolver: Send + Sync {
    fn resolve(&self, requirement: TypeId) -> Vec<Arc<dyn DynHandler>>;
}

/// In-memory [`HandlerResolver`] keyed by requirement [`TypeId`].
///
/// Handlers are registered once at setup and shared by every evaluation.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeId, Vec<Arc<dyn DynHandler>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for requirements of type `Q`.
    ///
    /// Registering a second handler for the same type is accepted here and
    /// rejected when such a requirement is evaluated.
    pub fn register<Q, H>(&mut self, handler: H) -> &mut Self
    where
        Q: Requirement,
        H: AuthorizationHandler<Q> + 'static,
    {
        debug!("Register authorization handler for '{}'", any::type_name::<Q>());
        self.handlers
            .entry(TypeId::of::<Q>())
            .or_default()
            .push(Arc::new(TypedHandler::<Q, H>::new(handler)));
        self
    }

    /// Registers a synchronous closure as the handler for `Q`.
    pub fn register_fn<Q, F>(&mut self, func: F) -> &mut Self
    where
        Q: Requirement,
        F: Fn(&Q) -> AuthorizationResult + Send + Sync + 'static,
    {
        self.register::<Q, _>(FnHandler::new(func))
    }

    pub fn contains<Q: Requirement>(&self) -> bool {
        self.handlers.contains_key(&TypeId::of::<Q>())
    }

    /// Number of requirement types with at least one handler.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl HandlerResolver for HandlerRegistry {
    fn resolve(&self, requirement: TypeId) -> Vec<Arc<dyn DynHandler>> {
        self.handlers.get(&requirement).cloned().unwrap_or_default()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("requirement_types", &self.handlers.len())
            .finish()
    }
}
