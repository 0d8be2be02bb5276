pub mod authorizer;
pub mod config;
pub mod decision;
pub mod error;
pub mod evaluator;
pub mod gate;
pub mod handler;
pub mod logs;
pub mod registry;
pub mod requirement;

pub use authorizer::Authorizer;
pub use decision::{AuthorizationDecision, AuthorizationResult, Denial};
pub use error::Error;
pub use evaluator::Evaluator;
pub use gate::Gate;
pub use handler::AuthorizationHandler;
pub use registry::{HandlerRegistry, HandlerResolver};
pub use requirement::{AnyRequirement, PolicyBuilder, Requirement, RequirementSet};

pub use tokio_util::sync::CancellationToken;
