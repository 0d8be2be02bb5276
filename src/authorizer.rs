use crate::requirement::{PolicyBuilder, RequirementSet};

/// Trait that declares which requirements apply to a request of type `R`.
///
/// Implementers only add requirements to the builder. The decision itself is
/// made by the handlers registered for those requirements. The trait is
/// thread-safe and can be shared across requests.
pub trait Authorizer<R: ?Sized>: Send + Sync {
    /// Adds the requirements that must hold for `request`.
    ///
    /// # Arguments
    /// * `request` - The request about to be processed
    /// * `policy` - The builder collecting requirements, empty on every call
    ///   made through [`Authorizer::policy`]
    fn build_policy(&self, request: &R, policy: &mut PolicyBuilder);

    /// Builds the requirement set for `request` from a clean builder.
    fn policy(&self, request: &R) -> RequirementSet {
        let mut builder = PolicyBuilder::new();
        self.build_policy(request, &mut builder);
        builder.build()
    }
}
