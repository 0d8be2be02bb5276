use std::any::{self, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Marker for a single authorization rule that must hold for a request.
///
/// A requirement carries no behavior. The handler registered for its concrete
/// type decides whether it passes. Two requirements are the same rule when
/// they have the same type and compare equal.
pub trait Requirement: PartialEq + fmt::Debug + Send + Sync + 'static {}

trait DynRequirement: fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynRequirement) -> bool;
    fn type_name(&self) -> &'static str;
}

impl<T: Requirement> DynRequirement for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynRequirement) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

/// A type-erased requirement. Cloning is cheap, the value is shared.
#[derive(Clone)]
pub struct AnyRequirement(Arc<dyn DynRequirement>);

impl AnyRequirement {
    pub fn new<T: Requirement>(requirement: T) -> Self {
        Self(Arc::new(requirement))
    }

    /// The [`TypeId`] of the concrete requirement, used to resolve handlers.
    pub fn type_id(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    pub fn type_name(&self) -> &'static str {
        self.0.type_name()
    }

    pub fn downcast_ref<T: Requirement>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Requirement>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

impl PartialEq for AnyRequirement {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl fmt::Debug for AnyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

/// The distinct requirements that apply to one request.
///
/// The set is immutable once built. It keeps insertion order, which is the
/// iteration order used when reporting the first failure.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    requirements: Vec<AnyRequirement>,
}

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnyRequirement> {
        self.requirements.iter()
    }

    pub fn contains<T: Requirement>(&self, requirement: &T) -> bool {
        self.requirements
            .iter()
            .filter_map(|r| r.downcast_ref::<T>())
            .any(|r| r == requirement)
    }

    /// Adds every requirement of `other` not already present.
    pub fn merge(&mut self, other: &RequirementSet) {
        for requirement in other.iter() {
            self.insert(requirement.clone());
        }
    }

    fn insert(&mut self, requirement: AnyRequirement) -> bool {
        if self.requirements.contains(&requirement) {
            return false;
        }
        self.requirements.push(requirement);
        true
    }

    fn clear(&mut self) {
        self.requirements.clear();
    }
}

/// Two sets are equal when they hold the same requirements, in any order.
impl PartialEq for RequirementSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .requirements
                .iter()
                .all(|r| other.requirements.contains(r))
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a AnyRequirement;
    type IntoIter = std::slice::Iter<'a, AnyRequirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Collects requirements while an [`Authorizer`](crate::Authorizer) builds its
/// policy for a request.
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    requirements: RequirementSet,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a requirement. Adding an equal requirement again has no effect.
    pub fn use_requirement<T: Requirement>(&mut self, requirement: T) -> &mut Self {
        self.requirements.insert(AnyRequirement::new(requirement));
        self
    }

    /// Like [`use_requirement`](Self::use_requirement), `None` is ignored.
    pub fn use_optional_requirement<T: Requirement>(
        &mut self,
        requirement: Option<T>,
    ) -> &mut Self {
        if let Some(requirement) = requirement {
            self.use_requirement(requirement);
        }
        self
    }

    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    pub fn clear_requirements(&mut self) {
        self.requirements.clear();
    }

    pub fn build(self) -> RequirementSet {
        self.requirements
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct MustBeAuthenticated;

    impl Requirement for MustBeAuthenticated {}

    #[derive(Debug, PartialEq)]
    struct MustOwnCourse(u64);

    impl Requirement for MustOwnCourse {}

    #[derive(Debug, PartialEq)]
    struct MustBeEnrolled(u64);

    impl Requirement for MustBeEnrolled {}

    #[test]
    fn test_duplicate_requirement() {
        let mut builder = PolicyBuilder::new();
        builder.use_requirement(MustBeAuthenticated);
        builder.use_requirement(MustBeAuthenticated);
        assert_eq!(builder.requirements().len(), 1);

        builder.use_requirement(MustOwnCourse(1));
        builder.use_requirement(MustOwnCourse(1));
        builder.use_requirement(MustOwnCourse(2));
        assert_eq!(builder.requirements().len(), 3);
        assert!(builder.requirements().contains(&MustOwnCourse(2)));
        assert!(!builder.requirements().contains(&MustOwnCourse(3)));
    }

    #[test]
    fn test_same_payload_different_type() {
        let mut builder = PolicyBuilder::new();
        builder
            .use_requirement(MustOwnCourse(7))
            .use_requirement(MustBeEnrolled(7));

        let set = builder.build();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&MustOwnCourse(7)));
        assert!(set.contains(&MustBeEnrolled(7)));
    }

    #[test]
    fn test_optional_requirement() {
        let mut builder = PolicyBuilder::new();
        builder.use_optional_requirement::<MustBeAuthenticated>(None);
        assert!(builder.requirements().is_empty());

        builder.use_optional_requirement(Some(MustBeAuthenticated));
        builder.use_optional_requirement::<MustBeAuthenticated>(None);
        assert_eq!(builder.requirements().len(), 1);
    }

    #[test]
    fn test_clear_requirements() {
        let mut builder = PolicyBuilder::new();
        builder.use_requirement(MustBeAuthenticated);
        builder.use_requirement(MustOwnCourse(1));
        let first = builder.requirements().clone();

        builder.clear_requirements();
        assert!(builder.requirements().is_empty());

        builder.use_requirement(MustBeAuthenticated);
        builder.use_requirement(MustOwnCourse(1));
        assert_eq!(builder.build(), first);
    }

    #[test]
    fn test_insertion_order() {
        let mut builder = PolicyBuilder::new();
        builder
            .use_requirement(MustOwnCourse(3))
            .use_requirement(MustBeAuthenticated)
            .use_requirement(MustOwnCourse(1))
            .use_requirement(MustOwnCourse(3));

        let names: Vec<_> = builder
            .requirements()
            .iter()
            .map(|r| format!("{r:?}"))
            .collect();
        assert_eq!(
            names,
            vec!["MustOwnCourse(3)", "MustBeAuthenticated", "MustOwnCourse(1)"]
        );
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut left = PolicyBuilder::new();
        left.use_requirement(MustBeAuthenticated)
            .use_requirement(MustOwnCourse(1));
        let left = left.build();

        let mut right = PolicyBuilder::new();
        right
            .use_requirement(MustOwnCourse(1))
            .use_requirement(MustBeAuthenticated);
        let right = right.build();

        assert_eq!(left, right);

        let mut other = PolicyBuilder::new();
        other
            .use_requirement(MustOwnCourse(2))
            .use_requirement(MustBeAuthenticated);
        assert_ne!(left, other.build());
        assert_ne!(left, RequirementSet::new());
    }

    #[test]
    fn test_merge() {
        let mut left = PolicyBuilder::new();
        left.use_requirement(MustBeAuthenticated)
            .use_requirement(MustOwnCourse(1));
        let mut left = left.build();

        let mut right = PolicyBuilder::new();
        right
            .use_requirement(MustOwnCourse(1))
            .use_requirement(MustBeEnrolled(1));
        let right = right.build();

        left.merge(&right);
        assert_eq!(left.len(), 3);
        assert!(left.contains(&MustBeEnrolled(1)));
    }

    #[test]
    fn test_downcast() {
        let requirement = AnyRequirement::new(MustOwnCourse(42));
        assert!(requirement.is::<MustOwnCourse>());
        assert!(!requirement.is::<MustBeEnrolled>());
        assert_eq!(requirement.downcast_ref::<MustOwnCourse>().unwrap().0, 42);
        assert_eq!(requirement.type_id(), TypeId::of::<MustOwnCourse>());
        assert!(requirement.type_name().ends_with("MustOwnCourse"));
    }
}
