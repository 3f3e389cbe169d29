use std::collections::HashSet;

use crate::models::SliceAction;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The caller of a store operation, as resolved by whatever authenticated it.
pub trait Principal: Send + Sync {
    /// The identity slices are owned by.
    fn identity(&self) -> &str;

    /// Returns true if the caller may perform `action`.
    fn has_permission(&self, action: SliceAction) -> bool;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A principal with a fixed set of permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPrincipal {
    identity: String,
    permissions: HashSet<SliceAction>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl StaticPrincipal {
    /// Creates a principal that may perform the given actions.
    pub fn new(
        identity: impl Into<String>,
        permissions: impl IntoIterator<Item = SliceAction>,
    ) -> Self {
        Self {
            identity: identity.into(),
            permissions: permissions.into_iter().collect(),
        }
    }

    /// A regular user: may create slices and delete the ones it owns.
    pub fn user(identity: impl Into<String>) -> Self {
        Self::new(
            identity,
            [SliceAction::CreateSlice, SliceAction::DeleteOwnSlice],
        )
    }

    /// A local operator allowed to do everything.
    pub fn operator(identity: impl Into<String>) -> Self {
        Self::new(
            identity,
            [
                SliceAction::CreateSlice,
                SliceAction::DeleteOwnSlice,
                SliceAction::DeleteAnySlice,
                SliceAction::ViewAllSlices,
            ],
        )
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Principal for StaticPrincipal {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn has_permission(&self, action: SliceAction) -> bool {
        self.permissions.contains(&action)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_principal_permissions() {
        let user = StaticPrincipal::user("alice");
        assert_eq!(user.identity(), "alice");
        assert!(user.has_permission(SliceAction::CreateSlice));
        assert!(user.has_permission(SliceAction::DeleteOwnSlice));
        assert!(!user.has_permission(SliceAction::DeleteAnySlice));
        assert!(!user.has_permission(SliceAction::ViewAllSlices));

        let operator = StaticPrincipal::operator("root");
        assert!(operator.has_permission(SliceAction::ViewAllSlices));

        let viewer = StaticPrincipal::new("auditor", []);
        assert!(!viewer.has_permission(SliceAction::CreateSlice));
    }
}
