//! Ownership trait for user-owned resources.
//!
//! Tickets are owned by their purchaser. Handlers combine the ownership check
//! with a role capability so that staff can act on tickets they do not own.
//!
//! # Example
//!
//! ```ignore
//! ticket.check_access(&actor, Capability::CancelAnyTicket)?;
//! ```

use super::{AuthenticatedUser, Capability, DomainError, ErrorCode, UserId};

/// Trait for aggregates that have a single owner.
pub trait OwnedByUser {
    /// Returns the ID of the user who owns this resource.
    fn owner_id(&self) -> &UserId;

    /// Returns `true` if `user_id` matches `owner_id()`.
    fn is_owner(&self, user_id: &UserId) -> bool {
        self.owner_id() == user_id
    }

    /// Succeeds if the actor owns the resource or holds the capability.
    ///
    /// Returns a `Forbidden` domain error otherwise.
    fn check_access(
        &self,
        actor: &AuthenticatedUser,
        capability: Capability,
    ) -> Result<(), DomainError> {
        if self.is_owner(&actor.id) || actor.role.can(capability) {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::Forbidden,
                "User does not own this resource",
            )
            .with_detail("owner_id", self.owner_id().to_string())
            .with_detail("requested_by", actor.id.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Role;

    struct Owned(UserId);

    impl OwnedByUser for Owned {
        fn owner_id(&self) -> &UserId {
            &self.0
        }
    }

    #[test]
    fn owner_is_granted() {
        let owner = UserId::new();
        let resource = Owned(owner);
        let actor = AuthenticatedUser::new(owner, Role::User);
        assert!(resource.check_access(&actor, Capability::CancelAnyTicket).is_ok());
    }

    #[test]
    fn stranger_without_capability_is_forbidden() {
        let resource = Owned(UserId::new());
        let actor = AuthenticatedUser::new(UserId::new(), Role::User);
        let err = resource
            .check_access(&actor, Capability::CancelAnyTicket)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[test]
    fn elevated_stranger_is_granted() {
        let resource = Owned(UserId::new());
        let actor = AuthenticatedUser::new(UserId::new(), Role::Organizer);
        assert!(resource.check_access(&actor, Capability::CancelAnyTicket).is_ok());
    }
}
