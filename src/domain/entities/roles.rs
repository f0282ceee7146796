//! Role-based authorization
//!
//! Role names are compared exactly: no case folding and no trimming.

use std::collections::{BTreeSet, HashMap};

use super::{Backend, Sender};

/// What a command demands of the sender's roles on one backend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RoleRequirement {
    /// Anyone may run the command.
    #[default]
    Unrestricted,
    /// The sender must hold at least one of these roles. An empty set locks
    /// the command for everybody.
    RestrictedTo(BTreeSet<String>),
}

impl RoleRequirement {
    pub fn restricted_to<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RoleRequirement::RestrictedTo(roles.into_iter().map(Into::into).collect())
    }

    /// `None` maps to unrestricted, any list (even an empty one) restricts.
    pub fn from_option(roles: Option<Vec<String>>) -> Self {
        match roles {
            Some(roles) => RoleRequirement::restricted_to(roles),
            None => RoleRequirement::Unrestricted,
        }
    }

    pub fn permits(&self, roles: &[String]) -> bool {
        match self {
            RoleRequirement::Unrestricted => true,
            RoleRequirement::RestrictedTo(required) => roles.iter().any(|r| required.contains(r)),
        }
    }
}

/// Role requirements of a command, resolved by backend at check time
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorizedRoles {
    default: RoleRequirement,
    per_backend: HashMap<Backend, RoleRequirement>,
}

impl AuthorizedRoles {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// The same requirement on every backend.
    pub fn everywhere(requirement: RoleRequirement) -> Self {
        Self {
            default: requirement,
            per_backend: HashMap::new(),
        }
    }

    pub fn with_backend(mut self, backend: Backend, requirement: RoleRequirement) -> Self {
        self.per_backend.insert(backend, requirement);
        self
    }

    pub fn requirement_for(&self, backend: Option<Backend>) -> &RoleRequirement {
        backend
            .and_then(|b| self.per_backend.get(&b))
            .unwrap_or(&self.default)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.default == RoleRequirement::Unrestricted
            && self
                .per_backend
                .values()
                .all(|r| *r == RoleRequirement::Unrestricted)
    }

    pub fn permits(&self, sender: &Sender) -> bool {
        self.requirement_for(sender.backend).permits(&sender.roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff_only() -> AuthorizedRoles {
        AuthorizedRoles::everywhere(RoleRequirement::restricted_to(["staff"]))
    }

    #[test]
    fn test_unrestricted_permits_anyone() {
        let roles = AuthorizedRoles::unrestricted();
        assert!(roles.permits(&Sender::new("nobody")));
        assert!(roles.is_unrestricted());
    }

    #[test]
    fn test_intersection_required() {
        let roles = staff_only();
        assert!(!roles.permits(&Sender::new("tester")));
        assert!(roles.permits(&Sender::new("tester").with_roles(["member", "staff"])));
        assert!(!roles.permits(&Sender::new("tester").with_role("Staff")));
    }

    #[test]
    fn test_empty_set_is_lockout() {
        let roles = AuthorizedRoles::everywhere(RoleRequirement::from_option(Some(vec![])));
        assert!(!roles.permits(&Sender::new("admin").with_role("staff")));
        assert!(!roles.is_unrestricted());
    }

    #[test]
    fn test_backend_override() {
        let roles = staff_only().with_backend(Backend::Irc, RoleRequirement::restricted_to(["op"]));

        let irc_op = Sender::new("a").with_backend(Backend::Irc).with_role("op");
        let discord_op = Sender::new("a").with_backend(Backend::Discord).with_role("op");
        let agnostic_staff = Sender::new("a").with_role("staff");

        assert!(roles.permits(&irc_op));
        assert!(!roles.permits(&discord_op));
        assert!(roles.permits(&agnostic_staff));
    }

    #[test]
    fn test_backend_override_can_open_up() {
        let roles = staff_only().with_backend(Backend::Discord, RoleRequirement::Unrestricted);
        assert!(roles.permits(&Sender::new("a").with_backend(Backend::Discord)));
        assert!(!roles.permits(&Sender::new("a").with_backend(Backend::Irc)));
    }
}
