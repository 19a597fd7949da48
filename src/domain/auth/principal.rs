//! Authenticated principal

use std::collections::BTreeSet;

use serde::Serialize;

use crate::domain::role::Role;
use crate::domain::user::{User, UserId};

/// Identity and role set bound to an authenticated request.
///
/// Resolved from the directory on every request and never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: UserId,
    pub username: String,
    pub roles: BTreeSet<Role>,
}

impl Principal {
    pub fn new(id: UserId, username: impl Into<String>, roles: BTreeSet<Role>) -> Self {
        Self {
            id,
            username: username.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// True if the principal holds at least one of `roles`
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.roles.contains(role))
    }

    /// Authority names (`ROLE_*`), ordered by privilege
    pub fn authorities(&self) -> Vec<&'static str> {
        self.roles.iter().map(Role::authority).collect()
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id().clone(), user.username(), user.roles().clone())
    }
}
