//! Directory roles
//!
//! Roles are capability tags attached to a user. Route-level authorization
//! checks consume them through the authenticated principal.

use serde::{Deserialize, Serialize};

/// Role held by a directory user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    ScrumMaster,
    ProductOwner,
    TeamMember,
}

impl Role {
    /// Every role, highest privilege first
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::ScrumMaster,
        Role::ProductOwner,
        Role::TeamMember,
    ];

    /// Roles allowed to manage teams and browse the full directory
    pub const MANAGERS: [Role; 3] = [Role::Admin, Role::ScrumMaster, Role::ProductOwner];

    /// Authority name exposed in API responses (e.g. `ROLE_ADMIN`)
    pub fn authority(&self) -> &'static str {
        match self {
            Self::Admin => "ROLE_ADMIN",
            Self::ScrumMaster => "ROLE_SCRUM_MASTER",
            Self::ProductOwner => "ROLE_PRODUCT_OWNER",
            Self::TeamMember => "ROLE_TEAM_MEMBER",
        }
    }

    /// Map a role name from a signup request.
    ///
    /// Unknown names fall back to [`Role::TeamMember`].
    pub fn from_signup_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "admin" => Self::Admin,
            "scrum_master" => Self::ScrumMaster,
            "product_owner" => Self::ProductOwner,
            _ => Self::TeamMember,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.authority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_names() {
        assert_eq!(Role::Admin.authority(), "ROLE_ADMIN");
        assert_eq!(Role::ScrumMaster.authority(), "ROLE_SCRUM_MASTER");
        assert_eq!(Role::ProductOwner.authority(), "ROLE_PRODUCT_OWNER");
        assert_eq!(Role::TeamMember.authority(), "ROLE_TEAM_MEMBER");
    }

    #[test]
    fn test_from_signup_name() {
        assert_eq!(Role::from_signup_name("admin"), Role::Admin);
        assert_eq!(Role::from_signup_name("Scrum_Master"), Role::ScrumMaster);
        assert_eq!(Role::from_signup_name("product_owner"), Role::ProductOwner);
        assert_eq!(Role::from_signup_name("developer"), Role::TeamMember);
        assert_eq!(Role::from_signup_name(""), Role::TeamMember);
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_string(&Role::ScrumMaster).unwrap(),
            "\"scrum_master\""
        );
        let role: Role = serde_json::from_str("\"product_owner\"").unwrap();
        assert_eq!(role, Role::ProductOwner);
    }

    #[test]
    fn test_managers_excludes_team_member() {
        assert!(!Role::MANAGERS.contains(&Role::TeamMember));
        assert_eq!(Role::ALL.len(), 4);
    }
}
