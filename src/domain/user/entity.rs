//! User entity and related types

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};
use crate::domain::role::Role;
use crate::domain::team::TeamId;

/// User identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// User is active and can log in
    #[default]
    Active,
    /// User is temporarily suspended
    Suspended,
}

impl UserStatus {
    /// Check if the user can log in
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Directory user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    status: UserStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    team_id: Option<TeamId>,
    roles: BTreeSet<Role>,
    #[serde(default)]
    preferences: BTreeMap<String, String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_login_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active user holding the given roles.
    ///
    /// An empty role set is replaced by [`Role::TeamMember`].
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        roles: impl IntoIterator<Item = Role>,
    ) -> Self {
        let now = Utc::now();
        let mut roles: BTreeSet<Role> = roles.into_iter().collect();

        if roles.is_empty() {
            roles.insert(Role::TeamMember);
        }

        Self {
            id,
            username: username.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            password_hash: password_hash.into(),
            status: UserStatus::Active,
            team_id: None,
            roles,
            preferences: BTreeMap::new(),
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    /// Set first and last name (builder pattern)
    pub fn with_names(mut self, first_name: Option<String>, last_name: Option<String>) -> Self {
        self.first_name = first_name;
        self.last_name = last_name;
        self
    }

    /// Set the team (builder pattern)
    pub fn with_team(mut self, team_id: Option<TeamId>) -> Self {
        self.team_id = team_id;
        self
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn team_id(&self) -> Option<&TeamId> {
        self.team_id.as_ref()
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn preferences(&self) -> &BTreeMap<String, String> {
        &self.preferences
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_login_at(&self) -> Option<DateTime<Utc>> {
        self.last_login_at
    }

    /// Check if the user is active and can log in
    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    // Mutators

    pub fn set_roles(&mut self, roles: impl IntoIterator<Item = Role>) {
        self.roles = roles.into_iter().collect();
        if self.roles.is_empty() {
            self.roles.insert(Role::TeamMember);
        }
        self.touch();
    }

    /// Move the user to a team, or detach them with `None`
    pub fn set_team(&mut self, team_id: Option<TeamId>) {
        self.team_id = team_id;
        self.touch();
    }

    /// Merge preferences, overwriting keys that already exist
    pub fn merge_preferences(&mut self, preferences: impl IntoIterator<Item = (String, String)>) {
        self.preferences.extend(preferences);
        self.touch();
    }

    pub fn record_login(&mut self) {
        self.last_login_at = Some(Utc::now());
    }

    pub fn suspend(&mut self) {
        self.status = UserStatus::Suspended;
        self.touch();
    }

    pub fn activate(&mut self) {
        if self.status == UserStatus::Suspended {
            self.status = UserStatus::Active;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
