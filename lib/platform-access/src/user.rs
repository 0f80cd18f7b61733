//! User domain type.
//!
//! A `User` is both the identity held by the session and a row in the admin
//! console. The API sends it in camelCase; responses to login/register carry
//! only id, name, email and role, so the remaining fields have defaults.

use crate::role::{Role, UserStatus};
use chrono::{DateTime, Utc};
use client_balance_core::UserId;
use serde::{Deserialize, Serialize};

/// A user of the balance platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Platform user ID.
    id: UserId,
    /// Display name.
    name: String,
    /// Login email address.
    email: String,
    /// Access role.
    role: Role,
    /// Whether the user may sign in.
    #[serde(default)]
    status: UserStatus,
    /// When the user record was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    /// When the user record was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// Creates an active user without timestamps.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
            status: UserStatus::Active,
            created_at: None,
            updated_at: None,
        }
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: UserStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the creation and update timestamps.
    #[must_use]
    pub fn with_timestamps(
        mut self,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn status(&self) -> UserStatus {
        self.status
    }

    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns true if the user holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Returns true if the user holds the client role.
    #[must_use]
    pub fn is_client(&self) -> bool {
        self.role.is_client()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_payload_without_status_or_timestamps() {
        let user: User = serde_json::from_str(
            r#"{"id":1,"name":"A","email":"a@b.com","role":"client"}"#,
        )
        .expect("deserialize");

        assert_eq!(user.id(), UserId::new(1));
        assert_eq!(user.name(), "A");
        assert_eq!(user.role(), Role::Client);
        assert_eq!(user.status(), UserStatus::Active);
        assert!(user.created_at().is_none());
        assert!(user.is_client());
    }

    #[test]
    fn full_payload_uses_camel_case() {
        let user: User = serde_json::from_str(
            r#"{"id":2,"name":"Root","email":"root@b.com","role":"admin","status":"inactive",
                "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-02-01T00:00:00Z"}"#,
        )
        .expect("deserialize");

        assert!(user.is_admin());
        assert_eq!(user.status(), UserStatus::Inactive);
        assert!(user.created_at().is_some());

        let json = serde_json::to_value(&user).expect("serialize");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
