//! Admin user management.

use crate::client::ApiClient;
use crate::error::ServiceError;
use client_balance_core::{ApiError, UserId, ValidationError, validate};
use client_balance_error_mapping::ErrorMapper;
use client_balance_platform_access::{RegisterRequest, Role, User, UserStatus};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// Partial update sent with `PUT /users/{id}`. Absent fields are unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<UserStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserUpdate {
    /// True if no field would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Checks the fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            validate::name(name)?;
        }
        if let Some(email) = &self.email {
            validate::email(email)?;
        }
        if let Some(password) = &self.password {
            validate::password(password)?;
        }
        Ok(())
    }
}

/// Observable state of the admin console.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserState {
    pub users: Vec<User>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Admin operations on platform users.
pub struct UserService {
    client: ApiClient,
    mapper: ErrorMapper,
    state: watch::Sender<UserState>,
}

impl UserService {
    #[must_use]
    pub fn new(client: ApiClient, mapper: ErrorMapper) -> Self {
        let (state, _) = watch::channel(UserState::default());
        Self {
            client,
            mapper,
            state,
        }
    }

    #[must_use]
    pub fn state(&self) -> UserState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.state.subscribe()
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, Report<ServiceError>> {
        self.begin();
        let users: Vec<User> = self
            .client
            .get("/users")
            .await
            .map_err(|e| self.fail(e))?;

        debug!(count = users.len(), "users loaded");
        self.state.send_modify(|state| {
            state.users = users.clone();
            state.loading = false;
        });
        Ok(users)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: UserId) -> Result<User, Report<ServiceError>> {
        self.begin();
        let user: User = self
            .client
            .get(&format!("/users/{id}"))
            .await
            .map_err(|e| self.fail(e))?;

        self.state.send_modify(|state| state.loading = false);
        Ok(user)
    }

    /// Creates a user and appends it to the cached list.
    #[instrument(skip(self, request), fields(email = %request.email, role = %request.role))]
    pub async fn create_user(
        &self,
        request: &RegisterRequest,
    ) -> Result<User, Report<ServiceError>> {
        validate::name(&request.name)
            .and_then(|()| validate::email(&request.email))
            .and_then(|()| validate::password(&request.password))
            .map_err(|reason| self.invalid(reason))?;

        self.begin();
        let user: User = self
            .client
            .post("/users", request)
            .await
            .map_err(|e| self.fail(e))?;

        info!(user_id = %user.id(), "user created");
        self.state.send_modify(|state| {
            state.users.push(user.clone());
            state.loading = false;
        });
        Ok(user)
    }

    /// Applies a partial update and replaces the cached copy.
    #[instrument(skip(self, update))]
    pub async fn update_user(
        &self,
        id: UserId,
        update: &UserUpdate,
    ) -> Result<User, Report<ServiceError>> {
        update.validate().map_err(|reason| self.invalid(reason))?;

        self.begin();
        let user: User = self
            .client
            .put(&format!("/users/{id}"), update)
            .await
            .map_err(|e| self.fail(e))?;

        info!(user_id = %id, "user updated");
        self.state.send_modify(|state| {
            if let Some(cached) = state.users.iter_mut().find(|u| u.id() == id) {
                *cached = user.clone();
            }
            state.loading = false;
        });
        Ok(user)
    }

    /// Activates or deactivates a user.
    pub async fn update_user_status(
        &self,
        id: UserId,
        status: UserStatus,
    ) -> Result<User, Report<ServiceError>> {
        let update = UserUpdate {
            status: Some(status),
            ..UserUpdate::default()
        };
        self.update_user(id, &update).await
    }

    pub async fn update_user_role(
        &self,
        id: UserId,
        role: Role,
    ) -> Result<User, Report<ServiceError>> {
        let update = UserUpdate {
            role: Some(role),
            ..UserUpdate::default()
        };
        self.update_user(id, &update).await
    }

    /// Deletes a user and drops it from the cached list.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: UserId) -> Result<(), Report<ServiceError>> {
        self.begin();
        self.client
            .delete(&format!("/users/{id}"))
            .await
            .map_err(|e| self.fail(e))?;

        info!(user_id = %id, "user deleted");
        self.state.send_modify(|state| {
            state.users.retain(|u| u.id() != id);
            state.loading = false;
        });
        Ok(())
    }

    fn begin(&self) {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });
    }

    fn fail(&self, cause: ApiError) -> Report<ServiceError> {
        let message = self.mapper.map_http_error(&cause).to_string();
        debug!(error = %cause, "user call failed");
        self.state.send_modify(|state| {
            state.loading = false;
            state.error = Some(message.clone());
        });
        ServiceError::Request { message, cause }.into()
    }

    fn invalid(&self, reason: ValidationError) -> Report<ServiceError> {
        let message = self.mapper.map_error_message(&reason.to_string()).to_string();
        self.state.send_modify(|state| state.error = Some(message.clone()));
        ServiceError::Invalid { message, reason }.into()
    }
}
