//! Command handlers.
//!
//! Every handler checks the route guard of the view it stands for, runs the
//! operation and returns the text to print. Failures carry the normalized
//! message the services stored in their state.

use crate::config::CliConfig;
use crate::console::ConsoleNavigator;
use crate::render;
use clap::{Args, Subcommand};
use client_balance_api::{
    AccountService, AccountType, ApiClient, AuthApi, CreateAccountRequest, Notifier, ServiceError,
    UserService, UserUpdate,
};
use client_balance_core::{AccountId, UserId, ValidationError, validate};
use client_balance_error_mapping::ErrorMapper;
use client_balance_platform_access::{
    CredentialSlot, FileCredentialSlot, Guard, GuardOutcome, Navigator, RegisterRequest, Role,
    Route, Session, SessionConfig, SessionStore, UserStatus,
};
use rootcause::prelude::Report;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Account commands, available to clients.
#[derive(Subcommand, Debug)]
pub enum AccountsCommand {
    /// List your accounts and the total balance
    List,

    /// Show one account
    Show { id: AccountId },

    /// Show an account's transaction history
    Transactions { id: AccountId },

    /// Open a new account
    Create {
        /// checking, savings or business
        #[arg(long = "type", default_value_t = AccountType::Checking)]
        kind: AccountType,

        #[arg(long)]
        initial_deposit: Option<f64>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Deposit into an account
    Deposit {
        id: AccountId,
        amount: f64,
        #[arg(long)]
        description: Option<String>,
    },

    /// Withdraw from an account
    Withdraw {
        id: AccountId,
        amount: f64,
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an account
    Delete { id: AccountId },
}

/// User administration, available to admins.
#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List all users
    List,

    /// Show one user
    Show { id: UserId },

    /// Create a user
    Create(NewUserArgs),

    /// Change a user's name, email or password
    Update {
        id: UserId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "CLIENT_BALANCE_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Reactivate a user
    Activate { id: UserId },

    /// Deactivate a user
    Deactivate { id: UserId },

    /// Change a user's role
    Role { id: UserId, role: Role },

    /// Delete a user
    Delete { id: UserId },
}

/// Fields of a new user.
#[derive(Args, Debug, Clone)]
pub struct NewUserArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "CLIENT_BALANCE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Must equal the password when given
    #[arg(long)]
    pub password_confirmation: Option<String>,

    /// client or admin
    #[arg(long, default_value_t = Role::Client)]
    pub role: Role,
}

impl NewUserArgs {
    fn validate(&self) -> Result<(), ValidationError> {
        validate::name(&self.name)?;
        validate::email(&self.email)?;
        validate::password(&self.password)?;
        if let Some(confirmation) = &self.password_confirmation {
            validate::password_confirmation(&self.password, confirmation)?;
        }
        Ok(())
    }

    fn into_request(self) -> RegisterRequest {
        RegisterRequest::new(self.name, self.email, self.password, self.role)
    }
}

/// A failed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// The session may not open this view; `route` is where it was sent.
    Denied { route: Route },
    /// The operation failed; the message is ready for the user.
    Failed(String),
    /// The client could not be set up.
    Setup(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied { route } => write!(f, "not available in this session (go to {route})"),
            Self::Failed(message) => f.write_str(message),
            Self::Setup(reason) => write!(f, "setup failed: {reason}"),
        }
    }
}

impl std::error::Error for CliError {}

/// The session store and services of one CLI run.
pub struct App {
    store: SessionStore<AuthApi>,
    accounts: AccountService,
    users: UserService,
    navigator: Arc<dyn Navigator>,
    mapper: ErrorMapper,
}

impl App {
    /// Wires the persistent credential file and the HTTP pipeline.
    pub fn connect(
        config: &CliConfig,
        navigator: Arc<ConsoleNavigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, CliError> {
        let path = match &config.session.credential_file {
            Some(path) => path.clone(),
            None => FileCredentialSlot::default_path().map_err(|e| CliError::Setup(e.to_string()))?,
        };
        debug!(path = %path.display(), "credential file");
        let slot: Arc<dyn CredentialSlot> =
            Arc::new(FileCredentialSlot::new(path, config.session.token_key.clone()));

        let session = Session::new(slot);
        let mapper = ErrorMapper::new(config.locale);
        let client = ApiClient::connect(
            &config.api,
            session.clone(),
            navigator.clone(),
            notifier,
            mapper,
        )
        .map_err(|e| CliError::Setup(e.to_string()))?;

        Ok(Self::new(session, client, config.session.clone(), navigator, mapper))
    }

    #[must_use]
    pub fn new(
        session: Session,
        client: ApiClient,
        config: SessionConfig,
        navigator: Arc<dyn Navigator>,
        mapper: ErrorMapper,
    ) -> Self {
        let backend = Arc::new(AuthApi::new(client.clone()));
        Self {
            store: SessionStore::new(session, backend, config, mapper),
            accounts: AccountService::new(client.clone(), mapper),
            users: UserService::new(client, mapper),
            navigator,
            mapper,
        }
    }

    /// Restores the identity from the stored credential.
    pub async fn initialize(&self) {
        if let Err(e) = self.store.initialize().await {
            warn!(error = %e, "could not restore the session");
        }
    }

    fn guard(&self, guard: Guard) -> Result<(), CliError> {
        match guard.check(self.store.session()) {
            GuardOutcome::Allow => Ok(()),
            GuardOutcome::Redirect(route) => {
                debug!(?guard, route = %route, "command refused");
                self.navigator.navigate(route);
                Err(CliError::Denied { route })
            }
        }
    }

    fn session_failure(&self, fallback: impl fmt::Display) -> CliError {
        CliError::Failed(
            self.store
                .state()
                .last_error
                .unwrap_or_else(|| fallback.to_string()),
        )
    }

    fn invalid(&self, reason: &ValidationError) -> CliError {
        CliError::Failed(self.mapper.map_error_message(&reason.to_string()).to_string())
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, CliError> {
        self.guard(Guard::Guest)?;
        let user = self
            .store
            .login(email, password)
            .await
            .map_err(|e| self.session_failure(e))?;

        self.navigator.navigate(self.store.default_redirect_target());
        Ok(format!("Signed in as {} ({}).\n", user.name(), user.role()))
    }

    pub async fn register(&self, args: NewUserArgs) -> Result<String, CliError> {
        self.guard(Guard::Guest)?;
        args.validate().map_err(|reason| self.invalid(&reason))?;

        let user = self
            .store
            .register(&args.into_request())
            .await
            .map_err(|e| self.session_failure(e))?;

        self.navigator.navigate(self.store.default_redirect_target());
        Ok(format!("Registered and signed in as {}.\n", user.name()))
    }

    /// Ends the session and waits for the server to be told.
    pub async fn logout(&self) -> Result<String, CliError> {
        let was_signed_in = self.store.is_authenticated();
        if let Some(remote) = self.store.logout()
            && let Err(e) = remote.await
        {
            warn!(error = %e, "remote logout task failed");
        }
        self.navigator.navigate(Route::Login);

        Ok(if was_signed_in {
            "Signed out.\n".to_string()
        } else {
            "No session to end.\n".to_string()
        })
    }

    pub fn whoami(&self) -> Result<String, CliError> {
        self.guard(Guard::Authenticated)?;
        self.store
            .current_identity()
            .map(|user| render::user(&user))
            .ok_or_else(|| self.session_failure("not authenticated"))
    }

    pub async fn accounts(&self, command: AccountsCommand) -> Result<String, CliError> {
        self.guard(Guard::Client)?;
        let service = &self.accounts;
        let failed = |e: Report<ServiceError>| {
            CliError::Failed(service.state().error.unwrap_or_else(|| e.to_string()))
        };

        match command {
            AccountsCommand::List => {
                let accounts = service.list_accounts().await.map_err(failed)?;
                Ok(render::accounts(&accounts, service.total_balance()))
            }
            AccountsCommand::Show { id } => {
                let account = service.get_account(id).await.map_err(failed)?;
                Ok(render::account(&account))
            }
            AccountsCommand::Transactions { id } => {
                let transactions = service.transactions(id).await.map_err(failed)?;
                Ok(render::transactions(&transactions))
            }
            AccountsCommand::Create {
                kind,
                initial_deposit,
                description,
            } => {
                let request = CreateAccountRequest {
                    kind: Some(kind),
                    initial_deposit,
                    description,
                };
                let account = service.create_account(&request).await.map_err(failed)?;
                Ok(format!(
                    "Opened account #{} ({}) with balance {}.\n",
                    account.id,
                    account.account_number,
                    render::money(account.balance)
                ))
            }
            AccountsCommand::Deposit {
                id,
                amount,
                description,
            } => {
                let account = service
                    .deposit(id, amount, description.as_deref())
                    .await
                    .map_err(failed)?;
                Ok(format!("New balance: {}\n", render::money(account.balance)))
            }
            AccountsCommand::Withdraw {
                id,
                amount,
                description,
            } => {
                // Loads the balance so an overdraft is refused locally.
                service.get_account(id).await.map_err(failed)?;
                let account = service
                    .withdraw(id, amount, description.as_deref())
                    .await
                    .map_err(failed)?;
                Ok(format!("New balance: {}\n", render::money(account.balance)))
            }
            AccountsCommand::Delete { id } => {
                service.delete_account(id).await.map_err(failed)?;
                Ok(format!("Deleted account #{id}.\n"))
            }
        }
    }

    pub async fn users(&self, command: UsersCommand) -> Result<String, CliError> {
        self.guard(Guard::Admin)?;
        let service = &self.users;
        let failed = |e: Report<ServiceError>| {
            CliError::Failed(service.state().error.unwrap_or_else(|| e.to_string()))
        };

        match command {
            UsersCommand::List => {
                let users = service.list_users().await.map_err(failed)?;
                Ok(render::users(&users))
            }
            UsersCommand::Show { id } => {
                let user = service.get_user(id).await.map_err(failed)?;
                Ok(render::user(&user))
            }
            UsersCommand::Create(args) => {
                args.validate().map_err(|reason| self.invalid(&reason))?;
                let user = service
                    .create_user(&args.into_request())
                    .await
                    .map_err(failed)?;
                Ok(format!("Created user #{} ({}).\n", user.id(), user.email()))
            }
            UsersCommand::Update {
                id,
                name,
                email,
                password,
            } => {
                let update = UserUpdate {
                    name,
                    email,
                    password,
                    ..UserUpdate::default()
                };
                if update.is_empty() {
                    return Ok("Nothing to update.\n".to_string());
                }
                update.validate().map_err(|reason| self.invalid(&reason))?;
                let user = service.update_user(id, &update).await.map_err(failed)?;
                Ok(render::user(&user))
            }
            UsersCommand::Activate { id } => {
                let user = service
                    .update_user_status(id, UserStatus::Active)
                    .await
                    .map_err(failed)?;
                Ok(format!("User #{} is {}.\n", user.id(), user.status()))
            }
            UsersCommand::Deactivate { id } => {
                let user = service
                    .update_user_status(id, UserStatus::Inactive)
                    .await
                    .map_err(failed)?;
                Ok(format!("User #{} is {}.\n", user.id(), user.status()))
            }
            UsersCommand::Role { id, role } => {
                let user = service.update_user_role(id, role).await.map_err(failed)?;
                Ok(format!("User #{} is now {}.\n", user.id(), user.role()))
            }
            UsersCommand::Delete { id } => {
                service.delete_user(id).await.map_err(failed)?;
                Ok(format!("Deleted user #{id}.\n"))
            }
        }
    }
}
