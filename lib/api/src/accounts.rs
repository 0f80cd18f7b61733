//! Balance accounts and their transactions.
//!
//! [`AccountService`] keeps an observable [`AccountState`]: the cached list
//! of the user's accounts, the selected account and progress flags. Reads
//! and account creation or deletion set `loading`; deposits and withdrawals
//! set `processing`. Every failure stores its normalized message in
//! `error`, and the next call clears it.

use crate::client::ApiClient;
use crate::error::ServiceError;
use chrono::{DateTime, Utc};
use client_balance_core::{AccountId, ApiError, TransactionId, UserId, ValidationError, validate};
use client_balance_error_mapping::ErrorMapper;
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

/// A balance account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: AccountId,
    pub user_id: UserId,
    pub account_number: String,
    pub balance: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Kind of account offered at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    #[default]
    Checking,
    Savings,
    Business,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Checking => "checking",
            Self::Savings => "savings",
            Self::Business => "business",
        })
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checking" => Ok(Self::Checking),
            "savings" => Ok(Self::Savings),
            "business" => Ok(Self::Business),
            other => Err(format!(
                "unknown account type '{other}' (expected checking, savings or business)"
            )),
        }
    }
}

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
        })
    }
}

/// A posted deposit or withdrawal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub account_id: AccountId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub balance_after: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Body of `POST /accounts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<AccountType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_deposit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of the deposit and withdraw endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Observable state of the account views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountState {
    pub accounts: Vec<Account>,
    pub selected: Option<Account>,
    pub loading: bool,
    pub processing: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Activity {
    Loading,
    Processing,
}

impl Activity {
    fn set(self, state: &mut AccountState, on: bool) {
        match self {
            Self::Loading => state.loading = on,
            Self::Processing => state.processing = on,
        }
    }
}

/// Client-side operations on the signed-in user's accounts.
pub struct AccountService {
    client: ApiClient,
    mapper: ErrorMapper,
    state: watch::Sender<AccountState>,
}

impl AccountService {
    #[must_use]
    pub fn new(client: ApiClient, mapper: ErrorMapper) -> Self {
        let (state, _) = watch::channel(AccountState::default());
        Self {
            client,
            mapper,
            state,
        }
    }

    #[must_use]
    pub fn state(&self) -> AccountState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AccountState> {
        self.state.subscribe()
    }

    /// Sum of the cached balances.
    #[must_use]
    pub fn total_balance(&self) -> f64 {
        self.state.borrow().accounts.iter().map(|a| a.balance).sum()
    }

    pub fn select_account(&self, account: Option<Account>) {
        self.state.send_modify(|state| state.selected = account);
    }

    /// Fetches all accounts and replaces the cached list.
    #[instrument(skip(self))]
    pub async fn list_accounts(&self) -> Result<Vec<Account>, Report<ServiceError>> {
        self.begin(Activity::Loading);
        let accounts: Vec<Account> = self
            .client
            .get("/accounts")
            .await
            .map_err(|e| self.fail(Activity::Loading, e))?;

        debug!(count = accounts.len(), "accounts loaded");
        self.state.send_modify(|state| {
            state.accounts = accounts.clone();
            state.loading = false;
        });
        Ok(accounts)
    }

    /// Fetches one account and selects it.
    #[instrument(skip(self))]
    pub async fn get_account(&self, id: AccountId) -> Result<Account, Report<ServiceError>> {
        self.begin(Activity::Loading);
        let account: Account = self
            .client
            .get(&format!("/accounts/{id}"))
            .await
            .map_err(|e| self.fail(Activity::Loading, e))?;

        self.state.send_modify(|state| {
            replace_cached(state, &account);
            state.selected = Some(account.clone());
            state.loading = false;
        });
        Ok(account)
    }

    /// Fetches an account's transaction history. The cached state is untouched.
    #[instrument(skip(self))]
    pub async fn transactions(
        &self,
        id: AccountId,
    ) -> Result<Vec<Transaction>, Report<ServiceError>> {
        self.client
            .get(&format!("/accounts/{id}/transactions"))
            .await
            .map_err(|cause| {
                ServiceError::Request {
                    message: self.mapper.map_http_error(&cause).to_string(),
                    cause,
                }
                .into()
            })
    }

    /// Opens an account and appends it to the cached list.
    #[instrument(skip(self))]
    pub async fn create_account(
        &self,
        request: &CreateAccountRequest,
    ) -> Result<Account, Report<ServiceError>> {
        validate::description(request.description.as_deref())
            .and_then(|()| validate::initial_deposit(request.initial_deposit))
            .map_err(|reason| self.invalid(reason))?;

        self.begin(Activity::Loading);
        let account: Account = self
            .client
            .post("/accounts", request)
            .await
            .map_err(|e| self.fail(Activity::Loading, e))?;

        info!(account_id = %account.id, "account created");
        self.state.send_modify(|state| {
            state.accounts.push(account.clone());
            state.loading = false;
        });
        Ok(account)
    }

    /// Deposits into an account and refreshes it in the cached list.
    #[instrument(skip(self, description))]
    pub async fn deposit(
        &self,
        id: AccountId,
        amount: f64,
        description: Option<&str>,
    ) -> Result<Account, Report<ServiceError>> {
        validate::amount(amount)
            .and_then(|()| validate::description(description))
            .map_err(|reason| self.invalid(reason))?;

        self.post_transaction(id, "deposit", amount, description).await
    }

    /// Withdraws from an account and refreshes it in the cached list.
    ///
    /// When the account is cached, a withdrawal above its balance is
    /// refused without calling the API.
    #[instrument(skip(self, description))]
    pub async fn withdraw(
        &self,
        id: AccountId,
        amount: f64,
        description: Option<&str>,
    ) -> Result<Account, Report<ServiceError>> {
        let checked = match self.cached_balance(id) {
            Some(balance) => validate::withdrawal(amount, balance),
            None => validate::amount(amount),
        };
        checked
            .and_then(|()| validate::description(description))
            .map_err(|reason| self.invalid(reason))?;

        self.post_transaction(id, "withdraw", amount, description).await
    }

    /// Deletes an account and drops it from the cached list.
    #[instrument(skip(self))]
    pub async fn delete_account(&self, id: AccountId) -> Result<(), Report<ServiceError>> {
        self.begin(Activity::Loading);
        self.client
            .delete(&format!("/accounts/{id}"))
            .await
            .map_err(|e| self.fail(Activity::Loading, e))?;

        info!(account_id = %id, "account deleted");
        self.state.send_modify(|state| {
            state.accounts.retain(|a| a.id != id);
            if state.selected.as_ref().is_some_and(|a| a.id == id) {
                state.selected = None;
            }
            state.loading = false;
        });
        Ok(())
    }

    async fn post_transaction(
        &self,
        id: AccountId,
        action: &str,
        amount: f64,
        description: Option<&str>,
    ) -> Result<Account, Report<ServiceError>> {
        self.begin(Activity::Processing);
        let body = TransactionRequest {
            amount,
            description: description.map(str::to_string),
        };
        let account: Account = self
            .client
            .post(&format!("/accounts/{id}/{action}"), &body)
            .await
            .map_err(|e| self.fail(Activity::Processing, e))?;

        info!(account_id = %id, action, balance = account.balance, "transaction posted");
        self.state.send_modify(|state| {
            replace_cached(state, &account);
            state.processing = false;
        });
        Ok(account)
    }

    fn cached_balance(&self, id: AccountId) -> Option<f64> {
        let state = self.state.borrow();
        state
            .accounts
            .iter()
            .chain(state.selected.iter())
            .find(|a| a.id == id)
            .map(|a| a.balance)
    }

    fn begin(&self, activity: Activity) {
        self.state.send_modify(|state| {
            activity.set(state, true);
            state.error = None;
        });
    }

    fn fail(&self, activity: Activity, cause: ApiError) -> Report<ServiceError> {
        let message = self.mapper.map_http_error(&cause).to_string();
        debug!(error = %cause, "account call failed");
        self.state.send_modify(|state| {
            activity.set(state, false);
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

// Replaces the cached copy of `account` in the list and in the selection.
fn replace_cached(state: &mut AccountState, account: &Account) {
    if let Some(cached) = state.accounts.iter_mut().find(|a| a.id == account.id) {
        *cached = account.clone();
    }
    if state.selected.as_ref().is_some_and(|a| a.id == account.id) {
        state.selected = Some(account.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use crate::transport::{HttpResponse, Method};
    use client_balance_error_mapping::Locale;
    use serde_json::json;
    use std::sync::Arc;

    fn account_json(id: i64, balance: f64) -> serde_json::Value {
        json!({
            "id": id,
            "userId": 1,
            "accountNumber": format!("0001-{id}"),
            "balance": balance,
            "type": "checking",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        })
    }

    fn ok(body: serde_json::Value) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse::new(200, body.to_string()))
    }

    fn service(
        responses: Vec<Result<HttpResponse, ApiError>>,
    ) -> (AccountService, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(responses));
        let service = AccountService::new(
            ApiClient::new(transport.clone()),
            ErrorMapper::new(Locale::En),
        );
        (service, transport)
    }

    #[tokio::test]
    async fn list_replaces_cache_and_totals() {
        let (service, _) = service(vec![ok(json!([
            account_json(1, 100.0),
            account_json(2, 50.5)
        ]))]);

        let accounts = service.list_accounts().await.expect("list");

        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].account_number, "0001-1");
        assert_eq!(accounts[0].kind.as_deref(), Some("checking"));
        assert!((service.total_balance() - 150.5).abs() < f64::EPSILON);
        let state = service.state();
        assert!(!state.loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn deposit_updates_cached_account() {
        let (service, transport) = service(vec![
            ok(json!([account_json(1, 100.0), account_json(2, 10.0)])),
            ok(account_json(1, 150.0)),
        ]);
        service.list_accounts().await.expect("list");

        let account = service
            .deposit(AccountId::new(1), 50.0, Some("salary"))
            .await
            .expect("deposit");

        assert!((account.balance - 150.0).abs() < f64::EPSILON);
        let state = service.state();
        assert!((state.accounts[0].balance - 150.0).abs() < f64::EPSILON);
        assert!(!state.processing);

        let sent = transport.requests();
        assert_eq!(sent[1].method, Method::Post);
        assert_eq!(sent[1].path, "/accounts/1/deposit");
        assert_eq!(sent[1].body, Some(json!({"amount": 50.0, "description": "salary"})));
    }

    #[tokio::test]
    async fn withdraw_updates_cached_and_selected_account() {
        let (service, _) = service(vec![ok(account_json(3, 80.0)), ok(account_json(3, 60.0))]);
        service.get_account(AccountId::new(3)).await.expect("get");

        service
            .withdraw(AccountId::new(3), 20.0, None)
            .await
            .expect("withdraw");

        let selected = service.state().selected.expect("selected");
        assert!((selected.balance - 60.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn withdrawal_above_cached_balance_is_refused_locally() {
        let (service, transport) = service(vec![ok(json!([account_json(1, 10.0)]))]);
        service.list_accounts().await.expect("list");

        let err = service
            .withdraw(AccountId::new(1), 25.0, None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("insufficient balance"));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(
            service.state().error.as_deref(),
            Some("Insufficient balance to complete this operation.")
        );
    }

    #[tokio::test]
    async fn amount_bounds_are_checked_before_sending() {
        let (service, transport) = service(vec![]);

        assert!(service.deposit(AccountId::new(1), 0.0, None).await.is_err());
        assert!(service.deposit(AccountId::new(1), 1_000_000.0, None).await.is_err());
        assert!(service.deposit(AccountId::new(1), f64::NAN, None).await.is_err());

        assert!(transport.requests().is_empty());
        assert_eq!(
            service.state().error.as_deref(),
            Some("Invalid amount. Enter a valid value.")
        );
    }

    #[tokio::test]
    async fn server_rejection_is_normalized() {
        let (service, _) = service(vec![Ok(HttpResponse::new(
            400,
            r#"{"message":"Insufficient Balance for withdrawal"}"#,
        ))]);

        assert!(service.withdraw(AccountId::new(9), 5.0, None).await.is_err());

        let state = service.state();
        assert_eq!(
            state.error.as_deref(),
            Some("Insufficient balance to complete this operation.")
        );
        assert!(!state.processing);
    }

    #[tokio::test]
    async fn create_appends_and_delete_removes() {
        let (service, transport) = service(vec![
            ok(json!([account_json(1, 0.0)])),
            Ok(HttpResponse::new(201, account_json(2, 25.0).to_string())),
            Ok(HttpResponse::new(204, "")),
        ]);
        service.list_accounts().await.expect("list");

        let request = CreateAccountRequest {
            kind: Some(AccountType::Savings),
            initial_deposit: Some(25.0),
            description: None,
        };
        service.create_account(&request).await.expect("create");
        assert_eq!(service.state().accounts.len(), 2);
        assert_eq!(
            transport.requests()[1].body,
            Some(json!({"type": "savings", "initialDeposit": 25.0}))
        );

        service.delete_account(AccountId::new(1)).await.expect("delete");
        let ids: Vec<_> = service.state().accounts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![AccountId::new(2)]);
    }

    #[tokio::test]
    async fn negative_initial_deposit_is_rejected() {
        let (service, transport) = service(vec![]);
        let request = CreateAccountRequest {
            initial_deposit: Some(-1.0),
            ..CreateAccountRequest::default()
        };

        assert!(service.create_account(&request).await.is_err());
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn failure_clears_on_next_call() {
        let (service, _) = service(vec![
            Err(ApiError::Timeout),
            ok(json!([])),
        ]);

        assert!(service.list_accounts().await.is_err());
        assert_eq!(
            service.state().error.as_deref(),
            Some("The request timed out. Please try again.")
        );

        service.list_accounts().await.expect("list");
        assert!(service.state().error.is_none());
    }

    #[tokio::test]
    async fn transactions_decode() {
        let (service, _) = service(vec![ok(json!([
            {"id": 1, "accountId": 3, "type": "deposit", "amount": 10.0, "balanceAfter": 10.0},
            {"id": 2, "accountId": 3, "type": "withdraw", "amount": 4.0, "balanceAfter": 6.0,
             "description": "coffee", "createdAt": "2024-03-01T12:00:00Z"}
        ]))]);

        let history = service.transactions(AccountId::new(3)).await.expect("history");

        assert_eq!(history.len(), 2);
        assert_eq!(history[1].kind, TransactionKind::Withdraw);
        assert_eq!(history[1].description.as_deref(), Some("coffee"));
        assert_eq!(service.state(), AccountState::default());
    }
}
