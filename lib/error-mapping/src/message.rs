//! The closed catalog of user-facing error messages.

use crate::locale::Locale;
use serde::{Deserialize, Serialize};

/// A user-facing error message.
///
/// Every failure shown to a user is one of these entries, whatever the
/// backend actually said. Render with [`UserMessage::text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserMessage {
    // Authentication
    InvalidEmailOrPassword,
    InvalidCredentials,
    Unauthorized,
    SessionExpired,
    TooManyLoginAttempts,
    AccountLocked,

    // Balance
    InsufficientBalance,
    InsufficientFunds,
    BalanceTooLow,

    // Validation
    ValidationFailed,
    InvalidInput,
    RequiredField,
    InvalidFormat,
    InvalidAmount,

    // Accounts
    AccountNotFound,
    AccountAlreadyExists,
    AccountInactive,

    // Users
    UserNotFound,
    UserAlreadyExists,
    EmailInUse,

    // Transactions
    TransactionFailed,
    TransactionNotFound,
    TransactionLimitExceeded,

    // Network
    NetworkError,
    Timeout,
    ConnectionRefused,

    // Server
    InternalServerError,
    ServiceUnavailable,
    BadGateway,

    // Permissions
    Forbidden,
    AccessDenied,

    // Generic
    NotFound,
    BadRequest,
    Conflict,
    TooManyRequests,
    Unexpected,
    Unknown,
}

impl UserMessage {
    /// Renders the message in the given locale.
    #[must_use]
    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::PtBr => self.pt_br(),
            Locale::En => self.en(),
        }
    }

    fn pt_br(self) -> &'static str {
        match self {
            Self::InvalidEmailOrPassword => {
                "Email ou senha inválidos. Verifique suas credenciais e tente novamente."
            }
            Self::InvalidCredentials => "Credenciais inválidas. Verifique seu email e senha.",
            Self::Unauthorized => "Acesso não autorizado. Faça login novamente.",
            Self::SessionExpired => "Sessão expirada. Faça login novamente.",
            Self::TooManyLoginAttempts => {
                "Muitas tentativas de login. Tente novamente em 15 minutos."
            }
            Self::AccountLocked => {
                "Conta temporariamente bloqueada devido a muitas tentativas de login."
            }
            Self::InsufficientBalance => "Saldo insuficiente para realizar esta operação.",
            Self::InsufficientFunds => "Fundos insuficientes para completar a transação.",
            Self::BalanceTooLow => "Saldo muito baixo para esta operação.",
            Self::ValidationFailed => {
                "Dados inválidos. Verifique as informações e tente novamente."
            }
            Self::InvalidInput => "Entrada inválida. Verifique os dados informados.",
            Self::RequiredField => "Campo obrigatório não preenchido.",
            Self::InvalidFormat => "Formato inválido. Verifique os dados informados.",
            Self::InvalidAmount => "Valor inválido. Digite um valor válido.",
            Self::AccountNotFound => "Conta não encontrada.",
            Self::AccountAlreadyExists => "Esta conta já existe.",
            Self::AccountInactive => "Conta inativa. Entre em contato com o suporte.",
            Self::UserNotFound => "Usuário não encontrado.",
            Self::UserAlreadyExists => "Este usuário já existe.",
            Self::EmailInUse => "Este email já está sendo usado por outro usuário.",
            Self::TransactionFailed => "Falha na transação. Tente novamente.",
            Self::TransactionNotFound => "Transação não encontrada.",
            Self::TransactionLimitExceeded => "Limite de transação excedido.",
            Self::NetworkError => "Erro de conexão. Verifique sua internet e tente novamente.",
            Self::Timeout => "Tempo limite excedido. Tente novamente.",
            Self::ConnectionRefused => "Conexão recusada. Tente novamente mais tarde.",
            Self::InternalServerError => "Erro interno do servidor. Tente novamente mais tarde.",
            Self::ServiceUnavailable => {
                "Serviço temporariamente indisponível. Tente novamente mais tarde."
            }
            Self::BadGateway => "Erro no servidor. Tente novamente mais tarde.",
            Self::Forbidden => "Você não tem permissão para realizar esta ação.",
            Self::AccessDenied => "Acesso negado.",
            Self::NotFound => "Recurso não encontrado.",
            Self::BadRequest => "Solicitação inválida. Verifique os dados e tente novamente.",
            Self::Conflict => "Conflito nos dados. O recurso já existe ou está sendo usado.",
            Self::TooManyRequests => "Muitas solicitações. Tente novamente mais tarde.",
            Self::Unexpected => "Ocorreu um erro inesperado. Tente novamente.",
            Self::Unknown => "Erro desconhecido. Tente novamente.",
        }
    }

    fn en(self) -> &'static str {
        match self {
            Self::InvalidEmailOrPassword => {
                "Invalid email or password. Check your credentials and try again."
            }
            Self::InvalidCredentials => "Invalid credentials. Check your email and password.",
            Self::Unauthorized => "Unauthorized access. Please log in again.",
            Self::SessionExpired => "Session expired. Please log in again.",
            Self::TooManyLoginAttempts => "Too many login attempts. Try again in 15 minutes.",
            Self::AccountLocked => "Account temporarily locked after too many login attempts.",
            Self::InsufficientBalance => "Insufficient balance to complete this operation.",
            Self::InsufficientFunds => "Insufficient funds to complete the transaction.",
            Self::BalanceTooLow => "Balance too low for this operation.",
            Self::ValidationFailed => "Invalid data. Check the information and try again.",
            Self::InvalidInput => "Invalid input. Check the data you entered.",
            Self::RequiredField => "A required field is empty.",
            Self::InvalidFormat => "Invalid format. Check the data you entered.",
            Self::InvalidAmount => "Invalid amount. Enter a valid value.",
            Self::AccountNotFound => "Account not found.",
            Self::AccountAlreadyExists => "This account already exists.",
            Self::AccountInactive => "Account inactive. Please contact support.",
            Self::UserNotFound => "User not found.",
            Self::UserAlreadyExists => "This user already exists.",
            Self::EmailInUse => "This email is already used by another user.",
            Self::TransactionFailed => "Transaction failed. Please try again.",
            Self::TransactionNotFound => "Transaction not found.",
            Self::TransactionLimitExceeded => "Transaction limit exceeded.",
            Self::NetworkError => "Connection error. Check your network and try again.",
            Self::Timeout => "The request timed out. Please try again.",
            Self::ConnectionRefused => "Connection refused. Try again later.",
            Self::InternalServerError => "Internal server error. Try again later.",
            Self::ServiceUnavailable => "Service temporarily unavailable. Try again later.",
            Self::BadGateway => "Server error. Try again later.",
            Self::Forbidden => "You do not have permission to perform this action.",
            Self::AccessDenied => {
                "Access denied. You do not have permission to perform this action."
            }
            Self::NotFound => "Resource not found.",
            Self::BadRequest => "Invalid request. Check the data and try again.",
            Self::Conflict => "Data conflict. The resource already exists or is in use.",
            Self::TooManyRequests => "Too many requests. Please try again later.",
            Self::Unexpected => "An unexpected error occurred. Please try again.",
            Self::Unknown => "Unknown error. Please try again.",
        }
    }
}
