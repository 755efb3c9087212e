use uuid::Uuid;

use croscout_domain::user::UserRole;

use crate::domain::repository::{TransactionRepository, UserRepository};
use crate::domain::types::Transaction;
use crate::error::MarketplaceError;

// ── ListTransactions ─────────────────────────────────────────────────────────

pub struct ListTransactionsUseCase<T: TransactionRepository> {
    pub transactions: T,
}

impl<T: TransactionRepository> ListTransactionsUseCase<T> {
    pub async fn execute(&self) -> Result<Vec<Transaction>, MarketplaceError> {
        self.transactions.list_all().await
    }
}

// ── ListUserTransactions ─────────────────────────────────────────────────────

pub struct ListUserTransactionsUseCase<T: TransactionRepository, U: UserRepository> {
    pub transactions: T,
    pub users: U,
}

impl<T: TransactionRepository, U: UserRepository> ListUserTransactionsUseCase<T, U> {
    /// Payments made by a guest, or received by an agent.
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Transaction>, MarketplaceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserIdNotFound)?;
        let transactions = match user.role {
            UserRole::User => self.transactions.list_by_user(user.id).await?,
            UserRole::Agent => self.transactions.list_by_agent(user.id).await?,
            UserRole::Admin => vec![],
        };
        if transactions.is_empty() {
            return Err(MarketplaceError::NoTransactionsFound);
        }
        Ok(transactions)
    }
}
