use uuid::Uuid;

use croscout_domain::user::UserRole;

use crate::domain::repository::UserRepository;
use crate::domain::types::{User, UserUpdate};
use crate::error::MarketplaceError;
use crate::infra::password::{hash_password, verify_password};

// ── GetUser ──────────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, MarketplaceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserIdNotFound)
    }
}

// ── ListUsers ────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ListUsersUseCase<U> {
    pub async fn execute(&self, role: Option<UserRole>) -> Result<Vec<User>, MarketplaceError> {
        self.users.list(role).await
    }
}

// ── UpdateUser ───────────────────────────────────────────────────────────────

pub struct UpdateUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid, update: UserUpdate) -> Result<(), MarketplaceError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserIdNotFound)?;

        // Role can only move from user to agent, and agents need a tax number on file.
        match update.role {
            None => {}
            Some(role) if role == user.role => {}
            Some(UserRole::Agent) => {
                let has_tax_number = update
                    .tax_number
                    .as_deref()
                    .or(user.tax_number.as_deref())
                    .is_some_and(|t| !t.trim().is_empty());
                if !has_tax_number {
                    return Err(MarketplaceError::TaxNumberRequired);
                }
            }
            Some(_) => return Err(MarketplaceError::InvalidRole),
        }

        if !self.users.update(user_id, &update).await? {
            return Err(MarketplaceError::UserIdNotFound);
        }
        Ok(())
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), MarketplaceError> {
        if new_password.is_empty() {
            return Err(MarketplaceError::MissingUpdate);
        }
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(MarketplaceError::UserIdNotFound)?;

        let matches = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(old_password, hash));
        if !matches {
            return Err(MarketplaceError::WrongPassword);
        }

        let hash = hash_password(new_password)?;
        self.users.set_password(user_id, &hash).await
    }
}

// ── DeleteUser ───────────────────────────────────────────────────────────────

pub struct DeleteUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> DeleteUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<(), MarketplaceError> {
        if !self.users.delete(user_id).await? {
            return Err(MarketplaceError::UserIdNotFound);
        }
        Ok(())
    }
}
