use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::errors::Result;

/// Service for managing accounts. Balance mutations are not exposed here;
/// they flow through the balance ledger only.
pub struct AccountService {
    repository: Arc<dyn AccountRepositoryTrait>,
}

impl AccountService {
    /// Creates a new AccountService instance
    pub fn new(repository: Arc<dyn AccountRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AccountServiceTrait for AccountService {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        debug!(
            "Creating account '{}' for owner {}",
            new_account.name, new_account.owner_id
        );
        new_account.validate()?;
        self.repository.create(new_account).await
    }

    async fn rename_account(&self, owner_id: &str, update: AccountUpdate) -> Result<Account> {
        update.validate()?;
        self.repository.update(owner_id.to_string(), update).await
    }

    fn get_account(&self, owner_id: &str, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(owner_id, account_id)
    }

    fn get_accounts(&self, owner_id: &str) -> Result<Vec<Account>> {
        self.repository.list(owner_id)
    }
}
