use async_trait::async_trait;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use crate::errors::Result;

/// Trait defining the contract for Account repository operations. Account
/// deletion is absent on purpose: it only happens through the transaction
/// manager's cascade.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    async fn create(&self, new_account: NewAccount) -> Result<Account>;
    async fn update(&self, owner_id: String, update: AccountUpdate) -> Result<Account>;
    fn get_by_id(&self, owner_id: &str, account_id: &str) -> Result<Account>;
    fn list(&self, owner_id: &str) -> Result<Vec<Account>>;
}

/// Trait defining the contract for Account service operations.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;
    async fn rename_account(&self, owner_id: &str, update: AccountUpdate) -> Result<Account>;
    fn get_account(&self, owner_id: &str, account_id: &str) -> Result<Account>;
    fn get_accounts(&self, owner_id: &str) -> Result<Vec<Account>>;
}
