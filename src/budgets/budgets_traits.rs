use async_trait::async_trait;

use super::budgets_model::{Budget, BudgetSummary, BudgetUpdate, NewBudget};
use crate::errors::Result;

/// Trait defining the contract for Budget repository operations.
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    async fn create(&self, new_budget: NewBudget) -> Result<Budget>;
    async fn update(&self, owner_id: String, update: BudgetUpdate) -> Result<Budget>;
    async fn ensure_default(&self, owner_id: String) -> Result<Budget>;
    fn get_by_id(&self, owner_id: &str, budget_id: &str) -> Result<Budget>;
    fn list(&self, owner_id: &str) -> Result<Vec<Budget>>;
    async fn recompute_all(&self, owner_id: String) -> Result<Vec<Budget>>;
}

/// Trait defining the contract for Budget service operations.
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget>;
    async fn update_budget(&self, owner_id: &str, update: BudgetUpdate) -> Result<Budget>;
    async fn ensure_default_budget(&self, owner_id: &str) -> Result<Budget>;
    async fn get_budgets(&self, owner_id: &str) -> Result<Vec<Budget>>;
    fn get_budget(&self, owner_id: &str, budget_id: &str) -> Result<Budget>;
    async fn get_budget_summaries(&self, owner_id: &str) -> Result<Vec<BudgetSummary>>;
    async fn get_budget_summary(&self, owner_id: &str, budget_id: &str) -> Result<BudgetSummary>;
    async fn recompute_budgets(&self, owner_id: &str) -> Result<Vec<Budget>>;
}
