use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use super::budgets_model::{Budget, BudgetSummary, BudgetUpdate, NewBudget};
use super::budgets_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::errors::{Error, Result};
use crate::transactions::TransactionRepositoryTrait;
use crate::utils::time_utils::month_bounds;

/// Service for managing budgets, including the per-owner catch-all budget
/// that is created lazily and can never be deleted or renamed.
pub struct BudgetService {
    repository: Arc<dyn BudgetRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl BudgetService {
    /// Creates a new BudgetService instance
    pub fn new(
        repository: Arc<dyn BudgetRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            repository,
            transaction_repository,
        }
    }

    fn find_name_conflict(
        &self,
        owner_id: &str,
        name: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Budget>> {
        let name = name.trim();
        let budgets = self.repository.list(owner_id)?;
        Ok(budgets.into_iter().find(|b| {
            b.name.eq_ignore_ascii_case(name) && exclude_id.map_or(true, |id| b.id != id)
        }))
    }

    fn summarize(&self, budget: Budget) -> Result<BudgetSummary> {
        let (start, end) = month_bounds(chrono::Utc::now().naive_utc());
        let expenses = self.transaction_repository.list_expenses_by_budget_in_range(
            &budget.owner_id,
            &budget.id,
            start,
            end,
        )?;

        Ok(BudgetSummary {
            total_spent_this_month: expenses.iter().map(|e| e.amount).sum(),
            expense_count_this_month: expenses.len() as i32,
            expenses_this_month: expenses,
            budget,
        })
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    async fn create_budget(&self, new_budget: NewBudget) -> Result<Budget> {
        new_budget.validate()?;
        debug!(
            "Creating budget '{}' for owner {}",
            new_budget.name, new_budget.owner_id
        );

        if self
            .find_name_conflict(&new_budget.owner_id, &new_budget.name, None)?
            .is_some()
        {
            return Err(Error::Conflict(
                "A budget with this name already exists".to_string(),
            ));
        }

        self.repository.create(new_budget).await
    }

    /// Edits a budget. The catch-all budget accepts a new amount only; a
    /// changed name or icon on it is rejected rather than ignored.
    async fn update_budget(&self, owner_id: &str, update: BudgetUpdate) -> Result<Budget> {
        update.validate()?;
        let existing = self.repository.get_by_id(owner_id, &update.id)?;

        if existing.is_default {
            if update
                .name
                .as_deref()
                .is_some_and(|n| !n.trim().eq_ignore_ascii_case(&existing.name))
            {
                return Err(Error::Forbidden(
                    "The catch-all budget cannot be renamed".to_string(),
                ));
            }
            if update
                .icon
                .as_deref()
                .is_some_and(|i| i.trim() != existing.icon)
            {
                return Err(Error::Forbidden(
                    "The catch-all budget's icon cannot be changed".to_string(),
                ));
            }

            let amount_only = BudgetUpdate {
                id: update.id,
                name: None,
                amount: update.amount,
                icon: None,
            };
            return self
                .repository
                .update(owner_id.to_string(), amount_only)
                .await;
        }

        let name = update.name.as_deref().ok_or_else(|| {
            Error::Validation(crate::errors::ValidationError::MissingField(
                "name".to_string(),
            ))
        })?;
        if update.icon.is_none() {
            return Err(Error::Validation(
                crate::errors::ValidationError::MissingField("icon".to_string()),
            ));
        }

        if self
            .find_name_conflict(owner_id, name, Some(&update.id))?
            .is_some()
        {
            return Err(Error::Conflict(
                "A budget with this name already exists".to_string(),
            ));
        }

        self.repository.update(owner_id.to_string(), update).await
    }

    async fn ensure_default_budget(&self, owner_id: &str) -> Result<Budget> {
        self.repository.ensure_default(owner_id.to_string()).await
    }

    async fn get_budgets(&self, owner_id: &str) -> Result<Vec<Budget>> {
        // Lazily materialize the catch-all budget before every listing.
        self.ensure_default_budget(owner_id).await?;
        self.repository.list(owner_id)
    }

    fn get_budget(&self, owner_id: &str, budget_id: &str) -> Result<Budget> {
        self.repository.get_by_id(owner_id, budget_id)
    }

    async fn get_budget_summaries(&self, owner_id: &str) -> Result<Vec<BudgetSummary>> {
        let budgets = self.get_budgets(owner_id).await?;
        budgets.into_iter().map(|b| self.summarize(b)).collect()
    }

    async fn get_budget_summary(&self, owner_id: &str, budget_id: &str) -> Result<BudgetSummary> {
        self.ensure_default_budget(owner_id).await?;
        let budget = self.repository.get_by_id(owner_id, budget_id)?;
        self.summarize(budget)
    }

    /// Recomputes every budget's derived totals from its expense rows. The
    /// totals are maintained on each mutation; this is the self-healing
    /// sweep for anything that drifted.
    async fn recompute_budgets(&self, owner_id: &str) -> Result<Vec<Budget>> {
        self.repository.recompute_all(owner_id.to_string()).await
    }
}
