use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::accounts::accounts_repository::{delete_account_row, load_account};
use crate::budgets::budgets_repository::{
    apply_usage_delta, delete_budget_in_tx, load_budget, recompute_usage,
};
use crate::db::WriteHandle;
use crate::errors::{Error, Result};
use crate::ledger;
use crate::transactions::transactions_model::*;
use crate::transactions::transactions_repository as repo;
use crate::transactions::transactions_traits::{
    TransactionRepositoryTrait, TransactionServiceTrait,
};
use crate::utils::time_utils::{day_bounds, month_bounds};

/// Orchestrates every money-moving operation. Each create/update/delete is a
/// single writer job, so the ledger delta, the row write and the budget
/// recompute land atomically or not at all. The account cascade is the one
/// documented exception.
pub struct TransactionService {
    repository: Arc<dyn TransactionRepositoryTrait>,
    writer: WriteHandle,
}

impl TransactionService {
    /// Creates a new TransactionService instance
    pub fn new(repository: Arc<dyn TransactionRepositoryTrait>, writer: WriteHandle) -> Self {
        Self { repository, writer }
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    async fn create_expense(&self, new_expense: NewExpense) -> Result<Expense> {
        new_expense.validate()?;
        debug!(
            "Creating expense '{}' for owner {}",
            new_expense.name, new_expense.owner_id
        );

        self.writer
            .exec(move |conn| {
                let owner = new_expense.owner_id.clone();
                load_budget(conn, &owner, &new_expense.budget_id)?;
                load_account(conn, &owner, &new_expense.account_id)?;

                // Debit first: if the balance cannot absorb the amount the
                // whole job rolls back and no expense row is left behind.
                ledger::apply_delta(conn, &new_expense.account_id, -new_expense.amount)?;

                let expense = repo::insert_expense(conn, new_expense)?;
                recompute_usage(conn, &expense.budget_id)?;
                Ok(expense)
            })
            .await
    }

    async fn update_expense(
        &self,
        owner_id: &str,
        expense_id: &str,
        update: ExpenseUpdate,
    ) -> Result<Expense> {
        update.validate()?;
        let owner = owner_id.to_string();
        let expense_id = expense_id.to_string();

        self.writer
            .exec(move |conn| {
                let old = repo::load_expense(conn, &owner, &expense_id)?;

                if old.account_id == update.account_id {
                    // Reverse old, apply new: net delta in one ledger call.
                    ledger::apply_delta(conn, &old.account_id, old.amount - update.amount)?;
                } else {
                    load_account(conn, &owner, &update.account_id)?;
                    // Refund the old account, debit the new one. Both live in
                    // this transaction: a failed debit rolls the refund back.
                    ledger::apply_delta(conn, &old.account_id, old.amount)?;
                    ledger::apply_delta(conn, &update.account_id, -update.amount)?;
                }

                let updated = repo::update_expense_row(conn, &old.id, &update)?;
                recompute_usage(conn, &old.budget_id)?;
                Ok(updated)
            })
            .await
    }

    async fn delete_expense(&self, owner_id: &str, expense_id: &str) -> Result<Expense> {
        let owner = owner_id.to_string();
        let expense_id = expense_id.to_string();

        self.writer
            .exec(move |conn| {
                let expense = repo::load_expense(conn, &owner, &expense_id)?;

                ledger::apply_delta(conn, &expense.account_id, expense.amount)?;
                repo::delete_expense_row(conn, &expense.id)?;
                recompute_usage(conn, &expense.budget_id)?;
                Ok(expense)
            })
            .await
    }

    async fn create_income(&self, new_income: NewIncome) -> Result<Income> {
        new_income.validate()?;
        debug!(
            "Creating income '{}' for owner {}",
            new_income.name, new_income.owner_id
        );

        self.writer
            .exec(move |conn| {
                let owner = new_income.owner_id.clone();
                load_account(conn, &owner, &new_income.account_id)?;

                ledger::apply_delta(conn, &new_income.account_id, new_income.amount)?;
                repo::insert_income(conn, new_income)
            })
            .await
    }

    async fn update_income(
        &self,
        owner_id: &str,
        income_id: &str,
        update: IncomeUpdate,
    ) -> Result<Income> {
        update.validate()?;
        let owner = owner_id.to_string();
        let income_id = income_id.to_string();

        self.writer
            .exec(move |conn| {
                let old = repo::load_income(conn, &owner, &income_id)?;

                if old.account_id == update.account_id {
                    ledger::apply_delta(conn, &old.account_id, update.amount - old.amount)?;
                } else {
                    load_account(conn, &owner, &update.account_id)?;
                    // Pulling the income back out of the old account can
                    // overdraw it; the ledger rejects that and the edit fails
                    // whole.
                    ledger::apply_delta(conn, &old.account_id, -old.amount)?;
                    ledger::apply_delta(conn, &update.account_id, update.amount)?;
                }

                repo::update_income_row(conn, &old.id, &update)
            })
            .await
    }

    async fn delete_income(&self, owner_id: &str, income_id: &str) -> Result<Income> {
        let owner = owner_id.to_string();
        let income_id = income_id.to_string();

        self.writer
            .exec(move |conn| {
                let income = repo::load_income(conn, &owner, &income_id)?;

                ledger::apply_delta(conn, &income.account_id, -income.amount)?;
                repo::delete_income_row(conn, &income.id)?;
                Ok(income)
            })
            .await
    }

    /// Deletes an account and everything charged to it. Best-effort cascade,
    /// deliberately not one transaction: budgets are decremented and rows
    /// removed first, the account itself goes last. Re-running after a
    /// partial failure finds no rows to decrement, so nothing is counted
    /// twice; a missing account at the final step is terminal NotFound.
    async fn delete_account(&self, owner_id: &str, account_id: &str) -> Result<()> {
        let owner = owner_id.to_string();
        let account = account_id.to_string();

        self.writer
            .exec(move |conn| {
                let related = repo::expenses_by_account_in_tx(conn, &owner, &account)?;

                let mut by_budget: HashMap<String, (Decimal, i32)> = HashMap::new();
                for expense in &related {
                    let entry = by_budget
                        .entry(expense.budget_id.clone())
                        .or_insert((Decimal::ZERO, 0));
                    entry.0 += expense.amount;
                    entry.1 += 1;
                }

                // Bulk decrement instead of per-expense recompute: no other
                // writer can observe the budgets mid-cascade, and the sums
                // are already in hand.
                for (budget_id, (spent, count)) in &by_budget {
                    apply_usage_delta(conn, budget_id, -*spent, -*count)?;
                }

                repo::delete_expenses_by_account(conn, &owner, &account)?;
                repo::delete_incomes_by_account(conn, &owner, &account)?;
                Ok(())
            })
            .await?;

        let owner = owner_id.to_string();
        let account = account_id.to_string();
        self.writer
            .exec(move |conn| delete_account_row(conn, &owner, &account).map(|_| ()))
            .await
    }

    async fn delete_budget(&self, owner_id: &str, budget_id: &str) -> Result<()> {
        let owner = owner_id.to_string();
        let budget_id = budget_id.to_string();

        self.writer
            .exec(move |conn| {
                let budget = load_budget(conn, &owner, &budget_id)?;
                if budget.is_default {
                    return Err(Error::Forbidden(
                        "The catch-all budget cannot be deleted".to_string(),
                    ));
                }

                // Expenses go with the budget. Balances stay put: the money
                // was spent regardless of how it was categorized.
                repo::delete_expenses_by_budget(conn, &budget.id)?;
                delete_budget_in_tx(conn, &owner, &budget.id)?;
                Ok(())
            })
            .await
    }

    fn get_transactions(&self, owner_id: &str) -> Result<TransactionFeed> {
        Ok(TransactionFeed {
            incomes: self.repository.list_incomes(owner_id)?,
            expenses: self.repository.list_expenses(owner_id)?,
        })
    }

    fn get_transactions_by_account(
        &self,
        owner_id: &str,
        account_id: &str,
    ) -> Result<TransactionFeed> {
        Ok(TransactionFeed {
            incomes: self.repository.list_incomes_by_account(owner_id, account_id)?,
            expenses: self
                .repository
                .list_expenses_by_account(owner_id, account_id)?,
        })
    }

    fn get_current_month_transactions(&self, owner_id: &str) -> Result<Vec<TransactionView>> {
        let (start, end) = month_bounds(chrono::Utc::now().naive_utc());

        let incomes = self.repository.list_incomes_in_range(owner_id, start, end)?;
        let expenses = self
            .repository
            .list_expenses_in_range(owner_id, start, end)?;

        let mut views: Vec<TransactionView> = incomes
            .iter()
            .map(TransactionView::from)
            .chain(expenses.iter().map(TransactionView::from))
            .collect();
        views.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(views)
    }

    /// Materializes today's instance of a recurring expense template,
    /// skipping creation when one already exists. The existence re-check and
    /// the insert share a transaction, so a doubled scheduler run cannot
    /// produce two instances.
    async fn create_recurring_expense_instance(
        &self,
        template: &Expense,
        now: NaiveDateTime,
    ) -> Result<Option<Expense>> {
        let template = template.clone();

        self.writer
            .exec(move |conn| {
                let (start, end) = day_bounds(now);
                if repo::expense_instance_exists(conn, &template.id, start, end)? {
                    return Ok(None);
                }

                ledger::apply_delta(conn, &template.account_id, -template.amount)?;

                let instance = repo::insert_expense(
                    conn,
                    NewExpense {
                        id: None,
                        owner_id: template.owner_id.clone(),
                        name: template.name.clone(),
                        amount: template.amount,
                        budget_id: template.budget_id.clone(),
                        account_id: template.account_id.clone(),
                        category: template.category.clone(),
                        date: Some(now),
                        recurrence: Recurrence::None,
                        original_recurring_id: Some(template.id.clone()),
                    },
                )?;
                recompute_usage(conn, &instance.budget_id)?;
                Ok(Some(instance))
            })
            .await
    }

    async fn create_recurring_income_instance(
        &self,
        template: &Income,
        now: NaiveDateTime,
    ) -> Result<Option<Income>> {
        let template = template.clone();

        self.writer
            .exec(move |conn| {
                let (start, end) = day_bounds(now);
                if repo::income_instance_exists(conn, &template.id, start, end)? {
                    return Ok(None);
                }

                ledger::apply_delta(conn, &template.account_id, template.amount)?;

                let instance = repo::insert_income(
                    conn,
                    NewIncome {
                        id: None,
                        owner_id: template.owner_id.clone(),
                        name: template.name.clone(),
                        amount: template.amount,
                        account_id: template.account_id.clone(),
                        category: template.category.clone(),
                        date: Some(now),
                        recurrence: Recurrence::None,
                        original_recurring_id: Some(template.id.clone()),
                    },
                )?;
                Ok(Some(instance))
            })
            .await
    }
}
