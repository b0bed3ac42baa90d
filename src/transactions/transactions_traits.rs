use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::transactions_model::{
    Expense, ExpenseUpdate, Income, IncomeUpdate, NewExpense, NewIncome, TransactionFeed,
    TransactionView,
};
use crate::errors::Result;

/// Trait defining the read contract over expense and income rows.
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_expense(&self, owner_id: &str, expense_id: &str) -> Result<Expense>;
    fn list_expenses(&self, owner_id: &str) -> Result<Vec<Expense>>;
    fn list_expenses_by_budget(&self, owner_id: &str, budget_id: &str) -> Result<Vec<Expense>>;
    fn list_expenses_by_account(&self, owner_id: &str, account_id: &str) -> Result<Vec<Expense>>;
    fn list_expenses_by_budget_in_range(
        &self,
        owner_id: &str,
        budget_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>>;
    fn list_expenses_in_range(
        &self,
        owner_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>>;

    fn get_income(&self, owner_id: &str, income_id: &str) -> Result<Income>;
    fn list_incomes(&self, owner_id: &str) -> Result<Vec<Income>>;
    fn list_incomes_by_account(&self, owner_id: &str, account_id: &str) -> Result<Vec<Income>>;
    fn list_incomes_in_range(
        &self,
        owner_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Income>>;

    fn list_recurring_expense_templates(&self) -> Result<Vec<Expense>>;
    fn list_recurring_income_templates(&self) -> Result<Vec<Income>>;
    fn latest_expense_instance_date(&self, template_id: &str) -> Result<Option<NaiveDateTime>>;
    fn latest_income_instance_date(&self, template_id: &str) -> Result<Option<NaiveDateTime>>;
}

/// Trait defining the transaction manager contract: every operation that
/// moves money or cascades deletions goes through here.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    async fn create_expense(&self, new_expense: NewExpense) -> Result<Expense>;
    async fn update_expense(
        &self,
        owner_id: &str,
        expense_id: &str,
        update: ExpenseUpdate,
    ) -> Result<Expense>;
    async fn delete_expense(&self, owner_id: &str, expense_id: &str) -> Result<Expense>;

    async fn create_income(&self, new_income: NewIncome) -> Result<Income>;
    async fn update_income(
        &self,
        owner_id: &str,
        income_id: &str,
        update: IncomeUpdate,
    ) -> Result<Income>;
    async fn delete_income(&self, owner_id: &str, income_id: &str) -> Result<Income>;

    async fn delete_account(&self, owner_id: &str, account_id: &str) -> Result<()>;
    async fn delete_budget(&self, owner_id: &str, budget_id: &str) -> Result<()>;

    fn get_transactions(&self, owner_id: &str) -> Result<TransactionFeed>;
    fn get_transactions_by_account(
        &self,
        owner_id: &str,
        account_id: &str,
    ) -> Result<TransactionFeed>;
    fn get_current_month_transactions(&self, owner_id: &str) -> Result<Vec<TransactionView>>;

    async fn create_recurring_expense_instance(
        &self,
        template: &Expense,
        now: NaiveDateTime,
    ) -> Result<Option<Expense>>;
    async fn create_recurring_income_instance(
        &self,
        template: &Income,
        now: NaiveDateTime,
    ) -> Result<Option<Income>>;
}
