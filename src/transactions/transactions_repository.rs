use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{get_connection, DbPool};
use crate::errors::{Error, Result};
use crate::schema::{expenses, incomes};
use crate::transactions::transactions_model::{
    Expense, ExpenseDB, ExpenseUpdate, Income, IncomeDB, IncomeUpdate, NewExpense, NewIncome,
};
use crate::transactions::transactions_traits::TransactionRepositoryTrait;

// ---------------------------------------------------------------------------
// In-transaction primitives. These run on the writer connection so the
// transaction manager can stack them with ledger and budget writes in one
// atomic job.
// ---------------------------------------------------------------------------

pub(crate) fn load_expense(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    expense_id: &str,
) -> Result<Expense> {
    expenses::table
        .find(expense_id)
        .filter(expenses::owner_id.eq(some_owner_id))
        .first::<ExpenseDB>(conn)
        .map(Expense::from)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                Error::NotFound(format!("Expense with id {} not found", expense_id))
            }
            other => Error::from(other),
        })
}

pub(crate) fn insert_expense(conn: &mut SqliteConnection, new_expense: NewExpense) -> Result<Expense> {
    let mut expense_db: ExpenseDB = new_expense.into();
    expense_db.id = Uuid::new_v4().to_string();

    diesel::insert_into(expenses::table)
        .values(&expense_db)
        .get_result::<ExpenseDB>(conn)
        .map(Expense::from)
        .map_err(Error::from)
}

pub(crate) fn update_expense_row(
    conn: &mut SqliteConnection,
    expense_id: &str,
    update: &ExpenseUpdate,
) -> Result<Expense> {
    let (recurring, recurring_period) = update.recurrence.to_columns();

    diesel::update(expenses::table.find(expense_id))
        .set((
            expenses::name.eq(update.name.trim()),
            expenses::amount.eq(update.amount.to_string()),
            expenses::account_id.eq(&update.account_id),
            expenses::category.eq(update.category.trim()),
            expenses::date.eq(update.date),
            expenses::recurring.eq(recurring),
            expenses::recurring_period.eq(recurring_period),
            expenses::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .get_result::<ExpenseDB>(conn)
        .map(Expense::from)
        .map_err(Error::from)
}

pub(crate) fn delete_expense_row(conn: &mut SqliteConnection, expense_id: &str) -> Result<usize> {
    Ok(diesel::delete(expenses::table.find(expense_id)).execute(conn)?)
}

pub(crate) fn load_income(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    income_id: &str,
) -> Result<Income> {
    incomes::table
        .find(income_id)
        .filter(incomes::owner_id.eq(some_owner_id))
        .first::<IncomeDB>(conn)
        .map(Income::from)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                Error::NotFound(format!("Income with id {} not found", income_id))
            }
            other => Error::from(other),
        })
}

pub(crate) fn insert_income(conn: &mut SqliteConnection, new_income: NewIncome) -> Result<Income> {
    let mut income_db: IncomeDB = new_income.into();
    income_db.id = Uuid::new_v4().to_string();

    diesel::insert_into(incomes::table)
        .values(&income_db)
        .get_result::<IncomeDB>(conn)
        .map(Income::from)
        .map_err(Error::from)
}

pub(crate) fn update_income_row(
    conn: &mut SqliteConnection,
    income_id: &str,
    update: &IncomeUpdate,
) -> Result<Income> {
    let (recurring, recurring_period) = update.recurrence.to_columns();

    diesel::update(incomes::table.find(income_id))
        .set((
            incomes::name.eq(update.name.trim()),
            incomes::amount.eq(update.amount.to_string()),
            incomes::account_id.eq(&update.account_id),
            incomes::category.eq(update.category.trim()),
            incomes::date.eq(update.date),
            incomes::recurring.eq(recurring),
            incomes::recurring_period.eq(recurring_period),
            incomes::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .get_result::<IncomeDB>(conn)
        .map(Income::from)
        .map_err(Error::from)
}

pub(crate) fn delete_income_row(conn: &mut SqliteConnection, income_id: &str) -> Result<usize> {
    Ok(diesel::delete(incomes::table.find(income_id)).execute(conn)?)
}

/// Expense rows charged to an account, read inside the cascade transaction.
pub(crate) fn expenses_by_account_in_tx(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    account_id: &str,
) -> Result<Vec<Expense>> {
    expenses::table
        .filter(expenses::owner_id.eq(some_owner_id))
        .filter(expenses::account_id.eq(account_id))
        .load::<ExpenseDB>(conn)
        .map(|rows| rows.into_iter().map(Expense::from).collect())
        .map_err(Error::from)
}

pub(crate) fn delete_expenses_by_account(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    account_id: &str,
) -> Result<usize> {
    Ok(diesel::delete(
        expenses::table
            .filter(expenses::owner_id.eq(some_owner_id))
            .filter(expenses::account_id.eq(account_id)),
    )
    .execute(conn)?)
}

pub(crate) fn delete_incomes_by_account(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    account_id: &str,
) -> Result<usize> {
    Ok(diesel::delete(
        incomes::table
            .filter(incomes::owner_id.eq(some_owner_id))
            .filter(incomes::account_id.eq(account_id)),
    )
    .execute(conn)?)
}

pub(crate) fn delete_expenses_by_budget(
    conn: &mut SqliteConnection,
    budget_id: &str,
) -> Result<usize> {
    Ok(diesel::delete(expenses::table.filter(expenses::budget_id.eq(budget_id))).execute(conn)?)
}

/// Whether a generated instance of the template already exists in [start, end).
/// The scheduler's duplicate guard; runs inside the instance-create job.
pub(crate) fn expense_instance_exists(
    conn: &mut SqliteConnection,
    template_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<bool> {
    let found: Option<String> = expenses::table
        .filter(expenses::original_recurring_id.eq(template_id))
        .filter(expenses::recurring.eq(false))
        .filter(expenses::date.ge(start))
        .filter(expenses::date.lt(end))
        .select(expenses::id)
        .first::<String>(conn)
        .optional()?;
    Ok(found.is_some())
}

pub(crate) fn income_instance_exists(
    conn: &mut SqliteConnection,
    template_id: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<bool> {
    let found: Option<String> = incomes::table
        .filter(incomes::original_recurring_id.eq(template_id))
        .filter(incomes::recurring.eq(false))
        .filter(incomes::date.ge(start))
        .filter(incomes::date.lt(end))
        .select(incomes::id)
        .first::<String>(conn)
        .optional()?;
    Ok(found.is_some())
}

// ---------------------------------------------------------------------------
// Repository
// ---------------------------------------------------------------------------

/// Read-side repository over the expense and income tables
pub struct TransactionRepository {
    pool: Arc<DbPool>,
}

impl TransactionRepository {
    /// Creates a new TransactionRepository instance
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl TransactionRepositoryTrait for TransactionRepository {
    fn get_expense(&self, some_owner_id: &str, expense_id: &str) -> Result<Expense> {
        let mut conn = get_connection(&self.pool)?;
        load_expense(&mut conn, some_owner_id, expense_id)
    }

    fn list_expenses(&self, some_owner_id: &str) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;

        expenses::table
            .filter(expenses::owner_id.eq(some_owner_id))
            .order(expenses::date.desc())
            .load::<ExpenseDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Expense::from).collect())
            .map_err(Error::from)
    }

    fn list_expenses_by_budget(
        &self,
        some_owner_id: &str,
        budget_id: &str,
    ) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;

        expenses::table
            .filter(expenses::owner_id.eq(some_owner_id))
            .filter(expenses::budget_id.eq(budget_id))
            .order(expenses::date.desc())
            .load::<ExpenseDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Expense::from).collect())
            .map_err(Error::from)
    }

    fn list_expenses_by_account(
        &self,
        some_owner_id: &str,
        account_id: &str,
    ) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;

        expenses::table
            .filter(expenses::owner_id.eq(some_owner_id))
            .filter(expenses::account_id.eq(account_id))
            .order(expenses::date.desc())
            .load::<ExpenseDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Expense::from).collect())
            .map_err(Error::from)
    }

    fn list_expenses_by_budget_in_range(
        &self,
        some_owner_id: &str,
        budget_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;

        expenses::table
            .filter(expenses::owner_id.eq(some_owner_id))
            .filter(expenses::budget_id.eq(budget_id))
            .filter(expenses::date.ge(start))
            .filter(expenses::date.lt(end))
            .order(expenses::date.desc())
            .load::<ExpenseDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Expense::from).collect())
            .map_err(Error::from)
    }

    fn list_expenses_in_range(
        &self,
        some_owner_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;

        expenses::table
            .filter(expenses::owner_id.eq(some_owner_id))
            .filter(expenses::date.ge(start))
            .filter(expenses::date.lt(end))
            .order(expenses::date.desc())
            .load::<ExpenseDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Expense::from).collect())
            .map_err(Error::from)
    }

    fn get_income(&self, some_owner_id: &str, income_id: &str) -> Result<Income> {
        let mut conn = get_connection(&self.pool)?;
        load_income(&mut conn, some_owner_id, income_id)
    }

    fn list_incomes(&self, some_owner_id: &str) -> Result<Vec<Income>> {
        let mut conn = get_connection(&self.pool)?;

        incomes::table
            .filter(incomes::owner_id.eq(some_owner_id))
            .order(incomes::date.desc())
            .load::<IncomeDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Income::from).collect())
            .map_err(Error::from)
    }

    fn list_incomes_by_account(
        &self,
        some_owner_id: &str,
        account_id: &str,
    ) -> Result<Vec<Income>> {
        let mut conn = get_connection(&self.pool)?;

        incomes::table
            .filter(incomes::owner_id.eq(some_owner_id))
            .filter(incomes::account_id.eq(account_id))
            .order(incomes::date.desc())
            .load::<IncomeDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Income::from).collect())
            .map_err(Error::from)
    }

    fn list_incomes_in_range(
        &self,
        some_owner_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Income>> {
        let mut conn = get_connection(&self.pool)?;

        incomes::table
            .filter(incomes::owner_id.eq(some_owner_id))
            .filter(incomes::date.ge(start))
            .filter(incomes::date.lt(end))
            .order(incomes::date.desc())
            .load::<IncomeDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Income::from).collect())
            .map_err(Error::from)
    }

    /// All recurring expense templates across owners, for the scheduler sweep.
    fn list_recurring_expense_templates(&self) -> Result<Vec<Expense>> {
        let mut conn = get_connection(&self.pool)?;

        expenses::table
            .filter(expenses::recurring.eq(true))
            .load::<ExpenseDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Expense::from).collect())
            .map_err(Error::from)
    }

    fn list_recurring_income_templates(&self) -> Result<Vec<Income>> {
        let mut conn = get_connection(&self.pool)?;

        incomes::table
            .filter(incomes::recurring.eq(true))
            .load::<IncomeDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Income::from).collect())
            .map_err(Error::from)
    }

    /// Date of the most recent generated instance of an expense template.
    fn latest_expense_instance_date(&self, template_id: &str) -> Result<Option<NaiveDateTime>> {
        let mut conn = get_connection(&self.pool)?;

        expenses::table
            .filter(expenses::original_recurring_id.eq(template_id))
            .filter(expenses::recurring.eq(false))
            .order(expenses::date.desc())
            .select(expenses::date)
            .first::<NaiveDateTime>(&mut conn)
            .optional()
            .map_err(Error::from)
    }

    fn latest_income_instance_date(&self, template_id: &str) -> Result<Option<NaiveDateTime>> {
        let mut conn = get_connection(&self.pool)?;

        incomes::table
            .filter(incomes::original_recurring_id.eq(template_id))
            .filter(incomes::recurring.eq(false))
            .order(incomes::date.desc())
            .select(incomes::date)
            .first::<NaiveDateTime>(&mut conn)
            .optional()
            .map_err(Error::from)
    }
}
