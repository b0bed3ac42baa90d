use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

use crate::budgets::budgets_model::{Budget, BudgetDB, BudgetUpdate, BudgetUsage, NewBudget};
use crate::budgets::budgets_traits::BudgetRepositoryTrait;
use crate::constants::{DEFAULT_BUDGET_ICON, DEFAULT_BUDGET_NAME};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::schema::{budgets, expenses};

/// Recomputes a budget's derived totals from its expense rows and persists
/// them. A full sum rather than an incremental bump, so a stale or corrupted
/// aggregate heals on the next mutation. Idempotent.
pub fn recompute_usage(conn: &mut SqliteConnection, budget_id: &str) -> Result<BudgetUsage> {
    let amounts: Vec<String> = expenses::table
        .filter(expenses::budget_id.eq(budget_id))
        .select(expenses::amount)
        .load::<String>(conn)?;

    let usage = BudgetUsage {
        total_spent: amounts
            .iter()
            .map(|a| a.parse::<Decimal>().unwrap_or(Decimal::ZERO))
            .sum(),
        expense_count: amounts.len() as i32,
    };

    diesel::update(budgets::table.find(budget_id))
        .set((
            budgets::total_spent.eq(usage.total_spent.to_string()),
            budgets::expense_count.eq(usage.expense_count),
            budgets::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    Ok(usage)
}

/// Shifts a budget's derived totals by a signed delta. Only the account
/// cascade uses this; every other path recomputes.
pub fn apply_usage_delta(
    conn: &mut SqliteConnection,
    budget_id: &str,
    spent_delta: Decimal,
    count_delta: i32,
) -> Result<()> {
    let db: BudgetDB = match budgets::table.find(budget_id).first::<BudgetDB>(conn) {
        Ok(row) => row,
        // The budget may already be gone (deleted independently); nothing to shift.
        Err(diesel::result::Error::NotFound) => return Ok(()),
        Err(other) => return Err(Error::from(other)),
    };

    let total_spent: Decimal = db.total_spent.parse().unwrap_or(Decimal::ZERO);

    diesel::update(budgets::table.find(budget_id))
        .set((
            budgets::total_spent.eq((total_spent + spent_delta).to_string()),
            budgets::expense_count.eq(db.expense_count + count_delta),
            budgets::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .execute(conn)?;

    Ok(())
}

/// Deletes a budget row scoped to its owner.
pub fn delete_budget_in_tx(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    budget_id: &str,
) -> Result<usize> {
    let affected = diesel::delete(
        budgets::table
            .find(budget_id)
            .filter(budgets::owner_id.eq(some_owner_id)),
    )
    .execute(conn)?;

    if affected == 0 {
        return Err(Error::NotFound(format!(
            "Budget with id {} not found",
            budget_id
        )));
    }

    Ok(affected)
}

/// Loads a budget row scoped to its owner.
pub(crate) fn load_budget(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    budget_id: &str,
) -> Result<Budget> {
    budgets::table
        .find(budget_id)
        .filter(budgets::owner_id.eq(some_owner_id))
        .first::<BudgetDB>(conn)
        .map(Budget::from)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                Error::NotFound(format!("Budget with id {} not found", budget_id))
            }
            other => Error::from(other),
        })
}

/// Repository for managing budget rows, scoped by owner
pub struct BudgetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BudgetRepository {
    /// Creates a new BudgetRepository instance
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    async fn create(&self, new_budget: NewBudget) -> Result<Budget> {
        self.writer
            .exec(move |conn| {
                let mut budget_db: BudgetDB = new_budget.into();
                budget_db.id = Uuid::new_v4().to_string();

                diesel::insert_into(budgets::table)
                    .values(&budget_db)
                    .get_result::<BudgetDB>(conn)
                    .map(Budget::from)
                    .map_err(Error::from)
            })
            .await
    }

    async fn update(&self, some_owner_id: String, update: BudgetUpdate) -> Result<Budget> {
        self.writer
            .exec(move |conn| {
                let existing = load_budget(conn, &some_owner_id, &update.id)?;

                let name = update
                    .name
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or(existing.name.as_str());
                let icon = update
                    .icon
                    .as_deref()
                    .map(str::trim)
                    .unwrap_or(existing.icon.as_str());

                diesel::update(budgets::table.find(&existing.id))
                    .set((
                        budgets::name.eq(name),
                        budgets::amount.eq(update.amount.to_string()),
                        budgets::icon.eq(icon),
                        budgets::updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .get_result::<BudgetDB>(conn)
                    .map(Budget::from)
                    .map_err(Error::from)
            })
            .await
    }

    /// Creates the owner's catch-all budget if it does not exist yet. The
    /// partial unique index on (owner_id) WHERE is_default absorbs concurrent
    /// first-time calls: the loser's insert is a no-op and both callers read
    /// back the same row.
    async fn ensure_default(&self, some_owner_id: String) -> Result<Budget> {
        self.writer
            .exec(move |conn| {
                let existing = budgets::table
                    .filter(budgets::owner_id.eq(&some_owner_id))
                    .filter(budgets::is_default.eq(true))
                    .first::<BudgetDB>(conn)
                    .optional()?;

                if let Some(row) = existing {
                    return Ok(Budget::from(row));
                }

                let now = chrono::Utc::now().naive_utc();
                let row = BudgetDB {
                    id: Uuid::new_v4().to_string(),
                    owner_id: some_owner_id.clone(),
                    name: DEFAULT_BUDGET_NAME.to_string(),
                    amount: Decimal::ZERO.to_string(),
                    total_spent: Decimal::ZERO.to_string(),
                    expense_count: 0,
                    icon: DEFAULT_BUDGET_ICON.to_string(),
                    is_default: true,
                    created_at: now,
                    updated_at: now,
                };

                diesel::insert_into(budgets::table)
                    .values(&row)
                    .on_conflict_do_nothing()
                    .execute(conn)?;

                budgets::table
                    .filter(budgets::owner_id.eq(&some_owner_id))
                    .filter(budgets::is_default.eq(true))
                    .first::<BudgetDB>(conn)
                    .map(Budget::from)
                    .map_err(Error::from)
            })
            .await
    }

    fn get_by_id(&self, some_owner_id: &str, budget_id: &str) -> Result<Budget> {
        let mut conn = get_connection(&self.pool)?;
        load_budget(&mut conn, some_owner_id, budget_id)
    }

    fn list(&self, some_owner_id: &str) -> Result<Vec<Budget>> {
        let mut conn = get_connection(&self.pool)?;

        budgets::table
            .filter(budgets::owner_id.eq(some_owner_id))
            .order(budgets::created_at.desc())
            .load::<BudgetDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Budget::from).collect())
            .map_err(Error::from)
    }

    async fn recompute_all(&self, some_owner_id: String) -> Result<Vec<Budget>> {
        self.writer
            .exec(move |conn| {
                let ids: Vec<String> = budgets::table
                    .filter(budgets::owner_id.eq(&some_owner_id))
                    .select(budgets::id)
                    .load::<String>(conn)?;

                for budget_id in &ids {
                    recompute_usage(conn, budget_id)?;
                }

                budgets::table
                    .filter(budgets::owner_id.eq(&some_owner_id))
                    .order(budgets::created_at.desc())
                    .load::<BudgetDB>(conn)
                    .map(|rows| rows.into_iter().map(Budget::from).collect())
                    .map_err(Error::from)
            })
            .await
    }
}
