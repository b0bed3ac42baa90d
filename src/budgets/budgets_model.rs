use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::BUDGET_NAME_MAX_LEN;
use crate::errors::{Error, Result, ValidationError};
use crate::transactions::Expense;

/// Domain model for a spending budget. `total_spent` and `expense_count` are
/// derived from the expense rows referencing the budget; callers never set
/// them.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: Decimal,
    pub total_spent: Decimal,
    pub expense_count: i32,
    pub icon: String,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new budget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub amount: Decimal,
    pub icon: String,
}

impl NewBudget {
    /// Validates the new budget data
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "ownerId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget name cannot be empty".to_string(),
            )));
        }
        if self.name.trim().len() > BUDGET_NAME_MAX_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Budget name cannot exceed {} characters",
                BUDGET_NAME_MAX_LEN
            ))));
        }
        if self.icon.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "icon".to_string(),
            )));
        }
        if self.amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget amount must be non-negative".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for editing a budget. For the default budget only `amount`
/// is honored; a changed name or icon is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub id: String,
    pub name: Option<String>,
    pub amount: Decimal,
    pub icon: Option<String>,
}

impl BudgetUpdate {
    /// Validates the budget update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.amount < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Budget amount must be non-negative".to_string(),
            )));
        }
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Budget name cannot be empty".to_string(),
                )));
            }
            if name.trim().len() > BUDGET_NAME_MAX_LEN {
                return Err(Error::Validation(ValidationError::InvalidInput(format!(
                    "Budget name cannot exceed {} characters",
                    BUDGET_NAME_MAX_LEN
                ))));
            }
        }
        Ok(())
    }
}

/// Derived totals for one budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUsage {
    pub total_spent: Decimal,
    pub expense_count: i32,
}

/// Budget together with its current-month expense subset
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    #[serde(flatten)]
    pub budget: Budget,
    pub total_spent_this_month: Decimal,
    pub expense_count_this_month: i32,
    pub expenses_this_month: Vec<Expense>,
}

/// Database model for budgets
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::budgets)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BudgetDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: String,
    pub total_spent: String,
    pub expense_count: i32,
    pub icon: String,
    pub is_default: bool,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<BudgetDB> for Budget {
    fn from(db: BudgetDB) -> Self {
        Self {
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            amount: db.amount.parse().unwrap_or(Decimal::ZERO),
            total_spent: db.total_spent.parse().unwrap_or(Decimal::ZERO),
            expense_count: db.expense_count,
            icon: db.icon,
            is_default: db.is_default,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewBudget> for BudgetDB {
    fn from(domain: NewBudget) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            owner_id: domain.owner_id,
            name: domain.name.trim().to_string(),
            amount: domain.amount.to_string(),
            total_spent: Decimal::ZERO.to_string(),
            expense_count: 0,
            icon: domain.icon.trim().to_string(),
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }
}
