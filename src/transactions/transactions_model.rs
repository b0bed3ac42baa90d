use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{EXPENSE_NAME_MAX_LEN, INCOME_NAME_MAX_LEN};
use crate::errors::{Error, Result, ValidationError};

/// How often a recurring template fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecurringPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurringPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurringPeriod::Daily => "Daily",
            RecurringPeriod::Weekly => "Weekly",
            RecurringPeriod::Monthly => "Monthly",
            RecurringPeriod::Yearly => "Yearly",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "Daily" => Some(RecurringPeriod::Daily),
            "Weekly" => Some(RecurringPeriod::Weekly),
            "Monthly" => Some(RecurringPeriod::Monthly),
            "Yearly" => Some(RecurringPeriod::Yearly),
            _ => None,
        }
    }
}

/// Recurrence of an income/expense. A periodic record always carries its
/// period, so "recurring without a period" cannot be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Recurrence {
    #[default]
    None,
    Periodic(RecurringPeriod),
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        matches!(self, Recurrence::Periodic(_))
    }

    pub fn period(&self) -> Option<RecurringPeriod> {
        match self {
            Recurrence::None => None,
            Recurrence::Periodic(p) => Some(*p),
        }
    }

    /// Maps the stored (flag, period) column pair back to the variant. A row
    /// flagged recurring with a missing or unknown period degrades to None.
    pub(crate) fn from_columns(recurring: bool, period: Option<&str>) -> Self {
        if recurring {
            period
                .and_then(RecurringPeriod::from_str)
                .map(Recurrence::Periodic)
                .unwrap_or(Recurrence::None)
        } else {
            Recurrence::None
        }
    }

    pub(crate) fn to_columns(self) -> (bool, Option<String>) {
        match self {
            Recurrence::None => (false, None),
            Recurrence::Periodic(p) => (true, Some(p.as_str().to_string())),
        }
    }
}

/// Domain model for an expense. An expense always debits one account and
/// counts toward one budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: Decimal,
    pub budget_id: String,
    pub account_id: String,
    pub category: String,
    pub date: NaiveDateTime,
    pub recurrence: Recurrence,
    /// Set on generated instances: the recurring template that produced this row
    pub original_recurring_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating an expense
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub amount: Decimal,
    pub budget_id: String,
    pub account_id: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_recurring_id: Option<String>,
}

impl NewExpense {
    /// Validates the new expense data
    pub fn validate(&self) -> Result<()> {
        validate_owner(&self.owner_id)?;
        validate_common(
            &self.name,
            EXPENSE_NAME_MAX_LEN,
            self.amount,
            &self.account_id,
            &self.category,
        )?;
        if self.budget_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "budgetId".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for editing an expense. The budget link is fixed at creation;
/// only the account may be reassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub account_id: String,
    pub category: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl ExpenseUpdate {
    /// Validates the expense update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        validate_common(
            &self.name,
            EXPENSE_NAME_MAX_LEN,
            self.amount,
            &self.account_id,
            &self.category,
        )
    }
}

/// Domain model for an income. Affects only its account's balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: Decimal,
    pub account_id: String,
    pub category: String,
    pub date: NaiveDateTime,
    pub recurrence: Recurrence,
    pub original_recurring_id: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating an income
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIncome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub amount: Decimal,
    pub account_id: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_recurring_id: Option<String>,
}

impl NewIncome {
    /// Validates the new income data
    pub fn validate(&self) -> Result<()> {
        validate_owner(&self.owner_id)?;
        validate_common(
            &self.name,
            INCOME_NAME_MAX_LEN,
            self.amount,
            &self.account_id,
            &self.category,
        )
    }
}

/// Input model for editing an income
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeUpdate {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub account_id: String,
    pub category: String,
    pub date: NaiveDateTime,
    #[serde(default)]
    pub recurrence: Recurrence,
}

impl IncomeUpdate {
    /// Validates the income update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        validate_common(
            &self.name,
            INCOME_NAME_MAX_LEN,
            self.amount,
            &self.account_id,
            &self.category,
        )
    }
}

fn validate_owner(owner_id: &str) -> Result<()> {
    if owner_id.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "ownerId".to_string(),
        )));
    }
    Ok(())
}

fn validate_common(
    name: &str,
    name_max: usize,
    amount: Decimal,
    account_id: &str,
    category: &str,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "name".to_string(),
        )));
    }
    if name.trim().len() > name_max {
        return Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Name cannot exceed {} characters",
            name_max
        ))));
    }
    if amount <= Decimal::ZERO {
        return Err(Error::Validation(ValidationError::InvalidInput(
            "Amount must be positive".to_string(),
        )));
    }
    if account_id.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "accountId".to_string(),
        )));
    }
    if category.trim().is_empty() {
        return Err(Error::Validation(ValidationError::MissingField(
            "category".to_string(),
        )));
    }
    Ok(())
}

/// Kind discriminator for merged transaction feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Flat row in the merged transaction feed, the shape the insight
/// collaborator consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
}

/// Incomes and expenses of one owner (or one account), newest first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFeed {
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
}

/// Database model for expenses
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
#[diesel(table_name = crate::schema::expenses)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExpenseDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: String,
    pub budget_id: String,
    pub account_id: String,
    pub category: String,
    pub date: NaiveDateTime,
    pub recurring: bool,
    pub recurring_period: Option<String>,
    pub original_recurring_id: Option<String>,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

/// Database model for incomes
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
#[diesel(table_name = crate::schema::incomes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IncomeDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub amount: String,
    pub account_id: String,
    pub category: String,
    pub date: NaiveDateTime,
    pub recurring: bool,
    pub recurring_period: Option<String>,
    pub original_recurring_id: Option<String>,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<ExpenseDB> for Expense {
    fn from(db: ExpenseDB) -> Self {
        Self {
            recurrence: Recurrence::from_columns(db.recurring, db.recurring_period.as_deref()),
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            amount: db.amount.parse().unwrap_or(Decimal::ZERO),
            budget_id: db.budget_id,
            account_id: db.account_id,
            category: db.category,
            date: db.date,
            original_recurring_id: db.original_recurring_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewExpense> for ExpenseDB {
    fn from(domain: NewExpense) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let (recurring, recurring_period) = domain.recurrence.to_columns();
        Self {
            id: domain.id.unwrap_or_default(),
            owner_id: domain.owner_id,
            name: domain.name.trim().to_string(),
            amount: domain.amount.to_string(),
            budget_id: domain.budget_id,
            account_id: domain.account_id,
            category: domain.category.trim().to_string(),
            date: domain.date.unwrap_or(now),
            recurring,
            recurring_period,
            original_recurring_id: domain.original_recurring_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<IncomeDB> for Income {
    fn from(db: IncomeDB) -> Self {
        Self {
            recurrence: Recurrence::from_columns(db.recurring, db.recurring_period.as_deref()),
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            amount: db.amount.parse().unwrap_or(Decimal::ZERO),
            account_id: db.account_id,
            category: db.category,
            date: db.date,
            original_recurring_id: db.original_recurring_id,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewIncome> for IncomeDB {
    fn from(domain: NewIncome) -> Self {
        let now = chrono::Utc::now().naive_utc();
        let (recurring, recurring_period) = domain.recurrence.to_columns();
        Self {
            id: domain.id.unwrap_or_default(),
            owner_id: domain.owner_id,
            name: domain.name.trim().to_string(),
            amount: domain.amount.to_string(),
            account_id: domain.account_id,
            category: domain.category.trim().to_string(),
            date: domain.date.unwrap_or(now),
            recurring,
            recurring_period,
            original_recurring_id: domain.original_recurring_id,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<&Income> for TransactionView {
    fn from(income: &Income) -> Self {
        Self {
            amount: income.amount,
            category: income.category.clone(),
            date: income.date.date(),
            kind: TransactionKind::Income,
        }
    }
}

impl From<&Expense> for TransactionView {
    fn from(expense: &Expense) -> Self {
        Self {
            amount: expense.amount,
            category: expense.category.clone(),
            date: expense.date.date(),
            kind: TransactionKind::Expense,
        }
    }
}
