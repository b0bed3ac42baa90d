use chrono::NaiveDateTime;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::ACCOUNT_NAME_MAX_LEN;
use crate::errors::{Error, Result, ValidationError};

/// Domain model representing a money account (wallet, bank account, card)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner_id: String,
    pub name: String,
    pub balance: Decimal,
}

impl NewAccount {
    /// Validates the new account data
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "ownerId".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.name.trim().len() > ACCOUNT_NAME_MAX_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Account name cannot exceed {} characters",
                ACCOUNT_NAME_MAX_LEN
            ))));
        }
        if self.balance < Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account balance cannot be negative".to_string(),
            )));
        }
        Ok(())
    }
}

/// Input model for renaming an account. The balance is never accepted from
/// callers; it only moves through the balance ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: String,
    pub name: String,
}

impl AccountUpdate {
    /// Validates the account update data
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.name.trim().len() > ACCOUNT_NAME_MAX_LEN {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Account name cannot exceed {} characters",
                ACCOUNT_NAME_MAX_LEN
            ))));
        }
        Ok(())
    }
}

/// Database model for accounts
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
#[diesel(table_name = crate::schema::accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AccountDB {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub balance: String,
    #[diesel(skip_insertion)]
    pub created_at: NaiveDateTime,
    #[diesel(skip_insertion)]
    pub updated_at: NaiveDateTime,
}

// Conversion implementations
impl From<AccountDB> for Account {
    fn from(db: AccountDB) -> Self {
        Self {
            id: db.id,
            owner_id: db.owner_id,
            name: db.name,
            balance: db.balance.parse().unwrap_or(Decimal::ZERO),
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl From<NewAccount> for AccountDB {
    fn from(domain: NewAccount) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id.unwrap_or_default(),
            owner_id: domain.owner_id,
            name: domain.name.trim().to_string(),
            balance: domain.balance.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}
