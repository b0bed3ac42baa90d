//! Balance ledger: the only code path that moves an account's balance.
//!
//! `apply_delta` is a single read-modify-write over the accounts table and
//! must run on the writer actor's connection, where each job executes inside
//! an IMMEDIATE transaction. That serializes concurrent deltas against the
//! same account: two debits cannot both pass the balance check.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;

use crate::accounts::{Account, AccountDB};
use crate::db::WriteHandle;
use crate::errors::{Error, Result};
use crate::schema::accounts;

/// Applies a signed delta to an account balance, rejecting any result below
/// zero. Runs against the supplied connection so callers can compose it with
/// other writes in one transaction.
pub fn apply_delta(
    conn: &mut SqliteConnection,
    account_id: &str,
    delta: Decimal,
) -> Result<Account> {
    let db: AccountDB = accounts::table
        .find(account_id)
        .first::<AccountDB>(conn)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                Error::NotFound(format!("Account with id {} not found", account_id))
            }
            other => Error::from(other),
        })?;

    let balance: Decimal = db.balance.parse().unwrap_or(Decimal::ZERO);
    let new_balance = balance + delta;

    if new_balance < Decimal::ZERO {
        return Err(Error::InsufficientFunds(format!(
            "balance {} on account {} cannot absorb {}",
            balance, account_id, delta
        )));
    }

    diesel::update(accounts::table.find(account_id))
        .set((
            accounts::balance.eq(new_balance.to_string()),
            accounts::updated_at.eq(chrono::Utc::now().naive_utc()),
        ))
        .get_result::<AccountDB>(conn)
        .map(Account::from)
        .map_err(Error::from)
}

/// Trait defining the public balance ledger contract.
#[async_trait]
pub trait LedgerServiceTrait: Send + Sync {
    async fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Account>;
}

/// Public single-operation form of the ledger: one delta, one writer job.
pub struct LedgerService {
    writer: WriteHandle,
}

impl LedgerService {
    pub fn new(writer: WriteHandle) -> Self {
        Self { writer }
    }
}

#[async_trait]
impl LedgerServiceTrait for LedgerService {
    async fn apply_delta(&self, account_id: &str, delta: Decimal) -> Result<Account> {
        let account_id = account_id.to_string();
        self.writer
            .exec(move |conn| apply_delta(conn, &account_id, delta))
            .await
    }
}
