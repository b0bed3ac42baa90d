use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::accounts::accounts_model::{Account, AccountDB, AccountUpdate, NewAccount};
use crate::accounts::accounts_traits::AccountRepositoryTrait;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{Error, Result};
use crate::schema::accounts;

/// Loads an account row scoped to its owner. A foreign or absent account is
/// indistinguishable to the caller: both are NotFound.
pub(crate) fn load_account(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    account_id: &str,
) -> Result<Account> {
    accounts::table
        .find(account_id)
        .filter(accounts::owner_id.eq(some_owner_id))
        .first::<AccountDB>(conn)
        .map(Account::from)
        .map_err(|e| match e {
            diesel::result::Error::NotFound => {
                Error::NotFound(format!("Account with id {} not found", account_id))
            }
            other => Error::from(other),
        })
}

/// Deletes an account row scoped to its owner.
pub(crate) fn delete_account_row(
    conn: &mut SqliteConnection,
    some_owner_id: &str,
    account_id: &str,
) -> Result<usize> {
    let affected = diesel::delete(
        accounts::table
            .find(account_id)
            .filter(accounts::owner_id.eq(some_owner_id)),
    )
    .execute(conn)?;

    if affected == 0 {
        return Err(Error::NotFound(format!(
            "Account with id {} not found",
            account_id
        )));
    }

    Ok(affected)
}

/// Repository for managing account rows, scoped by owner
pub struct AccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl AccountRepository {
    /// Creates a new AccountRepository instance
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn insert(new_account: NewAccount, conn: &mut SqliteConnection) -> Result<Account> {
        let mut account_db: AccountDB = new_account.into();
        account_db.id = Uuid::new_v4().to_string();

        diesel::insert_into(accounts::table)
            .values(&account_db)
            .get_result::<AccountDB>(conn)
            .map(Account::from)
            .map_err(Error::from)
    }
}

#[async_trait]
impl AccountRepositoryTrait for AccountRepository {
    async fn create(&self, new_account: NewAccount) -> Result<Account> {
        self.writer
            .exec(move |conn| AccountRepository::insert(new_account, conn))
            .await
    }

    async fn update(&self, some_owner_id: String, update: AccountUpdate) -> Result<Account> {
        self.writer
            .exec(move |conn| {
                let existing = load_account(conn, &some_owner_id, &update.id)?;

                diesel::update(accounts::table.find(&existing.id))
                    .set((
                        accounts::name.eq(update.name.trim()),
                        accounts::updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .get_result::<AccountDB>(conn)
                    .map(Account::from)
                    .map_err(Error::from)
            })
            .await
    }

    fn get_by_id(&self, some_owner_id: &str, account_id: &str) -> Result<Account> {
        let mut conn = get_connection(&self.pool)?;
        load_account(&mut conn, some_owner_id, account_id)
    }

    fn list(&self, some_owner_id: &str) -> Result<Vec<Account>> {
        let mut conn = get_connection(&self.pool)?;

        accounts::table
            .filter(accounts::owner_id.eq(some_owner_id))
            .order(accounts::name.asc())
            .load::<AccountDB>(&mut conn)
            .map(|rows| rows.into_iter().map(Account::from).collect())
            .map_err(Error::from)
    }
}
