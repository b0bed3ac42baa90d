use std::sync::Arc;

use crate::accounts::{AccountRepository, AccountService, AccountServiceTrait};
use crate::budgets::{BudgetRepository, BudgetService, BudgetServiceTrait};
use crate::db::{self, DbPool, WriteHandle};
use crate::errors::Result;
use crate::ledger::{LedgerService, LedgerServiceTrait};
use crate::recurrence::{Clock, RecurrenceScheduler, SystemClock};
use crate::transactions::{
    TransactionRepository, TransactionRepositoryTrait, TransactionService, TransactionServiceTrait,
};

/// Wires the store, the writer actor and every service together. Must be
/// created inside a Tokio runtime (the writer actor is a spawned task).
pub struct ServiceContext {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    pub account_service: Arc<dyn AccountServiceTrait>,
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub ledger_service: Arc<dyn LedgerServiceTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl ServiceContext {
    /// Opens (or creates) the database under `app_data_dir`, runs pending
    /// migrations and builds the service graph.
    pub fn new(app_data_dir: &str) -> Result<Self> {
        let db_path = db::init(app_data_dir)?;
        let pool = db::create_pool(&db_path)?;
        db::run_migrations(&pool)?;

        let writer = db::spawn_writer(&pool);

        let account_repository = Arc::new(AccountRepository::new(pool.clone(), writer.clone()));
        let budget_repository = Arc::new(BudgetRepository::new(pool.clone(), writer.clone()));
        let transaction_repository: Arc<dyn TransactionRepositoryTrait> =
            Arc::new(TransactionRepository::new(pool.clone()));

        let account_service = Arc::new(AccountService::new(account_repository));
        let budget_service = Arc::new(BudgetService::new(
            budget_repository,
            transaction_repository.clone(),
        ));
        let ledger_service = Arc::new(LedgerService::new(writer.clone()));
        let transaction_service = Arc::new(TransactionService::new(
            transaction_repository.clone(),
            writer.clone(),
        ));

        Ok(Self {
            pool,
            writer,
            account_service,
            budget_service,
            ledger_service,
            transaction_service,
            transaction_repository,
        })
    }

    /// Builds the recurrence scheduler over this context's services, with
    /// the wall clock.
    pub fn recurrence_scheduler(&self) -> Arc<RecurrenceScheduler> {
        self.recurrence_scheduler_with_clock(Arc::new(SystemClock))
    }

    /// Builds the recurrence scheduler with an injected clock.
    pub fn recurrence_scheduler_with_clock(&self, clock: Arc<dyn Clock>) -> Arc<RecurrenceScheduler> {
        Arc::new(RecurrenceScheduler::new(
            self.transaction_service.clone(),
            self.transaction_repository.clone(),
            clock,
        ))
    }
}
