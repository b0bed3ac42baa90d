//! Background generation of dated instances from recurring templates.
//!
//! The scheduler re-reads every recurring income/expense template on each
//! sweep, decides whether an instance is due, and routes creation through
//! the transaction manager so balances and budgets move exactly as they do
//! for a manual entry. One template failing (say, an overdrawn account)
//! never stops the rest of the sweep.

use chrono::{Datelike, NaiveDateTime};
use log::{error, info};
use serde::Serialize;
use std::sync::Arc;
use tokio::time::{interval, Duration};

use crate::constants::{RECURRENCE_INITIAL_DELAY_SECS, RECURRENCE_INTERVAL_SECS};
use crate::errors::Result;
use crate::transactions::{
    RecurringPeriod, TransactionRepositoryTrait, TransactionServiceTrait,
};
use crate::utils::time_utils::days_between;

/// Time source for due-date decisions, injectable so the schedule logic is
/// testable without waiting for real days to pass.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the server's local timezone; sweeps are meant to run
/// once after local midnight.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Whether a template with the given period is due for a new instance.
///
/// `last` is the date of the most recent generated instance, if any. A
/// template with no instance yet is always due.
pub fn is_due(period: RecurringPeriod, last: Option<NaiveDateTime>, now: NaiveDateTime) -> bool {
    let Some(last) = last else {
        return true;
    };

    match period {
        // Due whenever the last instance is from an earlier calendar day.
        RecurringPeriod::Daily => last.date() < now.date(),
        RecurringPeriod::Weekly => days_between(last, now) >= 7,
        // A strictly later (year, month) pair, so December rolls into January.
        RecurringPeriod::Monthly => {
            (now.year(), now.month()) > (last.year(), last.month())
        }
        // Fires once a year, on the anniversary date only.
        RecurringPeriod::Yearly => {
            now.year() > last.year() && now.month() == last.month() && now.day() == last.day()
        }
    }
}

/// Outcome of one scheduler sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRunReport {
    pub templates_checked: usize,
    pub instances_created: usize,
    pub failures: usize,
}

/// Periodic job that materializes due recurring templates
pub struct RecurrenceScheduler {
    transactions: Arc<dyn TransactionServiceTrait>,
    repository: Arc<dyn TransactionRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl RecurrenceScheduler {
    /// Creates a new RecurrenceScheduler instance
    pub fn new(
        transactions: Arc<dyn TransactionServiceTrait>,
        repository: Arc<dyn TransactionRepositoryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transactions,
            repository,
            clock,
        }
    }

    /// Runs a single sweep over all recurring templates. Also the manual
    /// trigger entry point.
    pub async fn run_once(&self) -> Result<RecurrenceRunReport> {
        let now = self.clock.now();
        let mut report = RecurrenceRunReport::default();

        for template in self.repository.list_recurring_expense_templates()? {
            report.templates_checked += 1;
            let due = template.recurrence.period().is_some_and(|period| {
                let last = match self.repository.latest_expense_instance_date(&template.id) {
                    Ok(last) => last,
                    Err(e) => {
                        error!("Skipping recurring expense {}: {}", template.id, e);
                        report.failures += 1;
                        return false;
                    }
                };
                is_due(period, last, now)
            });
            if !due {
                continue;
            }

            match self
                .transactions
                .create_recurring_expense_instance(&template, now)
                .await
            {
                Ok(Some(_)) => report.instances_created += 1,
                Ok(None) => {}
                Err(e) => {
                    error!(
                        "Failed to create instance of recurring expense {}: {}",
                        template.id, e
                    );
                    report.failures += 1;
                }
            }
        }

        for template in self.repository.list_recurring_income_templates()? {
            report.templates_checked += 1;
            let due = template.recurrence.period().is_some_and(|period| {
                let last = match self.repository.latest_income_instance_date(&template.id) {
                    Ok(last) => last,
                    Err(e) => {
                        error!("Skipping recurring income {}: {}", template.id, e);
                        report.failures += 1;
                        return false;
                    }
                };
                is_due(period, last, now)
            });
            if !due {
                continue;
            }

            match self
                .transactions
                .create_recurring_income_instance(&template, now)
                .await
            {
                Ok(Some(_)) => report.instances_created += 1,
                Ok(None) => {}
                Err(e) => {
                    error!(
                        "Failed to create instance of recurring income {}: {}",
                        template.id, e
                    );
                    report.failures += 1;
                }
            }
        }

        Ok(report)
    }

    /// Starts the background sweep loop with the default daily cadence.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        self.spawn_with_interval(Duration::from_secs(RECURRENCE_INTERVAL_SECS))
    }

    /// Starts the background sweep loop on a custom cadence.
    pub fn spawn_with_interval(self: Arc<Self>, period: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("Recurrence scheduler started ({:?} interval)", period);

            tokio::time::sleep(Duration::from_secs(RECURRENCE_INITIAL_DELAY_SECS)).await;

            let mut sweep_interval = interval(period);
            loop {
                sweep_interval.tick().await;
                match self.run_once().await {
                    Ok(report) => {
                        info!(
                            "Recurrence sweep done: {} templates, {} created, {} failed",
                            report.templates_checked,
                            report.instances_created,
                            report.failures
                        );
                    }
                    Err(e) => {
                        error!("Recurrence sweep failed: {}", e);
                    }
                }
            }
        })
    }
}
