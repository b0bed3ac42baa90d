pub mod db;

pub mod accounts;
pub mod budgets;
pub mod insights;
pub mod ledger;
pub mod receipts;
pub mod recurrence;
pub mod transactions;

pub mod constants;
pub mod context;
pub mod errors;
pub mod schema;
pub mod utils;

pub use context::ServiceContext;
pub use errors::{Error, Result};
