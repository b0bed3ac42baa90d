/// Name of the per-owner catch-all budget
pub const DEFAULT_BUDGET_NAME: &str = "Others";

/// Icon assigned to the catch-all budget
pub const DEFAULT_BUDGET_ICON: &str = "🗂️";

/// Maximum length of an account name
pub const ACCOUNT_NAME_MAX_LEN: usize = 100;

/// Maximum length of a budget name
pub const BUDGET_NAME_MAX_LEN: usize = 20;

/// Maximum length of an expense name
pub const EXPENSE_NAME_MAX_LEN: usize = 150;

/// Maximum length of an income name
pub const INCOME_NAME_MAX_LEN: usize = 100;

/// Upper bound on a single store write, after which the outcome is unknown
pub const STORE_WRITE_TIMEOUT_SECS: u64 = 30;

/// Recurrence sweep interval: once a day
pub const RECURRENCE_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Delay before the first recurrence sweep after startup
pub const RECURRENCE_INITIAL_DELAY_SECS: u64 = 60;

/// Most chat sessions the insight collaborator keeps in memory at once
pub const CHAT_SESSION_CAPACITY: usize = 256;
