// Module declarations
pub(crate) mod transactions_model;
pub(crate) mod transactions_repository;
pub(crate) mod transactions_service;
pub(crate) mod transactions_traits;

// Re-export the public interface
pub use transactions_model::{
    Expense, ExpenseDB, ExpenseUpdate, Income, IncomeDB, IncomeUpdate, NewExpense, NewIncome,
    Recurrence, RecurringPeriod, TransactionFeed, TransactionKind, TransactionView,
};
pub use transactions_repository::TransactionRepository;
pub use transactions_service::TransactionService;
pub use transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
