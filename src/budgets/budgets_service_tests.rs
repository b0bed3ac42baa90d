#[cfg(test)]
mod tests {
    use crate::budgets::{
        Budget, BudgetRepositoryTrait, BudgetService, BudgetServiceTrait, BudgetUpdate, NewBudget,
    };
    use crate::constants::{DEFAULT_BUDGET_ICON, DEFAULT_BUDGET_NAME};
    use crate::errors::{Error, Result};
    use crate::transactions::{Expense, Income, TransactionRepositoryTrait};
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    // --- Mock BudgetRepository ---
    #[derive(Clone)]
    struct MockBudgetRepository {
        budgets: Arc<Mutex<Vec<Budget>>>,
    }

    impl MockBudgetRepository {
        fn new() -> Self {
            Self {
                budgets: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl BudgetRepositoryTrait for MockBudgetRepository {
        async fn create(&self, new_budget: NewBudget) -> Result<Budget> {
            let budget = Budget {
                id: Uuid::new_v4().to_string(),
                owner_id: new_budget.owner_id,
                name: new_budget.name.trim().to_string(),
                amount: new_budget.amount,
                icon: new_budget.icon,
                ..Default::default()
            };
            self.budgets.lock().unwrap().push(budget.clone());
            Ok(budget)
        }

        async fn update(&self, owner_id: String, update: BudgetUpdate) -> Result<Budget> {
            let mut budgets = self.budgets.lock().unwrap();
            let budget = budgets
                .iter_mut()
                .find(|b| b.id == update.id && b.owner_id == owner_id)
                .ok_or_else(|| Error::NotFound("budget".to_string()))?;
            if let Some(name) = &update.name {
                budget.name = name.trim().to_string();
            }
            if let Some(icon) = &update.icon {
                budget.icon = icon.trim().to_string();
            }
            budget.amount = update.amount;
            Ok(budget.clone())
        }

        async fn ensure_default(&self, owner_id: String) -> Result<Budget> {
            let existing = self
                .budgets
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.owner_id == owner_id && b.is_default)
                .cloned();
            if let Some(found) = existing {
                return Ok(found);
            }
            let budget = Budget {
                id: Uuid::new_v4().to_string(),
                owner_id,
                name: DEFAULT_BUDGET_NAME.to_string(),
                icon: DEFAULT_BUDGET_ICON.to_string(),
                is_default: true,
                ..Default::default()
            };
            self.budgets.lock().unwrap().push(budget.clone());
            Ok(budget)
        }

        fn get_by_id(&self, owner_id: &str, budget_id: &str) -> Result<Budget> {
            self.budgets
                .lock()
                .unwrap()
                .iter()
                .find(|b| b.id == budget_id && b.owner_id == owner_id)
                .cloned()
                .ok_or_else(|| Error::NotFound("budget".to_string()))
        }

        fn list(&self, owner_id: &str) -> Result<Vec<Budget>> {
            Ok(self
                .budgets
                .lock()
                .unwrap()
                .iter()
                .filter(|b| b.owner_id == owner_id)
                .cloned()
                .collect())
        }

        async fn recompute_all(&self, owner_id: String) -> Result<Vec<Budget>> {
            self.list(&owner_id)
        }
    }

    // --- Mock TransactionRepository (reads only; summaries need the
    // current-month expense subset) ---
    struct MockTransactionRepository;

    impl TransactionRepositoryTrait for MockTransactionRepository {
        fn get_expense(&self, _owner_id: &str, _expense_id: &str) -> Result<Expense> {
            unimplemented!()
        }

        fn list_expenses(&self, _owner_id: &str) -> Result<Vec<Expense>> {
            Ok(Vec::new())
        }

        fn list_expenses_by_budget(
            &self,
            _owner_id: &str,
            _budget_id: &str,
        ) -> Result<Vec<Expense>> {
            Ok(Vec::new())
        }

        fn list_expenses_by_account(
            &self,
            _owner_id: &str,
            _account_id: &str,
        ) -> Result<Vec<Expense>> {
            Ok(Vec::new())
        }

        fn list_expenses_by_budget_in_range(
            &self,
            _owner_id: &str,
            _budget_id: &str,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<Expense>> {
            Ok(Vec::new())
        }

        fn list_expenses_in_range(
            &self,
            _owner_id: &str,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<Expense>> {
            Ok(Vec::new())
        }

        fn get_income(&self, _owner_id: &str, _income_id: &str) -> Result<Income> {
            unimplemented!()
        }

        fn list_incomes(&self, _owner_id: &str) -> Result<Vec<Income>> {
            Ok(Vec::new())
        }

        fn list_incomes_by_account(
            &self,
            _owner_id: &str,
            _account_id: &str,
        ) -> Result<Vec<Income>> {
            Ok(Vec::new())
        }

        fn list_incomes_in_range(
            &self,
            _owner_id: &str,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<Income>> {
            Ok(Vec::new())
        }

        fn list_recurring_expense_templates(&self) -> Result<Vec<Expense>> {
            Ok(Vec::new())
        }

        fn list_recurring_income_templates(&self) -> Result<Vec<Income>> {
            Ok(Vec::new())
        }

        fn latest_expense_instance_date(
            &self,
            _template_id: &str,
        ) -> Result<Option<NaiveDateTime>> {
            Ok(None)
        }

        fn latest_income_instance_date(
            &self,
            _template_id: &str,
        ) -> Result<Option<NaiveDateTime>> {
            Ok(None)
        }
    }

    fn service_with(repo: MockBudgetRepository) -> BudgetService {
        BudgetService::new(Arc::new(repo), Arc::new(MockTransactionRepository))
    }

    fn new_budget(owner: &str, name: &str) -> NewBudget {
        NewBudget {
            id: None,
            owner_id: owner.to_string(),
            name: name.to_string(),
            amount: dec!(100),
            icon: "🍞".to_string(),
        }
    }

    #[tokio::test]
    async fn create_budget_rejects_duplicate_name_case_insensitively() {
        let repo = MockBudgetRepository::new();
        let service = service_with(repo);

        service.create_budget(new_budget("u1", "Food")).await.unwrap();
        let err = service
            .create_budget(new_budget("u1", "fOOd"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_name_is_allowed_across_owners() {
        let repo = MockBudgetRepository::new();
        let service = service_with(repo);

        service.create_budget(new_budget("u1", "Food")).await.unwrap();
        service.create_budget(new_budget("u2", "Food")).await.unwrap();
    }

    #[tokio::test]
    async fn create_budget_rejects_negative_amount_before_any_store_call() {
        let service = service_with(MockBudgetRepository::new());

        let mut input = new_budget("u1", "Food");
        input.amount = dec!(-5);
        let err = service.create_budget(input).await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn default_budget_accepts_amount_edits_only() {
        let repo = MockBudgetRepository::new();
        let service = service_with(repo.clone());
        let default = service.ensure_default_budget("u1").await.unwrap();

        // Renaming is rejected outright.
        let err = service
            .update_budget(
                "u1",
                BudgetUpdate {
                    id: default.id.clone(),
                    name: Some("Misc".to_string()),
                    amount: dec!(50),
                    icon: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        // A changed icon is rejected too.
        let err = service
            .update_budget(
                "u1",
                BudgetUpdate {
                    id: default.id.clone(),
                    name: None,
                    amount: dec!(50),
                    icon: Some("💰".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        // The amount alone goes through, identity untouched.
        let updated = service
            .update_budget(
                "u1",
                BudgetUpdate {
                    id: default.id.clone(),
                    name: None,
                    amount: dec!(50),
                    icon: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.amount, dec!(50));
        assert_eq!(updated.name, DEFAULT_BUDGET_NAME);
        assert!(updated.is_default);
    }

    #[tokio::test]
    async fn update_of_regular_budget_requires_name_and_icon() {
        let repo = MockBudgetRepository::new();
        let service = service_with(repo.clone());
        let food = service.create_budget(new_budget("u1", "Food")).await.unwrap();

        let err = service
            .update_budget(
                "u1",
                BudgetUpdate {
                    id: food.id.clone(),
                    name: None,
                    amount: dec!(80),
                    icon: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn regular_budget_rename_checks_for_conflicts() {
        let repo = MockBudgetRepository::new();
        let service = service_with(repo.clone());
        service.create_budget(new_budget("u1", "Food")).await.unwrap();
        let travel = service
            .create_budget(new_budget("u1", "Travel"))
            .await
            .unwrap();

        let err = service
            .update_budget(
                "u1",
                BudgetUpdate {
                    id: travel.id.clone(),
                    name: Some("FOOD".to_string()),
                    amount: dec!(10),
                    icon: Some("✈️".to_string()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));
    }

    #[tokio::test]
    async fn get_budgets_materializes_the_default() {
        let repo = MockBudgetRepository::new();
        let service = service_with(repo.clone());

        let budgets = service.get_budgets("fresh-owner").await.unwrap();

        assert_eq!(budgets.len(), 1);
        assert!(budgets[0].is_default);
        assert_eq!(budgets[0].name, DEFAULT_BUDGET_NAME);
    }

    #[tokio::test]
    async fn ensure_default_is_idempotent() {
        let repo = MockBudgetRepository::new();
        let service = service_with(repo.clone());

        let first = service.ensure_default_budget("u1").await.unwrap();
        let second = service.ensure_default_budget("u1").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(repo.budgets.lock().unwrap().len(), 1);
    }
}
