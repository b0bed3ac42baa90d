#[cfg(test)]
mod tests {
    use crate::errors::{Error, Result};
    use crate::recurrence::{is_due, Clock, RecurrenceScheduler};
    use crate::transactions::*;
    use async_trait::async_trait;
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    // --- is_due -----------------------------------------------------------

    #[test]
    fn first_run_is_always_due() {
        for period in [
            RecurringPeriod::Daily,
            RecurringPeriod::Weekly,
            RecurringPeriod::Monthly,
            RecurringPeriod::Yearly,
        ] {
            assert!(is_due(period, None, at(2025, 6, 15)));
        }
    }

    #[test]
    fn daily_is_due_once_per_calendar_day() {
        let today = at(2025, 6, 15);
        assert!(!is_due(RecurringPeriod::Daily, Some(today), today));
        // An instance late last night still means today is due.
        let last_night = NaiveDate::from_ymd_opt(2025, 6, 14)
            .unwrap()
            .and_hms_opt(23, 50, 0)
            .unwrap();
        assert!(is_due(RecurringPeriod::Daily, Some(last_night), today));
    }

    #[test]
    fn weekly_waits_seven_full_days() {
        let last = at(2025, 6, 1);
        assert!(!is_due(RecurringPeriod::Weekly, Some(last), at(2025, 6, 7)));
        assert!(is_due(RecurringPeriod::Weekly, Some(last), at(2025, 6, 8)));
    }

    #[test]
    fn monthly_fires_in_any_later_month() {
        let jan15 = at(2025, 1, 15);
        assert!(is_due(RecurringPeriod::Monthly, Some(jan15), at(2025, 2, 10)));
        assert!(!is_due(RecurringPeriod::Monthly, Some(jan15), at(2025, 1, 31)));
    }

    #[test]
    fn monthly_rolls_over_the_year_boundary() {
        let dec15 = at(2024, 12, 15);
        assert!(is_due(RecurringPeriod::Monthly, Some(dec15), at(2025, 1, 3)));
    }

    #[test]
    fn yearly_fires_on_the_anniversary_only() {
        let first = at(2024, 3, 10);
        assert!(is_due(RecurringPeriod::Yearly, Some(first), at(2025, 3, 10)));
        assert!(!is_due(RecurringPeriod::Yearly, Some(first), at(2025, 3, 11)));
        assert!(!is_due(RecurringPeriod::Yearly, Some(first), at(2024, 3, 10)));
    }

    // --- run_once ---------------------------------------------------------

    struct FixedClock(NaiveDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    fn template(id: &str, account: &str, period: RecurringPeriod) -> Expense {
        Expense {
            id: id.to_string(),
            owner_id: "u1".to_string(),
            name: format!("rent-{}", id),
            amount: dec!(100),
            budget_id: "b1".to_string(),
            account_id: account.to_string(),
            category: "Housing".to_string(),
            date: at(2025, 1, 1),
            recurrence: Recurrence::Periodic(period),
            original_recurring_id: None,
            created_at: at(2025, 1, 1),
            updated_at: at(2025, 1, 1),
        }
    }

    struct MockRepository {
        expense_templates: Vec<Expense>,
        last_instance: Option<NaiveDateTime>,
    }

    impl TransactionRepositoryTrait for MockRepository {
        fn get_expense(&self, _owner_id: &str, _expense_id: &str) -> Result<Expense> {
            unimplemented!()
        }

        fn list_expenses(&self, _owner_id: &str) -> Result<Vec<Expense>> {
            unimplemented!()
        }

        fn list_expenses_by_budget(
            &self,
            _owner_id: &str,
            _budget_id: &str,
        ) -> Result<Vec<Expense>> {
            unimplemented!()
        }

        fn list_expenses_by_account(
            &self,
            _owner_id: &str,
            _account_id: &str,
        ) -> Result<Vec<Expense>> {
            unimplemented!()
        }

        fn list_expenses_by_budget_in_range(
            &self,
            _owner_id: &str,
            _budget_id: &str,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<Expense>> {
            unimplemented!()
        }

        fn list_expenses_in_range(
            &self,
            _owner_id: &str,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<Expense>> {
            unimplemented!()
        }

        fn get_income(&self, _owner_id: &str, _income_id: &str) -> Result<Income> {
            unimplemented!()
        }

        fn list_incomes(&self, _owner_id: &str) -> Result<Vec<Income>> {
            unimplemented!()
        }

        fn list_incomes_by_account(
            &self,
            _owner_id: &str,
            _account_id: &str,
        ) -> Result<Vec<Income>> {
            unimplemented!()
        }

        fn list_incomes_in_range(
            &self,
            _owner_id: &str,
            _start: NaiveDateTime,
            _end: NaiveDateTime,
        ) -> Result<Vec<Income>> {
            unimplemented!()
        }

        fn list_recurring_expense_templates(&self) -> Result<Vec<Expense>> {
            Ok(self.expense_templates.clone())
        }

        fn list_recurring_income_templates(&self) -> Result<Vec<Income>> {
            Ok(Vec::new())
        }

        fn latest_expense_instance_date(
            &self,
            _template_id: &str,
        ) -> Result<Option<NaiveDateTime>> {
            Ok(self.last_instance)
        }

        fn latest_income_instance_date(
            &self,
            _template_id: &str,
        ) -> Result<Option<NaiveDateTime>> {
            Ok(None)
        }
    }

    /// Transaction manager double: account "broke" always rejects, everything
    /// else records the created instance.
    struct MockTransactionService {
        created: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TransactionServiceTrait for MockTransactionService {
        async fn create_expense(&self, _new_expense: NewExpense) -> Result<Expense> {
            unimplemented!()
        }

        async fn update_expense(
            &self,
            _owner_id: &str,
            _expense_id: &str,
            _update: ExpenseUpdate,
        ) -> Result<Expense> {
            unimplemented!()
        }

        async fn delete_expense(&self, _owner_id: &str, _expense_id: &str) -> Result<Expense> {
            unimplemented!()
        }

        async fn create_income(&self, _new_income: NewIncome) -> Result<Income> {
            unimplemented!()
        }

        async fn update_income(
            &self,
            _owner_id: &str,
            _income_id: &str,
            _update: IncomeUpdate,
        ) -> Result<Income> {
            unimplemented!()
        }

        async fn delete_income(&self, _owner_id: &str, _income_id: &str) -> Result<Income> {
            unimplemented!()
        }

        async fn delete_account(&self, _owner_id: &str, _account_id: &str) -> Result<()> {
            unimplemented!()
        }

        async fn delete_budget(&self, _owner_id: &str, _budget_id: &str) -> Result<()> {
            unimplemented!()
        }

        fn get_transactions(&self, _owner_id: &str) -> Result<TransactionFeed> {
            unimplemented!()
        }

        fn get_transactions_by_account(
            &self,
            _owner_id: &str,
            _account_id: &str,
        ) -> Result<TransactionFeed> {
            unimplemented!()
        }

        fn get_current_month_transactions(
            &self,
            _owner_id: &str,
        ) -> Result<Vec<TransactionView>> {
            unimplemented!()
        }

        async fn create_recurring_expense_instance(
            &self,
            template: &Expense,
            now: NaiveDateTime,
        ) -> Result<Option<Expense>> {
            if template.account_id == "broke" {
                return Err(Error::InsufficientFunds("no funds".to_string()));
            }
            self.created.lock().unwrap().push(template.id.clone());
            let mut instance = template.clone();
            instance.id = format!("{}-instance", template.id);
            instance.recurrence = Recurrence::None;
            instance.original_recurring_id = Some(template.id.clone());
            instance.date = now;
            Ok(Some(instance))
        }

        async fn create_recurring_income_instance(
            &self,
            _template: &Income,
            _now: NaiveDateTime,
        ) -> Result<Option<Income>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn one_failing_template_does_not_stop_the_sweep() {
        let repository = Arc::new(MockRepository {
            expense_templates: vec![
                template("t1", "broke", RecurringPeriod::Daily),
                template("t2", "a1", RecurringPeriod::Daily),
                template("t3", "a1", RecurringPeriod::Daily),
            ],
            last_instance: None,
        });
        let transactions = Arc::new(MockTransactionService {
            created: Mutex::new(Vec::new()),
        });
        let scheduler = RecurrenceScheduler::new(
            transactions.clone(),
            repository,
            Arc::new(FixedClock(at(2025, 6, 15))),
        );

        let report = scheduler.run_once().await.unwrap();

        assert_eq!(report.templates_checked, 3);
        assert_eq!(report.instances_created, 2);
        assert_eq!(report.failures, 1);
        assert_eq!(
            *transactions.created.lock().unwrap(),
            vec!["t2".to_string(), "t3".to_string()]
        );
    }

    #[tokio::test]
    async fn not_due_templates_are_skipped() {
        let today = at(2025, 6, 15);
        let repository = Arc::new(MockRepository {
            expense_templates: vec![template("t1", "a1", RecurringPeriod::Daily)],
            last_instance: Some(today),
        });
        let transactions = Arc::new(MockTransactionService {
            created: Mutex::new(Vec::new()),
        });
        let scheduler = RecurrenceScheduler::new(
            transactions.clone(),
            repository,
            Arc::new(FixedClock(today)),
        );

        let report = scheduler.run_once().await.unwrap();

        assert_eq!(report.templates_checked, 1);
        assert_eq!(report.instances_created, 0);
        assert!(transactions.created.lock().unwrap().is_empty());
    }
}
