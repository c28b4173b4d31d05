//! Expense endpoints: categories, payment methods, expenses, recurring costs

use super::{file_part, ApiClient, ClientError, ClientResult};
use crate::events::{Mutation, ResourceKind};
use crate::model::{
    CategoryDraft, Expense, ExpenseCategory, ExpenseDraft, ExpenseFilter, ExpenseSummary,
    ExpenseYearlySummary, GenerateResult, Id, PaymentMethod, PaymentMethodDraft, RecurringDraft,
    RecurringExpense,
};
use reqwest::{multipart, Method};
use serde::Serialize;

impl ApiClient {
    // ============================================
    // Categories
    // ============================================

    pub async fn list_expense_categories(&self) -> ClientResult<Vec<ExpenseCategory>> {
        self.get_json("expenses/categories/", &[], "Failed to load categories")
            .await
    }

    pub async fn create_expense_category(&self, draft: &CategoryDraft) -> ClientResult<ExpenseCategory> {
        let category: ExpenseCategory = self
            .send_json(Method::POST, "expenses/categories/", draft, "Failed to create category")
            .await?;
        self.notify(ResourceKind::ExpenseSettings, Mutation::Created, Some(category.id));
        Ok(category)
    }

    pub async fn update_expense_category(
        &self,
        id: Id,
        draft: &CategoryDraft,
    ) -> ClientResult<ExpenseCategory> {
        let category: ExpenseCategory = self
            .send_json(
                Method::PUT,
                &format!("expenses/categories/{}/", id),
                draft,
                "Failed to update category",
            )
            .await?;
        self.notify(ResourceKind::ExpenseSettings, Mutation::Updated, Some(id));
        Ok(category)
    }

    pub async fn delete_expense_category(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("expenses/categories/{}/", id), "Failed to delete category")
            .await?;
        self.notify(ResourceKind::ExpenseSettings, Mutation::Deleted, Some(id));
        Ok(())
    }

    // ============================================
    // Payment methods
    // ============================================

    pub async fn list_payment_methods(&self) -> ClientResult<Vec<PaymentMethod>> {
        self.get_json("expenses/payment-methods/", &[], "Failed to load payment methods")
            .await
    }

    pub async fn create_payment_method(&self, draft: &PaymentMethodDraft) -> ClientResult<PaymentMethod> {
        let method: PaymentMethod = self
            .send_json(
                Method::POST,
                "expenses/payment-methods/",
                draft,
                "Failed to create payment method",
            )
            .await?;
        self.notify(ResourceKind::ExpenseSettings, Mutation::Created, Some(method.id));
        Ok(method)
    }

    pub async fn update_payment_method(
        &self,
        id: Id,
        draft: &PaymentMethodDraft,
    ) -> ClientResult<PaymentMethod> {
        let method: PaymentMethod = self
            .send_json(
                Method::PUT,
                &format!("expenses/payment-methods/{}/", id),
                draft,
                "Failed to update payment method",
            )
            .await?;
        self.notify(ResourceKind::ExpenseSettings, Mutation::Updated, Some(id));
        Ok(method)
    }

    pub async fn delete_payment_method(&self, id: Id) -> ClientResult<()> {
        self.delete(
            &format!("expenses/payment-methods/{}/", id),
            "Failed to delete payment method",
        )
        .await?;
        self.notify(ResourceKind::ExpenseSettings, Mutation::Deleted, Some(id));
        Ok(())
    }

    // ============================================
    // Expenses
    // ============================================

    pub async fn list_expenses(&self, filter: &ExpenseFilter) -> ClientResult<Vec<Expense>> {
        self.get_json("expenses/expenses/", &filter.to_query(), "Failed to load expenses")
            .await
    }

    /// Create an expense (multipart, with the receipt image if one is set)
    pub async fn create_expense(&self, draft: &ExpenseDraft) -> ClientResult<Expense> {
        let form = Self::expense_form(draft).await?;
        let expense: Expense = self
            .send_multipart(Method::POST, "expenses/expenses/", form, "Failed to create expense")
            .await?;
        self.notify(ResourceKind::Expenses, Mutation::Created, Some(expense.id));
        Ok(expense)
    }

    /// Update an expense; without a new receipt the stored one is kept
    pub async fn update_expense(&self, id: Id, draft: &ExpenseDraft) -> ClientResult<Expense> {
        let form = Self::expense_form(draft).await?;
        let expense: Expense = self
            .send_multipart(
                Method::PUT,
                &format!("expenses/expenses/{}/", id),
                form,
                "Failed to update expense",
            )
            .await?;
        self.notify(ResourceKind::Expenses, Mutation::Updated, Some(id));
        Ok(expense)
    }

    pub async fn delete_expense(&self, id: Id) -> ClientResult<()> {
        self.delete(&format!("expenses/expenses/{}/", id), "Failed to delete expense")
            .await?;
        self.notify(ResourceKind::Expenses, Mutation::Deleted, Some(id));
        Ok(())
    }

    pub async fn expense_summary(&self, year: i32, month: u32) -> ClientResult<ExpenseSummary> {
        let query = [("year", year.to_string()), ("month", month.to_string())];
        self.get_json("expenses/expenses/summary/", &query, "Failed to load summary")
            .await
    }

    pub async fn expense_yearly_summary(&self, year: i32) -> ClientResult<ExpenseYearlySummary> {
        let query = [("year", year.to_string())];
        self.get_json(
            "expenses/expenses/yearly_summary/",
            &query,
            "Failed to load yearly summary",
        )
        .await
    }

    /// Full expense rows for export, honoring the same filters as the list
    pub async fn export_expenses(&self, filter: &ExpenseFilter) -> ClientResult<Vec<Expense>> {
        self.get_json("expenses/expenses/export/", &filter.to_query(), "Failed to export expenses")
            .await
    }

    async fn expense_form(draft: &ExpenseDraft) -> ClientResult<multipart::Form> {
        if draft.description.trim().is_empty() {
            return Err(ClientError::InvalidInput("expense description is required".to_string()));
        }

        let mut form = multipart::Form::new();
        for (name, value) in draft.form_fields() {
            form = form.text(name, value);
        }
        if let Some(path) = &draft.receipt_image {
            form = form.part("receipt_image", file_part(path).await?);
        }
        Ok(form)
    }

    // ============================================
    // Recurring expenses
    // ============================================

    pub async fn list_recurring_expenses(&self) -> ClientResult<Vec<RecurringExpense>> {
        self.get_json("expenses/recurring/", &[], "Failed to load recurring expenses")
            .await
    }

    pub async fn create_recurring_expense(&self, draft: &RecurringDraft) -> ClientResult<RecurringExpense> {
        Self::check_day_of_month(draft)?;
        let recurring: RecurringExpense = self
            .send_json(
                Method::POST,
                "expenses/recurring/",
                draft,
                "Failed to create recurring expense",
            )
            .await?;
        self.notify(ResourceKind::RecurringExpenses, Mutation::Created, Some(recurring.id));
        Ok(recurring)
    }

    pub async fn update_recurring_expense(
        &self,
        id: Id,
        draft: &RecurringDraft,
    ) -> ClientResult<RecurringExpense> {
        Self::check_day_of_month(draft)?;
        let recurring: RecurringExpense = self
            .send_json(
                Method::PUT,
                &format!("expenses/recurring/{}/", id),
                draft,
                "Failed to update recurring expense",
            )
            .await?;
        self.notify(ResourceKind::RecurringExpenses, Mutation::Updated, Some(id));
        Ok(recurring)
    }

    pub async fn delete_recurring_expense(&self, id: Id) -> ClientResult<()> {
        self.delete(
            &format!("expenses/recurring/{}/", id),
            "Failed to delete recurring expense",
        )
        .await?;
        self.notify(ResourceKind::RecurringExpenses, Mutation::Deleted, Some(id));
        Ok(())
    }

    /// Create this month's expenses from the active recurring ones
    ///
    /// The backend skips entries already generated for that month.
    pub async fn generate_recurring_expenses(&self, year: i32, month: u32) -> ClientResult<GenerateResult> {
        #[derive(Serialize)]
        struct GenerateRequest {
            year: i32,
            month: u32,
        }

        if !(1..=12).contains(&month) {
            return Err(ClientError::InvalidInput(format!("invalid month: {}", month)));
        }

        let result: GenerateResult = self
            .send_json(
                Method::POST,
                "expenses/recurring/generate/",
                &GenerateRequest { year, month },
                "Failed to generate recurring expenses",
            )
            .await?;

        if !result.created.is_empty() {
            self.notify(ResourceKind::Expenses, Mutation::Generated, None);
            self.notify(ResourceKind::RecurringExpenses, Mutation::Updated, None);
        }
        Ok(result)
    }

    fn check_day_of_month(draft: &RecurringDraft) -> ClientResult<()> {
        if !(1..=31).contains(&draft.day_of_month) {
            return Err(ClientError::InvalidInput(format!(
                "day of month must be 1-31, got {}",
                draft.day_of_month
            )));
        }
        Ok(())
    }
}
