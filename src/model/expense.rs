//! Expense tracking types
//!
//! Amounts are whole currency units, as stored by the backend.

use super::{format_date, Id};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Who bears an expense
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    #[default]
    Personal,
    Business,
}

impl ExpenseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Personal => "personal",
            ExpenseType::Business => "business",
        }
    }
}

impl std::fmt::Display for ExpenseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ExpenseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "personal" => Ok(ExpenseType::Personal),
            "business" => Ok(ExpenseType::Business),
            other => Err(format!("unknown expense type: {}", other)),
        }
    }
}

/// Repetition of a recurring expense
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Monthly,
    Yearly,
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Yearly => write!(f, "yearly"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseCategory {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryDraft {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub sort_order: i32,
    pub is_active: bool,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: "📁".to_string(),
            color: "gray".to_string(),
            sort_order: 0,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentMethod {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PaymentMethodDraft {
    pub name: String,
    pub icon: String,
    pub sort_order: i32,
    pub is_active: bool,
}

impl PaymentMethodDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: "💳".to_string(),
            sort_order: 0,
            is_active: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Sums over an empty set arrive as `null`
fn null_as_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

/// A single expense entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: Id,
    pub date: NaiveDate,
    pub amount: u64,
    pub expense_type: ExpenseType,
    #[serde(default)]
    pub category: Option<Id>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_icon: Option<String>,
    #[serde(default)]
    pub payment_method: Option<Id>,
    #[serde(default)]
    pub payment_method_name: Option<String>,
    #[serde(default)]
    pub payment_method_icon: Option<String>,
    pub description: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default)]
    pub receipt_image_url: Option<String>,
    /// Recurring expense this entry was generated from
    #[serde(default)]
    pub recurring_expense: Option<Id>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create/update payload for an expense, sent as a multipart form
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub date: NaiveDate,
    pub amount: u64,
    pub expense_type: ExpenseType,
    pub description: String,
    pub category: Option<Id>,
    pub payment_method: Option<Id>,
    pub memo: String,
    /// Local receipt image to upload; `None` keeps the stored one on update
    pub receipt_image: Option<PathBuf>,
}

impl ExpenseDraft {
    pub fn new(date: NaiveDate, amount: u64, description: impl Into<String>) -> Self {
        Self {
            date,
            amount,
            expense_type: ExpenseType::default(),
            description: description.into(),
            category: None,
            payment_method: None,
            memo: String::new(),
            receipt_image: None,
        }
    }

    /// Text fields of the multipart form, in the order the backend reads them.
    /// Empty optional fields are left out.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("date", format_date(self.date)),
            ("amount", self.amount.to_string()),
            ("expense_type", self.expense_type.to_string()),
            ("description", self.description.clone()),
        ];
        if let Some(category) = self.category {
            fields.push(("category", category.to_string()));
        }
        if let Some(method) = self.payment_method {
            fields.push(("payment_method", method.to_string()));
        }
        if !self.memo.is_empty() {
            fields.push(("memo", self.memo.clone()));
        }
        fields
    }
}

/// Query filters for the expense list and export endpoints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub expense_type: Option<ExpenseType>,
    pub category: Option<Id>,
    pub payment_method: Option<Id>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl ExpenseFilter {
    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            ..Default::default()
        }
    }

    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(year) = self.year {
            query.push(("year", year.to_string()));
        }
        if let Some(month) = self.month {
            query.push(("month", month.to_string()));
        }
        if let Some(kind) = self.expense_type {
            query.push(("expense_type", kind.to_string()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        if let Some(method) = self.payment_method {
            query.push(("payment_method", method.to_string()));
        }
        if let Some(start) = self.start_date {
            query.push(("start_date", format_date(start)));
        }
        if let Some(end) = self.end_date {
            query.push(("end_date", format_date(end)));
        }
        query
    }
}

/// Monthly totals, broken down by category and payment method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseSummary {
    pub year: i32,
    pub month: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub personal_total: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub business_total: u64,
    #[serde(default)]
    pub by_category: Vec<CategoryTotal>,
    #[serde(default)]
    pub by_payment_method: Vec<MethodTotal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    /// `None` for uncategorized expenses
    pub id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MethodTotal {
    pub id: Option<Id>,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseYearlySummary {
    pub year: i32,
    pub monthly_data: Vec<MonthTotal>,
    pub year_total: u64,
    pub year_personal_total: u64,
    pub year_business_total: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthTotal {
    pub month: u32,
    #[serde(default)]
    pub month_label: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub personal_total: u64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub business_total: u64,
}

/// A fixed cost that generates one expense per period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringExpense {
    pub id: Id,
    pub name: String,
    pub amount: u64,
    pub expense_type: ExpenseType,
    #[serde(default)]
    pub category: Option<Id>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub payment_method: Option<Id>,
    #[serde(default)]
    pub payment_method_name: Option<String>,
    #[serde(default)]
    pub frequency: Frequency,
    pub day_of_month: u32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub last_generated_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecurringDraft {
    pub name: String,
    pub amount: u64,
    pub expense_type: ExpenseType,
    pub category: Option<Id>,
    pub payment_method: Option<Id>,
    pub frequency: Frequency,
    pub day_of_month: u32,
    pub is_active: bool,
}

impl RecurringDraft {
    pub fn new(name: impl Into<String>, amount: u64, day_of_month: u32) -> Self {
        Self {
            name: name.into(),
            amount,
            expense_type: ExpenseType::default(),
            category: None,
            payment_method: None,
            frequency: Frequency::default(),
            day_of_month,
            is_active: true,
        }
    }
}

/// Result of generating a month's expenses from recurring ones
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResult {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created: Vec<Expense>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_only_includes_set_fields() {
        let filter = ExpenseFilter {
            expense_type: Some(ExpenseType::Business),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..ExpenseFilter::month(2024, 2)
        };

        assert_eq!(
            filter.to_query(),
            vec![
                ("year", "2024".to_string()),
                ("month", "2".to_string()),
                ("expense_type", "business".to_string()),
                ("start_date", "2024-01-01".to_string()),
            ]
        );
        assert!(ExpenseFilter::default().to_query().is_empty());
    }

    #[test]
    fn test_draft_form_fields_skip_empty_optionals() {
        let draft = ExpenseDraft::new(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(), 1200, "Taxi");
        let names: Vec<&str> = draft.form_fields().iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["date", "amount", "expense_type", "description"]);

        let with_memo = ExpenseDraft {
            memo: "client visit".to_string(),
            category: Some(2),
            ..draft
        };
        let names: Vec<&str> = with_memo.form_fields().iter().map(|(k, _)| *k).collect();
        assert!(names.contains(&"memo"));
        assert!(names.contains(&"category"));
    }

    #[test]
    fn test_summary_with_uncategorized_row() {
        let json = r#"{
            "year": 2024, "month": 3, "total": 5000,
            "personal_total": 2000, "business_total": 3000,
            "by_category": [{"id": null, "name": "Uncategorized", "icon": "📁", "color": "gray", "total": 5000}],
            "by_payment_method": []
        }"#;
        let summary: ExpenseSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.by_category[0].id, None);
        assert_eq!(summary.total, summary.personal_total + summary.business_total);
    }

    #[test]
    fn test_summary_with_null_split_totals() {
        let json = r#"{
            "year": 2024, "month": 5, "total": 800,
            "personal_total": null, "business_total": 800,
            "by_category": [], "by_payment_method": []
        }"#;
        let summary: ExpenseSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.personal_total, 0);
        assert_eq!(summary.business_total, 800);
    }

    #[test]
    fn test_yearly_summary_with_one_sided_and_empty_months() {
        let mut months: Vec<serde_json::Value> = (1..=12)
            .map(|m| {
                serde_json::json!({
                    "month": m,
                    "month_label": format!("{}月", m),
                    "total": null,
                    "personal_total": null,
                    "business_total": null
                })
            })
            .collect();
        months[2] = serde_json::json!({
            "month": 3, "month_label": "3月",
            "total": 5000, "personal_total": null, "business_total": 5000
        });
        let body = serde_json::json!({
            "year": 2024,
            "monthly_data": months,
            "year_total": 5000,
            "year_personal_total": 0,
            "year_business_total": 5000
        });

        let yearly: ExpenseYearlySummary = serde_json::from_value(body).unwrap();
        assert_eq!(yearly.monthly_data.len(), 12);
        let march = &yearly.monthly_data[2];
        assert_eq!(march.total, 5000);
        assert_eq!(march.personal_total, 0);
        assert_eq!(march.business_total, 5000);
        assert_eq!(yearly.monthly_data[0].total, 0);
    }
}
