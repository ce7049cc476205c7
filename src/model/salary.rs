use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A dated snapshot of one employee's pay components. Revisions append new
/// rows; the profile in effect on a date is the one with the greatest
/// effective date not exceeding it.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryProfile {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "30000.00", value_type = String)]
    pub base_salary: Decimal,

    /// Housing allowance.
    #[schema(example = "5000.00", value_type = String)]
    pub hra: Decimal,

    /// Dearness allowance.
    #[schema(example = "2000.00", value_type = String)]
    pub da: Decimal,

    #[schema(example = "1000.00", value_type = String)]
    pub bonus: Decimal,

    #[schema(example = "2025-01-01", value_type = String, format = "date")]
    pub effective_date: NaiveDate,
}
