use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One employee's computed pay for one run. Immutable once written; the run
/// orchestrator is the sole write path.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollLedgerEntry {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    /// Name snapshot at run time, so the ledger stays readable after renames.
    #[schema(example = "Asha Rao")]
    pub employee_name: String,

    #[schema(example = 3)]
    pub leave_days: i64,

    #[schema(example = "3000.00", value_type = String)]
    pub leave_deduction: Decimal,

    #[schema(example = "1000.00", value_type = String)]
    pub bonus: Decimal,

    #[schema(example = "3800.00", value_type = String)]
    pub income_tax: Decimal,

    #[schema(example = "31200.00", value_type = String)]
    pub net_pay: Decimal,

    #[schema(example = "2026-08-27", value_type = String, format = "date")]
    pub payment_date: NaiveDate,
}
