use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A leave application over an inclusive date range. The day count is
/// computed by the server as `date_to - date_from + 1`.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-08-10", value_type = String, format = "date")]
    pub date_from: NaiveDate,

    #[schema(example = "2026-08-12", value_type = String, format = "date")]
    pub date_to: NaiveDate,

    #[schema(example = "medical", nullable = true)]
    pub reason: Option<String>,

    #[schema(example = 3)]
    pub leave_days: i64,

    #[schema(example = "pending")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
        }
    }
}
