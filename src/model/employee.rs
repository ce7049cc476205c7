use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "Asha",
        "last_name": "Rao",
        "email": "asha.rao@company.com",
        "phone": "+911712345678",
        "address": "12 MG Road",
        "city": "Pune",
        "state": "MH",
        "postal_code": "411001",
        "country": "India",
        "hire_date": "2024-01-01",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Asha")]
    pub first_name: String,

    #[schema(example = "Rao")]
    pub last_name: String,

    #[schema(example = "asha.rao@company.com")]
    pub email: String,

    #[schema(example = "+911712345678", nullable = true)]
    pub phone: Option<String>,

    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub hire_date: NaiveDate,

    #[schema(example = "active")]
    pub status: String,
}

/// Payroll eligibility is gated on this: only `active` employees are paid.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    Active,
    OnLeave,
    Terminated,
}

impl EmployeeStatus {
    pub fn as_str(&self) -> &str {
        match self {
            EmployeeStatus::Active => "active",
            EmployeeStatus::OnLeave => "on_leave",
            EmployeeStatus::Terminated => "terminated",
        }
    }
}
