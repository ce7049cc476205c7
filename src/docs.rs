use crate::api::employee::{CreateEmployee, EmployeeListResponse, UpdateEmployee};
use crate::api::leave::{ApplyLeave, LeaveFilter, LeaveListResponse};
use crate::api::payroll::{
    CommitRequest, MissingProfileDto, PayrollLineDto, PayrollListResponse, PayrollQuery,
    PreviewRequest, PreviewResponse,
};
use crate::api::salary::{
    CreateSalaryProfile, SalaryListResponse, SalaryProfileRow, UpdateSalaryProfile,
};
use crate::model::employee::Employee;
use crate::model::leave::LeaveRequest;
use crate::model::payroll::PayrollLedgerEntry;
use crate::model::salary::SalaryProfile;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Management System API",
        version = "1.0.0",
        description = r#"
## Payroll Management System

This API manages employees, their salary structures, leave, and monthly payroll runs.

### 🔹 Key Features
- **Employee Management**
  - Create, update, list, and view employee profiles
- **Salary Structures**
  - Dated salary revisions (base, HRA, DA, bonus) per employee
- **Leave Management**
  - Apply for leave, approve/reject requests, and view leave history
- **Payroll Runs**
  - Preview a month's payroll without writing anything, then commit it;
    each month can be generated at most once

### 🔐 Security
Most endpoints are protected using **JWT Bearer authentication**.
Only authorized roles such as **Admin** or **HR** can access sensitive operations.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::salary::create_salary,
        crate::api::salary::list_salaries,
        crate::api::salary::get_salary,
        crate::api::salary::update_salary,

        crate::api::leave::leave_list,
        crate::api::leave::get_leave,
        crate::api::leave::apply_leave,
        crate::api::leave::approve_leave,
        crate::api::leave::reject_leave,

        crate::api::payroll::preview_run,
        crate::api::payroll::commit_run,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payrolls
    ),
    components(
        schemas(
            CreateEmployee,
            UpdateEmployee,
            Employee,
            EmployeeListResponse,
            CreateSalaryProfile,
            UpdateSalaryProfile,
            SalaryProfile,
            SalaryProfileRow,
            SalaryListResponse,
            ApplyLeave,
            LeaveFilter,
            LeaveRequest,
            LeaveListResponse,
            PreviewRequest,
            PreviewResponse,
            PayrollLineDto,
            MissingProfileDto,
            CommitRequest,
            PayrollQuery,
            PayrollListResponse,
            PayrollLedgerEntry
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Salary", description = "Salary structure APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Payroll", description = "Payroll run and ledger APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
