use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::employee::{Employee, EmployeeStatus};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Asha")]
    pub first_name: String,
    #[schema(example = "Rao")]
    pub last_name: String,
    #[schema(example = "asha.rao@company.com", format = "email", value_type = String)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    pub status: Option<EmployeeStatus>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    #[schema(example = "active")]
    pub status: Option<String>,
    /// Matches against first name, last name, or email
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let status = payload
        .status
        .as_ref()
        .unwrap_or(&EmployeeStatus::Active)
        .as_str();

    sqlx::query(
        r#"
        INSERT INTO employees
            (first_name, last_name, email, phone, address, city, state,
             postal_code, country, hire_date, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.address)
    .bind(&payload.city)
    .bind(&payload.state)
    .bind(&payload.postal_code)
    .bind(&payload.country)
    .bind(payload.hire_date)
    .bind(status)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Employee created successfully"
    })))
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Str(String),
}

/// List employees with optional status filter and name/email search
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = crate::api::page_offset(page, per_page);

    let mut conditions = Vec::new();
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(status) = &query.status {
        conditions.push("status = ?");
        args.push(FilterValue::Str(status.clone()));
    }

    if let Some(search) = &query.search {
        conditions.push("(first_name LIKE ? OR last_name LIKE ? OR email LIKE ?)");
        let like = format!("%{}%", search);
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT * FROM employees {} ORDER BY id DESC LIMIT ? OFFSET ?",
        where_clause
    );

    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for arg in &args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let employees = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, sql = %data_sql, "Failed to fetch employees");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, body = Employee),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match employee {
        Some(emp) => Ok(HttpResponse::Ok().json(emp)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();

    let current = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let current = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let body = body.into_inner();
    let status = body
        .status
        .map(|s| s.as_str().to_string())
        .unwrap_or(current.status);

    sqlx::query(
        r#"
        UPDATE employees
        SET first_name = ?, last_name = ?, email = ?, phone = ?, address = ?,
            city = ?, state = ?, postal_code = ?, country = ?, hire_date = ?,
            status = ?
        WHERE id = ?
        "#,
    )
    .bind(body.first_name.unwrap_or(current.first_name))
    .bind(body.last_name.unwrap_or(current.last_name))
    .bind(body.email.unwrap_or(current.email))
    .bind(body.phone.or(current.phone))
    .bind(body.address.or(current.address))
    .bind(body.city.or(current.city))
    .bind(body.state.or(current.state))
    .bind(body.postal_code.or(current.postal_code))
    .bind(body.country.or(current.country))
    .bind(body.hire_date.unwrap_or(current.hire_date))
    .bind(status)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to update employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Delete Employee
///
/// Refused while salary, leave, or payroll records reference the employee;
/// those employees are terminated instead of deleted.
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id", description = "Employee ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Employee has associated records")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let referenced = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM payroll_ledger WHERE employee_id = ?) +
            (SELECT COUNT(*) FROM leave_requests WHERE employee_id = ?) +
            (SELECT COUNT(*) FROM salary_profiles WHERE employee_id = ?)
        "#,
    )
    .bind(employee_id)
    .bind(employee_id)
    .bind(employee_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to check employee references");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if referenced > 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Cannot delete employee with associated records. \
                        Consider changing status to 'terminated' instead."
        })));
    }

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to delete employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}
