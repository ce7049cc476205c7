use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::PayrollError;
use crate::model::salary::SalaryProfile;

#[derive(Deserialize, ToSchema)]
pub struct CreateSalaryProfile {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "30000.00", value_type = String)]
    pub base_salary: Decimal,
    #[schema(example = "5000.00", value_type = String)]
    pub hra: Decimal,
    #[schema(example = "2000.00", value_type = String)]
    pub da: Decimal,
    #[schema(example = "1000.00", value_type = String)]
    pub bonus: Decimal,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub effective_date: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSalaryProfile {
    #[schema(example = "32000.00", value_type = String)]
    pub base_salary: Option<Decimal>,
    #[schema(example = "5500.00", value_type = String)]
    pub hra: Option<Decimal>,
    #[schema(example = "2200.00", value_type = String)]
    pub da: Option<Decimal>,
    #[schema(example = "1000.00", value_type = String)]
    pub bonus: Option<Decimal>,
    #[schema(example = "2026-02-01", format = "date", value_type = String)]
    pub effective_date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct SalaryQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
}

/// A salary profile joined with the owning employee's name.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct SalaryProfileRow {
    pub id: u64,
    pub employee_id: u64,
    #[schema(example = "Asha Rao")]
    pub employee_name: String,
    #[schema(example = "30000.00", value_type = String)]
    pub base_salary: Decimal,
    #[schema(example = "5000.00", value_type = String)]
    pub hra: Decimal,
    #[schema(example = "2000.00", value_type = String)]
    pub da: Decimal,
    #[schema(example = "1000.00", value_type = String)]
    pub bonus: Decimal,
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub effective_date: NaiveDate,
}

#[derive(Serialize, ToSchema)]
pub struct SalaryListResponse {
    pub data: Vec<SalaryProfileRow>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

fn require_non_negative(field: &str, value: Decimal) -> Result<(), PayrollError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(PayrollError::invalid_input(field, "must not be negative"));
    }
    Ok(())
}

/// Add a salary revision for an employee
#[utoipa::path(
    post,
    path = "/api/v1/salaries",
    request_body = CreateSalaryProfile,
    responses(
        (status = 201, description = "Salary profile created"),
        (status = 400, description = "Negative salary component"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn create_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateSalaryProfile>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    require_non_negative("base_salary", payload.base_salary)?;
    require_non_negative("hra", payload.hra)?;
    require_non_negative("da", payload.da)?;
    require_non_negative("bonus", payload.bonus)?;

    let employee_exists =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
            .bind(payload.employee_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to check employee");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    if employee_exists == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO salary_profiles
            (employee_id, base_salary, hra, da, bonus, effective_date)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.base_salary)
    .bind(payload.hra)
    .bind(payload.da)
    .bind(payload.bonus)
    .bind(payload.effective_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to create salary profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Salary profile created successfully"
    })))
}

/// List salary profiles, newest effective date first
#[utoipa::path(
    get,
    path = "/api/v1/salaries",
    params(SalaryQuery),
    responses(
        (status = 200, body = SalaryListResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn list_salaries(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<SalaryQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = crate::api::page_offset(page, per_page);

    let where_clause = if query.employee_id.is_some() {
        "WHERE s.employee_id = ?"
    } else {
        ""
    };

    let count_sql = format!(
        "SELECT COUNT(*) FROM salary_profiles s {}",
        where_clause
    );
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(employee_id) = query.employee_id {
        count_q = count_q.bind(employee_id);
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count salary profiles");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT s.id, s.employee_id,
               CONCAT(e.first_name, ' ', e.last_name) AS employee_name,
               s.base_salary, s.hra, s.da, s.bonus, s.effective_date
        FROM salary_profiles s
        JOIN employees e ON s.employee_id = e.id
        {}
        ORDER BY s.effective_date DESC
        LIMIT ? OFFSET ?
        "#,
        where_clause
    );

    let mut data_q = sqlx::query_as::<_, SalaryProfileRow>(&data_sql);
    if let Some(employee_id) = query.employee_id {
        data_q = data_q.bind(employee_id);
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch salary profiles");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(SalaryListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get a salary profile by ID
#[utoipa::path(
    get,
    path = "/api/v1/salaries/{salary_id}",
    params(("salary_id", description = "Salary profile ID")),
    responses(
        (status = 200, body = SalaryProfile),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let salary_id = path.into_inner();

    let profile = sqlx::query_as::<_, SalaryProfile>(
        r#"
        SELECT id, employee_id, base_salary, hra, da, bonus, effective_date
        FROM salary_profiles
        WHERE id = ?
        "#,
    )
    .bind(salary_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, salary_id, "Failed to fetch salary profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match profile {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Salary profile not found"
        }))),
    }
}

/// Edit a salary profile in place
///
/// Intended for correcting the latest revision; superseded profiles should be
/// left alone and new revisions appended instead.
#[utoipa::path(
    put,
    path = "/api/v1/salaries/{salary_id}",
    params(("salary_id", description = "Salary profile ID")),
    request_body = UpdateSalaryProfile,
    responses(
        (status = 200, description = "Salary profile updated"),
        (status = 400, description = "Negative salary component"),
        (status = 404, description = "Salary profile not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn update_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateSalaryProfile>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let salary_id = path.into_inner();

    let current = sqlx::query_as::<_, SalaryProfile>(
        r#"
        SELECT id, employee_id, base_salary, hra, da, bonus, effective_date
        FROM salary_profiles
        WHERE id = ?
        "#,
    )
    .bind(salary_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, salary_id, "Failed to fetch salary profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Salary profile not found"
            })));
        }
    };

    let base_salary = body.base_salary.unwrap_or(current.base_salary);
    let hra = body.hra.unwrap_or(current.hra);
    let da = body.da.unwrap_or(current.da);
    let bonus = body.bonus.unwrap_or(current.bonus);
    let effective_date = body.effective_date.unwrap_or(current.effective_date);

    require_non_negative("base_salary", base_salary)?;
    require_non_negative("hra", hra)?;
    require_non_negative("da", da)?;
    require_non_negative("bonus", bonus)?;

    sqlx::query(
        r#"
        UPDATE salary_profiles
        SET base_salary = ?, hra = ?, da = ?, bonus = ?, effective_date = ?
        WHERE id = ?
        "#,
    )
    .bind(base_salary)
    .bind(hra)
    .bind(da)
    .bind(bonus)
    .bind(effective_date)
    .bind(salary_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, salary_id, "Failed to update salary profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary profile updated successfully"
    })))
}
