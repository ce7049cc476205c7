use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::leave::{LeaveRequest, LeaveStatus};

#[derive(Deserialize, ToSchema)]
pub struct ApplyLeave {
    /// Omitted for self-service applications; HR/Admin may apply on behalf
    /// of any employee.
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
    #[schema(example = "2026-08-10", format = "date", value_type = String)]
    pub date_from: NaiveDate,
    #[schema(example = "2026-08-12", format = "date", value_type = String)]
    pub date_to: NaiveDate,
    #[schema(example = "medical")]
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[schema(example = "pending")]
    pub status: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u64>,
    #[schema(example = 10)]
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// Apply for leave over an inclusive date range
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = ApplyLeave,
    responses(
        (status = 200, description = "Leave request submitted"),
        (status = 400, description = "Invalid date range"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn apply_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<ApplyLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = match payload.employee_id {
        Some(id) => {
            auth.require_hr_or_admin()?;
            id
        }
        None => auth
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?,
    };

    if payload.date_from > payload.date_to {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "date_from cannot be after date_to"
        })));
    }

    // inclusive range: a single-day leave counts as one day
    let leave_days = (payload.date_to - payload.date_from).num_days() + 1;

    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, date_from, date_to, reason, leave_days)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.date_from)
    .bind(payload.date_to)
    .bind(&payload.reason)
    .bind(leave_days)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave request submitted",
        "leave_days": leave_days,
        "status": "pending"
    })))
}

// Pending requests only; approved or rejected ones are final.
async fn transition_leave(
    pool: &MySqlPool,
    leave_id: u64,
    to: LeaveStatus,
) -> actix_web::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(to.as_str())
    .bind(leave_id)
    .execute(pool)
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, status = to.as_str(), "Leave status update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(result.rows_affected() > 0)
}

/// Approve leave (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request to approve")),
    responses(
        (status = 200, description = "Leave approved"),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    if !transition_leave(pool.get_ref(), leave_id, LeaveStatus::Approved).await? {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave approved"
    })))
}

/// Reject leave (HR/Admin)
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request to reject")),
    responses(
        (status = 200, description = "Leave rejected"),
        (status = 400, description = "Leave request not found or already processed"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    if !transition_leave(pool.get_ref(), leave_id, LeaveStatus::Rejected).await? {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave rejected"
    })))
}

/// Get one leave request
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id" = u64, Path, description = "ID of the leave request to fetch")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401),
        (status = 403),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, date_from, date_to, reason, leave_days, status
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Leave request not found"
        }))),
    }
}

/// List leave requests
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date_from, date_to, reason, leave_days, status
        FROM leave_requests
        {}
        ORDER BY date_from DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
