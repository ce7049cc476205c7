use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::payroll::PayrollLedgerEntry;
use crate::payroll::period::PayPeriod;
use crate::payroll::run::{self, MissingSalaryProfile, PayrollLine, RunPreview};
use crate::repo::MySqlPayrollRepository;

#[derive(Deserialize, ToSchema)]
pub struct PreviewRequest {
    /// Pay period as "YYYY-MM". Defaults to the current month.
    #[schema(example = "2026-08")]
    pub month: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, ToSchema)]
pub struct PayrollLineDto {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "Asha Rao")]
    pub employee_name: String,
    #[schema(example = 3)]
    pub leave_days: i64,
    #[schema(example = "30000.00", value_type = String)]
    pub base_salary: Decimal,
    #[schema(example = "5000.00", value_type = String)]
    pub hra: Decimal,
    #[schema(example = "2000.00", value_type = String)]
    pub da: Decimal,
    #[schema(example = "1000.00", value_type = String)]
    pub bonus: Decimal,
    #[schema(example = "38000.00", value_type = String)]
    pub gross: Decimal,
    #[schema(example = "3800.00", value_type = String)]
    pub tax: Decimal,
    #[schema(example = "3000.00", value_type = String)]
    pub leave_deduction: Decimal,
    #[schema(example = "31200.00", value_type = String)]
    pub net_pay: Decimal,
}

impl From<PayrollLine> for PayrollLineDto {
    fn from(line: PayrollLine) -> Self {
        PayrollLineDto {
            employee_id: line.employee_id,
            employee_name: line.employee_name,
            leave_days: line.leave_days,
            base_salary: line.base_salary,
            hra: line.hra,
            da: line.da,
            bonus: line.bonus,
            gross: line.gross,
            tax: line.tax,
            leave_deduction: line.leave_deduction,
            net_pay: line.net_pay,
        }
    }
}

impl From<PayrollLineDto> for PayrollLine {
    fn from(dto: PayrollLineDto) -> Self {
        PayrollLine {
            employee_id: dto.employee_id,
            employee_name: dto.employee_name,
            leave_days: dto.leave_days,
            base_salary: dto.base_salary,
            hra: dto.hra,
            da: dto.da,
            bonus: dto.bonus,
            gross: dto.gross,
            tax: dto.tax,
            leave_deduction: dto.leave_deduction,
            net_pay: dto.net_pay,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MissingProfileDto {
    #[schema(example = 1003)]
    pub employee_id: u64,
    #[schema(example = "Meera Iyer")]
    pub employee_name: String,
}

impl From<MissingSalaryProfile> for MissingProfileDto {
    fn from(m: MissingSalaryProfile) -> Self {
        MissingProfileDto {
            employee_id: m.employee_id,
            employee_name: m.employee_name,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PreviewResponse {
    #[schema(example = "2026-08")]
    pub period: String,
    pub lines: Vec<PayrollLineDto>,
    /// Active employees that will be skipped until they get a salary profile.
    pub missing_profiles: Vec<MissingProfileDto>,
    #[schema(example = "31200.00", value_type = String)]
    pub total_net: Decimal,
}

/// Confirmed preview payload sent back by the operator to persist the run.
#[derive(Deserialize, ToSchema)]
pub struct CommitRequest {
    #[schema(example = "2026-08")]
    pub month: String,
    pub lines: Vec<PayrollLineDto>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    /// Filter by pay period as "YYYY-MM"
    #[schema(example = "2026-08")]
    pub month: Option<String>,
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollListResponse {
    pub data: Vec<PayrollLedgerEntry>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

fn resolve_period(month: Option<&str>, today: NaiveDate) -> actix_web::Result<PayPeriod> {
    match month {
        Some(raw) => Ok(raw.parse::<PayPeriod>()?),
        None => Ok(PayPeriod::containing(today)),
    }
}

/// Compute a payroll preview for one month
///
/// Side-effect free: nothing is written and the same request can be repeated.
/// Refuses with 409 once the month's run has been committed.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/run/preview",
    request_body = PreviewRequest,
    responses(
        (status = 200, description = "Computed preview", body = PreviewResponse),
        (status = 400, description = "Malformed month"),
        (status = 409, description = "Payroll already generated for the month"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn preview_run(
    auth: AuthUser,
    repo: web::Data<MySqlPayrollRepository>,
    payload: web::Json<PreviewRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let today = Utc::now().date_naive();
    let period = resolve_period(payload.month.as_deref(), today)?;

    let preview = run::compute_preview(repo.get_ref(), period, today).await?;

    Ok(HttpResponse::Ok().json(preview_response(preview)))
}

/// Commit a previewed payroll run
///
/// Writes one ledger entry per line in a single transaction. A month can be
/// committed at most once; retries get 409. Entries are dated today, so only
/// the month containing today can be committed.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/run",
    request_body = CommitRequest,
    responses(
        (status = 200, description = "Run committed"),
        (status = 400, description = "Malformed month, or month does not contain today"),
        (status = 409, description = "Payroll already generated for the month"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn commit_run(
    auth: AuthUser,
    repo: web::Data<MySqlPayrollRepository>,
    payload: web::Json<CommitRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payload = payload.into_inner();
    let period = payload.month.parse::<PayPeriod>()?;

    let preview = RunPreview {
        period,
        lines: payload.lines.into_iter().map(Into::into).collect(),
        missing_profiles: Vec::new(),
    };

    let payment_date = Utc::now().date_naive();
    let written = run::commit(repo.get_ref(), &preview, payment_date).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll run committed",
        "period": period.to_string(),
        "entries": written,
        "payment_date": payment_date
    })))
}

/// List payroll ledger entries
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, description = "Paginated ledger entries", body = PayrollListResponse),
        (status = 400, description = "Malformed month"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = crate::api::page_offset(page, per_page);

    let period = match query.month.as_deref() {
        Some(raw) => Some(raw.parse::<PayPeriod>()?),
        None => None,
    };

    let where_clause = if period.is_some() {
        "WHERE payment_date BETWEEN ? AND ?"
    } else {
        ""
    };

    let count_sql = format!("SELECT COUNT(*) FROM payroll_ledger {}", where_clause);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(p) = period {
        count_q = count_q.bind(p.month_start()).bind(p.month_end());
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count payroll entries");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, employee_name, leave_days, leave_deduction,
               bonus, income_tax, net_pay, payment_date
        FROM payroll_ledger
        {}
        ORDER BY payment_date DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
        where_clause
    );

    let mut data_q = sqlx::query_as::<_, PayrollLedgerEntry>(&data_sql);
    if let Some(p) = period {
        data_q = data_q.bind(p.month_start()).bind(p.month_end());
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch payroll entries");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PayrollListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get one payroll ledger entry by ID
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id" = u64, Path, description = "Ledger entry ID")),
    responses(
        (status = 200, body = PayrollLedgerEntry),
        (status = 404, description = "Ledger entry not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payroll_id = path.into_inner();

    let entry = sqlx::query_as::<_, PayrollLedgerEntry>(
        r#"
        SELECT id, employee_id, employee_name, leave_days, leave_deduction,
               bonus, income_tax, net_pay, payment_date
        FROM payroll_ledger
        WHERE id = ?
        "#,
    )
    .bind(payroll_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, payroll_id, "Failed to fetch payroll entry");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match entry {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Payroll entry not found"
        }))),
    }
}

fn preview_response(preview: RunPreview) -> PreviewResponse {
    let total_net = preview.lines.iter().map(|l| l.net_pay).sum();
    PreviewResponse {
        period: preview.period.to_string(),
        lines: preview.lines.into_iter().map(Into::into).collect(),
        missing_profiles: preview.missing_profiles.into_iter().map(Into::into).collect(),
        total_net,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_period_defaults_to_current_month() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let period = resolve_period(None, today).unwrap();
        assert_eq!(period.to_string(), "2026-08");
    }

    #[test]
    fn resolve_period_parses_explicit_month() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        let period = resolve_period(Some("2025-12"), today).unwrap();
        assert_eq!(period.to_string(), "2025-12");
    }

    #[test]
    fn resolve_period_rejects_garbage() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert!(resolve_period(Some("december"), today).is_err());
        assert!(resolve_period(Some("2026-13"), today).is_err());
    }
}
