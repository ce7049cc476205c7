use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::error::PayrollResult;
use crate::payroll::period::PayPeriod;
use crate::repo::{NewLedgerEntry, PayrollRepository, ProfilelessEmployee, RunCandidate};

/// MySQL-backed repository. All statements use bound parameters; the run
/// commit wraps its inserts in one transaction.
#[derive(Clone)]
pub struct MySqlPayrollRepository {
    pool: MySqlPool,
}

impl MySqlPayrollRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayrollRepository for MySqlPayrollRepository {
    async fn run_exists(&self, period: PayPeriod) -> PayrollResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM payroll_ledger
            WHERE payment_date BETWEEN ? AND ?
            "#,
        )
        .bind(period.month_start())
        .bind(period.month_end())
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    async fn eligible_for_run(
        &self,
        period: PayPeriod,
        as_of: NaiveDate,
    ) -> PayrollResult<Vec<RunCandidate>> {
        // Overlap test: a leave request counts when its range touches the
        // period at all (date_from <= month_end AND date_to >= month_start).
        let candidates = sqlx::query_as::<_, RunCandidate>(
            r#"
            SELECT
                e.id AS employee_id,
                CONCAT(e.first_name, ' ', e.last_name) AS employee_name,
                s.base_salary,
                s.hra,
                s.da,
                s.bonus,
                CAST(COALESCE(l.leave_days, 0) AS SIGNED) AS leave_days
            FROM employees e
            JOIN salary_profiles s ON s.employee_id = e.id
            LEFT JOIN (
                SELECT employee_id, SUM(leave_days) AS leave_days
                FROM leave_requests
                WHERE date_from <= ? AND date_to >= ?
                GROUP BY employee_id
            ) l ON l.employee_id = e.id
            WHERE e.status = 'active'
              AND s.effective_date = (
                  SELECT MAX(effective_date)
                  FROM salary_profiles
                  WHERE employee_id = e.id AND effective_date <= ?
              )
            ORDER BY e.id
            "#,
        )
        .bind(period.month_end())
        .bind(period.month_start())
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    async fn active_without_salary_profile(
        &self,
        as_of: NaiveDate,
    ) -> PayrollResult<Vec<ProfilelessEmployee>> {
        let employees = sqlx::query_as::<_, ProfilelessEmployee>(
            r#"
            SELECT
                e.id AS employee_id,
                CONCAT(e.first_name, ' ', e.last_name) AS employee_name
            FROM employees e
            WHERE e.status = 'active'
              AND NOT EXISTS (
                  SELECT 1
                  FROM salary_profiles s
                  WHERE s.employee_id = e.id AND s.effective_date <= ?
              )
            ORDER BY e.id
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn commit_run(&self, entries: &[NewLedgerEntry]) -> PayrollResult<u64> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                r#"
                INSERT INTO payroll_ledger
                    (employee_id, employee_name, leave_days, leave_deduction,
                     bonus, income_tax, net_pay, payment_date)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.employee_id)
            .bind(&entry.employee_name)
            .bind(entry.leave_days)
            .bind(entry.leave_deduction)
            .bind(entry.bonus)
            .bind(entry.income_tax)
            .bind(entry.net_pay)
            .bind(entry.payment_date)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(entries.len() as u64)
    }
}
