//! Typed repository boundary between the payroll core and the record store.
//!
//! The orchestrator depends on this trait abstractly so tests can substitute
//! an in-memory store for MySQL.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::PayrollResult;
use crate::payroll::period::PayPeriod;

pub mod mysql;

pub use mysql::MySqlPayrollRepository;

/// One active employee eligible for a run: current salary profile components
/// plus the summed leave days overlapping the period (0 when none).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RunCandidate {
    pub employee_id: u64,
    pub employee_name: String,
    pub base_salary: Decimal,
    pub hra: Decimal,
    pub da: Decimal,
    pub bonus: Decimal,
    pub leave_days: i64,
}

/// An active employee with no salary profile in effect on the run date.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfilelessEmployee {
    pub employee_id: u64,
    pub employee_name: String,
}

/// A ledger row to be written by a run commit.
#[derive(Debug, Clone)]
pub struct NewLedgerEntry {
    pub employee_id: u64,
    pub employee_name: String,
    pub leave_days: i64,
    pub leave_deduction: Decimal,
    pub bonus: Decimal,
    pub income_tax: Decimal,
    pub net_pay: Decimal,
    pub payment_date: NaiveDate,
}

#[async_trait]
pub trait PayrollRepository: Send + Sync {
    /// Whether any ledger entry's payment date falls inside the period.
    /// This is the run-level idempotency guard.
    async fn run_exists(&self, period: PayPeriod) -> PayrollResult<bool>;

    /// Active employees with their current salary profile (max effective date
    /// not exceeding `as_of`) and leave days overlapping the period. Employees
    /// without any profile in effect do not appear here.
    async fn eligible_for_run(
        &self,
        period: PayPeriod,
        as_of: NaiveDate,
    ) -> PayrollResult<Vec<RunCandidate>>;

    /// Active employees excluded from `eligible_for_run` for lack of a salary
    /// profile, so the preview can surface them instead of dropping silently.
    async fn active_without_salary_profile(
        &self,
        as_of: NaiveDate,
    ) -> PayrollResult<Vec<ProfilelessEmployee>>;

    /// Inserts all entries of a run as a single unit. A fault on any row must
    /// leave the ledger untouched.
    async fn commit_run(&self, entries: &[NewLedgerEntry]) -> PayrollResult<u64>;
}
