//! Payroll run orchestration: a two-phase compute-preview / commit flow for
//! one calendar month, guarded so a month is never generated twice.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::error::{PayrollError, PayrollResult};
use crate::payroll::calculator::{self, SalaryComponents};
use crate::payroll::period::PayPeriod;
use crate::repo::{NewLedgerEntry, PayrollRepository, ProfilelessEmployee};

/// One computed, not yet persisted, ledger line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollLine {
    pub employee_id: u64,
    pub employee_name: String,
    pub leave_days: i64,
    pub base_salary: Decimal,
    pub hra: Decimal,
    pub da: Decimal,
    pub bonus: Decimal,
    pub gross: Decimal,
    pub tax: Decimal,
    pub leave_deduction: Decimal,
    pub net_pay: Decimal,
}

/// Side-effect-free result of phase one. Discarding it cancels the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPreview {
    pub period: PayPeriod,
    pub lines: Vec<PayrollLine>,
    /// Active employees that would be skipped for lack of a salary profile.
    pub missing_profiles: Vec<MissingSalaryProfile>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingSalaryProfile {
    pub employee_id: u64,
    pub employee_name: String,
}

impl From<ProfilelessEmployee> for MissingSalaryProfile {
    fn from(e: ProfilelessEmployee) -> Self {
        MissingSalaryProfile {
            employee_id: e.employee_id,
            employee_name: e.employee_name,
        }
    }
}

/// Computes the payroll for every eligible employee without persisting
/// anything. Pure with respect to store state: repeated calls with no
/// intervening commit return identical previews.
///
/// Fails with `AlreadyRun` before any computation if the period already holds
/// a generated run.
pub async fn compute_preview<R>(
    repo: &R,
    period: PayPeriod,
    as_of: NaiveDate,
) -> PayrollResult<RunPreview>
where
    R: PayrollRepository + ?Sized,
{
    if repo.run_exists(period).await? {
        return Err(PayrollError::AlreadyRun { period });
    }

    let candidates = repo.eligible_for_run(period, as_of).await?;

    let mut lines = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let salary = SalaryComponents {
            base_salary: candidate.base_salary,
            hra: candidate.hra,
            da: candidate.da,
            bonus: candidate.bonus,
        };
        let pay = calculator::compute_pay(&salary, candidate.leave_days)?;

        lines.push(PayrollLine {
            employee_id: candidate.employee_id,
            employee_name: candidate.employee_name,
            leave_days: candidate.leave_days,
            base_salary: salary.base_salary,
            hra: salary.hra,
            da: salary.da,
            bonus: salary.bonus,
            gross: pay.gross,
            tax: pay.tax,
            leave_deduction: pay.leave_deduction,
            net_pay: pay.net_pay,
        });
    }

    let missing_profiles: Vec<MissingSalaryProfile> = repo
        .active_without_salary_profile(as_of)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    if !missing_profiles.is_empty() {
        warn!(
            period = %period,
            count = missing_profiles.len(),
            "active employees without a salary profile excluded from run"
        );
    }

    Ok(RunPreview {
        period,
        lines,
        missing_profiles,
    })
}

/// Persists a confirmed preview as one ledger entry per line, all inside a
/// single transaction. The idempotency guard is re-checked so a run that
/// landed after the preview still refuses with `AlreadyRun`.
///
/// The payment date must fall inside the previewed month: the guard keys on
/// payment dates, so an entry dated outside the period would leave the month
/// open to a duplicate run while wrongly locking the month it landed in.
pub async fn commit<R>(
    repo: &R,
    preview: &RunPreview,
    payment_date: NaiveDate,
) -> PayrollResult<u64>
where
    R: PayrollRepository + ?Sized,
{
    if !preview.period.contains(payment_date) {
        return Err(PayrollError::invalid_input(
            "payment_date",
            format!("{payment_date} is outside {}", preview.period),
        ));
    }

    if repo.run_exists(preview.period).await? {
        return Err(PayrollError::AlreadyRun {
            period: preview.period,
        });
    }

    let entries: Vec<NewLedgerEntry> = preview
        .lines
        .iter()
        .map(|line| NewLedgerEntry {
            employee_id: line.employee_id,
            employee_name: line.employee_name.clone(),
            leave_days: line.leave_days,
            leave_deduction: line.leave_deduction,
            bonus: line.bonus,
            income_tax: line.tax,
            net_pay: line.net_pay,
            payment_date,
        })
        .collect();

    let written = repo.commit_run(&entries).await?;

    info!(period = %preview.period, entries = written, "payroll run committed");

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::str::FromStr;
    use std::sync::Mutex;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct FakeEmployee {
        id: u64,
        name: &'static str,
        status: &'static str,
    }

    struct FakeProfile {
        employee_id: u64,
        base_salary: Decimal,
        hra: Decimal,
        da: Decimal,
        bonus: Decimal,
        effective_date: NaiveDate,
    }

    struct FakeLeave {
        employee_id: u64,
        date_from: NaiveDate,
        date_to: NaiveDate,
        leave_days: i64,
    }

    /// In-memory stand-in for the MySQL repository, mirroring its selection
    /// semantics: active status, latest profile in effect, overlap sum.
    #[derive(Default)]
    struct InMemoryRepository {
        employees: Vec<FakeEmployee>,
        profiles: Vec<FakeProfile>,
        leaves: Vec<FakeLeave>,
        ledger: Mutex<Vec<NewLedgerEntry>>,
    }

    impl InMemoryRepository {
        fn current_profile(&self, employee_id: u64, as_of: NaiveDate) -> Option<&FakeProfile> {
            self.profiles
                .iter()
                .filter(|p| p.employee_id == employee_id && p.effective_date <= as_of)
                .max_by_key(|p| p.effective_date)
        }

        fn ledger_len(&self) -> usize {
            self.ledger.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PayrollRepository for InMemoryRepository {
        async fn run_exists(&self, period: PayPeriod) -> PayrollResult<bool> {
            Ok(self
                .ledger
                .lock()
                .unwrap()
                .iter()
                .any(|e| period.contains(e.payment_date)))
        }

        async fn eligible_for_run(
            &self,
            period: PayPeriod,
            as_of: NaiveDate,
        ) -> PayrollResult<Vec<crate::repo::RunCandidate>> {
            let mut out = Vec::new();
            for emp in self.employees.iter().filter(|e| e.status == "active") {
                let Some(profile) = self.current_profile(emp.id, as_of) else {
                    continue;
                };
                let leave_days = self
                    .leaves
                    .iter()
                    .filter(|l| {
                        l.employee_id == emp.id
                            && l.date_from <= period.month_end()
                            && l.date_to >= period.month_start()
                    })
                    .map(|l| l.leave_days)
                    .sum();
                out.push(crate::repo::RunCandidate {
                    employee_id: emp.id,
                    employee_name: emp.name.to_string(),
                    base_salary: profile.base_salary,
                    hra: profile.hra,
                    da: profile.da,
                    bonus: profile.bonus,
                    leave_days,
                });
            }
            Ok(out)
        }

        async fn active_without_salary_profile(
            &self,
            as_of: NaiveDate,
        ) -> PayrollResult<Vec<ProfilelessEmployee>> {
            Ok(self
                .employees
                .iter()
                .filter(|e| e.status == "active" && self.current_profile(e.id, as_of).is_none())
                .map(|e| ProfilelessEmployee {
                    employee_id: e.id,
                    employee_name: e.name.to_string(),
                })
                .collect())
        }

        async fn commit_run(&self, entries: &[NewLedgerEntry]) -> PayrollResult<u64> {
            self.ledger.lock().unwrap().extend_from_slice(entries);
            Ok(entries.len() as u64)
        }
    }

    fn profile(employee_id: u64, base: &str, effective: NaiveDate) -> FakeProfile {
        FakeProfile {
            employee_id,
            base_salary: dec(base),
            hra: dec("5000"),
            da: dec("2000"),
            bonus: dec("1000"),
            effective_date: effective,
        }
    }

    fn staffed_repo() -> InMemoryRepository {
        InMemoryRepository {
            employees: vec![
                FakeEmployee { id: 1, name: "Asha Rao", status: "active" },
                FakeEmployee { id: 2, name: "Vikram Shah", status: "terminated" },
            ],
            profiles: vec![
                profile(1, "30000", date(2025, 1, 1)),
                profile(2, "50000", date(2025, 1, 1)),
            ],
            leaves: vec![FakeLeave {
                employee_id: 1,
                date_from: date(2025, 8, 10),
                date_to: date(2025, 8, 12),
                leave_days: 3,
            }],
            ..Default::default()
        }
    }

    #[actix_web::test]
    async fn preview_computes_expected_figures() {
        let repo = staffed_repo();
        let period = PayPeriod::new(2025, 8).unwrap();

        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        assert_eq!(preview.lines.len(), 1);
        let line = &preview.lines[0];
        assert_eq!(line.leave_days, 3);
        assert_eq!(line.gross, dec("38000"));
        assert_eq!(line.tax, dec("3800.00"));
        assert_eq!(line.leave_deduction, dec("3000"));
        assert_eq!(line.net_pay, dec("31200.00"));
    }

    #[actix_web::test]
    async fn terminated_employees_are_excluded() {
        let repo = staffed_repo();
        let period = PayPeriod::new(2025, 8).unwrap();

        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        assert!(preview.lines.iter().all(|l| l.employee_id != 2));
    }

    #[actix_web::test]
    async fn leave_outside_the_period_does_not_count() {
        let mut repo = staffed_repo();
        repo.leaves = vec![FakeLeave {
            employee_id: 1,
            date_from: date(2025, 7, 1),
            date_to: date(2025, 7, 3),
            leave_days: 3,
        }];
        let period = PayPeriod::new(2025, 8).unwrap();

        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        assert_eq!(preview.lines[0].leave_days, 0);
        assert_eq!(preview.lines[0].leave_deduction, Decimal::ZERO);
    }

    #[actix_web::test]
    async fn leave_straddling_the_month_start_counts() {
        let mut repo = staffed_repo();
        repo.leaves = vec![FakeLeave {
            employee_id: 1,
            date_from: date(2025, 7, 30),
            date_to: date(2025, 8, 2),
            leave_days: 4,
        }];
        let period = PayPeriod::new(2025, 8).unwrap();

        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        assert_eq!(preview.lines[0].leave_days, 4);
    }

    #[actix_web::test]
    async fn profile_selection_picks_latest_not_after_run_date() {
        let mut repo = staffed_repo();
        repo.profiles = vec![
            profile(1, "30000", date(2025, 1, 1)),
            profile(1, "40000", date(2025, 3, 1)),
        ];
        let period = PayPeriod::new(2025, 2).unwrap();

        let preview = compute_preview(&repo, period, date(2025, 2, 15)).await.unwrap();

        assert_eq!(preview.lines[0].base_salary, dec("30000"));
    }

    #[actix_web::test]
    async fn preview_is_idempotent() {
        let repo = staffed_repo();
        let period = PayPeriod::new(2025, 8).unwrap();

        let first = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();
        let second = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.ledger_len(), 0);
    }

    #[actix_web::test]
    async fn missing_profiles_are_surfaced_not_silent() {
        let mut repo = staffed_repo();
        repo.employees.push(FakeEmployee {
            id: 3,
            name: "Meera Iyer",
            status: "active",
        });
        let period = PayPeriod::new(2025, 8).unwrap();

        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        assert!(preview.lines.iter().all(|l| l.employee_id != 3));
        assert_eq!(preview.missing_profiles.len(), 1);
        assert_eq!(preview.missing_profiles[0].employee_id, 3);
    }

    #[actix_web::test]
    async fn commit_writes_one_entry_per_line() {
        let repo = staffed_repo();
        let period = PayPeriod::new(2025, 8).unwrap();
        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        let written = commit(&repo, &preview, date(2025, 8, 27)).await.unwrap();

        assert_eq!(written, 1);
        let ledger = repo.ledger.lock().unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].net_pay, dec("31200.00"));
        assert_eq!(ledger[0].payment_date, date(2025, 8, 27));
    }

    #[actix_web::test]
    async fn second_commit_for_same_month_refuses_and_writes_nothing() {
        let repo = staffed_repo();
        let period = PayPeriod::new(2025, 8).unwrap();
        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        commit(&repo, &preview, date(2025, 8, 27)).await.unwrap();

        // even a freshly built preview payload must be refused
        let err = commit(&repo, &preview, date(2025, 8, 28)).await.unwrap_err();
        assert!(matches!(err, PayrollError::AlreadyRun { .. }));
        assert_eq!(repo.ledger_len(), 1);
    }

    #[actix_web::test]
    async fn commit_refuses_payment_date_outside_the_period() {
        let repo = staffed_repo();
        let period = PayPeriod::new(2025, 7).unwrap();
        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();

        // an August-dated commit of a July run would leave July open to a
        // duplicate while blocking August
        let err = commit(&repo, &preview, date(2025, 8, 27)).await.unwrap_err();
        assert!(matches!(err, PayrollError::InvalidInput { .. }));
        assert_eq!(repo.ledger_len(), 0);

        // dated inside the month, the commit lands and July locks
        commit(&repo, &preview, date(2025, 7, 31)).await.unwrap();
        let err = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap_err();
        assert!(matches!(err, PayrollError::AlreadyRun { .. }));

        // August itself stays runnable
        let august = PayPeriod::new(2025, 8).unwrap();
        assert!(compute_preview(&repo, august, date(2025, 8, 27)).await.is_ok());
    }

    #[actix_web::test]
    async fn preview_refuses_once_month_is_generated() {
        let repo = staffed_repo();
        let period = PayPeriod::new(2025, 8).unwrap();
        let preview = compute_preview(&repo, period, date(2025, 8, 27)).await.unwrap();
        commit(&repo, &preview, date(2025, 8, 27)).await.unwrap();

        let err = compute_preview(&repo, period, date(2025, 8, 28)).await.unwrap_err();
        assert!(matches!(err, PayrollError::AlreadyRun { .. }));

        // a different month is unaffected
        let next = PayPeriod::new(2025, 9).unwrap();
        assert!(compute_preview(&repo, next, date(2025, 9, 27)).await.is_ok());
    }
}
