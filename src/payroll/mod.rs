//! The payroll core: pure pay arithmetic, the calendar-month run identity,
//! and the two-phase run orchestrator.

pub mod calculator;
pub mod period;
pub mod run;
