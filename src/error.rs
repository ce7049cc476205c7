use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use thiserror::Error;

use crate::payroll::period::PayPeriod;

/// Error taxonomy for the payroll core.
///
/// `InvalidInput` is recoverable by the caller fixing the offending field,
/// `AlreadyRun` means the target month already holds a generated run, and
/// `Storage` wraps any fault from the record store.
#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("invalid input for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    #[error("payroll already generated for {period}")]
    AlreadyRun { period: PayPeriod },

    #[error("storage failure: {0}")]
    Storage(#[from] sqlx::Error),
}

pub type PayrollResult<T> = Result<T, PayrollError>;

impl PayrollError {
    pub fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        PayrollError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl actix_web::ResponseError for PayrollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            PayrollError::AlreadyRun { .. } => StatusCode::CONFLICT,
            PayrollError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let PayrollError::Storage(e) = self {
            tracing::error!(error = %e, "storage failure");
            // Never leak driver details to the client
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Internal Server Error"
            }));
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_displays_field_and_message() {
        let err = PayrollError::invalid_input("base_salary", "must not be negative");
        assert_eq!(
            err.to_string(),
            "invalid input for 'base_salary': must not be negative"
        );
    }

    #[test]
    fn already_run_displays_period() {
        let period = PayPeriod::new(2026, 8).unwrap();
        let err = PayrollError::AlreadyRun { period };
        assert_eq!(err.to_string(), "payroll already generated for 2026-08");
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PayrollError>();
    }
}
