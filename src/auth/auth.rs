use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::auth::jwt::{Claims, TokenType};
use crate::config::Config;
use crate::model::role::Role;

/// The authenticated identity injected into handlers. Payroll logic never
/// sees this type; authorization stops at the API layer.
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        // Refresh tokens only redeem at /auth/refresh; a revoked one must not
        // keep authenticating API calls until it expires.
        if data.claims.token_type != TokenType::Access {
            return ready(Err(ErrorUnauthorized("Access token required")));
        }

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
            employee_id: data.claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Admin only"))
        }
    }

    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    use crate::auth::jwt::{generate_access_token, generate_refresh_token};

    const SECRET: &str = "test-secret";

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: SECRET.to_string(),
            server_addr: String::new(),
            access_token_ttl: 900,
            refresh_token_ttl: 900,
            rate_login_per_min: 60,
            rate_register_per_min: 30,
            rate_refresh_per_min: 30,
            rate_protected_per_min: 1000,
            api_prefix: "/api/v1".to_string(),
        }
    }

    fn request_with(token: &str) -> HttpRequest {
        TestRequest::default()
            .insert_header(("Authorization", format!("Bearer {token}")))
            .app_data(Data::new(test_config()))
            .to_http_request()
    }

    #[actix_web::test]
    async fn access_token_authenticates() {
        let token = generate_access_token(7, "asha".to_string(), 2, Some(1), SECRET, 900);

        let user = AuthUser::from_request(&request_with(&token), &mut Payload::None)
            .await
            .unwrap();

        assert_eq!(user.user_id, 7);
        assert_eq!(user.role, Role::Hr);
        assert_eq!(user.employee_id, Some(1));
    }

    #[actix_web::test]
    async fn refresh_token_does_not_authenticate_api_calls() {
        let (token, _) = generate_refresh_token(7, "asha".to_string(), 2, Some(1), SECRET, 900);

        let result = AuthUser::from_request(&request_with(&token), &mut Payload::None).await;

        assert!(result.is_err());
    }

    #[actix_web::test]
    async fn garbage_token_is_rejected() {
        let result =
            AuthUser::from_request(&request_with("not-a-jwt"), &mut Payload::None).await;

        assert!(result.is_err());
    }
}
