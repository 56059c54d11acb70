use crate::{
    errors::AppError,
    models::{Claims, UserRole},
    state::AppState,
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use uuid::Uuid;

/// Authenticated user extractor.
/// Add `auth: AuthUser` as a parameter in any handler that requires
/// authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: UserRole,
    pub employee_id: Option<Uuid>,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.role {
            UserRole::Admin => Ok(()),
            _ => Err(AppError::Forbidden("admin role required".to_string())),
        }
    }

    pub fn require_hr_or_admin(&self) -> Result<(), AppError> {
        match self.role {
            UserRole::Admin | UserRole::Hr => Ok(()),
            UserRole::Employee => Err(AppError::Forbidden("hr or admin role required".to_string())),
        }
    }

    pub fn require_employee(&self) -> Result<Uuid, AppError> {
        self.employee_id
            .ok_or_else(|| AppError::Forbidden("no employee profile linked to this user".to_string()))
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let headers: &HeaderMap = &parts.headers;

        let auth_header = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Invalid Authorization format".to_string()))?;

        let secret = state.config.jwt_secret.as_bytes();
        let token_data =
            decode::<Claims>(token, &DecodingKey::from_secret(secret), &Validation::default())
                .map_err(|_| AppError::InvalidToken)?;

        let user_id = Uuid::parse_str(&token_data.claims.sub).map_err(|_| AppError::InvalidToken)?;

        Ok(AuthUser {
            id: user_id,
            role: token_data.claims.role,
            employee_id: token_data.claims.employee_id,
        })
    }
}

pub fn generate_token(
    user_id: Uuid,
    role: UserRole,
    employee_id: Option<Uuid>,
    secret: &str,
    expiry_hours: i64,
) -> Result<String, AppError> {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    let now = Utc::now().timestamp() as usize;
    let exp = (Utc::now() + chrono::Duration::hours(expiry_hours)).timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        employee_id,
        exp,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}
