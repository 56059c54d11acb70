// src/handlers/permission.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreatePermissionRequest, PermissionRequest, UpdateRequestStatusRequest,
    },
    services::leave::{today_in_office, validate_request_dates},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PermissionFilter {
    /// Filter by employee
    pub employee_id: Option<Uuid>,
}

/// Submit a sick or permission request with a supporting document
#[utoipa::path(
    post,
    path = "/api/v1/permission-requests",
    request_body = CreatePermissionRequest,
    responses(
        (status = 201, description = "Request submitted", body = PermissionRequest),
        (status = 400, description = "Invalid dates"),
    ),
    security(("bearer_auth" = [])),
    tag = "Permission Requests"
)]
pub async fn create_permission_request(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreatePermissionRequest>,
) -> AppResult<(StatusCode, Json<PermissionRequest>)> {
    let today = today_in_office(state.config.office_tz);
    validate_request_dates(body.start_date, body.end_date, today)?;

    let _ = sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE id = $1")
        .bind(body.employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", body.employee_id)))?;

    let request = sqlx::query_as::<_, PermissionRequest>(
        r#"INSERT INTO permission_requests
               (id, employee_id, request_type, start_date, end_date, reason, proof_document,
                status, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(body.employee_id)
    .bind(body.request_type)
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(&body.reason)
    .bind(&body.proof_document)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(request)))
}

/// List sick and permission requests
#[utoipa::path(
    get,
    path = "/api/v1/permission-requests",
    params(PermissionFilter),
    responses((status = 200, description = "Requests", body = Vec<PermissionRequest>)),
    security(("bearer_auth" = [])),
    tag = "Permission Requests"
)]
pub async fn list_permission_requests(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PermissionFilter>,
) -> AppResult<Json<Vec<PermissionRequest>>> {
    auth.require_hr_or_admin()?;

    let requests = match filter.employee_id {
        Some(employee_id) => {
            sqlx::query_as::<_, PermissionRequest>(
                "SELECT * FROM permission_requests WHERE employee_id = $1 ORDER BY created_at DESC",
            )
            .bind(employee_id)
            .fetch_all(&state.db)
            .await?
        }
        None => {
            sqlx::query_as::<_, PermissionRequest>(
                "SELECT * FROM permission_requests ORDER BY created_at DESC",
            )
            .fetch_all(&state.db)
            .await?
        }
    };

    Ok(Json(requests))
}

/// Approve or reject a pending sick/permission request
#[utoipa::path(
    put,
    path = "/api/v1/permission-requests/{request_id}/status",
    request_body = UpdateRequestStatusRequest,
    params(("request_id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Status updated", body = PermissionRequest),
        (status = 400, description = "Request not found or already processed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Permission Requests"
)]
pub async fn update_permission_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<UpdateRequestStatusRequest>,
) -> AppResult<Json<PermissionRequest>> {
    auth.require_hr_or_admin()?;

    let request = sqlx::query_as::<_, PermissionRequest>(
        r#"UPDATE permission_requests
           SET status = $1, updated_at = NOW()
           WHERE id = $2 AND status = 'pending'
           RETURNING *"#,
    )
    .bind(body.status)
    .bind(request_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::Validation("Request not found or already processed".to_string())
    })?;

    Ok(Json(request))
}
