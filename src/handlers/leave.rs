// src/handlers/leave.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreateLeaveRequest, LeaveFilter, LeaveListResponse, LeaveQuota, LeaveRequest,
        SetLeaveQuotaRequest,
    },
    services::leave::{
        ANNUAL_QUOTA_TYPE, SICK_REASON, check_quota, inclusive_day_count, today_in_office,
        validate_request_dates,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Datelike;
use uuid::Uuid;

/// Submit a leave request
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Leave request submitted", body = LeaveRequest),
        (status = 400, description = "Invalid dates or insufficient quota"),
        (status = 409, description = "Overlapping leave request exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateLeaveRequest>,
) -> AppResult<(StatusCode, Json<LeaveRequest>)> {
    let today = today_in_office(state.config.office_tz);
    validate_request_dates(body.start_date, body.end_date, today)?;

    let _ = sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE id = $1")
        .bind(body.employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", body.employee_id)))?;

    // inclusive intersection against any pending or approved request
    let overlapping = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM leave_requests
         WHERE employee_id = $1
           AND status IN ('pending', 'approved')
           AND start_date <= $2
           AND end_date >= $3
         LIMIT 1",
    )
    .bind(body.employee_id)
    .bind(body.end_date)
    .bind(body.start_date)
    .fetch_optional(&state.db)
    .await?;

    if overlapping.is_some() {
        return Err(AppError::Conflict(
            "an overlapping leave request is already pending or approved".to_string(),
        ));
    }

    let requested_days = inclusive_day_count(body.start_date, body.end_date);

    // only annual leave draws from a quota
    if body.quota_type == ANNUAL_QUOTA_TYPE {
        let quota = sqlx::query_as::<_, LeaveQuota>(
            "SELECT * FROM leave_quotas
             WHERE employee_id = $1 AND year = $2 AND quota_type = $3",
        )
        .bind(body.employee_id)
        .bind(body.start_date.year())
        .bind(&body.quota_type)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::Validation(format!(
                "no {} leave quota configured for year {}",
                body.quota_type,
                body.start_date.year()
            ))
        })?;

        check_quota(quota.total_quota, quota.used_quota, requested_days)?;
    }

    let leave = sqlx::query_as::<_, LeaveRequest>(
        r#"INSERT INTO leave_requests
               (id, employee_id, start_date, end_date, quota_type, reason, status,
                proof_document, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(body.employee_id)
    .bind(body.start_date)
    .bind(body.end_date)
    .bind(&body.quota_type)
    .bind(&body.reason)
    .bind(&body.proof_document)
    .fetch_one(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(leave)))
}

/// Approve a pending leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(("leave_id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave approved", body = LeaveRequest),
        (status = 400, description = "Leave request not found or already processed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(leave_id): Path<Uuid>,
) -> AppResult<Json<LeaveRequest>> {
    auth.require_hr_or_admin()?;

    // The status guard and the quota increment commit together: a replayed
    // approval matches zero rows and never double-increments.
    let mut tx = state.db.begin().await?;

    let leave = sqlx::query_as::<_, LeaveRequest>(
        r#"UPDATE leave_requests
           SET status = 'approved', updated_at = NOW()
           WHERE id = $1 AND status = 'pending'
           RETURNING *"#,
    )
    .bind(leave_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| {
        AppError::Validation("Leave request not found or already processed".to_string())
    })?;

    if leave.reason != SICK_REASON {
        let days = inclusive_day_count(leave.start_date, leave.end_date);
        sqlx::query(
            "UPDATE leave_quotas
             SET used_quota = used_quota + $1, updated_at = NOW()
             WHERE employee_id = $2 AND year = $3 AND quota_type = $4",
        )
        .bind(days as i32)
        .bind(leave.employee_id)
        .bind(leave.start_date.year())
        .bind(&leave.quota_type)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(Json(leave))
}

/// Reject a pending leave request
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(("leave_id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave rejected", body = LeaveRequest),
        (status = 400, description = "Leave request not found or already processed"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(leave_id): Path<Uuid>,
) -> AppResult<Json<LeaveRequest>> {
    auth.require_hr_or_admin()?;

    let leave = sqlx::query_as::<_, LeaveRequest>(
        r#"UPDATE leave_requests
           SET status = 'rejected', updated_at = NOW()
           WHERE id = $1 AND status = 'pending'
           RETURNING *"#,
    )
    .bind(leave_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::Validation("Leave request not found or already processed".to_string())
    })?;

    Ok(Json(leave))
}

/// Get a single leave request
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(("leave_id" = Uuid, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request detail", body = LeaveRequest),
        (status = 404, description = "Leave request not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(leave_id): Path<Uuid>,
) -> AppResult<Json<LeaveRequest>> {
    auth.require_hr_or_admin()?;

    let leave = sqlx::query_as::<_, LeaveRequest>("SELECT * FROM leave_requests WHERE id = $1")
        .bind(leave_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Leave request {} not found", leave_id)))?;

    Ok(Json(leave))
}

/// List leave requests, filtered and paginated
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses((status = 200, description = "Paginated leave list", body = LeaveListResponse)),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<LeaveFilter>,
) -> AppResult<Json<LeaveListResponse>> {
    auth.require_hr_or_admin()?;

    let per_page = filter.per_page.unwrap_or(10).min(100);
    let page = filter.page.unwrap_or(1).max(1);
    let offset = i64::from(page - 1) * i64::from(per_page);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut bind_idx = 0u32;

    if filter.employee_id.is_some() {
        bind_idx += 1;
        where_sql.push_str(&format!(" AND employee_id = ${}", bind_idx));
    }
    if filter.status.is_some() {
        bind_idx += 1;
        where_sql.push_str(&format!(" AND status = ${}", bind_idx));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(employee_id) = filter.employee_id {
        count_q = count_q.bind(employee_id);
    }
    if let Some(status) = filter.status {
        count_q = count_q.bind(status);
    }
    let total = count_q.fetch_one(&state.db).await?;

    let data_sql = format!(
        "SELECT * FROM leave_requests{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
        where_sql,
        bind_idx + 1,
        bind_idx + 2
    );
    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    if let Some(employee_id) = filter.employee_id {
        data_q = data_q.bind(employee_id);
    }
    if let Some(status) = filter.status {
        data_q = data_q.bind(status);
    }
    let leaves = data_q
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}

// ─── Quotas ───────────────────────────────────────────────────────────────────

/// Set an employee's leave quota for a year and quota type
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/leave-quotas",
    request_body = SetLeaveQuotaRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Quota saved", body = LeaveQuota),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn set_leave_quota(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<SetLeaveQuotaRequest>,
) -> AppResult<Json<LeaveQuota>> {
    auth.require_hr_or_admin()?;

    if body.total_quota < 0 {
        return Err(AppError::Validation(
            "total_quota must not be negative".to_string(),
        ));
    }

    let _ = sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    let quota = sqlx::query_as::<_, LeaveQuota>(
        r#"INSERT INTO leave_quotas
               (id, employee_id, year, quota_type, total_quota, used_quota, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, 0, NOW(), NOW())
           ON CONFLICT (employee_id, year, quota_type) DO UPDATE
           SET total_quota = EXCLUDED.total_quota,
               updated_at = NOW()
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(body.year)
    .bind(&body.quota_type)
    .bind(body.total_quota)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(quota))
}

/// List an employee's leave quotas
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/leave-quotas",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses((status = 200, description = "Quotas", body = Vec<LeaveQuota>)),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave_quotas(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Vec<LeaveQuota>>> {
    auth.require_hr_or_admin()?;

    let quotas = sqlx::query_as::<_, LeaveQuota>(
        "SELECT * FROM leave_quotas WHERE employee_id = $1 ORDER BY year DESC, quota_type",
    )
    .bind(employee_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(quotas))
}
