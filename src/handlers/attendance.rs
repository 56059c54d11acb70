// src/handlers/attendance.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{Attendance, AttendanceFilter},
    state::AppState,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

/// Check in for today
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 201, description = "Checked in", body = Attendance),
        (status = 409, description = "Already checked in today"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Attendance>)> {
    let employee_id = auth.require_employee()?;

    let now = Utc::now().with_timezone(&state.config.office_tz);

    let attendance = sqlx::query_as::<_, Attendance>(
        r#"INSERT INTO attendance (id, employee_id, date, check_in, created_at)
           VALUES ($1, $2, $3, $4, NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(now.date_naive())
    .bind(now.time())
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if AppError::is_unique_violation(&e) {
            AppError::Conflict("Already checked in today".to_string())
        } else {
            e.into()
        }
    })?;

    Ok((StatusCode::CREATED, Json(attendance)))
}

/// Check out for today
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out", body = Attendance),
        (status = 400, description = "No active check-in found for today"),
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Attendance>> {
    let employee_id = auth.require_employee()?;

    let now = Utc::now().with_timezone(&state.config.office_tz);

    let attendance = sqlx::query_as::<_, Attendance>(
        r#"UPDATE attendance
           SET check_out = $1
           WHERE employee_id = $2 AND date = $3 AND check_out IS NULL
           RETURNING *"#,
    )
    .bind(now.time())
    .bind(employee_id)
    .bind(now.date_naive())
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::Validation("No active check-in found for today".to_string())
    })?;

    Ok(Json(attendance))
}

/// List attendance records for an employee and date range
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses((status = 200, description = "Attendance records", body = Vec<Attendance>)),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<AttendanceFilter>,
) -> AppResult<Json<Vec<Attendance>>> {
    // employees may only see their own records
    let employee_id = match filter.employee_id {
        Some(id) => {
            if auth.require_hr_or_admin().is_err() && auth.require_employee()? != id {
                return Err(AppError::Forbidden(
                    "cannot view another employee's attendance".to_string(),
                ));
            }
            id
        }
        None => auth.require_employee()?,
    };

    let mut where_sql = String::from(" WHERE employee_id = $1");
    let mut bind_idx = 1u32;

    if filter.from.is_some() {
        bind_idx += 1;
        where_sql.push_str(&format!(" AND date >= ${}", bind_idx));
    }
    if filter.to.is_some() {
        bind_idx += 1;
        where_sql.push_str(&format!(" AND date <= ${}", bind_idx));
    }

    let sql = format!("SELECT * FROM attendance{} ORDER BY date DESC", where_sql);
    let mut query = sqlx::query_as::<_, Attendance>(&sql).bind(employee_id);
    if let Some(from) = filter.from {
        query = query.bind(from);
    }
    if let Some(to) = filter.to {
        query = query.bind(to);
    }

    let records = query.fetch_all(&state.db).await?;

    Ok(Json(records))
}
