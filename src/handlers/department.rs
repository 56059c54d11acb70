// src/handlers/department.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreateDepartmentRequest, Department, DepartmentNikConfig, GenerateNikResponse,
        SetNikConfigRequest, ValidateNikRequest, ValidateNikResponse,
    },
    services::nik,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Create a department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 409, description = "Department name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn create_department(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateDepartmentRequest>,
) -> AppResult<(StatusCode, Json<Department>)> {
    auth.require_admin()?;

    if body.name.trim().is_empty() {
        return Err(AppError::Validation("name must not be empty".to_string()));
    }

    let department = sqlx::query_as::<_, Department>(
        r#"INSERT INTO departments (id, name, created_at, updated_at)
           VALUES ($1, $2, NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(body.name.trim())
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if AppError::is_unique_violation(&e) {
            AppError::Conflict(format!("Department '{}' already exists", body.name.trim()))
        } else {
            e.into()
        }
    })?;

    Ok((StatusCode::CREATED, Json(department)))
}

/// List all departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses((status = 200, description = "List of departments", body = Vec<Department>)),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn list_departments(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Department>>> {
    let departments =
        sqlx::query_as::<_, Department>("SELECT * FROM departments ORDER BY name")
            .fetch_all(&state.db)
            .await?;

    Ok(Json(departments))
}

/// Get a single department
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(("department_id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department detail", body = Department),
        (status = 404, description = "Department not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Departments"
)]
pub async fn get_department(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> AppResult<Json<Department>> {
    let department =
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(department_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department {} not found", department_id)))?;

    Ok(Json(department))
}

/// Set or update the department's NIK configuration
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}/nik-config",
    request_body = SetNikConfigRequest,
    params(("department_id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "NIK config saved", body = DepartmentNikConfig),
        (status = 404, description = "Department not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "NIK"
)]
pub async fn set_nik_config(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
    Json(body): Json<SetNikConfigRequest>,
) -> AppResult<Json<DepartmentNikConfig>> {
    auth.require_admin()?;

    if body.prefix.trim().is_empty() {
        return Err(AppError::Validation("prefix must not be empty".to_string()));
    }
    let sequence_length = body.sequence_length.unwrap_or(3);
    if sequence_length < 1 {
        return Err(AppError::Validation(
            "sequence_length must be at least 1".to_string(),
        ));
    }
    let current_sequence = body.current_sequence.unwrap_or(1);
    if current_sequence < 1 {
        return Err(AppError::Validation(
            "current_sequence must be at least 1".to_string(),
        ));
    }

    let _ = sqlx::query_scalar::<_, Uuid>("SELECT id FROM departments WHERE id = $1")
        .bind(department_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Department {} not found", department_id)))?;

    // Single active config per department: replace in one transaction so
    // the partial unique index never sees two active rows.
    let mut tx = state.db.begin().await?;

    sqlx::query(
        "UPDATE department_nik_configs SET is_active = FALSE, updated_at = NOW()
         WHERE department_id = $1 AND is_active = TRUE",
    )
    .bind(department_id)
    .execute(&mut *tx)
    .await?;

    let config = sqlx::query_as::<_, DepartmentNikConfig>(
        r#"INSERT INTO department_nik_configs
               (id, department_id, prefix, current_sequence, sequence_length, format_pattern,
                is_active, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(department_id)
    .bind(body.prefix.trim())
    .bind(current_sequence)
    .bind(sequence_length)
    .bind(&body.format_pattern)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Json(config))
}

/// Get the department's active NIK configuration
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}/nik-config",
    params(("department_id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Active NIK config", body = DepartmentNikConfig),
        (status = 404, description = "No active NIK config"),
    ),
    security(("bearer_auth" = [])),
    tag = "NIK"
)]
pub async fn get_nik_config(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> AppResult<Json<DepartmentNikConfig>> {
    let config = sqlx::query_as::<_, DepartmentNikConfig>(
        "SELECT * FROM department_nik_configs WHERE department_id = $1 AND is_active = TRUE",
    )
    .bind(department_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "No active NIK configuration for department {}",
            department_id
        ))
    })?;

    Ok(Json(config))
}

/// Issue the next NIK for a department and advance its sequence
#[utoipa::path(
    post,
    path = "/api/v1/departments/{department_id}/nik/generate",
    params(("department_id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "NIK issued", body = GenerateNikResponse),
        (status = 422, description = "No NIK configuration resolvable"),
    ),
    security(("bearer_auth" = [])),
    tag = "NIK"
)]
pub async fn generate_nik(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(department_id): Path<Uuid>,
) -> AppResult<Json<GenerateNikResponse>> {
    auth.require_hr_or_admin()?;

    let (nik, config) = nik::generate_next_nik(
        &state.db,
        department_id,
        &state.config.nik_default_departments,
    )
    .await?;

    Ok(Json(GenerateNikResponse {
        nik,
        department_id: config.department_id,
        next_sequence: config.current_sequence,
    }))
}

/// Check a candidate NIK against a department's expected format
#[utoipa::path(
    post,
    path = "/api/v1/nik/validate",
    request_body = ValidateNikRequest,
    responses(
        (status = 200, description = "Validation result", body = ValidateNikResponse),
        (status = 404, description = "Department not found"),
        (status = 422, description = "No NIK configuration resolvable"),
    ),
    security(("bearer_auth" = [])),
    tag = "NIK"
)]
pub async fn validate_nik(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ValidateNikRequest>,
) -> AppResult<Json<ValidateNikResponse>> {
    let config = sqlx::query_as::<_, DepartmentNikConfig>(
        "SELECT c.* FROM department_nik_configs c
         JOIN departments d ON d.id = c.department_id
         WHERE d.name = $1 AND c.is_active = TRUE",
    )
    .bind(&body.department_name)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotConfigured(format!(
            "no active NIK configuration for department '{}'",
            body.department_name
        ))
    })?;

    let valid = nik::validate_format(&body.nik, &body.department_name, &config);

    Ok(Json(ValidateNikResponse {
        nik: body.nik,
        department_name: body.department_name,
        valid,
    }))
}
