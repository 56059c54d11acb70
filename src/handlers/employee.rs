// src/handlers/employee.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreateEmployeeRequest, Employee, EmployeeFilter, EmployeeListResponse,
        ImportEmployeesRequest, ImportItemResult, ImportReport, UpdateEmployeeRequest,
    },
    services::nik,
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Resolve the NIK for a new employee. A missing configuration is a
/// degraded case, not a failure: the employee still gets a synthesized
/// identifier.
async fn resolve_nik(
    db: &PgPool,
    department_id: Option<Uuid>,
    default_departments: &[String],
    email: &str,
) -> AppResult<String> {
    let Some(department_id) = department_id else {
        warn!(email, "employee has no department, issuing fallback NIK");
        return Ok(nik::fallback_nik());
    };

    match nik::generate_next_nik(db, department_id, default_departments).await {
        Ok((nik, _)) => Ok(nik),
        Err(AppError::NotConfigured(_)) | Err(AppError::NotFound(_)) => {
            warn!(
                email,
                %department_id,
                "no NIK configuration resolvable, issuing fallback NIK"
            );
            Ok(nik::fallback_nik())
        }
        Err(e) => Err(e),
    }
}

async fn insert_employee(
    db: &PgPool,
    nik_value: &str,
    body: &CreateEmployeeRequest,
) -> Result<Employee, sqlx::Error> {
    sqlx::query_as::<_, Employee>(
        r#"INSERT INTO employees
               (id, nik, full_name, email, department_id, position, join_date,
                is_active, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(nik_value)
    .bind(&body.full_name)
    .bind(&body.email)
    .bind(body.department_id)
    .bind(&body.position)
    .bind(body.join_date)
    .fetch_one(db)
    .await
}

/// Onboard a new employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 409, description = "Email or NIK already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateEmployeeRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    auth.require_hr_or_admin()?;

    if body.full_name.trim().is_empty() || body.email.trim().is_empty() {
        return Err(AppError::Validation(
            "full_name and email are required".to_string(),
        ));
    }

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE email = $1")
        .bind(&body.email)
        .fetch_optional(&state.db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "Employee with email '{}' already exists",
            body.email
        )));
    }

    let nik_value = match &body.nik {
        Some(explicit) => explicit.clone(),
        None => {
            resolve_nik(
                &state.db,
                body.department_id,
                &state.config.nik_default_departments,
                &body.email,
            )
            .await?
        }
    };

    // A collision on the unique NIK column gets one retry with a
    // timestamp-based fallback before the request fails.
    let employee = match insert_employee(&state.db, &nik_value, &body).await {
        Ok(employee) => employee,
        Err(e) if AppError::is_unique_violation(&e) => {
            let retry_nik = nik::fallback_nik();
            warn!(nik = %nik_value, retry_nik = %retry_nik, "NIK collision, retrying with fallback");
            insert_employee(&state.db, &retry_nik, &body)
                .await
                .map_err(|e| {
                    if AppError::is_unique_violation(&e) {
                        AppError::Conflict("NIK already exists".to_string())
                    } else {
                        e.into()
                    }
                })?
        }
        Err(e) => return Err(e.into()),
    };

    Ok((StatusCode::CREATED, Json(employee)))
}

/// List employees, filtered and paginated
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeFilter),
    responses((status = 200, description = "Paginated employee list", body = EmployeeListResponse)),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
) -> AppResult<Json<EmployeeListResponse>> {
    let per_page = filter.per_page.unwrap_or(10).min(100);
    let page = filter.page.unwrap_or(1).max(1);
    let offset = i64::from(page - 1) * i64::from(per_page);

    let mut where_sql = String::from(" WHERE 1=1");
    let mut bind_idx = 0u32;

    if filter.department_id.is_some() {
        bind_idx += 1;
        where_sql.push_str(&format!(" AND department_id = ${}", bind_idx));
    }
    if filter.is_active.is_some() {
        bind_idx += 1;
        where_sql.push_str(&format!(" AND is_active = ${}", bind_idx));
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(department_id) = filter.department_id {
        count_q = count_q.bind(department_id);
    }
    if let Some(is_active) = filter.is_active {
        count_q = count_q.bind(is_active);
    }
    let total = count_q.fetch_one(&state.db).await?;

    let data_sql = format!(
        "SELECT * FROM employees{} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
        where_sql,
        bind_idx + 1,
        bind_idx + 2
    );
    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    if let Some(department_id) = filter.department_id {
        data_q = data_q.bind(department_id);
    }
    if let Some(is_active) = filter.is_active {
        data_q = data_q.bind(is_active);
    }
    let employees = data_q
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Get a single employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee detail", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

/// Update an employee's profile
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    request_body = UpdateEmployeeRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<UpdateEmployeeRequest>,
) -> AppResult<Json<Employee>> {
    auth.require_hr_or_admin()?;

    let employee = sqlx::query_as::<_, Employee>(
        r#"UPDATE employees
           SET full_name = COALESCE($1, full_name),
               department_id = COALESCE($2, department_id),
               position = COALESCE($3, position),
               updated_at = NOW()
           WHERE id = $4
           RETURNING *"#,
    )
    .bind(&body.full_name)
    .bind(body.department_id)
    .bind(&body.position)
    .bind(employee_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    Ok(Json(employee))
}

/// Deactivate (soft-delete) an employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deactivated"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn deactivate_employee(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    auth.require_hr_or_admin()?;

    let result =
        sqlx::query("UPDATE employees SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(employee_id)
            .execute(&state.db)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Employee {} not found",
            employee_id
        )));
    }

    Ok(Json(serde_json::json!({ "message": "Employee deactivated successfully" })))
}

async fn import_one(
    state: &AppState,
    row: usize,
    full_name: &str,
    email: &str,
    department_id: Option<Uuid>,
    position: Option<String>,
    join_date: NaiveDate,
) -> Result<(Employee, String), AppError> {
    if full_name.trim().is_empty() || email.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "row {}: full_name and email are required",
            row
        )));
    }

    let existing = sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE email = $1")
        .bind(email)
        .fetch_optional(&state.db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!(
            "employee with email '{}' already exists",
            email
        )));
    }

    let nik_value = resolve_nik(
        &state.db,
        department_id,
        &state.config.nik_default_departments,
        email,
    )
    .await?;

    let request = CreateEmployeeRequest {
        full_name: full_name.to_string(),
        email: email.to_string(),
        department_id,
        position,
        join_date,
        nik: None,
    };

    match insert_employee(&state.db, &nik_value, &request).await {
        Ok(employee) => Ok((employee, nik_value)),
        Err(e) if AppError::is_unique_violation(&e) => {
            let retry_nik = nik::fallback_nik();
            warn!(nik = %nik_value, retry_nik = %retry_nik, "NIK collision during import, retrying");
            let employee = insert_employee(&state.db, &retry_nik, &request).await?;
            Ok((employee, retry_nik))
        }
        Err(e) => Err(e.into()),
    }
}

/// Bulk-import employees.
/// Items are processed sequentially; a failing item is reported in the
/// result list and never rolls back the items already committed.
#[utoipa::path(
    post,
    path = "/api/v1/employees/import",
    request_body = ImportEmployeesRequest,
    responses((status = 200, description = "Per-item import report", body = ImportReport)),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn import_employees(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ImportEmployeesRequest>,
) -> AppResult<Json<ImportReport>> {
    auth.require_hr_or_admin()?;

    let mut results = Vec::with_capacity(body.employees.len());
    let mut created = 0usize;
    let mut failed = 0usize;

    for (row, item) in body.employees.iter().enumerate() {
        match import_one(
            &state,
            row,
            &item.full_name,
            &item.email,
            item.department_id,
            item.position.clone(),
            item.join_date,
        )
        .await
        {
            Ok((_, nik_value)) => {
                created += 1;
                results.push(ImportItemResult {
                    row,
                    email: item.email.clone(),
                    nik: Some(nik_value),
                    status: "created".to_string(),
                    error: None,
                });
            }
            Err(e) => {
                failed += 1;
                results.push(ImportItemResult {
                    row,
                    email: item.email.clone(),
                    nik: None,
                    status: "failed".to_string(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    Ok(Json(ImportReport {
        created,
        failed,
        results,
    }))
}
