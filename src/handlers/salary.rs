// src/handlers/salary.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CreateComponentRequest, PayrollComponent, Salary, SetSalaryRequest,
        UpdateComponentRequest,
    },
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn check_non_negative(field: &str, value: Option<Decimal>) -> AppResult<()> {
    if let Some(v) = value {
        if v < Decimal::ZERO {
            return Err(AppError::InvalidAmount(format!(
                "{} must not be negative",
                field
            )));
        }
    }
    Ok(())
}

fn validate_salary_body(body: &SetSalaryRequest) -> AppResult<()> {
    if body.basic_salary <= Decimal::ZERO {
        return Err(AppError::InvalidAmount(
            "basic_salary must be greater than zero".to_string(),
        ));
    }
    check_non_negative("position_allowance", body.position_allowance)?;
    check_non_negative("management_allowance", body.management_allowance)?;
    check_non_negative("phone_allowance", body.phone_allowance)?;
    check_non_negative("incentive", body.incentive)?;
    check_non_negative("overtime_allowance", body.overtime_allowance)?;
    Ok(())
}

/// Create an employee's salary record
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}/salary",
    request_body = SetSalaryRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 201, description = "Salary created", body = Salary),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Salary record already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salaries"
)]
pub async fn set_salary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<SetSalaryRequest>,
) -> AppResult<(StatusCode, Json<Salary>)> {
    auth.require_hr_or_admin()?;
    validate_salary_body(&body)?;

    let _ = sqlx::query_scalar::<_, Uuid>("SELECT id FROM employees WHERE id = $1")
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", employee_id)))?;

    let salary = sqlx::query_as::<_, Salary>(
        r#"INSERT INTO salaries
               (id, employee_id, basic_salary, position_allowance, management_allowance,
                phone_allowance, incentive, overtime_allowance, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(body.basic_salary)
    .bind(body.position_allowance)
    .bind(body.management_allowance)
    .bind(body.phone_allowance)
    .bind(body.incentive)
    .bind(body.overtime_allowance)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if AppError::is_unique_violation(&e) {
            AppError::Conflict(format!(
                "Salary record for employee {} already exists",
                employee_id
            ))
        } else {
            e.into()
        }
    })?;

    Ok((StatusCode::CREATED, Json(salary)))
}

/// Update an existing salary record
#[utoipa::path(
    patch,
    path = "/api/v1/employees/{employee_id}/salary",
    request_body = SetSalaryRequest,
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Salary updated", body = Salary),
        (status = 404, description = "Salary record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salaries"
)]
pub async fn update_salary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    Json(body): Json<SetSalaryRequest>,
) -> AppResult<Json<Salary>> {
    auth.require_hr_or_admin()?;
    validate_salary_body(&body)?;

    let salary = sqlx::query_as::<_, Salary>(
        r#"UPDATE salaries
           SET basic_salary = $1,
               position_allowance = $2,
               management_allowance = $3,
               phone_allowance = $4,
               incentive = $5,
               overtime_allowance = $6,
               updated_at = NOW()
           WHERE employee_id = $7
           RETURNING *"#,
    )
    .bind(body.basic_salary)
    .bind(body.position_allowance)
    .bind(body.management_allowance)
    .bind(body.phone_allowance)
    .bind(body.incentive)
    .bind(body.overtime_allowance)
    .bind(employee_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!("Salary record for employee {} not found", employee_id))
    })?;

    Ok(Json(salary))
}

/// Get an employee's salary record
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}/salary",
    params(("employee_id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Salary detail", body = Salary),
        (status = 404, description = "Salary record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Salaries"
)]
pub async fn get_salary(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> AppResult<Json<Salary>> {
    auth.require_hr_or_admin()?;

    let salary = sqlx::query_as::<_, Salary>("SELECT * FROM salaries WHERE employee_id = $1")
        .bind(employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Salary record for employee {} not found", employee_id))
        })?;

    Ok(Json(salary))
}

// ─── Payroll Components ───────────────────────────────────────────────────────

/// Create a payroll component
#[utoipa::path(
    post,
    path = "/api/v1/payroll/components",
    request_body = CreateComponentRequest,
    responses(
        (status = 201, description = "Component created", body = PayrollComponent),
        (status = 409, description = "Component name already exists"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Components"
)]
pub async fn create_component(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreateComponentRequest>,
) -> AppResult<(StatusCode, Json<PayrollComponent>)> {
    auth.require_admin()?;

    let percentage = body.percentage.unwrap_or_default();
    let amount = body.amount.unwrap_or_default();

    if percentage < Decimal::ZERO || percentage > dec!(100) {
        return Err(AppError::Validation(
            "percentage must be between 0 and 100".to_string(),
        ));
    }
    if amount < Decimal::ZERO {
        return Err(AppError::InvalidAmount(
            "amount must not be negative".to_string(),
        ));
    }
    if percentage == Decimal::ZERO && amount == Decimal::ZERO {
        return Err(AppError::Validation(
            "one of percentage or amount must be greater than zero".to_string(),
        ));
    }

    let component = sqlx::query_as::<_, PayrollComponent>(
        r#"INSERT INTO payroll_components
               (id, name, component_type, category, percentage, amount, is_active,
                created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(&body.name)
    .bind(body.component_type)
    .bind(body.category)
    .bind(percentage)
    .bind(amount)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        if AppError::is_unique_violation(&e) {
            AppError::Conflict(format!("Component '{}' already exists", body.name))
        } else {
            e.into()
        }
    })?;

    Ok((StatusCode::CREATED, Json(component)))
}

/// List all payroll components
#[utoipa::path(
    get,
    path = "/api/v1/payroll/components",
    responses((status = 200, description = "List of components", body = Vec<PayrollComponent>)),
    security(("bearer_auth" = [])),
    tag = "Payroll Components"
)]
pub async fn list_components(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<PayrollComponent>>> {
    auth.require_hr_or_admin()?;

    let components = sqlx::query_as::<_, PayrollComponent>(
        "SELECT * FROM payroll_components ORDER BY component_type, name",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(components))
}

/// Update or toggle a payroll component
#[utoipa::path(
    put,
    path = "/api/v1/payroll/components/{component_id}",
    request_body = UpdateComponentRequest,
    params(("component_id" = Uuid, Path, description = "Component ID")),
    responses(
        (status = 200, description = "Component updated", body = PayrollComponent),
        (status = 404, description = "Component not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll Components"
)]
pub async fn update_component(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(component_id): Path<Uuid>,
    Json(body): Json<UpdateComponentRequest>,
) -> AppResult<Json<PayrollComponent>> {
    auth.require_admin()?;

    if let Some(p) = body.percentage {
        if p < Decimal::ZERO || p > dec!(100) {
            return Err(AppError::Validation(
                "percentage must be between 0 and 100".to_string(),
            ));
        }
    }
    check_non_negative("amount", body.amount)?;

    let component = sqlx::query_as::<_, PayrollComponent>(
        r#"UPDATE payroll_components
           SET name = COALESCE($1, name),
               percentage = COALESCE($2, percentage),
               amount = COALESCE($3, amount),
               is_active = COALESCE($4, is_active),
               updated_at = NOW()
           WHERE id = $5
           RETURNING *"#,
    )
    .bind(&body.name)
    .bind(body.percentage)
    .bind(body.amount)
    .bind(body.is_active)
    .bind(component_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Component {} not found", component_id)))?;

    Ok(Json(component))
}
