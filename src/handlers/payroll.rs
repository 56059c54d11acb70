// src/handlers/payroll.rs

use crate::{
    auth::AuthUser,
    errors::{AppError, AppResult},
    models::{
        CalculatePayrollRequest, CreatePayrollRequest, Payroll, PayrollComponent, PayrollFilter,
        PayrollListResponse, PayrollStatus, Salary, UpdatePayrollStatusRequest,
    },
    services::payroll::{self, ManualDeductions, PayrollBreakdown},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

async fn load_salary(db: &PgPool, employee_id: Uuid) -> AppResult<Salary> {
    sqlx::query_as::<_, Salary>("SELECT * FROM salaries WHERE employee_id = $1")
        .bind(employee_id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Salary record for employee {} not found", employee_id))
        })
}

async fn load_active_components(db: &PgPool) -> AppResult<Vec<PayrollComponent>> {
    let components = sqlx::query_as::<_, PayrollComponent>(
        "SELECT * FROM payroll_components WHERE is_active = TRUE ORDER BY component_type, name",
    )
    .fetch_all(db)
    .await?;
    Ok(components)
}

/// Compute a payslip breakdown without persisting anything
#[utoipa::path(
    post,
    path = "/api/v1/payroll/calculate",
    request_body = CalculatePayrollRequest,
    responses(
        (status = 200, description = "Payslip breakdown", body = PayrollBreakdown),
        (status = 404, description = "Salary record not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn calculate_payroll(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CalculatePayrollRequest>,
) -> AppResult<Json<PayrollBreakdown>> {
    auth.require_hr_or_admin()?;

    let manual = ManualDeductions::new(body.kasbon, body.telat, body.angsuran_kredit)?;
    if let Some(v) = body.basic_salary {
        if v <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(
                "basic_salary must be greater than zero".to_string(),
            ));
        }
    }
    let salary = load_salary(&state.db, body.employee_id).await?;
    let components = load_active_components(&state.db).await?;

    Ok(Json(payroll::calculate(&salary, &components, &manual)))
}

/// Create a payroll record for one employee and pay period
#[utoipa::path(
    post,
    path = "/api/v1/payroll",
    request_body = CreatePayrollRequest,
    responses(
        (status = 201, description = "Payroll created", body = Payroll),
        (status = 404, description = "Salary record not found"),
        (status = 409, description = "Payroll already exists for this employee and month"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<CreatePayrollRequest>,
) -> AppResult<(StatusCode, Json<Payroll>)> {
    auth.require_hr_or_admin()?;

    let manual = ManualDeductions::new(body.kasbon, body.telat, body.angsuran_kredit)?;
    if let Some(v) = body.basic_salary {
        if v <= Decimal::ZERO {
            return Err(AppError::InvalidAmount(
                "basic_salary must be greater than zero".to_string(),
            ));
        }
    }
    for (field, value) in [
        ("bpjs_company", body.bpjs_company),
        ("bpjs_employee", body.bpjs_employee),
    ] {
        if let Some(v) = value {
            if v < Decimal::ZERO {
                return Err(AppError::InvalidAmount(format!(
                    "{} must not be negative",
                    field
                )));
            }
        }
    }

    let period = payroll::period_of(body.payment_date);

    let existing = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM payrolls WHERE employee_id = $1 AND period = $2",
    )
    .bind(body.employee_id)
    .bind(&period)
    .fetch_optional(&state.db)
    .await?;

    if existing.is_some() {
        return Err(AppError::DuplicatePayrollPeriod);
    }

    let salary = load_salary(&state.db, body.employee_id).await?;
    let components = load_active_components(&state.db).await?;

    let totals = payroll::resolve_creation(
        &salary,
        &components,
        body.bpjs_company,
        body.bpjs_employee,
        &manual,
    );

    // The caller-supplied basic_salary follows the "base plus allowances"
    // API convention and is recorded verbatim; component math above used
    // the pure value from the salary record.
    let recorded_basic = body.basic_salary.unwrap_or(salary.basic_salary);

    let created = sqlx::query_as::<_, Payroll>(
        r#"INSERT INTO payrolls
               (id, employee_id, payment_date, period, basic_salary,
                bpjs_company, bpjs_employee, total_allowances,
                pendapatan_tetap, pendapatan_tidak_tetap, total_pendapatan,
                kasbon, telat, angsuran_kredit, total_deductions, net_salary,
                status, created_at, updated_at)
           VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                   $17, NOW(), NOW())
           RETURNING *"#,
    )
    .bind(Uuid::new_v4())
    .bind(body.employee_id)
    .bind(body.payment_date)
    .bind(&period)
    .bind(recorded_basic)
    .bind(totals.bpjs_company)
    .bind(totals.bpjs_employee)
    .bind(totals.total_allowances)
    .bind(totals.pendapatan_tetap)
    .bind(totals.pendapatan_tidak_tetap)
    .bind(totals.total_pendapatan)
    .bind(manual.kasbon)
    .bind(manual.telat)
    .bind(manual.angsuran_kredit)
    .bind(totals.total_deductions)
    .bind(totals.net_salary)
    .bind(PayrollStatus::Pending)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        // concurrent create for the same month loses on the unique index
        if AppError::is_unique_violation(&e) {
            AppError::DuplicatePayrollPeriod
        } else {
            e.into()
        }
    })?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// List payroll records, filtered and paginated
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollFilter),
    responses((status = 200, description = "Paginated payroll list", body = PayrollListResponse)),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<PayrollFilter>,
) -> AppResult<Json<PayrollListResponse>> {
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
    if filter.period.is_some() {
        bind_idx += 1;
        where_sql.push_str(&format!(" AND period = ${}", bind_idx));
    }

    let count_sql = format!("SELECT COUNT(*) FROM payrolls{}", where_sql);
    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    if let Some(employee_id) = filter.employee_id {
        count_q = count_q.bind(employee_id);
    }
    if let Some(period) = &filter.period {
        count_q = count_q.bind(period);
    }
    let total = count_q.fetch_one(&state.db).await?;

    let data_sql = format!(
        "SELECT * FROM payrolls{} ORDER BY payment_date DESC LIMIT ${} OFFSET ${}",
        where_sql,
        bind_idx + 1,
        bind_idx + 2
    );
    let mut data_q = sqlx::query_as::<_, Payroll>(&data_sql);
    if let Some(employee_id) = filter.employee_id {
        data_q = data_q.bind(employee_id);
    }
    if let Some(period) = &filter.period {
        data_q = data_q.bind(period);
    }
    let payrolls = data_q
        .bind(i64::from(per_page))
        .bind(offset)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(PayrollListResponse {
        data: payrolls,
        page,
        per_page,
        total,
    }))
}

/// Get a single payroll record
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id" = Uuid, Path, description = "Payroll ID")),
    responses(
        (status = 200, description = "Payroll detail", body = Payroll),
        (status = 404, description = "Payroll not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(payroll_id): Path<Uuid>,
) -> AppResult<Json<Payroll>> {
    auth.require_hr_or_admin()?;

    let record = sqlx::query_as::<_, Payroll>("SELECT * FROM payrolls WHERE id = $1")
        .bind(payroll_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Payroll {} not found", payroll_id)))?;

    Ok(Json(record))
}

/// Update a payroll record's workflow status
#[utoipa::path(
    patch,
    path = "/api/v1/payroll/{payroll_id}/status",
    request_body = UpdatePayrollStatusRequest,
    params(("payroll_id" = Uuid, Path, description = "Payroll ID")),
    responses(
        (status = 200, description = "Status updated", body = Payroll),
        (status = 404, description = "Payroll not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll_status(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(payroll_id): Path<Uuid>,
    Json(body): Json<UpdatePayrollStatusRequest>,
) -> AppResult<Json<Payroll>> {
    auth.require_hr_or_admin()?;

    let record = sqlx::query_as::<_, Payroll>(
        "UPDATE payrolls SET status = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
    )
    .bind(body.status)
    .bind(payroll_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Payroll {} not found", payroll_id)))?;

    Ok(Json(record))
}
