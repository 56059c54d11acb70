// src/routes/mod.rs

use crate::{
    handlers::{
        attendance::{check_in, check_out, list_attendance},
        auth::{login, me, register},
        department::{
            create_department, generate_nik, get_department, get_nik_config, list_departments,
            set_nik_config, validate_nik,
        },
        employee::{
            create_employee, deactivate_employee, get_employee, import_employees, list_employees,
            update_employee,
        },
        leave::{
            approve_leave, create_leave, get_leave, list_leave, list_leave_quotas, reject_leave,
            set_leave_quota,
        },
        payroll::{
            calculate_payroll, create_payroll, get_payroll, list_payrolls, update_payroll_status,
        },
        permission::{
            create_permission_request, list_permission_requests, update_permission_status,
        },
        salary::{
            create_component, get_salary, list_components, set_salary, update_component,
            update_salary,
        },
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, patch, post, put},
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // ─── Auth ─────────────────────────────────────────────
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // ─── Departments & NIK ────────────────────────────────
        .route("/departments", post(create_department).get(list_departments))
        .route("/departments/{department_id}", get(get_department))
        .route(
            "/departments/{department_id}/nik-config",
            put(set_nik_config).get(get_nik_config),
        )
        .route("/departments/{department_id}/nik/generate", post(generate_nik))
        .route("/nik/validate", post(validate_nik))
        // ─── Employees ────────────────────────────────────────
        .route("/employees", post(create_employee).get(list_employees))
        .route("/employees/import", post(import_employees))
        .route(
            "/employees/{employee_id}",
            get(get_employee)
                .put(update_employee)
                .delete(deactivate_employee),
        )
        // ─── Salaries ─────────────────────────────────────────
        .route(
            "/employees/{employee_id}/salary",
            put(set_salary).patch(update_salary).get(get_salary),
        )
        // ─── Leave quotas ─────────────────────────────────────
        .route(
            "/employees/{employee_id}/leave-quotas",
            put(set_leave_quota).get(list_leave_quotas),
        )
        // ─── Payroll components ───────────────────────────────
        .route(
            "/payroll/components",
            post(create_component).get(list_components),
        )
        .route("/payroll/components/{component_id}", put(update_component))
        // ─── Payroll ──────────────────────────────────────────
        .route("/payroll/calculate", post(calculate_payroll))
        .route("/payroll", post(create_payroll).get(list_payrolls))
        .route("/payroll/{payroll_id}", get(get_payroll))
        .route("/payroll/{payroll_id}/status", patch(update_payroll_status))
        // ─── Leave ────────────────────────────────────────────
        .route("/leave", post(create_leave).get(list_leave))
        .route("/leave/{leave_id}", get(get_leave))
        .route("/leave/{leave_id}/approve", put(approve_leave))
        .route("/leave/{leave_id}/reject", put(reject_leave))
        // ─── Permission / sick requests ───────────────────────
        .route(
            "/permission-requests",
            post(create_permission_request).get(list_permission_requests),
        )
        .route(
            "/permission-requests/{request_id}/status",
            put(update_permission_status),
        )
        // ─── Attendance ───────────────────────────────────────
        .route("/attendance/check-in", post(check_in))
        .route("/attendance/check-out", post(check_out))
        .route("/attendance", get(list_attendance))
}
