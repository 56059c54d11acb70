// src/openapi.rs

use crate::models::{
    Attendance, AuthResponse, ComponentCategory, ComponentType, CreateComponentRequest,
    CreateDepartmentRequest, CreateEmployeeRequest, CreateLeaveRequest, CreatePayrollRequest,
    CreatePermissionRequest, CalculatePayrollRequest, Department, DepartmentNikConfig, Employee,
    EmployeeListResponse, GenerateNikResponse, ImportEmployeesRequest, ImportItemResult,
    ImportReport, LeaveListResponse, LeaveQuota, LeaveRequest, LeaveStatus, LoginRequest, Payroll,
    PayrollComponent, PayrollListResponse, PayrollStatus, PermissionRequest, PermissionType,
    RegisterRequest, Salary, SetLeaveQuotaRequest, SetNikConfigRequest, SetSalaryRequest,
    UpdateComponentRequest, UpdateEmployeeRequest, UpdatePayrollStatusRequest,
    UpdateRequestStatusRequest, UserPublic, UserRole, ValidateNikRequest, ValidateNikResponse,
};
use crate::services::payroll::{ComponentAmount, PayrollBreakdown};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRIS Backend API",
        version = "1.0.0",
        description = "HR and payroll administration API built with Rust and Axum. \
            Covers employee records, department-scoped NIK generation, leave requests \
            and quotas, sick/permission requests, attendance, salary components and \
            payroll computation.",
        license(name = "MIT")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,
        // Departments & NIK
        crate::handlers::department::create_department,
        crate::handlers::department::list_departments,
        crate::handlers::department::get_department,
        crate::handlers::department::set_nik_config,
        crate::handlers::department::get_nik_config,
        crate::handlers::department::generate_nik,
        crate::handlers::department::validate_nik,
        // Employees
        crate::handlers::employee::create_employee,
        crate::handlers::employee::list_employees,
        crate::handlers::employee::get_employee,
        crate::handlers::employee::update_employee,
        crate::handlers::employee::deactivate_employee,
        crate::handlers::employee::import_employees,
        // Salaries & components
        crate::handlers::salary::set_salary,
        crate::handlers::salary::update_salary,
        crate::handlers::salary::get_salary,
        crate::handlers::salary::create_component,
        crate::handlers::salary::list_components,
        crate::handlers::salary::update_component,
        // Payroll
        crate::handlers::payroll::calculate_payroll,
        crate::handlers::payroll::create_payroll,
        crate::handlers::payroll::list_payrolls,
        crate::handlers::payroll::get_payroll,
        crate::handlers::payroll::update_payroll_status,
        // Leave
        crate::handlers::leave::create_leave,
        crate::handlers::leave::approve_leave,
        crate::handlers::leave::reject_leave,
        crate::handlers::leave::get_leave,
        crate::handlers::leave::list_leave,
        crate::handlers::leave::set_leave_quota,
        crate::handlers::leave::list_leave_quotas,
        // Permission / sick requests
        crate::handlers::permission::create_permission_request,
        crate::handlers::permission::list_permission_requests,
        crate::handlers::permission::update_permission_status,
        // Attendance
        crate::handlers::attendance::check_in,
        crate::handlers::attendance::check_out,
        crate::handlers::attendance::list_attendance,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, AuthResponse, UserPublic, UserRole,
            CreateDepartmentRequest, Department,
            SetNikConfigRequest, DepartmentNikConfig, GenerateNikResponse,
            ValidateNikRequest, ValidateNikResponse,
            CreateEmployeeRequest, UpdateEmployeeRequest, Employee, EmployeeListResponse,
            ImportEmployeesRequest, ImportItemResult, ImportReport,
            SetSalaryRequest, Salary,
            CreateComponentRequest, UpdateComponentRequest, PayrollComponent,
            ComponentType, ComponentCategory,
            CalculatePayrollRequest, CreatePayrollRequest, Payroll, PayrollStatus,
            PayrollListResponse, UpdatePayrollStatusRequest,
            ComponentAmount, PayrollBreakdown,
            CreateLeaveRequest, LeaveRequest, LeaveStatus, LeaveListResponse,
            SetLeaveQuotaRequest, LeaveQuota,
            CreatePermissionRequest, PermissionRequest, PermissionType,
            UpdateRequestStatusRequest,
            Attendance,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Register, login, and inspect the current user"),
        (name = "Departments", description = "Manage departments"),
        (name = "NIK", description = "Department-scoped employee identifier configuration and issuance"),
        (name = "Employees", description = "Onboard and manage employees"),
        (name = "Salaries", description = "Salary records per employee"),
        (name = "Payroll Components", description = "Configure income and deduction components"),
        (name = "Payroll", description = "Calculate and persist payroll records"),
        (name = "Leave", description = "Leave requests and quotas"),
        (name = "Permission Requests", description = "Sick and permission requests with proof documents"),
        (name = "Attendance", description = "Daily check-in and check-out"),
    )
)]
pub struct ApiDoc;
