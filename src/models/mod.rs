// src/models/mod.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// ─── Users / Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Hr,
    Employee,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub employee_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserPublic {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub employee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        UserPublic {
            id: user.id,
            email: user.email,
            role: user.role,
            employee_id: user.employee_id,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub employee_id: Option<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

// ─── Departments ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartmentRequest {
    pub name: String,
}

// ─── NIK Configuration ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct DepartmentNikConfig {
    pub id: Uuid,
    pub department_id: Uuid,
    pub prefix: String,
    pub current_sequence: i64,
    pub sequence_length: i32,
    /// Either a template containing `{prefix}`/`{sequence}`, the literal
    /// sentinel "PREFIX + SEQUENCE", or NULL for plain concatenation.
    pub format_pattern: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetNikConfigRequest {
    pub prefix: String,
    pub current_sequence: Option<i64>,
    pub sequence_length: Option<i32>,
    pub format_pattern: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GenerateNikResponse {
    pub nik: String,
    pub department_id: Uuid,
    pub next_sequence: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateNikRequest {
    pub nik: String,
    pub department_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateNikResponse {
    pub nik: String,
    pub department_name: String,
    pub valid: bool,
}

// ─── Employees ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub nik: Option<String>,
    pub full_name: String,
    pub email: String,
    pub department_id: Option<Uuid>,
    pub position: Option<String>,
    pub join_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub full_name: String,
    pub email: String,
    pub department_id: Option<Uuid>,
    pub position: Option<String>,
    pub join_date: NaiveDate,
    /// Explicit NIK; when absent one is generated from the department's
    /// active configuration.
    pub nik: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub full_name: Option<String>,
    pub department_id: Option<Uuid>,
    pub position: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeFilter {
    /// Filter by department
    pub department_id: Option<Uuid>,
    /// Filter by active flag
    pub is_active: Option<bool>,
    /// Pagination page number (1-based)
    pub page: Option<u32>,
    /// Items per page (max 100)
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportEmployeeItem {
    pub full_name: String,
    pub email: String,
    pub department_id: Option<Uuid>,
    pub position: Option<String>,
    pub join_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportEmployeesRequest {
    pub employees: Vec<ImportEmployeeItem>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportItemResult {
    pub row: usize,
    pub email: String,
    pub nik: Option<String>,
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportReport {
    pub created: usize,
    pub failed: usize,
    pub results: Vec<ImportItemResult>,
}

// ─── Salaries ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Salary {
    pub id: Uuid,
    pub employee_id: Uuid,
    /// Pure base pay, excluding every allowance.
    pub basic_salary: Decimal,
    pub position_allowance: Option<Decimal>,
    pub management_allowance: Option<Decimal>,
    pub phone_allowance: Option<Decimal>,
    pub incentive: Option<Decimal>,
    pub overtime_allowance: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetSalaryRequest {
    pub basic_salary: Decimal,
    pub position_allowance: Option<Decimal>,
    pub management_allowance: Option<Decimal>,
    pub phone_allowance: Option<Decimal>,
    pub incentive: Option<Decimal>,
    pub overtime_allowance: Option<Decimal>,
}

// ─── Payroll Components ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "component_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Income,
    Deduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "component_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Fixed,
    Variable,
    Bpjs,
    Allowance,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PayrollComponent {
    pub id: Uuid,
    pub name: String,
    pub component_type: ComponentType,
    pub category: ComponentCategory,
    /// Percentage of pure basic salary; 0 means "not percentage-based".
    pub percentage: Decimal,
    /// Flat amount, used when percentage is 0.
    pub amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateComponentRequest {
    pub name: String,
    pub component_type: ComponentType,
    pub category: ComponentCategory,
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComponentRequest {
    pub name: Option<String>,
    pub percentage: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub is_active: Option<bool>,
}

// ─── Payroll ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payroll_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum PayrollStatus {
    Pending,
    Approved,
    Paid,
    Rejected,
    Unpaid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Payroll {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub payment_date: NaiveDate,
    /// Calendar month of payment_date, "YYYY-MM". At most one payroll
    /// per employee per period.
    pub period: String,
    pub basic_salary: Decimal,
    pub bpjs_company: Decimal,
    pub bpjs_employee: Decimal,
    pub total_allowances: Decimal,
    pub pendapatan_tetap: Decimal,
    pub pendapatan_tidak_tetap: Decimal,
    pub total_pendapatan: Decimal,
    pub kasbon: Decimal,
    pub telat: Decimal,
    pub angsuran_kredit: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
    pub status: PayrollStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CalculatePayrollRequest {
    pub employee_id: Uuid,
    /// Base pay with allowances already folded in, per the API convention.
    /// Accepted for compatibility; component math always uses the pure
    /// basic salary from the employee's salary record.
    pub basic_salary: Option<Decimal>,
    pub kasbon: Option<Decimal>,
    pub telat: Option<Decimal>,
    pub angsuran_kredit: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePayrollRequest {
    pub employee_id: Uuid,
    pub payment_date: NaiveDate,
    /// Base pay with allowances already folded in, per the API convention.
    /// Stored on the payroll row as-is; component math always uses the
    /// pure basic salary from the employee's salary record.
    pub basic_salary: Option<Decimal>,
    /// Company-side BPJS total; recomputed from the active components
    /// when zero or absent.
    pub bpjs_company: Option<Decimal>,
    /// Employee-side BPJS total; recomputed from the active components
    /// when zero or absent.
    pub bpjs_employee: Option<Decimal>,
    pub kasbon: Option<Decimal>,
    pub telat: Option<Decimal>,
    pub angsuran_kredit: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePayrollStatusRequest {
    pub status: PayrollStatus,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayrollFilter {
    /// Filter by employee
    pub employee_id: Option<Uuid>,
    /// Filter by period, "YYYY-MM"
    pub period: Option<String>,
    /// Pagination page number (1-based)
    pub page: Option<u32>,
    /// Items per page (max 100)
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollListResponse {
    pub data: Vec<Payroll>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// ─── Leave ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "leave_status", rename_all = "lowercase")]
#[serde(rename_all = "UPPERCASE")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Quota bucket, e.g. "tahunan". Only "tahunan" is quota-checked.
    pub quota_type: String,
    pub reason: String,
    pub status: LeaveStatus,
    /// Opaque object-storage path of the supporting document.
    pub proof_document: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLeaveRequest {
    pub employee_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub quota_type: String,
    pub reason: String,
    pub proof_document: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee
    pub employee_id: Option<Uuid>,
    /// Filter by status
    pub status: Option<LeaveStatus>,
    /// Pagination page number (1-based)
    pub page: Option<u32>,
    /// Items per page (max 100)
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LeaveQuota {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub year: i32,
    pub quota_type: String,
    pub total_quota: i32,
    pub used_quota: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetLeaveQuotaRequest {
    pub year: i32,
    pub quota_type: String,
    pub total_quota: i32,
}

// ─── Permission / Sick Requests ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "permission_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PermissionType {
    Sick,
    Permission,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PermissionRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub request_type: PermissionType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub proof_document: Option<String>,
    pub status: LeaveStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePermissionRequest {
    pub employee_id: Uuid,
    pub request_type: PermissionType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub proof_document: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequestStatusRequest {
    pub status: LeaveStatus,
}

// ─── Attendance ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub date: NaiveDate,
    pub check_in: NaiveTime,
    pub check_out: Option<NaiveTime>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Filter by employee
    pub employee_id: Option<Uuid>,
    /// Inclusive range start
    pub from: Option<NaiveDate>,
    /// Inclusive range end
    pub to: Option<NaiveDate>,
}
