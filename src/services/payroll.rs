// src/services/payroll.rs

use crate::{
    errors::{AppError, AppResult},
    models::{ComponentCategory, ComponentType, PayrollComponent, Salary},
};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

/// Manual deductions keyed in by the payroll officer. All default to zero.
#[derive(Debug, Clone, Default)]
pub struct ManualDeductions {
    pub kasbon: Decimal,
    pub telat: Decimal,
    pub angsuran_kredit: Decimal,
}

impl ManualDeductions {
    pub fn new(
        kasbon: Option<Decimal>,
        telat: Option<Decimal>,
        angsuran_kredit: Option<Decimal>,
    ) -> AppResult<Self> {
        let deductions = Self {
            kasbon: kasbon.unwrap_or_default(),
            telat: telat.unwrap_or_default(),
            angsuran_kredit: angsuran_kredit.unwrap_or_default(),
        };
        for (field, value) in [
            ("kasbon", deductions.kasbon),
            ("telat", deductions.telat),
            ("angsuran_kredit", deductions.angsuran_kredit),
        ] {
            if value < Decimal::ZERO {
                return Err(AppError::InvalidAmount(format!(
                    "{} must not be negative",
                    field
                )));
            }
        }
        Ok(deductions)
    }

    pub fn total(&self) -> Decimal {
        self.kasbon + self.telat + self.angsuran_kredit
    }
}

/// One active component resolved against a basic salary.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComponentAmount {
    pub name: String,
    pub component_type: ComponentType,
    pub category: ComponentCategory,
    pub amount: Decimal,
    pub percentage_based: bool,
}

/// Full payslip breakdown. Read-only: producing one never touches
/// persisted payroll state.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollBreakdown {
    pub employee_id: Uuid,
    /// Pure base pay from the salary record, excluding allowances.
    pub basic_salary: Decimal,
    pub components: Vec<ComponentAmount>,
    pub total_income: Decimal,
    pub total_auto_deduction: Decimal,
    pub total_allowances: Decimal,
    pub pendapatan_tetap: Decimal,
    pub pendapatan_tidak_tetap: Decimal,
    pub total_pendapatan: Decimal,
    pub total_manual_deduction: Decimal,
    pub total_deduction: Decimal,
    pub net_salary: Decimal,
}

/// Resolved amounts for persisting a payroll row. Derived with the same
/// percentage rules as [`calculate`], with caller-supplied BPJS subtotals
/// taking precedence when nonzero.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationTotals {
    pub bpjs_company: Decimal,
    pub bpjs_employee: Decimal,
    pub total_allowances: Decimal,
    pub pendapatan_tetap: Decimal,
    pub pendapatan_tidak_tetap: Decimal,
    pub total_pendapatan: Decimal,
    pub total_deductions: Decimal,
    pub net_salary: Decimal,
}

/// Currency rounding: 2 decimal places, half away from zero.
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Pay period key of a payment date, "YYYY-MM". The unique index on
/// (employee_id, period) enforces one payroll per calendar month.
pub fn period_of(payment_date: chrono::NaiveDate) -> String {
    payment_date.format("%Y-%m").to_string()
}

/// A component's contribution for a given pure basic salary. Percentage
/// takes precedence over the flat amount when both are nonzero.
pub fn component_amount(basic_salary: Decimal, component: &PayrollComponent) -> Decimal {
    let hundred = dec!(100);
    if component.percentage > Decimal::ZERO {
        round_money(basic_salary * component.percentage / hundred)
    } else if component.amount > Decimal::ZERO {
        component.amount
    } else {
        Decimal::ZERO
    }
}

/// Sum of the five stored allowance fields.
pub fn allowance_total(salary: &Salary) -> Decimal {
    [
        salary.position_allowance,
        salary.management_allowance,
        salary.phone_allowance,
        salary.incentive,
        salary.overtime_allowance,
    ]
    .into_iter()
    .flatten()
    .sum()
}

/// Derive a payslip breakdown from the salary record, the active
/// components, and the manual deductions.
pub fn calculate(
    salary: &Salary,
    components: &[PayrollComponent],
    manual: &ManualDeductions,
) -> PayrollBreakdown {
    let basic = salary.basic_salary;

    let resolved: Vec<ComponentAmount> = components
        .iter()
        .map(|c| ComponentAmount {
            name: c.name.clone(),
            component_type: c.component_type,
            category: c.category,
            amount: component_amount(basic, c),
            percentage_based: c.percentage > Decimal::ZERO,
        })
        .collect();

    let total_income: Decimal = resolved
        .iter()
        .filter(|c| c.component_type == ComponentType::Income)
        .map(|c| c.amount)
        .sum();

    let total_auto_deduction: Decimal = resolved
        .iter()
        .filter(|c| c.component_type == ComponentType::Deduction)
        .map(|c| c.amount)
        .sum();

    let total_allowances = allowance_total(salary);

    let pendapatan_tetap = basic + total_income;
    let pendapatan_tidak_tetap = total_allowances;
    let total_pendapatan = pendapatan_tetap + pendapatan_tidak_tetap;

    let total_manual_deduction = manual.total();
    let total_deduction = total_auto_deduction + total_manual_deduction;

    PayrollBreakdown {
        employee_id: salary.employee_id,
        basic_salary: basic,
        components: resolved,
        total_income,
        total_auto_deduction,
        total_allowances,
        pendapatan_tetap,
        pendapatan_tidak_tetap,
        total_pendapatan,
        total_manual_deduction,
        total_deduction,
        net_salary: total_pendapatan - total_deduction,
    }
}

fn bpjs_subtotal(basic: Decimal, components: &[PayrollComponent], side: ComponentType) -> Decimal {
    components
        .iter()
        .filter(|c| c.category == ComponentCategory::Bpjs && c.component_type == side)
        .map(|c| component_amount(basic, c))
        .sum()
}

fn non_bpjs_subtotal(basic: Decimal, components: &[PayrollComponent], side: ComponentType) -> Decimal {
    components
        .iter()
        .filter(|c| c.category != ComponentCategory::Bpjs && c.component_type == side)
        .map(|c| component_amount(basic, c))
        .sum()
}

/// Resolve the amounts persisted on a payroll row. Caller-supplied BPJS
/// subtotals are kept when nonzero; zero or absent values are recomputed
/// from the active components before the subtotals are summed, so this
/// path and [`calculate`] agree whenever no override is given.
pub fn resolve_creation(
    salary: &Salary,
    components: &[PayrollComponent],
    provided_bpjs_company: Option<Decimal>,
    provided_bpjs_employee: Option<Decimal>,
    manual: &ManualDeductions,
) -> CreationTotals {
    let basic = salary.basic_salary;

    let bpjs_company = match provided_bpjs_company {
        Some(v) if v > Decimal::ZERO => v,
        _ => bpjs_subtotal(basic, components, ComponentType::Income),
    };
    let bpjs_employee = match provided_bpjs_employee {
        Some(v) if v > Decimal::ZERO => v,
        _ => bpjs_subtotal(basic, components, ComponentType::Deduction),
    };

    let other_income = non_bpjs_subtotal(basic, components, ComponentType::Income);
    let other_deduction = non_bpjs_subtotal(basic, components, ComponentType::Deduction);

    let total_allowances = allowance_total(salary);

    let pendapatan_tetap = basic + bpjs_company + other_income;
    let pendapatan_tidak_tetap = total_allowances;
    let total_pendapatan = pendapatan_tetap + pendapatan_tidak_tetap;
    let total_deductions = bpjs_employee + other_deduction + manual.total();

    CreationTotals {
        bpjs_company,
        bpjs_employee,
        total_allowances,
        pendapatan_tetap,
        pendapatan_tidak_tetap,
        total_pendapatan,
        total_deductions,
        net_salary: total_pendapatan - total_deductions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn salary(basic: Decimal, allowances: &[Decimal]) -> Salary {
        let mut fields = [None, None, None, None, None];
        for (slot, value) in fields.iter_mut().zip(allowances) {
            *slot = Some(*value);
        }
        Salary {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            basic_salary: basic,
            position_allowance: fields[0],
            management_allowance: fields[1],
            phone_allowance: fields[2],
            incentive: fields[3],
            overtime_allowance: fields[4],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn component(
        name: &str,
        component_type: ComponentType,
        category: ComponentCategory,
        percentage: Decimal,
        amount: Decimal,
    ) -> PayrollComponent {
        PayrollComponent {
            id: Uuid::new_v4(),
            name: name.to_string(),
            component_type,
            category,
            percentage,
            amount,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn percentage_takes_precedence_over_amount() {
        let c = component(
            "JHT",
            ComponentType::Income,
            ComponentCategory::Bpjs,
            dec!(3.7),
            dec!(999999),
        );
        assert_eq!(component_amount(dec!(10000000), &c), dec!(370000.00));
    }

    #[test]
    fn flat_amount_used_when_percentage_zero() {
        let c = component(
            "Uang Makan",
            ComponentType::Income,
            ComponentCategory::Allowance,
            dec!(0),
            dec!(500000),
        );
        assert_eq!(component_amount(dec!(10000000), &c), dec!(500000));
    }

    #[test]
    fn zero_percentage_and_amount_contribute_nothing() {
        let c = component(
            "Placeholder",
            ComponentType::Deduction,
            ComponentCategory::Variable,
            dec!(0),
            dec!(0),
        );
        assert_eq!(component_amount(dec!(10000000), &c), dec!(0));
    }

    #[test]
    fn percentage_amounts_round_half_away_from_zero() {
        let c = component(
            "JKK",
            ComponentType::Income,
            ComponentCategory::Bpjs,
            dec!(0.24),
            dec!(0),
        );
        // 1234567 * 0.24% = 2962.9608 -> 2962.96
        assert_eq!(component_amount(dec!(1234567), &c), dec!(2962.96));
    }

    #[test]
    fn worked_example() {
        let salary = salary(dec!(10000000), &[dec!(500000)]);
        let components = vec![
            component(
                "BPJS JHT (Perusahaan)",
                ComponentType::Income,
                ComponentCategory::Bpjs,
                dec!(3.7),
                dec!(0),
            ),
            component(
                "BPJS Kesehatan (Karyawan)",
                ComponentType::Deduction,
                ComponentCategory::Bpjs,
                dec!(1),
                dec!(0),
            ),
        ];
        let manual = ManualDeductions::new(Some(dec!(200000)), None, None).unwrap();

        let breakdown = calculate(&salary, &components, &manual);

        assert_eq!(breakdown.total_income, dec!(370000.00));
        assert_eq!(breakdown.total_auto_deduction, dec!(100000.00));
        assert_eq!(breakdown.pendapatan_tetap, dec!(10370000.00));
        assert_eq!(breakdown.pendapatan_tidak_tetap, dec!(500000));
        assert_eq!(breakdown.total_pendapatan, dec!(10870000.00));
        assert_eq!(breakdown.total_deduction, dec!(300000.00));
        assert_eq!(breakdown.net_salary, dec!(10570000.00));
    }

    #[test]
    fn net_salary_identity_holds() {
        let salary = salary(dec!(7500000), &[dec!(250000), dec!(100000)]);
        let components = vec![
            component(
                "BPJS Kesehatan (Perusahaan)",
                ComponentType::Income,
                ComponentCategory::Bpjs,
                dec!(4),
                dec!(0),
            ),
            component(
                "BPJS JP (Karyawan)",
                ComponentType::Deduction,
                ComponentCategory::Bpjs,
                dec!(1),
                dec!(0),
            ),
            component(
                "Potongan Seragam",
                ComponentType::Deduction,
                ComponentCategory::Fixed,
                dec!(0),
                dec!(75000),
            ),
        ];
        let manual = ManualDeductions::new(Some(dec!(50000)), Some(dec!(25000)), None).unwrap();

        let breakdown = calculate(&salary, &components, &manual);

        assert_eq!(
            breakdown.net_salary,
            breakdown.total_pendapatan - breakdown.total_deduction
        );
    }

    #[test]
    fn calculation_is_pure() {
        let salary = salary(dec!(10000000), &[dec!(500000)]);
        let components = vec![component(
            "BPJS JHT (Perusahaan)",
            ComponentType::Income,
            ComponentCategory::Bpjs,
            dec!(3.7),
            dec!(0),
        )];
        let manual = ManualDeductions::default();

        let first = calculate(&salary, &components, &manual);
        let second = calculate(&salary, &components, &manual);
        assert_eq!(first, second);
    }

    #[test]
    fn zero_allowances_and_deductions() {
        let salary = salary(dec!(5000000), &[]);
        let breakdown = calculate(&salary, &[], &ManualDeductions::default());

        assert_eq!(breakdown.total_allowances, dec!(0));
        assert_eq!(breakdown.pendapatan_tetap, dec!(5000000));
        assert_eq!(breakdown.net_salary, dec!(5000000));
    }

    #[test]
    fn negative_manual_deduction_rejected() {
        let result = ManualDeductions::new(Some(dec!(-1)), None, None);
        assert!(matches!(result, Err(AppError::InvalidAmount(_))));
    }

    #[test]
    fn period_is_calendar_month_of_payment_date() {
        let date = chrono::NaiveDate::from_ymd_opt(2026, 3, 28).unwrap();
        assert_eq!(period_of(date), "2026-03");
    }

    #[test]
    fn creation_matches_calculator_without_overrides() {
        let salary = salary(dec!(10000000), &[dec!(500000)]);
        let components = vec![
            component(
                "BPJS JHT (Perusahaan)",
                ComponentType::Income,
                ComponentCategory::Bpjs,
                dec!(3.7),
                dec!(0),
            ),
            component(
                "BPJS Kesehatan (Karyawan)",
                ComponentType::Deduction,
                ComponentCategory::Bpjs,
                dec!(1),
                dec!(0),
            ),
            component(
                "Tunjangan Transport",
                ComponentType::Income,
                ComponentCategory::Allowance,
                dec!(0),
                dec!(300000),
            ),
        ];
        let manual = ManualDeductions::new(Some(dec!(200000)), None, None).unwrap();

        let breakdown = calculate(&salary, &components, &manual);
        let totals = resolve_creation(&salary, &components, None, None, &manual);

        assert_eq!(totals.total_pendapatan, breakdown.total_pendapatan);
        assert_eq!(totals.total_deductions, breakdown.total_deduction);
        assert_eq!(totals.net_salary, breakdown.net_salary);
    }

    #[test]
    fn creation_recomputes_zero_bpjs_subtotals() {
        let salary = salary(dec!(10000000), &[]);
        let components = vec![
            component(
                "BPJS JHT (Perusahaan)",
                ComponentType::Income,
                ComponentCategory::Bpjs,
                dec!(3.7),
                dec!(0),
            ),
            component(
                "BPJS Kesehatan (Karyawan)",
                ComponentType::Deduction,
                ComponentCategory::Bpjs,
                dec!(1),
                dec!(0),
            ),
        ];
        let manual = ManualDeductions::default();

        // explicit zeros fall back to the percentage rule
        let totals = resolve_creation(
            &salary,
            &components,
            Some(dec!(0)),
            Some(dec!(0)),
            &manual,
        );
        assert_eq!(totals.bpjs_company, dec!(370000.00));
        assert_eq!(totals.bpjs_employee, dec!(100000.00));

        // nonzero overrides are kept
        let totals = resolve_creation(
            &salary,
            &components,
            Some(dec!(400000)),
            None,
            &manual,
        );
        assert_eq!(totals.bpjs_company, dec!(400000));
        assert_eq!(totals.bpjs_employee, dec!(100000.00));
    }
}
