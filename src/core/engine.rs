use tracing::debug;

use super::error::{CalcError, SimulateError};
use super::types::{
    AffordabilityCheck, AffordabilityVerdict, AmortizationMethod, AmortizationResult,
    SimulationInput, SimulationOutput,
};
use super::validate::validate;

/// Share of monthly income an installment may take before the simulation is flagged.
pub const AFFORDABILITY_INCOME_SHARE: f64 = 0.30;

#[derive(Debug, Clone, Copy)]
struct LoanTerms {
    financed_amount: f64,
    monthly_rate: f64,
    term_months: u32,
    monthly_fees: f64,
}

impl LoanTerms {
    fn from_input(input: &SimulationInput) -> Result<Self, CalcError> {
        let term_months = input.term_months().ok_or(CalcError::TermOverflow {
            term_years: input.term_years,
        })?;
        if term_months == 0 {
            return Err(CalcError::DivisionByZero {
                context: "amortization over a zero-month term",
            });
        }
        Ok(Self {
            financed_amount: input.financed_amount(),
            monthly_rate: input.monthly_rate(),
            term_months,
            monthly_fees: input.monthly_fees(),
        })
    }
}

pub fn simulate(input: &SimulationInput) -> Result<SimulationOutput, SimulateError> {
    validate(input)?;
    calculate(input).map_err(SimulateError::from)
}

/// Runs both methods without re-checking field rules; callers must have validated.
pub fn calculate(input: &SimulationInput) -> Result<SimulationOutput, CalcError> {
    let terms = LoanTerms::from_input(input)?;
    debug!(
        financed_amount = terms.financed_amount,
        monthly_rate = terms.monthly_rate,
        term_months = terms.term_months,
        monthly_fees = terms.monthly_fees,
        "derived loan terms"
    );

    let sac = run_sac(terms);
    let price = run_price(terms);
    let affordability = check_affordability(input.monthly_income, &sac, &price);

    Ok(SimulationOutput {
        financed_amount: terms.financed_amount,
        monthly_rate: terms.monthly_rate,
        term_months: terms.term_months,
        monthly_fees: terms.monthly_fees,
        sac,
        price,
        affordability,
    })
}

pub fn check_affordability(
    monthly_income: f64,
    sac: &AmortizationResult,
    price: &AmortizationResult,
) -> AffordabilityCheck {
    let threshold = monthly_income * AFFORDABILITY_INCOME_SHARE;
    let comparison = sac
        .first_installment_with_fees
        .max(price.first_installment_with_fees);
    let verdict = if comparison > threshold {
        AffordabilityVerdict::Warning
    } else {
        AffordabilityVerdict::Ok
    };

    AffordabilityCheck {
        verdict,
        threshold,
        sac_first_installment_with_fees: sac.first_installment_with_fees,
        price_installment_with_fees: price.first_installment_with_fees,
    }
}

fn run_sac(terms: LoanTerms) -> AmortizationResult {
    let amortization = terms.financed_amount / terms.term_months as f64;

    let mut outstanding_balance = terms.financed_amount;
    let mut total_interest = 0.0;
    let mut total_paid_with_fees = 0.0;
    let mut first_base = 0.0;
    let mut last_base = 0.0;

    for period in 1..=terms.term_months {
        let interest = outstanding_balance * terms.monthly_rate;
        let base_installment = interest + amortization;

        total_interest += interest;
        total_paid_with_fees += base_installment + terms.monthly_fees;
        outstanding_balance -= amortization;

        if period == 1 {
            first_base = base_installment;
        }
        if period == terms.term_months {
            last_base = base_installment;
        }
    }

    AmortizationResult {
        method: AmortizationMethod::Sac,
        first_installment_base: first_base,
        last_installment_base: last_base,
        first_installment_with_fees: first_base + terms.monthly_fees,
        last_installment_with_fees: last_base + terms.monthly_fees,
        total_interest,
        total_paid_with_fees,
    }
}

fn run_price(terms: LoanTerms) -> AmortizationResult {
    let months = terms.term_months as f64;
    let base_installment = annuity_installment(terms.financed_amount, terms.monthly_rate, months);
    let with_fees = base_installment + terms.monthly_fees;

    AmortizationResult {
        method: AmortizationMethod::Price,
        first_installment_base: base_installment,
        last_installment_base: base_installment,
        first_installment_with_fees: with_fees,
        last_installment_with_fees: with_fees,
        total_interest: base_installment * months - terms.financed_amount,
        total_paid_with_fees: with_fees * months,
    }
}

fn annuity_installment(principal: f64, monthly_rate: f64, months: f64) -> f64 {
    if monthly_rate > 0.0 {
        principal * (monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-months)))
    } else {
        principal / months
    }
}
