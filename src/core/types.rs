use serde::{Deserialize, Serialize};

/// Validated numeric inputs for a single financing simulation.
///
/// Fee fields are monthly amounts; callers pass zero for any fee the user
/// switched off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub property_value: f64,
    pub down_payment: f64,
    pub monthly_income: f64,
    pub term_years: u32,
    pub annual_interest_rate_percent: f64,
    #[serde(default)]
    pub monthly_insurance_mip: f64,
    #[serde(default)]
    pub monthly_insurance_dfi: f64,
    #[serde(default)]
    pub monthly_admin_fee: f64,
}

impl SimulationInput {
    pub fn financed_amount(&self) -> f64 {
        self.property_value - self.down_payment
    }

    pub fn monthly_rate(&self) -> f64 {
        (self.annual_interest_rate_percent / 100.0) / 12.0
    }

    /// `None` when the month count does not fit in a `u32`.
    pub fn term_months(&self) -> Option<u32> {
        self.term_years.checked_mul(12)
    }

    pub fn monthly_fees(&self) -> f64 {
        self.monthly_insurance_mip + self.monthly_insurance_dfi + self.monthly_admin_fee
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmortizationMethod {
    Sac,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationResult {
    pub method: AmortizationMethod,
    pub first_installment_base: f64,
    pub last_installment_base: f64,
    pub first_installment_with_fees: f64,
    pub last_installment_with_fees: f64,
    pub total_interest: f64,
    pub total_paid_with_fees: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AffordabilityVerdict {
    Ok,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityCheck {
    pub verdict: AffordabilityVerdict,
    pub threshold: f64,
    pub sac_first_installment_with_fees: f64,
    pub price_installment_with_fees: f64,
}

impl AffordabilityCheck {
    pub fn comparison_value(&self) -> f64 {
        self.sac_first_installment_with_fees
            .max(self.price_installment_with_fees)
    }

    pub fn is_within_limit(&self) -> bool {
        self.verdict == AffordabilityVerdict::Ok
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutput {
    pub financed_amount: f64,
    pub monthly_rate: f64,
    pub term_months: u32,
    pub monthly_fees: f64,
    pub sac: AmortizationResult,
    pub price: AmortizationResult,
    pub affordability: AffordabilityCheck,
}
