use super::error::{ValidationError, ValidationErrors};
use super::types::SimulationInput;

/// Longest term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 50;

#[derive(Clone, Copy)]
enum Rule {
    Positive,
    NonNegative,
}

/// Checks every field rule and reports all violations together.
pub fn validate(input: &SimulationInput) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();

    let fields = [
        ("property value", input.property_value, Rule::Positive),
        ("down payment", input.down_payment, Rule::NonNegative),
        ("monthly income", input.monthly_income, Rule::Positive),
        ("term in years", f64::from(input.term_years), Rule::Positive),
        (
            "annual interest rate",
            input.annual_interest_rate_percent,
            Rule::NonNegative,
        ),
        ("MIP insurance", input.monthly_insurance_mip, Rule::NonNegative),
        ("DFI insurance", input.monthly_insurance_dfi, Rule::NonNegative),
        ("administrative fee", input.monthly_admin_fee, Rule::NonNegative),
    ];
    for (field, value, rule) in fields {
        if !value.is_finite() {
            errors.push(ValidationError::InvalidNumber { field });
            continue;
        }
        match rule {
            Rule::Positive if value <= 0.0 => errors.push(ValidationError::NonPositive { field }),
            Rule::NonNegative if value < 0.0 => errors.push(ValidationError::Negative { field }),
            _ => {}
        }
    }

    if input.term_years > MAX_TERM_YEARS {
        errors.push(ValidationError::TermTooLong {
            max_years: MAX_TERM_YEARS,
        });
    }

    if input.property_value.is_finite() && input.down_payment.is_finite() {
        if input.down_payment > input.property_value {
            errors.push(ValidationError::DownPaymentExceedsPrice);
        }
        if input.financed_amount() <= 0.0 {
            errors.push(ValidationError::NonPositiveFinancedAmount);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> SimulationInput {
        SimulationInput {
            property_value: 300_000.0,
            down_payment: 60_000.0,
            monthly_income: 6_000.0,
            term_years: 30,
            annual_interest_rate_percent: 8.0,
            monthly_insurance_mip: 0.0,
            monthly_insurance_dfi: 0.0,
            monthly_admin_fee: 0.0,
        }
    }

    #[test]
    fn accepts_valid_input() {
        assert!(validate(&sample_input()).is_ok());
    }

    #[test]
    fn accepts_zero_interest_and_zero_down_payment() {
        let mut input = sample_input();
        input.annual_interest_rate_percent = 0.0;
        input.down_payment = 0.0;
        assert!(validate(&input).is_ok());
    }

    #[test]
    fn rejects_down_payment_equal_to_price() {
        let mut input = sample_input();
        input.down_payment = input.property_value;

        let errors = validate(&input).expect_err("financing nothing must be rejected");
        assert_eq!(
            errors.0,
            vec![ValidationError::NonPositiveFinancedAmount]
        );
    }

    #[test]
    fn rejects_down_payment_above_price() {
        let mut input = sample_input();
        input.down_payment = 350_000.0;

        let errors = validate(&input).expect_err("must reject");
        assert!(errors.contains(&ValidationError::DownPaymentExceedsPrice));
        assert!(errors.contains(&ValidationError::NonPositiveFinancedAmount));
    }

    #[test]
    fn aggregates_every_problem_instead_of_stopping_at_first() {
        let input = SimulationInput {
            property_value: 0.0,
            down_payment: -1.0,
            monthly_income: f64::NAN,
            term_years: 0,
            annual_interest_rate_percent: -2.0,
            monthly_insurance_mip: -5.0,
            monthly_insurance_dfi: 0.0,
            monthly_admin_fee: f64::INFINITY,
        };

        let errors = validate(&input).expect_err("must reject");
        assert!(errors.contains(&ValidationError::InvalidNumber {
            field: "monthly income"
        }));
        assert!(errors.contains(&ValidationError::InvalidNumber {
            field: "administrative fee"
        }));
        assert!(errors.contains(&ValidationError::NonPositive {
            field: "property value"
        }));
        assert!(errors.contains(&ValidationError::NonPositive {
            field: "term in years"
        }));
        assert!(errors.contains(&ValidationError::Negative {
            field: "down payment"
        }));
        assert!(errors.contains(&ValidationError::Negative {
            field: "annual interest rate"
        }));
        assert!(errors.contains(&ValidationError::Negative {
            field: "MIP insurance"
        }));
        assert_eq!(errors.len(), 7);
    }

    #[test]
    fn messages_are_human_readable() {
        let mut input = sample_input();
        input.monthly_income = -10.0;
        let errors = validate(&input).expect_err("must reject");
        assert_eq!(
            errors.messages(),
            vec!["monthly income must be greater than zero".to_string()]
        );
    }

    #[test]
    fn reports_errors_in_field_order() {
        let input = SimulationInput {
            property_value: -1.0,
            down_payment: -1.0,
            monthly_income: 0.0,
            term_years: 0,
            annual_interest_rate_percent: 8.0,
            monthly_insurance_mip: 0.0,
            monthly_insurance_dfi: f64::NAN,
            monthly_admin_fee: 0.0,
        };

        let errors = validate(&input).expect_err("must reject");
        assert_eq!(
            errors.0,
            vec![
                ValidationError::NonPositive {
                    field: "property value"
                },
                ValidationError::Negative {
                    field: "down payment"
                },
                ValidationError::NonPositive {
                    field: "monthly income"
                },
                ValidationError::NonPositive {
                    field: "term in years"
                },
                ValidationError::InvalidNumber {
                    field: "DFI insurance"
                },
            ]
        );
    }

    #[test]
    fn rejects_terms_beyond_the_limit() {
        let mut input = sample_input();
        input.term_years = MAX_TERM_YEARS;
        assert!(validate(&input).is_ok());

        input.term_years = 400_000_000;
        let errors = validate(&input).expect_err("must reject");
        assert_eq!(
            errors.0,
            vec![ValidationError::TermTooLong {
                max_years: MAX_TERM_YEARS
            }]
        );
        assert_eq!(
            errors.messages(),
            vec![format!("term in years must be at most {MAX_TERM_YEARS}")]
        );
    }
}
