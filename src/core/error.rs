use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number")]
    InvalidNumber { field: &'static str },

    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },

    #[error("{field} must be zero or greater")]
    Negative { field: &'static str },

    #[error("down payment cannot exceed the property value")]
    DownPaymentExceedsPrice,

    #[error("financed amount (property value minus down payment) must be greater than zero")]
    NonPositiveFinancedAmount,

    #[error("term in years must be at most {max_years}")]
    TermTooLong { max_years: u32 },
}

/// Every rule an input broke, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("division by zero in {context}")]
    DivisionByZero { context: &'static str },

    #[error("a {term_years}-year term has more months than the calculator can count")]
    TermOverflow { term_years: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulateError {
    #[error("invalid simulation input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Calc(#[from] CalcError),
}
