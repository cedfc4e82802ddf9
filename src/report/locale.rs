use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{field} is empty")]
    Empty { field: String },

    #[error("{field} is not a valid number: {text:?}")]
    NotANumber { field: String, text: String },
}

/// Parses pt-BR formatted text such as `"R$ 300.000,50"`.
///
/// Dots are always thousands separators and the comma is the decimal mark.
pub fn parse_brl(field: &str, text: &str) -> Result<f64, ParseError> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("R$")
        .trim_end_matches('%')
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if cleaned.is_empty() {
        return Err(ParseError::Empty {
            field: field.to_string(),
        });
    }

    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ParseError::NotANumber {
            field: field.to_string(),
            text: text.to_string(),
        }),
    }
}

/// Formats a monetary amount as `1.760,95`; non-finite values render empty.
pub fn format_brl(value: f64) -> String {
    format_decimal(value, 2)
}

pub fn format_percent(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }
    format!("{}%", format_decimal(value, decimals))
}

fn format_decimal(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return String::new();
    }

    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    if let Some(frac_part) = frac_part {
        grouped.push(',');
        grouped.push_str(frac_part);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        format!("-{grouped}")
    } else {
        grouped
    }
}
