//! Example rates for a regional housing-assistance program.
//!
//! The figures are illustrative and never feed the calculator directly; a
//! caller looks one up and copies it into [`SimulationInput`] before
//! simulating.
//!
//! [`SimulationInput`]: super::SimulationInput

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum IncomeBracket {
    #[serde(rename = "bracket-1", alias = "bracket1", alias = "faixa1", alias = "1")]
    Bracket1,
    #[serde(rename = "bracket-2", alias = "bracket2", alias = "faixa2", alias = "2")]
    Bracket2,
    #[serde(rename = "bracket-3", alias = "bracket3", alias = "faixa3", alias = "3")]
    Bracket3,
    #[serde(rename = "bracket-4", alias = "bracket4", alias = "faixa4", alias = "4")]
    Bracket4,
}

impl IncomeBracket {
    pub const ALL: [IncomeBracket; 4] = [
        IncomeBracket::Bracket1,
        IncomeBracket::Bracket2,
        IncomeBracket::Bracket3,
        IncomeBracket::Bracket4,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IncomeBracket::Bracket1 => "Faixa 1 (Renda até R$ 2.640)",
            IncomeBracket::Bracket2 => "Faixa 2 (Renda de R$ 2.640,01 a R$ 4.400)",
            IncomeBracket::Bracket3 => "Faixa 3 (Renda de R$ 4.400,01 a R$ 8.000)",
            IncomeBracket::Bracket4 => "Faixa 4 (Renda de R$ 8.000,01 a R$ 12.000)",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    #[serde(alias = "norte-nordeste", alias = "northNortheast")]
    NorthNortheast,
    #[serde(alias = "outras", alias = "other")]
    OtherRegions,
}

impl Region {
    pub fn label(self) -> &'static str {
        match self {
            Region::NorthNortheast => "Norte e Nordeste",
            Region::OtherRegions => "Sul, Sudeste e Centro-Oeste",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParticipantType {
    #[serde(alias = "cotista")]
    FundHolder,
    #[serde(alias = "nao-cotista", alias = "nonFundHolder")]
    NonFundHolder,
}

impl ParticipantType {
    pub fn label(self) -> &'static str {
        match self {
            ParticipantType::FundHolder => "Cotista do FGTS",
            ParticipantType::NonFundHolder => "Não Cotista do FGTS",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ProgramSelection {
    pub bracket: IncomeBracket,
    pub region: Region,
    pub participant: ParticipantType,
}

#[derive(Debug, Error)]
pub enum ProgramTableError {
    #[error("failed to read program table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid program table JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("program table entry for {bracket:?}/{region:?}/{participant:?} has invalid rate {rate}")]
    InvalidRate {
        bracket: IncomeBracket,
        region: Region,
        participant: ParticipantType,
        rate: f64,
    },

    #[error("minimum down payment for {bracket:?} must be between 0 and 100 percent, got {percent}")]
    InvalidDownPaymentPercent { bracket: IncomeBracket, percent: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateEntry {
    pub bracket: IncomeBracket,
    pub region: Region,
    pub participant: ParticipantType,
    pub annual_rate_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProgramTableFile {
    rates: Vec<RateEntry>,
    #[serde(default)]
    minimum_down_payment_percent: BTreeMap<IncomeBracket, f64>,
}

/// Lookup of program rates keyed by (bracket, region, participant type).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProgramTable {
    rates: BTreeMap<(IncomeBracket, Region, ParticipantType), f64>,
    minimum_down_payment_percent: BTreeMap<IncomeBracket, f64>,
}

impl ProgramTable {
    pub fn illustrative() -> Self {
        use IncomeBracket::*;
        use ParticipantType::*;
        use Region::*;

        let rows = [
            (Bracket1, NorthNortheast, 4.00, 4.25),
            (Bracket1, OtherRegions, 4.25, 4.50),
            (Bracket2, NorthNortheast, 4.60, 4.85),
            (Bracket2, OtherRegions, 4.85, 5.10),
            (Bracket3, NorthNortheast, 7.66, 8.16),
            (Bracket3, OtherRegions, 8.16, 8.66),
            (Bracket4, NorthNortheast, 9.16, 9.16),
            (Bracket4, OtherRegions, 9.16, 9.16),
        ];

        let mut rates = BTreeMap::new();
        for (bracket, region, holder_rate, non_holder_rate) in rows {
            rates.insert((bracket, region, FundHolder), holder_rate);
            rates.insert((bracket, region, NonFundHolder), non_holder_rate);
        }

        let minimum_down_payment_percent = BTreeMap::from([
            (Bracket1, 10.0),
            (Bracket2, 15.0),
            (Bracket3, 20.0),
            (Bracket4, 25.0),
        ]);

        Self {
            rates,
            minimum_down_payment_percent,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ProgramTableError> {
        let file: ProgramTableFile = serde_json::from_str(json)?;
        let mut rates = BTreeMap::new();
        for entry in file.rates {
            if !entry.annual_rate_percent.is_finite() || entry.annual_rate_percent < 0.0 {
                return Err(ProgramTableError::InvalidRate {
                    bracket: entry.bracket,
                    region: entry.region,
                    participant: entry.participant,
                    rate: entry.annual_rate_percent,
                });
            }
            rates.insert(
                (entry.bracket, entry.region, entry.participant),
                entry.annual_rate_percent,
            );
        }
        for (&bracket, &percent) in &file.minimum_down_payment_percent {
            if !(0.0..=100.0).contains(&percent) {
                return Err(ProgramTableError::InvalidDownPaymentPercent { bracket, percent });
            }
        }
        Ok(Self {
            rates,
            minimum_down_payment_percent: file.minimum_down_payment_percent,
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ProgramTableError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ProgramTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ProgramTableError> {
        let file = ProgramTableFile {
            rates: self.entries().collect(),
            minimum_down_payment_percent: self.minimum_down_payment_percent.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn entries(&self) -> impl Iterator<Item = RateEntry> + '_ {
        self.rates
            .iter()
            .map(|(&(bracket, region, participant), &rate)| RateEntry {
                bracket,
                region,
                participant,
                annual_rate_percent: rate,
            })
    }

    pub fn annual_rate(&self, selection: ProgramSelection) -> Option<f64> {
        self.rates
            .get(&(selection.bracket, selection.region, selection.participant))
            .copied()
    }

    pub fn minimum_down_payment_percent(&self, bracket: IncomeBracket) -> Option<f64> {
        self.minimum_down_payment_percent.get(&bracket).copied()
    }

    pub fn minimum_down_payment(&self, property_value: f64, bracket: IncomeBracket) -> Option<f64> {
        if !property_value.is_finite() || property_value <= 0.0 {
            return None;
        }
        self.minimum_down_payment_percent(bracket)
            .map(|percent| property_value * (percent / 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selection(
        bracket: IncomeBracket,
        region: Region,
        participant: ParticipantType,
    ) -> ProgramSelection {
        ProgramSelection {
            bracket,
            region,
            participant,
        }
    }

    #[test]
    fn illustrative_table_covers_every_combination() {
        let table = ProgramTable::illustrative();
        assert_eq!(table.entries().count(), 16);
        for bracket in IncomeBracket::ALL {
            assert!(table.minimum_down_payment_percent(bracket).is_some());
        }
    }

    #[test]
    fn looks_up_known_rates() {
        let table = ProgramTable::illustrative();
        assert_eq!(
            table.annual_rate(selection(
                IncomeBracket::Bracket1,
                Region::NorthNortheast,
                ParticipantType::FundHolder
            )),
            Some(4.00)
        );
        assert_eq!(
            table.annual_rate(selection(
                IncomeBracket::Bracket3,
                Region::OtherRegions,
                ParticipantType::NonFundHolder
            )),
            Some(8.66)
        );
        assert_eq!(
            table.annual_rate(selection(
                IncomeBracket::Bracket4,
                Region::NorthNortheast,
                ParticipantType::NonFundHolder
            )),
            Some(9.16)
        );
    }

    #[test]
    fn minimum_down_payment_scales_with_bracket() {
        let table = ProgramTable::illustrative();
        assert_eq!(
            table.minimum_down_payment(200_000.0, IncomeBracket::Bracket1),
            Some(20_000.0)
        );
        assert_eq!(
            table.minimum_down_payment(200_000.0, IncomeBracket::Bracket4),
            Some(50_000.0)
        );
        assert_eq!(table.minimum_down_payment(0.0, IncomeBracket::Bracket2), None);
        assert_eq!(
            table.minimum_down_payment(f64::NAN, IncomeBracket::Bracket2),
            None
        );
    }

    #[test]
    fn injected_table_replaces_defaults_and_reports_missing_combinations() {
        let json = r#"{
          "rates": [
            { "bracket": "faixa2", "region": "outras", "participant": "cotista", "annualRatePercent": 5.5 }
          ],
          "minimumDownPaymentPercent": { "bracket-2": 12.5 }
        }"#;
        let table = ProgramTable::from_json_str(json).expect("table should parse");

        assert_eq!(
            table.annual_rate(selection(
                IncomeBracket::Bracket2,
                Region::OtherRegions,
                ParticipantType::FundHolder
            )),
            Some(5.5)
        );
        assert_eq!(
            table.annual_rate(selection(
                IncomeBracket::Bracket1,
                Region::OtherRegions,
                ParticipantType::FundHolder
            )),
            None
        );
        assert_eq!(
            table.minimum_down_payment_percent(IncomeBracket::Bracket2),
            Some(12.5)
        );
        assert_eq!(table.minimum_down_payment_percent(IncomeBracket::Bracket1), None);
    }

    #[test]
    fn rejects_negative_rates() {
        let json = r#"{
          "rates": [
            { "bracket": "bracket-1", "region": "north-northeast", "participant": "fund-holder", "annualRatePercent": -1 }
          ]
        }"#;
        let err = ProgramTable::from_json_str(json).expect_err("must reject");
        assert!(matches!(err, ProgramTableError::InvalidRate { .. }));
    }

    #[test]
    fn serialized_table_loads_back_identically() {
        let table = ProgramTable::illustrative();
        let json = table.to_json_string().expect("table should serialize");
        let loaded = ProgramTable::from_json_str(&json).expect("table should parse");
        assert_eq!(loaded.entries().count(), table.entries().count());
        for (loaded_entry, entry) in loaded.entries().zip(table.entries()) {
            assert_eq!(loaded_entry.bracket, entry.bracket);
            assert_eq!(loaded_entry.region, entry.region);
            assert_eq!(loaded_entry.participant, entry.participant);
            assert!((loaded_entry.annual_rate_percent - entry.annual_rate_percent).abs() < 1e-12);
        }
        for bracket in IncomeBracket::ALL {
            assert_eq!(
                loaded.minimum_down_payment_percent(bracket),
                table.minimum_down_payment_percent(bracket)
            );
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ProgramTable::from_path("/nonexistent/program-table.json")
            .expect_err("must fail");
        assert!(matches!(err, ProgramTableError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/program-table.json"));
    }

    #[test]
    fn rejects_down_payment_percent_outside_zero_to_hundred() {
        for percent in ["-5", "120.5"] {
            let json = format!(
                r#"{{ "rates": [], "minimumDownPaymentPercent": {{ "bracket-3": {percent} }} }}"#
            );
            let err = ProgramTable::from_json_str(&json).expect_err("must reject");
            assert!(matches!(
                err,
                ProgramTableError::InvalidDownPaymentPercent {
                    bracket: IncomeBracket::Bracket3,
                    ..
                }
            ));
        }
    }

    #[test]
    fn bracket_names_serialize_hyphenated_and_accept_aliases() {
        assert_eq!(
            serde_json::to_string(&IncomeBracket::Bracket1).expect("serializes"),
            r#""bracket-1""#
        );
        for name in ["bracket-4", "bracket4", "faixa4", "4"] {
            let bracket: IncomeBracket =
                serde_json::from_str(&format!("\"{name}\"")).expect("known bracket name");
            assert_eq!(bracket, IncomeBracket::Bracket4);
        }

        let json = ProgramTable::illustrative()
            .to_json_string()
            .expect("table should serialize");
        assert!(json.contains(r#""bracket": "bracket-2""#));
        assert!(json.contains(r#""region": "north-northeast""#));
        assert!(json.contains(r#""participant": "non-fund-holder""#));
    }
}
