//! Plain-text rendering of a simulation for sharing in messaging apps.
//!
//! `*text*` marks bold and `_text_` marks italics, which most chat clients
//! render natively.

mod locale;

use std::fmt;

use url::Url;

use crate::core::{AffordabilityVerdict, ProgramSelection, SimulationInput, SimulationOutput};

pub use locale::{ParseError, format_brl, format_percent, parse_brl};

const SHARE_BASE_URL: &str = "https://wa.me/";
const SHARE_PREFIX: &str = "Simulação Habitacional:\n\n";

pub fn share_summary(
    input: &SimulationInput,
    output: &SimulationOutput,
    program: Option<ProgramSelection>,
) -> String {
    ShareSummary {
        input,
        output,
        program,
    }
    .to_string()
}

pub struct ShareSummary<'a> {
    pub input: &'a SimulationInput,
    pub output: &'a SimulationOutput,
    pub program: Option<ProgramSelection>,
}

impl fmt::Display for ShareSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (input, output) = (self.input, self.output);
        let money = format_brl;

        writeln!(f, "*Resumo da Simulação Habitacional*\n")?;
        writeln!(f, "Valor do Imóvel: R$ {}", money(input.property_value))?;
        writeln!(f, "Valor da Entrada: R$ {}", money(input.down_payment))?;
        writeln!(f, "Valor Financiado: R$ {}", money(output.financed_amount))?;
        writeln!(
            f,
            "Prazo: {} anos ({} meses)",
            input.term_years, output.term_months
        )?;
        writeln!(
            f,
            "Taxa de Juros Anual: {}",
            format_percent(input.annual_interest_rate_percent, 2)
        )?;
        writeln!(
            f,
            "Taxa de Juros Mensal: {}",
            format_percent(output.monthly_rate * 100.0, 4)
        )?;
        if let Some(selection) = self.program {
            writeln!(
                f,
                "Programa habitacional: {}, {}, {}",
                selection.bracket.label(),
                selection.region.label(),
                selection.participant.label()
            )?;
        }
        for (label, fee) in [
            ("Seguro MIP Mensal", input.monthly_insurance_mip),
            ("Seguro DFI Mensal", input.monthly_insurance_dfi),
            ("Taxa Administrativa Mensal", input.monthly_admin_fee),
        ] {
            if fee > 0.0 {
                writeln!(f, "{label} (estimado): R$ {}", money(fee))?;
            }
        }

        let sac = &output.sac;
        writeln!(f, "\n*Simulação SAC*")?;
        writeln!(
            f,
            "Primeira Parcela (sem taxas): R$ {}",
            money(sac.first_installment_base)
        )?;
        writeln!(
            f,
            "Última Parcela (sem taxas): R$ {}",
            money(sac.last_installment_base)
        )?;
        writeln!(
            f,
            "*Primeira Parcela (COM taxas): R$ {}*",
            money(sac.first_installment_with_fees)
        )?;
        writeln!(
            f,
            "*Última Parcela (COM taxas): R$ {}*",
            money(sac.last_installment_with_fees)
        )?;
        writeln!(
            f,
            "Total de Juros Pagos (estimado): R$ {}",
            money(sac.total_interest)
        )?;
        writeln!(
            f,
            "Total Pago ao Final (COM taxas, estimado): R$ {}",
            money(sac.total_paid_with_fees)
        )?;
        writeln!(
            f,
            "_No sistema SAC, o valor da parcela diminui ao longo do tempo._\n"
        )?;

        let price = &output.price;
        writeln!(f, "*Simulação PRICE*")?;
        writeln!(
            f,
            "Valor da Parcela Fixa (sem taxas): R$ {}",
            money(price.first_installment_base)
        )?;
        writeln!(
            f,
            "*Valor da Parcela Fixa (COM taxas): R$ {}*",
            money(price.first_installment_with_fees)
        )?;
        writeln!(
            f,
            "Total de Juros Pagos (estimado): R$ {}",
            money(price.total_interest)
        )?;
        writeln!(
            f,
            "Total Pago ao Final (COM taxas, estimado): R$ {}",
            money(price.total_paid_with_fees)
        )?;
        writeln!(
            f,
            "_No sistema PRICE, o valor da parcela é constante (sem considerar seguros e taxas)._\n"
        )?;

        writeln!(f, "_Estes são cálculos estimados e podem variar._")?;
        write!(f, "{}", affordability_message(output))
    }
}

pub fn affordability_message(output: &SimulationOutput) -> String {
    let check = &output.affordability;
    match check.verdict {
        AffordabilityVerdict::Warning => format!(
            "Atenção: O valor estimado das parcelas (SAC: R$ {}, PRICE: R$ {}) pode ultrapassar o limite de 30% da sua renda mensal (R$ {}). Isso pode dificultar a aprovação.",
            format_brl(check.sac_first_installment_with_fees),
            format_brl(check.price_installment_with_fees),
            format_brl(check.threshold)
        ),
        AffordabilityVerdict::Ok => format!(
            "Com base na sua renda, o valor estimado das parcelas parece estar dentro do limite de 30% (R$ {}).",
            format_brl(check.threshold)
        ),
    }
}

pub fn whatsapp_link(summary: &str) -> String {
    let message = format!("{SHARE_PREFIX}{summary}");
    match Url::parse_with_params(SHARE_BASE_URL, &[("text", message.as_str())]) {
        Ok(url) => url.into(),
        Err(_) => SHARE_BASE_URL.to_string(),
    }
}
