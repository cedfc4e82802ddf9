use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AffordabilityVerdict, IncomeBracket, ParticipantType, ProgramSelection, ProgramTable,
    ProgramTableError, Region, SimulateError, SimulationInput, SimulationOutput, ValidationErrors,
    simulate, validate,
};
use crate::report::{ParseError, parse_brl, share_summary, whatsapp_link};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliBracket {
    #[value(name = "1", alias = "faixa1")]
    One,
    #[value(name = "2", alias = "faixa2")]
    Two,
    #[value(name = "3", alias = "faixa3")]
    Three,
    #[value(name = "4", alias = "faixa4")]
    Four,
}

impl From<CliBracket> for IncomeBracket {
    fn from(value: CliBracket) -> Self {
        match value {
            CliBracket::One => IncomeBracket::Bracket1,
            CliBracket::Two => IncomeBracket::Bracket2,
            CliBracket::Three => IncomeBracket::Bracket3,
            CliBracket::Four => IncomeBracket::Bracket4,
        }
    }
}

impl From<IncomeBracket> for CliBracket {
    fn from(value: IncomeBracket) -> Self {
        match value {
            IncomeBracket::Bracket1 => CliBracket::One,
            IncomeBracket::Bracket2 => CliBracket::Two,
            IncomeBracket::Bracket3 => CliBracket::Three,
            IncomeBracket::Bracket4 => CliBracket::Four,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRegion {
    #[value(alias = "norte-nordeste")]
    NorthNortheast,
    #[value(alias = "outras")]
    Other,
}

impl From<CliRegion> for Region {
    fn from(value: CliRegion) -> Self {
        match value {
            CliRegion::NorthNortheast => Region::NorthNortheast,
            CliRegion::Other => Region::OtherRegions,
        }
    }
}

impl From<Region> for CliRegion {
    fn from(value: Region) -> Self {
        match value {
            Region::NorthNortheast => CliRegion::NorthNortheast,
            Region::OtherRegions => CliRegion::Other,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliParticipant {
    #[value(alias = "cotista")]
    FundHolder,
    #[value(alias = "nao-cotista")]
    NonFundHolder,
}

impl From<CliParticipant> for ParticipantType {
    fn from(value: CliParticipant) -> Self {
        match value {
            CliParticipant::FundHolder => ParticipantType::FundHolder,
            CliParticipant::NonFundHolder => ParticipantType::NonFundHolder,
        }
    }
}

impl From<ParticipantType> for CliParticipant {
    fn from(value: ParticipantType) -> Self {
        match value {
            ParticipantType::FundHolder => CliParticipant::FundHolder,
            ParticipantType::NonFundHolder => CliParticipant::NonFundHolder,
        }
    }
}

/// A JSON number or pt-BR formatted text such as `"300.000,00"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
enum NumberField {
    Number(f64),
    Text(String),
}

impl NumberField {
    fn resolve(&self, field: &str) -> Result<f64, ParseError> {
        match self {
            NumberField::Number(value) => Ok(*value),
            NumberField::Text(text) => parse_brl(field, text),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    property_value: Option<NumberField>,
    down_payment: Option<NumberField>,
    monthly_income: Option<NumberField>,
    term_years: Option<NumberField>,
    annual_interest_rate: Option<NumberField>,

    insurance_mip: Option<NumberField>,
    insurance_dfi: Option<NumberField>,
    admin_fee: Option<NumberField>,
    include_mip: Option<bool>,
    include_dfi: Option<bool>,
    include_admin_fee: Option<bool>,

    bracket: Option<IncomeBracket>,
    region: Option<Region>,
    participant: Option<ParticipantType>,
}

fn parse_money_arg(value: &str) -> Result<f64, String> {
    parse_brl("value", value).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(
    name = "mortgage-sim",
    about = "Housing finance simulator (SAC and PRICE amortization with affordability check)"
)]
struct Cli {
    #[arg(long, value_parser = parse_money_arg, help = "Property price, e.g. 300.000,00")]
    property_value: f64,
    #[arg(
        long,
        value_parser = parse_money_arg,
        help = "Down payment; defaults to the program minimum when --bracket is set"
    )]
    down_payment: Option<f64>,
    #[arg(long, value_parser = parse_money_arg)]
    monthly_income: f64,
    #[arg(long, default_value_t = 30)]
    term_years: u32,
    #[arg(
        long,
        value_parser = parse_money_arg,
        help = "Annual interest rate in percent; defaults to the program rate when --bracket is set"
    )]
    annual_interest_rate: Option<f64>,
    #[arg(long, value_parser = parse_money_arg, default_value = "0", help = "Monthly MIP insurance")]
    insurance_mip: f64,
    #[arg(long, value_parser = parse_money_arg, default_value = "0", help = "Monthly DFI insurance")]
    insurance_dfi: f64,
    #[arg(long, value_parser = parse_money_arg, default_value = "0", help = "Monthly administrative fee")]
    admin_fee: f64,
    #[arg(long, value_enum, help = "Housing program income bracket")]
    bracket: Option<CliBracket>,
    #[arg(long, value_enum, default_value_t = CliRegion::Other)]
    region: CliRegion,
    #[arg(long, value_enum, default_value_t = CliParticipant::NonFundHolder)]
    participant: CliParticipant,
    #[arg(long, help = "JSON file replacing the built-in program rate table")]
    program_table: Option<PathBuf>,
    #[arg(long, help = "Print the result as JSON instead of the text summary")]
    json: bool,
}

impl Cli {
    fn program_selection(&self) -> Option<ProgramSelection> {
        self.bracket.map(|bracket| ProgramSelection {
            bracket: bracket.into(),
            region: self.region.into(),
            participant: self.participant.into(),
        })
    }
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("could not read numeric input: {}", join_messages(.0))]
    Parse(Vec<ParseError>),

    #[error("missing required input: {}", .fields.join(", "))]
    MissingFields {
        fields: Vec<&'static str>,
        validation: ValidationErrors,
    },

    #[error("no program rate for {0:?}")]
    UnknownProgramRate(ProgramSelection),

    #[error(transparent)]
    Simulate(#[from] SimulateError),
}

impl RequestError {
    fn details(&self) -> Vec<String> {
        match self {
            RequestError::Parse(errors) => errors.iter().map(ToString::to_string).collect(),
            RequestError::MissingFields { fields, validation } => fields
                .iter()
                .map(|f| format!("{f} is required"))
                .chain(validation.messages())
                .collect(),
            RequestError::UnknownProgramRate(_) => vec![self.to_string()],
            RequestError::Simulate(SimulateError::Validation(errors)) => errors.messages(),
            RequestError::Simulate(err) => vec![err.to_string()],
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            RequestError::Simulate(SimulateError::Calc(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

fn join_messages(errors: &[ParseError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug)]
struct ApiRequest {
    input: SimulationInput,
    program: Option<ProgramSelection>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgramResponse {
    selection: ProgramSelection,
    bracket_label: &'static str,
    region_label: &'static str,
    participant_label: &'static str,
}

impl From<ProgramSelection> for ProgramResponse {
    fn from(selection: ProgramSelection) -> Self {
        Self {
            selection,
            bracket_label: selection.bracket.label(),
            region_label: selection.region.label(),
            participant_label: selection.participant.label(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    input: SimulationInput,
    program: Option<ProgramResponse>,
    result: SimulationOutput,
    summary: String,
    share_link: String,
}

#[derive(Debug, Deserialize)]
struct ProgramRateQuery {
    bracket: IncomeBracket,
    region: Region,
    participant: ParticipantType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgramRateResponse {
    annual_rate_percent: f64,
    minimum_down_payment_percent: Option<f64>,
    #[serde(flatten)]
    program: ProgramResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

#[derive(Clone)]
struct AppState {
    program_table: Arc<ProgramTable>,
}

fn build_request(cli: &Cli, table: &ProgramTable) -> Result<ApiRequest, RequestError> {
    let program = cli.program_selection();
    let mut missing = Vec::new();

    let annual_interest_rate_percent = match (cli.annual_interest_rate, program) {
        (Some(rate), _) => rate,
        (None, Some(selection)) => {
            let Some(rate) = table.annual_rate(selection) else {
                warn!(?selection, "program rate not found for selection");
                return Err(RequestError::UnknownProgramRate(selection));
            };
            rate
        }
        (None, None) => {
            missing.push("annual interest rate");
            0.0
        }
    };

    let down_payment = match (cli.down_payment, program) {
        (Some(value), _) => value,
        (None, Some(selection))
            if table
                .minimum_down_payment_percent(selection.bracket)
                .is_some() =>
        {
            // An unusable property value is reported by validation.
            table
                .minimum_down_payment(cli.property_value, selection.bracket)
                .unwrap_or(0.0)
        }
        (None, _) => {
            missing.push("down payment");
            0.0
        }
    };

    let input = SimulationInput {
        property_value: cli.property_value,
        down_payment,
        monthly_income: cli.monthly_income,
        term_years: cli.term_years,
        annual_interest_rate_percent,
        monthly_insurance_mip: cli.insurance_mip,
        monthly_insurance_dfi: cli.insurance_dfi,
        monthly_admin_fee: cli.admin_fee,
    };

    if !missing.is_empty() {
        // Missing fields hold zero, which no rule rejects, so the rest still gets checked.
        let validation = validate(&input).err().unwrap_or_default();
        return Err(RequestError::MissingFields {
            fields: missing,
            validation,
        });
    }

    Ok(ApiRequest { input, program })
}

fn run_request(request: &ApiRequest) -> Result<SimulationOutput, RequestError> {
    let output = simulate(&request.input).inspect_err(|err| {
        warn!(error = %err, "simulation rejected");
    })?;
    info!(
        financed_amount = output.financed_amount,
        term_months = output.term_months,
        within_limit = output.affordability.verdict == AffordabilityVerdict::Ok,
        "simulation completed"
    );
    Ok(output)
}

/// Parses command-line flags, runs one simulation and returns the process exit code.
pub fn run_cli() -> i32 {
    let cli = Cli::parse();
    let table = match load_program_table(cli.program_table.as_deref()) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("{e}");
            return 1;
        }
    };

    let result = build_request(&cli, &table)
        .and_then(|request| run_request(&request).map(|output| (request, output)));
    let (request, output) = match result {
        Ok(pair) => pair,
        Err(err) => {
            for detail in err.details() {
                eprintln!("error: {detail}");
            }
            return if err.status() == StatusCode::BAD_REQUEST {
                2
            } else {
                1
            };
        }
    };

    if cli.json {
        let response = build_simulate_response(&request, output);
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("failed to serialize result: {e}");
                return 1;
            }
        }
    } else {
        println!("{}", share_summary(&request.input, &output, request.program));
    }
    0
}

/// Loads the program table from `path`, or the built-in illustrative table when absent.
pub fn load_program_table(path: Option<&Path>) -> Result<ProgramTable, ProgramTableError> {
    match path {
        Some(path) => {
            let table = ProgramTable::from_path(path)?;
            info!(
                path = %path.display(),
                entries = table.entries().count(),
                "loaded program table"
            );
            Ok(table)
        }
        None => Ok(ProgramTable::illustrative()),
    }
}

pub fn build_router(program_table: ProgramTable) -> Router {
    let state = AppState {
        program_table: Arc::new(program_table),
    };
    Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .route("/api/program-rate", get(program_rate_handler))
        .route("/healthz", get(health_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(port: u16, program_table: ProgramTable) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = build_router(program_table);

    let listener = TcpListener::bind(addr).await?;
    info!("mortgage simulator HTTP API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", Vec::new())
}

async fn simulate_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<SimulatePayload>,
) -> Response {
    simulate_handler_impl(&state, payload)
}

async fn simulate_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<SimulatePayload>,
) -> Response {
    simulate_handler_impl(&state, payload)
}

fn simulate_handler_impl(state: &AppState, payload: SimulatePayload) -> Response {
    let result = api_request_from_payload(payload, &state.program_table)
        .and_then(|request| run_request(&request).map(|output| (request, output)));

    match result {
        Ok((request, output)) => {
            json_response(StatusCode::OK, build_simulate_response(&request, output))
        }
        Err(err) => {
            warn!(error = %err, "rejected simulation request");
            error_response(err.status(), "Invalid simulation input", err.details())
        }
    }
}

async fn program_rate_handler(
    State(state): State<AppState>,
    Query(query): Query<ProgramRateQuery>,
) -> Response {
    let selection = ProgramSelection {
        bracket: query.bracket,
        region: query.region,
        participant: query.participant,
    };
    match state.program_table.annual_rate(selection) {
        Some(annual_rate_percent) => json_response(
            StatusCode::OK,
            ProgramRateResponse {
                annual_rate_percent,
                minimum_down_payment_percent: state
                    .program_table
                    .minimum_down_payment_percent(selection.bracket),
                program: selection.into(),
            },
        ),
        None => {
            warn!(?selection, "program rate not found for selection");
            error_response(
                StatusCode::NOT_FOUND,
                "No program rate for the selected combination",
                Vec::new(),
            )
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str, details: Vec<String>) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            details,
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str, table: &ProgramTable) -> Result<ApiRequest, RequestError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .expect("test payload must be valid JSON");
    api_request_from_payload(payload, table)
}

fn api_request_from_payload(
    payload: SimulatePayload,
    table: &ProgramTable,
) -> Result<ApiRequest, RequestError> {
    let mut cli = default_cli_for_api();
    let mut parse_errors = Vec::new();
    let mut read = |field: &str, value: Option<NumberField>| -> Option<f64> {
        let value = value?;
        match value.resolve(field) {
            Ok(v) => Some(v),
            Err(e) => {
                parse_errors.push(e);
                None
            }
        }
    };

    let property_value = read("propertyValue", payload.property_value);
    let down_payment = read("downPayment", payload.down_payment);
    let monthly_income = read("monthlyIncome", payload.monthly_income);
    let term_years = read("termYears", payload.term_years);
    let annual_interest_rate = read("annualInterestRate", payload.annual_interest_rate);
    let insurance_mip = read("insuranceMip", payload.insurance_mip);
    let insurance_dfi = read("insuranceDfi", payload.insurance_dfi);
    let admin_fee = read("adminFee", payload.admin_fee);

    if let Some(years) = term_years {
        if years.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&years) {
            parse_errors.push(ParseError::NotANumber {
                field: "termYears".to_string(),
                text: years.to_string(),
            });
        } else {
            cli.term_years = years as u32;
        }
    }

    if !parse_errors.is_empty() {
        return Err(RequestError::Parse(parse_errors));
    }

    if let Some(v) = property_value {
        cli.property_value = v;
    }
    if let Some(v) = monthly_income {
        cli.monthly_income = v;
    }
    if let Some(v) = insurance_mip {
        cli.insurance_mip = v;
    }
    if let Some(v) = insurance_dfi {
        cli.insurance_dfi = v;
    }
    if let Some(v) = admin_fee {
        cli.admin_fee = v;
    }
    if payload.include_mip == Some(false) {
        cli.insurance_mip = 0.0;
    }
    if payload.include_dfi == Some(false) {
        cli.insurance_dfi = 0.0;
    }
    if payload.include_admin_fee == Some(false) {
        cli.admin_fee = 0.0;
    }

    if let Some(bracket) = payload.bracket {
        cli.bracket = Some(bracket.into());
        // A selected program supplies rate and down payment unless the payload overrides them.
        cli.annual_interest_rate = None;
        cli.down_payment = None;
    }
    if let Some(region) = payload.region {
        cli.region = region.into();
    }
    if let Some(participant) = payload.participant {
        cli.participant = participant.into();
    }
    if let Some(v) = annual_interest_rate {
        cli.annual_interest_rate = Some(v);
    }
    if let Some(v) = down_payment {
        cli.down_payment = Some(v);
    }

    build_request(&cli, table)
}

fn default_cli_for_api() -> Cli {
    Cli {
        property_value: 300_000.0,
        down_payment: Some(60_000.0),
        monthly_income: 6_000.0,
        term_years: 30,
        annual_interest_rate: Some(8.0),
        insurance_mip: 0.0,
        insurance_dfi: 0.0,
        admin_fee: 0.0,
        bracket: None,
        region: CliRegion::Other,
        participant: CliParticipant::NonFundHolder,
        program_table: None,
        json: false,
    }
}

fn build_simulate_response(request: &ApiRequest, output: SimulationOutput) -> SimulateResponse {
    let summary = share_summary(&request.input, &output, request.program);
    let share_link = whatsapp_link(&summary);
    SimulateResponse {
        input: request.input,
        program: request.program.map(ProgramResponse::from),
        result: output,
        summary,
        share_link,
    }
}
