mod engine;
mod error;
mod program;
mod types;
mod validate;

pub use engine::{AFFORDABILITY_INCOME_SHARE, calculate, check_affordability, simulate};
pub use error::{CalcError, SimulateError, ValidationError, ValidationErrors};
pub use program::{
    IncomeBracket, ParticipantType, ProgramSelection, ProgramTable, ProgramTableError, RateEntry,
    Region,
};
pub use types::{
    AffordabilityCheck, AffordabilityVerdict, AmortizationMethod, AmortizationResult,
    SimulationInput, SimulationOutput,
};
pub use validate::{MAX_TERM_YEARS, validate};
