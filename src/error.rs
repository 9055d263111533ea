//! Error types with fix suggestions

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Every failure a run can surface. Handler errors travel through the
/// executor untouched, so the variant seen by the caller is the one the
/// handler produced.
#[derive(Error, Debug)]
pub enum EpmError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Configuration (EPM-010 to EPM-011)
    // ─────────────────────────────────────────────────────────────

    #[error("EPM-010: Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("EPM-011: Could not read '{path}': {reason}")]
    FileRead { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Job parameters (EPM-020 to EPM-023)
    // ─────────────────────────────────────────────────────────────

    #[error("EPM-020: {kind} job is missing required field '{field}'")]
    MissingField { kind: &'static str, field: &'static str },

    #[error("EPM-021: Field '{field}' is not a valid number: '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("EPM-022: No account to sign with")]
    NoAccount,

    #[error("EPM-023: Unknown permission action '{action}'")]
    UnknownPermissionAction { action: String },

    // ─────────────────────────────────────────────────────────────
    // Backend (EPM-030 to EPM-033)
    // ─────────────────────────────────────────────────────────────

    #[error("EPM-030: Request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("EPM-031: RPC '{method}' failed ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("EPM-032: Deployment of '{contract}' returned no contract address")]
    NoContractAddress { contract: String },

    #[error("EPM-033: Field '{field}' not found in query result")]
    FieldNotFound { field: String },

    // ─────────────────────────────────────────────────────────────
    // Assertions (EPM-040 to EPM-042)
    // ─────────────────────────────────────────────────────────────

    #[error("EPM-040: Assertion failed: '{key}' {relation} '{expected}'")]
    AssertionFailed {
        key: String,
        relation: String,
        expected: String,
    },

    #[error("EPM-041: Unknown assert relation '{relation}'")]
    UnknownRelation { relation: String },

    #[error("EPM-042: Relation '{relation}' needs numbers, got '{key}' and '{expected}'")]
    NotComparable {
        key: String,
        relation: String,
        expected: String,
    },
}

impl FixSuggestion for EpmError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            EpmError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            EpmError::Json(_) => Some("Check the JSON file or backend response is well formed"),
            EpmError::Csv(_) => Some("Check the output directory is writable"),
            EpmError::Io(_) => Some("Check file path and permissions"),
            EpmError::InvalidEndpoint { .. } => Some("Use host:port or a full http:// URL"),
            EpmError::FileRead { .. } => Some("Check --file, --contracts-path and job file paths"),
            EpmError::MissingField { .. } => Some("Add the field to the job in epm.yaml"),
            EpmError::InvalidNumber { .. } => Some("Amounts, fees, gas, nonces and heights are integers"),
            EpmError::NoAccount => {
                Some("Pass --address, add an account job, or set source: on the job")
            }
            EpmError::UnknownPermissionAction { .. } => {
                Some("Use set_base, unset_base, set_global, add_role or rm_role")
            }
            EpmError::Transport { .. } => Some("Check --chain, --sign and --compiler are reachable"),
            EpmError::Rpc { .. } => Some("Inspect the backend logs for the failing method"),
            EpmError::NoContractAddress { .. } => Some("Check the contract compiles to deployable code"),
            EpmError::FieldNotFound { .. } => Some("Use a dotted path such as balance or permissions.base"),
            EpmError::AssertionFailed { .. } => None,
            EpmError::UnknownRelation { .. } => Some("Use eq, ne, gt, ge, lt or le"),
            EpmError::NotComparable { .. } => Some("Only eq and ne work on non-numeric values"),
        }
    }
}
