use thiserror::Error;

/// Returned by `set` when a candidate is not one of the allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?}, allowed values are: {}", .allowed.join(", "))]
pub struct ValidationError {
    pub value: String,
    pub allowed: Vec<String>,
}

impl ValidationError {
    pub fn new(value: &str, allowed: &[String]) -> Self {
        Self {
            value: value.to_string(),
            allowed: allowed.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("flag is absent")]
    Absent,

    #[error("allowed values cannot be empty")]
    EmptyAllowed,

    #[error("default value {default:?} is not allowed, allowed values are: {}", .allowed.join(", "))]
    DefaultNotAllowed {
        default: String,
        allowed: Vec<String>,
    },

    #[error("invalid flag name {0:?}")]
    InvalidName(String),

    #[error("flag redefined: {0}")]
    Duplicate(String),

    #[error("flag provided but not defined: -{0}")]
    Unknown(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),
}
