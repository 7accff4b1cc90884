use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RollError {
    #[error("invalid dice notation: {0:?}")]
    InvalidDiceNotation(String),
    #[error("modifiers are only allowed on dice rolls")]
    ModifiersNotAllowed,
    #[error("malformed token sequence: {0}")]
    MalformedTokenSequence(String),
    #[error("invalid json: {0}")]
    Json(String),
}

impl RollError {
    pub fn malformed(msg: impl ToString) -> Self {
        Self::MalformedTokenSequence(msg.to_string())
    }
}

impl From<serde_json::Error> for RollError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}
