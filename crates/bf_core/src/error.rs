use thiserror::Error;

use crate::models::DiskId;

/// Errors surfaced by the rule/AI core.
///
/// Nothing here is fatal: every variant describes a local failure that the
/// caller can report and recover from.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid calibration table: {0}")]
    InvalidCalibration(String),

    #[error("Unknown disk: {0}")]
    UnknownDisk(DiskId),

    #[error("No more moves for disk {0}")]
    NoMoreMoves(DiskId),

    #[error("Disk {0} does not belong to the active team")]
    NotYourTurn(DiskId),

    #[error("No touches left for the active team")]
    NoTouchesLeft,

    #[error("World is still moving")]
    WorldNotStable,

    #[error("Invalid rule snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl CoreError {
    /// Errors caused by a user choice (pick another disk, wait a frame)
    /// rather than by bad input data.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            CoreError::NoMoreMoves(_)
                | CoreError::NotYourTurn(_)
                | CoreError::NoTouchesLeft
                | CoreError::WorldNotStable
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            CoreError::Deserialization(err.to_string())
        } else {
            CoreError::Serialization(err.to_string())
        }
    }
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::Deserialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
