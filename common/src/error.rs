use thiserror::Error;

use crate::types::SensorReading;

pub type FetchOutcome = Result<SensorReading, FetchError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),
    #[error("Failed to fetch data")]
    Server { status: u16 },
    #[error("{0}")]
    Decode(String),
}

impl FetchError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(non_empty(message.into()))
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(non_empty(message.into()))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status } => Some(*status),
            _ => None,
        }
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        "Unknown error".to_string()
    } else {
        message
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("temperature {0:?} is not numeric")]
    Temperature(String),
    #[error("water level {0:?} is not numeric")]
    WaterLevel(String),
}
