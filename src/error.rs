/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/***************************************/
/*            Error types              */
/***************************************/
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("think time range {min}..={max} ms is empty")]
    InvalidThinkTime { min: u64, max: u64 },
}

// Only produced while waiting for admission. An admitted request always completes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    #[error("request cancelled before admission")]
    Cancelled,

    #[error("request not admitted within {0:?}")]
    TimedOut(Duration),
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("failed to spawn thread {name}: {source}")]
    Spawn { name: String, source: io::Error },
}
