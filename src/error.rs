use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BackendError>;

/// Everything that can go wrong in the backend, one variant per exit code.
///
/// Startup failures are fatal and terminate the process with
/// [`BackendError::exit_code`]. Once the event loop is running, input-layer
/// and store failures are logged and the loop keeps going.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("unexpected argument: {0}")]
    WrongArgument(String),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("neither XDG_DATA_HOME nor HOME is set; cannot locate a data directory")]
    DataDirUnset,

    #[error("input layer failure: {0}")]
    InputLayer(String),

    #[error("failed to assign seat {seat} to the libinput context")]
    SeatAssignment { seat: String },

    #[error("failed to create {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("user {user} is not a member of the 'input' group")]
    Permission { user: String },

    #[error("no keyboard-capable input devices found")]
    NoDevices,

    #[error("database failure: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("flush delivery failed: {0}")]
    Flush(anyhow::Error),

    #[error("system lookup failure: {0}")]
    System(String),
}

impl BackendError {
    /// Process exit code for this error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            BackendError::WrongArgument(_) => 1,
            BackendError::Config(_) | BackendError::DataDirUnset => 2,
            BackendError::InputLayer(_) => 3,
            BackendError::SeatAssignment { .. } => 4,
            BackendError::CreateDir { .. } | BackendError::Io(_) => 5,
            BackendError::Permission { .. } => 6,
            BackendError::NoDevices => 7,
            BackendError::Store(_) | BackendError::Flush(_) => 8,
            BackendError::System(_) => 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_per_kind() {
        let errors = [
            BackendError::WrongArgument("--bogus".into()),
            BackendError::DataDirUnset,
            BackendError::InputLayer("dispatch failed".into()),
            BackendError::SeatAssignment {
                seat: "seat0".into(),
            },
            BackendError::Io(std::io::Error::other("io")),
            BackendError::Permission { user: "u".into() },
            BackendError::NoDevices,
            BackendError::System("no input group".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(BackendError::exit_code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
        assert!(codes.iter().all(|c| *c != 0));
    }
}
