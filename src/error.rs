use std::{io, path::PathBuf};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("malformed record ({fields} fields): {line}")]
    MalformedRecord { fields: usize, line: String },

    #[error("invalid board [{board}]: {reason}")]
    InvalidBoard { board: String, reason: String },

    #[error("failed to shuffle [{}]: {reason}", path.display())]
    Shuffle { path: PathBuf, reason: String },

    #[error("invalid checkpoint: {0}")]
    Checkpoint(String),

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn malformed(line: &str, fields: usize) -> Self {
        Self::MalformedRecord { fields, line: line.to_string() }
    }

    pub(crate) fn invalid_board(board: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBoard { board: board.to_string(), reason: reason.into() }
    }
}
