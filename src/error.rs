use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn one raw row into a [`Movie`](crate::Movie).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed release date {raw:?}")]
    MalformedDate {
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("title is empty")]
    MissingTitle,
    #[error("row does not fit the movie layout: {0}")]
    Csv(#[from] csv::Error),
}

/// Failure of a whole load pass. No movies are returned alongside it.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("row {row}: {source}")]
    RowParse {
        row: usize,
        #[source]
        source: ParseError,
    },
}

impl LoadError {
    /// 1-based data row that failed, if the failure is tied to a row.
    pub fn row(&self) -> Option<usize> {
        match self {
            LoadError::RowParse { row, .. } => Some(*row),
            LoadError::Io { .. } => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("cannot aggregate an empty sequence of movies")]
    Empty,
}
