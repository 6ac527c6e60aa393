//! Load a CSV file of movies into typed records and answer a few questions
//! about them: average critic score, counts by genre and release month, and
//! the titles a given director made.

mod error;
mod loader;
mod movie;
mod pipeline;
mod report;

pub use crate::error::{AggregateError, LoadError, ParseError};
pub use crate::loader::{load, load_from_reader, Loader};
pub use crate::movie::{coerce_score, normalize_header, Movie, MovieRow};
pub use crate::pipeline::{
    average_score, count_by_genre, count_by_release_month, filter_rated, rank_by_count_desc,
    titles_by_director, Tally,
};
pub use crate::report::{write_counts_csv, Summary};
