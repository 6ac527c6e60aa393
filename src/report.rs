use csv::WriterBuilder;
use log::warn;
use rust_decimal::prelude::*;
use serde::Serialize;
use std::io;

use crate::movie::Movie;
use crate::pipeline::{
    average_score, count_by_genre, count_by_release_month, filter_rated, rank_by_count_desc,
    titles_by_director,
};

/// The answers the reel binary prints for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Mean score over rated movies; `None` when nothing is rated.
    pub average: Option<f64>,
    pub genres: Vec<(String, usize)>,
    pub months: Vec<(String, usize)>,
    pub director: String,
    pub titles: Vec<String>,
}

impl Summary {
    pub fn from_movies(movies: &[Movie], director: &str) -> Self {
        let average = match average_score(filter_rated(movies)) {
            Ok(average) => Some(average),
            Err(e) => {
                warn!("leaving the average out of the summary: {}", e);
                None
            }
        };
        Summary {
            average,
            genres: rank_by_count_desc(&count_by_genre(movies)),
            months: rank_by_count_desc(&count_by_release_month(movies)),
            director: director.to_string(),
            titles: titles_by_director(movies, director)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn rounded_average(&self) -> Option<Decimal> {
        self.average
            .and_then(Decimal::from_f64)
            .map(|average| average.round_dp(4))
    }

    pub fn write_text<T: io::Write>(&self, mut target: T) -> io::Result<()> {
        match self.rounded_average() {
            Some(average) => writeln!(target, "Average Rotten Tomatoes Score: {}", average)?,
            None => writeln!(target, "Average Rotten Tomatoes Score: n/a")?,
        }

        writeln!(target, "\nMovies by genre:")?;
        write_counts_text(&self.genres, &mut target)?;

        writeln!(target, "\nReleases by month:")?;
        write_counts_text(&self.months, &mut target)?;

        writeln!(target, "\nDirected by {}:", self.director)?;
        for title in &self.titles {
            writeln!(target, "{}", title)?;
        }
        target.flush()
    }
}

fn write_counts_text<T: io::Write>(counts: &[(String, usize)], target: &mut T) -> io::Result<()> {
    for (key, count) in counts {
        writeln!(target, "{}: {}", key, count)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct CountRow<'a, K> {
    key: &'a K,
    count: usize,
}

/// Writes `(key, count)` pairs as CSV with a `key,count` header.
pub fn write_counts_csv<K: Serialize, T: io::Write>(
    counts: &[(K, usize)],
    target: T,
) -> Result<(), csv::Error> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(target);
    writer.write_record(["key", "count"])?;
    for (key, count) in counts {
        writer.serialize(CountRow { key, count: *count })?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
use chrono::NaiveDate;
#[cfg(test)]
use rust_decimal_macros::dec;

#[cfg(test)]
fn sample() -> Vec<Movie> {
    let movie = |title: &str, date: &str, director: &str, genre: &str, score: i32| {
        Movie::new(
            title,
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            director,
            genre,
            score,
        )
        .unwrap()
    };
    vec![
        movie("Star Wars", "1977-05-25", "George Lucas", "Science Fiction", 85),
        movie("Howard the Duck", "1986-08-01", "Willard Huyck", "Comedy", 0),
        movie("Alien", "1979-05-25", "Ridley Scott", "Science Fiction", 92),
        movie("THX 1138", "1971-03-11", "George Lucas", "Drama", 70),
    ]
}

#[test]
fn summary_answers_every_question() {
    let summary = Summary::from_movies(&sample(), "George Lucas");

    assert_eq!(summary.rounded_average(), Some(dec!(82.3333)));
    assert_eq!(
        summary.genres,
        vec![
            ("Science Fiction".to_string(), 2),
            ("Comedy".to_string(), 1),
            ("Drama".to_string(), 1),
        ]
    );
    assert_eq!(summary.months[0], ("May".to_string(), 2));
    assert_eq!(summary.titles, vec!["Star Wars", "THX 1138"]);
}

#[test]
fn summary_without_rated_movies_has_no_average() {
    let summary = Summary::from_movies(&[], "George Lucas");

    assert_eq!(summary.average, None);
    assert_eq!(summary.rounded_average(), None);
    assert!(summary.genres.is_empty());
}

#[test]
fn text_report_layout() {
    let summary = Summary::from_movies(&sample(), "George Lucas");

    let mut output = Vec::new();
    summary.write_text(&mut output).unwrap();
    let text = String::from_utf8(output).unwrap();

    assert!(text.starts_with("Average Rotten Tomatoes Score: 82.3333\n"));
    assert!(text.contains("\nMovies by genre:\nScience Fiction: 2\nComedy: 1\nDrama: 1\n"));
    assert!(text.contains("\nReleases by month:\nMay: 2\nAugust: 1\nMarch: 1\n"));
    assert!(text.ends_with("\nDirected by George Lucas:\nStar Wars\nTHX 1138\n"));
}

#[test]
fn text_report_marks_missing_average() {
    let mut output = Vec::new();
    Summary::from_movies(&[], "George Lucas")
        .write_text(&mut output)
        .unwrap();

    let text = String::from_utf8(output).unwrap();
    assert!(text.starts_with("Average Rotten Tomatoes Score: n/a\n"));
}

#[test]
fn counts_as_csv() {
    let counts = vec![("May".to_string(), 2), ("March".to_string(), 1)];

    let mut output = Vec::new();
    write_counts_csv(&counts, &mut output).unwrap();

    assert_eq!(output, b"key,count\nMay,2\nMarch,1\n");
}

#[test]
fn empty_counts_still_get_a_header() {
    let counts: Vec<(String, usize)> = Vec::new();

    let mut output = Vec::new();
    write_counts_csv(&counts, &mut output).unwrap();

    assert_eq!(output, b"key,count\n");
}
