use chrono::NaiveDate;
use csv::StringRecord;
use serde::Deserialize;

use crate::error::ParseError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One movie as read from the source. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    title: String,
    release_date: NaiveDate,
    director: String,
    genre: String,
    rotten_tomatoes: i32,
}

impl Movie {
    pub fn new(
        title: impl Into<String>,
        release_date: NaiveDate,
        director: impl Into<String>,
        genre: impl Into<String>,
        rotten_tomatoes: i32,
    ) -> Result<Self, ParseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ParseError::MissingTitle);
        }
        Ok(Movie {
            title,
            release_date,
            director: director.into(),
            genre: genre.into(),
            rotten_tomatoes,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn release_date(&self) -> NaiveDate {
        self.release_date
    }

    pub fn director(&self) -> &str {
        &self.director
    }

    pub fn genre(&self) -> &str {
        &self.genre
    }

    /// Critic score; 0 when the source had no usable number.
    pub fn rotten_tomatoes(&self) -> i32 {
        self.rotten_tomatoes
    }
}

/// A row as it comes out of the CSV reader, keyed by normalized header.
///
/// Every field is still text. `director`, `genre` and `rotten_tomatoes` fall
/// back to empty when the column is absent or the row is short.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct MovieRow {
    pub title: String,
    pub release_date: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub rotten_tomatoes: String,
}

impl MovieRow {
    /// Deserializes `record` using `headers`, which must already be normalized.
    pub fn from_record(record: &StringRecord, headers: &StringRecord) -> Result<Self, ParseError> {
        Ok(record.deserialize(Some(headers))?)
    }
}

impl TryFrom<MovieRow> for Movie {
    type Error = ParseError;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        let release_date = NaiveDate::parse_from_str(&row.release_date, DATE_FORMAT)
            .map_err(|source| ParseError::MalformedDate {
                raw: row.release_date.clone(),
                source,
            })?;
        Movie::new(
            row.title,
            release_date,
            row.director,
            row.genre,
            coerce_score(&row.rotten_tomatoes),
        )
    }
}

/// Truncating integer parse: leading whitespace, an optional sign, then the
/// longest run of ASCII digits. A single `_` between two digits is skipped,
/// so `"1_000"` reads as 1000. Anything without digits is 0, so `"N/A"` and
/// `""` both read as 0 while `"85%"` reads as 85.
pub fn coerce_score(raw: &str) -> i32 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s.as_bytes()[1..]),
        Some(b'+') => (false, &s.as_bytes()[1..]),
        _ => (false, s.as_bytes()),
    };
    let mut value = 0i32;
    for (i, &b) in digits.iter().enumerate() {
        let d = match b {
            b'0'..=b'9' => i32::from(b - b'0'),
            b'_' if i > 0
                && digits[i - 1].is_ascii_digit()
                && digits.get(i + 1).map_or(false, u8::is_ascii_digit) =>
            {
                continue
            }
            _ => break,
        };
        value = if negative {
            value.saturating_mul(10).saturating_sub(d)
        } else {
            value.saturating_mul(10).saturating_add(d)
        };
    }
    value
}

/// Turns a raw header cell into a lookup key: `" Release Date "` becomes
/// `release_date`. Punctuation is dropped, whitespace runs become `_`.
pub fn normalize_header(raw: &str) -> String {
    let kept: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_whitespace() || c.is_alphanumeric() || *c == '_')
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
fn row(title: &str, release_date: &str, rotten_tomatoes: &str) -> MovieRow {
    MovieRow {
        title: title.to_string(),
        release_date: release_date.to_string(),
        director: "George Lucas".to_string(),
        genre: "Science Fiction".to_string(),
        rotten_tomatoes: rotten_tomatoes.to_string(),
    }
}

#[test]
fn parses_complete_row() {
    let movie = Movie::try_from(row("Star Wars", "1977-05-25", "93")).unwrap();

    assert_eq!(movie.title(), "Star Wars");
    assert_eq!(
        movie.release_date(),
        NaiveDate::from_ymd_opt(1977, 5, 25).unwrap()
    );
    assert_eq!(movie.director(), "George Lucas");
    assert_eq!(movie.genre(), "Science Fiction");
    assert_eq!(movie.rotten_tomatoes(), 93);
}

#[test]
fn empty_score_is_zero() {
    let movie = Movie::try_from(row("Star Wars", "1977-05-25", "")).unwrap();
    assert_eq!(movie.rotten_tomatoes(), 0);
}

#[test]
fn malformed_date_keeps_raw_value() {
    let err = Movie::try_from(row("Star Wars", "not-a-date", "93")).unwrap_err();
    match err {
        ParseError::MalformedDate { raw, .. } => assert_eq!(raw, "not-a-date"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn date_parse_is_strict() {
    assert!(Movie::try_from(row("Star Wars", "25/05/1977", "93")).is_err());
    assert!(Movie::try_from(row("Star Wars", "1977-02-30", "93")).is_err());
    assert!(Movie::try_from(row("Star Wars", "", "93")).is_err());
}

#[test]
fn blank_title_is_rejected() {
    let err = Movie::try_from(row("  ", "1977-05-25", "93")).unwrap_err();
    assert!(matches!(err, ParseError::MissingTitle));
}

#[test]
fn score_coercion_truncates() {
    assert_eq!(coerce_score("85"), 85);
    assert_eq!(coerce_score(" 90"), 90);
    assert_eq!(coerce_score("85%"), 85);
    assert_eq!(coerce_score("12.7"), 12);
    assert_eq!(coerce_score("-5"), -5);
    assert_eq!(coerce_score("N/A"), 0);
    assert_eq!(coerce_score(""), 0);
    assert_eq!(coerce_score("-"), 0);
    assert_eq!(coerce_score("99999999999999"), i32::MAX);
}

#[test]
fn score_coercion_skips_digit_separators() {
    assert_eq!(coerce_score("1_000"), 1000);
    assert_eq!(coerce_score("-1_0"), -10);
    assert_eq!(coerce_score("9_5%"), 95);
    assert_eq!(coerce_score("1__0"), 1);
    assert_eq!(coerce_score("1_"), 1);
    assert_eq!(coerce_score("_1"), 0);
}

#[test]
fn headers_normalize_to_identifiers() {
    assert_eq!(normalize_header("title"), "title");
    assert_eq!(normalize_header("Release Date"), "release_date");
    assert_eq!(normalize_header("  release   date "), "release_date");
    assert_eq!(normalize_header("Rotten_Tomatoes"), "rotten_tomatoes");
    assert_eq!(normalize_header("Genre(s)?"), "genres");
    assert_eq!(normalize_header("\u{feff}title"), "title");
}

#[test]
fn row_from_record_defaults_missing_columns() {
    let headers = StringRecord::from(vec!["title", "release_date", "director"]);
    let record = StringRecord::from(vec!["THX 1138", "1971-03-11", "George Lucas"]);

    let row = MovieRow::from_record(&record, &headers).unwrap();
    assert_eq!(row.title, "THX 1138");
    assert_eq!(row.genre, "");
    assert_eq!(row.rotten_tomatoes, "");
}

#[test]
fn row_from_record_requires_release_date() {
    let headers = StringRecord::from(vec!["title", "director"]);
    let record = StringRecord::from(vec!["THX 1138", "George Lucas"]);

    let err = MovieRow::from_record(&record, &headers).unwrap_err();
    assert!(matches!(err, ParseError::Csv(_)));
}
