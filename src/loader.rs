use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::LoadError;
use crate::movie::{normalize_header, Movie, MovieRow};

const READER_SOURCE: &str = "<reader>";

/// Reads a CSV source into movies, all or nothing.
#[derive(Debug, Clone)]
pub struct Loader {
    delimiter: u8,
}

impl Default for Loader {
    fn default() -> Self {
        Loader { delimiter: b',' }
    }
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Loads every movie in the file at `path`, in file order.
    ///
    /// The file handle is owned by the CSV reader and dropped when this
    /// returns, whichever way it returns.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Vec<Movie>, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let movies = self.read(file, path)?;
        info!("loaded {} movies from {}", movies.len(), path.display());
        Ok(movies)
    }

    pub fn load_from_reader<R: io::Read>(&self, source: R) -> Result<Vec<Movie>, LoadError> {
        self.read(source, Path::new(READER_SOURCE))
    }

    fn read<R: io::Read>(&self, source: R, path: &Path) -> Result<Vec<Movie>, LoadError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source);

        // A broken header is reported as row 0.
        let headers: StringRecord = reader
            .headers()
            .map_err(|err| classify(err, path, 0))?
            .iter()
            .map(normalize_header)
            .collect();

        let mut movies = Vec::new();
        let mut record = StringRecord::new();
        // Counts only rows that reach the parser. Empty lines never come out
        // of the reader, so all-empty records are left out as well.
        let mut row = 0;
        while reader
            .read_record(&mut record)
            .map_err(|err| classify(err, path, row + 1))?
        {
            if is_blank(&record) {
                debug!("skipping blank record after row {}", row);
                continue;
            }
            row += 1;
            let movie = MovieRow::from_record(&record, &headers)
                .and_then(Movie::try_from)
                .map_err(|source| LoadError::RowParse { row, source })?;
            movies.push(movie);
        }
        Ok(movies)
    }
}

/// Loads the file at `path` with default reader options.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<Movie>, LoadError> {
    Loader::default().load(path)
}

pub fn load_from_reader<R: io::Read>(source: R) -> Result<Vec<Movie>, LoadError> {
    Loader::default().load_from_reader(source)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

fn classify(err: csv::Error, path: &Path, row: usize) -> LoadError {
    if err.is_io_error() {
        LoadError::Io {
            path: path.to_path_buf(),
            source: err.into(),
        }
    } else {
        LoadError::RowParse {
            row,
            source: err.into(),
        }
    }
}

#[cfg(test)]
use crate::error::ParseError;

#[cfg(test)]
struct FailingReader {
    served: bool,
}

#[cfg(test)]
impl io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.served {
            return Err(io::Error::new(io::ErrorKind::Other, "disk went away"));
        }
        self.served = true;
        let data = b"title,release_date,director,genre,rotten_tomatoes\n";
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}

#[cfg(test)]
const HEADER: &str = "title,release date,director,genre,rotten_tomatoes\n";

#[test]
fn keeps_source_order() {
    let data = format!(
        "{}{}{}{}",
        HEADER,
        "Star Wars,1977-05-25,George Lucas,Science Fiction,93\n",
        "The Matrix,1999-03-31,Wachowskis,Action,88\n",
        "Jaws,1975-06-20,Steven Spielberg,Thriller,97\n",
    );

    let movies = load_from_reader(data.as_bytes()).unwrap();

    let titles: Vec<&str> = movies.iter().map(Movie::title).collect();
    assert_eq!(titles, vec!["Star Wars", "The Matrix", "Jaws"]);
}

#[test]
fn header_case_and_spacing_do_not_matter() {
    let data = "Title, Release Date ,DIRECTOR,Genre,Rotten Tomatoes\n\
                Jaws,1975-06-20,Steven Spielberg,Thriller,97\n";

    let movies = load_from_reader(data.as_bytes()).unwrap();

    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].director(), "Steven Spielberg");
    assert_eq!(movies[0].rotten_tomatoes(), 97);
}

#[test]
fn blank_rows_are_skipped() {
    let data = format!(
        "{}{}{}{}{}",
        HEADER,
        "Star Wars,1977-05-25,George Lucas,Science Fiction,93\n",
        "\n",
        ",,,,\n",
        "Jaws,1975-06-20,Steven Spielberg,Thriller,97\n",
    );

    let movies = load_from_reader(data.as_bytes()).unwrap();
    assert_eq!(movies.len(), 2);
}

#[test]
fn header_only_is_empty() {
    let movies = load_from_reader(HEADER.as_bytes()).unwrap();
    assert!(movies.is_empty());
}

#[test]
fn empty_source_is_empty() {
    let movies = load_from_reader("".as_bytes()).unwrap();
    assert!(movies.is_empty());
}

#[test]
fn malformed_date_aborts_with_row_index() {
    let data = format!(
        "{}{}{}",
        HEADER,
        "Star Wars,1977-05-25,George Lucas,Science Fiction,93\n",
        "Jaws,not-a-date,Steven Spielberg,Thriller,97\n",
    );

    let err = load_from_reader(data.as_bytes()).unwrap_err();
    assert_eq!(err.row(), Some(2));
    match err {
        LoadError::RowParse {
            source: ParseError::MalformedDate { raw, .. },
            ..
        } => assert_eq!(raw, "not-a-date"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn blank_rows_do_not_shift_row_index() {
    for blank in ["\n", ",,,,\n", " , ,,,\n"] {
        let data = format!(
            "{}{}{}{}",
            HEADER,
            "Jaws,1975-06-20,Steven Spielberg,Thriller,97\n",
            blank,
            "Alien,not-a-date,Ridley Scott,Science Fiction,98\n",
        );

        let err = load_from_reader(data.as_bytes()).unwrap_err();
        assert_eq!(err.row(), Some(2), "blank row {:?}", blank);
    }
}

#[test]
fn quoted_fields_keep_commas() {
    let data = format!(
        "{}{}",
        HEADER, "\"Crouching Tiger, Hidden Dragon\",2000-07-06,Ang Lee,Action,97\n",
    );

    let movies = load_from_reader(data.as_bytes()).unwrap();
    assert_eq!(movies[0].title(), "Crouching Tiger, Hidden Dragon");
}

#[test]
fn short_rows_default_trailing_fields() {
    let data = format!("{}{}", HEADER, "THX 1138,1971-03-11,George Lucas\n");

    let movies = load_from_reader(data.as_bytes()).unwrap();
    assert_eq!(movies[0].genre(), "");
    assert_eq!(movies[0].rotten_tomatoes(), 0);
}

#[test]
fn custom_delimiter() {
    let data = "title;release_date;director;genre;rotten_tomatoes\n\
                Jaws;1975-06-20;Steven Spielberg;Thriller;97\n";

    let movies = Loader::new()
        .delimiter(b';')
        .load_from_reader(data.as_bytes())
        .unwrap();
    assert_eq!(movies[0].title(), "Jaws");
}

#[test]
fn missing_file_is_io_failure() {
    let err = load("/definitely/not/here/movies.csv").unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
    assert_eq!(err.row(), None);
}

#[test]
fn read_failure_after_header_is_io_failure() {
    let err = load_from_reader(FailingReader { served: false }).unwrap_err();

    match err {
        LoadError::Io { path, source } => {
            assert_eq!(path, Path::new(READER_SOURCE));
            assert!(source.to_string().contains("disk went away"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
