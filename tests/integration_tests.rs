use marquee::{
    average_score, count_by_genre, count_by_release_month, filter_rated, load, rank_by_count_desc,
    titles_by_director, write_counts_csv, LoadError, ParseError, Summary,
};
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

const FIXTURE: &str = "tests/fixtures/movies.csv";

#[test]
fn sanity() {
    let movies = load(FIXTURE).unwrap();

    assert_eq!(movies.len(), 8);
    assert_eq!(movies[0].title(), "Star Wars Episode IV: A New Hope");
    assert_eq!(movies[7].title(), "The Matrix");
    assert_eq!(movies[2].rotten_tomatoes(), 0);
    assert_eq!(movies[5].rotten_tomatoes(), 0);
}

#[test]
fn answers_the_questions() {
    let movies = load(FIXTURE).unwrap();

    let average = average_score(filter_rated(&movies)).unwrap();
    assert!((average - 556.0 / 6.0).abs() < 1e-9);

    assert_eq!(
        rank_by_count_desc(&count_by_genre(&movies)),
        vec![
            ("Science Fiction".to_string(), 3),
            ("Comedy".to_string(), 2),
            ("Action".to_string(), 2),
            ("Thriller".to_string(), 1),
        ]
    );
    assert_eq!(
        rank_by_count_desc(&count_by_release_month(&movies)),
        vec![
            ("May".to_string(), 2),
            ("August".to_string(), 2),
            ("March".to_string(), 2),
            ("June".to_string(), 1),
            ("July".to_string(), 1),
        ]
    );
    assert_eq!(
        titles_by_director(&movies, "George Lucas"),
        vec![
            "Star Wars Episode IV: A New Hope",
            "THX 1138",
            "American Graffiti"
        ]
    );
}

#[test]
fn summary_report() {
    let movies = load(FIXTURE).unwrap();
    let summary = Summary::from_movies(&movies, "George Lucas");
    assert_eq!(summary.rounded_average(), Some(dec!(92.6667)));

    let mut output = Vec::new();
    write_counts_csv(&summary.genres, &mut output).unwrap();
    assert_eq!(
        output,
        b"key,count\nScience Fiction,3\nComedy,2\nAction,2\nThriller,1\n"
    );
}

#[test]
fn bad_row_yields_no_movies() {
    let mut tmp = NamedTempFile::new().unwrap();
    write!(
        tmp,
        "Title,Release Date,Director,Genre,Rotten Tomatoes\n\
         Jaws,1975-06-20,Steven Spielberg,Thriller,97\n\
         Alien,not-a-date,Ridley Scott,Science Fiction,98\n"
    )
    .unwrap();

    match load(tmp.path()) {
        Err(LoadError::RowParse {
            row: 2,
            source: ParseError::MalformedDate { raw, .. },
        }) => assert_eq!(raw, "not-a-date"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn header_only_file_is_empty() {
    let mut tmp = NamedTempFile::new().unwrap();
    writeln!(tmp, "title,release date,director,genre,rotten_tomatoes").unwrap();

    let movies = load(tmp.path()).unwrap();
    assert!(movies.is_empty());
    assert!(average_score(filter_rated(&movies)).is_err());
}

#[test]
fn missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(dir.path().join("movies.csv")).unwrap_err();

    assert!(matches!(err, LoadError::Io { .. }));
}
