use std::collections::HashMap;
use std::hash::Hash;

use crate::error::AggregateError;
use crate::movie::Movie;

/// Counts per key, iterated in the order keys were first seen.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    entries: Vec<(K, usize)>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn new() -> Self {
        Tally {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn increment(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<usize> {
        self.index.get(key).map(|&slot| self.entries[slot].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, count)| (key, *count))
    }
}

impl<K: Eq + Hash + Clone> Default for Tally<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone> FromIterator<K> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = K>>(keys: I) -> Self {
        let mut tally = Tally::new();
        keys.into_iter().for_each(|key| tally.increment(key));
        tally
    }
}

impl<K> IntoIterator for Tally<K> {
    type Item = (K, usize);
    type IntoIter = std::vec::IntoIter<(K, usize)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Movies that have a critic score above zero.
pub fn filter_rated<'a>(movies: impl IntoIterator<Item = &'a Movie>) -> Vec<&'a Movie> {
    movies
        .into_iter()
        .filter(|movie| movie.rotten_tomatoes() > 0)
        .collect()
}

/// Mean critic score. Errors instead of dividing by zero on empty input.
pub fn average_score<'a>(
    movies: impl IntoIterator<Item = &'a Movie>,
) -> Result<f64, AggregateError> {
    let (total, count) = movies
        .into_iter()
        .fold((0.0, 0usize), |(total, count), movie| {
            (total + f64::from(movie.rotten_tomatoes()), count + 1)
        });
    if count == 0 {
        return Err(AggregateError::Empty);
    }
    Ok(total / count as f64)
}

pub fn count_by_genre<'a>(movies: impl IntoIterator<Item = &'a Movie>) -> Tally<String> {
    movies
        .into_iter()
        .map(|movie| movie.genre().to_string())
        .collect()
}

/// Counts releases per English month name ("January", "February", ...).
pub fn count_by_release_month<'a>(movies: impl IntoIterator<Item = &'a Movie>) -> Tally<String> {
    movies
        .into_iter()
        .map(|movie| movie.release_date().format("%B").to_string())
        .collect()
}

/// Titles whose director matches `director` exactly, case included.
pub fn titles_by_director<'a>(
    movies: impl IntoIterator<Item = &'a Movie>,
    director: &str,
) -> Vec<&'a str> {
    movies
        .into_iter()
        .filter(|movie| movie.director() == director)
        .map(Movie::title)
        .collect()
}

/// Highest count first. Equal counts keep the tally's first-seen order.
pub fn rank_by_count_desc<K: Eq + Hash + Clone>(tally: &Tally<K>) -> Vec<(K, usize)> {
    let mut ranked: Vec<(K, usize)> = tally
        .iter()
        .map(|(key, count)| (key.clone(), count))
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

#[cfg(test)]
use chrono::NaiveDate;

#[cfg(test)]
fn movie(title: &str, date: (i32, u32, u32), director: &str, genre: &str, score: i32) -> Movie {
    let (y, m, d) = date;
    Movie::new(
        title,
        NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        director,
        genre,
        score,
    )
    .unwrap()
}

#[cfg(test)]
fn scored(scores: &[i32]) -> Vec<Movie> {
    scores
        .iter()
        .enumerate()
        .map(|(i, &score)| movie(&format!("Movie {}", i), (2000, 1, 1), "", "", score))
        .collect()
}

#[test]
fn filter_rated_drops_zero_scores() {
    let movies = scored(&[85, 0, 92, 70]);
    let rated = filter_rated(&movies);

    let scores: Vec<i32> = rated.iter().map(|m| m.rotten_tomatoes()).collect();
    assert_eq!(scores, vec![85, 92, 70]);
}

#[test]
fn average_of_rated_movies() {
    let movies = scored(&[85, 0, 92, 70]);
    let average = average_score(filter_rated(&movies)).unwrap();

    assert!((average - 247.0 / 3.0).abs() < 1e-9);
}

#[test]
fn average_counts_zero_scores_when_unfiltered() {
    let movies = scored(&[80, 0]);
    assert_eq!(average_score(&movies), Ok(40.0));
}

#[test]
fn average_of_nothing_is_an_error() {
    let movies: Vec<Movie> = Vec::new();
    assert_eq!(average_score(&movies), Err(AggregateError::Empty));
    assert_eq!(
        average_score(filter_rated(&scored(&[0, 0]))),
        Err(AggregateError::Empty)
    );
}

#[test]
fn genres_keep_first_seen_order() {
    let movies = vec![
        movie("A", (2000, 1, 1), "", "Action", 1),
        movie("B", (2000, 1, 1), "", "Action", 1),
        movie("C", (2000, 1, 1), "", "Drama", 1),
    ];

    let genres = count_by_genre(&movies);

    let entries: Vec<(&String, usize)> = genres.iter().collect();
    assert_eq!(
        entries,
        vec![(&"Action".to_string(), 2), (&"Drama".to_string(), 1)]
    );
    assert_eq!(genres.get(&"Action".to_string()), Some(2));
    assert_eq!(genres.get(&"Comedy".to_string()), None);
}

#[test]
fn genre_grouping_is_exact() {
    let movies = vec![
        movie("A", (2000, 1, 1), "", "Drama", 1),
        movie("B", (2000, 1, 1), "", "drama", 1),
        movie("C", (2000, 1, 1), "", "", 1),
    ];

    assert_eq!(count_by_genre(&movies).len(), 3);
}

#[test]
fn months_use_english_names() {
    let movies = vec![
        movie("Star Wars", (1977, 5, 25), "", "", 1),
        movie("The Matrix", (1999, 3, 31), "", "", 1),
        movie("Alien", (1979, 5, 25), "", "", 1),
    ];

    let months: Vec<(String, usize)> = count_by_release_month(&movies).into_iter().collect();
    assert_eq!(
        months,
        vec![("May".to_string(), 2), ("March".to_string(), 1)]
    );
}

#[test]
fn director_match_is_case_sensitive() {
    let movies = vec![
        movie("Star Wars", (1977, 5, 25), "George Lucas", "", 1),
        movie("Jaws", (1975, 6, 20), "Steven Spielberg", "", 1),
        movie("Imposter", (2000, 1, 1), "george lucas", "", 1),
        movie("THX 1138", (1971, 3, 11), "George Lucas", "", 1),
    ];

    assert_eq!(
        titles_by_director(&movies, "George Lucas"),
        vec!["Star Wars", "THX 1138"]
    );
    assert!(titles_by_director(&movies, "Ridley Scott").is_empty());
}

#[test]
fn ranking_keeps_tie_order() {
    let tally: Tally<&str> = vec!["Action", "Drama", "Comedy", "Drama", "Action"]
        .into_iter()
        .collect();

    assert_eq!(
        rank_by_count_desc(&tally),
        vec![("Action", 2), ("Drama", 2), ("Comedy", 1)]
    );
}

#[test]
fn ranking_puts_larger_counts_first() {
    let tally: Tally<&str> = vec!["Comedy", "Drama", "Drama"].into_iter().collect();

    assert_eq!(rank_by_count_desc(&tally), vec![("Drama", 2), ("Comedy", 1)]);
}

#[test]
fn empty_inputs_give_empty_results() {
    let movies: Vec<Movie> = Vec::new();

    assert!(filter_rated(&movies).is_empty());
    assert!(count_by_genre(&movies).is_empty());
    assert!(count_by_release_month(&movies).is_empty());
    assert!(titles_by_director(&movies, "George Lucas").is_empty());
    assert!(rank_by_count_desc(&Tally::<String>::new()).is_empty());
}
