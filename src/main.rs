use log::error;
use std::{env, io};

use marquee::Summary;

const DEFAULT_DIRECTOR: &str = "George Lucas";

fn program_name(args: &[String]) -> &str {
    args.first().map_or("reel", String::as_str)
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args.len() > 3 {
        error!("Usage: {} <movies.csv> [director]", program_name(&args));
        std::process::exit(1);
    }
    let file_path = std::path::Path::new(&args[1]);
    let director = args.get(2).map_or(DEFAULT_DIRECTOR, String::as_str);

    let movies = match marquee::load(file_path) {
        Ok(movies) => movies,
        Err(e) => {
            error!("could not load movies: {}", e);
            std::process::exit(1);
        }
    };

    let summary = Summary::from_movies(&movies, director);
    if let Err(e) = summary.write_text(io::stdout().lock()) {
        error!("could not write report: {}", e);
        std::process::exit(1);
    }
}

#[test]
fn program_name_falls_back_without_argv() {
    assert_eq!(program_name(&[]), "reel");
    assert_eq!(program_name(&["./reel-dev".to_string()]), "./reel-dev");
}
