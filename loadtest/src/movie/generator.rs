//! Synthetic movie generation
//!
//! Output shape is fixed; every field value comes from the supplied random
//! source, so a seeded rng reproduces the same movie.

use chrono::{Days, Local, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;

use super::types::Movie;
use super::vocab::{
    GENRES, OVERVIEW_SLOTS, OVERVIEW_TEMPLATES, TAGLINES, TITLE_NOUNS, TITLE_PREFIXES,
    TITLE_SUFFIXES,
};

/// Oldest generated release date, in days before today
pub const MAX_RELEASE_AGE_DAYS: u64 = 3650;

pub const MAX_GENRES: usize = 3;

/// Pick one entry of a non-empty word list
pub fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Generate a movie released at most ten years before today
pub fn generate_movie<R: Rng + ?Sized>(rng: &mut R) -> Movie {
    generate_movie_at(rng, Local::now().date_naive())
}

/// Generate a movie relative to a fixed `today`
pub fn generate_movie_at<R: Rng + ?Sized>(rng: &mut R, today: NaiveDate) -> Movie {
    let title = generate_title(rng);
    let tagline = pick(rng, &TAGLINES).to_string();

    let genre_count = rng.random_range(1..=MAX_GENRES);
    let genres = GENRES
        .choose_multiple(rng, genre_count)
        .map(|g| g.to_string())
        .collect();

    let overview = generate_overview(rng);

    let days_ago = rng.random_range(0..=MAX_RELEASE_AGE_DAYS);
    let release_date = today
        .checked_sub_days(Days::new(days_ago))
        .unwrap_or(today)
        .format("%Y-%m-%d")
        .to_string();

    Movie {
        title,
        tagline,
        genres,
        overview,
        release_date,
        vote_average: round1(rng.random_range(4.0..=9.0)),
        vote_count: rng.random_range(10..=5000),
        popularity: round1(rng.random_range(10.0..=200.0)),
        runtime: rng.random_range(80..=180),
        status: "Released".to_string(),
    }
}

fn generate_title<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut title = format!(
        "{} {}",
        pick(rng, &TITLE_PREFIXES),
        pick(rng, &TITLE_NOUNS)
    );
    if rng.random_bool(0.5) {
        let suffix = pick(rng, &TITLE_SUFFIXES);
        if !suffix.is_empty() {
            title.push(' ');
            title.push_str(suffix);
        }
    }
    title
}

/// Fill one template; each placeholder draws independently from its own list
fn generate_overview<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut overview = pick(rng, &OVERVIEW_TEMPLATES).to_string();
    for (placeholder, words) in OVERVIEW_SLOTS {
        if overview.contains(placeholder) {
            overview = overview.replace(placeholder, pick(rng, words));
        }
    }
    overview
}
