//! Fixed word lists for queries and synthetic movies

/// Queries used by the plain, semantic and genre-filtered searches
pub const SEARCH_QUERIES: [&str; 15] = [
    "matrix",
    "inception",
    "dark knight",
    "pulp fiction",
    "shawshank",
    "christopher nolan",
    "action",
    "drama",
    "sci-fi",
    "crime",
    "redemption",
    "batman",
    "dreams",
    "reality",
    "prison",
];

/// Generic terms for the random-word search
pub const RANDOM_WORDS: [&str; 6] = ["movie", "film", "story", "adventure", "hero", "villain"];

pub const GENRES: [&str; 18] = [
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Family",
    "Fantasy",
    "History",
    "Horror",
    "Music",
    "Mystery",
    "Romance",
    "Science Fiction",
    "Thriller",
    "War",
    "Western",
];

pub const TITLE_PREFIXES: [&str; 10] = [
    "The",
    "A",
    "An",
    "Beyond",
    "Return of",
    "Rise of",
    "Fall of",
    "Last",
    "First",
    "Final",
];

pub const TITLE_NOUNS: [&str; 10] = [
    "Adventure",
    "Journey",
    "Quest",
    "Mystery",
    "Legacy",
    "Chronicles",
    "Saga",
    "Story",
    "Tale",
    "Legend",
];

/// The empty entry leaves the title unsuffixed
pub const TITLE_SUFFIXES: [&str; 10] = [
    "Begins",
    "Returns",
    "Reborn",
    "Forever",
    "Unleashed",
    "Rising",
    "Fallen",
    "United",
    "Divided",
    "",
];

pub const TAGLINES: [&str; 7] = [
    "The adventure begins",
    "Nothing is as it seems",
    "The truth will be revealed",
    "Every legend has a beginning",
    "Some stories never end",
    "Destiny awaits",
    "The journey continues",
];

pub const OVERVIEW_TEMPLATES: [&str; 5] = [
    "In a world where {conflict}, a {hero} must {action} to {goal}.",
    "When {event} threatens {place}, only {hero} can {action}.",
    "A {hero} discovers {discovery} and must {action} before {consequence}.",
    "{hero} embarks on a journey to {goal}, but {obstacle} stands in the way.",
    "After {event}, {hero} must {action} to restore {goal}.",
];

pub const CONFLICTS: [&str; 5] = [
    "chaos reigns",
    "hope is lost",
    "darkness falls",
    "time is running out",
    "the impossible becomes reality",
];

pub const HEROES: [&str; 5] = [
    "young hero",
    "retired warrior",
    "unlikely champion",
    "mysterious stranger",
    "brave adventurer",
];

pub const ACTIONS: [&str; 5] = [
    "fight against all odds",
    "uncover the truth",
    "save humanity",
    "restore balance",
    "find redemption",
];

pub const GOALS: [&str; 5] = [
    "save the world",
    "find inner peace",
    "restore justice",
    "discover the truth",
    "unite the people",
];

pub const EVENTS: [&str; 5] = [
    "a mysterious event",
    "an ancient evil awakens",
    "a prophecy comes true",
    "disaster strikes",
    "the unthinkable happens",
];

pub const PLACES: [&str; 5] = [
    "the kingdom",
    "humanity",
    "the city",
    "the universe",
    "all hope",
];

pub const DISCOVERIES: [&str; 5] = [
    "a hidden power",
    "an ancient secret",
    "the truth",
    "a conspiracy",
    "their destiny",
];

pub const OBSTACLES: [&str; 5] = [
    "an ancient evil",
    "a powerful enemy",
    "time itself",
    "their own fears",
    "an impossible choice",
];

pub const CONSEQUENCES: [&str; 5] = [
    "it's too late",
    "all is lost",
    "darkness consumes everything",
    "the world ends",
    "hope dies",
];

/// Overview placeholders and the word list each one draws from
pub const OVERVIEW_SLOTS: [(&str, &[&str]); 9] = [
    ("{conflict}", &CONFLICTS),
    ("{hero}", &HEROES),
    ("{action}", &ACTIONS),
    ("{goal}", &GOALS),
    ("{event}", &EVENTS),
    ("{place}", &PLACES),
    ("{discovery}", &DISCOVERIES),
    ("{obstacle}", &OBSTACLES),
    ("{consequence}", &CONSEQUENCES),
];
