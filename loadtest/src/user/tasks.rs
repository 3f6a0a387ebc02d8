//! Weighted task registry
//!
//! The registry is a static table of (task, weight) pairs resolved once at
//! startup. Each scheduling tick draws one task with probability
//! `weight / total_weight`.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use thiserror::Error;

/// Errors raised while building a task registry
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaskSetError {
    #[error("Task registry is empty")]
    Empty,

    #[error("Task {0} has zero weight")]
    ZeroWeight(&'static str),

    #[error("Invalid task weights: {0}")]
    InvalidWeights(String),
}

/// Behaviors a virtual user can perform against the movie API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {
    SearchMovies,
    SemanticSearch,
    SearchRandomWord,
    SearchWithGenreFilter,
    GetGenres,
    GetMovieDetails,
    GetSimilarMovies,
    CreateMovie,
}

impl Task {
    pub const ALL: [Task; 8] = [
        Task::SearchMovies,
        Task::SemanticSearch,
        Task::SearchRandomWord,
        Task::SearchWithGenreFilter,
        Task::GetGenres,
        Task::GetMovieDetails,
        Task::GetSimilarMovies,
        Task::CreateMovie,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Task::SearchMovies => "search_movies",
            Task::SemanticSearch => "semantic_search",
            Task::SearchRandomWord => "search_random_word",
            Task::SearchWithGenreFilter => "search_with_genre_filter",
            Task::GetGenres => "get_genres",
            Task::GetMovieDetails => "get_movie_details",
            Task::GetSimilarMovies => "get_similar_movies",
            Task::CreateMovie => "create_movie",
        }
    }

    /// Relative frequency in the standard movie search mix
    pub fn default_weight(&self) -> u32 {
        match self {
            Task::SearchMovies => 9,
            Task::SemanticSearch => 3,
            Task::SearchRandomWord => 2,
            Task::SearchWithGenreFilter => 2,
            Task::GetGenres => 2,
            Task::GetMovieDetails => 3,
            Task::GetSimilarMovies => 2,
            Task::CreateMovie => 1,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable (task, weight) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskDescriptor {
    pub task: Task,
    pub weight: u32,
}

/// Builder for a [`TaskSet`]
#[derive(Debug, Default)]
pub struct TaskSetBuilder {
    descriptors: Vec<TaskDescriptor>,
}

impl TaskSetBuilder {
    pub fn task(mut self, task: Task, weight: u32) -> Self {
        self.descriptors.push(TaskDescriptor { task, weight });
        self
    }

    pub fn build(self) -> Result<TaskSet, TaskSetError> {
        if self.descriptors.is_empty() {
            return Err(TaskSetError::Empty);
        }
        if let Some(d) = self.descriptors.iter().find(|d| d.weight == 0) {
            return Err(TaskSetError::ZeroWeight(d.task.name()));
        }

        let index = WeightedIndex::new(self.descriptors.iter().map(|d| d.weight))
            .map_err(|e| TaskSetError::InvalidWeights(e.to_string()))?;

        Ok(TaskSet {
            descriptors: self.descriptors,
            index,
        })
    }
}

/// Fixed registry of weighted tasks
#[derive(Debug, Clone)]
pub struct TaskSet {
    descriptors: Vec<TaskDescriptor>,
    index: WeightedIndex<u32>,
}

impl TaskSet {
    pub fn builder() -> TaskSetBuilder {
        TaskSetBuilder::default()
    }

    /// The standard movie search mix, every task at its default weight
    pub fn movie_search() -> Result<Self, TaskSetError> {
        Task::ALL
            .iter()
            .fold(Self::builder(), |builder, task| {
                builder.task(*task, task.default_weight())
            })
            .build()
    }

    /// Draw one task proportionally to its weight
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Task {
        self.descriptors[self.index.sample(rng)].task
    }

    pub fn descriptors(&self) -> &[TaskDescriptor] {
        &self.descriptors
    }

    pub fn total_weight(&self) -> u32 {
        self.descriptors.iter().map(|d| d.weight).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashMap;

    fn draw(set: &TaskSet, rng: &mut ChaCha8Rng, n: usize) -> HashMap<Task, usize> {
        let mut counts = HashMap::new();
        for _ in 0..n {
            *counts.entry(set.select(rng)).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_default_weights() {
        let set = TaskSet::movie_search().unwrap();
        assert_eq!(set.descriptors().len(), 8);
        assert_eq!(set.total_weight(), 24);
        let search = set
            .descriptors()
            .iter()
            .find(|d| d.task == Task::SearchMovies)
            .unwrap();
        assert_eq!(search.weight, 9);
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert_eq!(TaskSet::builder().build().unwrap_err(), TaskSetError::Empty);
    }

    #[test]
    fn test_zero_weight_rejected() {
        let err = TaskSet::builder()
            .task(Task::SearchMovies, 1)
            .task(Task::CreateMovie, 0)
            .build()
            .unwrap_err();
        assert_eq!(err, TaskSetError::ZeroWeight("create_movie"));
    }

    #[test]
    fn test_single_task_always_selected() {
        let set = TaskSet::builder().task(Task::GetGenres, 5).build().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..100 {
            assert_eq!(set.select(&mut rng), Task::GetGenres);
        }
    }

    #[test]
    fn test_nine_to_one_ratio() {
        let set = TaskSet::builder()
            .task(Task::SearchMovies, 9)
            .task(Task::CreateMovie, 1)
            .build()
            .unwrap();

        // 10,000 draws from each of ten seeded users
        let mut a = 0;
        let mut b = 0;
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let counts = draw(&set, &mut rng, 10_000);
            a += counts.get(&Task::SearchMovies).copied().unwrap_or(0);
            b += counts.get(&Task::CreateMovie).copied().unwrap_or(0);
        }

        let ratio = a as f64 / b as f64;
        assert!((ratio - 9.0).abs() <= 9.0 * 0.05, "ratio was {}", ratio);
    }

    #[test]
    fn test_default_mix_chi_squared() {
        let set = TaskSet::movie_search().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let n = 120_000;
        let counts = draw(&set, &mut rng, n);

        let total = set.total_weight() as f64;
        let chi2: f64 = set
            .descriptors()
            .iter()
            .map(|d| {
                let expected = n as f64 * d.weight as f64 / total;
                let observed = counts.get(&d.task).copied().unwrap_or(0) as f64;
                (observed - expected).powi(2) / expected
            })
            .sum();

        // 7 degrees of freedom, p = 0.001
        assert!(chi2 < 24.32, "chi-squared statistic was {}", chi2);
    }
}
