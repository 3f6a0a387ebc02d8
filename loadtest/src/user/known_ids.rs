//! Per-user memory of movie identifiers seen during a session

use indexmap::IndexSet;
use rand::Rng;

/// Ordered, duplicate-free set of movie ids owned by one virtual user
///
/// Ids are appended as searches and creations discover them and removed only
/// when the API reports them gone. Removal keeps the order of the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownMovieIds {
    ids: IndexSet<String>,
}

impl KnownMovieIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id; returns false if it was already known
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Add several ids, returning how many were new
    pub fn extend<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut added = 0;
        for id in ids {
            if self.insert(id) {
                added += 1;
            }
        }
        added
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.shift_remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Uniformly random known id
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        if self.ids.is_empty() {
            return None;
        }
        let idx = rng.random_range(0..self.ids.len());
        self.ids.get_index(idx).cloned()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.ids.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_insert_deduplicates() {
        let mut ids = KnownMovieIds::new();
        assert!(ids.insert("m1"));
        assert!(ids.insert("m2"));
        assert!(!ids.insert("m1"));
        assert_eq!(ids.to_vec(), vec!["m1", "m2"]);
    }

    #[test]
    fn test_extend_counts_new_ids() {
        let mut ids = KnownMovieIds::new();
        assert_eq!(ids.extend(["m1", "m2", "m1"]), 2);
        assert_eq!(ids.extend(["m2", "m3"]), 1);
        assert_eq!(ids.to_vec(), vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut ids = KnownMovieIds::new();
        ids.extend(["m1", "m2", "m3"]);
        assert!(ids.remove("m2"));
        assert!(!ids.remove("m2"));
        assert_eq!(ids.to_vec(), vec!["m1", "m3"]);
    }

    #[test]
    fn test_choose_empty_is_none() {
        let ids = KnownMovieIds::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(ids.choose(&mut rng), None);
    }

    #[test]
    fn test_choose_covers_all_ids() {
        let mut ids = KnownMovieIds::new();
        ids.extend(["a", "b", "c"]);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..200 {
            seen.insert(ids.choose(&mut rng).unwrap());
        }
        assert_eq!(seen.len(), 3);
    }
}
