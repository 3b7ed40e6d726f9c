use crate::models::Movie;
use crate::storage::KeyValueStore;
use crate::{Error, Result};
use tracing::{debug, warn};

/// Default settings key holding the favorites collection
pub const FAVORITES_KEY: &str = "Favorites";

/// The user's favorite movies, kept as one JSON array under a single key of a
/// [`KeyValueStore`].
///
/// Every operation reads or writes the whole collection. `add` and `remove`
/// are a load, an in-memory change and a save with nothing held in between,
/// so concurrent writers against the same key can lose updates. Callers that
/// share a store between threads have to serialize those calls themselves.
pub struct FavoritesStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    /// Keep favorites under [`FAVORITES_KEY`]
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: FAVORITES_KEY.to_string(),
        }
    }

    /// Keep favorites under a custom key
    pub fn with_key(store: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::InvalidInput("favorites key must not be empty".to_string()));
        }

        Ok(Self { store, key })
    }

    /// The settings key this collection is stored under
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Get the underlying settings store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load every favorite in insertion order.
    ///
    /// A key that was never written is an empty collection. A value that
    /// cannot be decoded is reported as [`Error::Decode`] and never replaced
    /// with an empty collection.
    pub fn load_all(&self) -> Result<Vec<Movie>> {
        let Some(bytes) = self.store.get(&self.key)? else {
            debug!("No favorites stored under {:?}", self.key);
            return Ok(Vec::new());
        };

        let favorites: Vec<Movie> = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("Stored favorites under {:?} could not be decoded: {}", self.key, e);
            Error::Decode(e)
        })?;

        debug!("Loaded {} favorites from {:?}", favorites.len(), self.key);
        Ok(favorites)
    }

    /// Replace the stored collection with `favorites`
    pub fn save_all(&self, favorites: &[Movie]) -> Result<()> {
        let bytes = serde_json::to_vec(favorites).map_err(Error::Encode)?;
        self.store.set(&self.key, &bytes)?;

        debug!("Saved {} favorites to {:?}", favorites.len(), self.key);
        Ok(())
    }

    /// Append a movie to the end of the collection. Duplicates are not checked.
    pub fn add(&self, movie: &Movie) -> Result<()> {
        let mut favorites = self.load_all()?;
        favorites.push(movie.clone());
        self.save_all(&favorites)
    }

    /// Remove every entry equal to `movie`. The collection is written back
    /// even when nothing matched.
    pub fn remove(&self, movie: &Movie) -> Result<()> {
        let mut favorites = self.load_all()?;
        let before = favorites.len();
        favorites.retain(|favorite| favorite != movie);

        debug!("Removing {} entries for movie {}", before - favorites.len(), movie.id);
        self.save_all(&favorites)
    }

    /// Check if a movie is favorited
    pub fn is_favorite(&self, movie: &Movie) -> Result<bool> {
        Ok(self.load_all()?.iter().any(|favorite| favorite == movie))
    }

    /// Drop the whole collection
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)?;
        debug!("Cleared favorites under {:?}", self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SqliteStore};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn movie(id: i64, title: &str) -> Movie {
        Movie::new(id, title.to_string(), format!("{} overview", title))
    }

    fn detailed(id: i64, title: &str) -> Movie {
        movie(id, title)
            .with_poster_path(format!("/{}.jpg", id))
            .with_vote_average(7.1)
            .with_release_date(NaiveDate::from_ymd_opt(1999, 3, 31).unwrap())
    }

    fn setup_store() -> FavoritesStore<MemoryStore> {
        FavoritesStore::new(MemoryStore::new())
    }

    #[test]
    fn test_load_empty() {
        let favorites = setup_store();
        assert!(favorites.load_all().unwrap().is_empty());
        assert_eq!(favorites.key(), FAVORITES_KEY);
    }

    #[test]
    fn test_add_appends() {
        let favorites = setup_store();
        let a = detailed(1, "A");
        let b = movie(2, "B");

        favorites.add(&a).unwrap();
        favorites.add(&b).unwrap();
        favorites.add(&a).unwrap();

        assert_eq!(favorites.load_all().unwrap(), vec![a.clone(), b, a]);
    }

    #[test]
    fn test_add_then_remove() {
        let favorites = setup_store();
        let a = movie(1, "A");
        let b = movie(2, "B");

        favorites.add(&a).unwrap();
        favorites.add(&b).unwrap();
        assert_eq!(favorites.load_all().unwrap(), vec![a.clone(), b.clone()]);

        favorites.remove(&a).unwrap();
        assert_eq!(favorites.load_all().unwrap(), vec![b]);
    }

    #[test]
    fn test_remove_drops_every_match() {
        let favorites = setup_store();
        let r = detailed(1, "R");
        let s = movie(2, "S");

        favorites.save_all(&[r.clone(), s.clone(), r.clone()]).unwrap();
        favorites.remove(&r).unwrap();

        assert_eq!(favorites.load_all().unwrap(), vec![s]);
    }

    #[test]
    fn test_remove_requires_full_equality() {
        let favorites = setup_store();
        let stored = detailed(1, "A");
        favorites.add(&stored).unwrap();

        // Same id, but poster missing
        let partial = Movie {
            poster_path: None,
            ..stored.clone()
        };
        favorites.remove(&partial).unwrap();

        assert_eq!(favorites.load_all().unwrap(), vec![stored]);
    }

    #[test]
    fn test_remove_missing_still_writes() {
        let favorites = setup_store();
        favorites.remove(&movie(9, "Z")).unwrap();

        // The empty collection was written, not left absent
        assert_eq!(favorites.store().get(FAVORITES_KEY).unwrap(), Some(b"[]".to_vec()));
        assert!(favorites.load_all().unwrap().is_empty());
    }

    #[test]
    fn test_remove_missing_keeps_contents() {
        let favorites = setup_store();
        let a = movie(1, "A");
        favorites.add(&a).unwrap();

        favorites.remove(&movie(2, "B")).unwrap();
        assert_eq!(favorites.load_all().unwrap(), vec![a]);
    }

    #[test]
    fn test_save_all_is_idempotent() {
        let favorites = setup_store();
        let collection = vec![movie(1, "A"), detailed(2, "B")];

        favorites.save_all(&collection).unwrap();
        let once = favorites.load_all().unwrap();
        favorites.save_all(&collection).unwrap();

        assert_eq!(favorites.load_all().unwrap(), once);
        assert_eq!(once, collection);
    }

    #[test]
    fn test_save_all_replaces() {
        let favorites = setup_store();
        favorites.save_all(&[movie(1, "A"), movie(2, "B")]).unwrap();
        favorites.save_all(&[movie(3, "C")]).unwrap();

        assert_eq!(favorites.load_all().unwrap(), vec![movie(3, "C")]);
    }

    #[test]
    fn test_corrupt_value_is_decode_error() {
        let favorites = setup_store();
        favorites.store().set(FAVORITES_KEY, b"{not a list").unwrap();

        assert!(matches!(favorites.load_all(), Err(Error::Decode(_))));
        assert!(matches!(favorites.add(&movie(1, "A")), Err(Error::Decode(_))));

        // The corrupt value was left untouched
        assert_eq!(
            favorites.store().get(FAVORITES_KEY).unwrap(),
            Some(b"{not a list".to_vec())
        );
    }

    #[test]
    fn test_unencodable_movie_leaves_stored_value() {
        let favorites = setup_store();
        favorites.add(&movie(1, "A")).unwrap();
        let stored = favorites.store().get(FAVORITES_KEY).unwrap();

        let broken = movie(2, "B").with_vote_average(f64::INFINITY);
        assert!(matches!(favorites.add(&broken), Err(Error::Encode(_))));
        assert!(matches!(
            favorites.save_all(&[broken]),
            Err(Error::Encode(_))
        ));

        assert_eq!(favorites.store().get(FAVORITES_KEY).unwrap(), stored);
        assert_eq!(favorites.load_all().unwrap(), vec![movie(1, "A")]);
    }

    #[test]
    fn test_schema_mismatch_is_decode_error() {
        let favorites = setup_store();
        favorites
            .store()
            .set(FAVORITES_KEY, br#"[{"id": 1, "title": "A"}]"#)
            .unwrap();

        assert!(matches!(favorites.load_all(), Err(Error::Decode(_))));
    }

    #[test]
    fn test_is_favorite() {
        let favorites = setup_store();
        let a = movie(1, "A");
        assert!(!favorites.is_favorite(&a).unwrap());

        favorites.add(&a).unwrap();
        assert!(favorites.is_favorite(&a).unwrap());
        assert!(!favorites.is_favorite(&movie(2, "B")).unwrap());
    }

    #[test]
    fn test_clear() {
        let favorites = setup_store();
        favorites.add(&movie(1, "A")).unwrap();
        favorites.clear().unwrap();

        assert!(favorites.load_all().unwrap().is_empty());
        assert!(favorites.store().is_empty());
    }

    #[test]
    fn test_custom_key() {
        let store = Arc::new(MemoryStore::new());
        let primary = FavoritesStore::new(Arc::clone(&store));
        let secondary = FavoritesStore::with_key(Arc::clone(&store), "Watchlist").unwrap();

        primary.add(&movie(1, "A")).unwrap();
        secondary.add(&movie(2, "B")).unwrap();

        assert_eq!(primary.load_all().unwrap(), vec![movie(1, "A")]);
        assert_eq!(secondary.load_all().unwrap(), vec![movie(2, "B")]);
        assert_eq!(secondary.key(), "Watchlist");
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = FavoritesStore::with_key(MemoryStore::new(), "  ");
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_borrowed_store() {
        let store = MemoryStore::new();
        FavoritesStore::new(&store).add(&movie(1, "A")).unwrap();

        assert_eq!(FavoritesStore::new(&store).load_all().unwrap(), vec![movie(1, "A")]);
    }

    #[test]
    fn test_favorites_survive_reopen() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("settings.db");
        let a = detailed(1, "A");

        {
            let favorites = FavoritesStore::new(SqliteStore::open(&db_path).unwrap());
            favorites.add(&a).unwrap();
            favorites.add(&movie(2, "B")).unwrap();
        }

        let favorites = FavoritesStore::new(SqliteStore::open(&db_path).unwrap());
        assert_eq!(favorites.load_all().unwrap(), vec![a, movie(2, "B")]);
    }
}
