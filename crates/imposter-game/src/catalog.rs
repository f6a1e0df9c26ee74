//! The word catalog and the pools resolved from it.
//!
//! A catalog is loaded once at startup and shared read-only. Every create
//! or start resolves a fresh [`WordPool`] from the categories the players
//! picked, then draws the secret word from that pool.

use std::collections::{BTreeMap, HashSet};

use imposter_protocol::{CategoryView, Codec, JsonCodec, ProtocolError};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::GameError;

/// Category name → candidate words.
///
/// Words are unique within a category. The same word may appear under
/// several categories, and such duplicates survive into a resolved pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl WordCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `{ "category": ["word", ...], ... }` document.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the document isn't that shape.
    pub fn from_json_str(json: &str) -> Result<Self, ProtocolError> {
        let raw: BTreeMap<String, Vec<String>> = JsonCodec.decode(json.as_bytes())?;
        let mut catalog = Self::new();
        for (name, words) in raw {
            catalog.insert(name, words);
        }
        Ok(catalog)
    }

    /// Adds words to a category, creating it if needed.
    ///
    /// Words are trimmed; blanks and repeats within the category are
    /// dropped, first occurrence wins.
    pub fn insert<W>(&mut self, name: impl Into<String>, words: impl IntoIterator<Item = W>)
    where
        W: Into<String>,
    {
        let entry = self.categories.entry(name.into()).or_default();
        let mut seen: HashSet<String> = entry.iter().cloned().collect();
        for word in words {
            let word = word.into().trim().to_string();
            if !word.is_empty() && seen.insert(word.clone()) {
                entry.push(word);
            }
        }
    }

    /// Builder-style [`WordCatalog::insert`].
    pub fn with_category<W>(
        mut self,
        name: impl Into<String>,
        words: impl IntoIterator<Item = W>,
    ) -> Self
    where
        W: Into<String>,
    {
        self.insert(name, words);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every category in name order, with its words.
    pub fn categories(&self) -> Vec<CategoryView> {
        self.categories
            .iter()
            .map(|(name, words)| CategoryView {
                name: name.clone(),
                words: words.clone(),
            })
            .collect()
    }

    /// Flattens the named categories into one pool.
    ///
    /// Categories are visited in the order given; names the catalog
    /// doesn't know contribute nothing. The result is not deduplicated
    /// across categories.
    ///
    /// # Errors
    /// [`GameError::InsufficientPool`] if fewer than `min_size` words
    /// result.
    pub fn resolve<S: AsRef<str>>(
        &self,
        names: &[S],
        min_size: usize,
    ) -> Result<WordPool, GameError> {
        let words: Vec<String> = names
            .iter()
            .filter_map(|name| self.categories.get(name.as_ref()))
            .flatten()
            .cloned()
            .collect();

        if words.len() < min_size {
            return Err(GameError::InsufficientPool {
                found: words.len(),
                required: min_size,
            });
        }
        Ok(WordPool { words })
    }
}

/// The candidate words for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Draws one word uniformly at random. `None` only for an empty pool.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
        self.words.choose(rng).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn numbered(prefix: &str, n: usize) -> Vec<String> {
        (0..n).map(|i| format!("{prefix}{i}")).collect()
    }

    fn catalog() -> WordCatalog {
        WordCatalog::new()
            .with_category("ten", numbered("t", 10))
            .with_category("twenty-five", numbered("f", 25))
            .with_category("nineteen", numbered("n", 19))
            .with_category("twenty", numbered("w", 20))
    }

    // =====================================================================
    // resolve()
    // =====================================================================

    #[test]
    fn test_resolve_flattens_ten_and_twenty_five() {
        let pool = catalog().resolve(&["ten", "twenty-five"], 30).unwrap();
        assert_eq!(pool.len(), 35);
    }

    #[test]
    fn test_resolve_twenty_nine_words_insufficient() {
        let result = catalog().resolve(&["ten", "nineteen"], 30);
        assert!(matches!(
            result,
            Err(GameError::InsufficientPool { found: 29, required: 30 })
        ));
    }

    #[test]
    fn test_resolve_exactly_thirty_words_succeeds() {
        let pool = catalog().resolve(&["ten", "twenty"], 30).unwrap();
        assert_eq!(pool.len(), 30);
    }

    #[test]
    fn test_resolve_cross_category_duplicates_kept() {
        let catalog = WordCatalog::new()
            .with_category("fruit", ["apple", "pear"])
            .with_category("tech", ["apple", "linux"]);
        let pool = catalog.resolve(&["fruit", "tech"], 1).unwrap();
        assert_eq!(pool.words(), ["apple", "pear", "apple", "linux"]);
    }

    #[test]
    fn test_resolve_unknown_category_contributes_nothing() {
        let pool = catalog().resolve(&["ten", "nope", "twenty"], 30).unwrap();
        assert_eq!(pool.len(), 30);
    }

    #[test]
    fn test_resolve_order_is_deterministic() {
        let a = catalog().resolve(&["ten", "twenty"], 0).unwrap();
        let b = catalog().resolve(&["ten", "twenty"], 0).unwrap();
        assert_eq!(a, b);
    }

    // =====================================================================
    // insert() / from_json_str()
    // =====================================================================

    #[test]
    fn test_insert_dedupes_within_category() {
        let catalog = WordCatalog::new().with_category("c", ["a", " a ", "b", "", "a"]);
        assert_eq!(catalog.categories()[0].words, vec!["a", "b"]);
    }

    #[test]
    fn test_from_json_str_loads_categories_in_name_order() {
        let catalog =
            WordCatalog::from_json_str(r#"{"zoo": ["lion"], "animals": ["otter", "otter"]}"#)
                .unwrap();
        let names: Vec<_> = catalog.categories().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["animals", "zoo"]);
        assert_eq!(catalog.categories()[0].words, vec!["otter"]);
    }

    #[test]
    fn test_from_json_str_wrong_shape_fails() {
        let result = WordCatalog::from_json_str(r#"["not", "a", "map"]"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    // =====================================================================
    // WordPool::choose()
    // =====================================================================

    #[test]
    fn test_choose_returns_pool_member() {
        let pool = catalog().resolve(&["ten"], 0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let word = pool.choose(&mut rng).unwrap();
            assert!(pool.words().iter().any(|w| w == word));
        }
    }

    #[test]
    fn test_choose_empty_pool_is_none() {
        let pool = catalog().resolve(&["missing"], 0).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        assert!(pool.choose(&mut rng).is_none());
    }
}
