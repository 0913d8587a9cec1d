use super::Level;
use crate::types::FileHashIndex;
use std::fmt;

/// A deterministic cache key for one `(level, scope, text, model)` tuple.
///
/// The text itself is hashed with MD5 rather than embedded verbatim, so
/// arbitrarily long source chunks don't blow out key length limits on the
/// underlying store.
#[derive(Debug, Clone)]
pub struct CacheKey {
    level_prefix: &'static str,
    scope: String,
    hash: String,
}

impl CacheKey {
    #[must_use]
    pub fn embedding(level: Level, scope: &str, text: &str, model: &str) -> Self {
        let hash = FileHashIndex::compute_hash(format!("{model}:{text}").as_bytes());
        Self {
            level_prefix: level.prefix(),
            scope: scope.to_string(),
            hash,
        }
    }

    #[must_use]
    pub fn search(level: Level, scope: &str, query: &str) -> Self {
        let hash = FileHashIndex::compute_hash(query.as_bytes());
        Self {
            level_prefix: level.prefix(),
            scope: scope.to_string(),
            hash,
        }
    }

    /// `colinfo:<collection>` key, scoped globally (collection metadata is
    /// not session- or project-specific).
    #[must_use]
    pub fn collection_info(collection: &str) -> Self {
        Self {
            level_prefix: "colinfo",
            scope: collection.to_string(),
            hash: String::new(),
        }
    }

    /// Flat `emb:<hash>` key used by the single-level embedding fallback
    /// when no session/project scope applies (§4.3).
    #[must_use]
    pub fn single_embedding(text: &str, model: &str) -> Self {
        let hash = FileHashIndex::compute_hash(format!("{model}:{text}").as_bytes());
        Self {
            level_prefix: "emb",
            scope: String::new(),
            hash,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.scope.is_empty(), self.hash.is_empty()) {
            (true, true) => write!(f, "{}", self.level_prefix),
            (true, false) => write!(f, "{}:{}", self.level_prefix, self.hash),
            (false, true) => write!(f, "{}:{}", self.level_prefix, self.scope),
            (false, false) => write!(f, "{}:{}:{}", self.level_prefix, self.scope, self.hash),
        }
    }
}
