use crate::config::ChatbotConfig;
use crate::error::{Result, WaterError};
use lru::LruCache;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Lexical database: token -> set of synonymous tokens.
/// Unknown tokens yield an empty set, never an error.
pub trait Lexicon: Send + Sync {
    fn synonyms(&self, token: &str) -> BTreeSet<String>;
    /// Number of distinct lemmas the lexicon knows
    fn vocabulary_size(&self) -> usize;
}

// Lexicon with no entries, for deployments that disable expansion
pub struct EmptyLexicon;

impl Lexicon for EmptyLexicon {
    fn synonyms(&self, _token: &str) -> BTreeSet<String> {
        BTreeSet::new()
    }

    fn vocabulary_size(&self) -> usize {
        0
    }
}

#[derive(Debug, Deserialize)]
struct LexiconFile {
    #[serde(default, rename = "synset")]
    synsets: Vec<SynsetEntry>,
}

#[derive(Debug, Deserialize)]
struct SynsetEntry {
    lemmas: Vec<String>,
    #[allow(dead_code)]
    #[serde(default)]
    gloss: Option<String>,
}

/// WordNet-shaped lexicon: a list of synsets (senses), each holding lemma
/// names. Multi-word lemmas use underscores.
pub struct SynsetLexicon {
    synsets: Vec<Vec<String>>,
    index: HashMap<String, Vec<usize>>,
}

impl SynsetLexicon {
    pub fn from_synsets<I, S>(synsets: I) -> Self
    where
        I: IntoIterator<Item = Vec<S>>,
        S: Into<String>,
    {
        let synsets: Vec<Vec<String>> = synsets
            .into_iter()
            .map(|lemmas| {
                lemmas
                    .into_iter()
                    .map(|l| {
                        let l: String = l.into();
                        l.trim().to_lowercase()
                    })
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|lemmas| !lemmas.is_empty())
            .collect();

        let mut index: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, lemmas) in synsets.iter().enumerate() {
            for lemma in lemmas {
                let senses = index.entry(lemma.clone()).or_default();
                if !senses.contains(&i) {
                    senses.push(i);
                }
            }
        }
        Self { synsets, index }
    }

    /// Parse `[[synset]] lemmas = [...]` tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(content).map_err(|e| WaterError::Lexicon {
            message: format!("invalid lexicon file: {}", e),
        })?;
        Ok(Self::from_synsets(file.synsets.into_iter().map(|s| s.lemmas)))
    }

    /// Number of senses (synsets)
    pub fn sense_count(&self) -> usize {
        self.synsets.len()
    }
}

impl Lexicon for SynsetLexicon {
    fn synonyms(&self, token: &str) -> BTreeSet<String> {
        let key = token.trim().to_lowercase().replace(' ', "_");
        self.index
            .get(&key)
            .into_iter()
            .flatten()
            .flat_map(|&i| self.synsets[i].iter().cloned())
            .collect()
    }

    fn vocabulary_size(&self) -> usize {
        self.index.len()
    }
}

/// LRU cache in front of another lexicon. The underlying lexicon never
/// changes at runtime, so cached sets stay valid for the process lifetime.
pub struct CachedLexicon<L> {
    inner: L,
    cache: Mutex<LruCache<String, BTreeSet<String>>>,
}

impl<L: Lexicon> CachedLexicon<L> {
    pub fn new(inner: L, capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(cap)),
        }
    }

    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<L: Lexicon> Lexicon for CachedLexicon<L> {
    fn synonyms(&self, token: &str) -> BTreeSet<String> {
        let key = token.to_lowercase();
        if let Ok(mut cache) = self.cache.lock()
            && let Some(hit) = cache.get(&key)
        {
            return hit.clone();
        }

        let set = self.inner.synonyms(&key);
        match self.cache.lock() {
            Ok(mut cache) => {
                cache.put(key, set.clone());
            }
            Err(_) => warn!("synonym cache lock poisoned; serving uncached"),
        }
        set
    }

    fn vocabulary_size(&self) -> usize {
        self.inner.vocabulary_size()
    }
}

const DEFAULT_LEXICON: &str = include_str!("../data/lexicon.toml");

/// Build the lexicon selected by configuration: a TOML file when
/// `lexicon_path` is set, the embedded Spanish default otherwise. Wrapped in
/// an LRU cache unless `synonym_cache_max` is 0.
pub fn create_lexicon(cfg: &ChatbotConfig) -> Result<Arc<dyn Lexicon>> {
    let lexicon = match cfg.lexicon_path.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| WaterError::Lexicon {
                message: format!("cannot read lexicon {}: {}", path, e),
            })?;
            let lex = SynsetLexicon::from_toml_str(&content)?;
            info!(
                "Using lexicon from {} ({} senses, {} lemmas)",
                path,
                lex.sense_count(),
                lex.vocabulary_size()
            );
            lex
        }
        None => {
            let lex = SynsetLexicon::from_toml_str(DEFAULT_LEXICON)?;
            info!(
                "Using built-in lexicon ({} senses, {} lemmas)",
                lex.sense_count(),
                lex.vocabulary_size()
            );
            lex
        }
    };

    if cfg.synonym_cache_max == 0 {
        debug!("Synonym cache disabled");
        return Ok(Arc::new(lexicon));
    }
    Ok(Arc::new(CachedLexicon::new(lexicon, cfg.synonym_cache_max)))
}
