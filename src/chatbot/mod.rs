//! Keyword chatbot: tokenize -> synonym-expand -> keyword-match -> canned answer.

pub mod keywords;
pub mod tokenizer;

use crate::config::ChatbotConfig;
use crate::lexicon::Lexicon;
use keywords::KeywordTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

pub use tokenizer::tokenize;

pub const DEFAULT_INTRO: &str = "Aquí tienes la respuesta:";

/// Chatbot answer; `respuesta` is `None` when no trigger matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotReply {
    pub intro: String,
    pub respuesta: Option<String>,
}

#[derive(Clone)]
pub struct Chatbot {
    keywords: Arc<KeywordTable>,
    lexicon: Arc<dyn Lexicon>,
    intro: String,
    match_synonyms: bool,
    max_expanded_tokens: usize,
}

impl Chatbot {
    pub fn new(keywords: Arc<KeywordTable>, lexicon: Arc<dyn Lexicon>, cfg: &ChatbotConfig) -> Self {
        Self {
            keywords,
            lexicon,
            intro: cfg.intro.clone(),
            match_synonyms: cfg.match_synonyms,
            max_expanded_tokens: cfg.max_expanded_tokens,
        }
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    pub fn lexicon(&self) -> &dyn Lexicon {
        self.lexicon.as_ref()
    }

    /// Query tokens unioned with the synonyms of the first
    /// `max_expanded_tokens` of them
    pub fn expand(&self, tokens: &[String]) -> BTreeSet<String> {
        let mut set: BTreeSet<String> = tokens.iter().cloned().collect();
        for token in tokens.iter().take(self.max_expanded_tokens) {
            set.extend(self.lexicon.synonyms(token));
        }
        set
    }

    /// Tokenized and expanded query, as used by the period filter
    pub fn expanded_query(&self, query: &str) -> BTreeSet<String> {
        self.expand(&tokenize(query))
    }

    /// Answer bound to the first token (in query order) that is a trigger.
    /// With `match_synonyms`, a token's synonyms are tried right after the
    /// token itself, before moving on to the next token.
    pub fn match_keyword(&self, tokens: &[String]) -> Option<&str> {
        for (pos, token) in tokens.iter().enumerate() {
            if let Some(answer) = self.keywords.get(token) {
                return Some(answer);
            }
            if self.match_synonyms && pos < self.max_expanded_tokens {
                let hit = self
                    .lexicon
                    .synonyms(token)
                    .into_iter()
                    .find_map(|syn| self.keywords.get(&syn));
                if hit.is_some() {
                    return hit;
                }
            }
        }
        None
    }

    pub fn respond(&self, query: &str) -> ChatbotReply {
        let tokens = tokenize(query);
        let expanded = self.expand(&tokens);
        debug!(tokens = ?tokens, expanded = ?expanded, "chatbot query");

        let respuesta = self.match_keyword(&tokens).map(str::to_string);
        if respuesta.is_none() {
            debug!("no trigger matched");
        }
        ChatbotReply {
            intro: self.intro.clone(),
            respuesta,
        }
    }
}
