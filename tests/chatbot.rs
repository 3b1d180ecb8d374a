//! Integration tests for the chatbot pipeline with the built-in tables.

use calidad_agua::chatbot::keywords::KeywordTable;
use calidad_agua::chatbot::{Chatbot, DEFAULT_INTRO, tokenize};
use calidad_agua::config::ChatbotConfig;
use calidad_agua::lexicon::{Lexicon, create_lexicon};
use std::sync::Arc;

fn builtin_bot() -> Chatbot {
    let cfg = ChatbotConfig::default();
    let lexicon = create_lexicon(&cfg).unwrap();
    Chatbot::new(Arc::new(KeywordTable::builtin().unwrap()), lexicon, &cfg)
}

#[test]
fn agua_inviable_returns_the_inviable_text() {
    let bot = builtin_bot();
    assert_eq!(tokenize("agua inviable"), ["agua", "inviable"]);

    let reply = bot.respond("agua inviable");
    assert_eq!(reply.intro, DEFAULT_INTRO);
    assert_eq!(
        reply.respuesta.as_deref(),
        KeywordTable::builtin().unwrap().get("inviable")
    );
    assert!(
        reply
            .respuesta
            .unwrap()
            .starts_with("Que el agua sea inviable significa")
    );
}

#[test]
fn unknown_query_has_no_answer() {
    let reply = builtin_bot().respond("xyz123");
    assert_eq!(reply.intro, DEFAULT_INTRO);
    assert!(reply.respuesta.is_none());

    let json = serde_json::to_value(&reply).unwrap();
    assert!(json["respuesta"].is_null());
}

#[test]
fn accented_trigger_spelling_does_not_match() {
    // Triggers are compared verbatim; "cólera" is not "colera"
    assert!(builtin_bot().respond("cólera").respuesta.is_none());
    assert!(builtin_bot().respond("Colera!").respuesta.is_some());
}

#[test]
fn synonym_lookups_are_deterministic() {
    let lexicon = create_lexicon(&ChatbotConfig::default()).unwrap();
    for token in ["agua", "riesgo", "colera", "xyz123"] {
        assert_eq!(lexicon.synonyms(token), lexicon.synonyms(token));
    }
    assert!(lexicon.synonyms("colera").contains("cólera"));
}

#[test]
fn synonym_matching_reaches_triggers_when_enabled() {
    let cfg = ChatbotConfig {
        match_synonyms: true,
        ..ChatbotConfig::default()
    };
    let bot = Chatbot::new(
        Arc::new(KeywordTable::builtin().unwrap()),
        create_lexicon(&cfg).unwrap(),
        &cfg,
    );
    // "cólera" shares a sense with the "colera" trigger in the built-in lexicon
    assert_eq!(
        bot.respond("cólera").respuesta.as_deref(),
        KeywordTable::builtin().unwrap().get("colera")
    );
}
