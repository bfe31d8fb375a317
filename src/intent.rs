//! Turn intent classification.
//!
//! A small heuristic decides whether a message is a property-search
//! refinement or general conversation. It is deliberately a trait so the
//! keyword predicate can later be swapped for a real classifier without
//! touching the turn orchestration.

use serde::{Deserialize, Serialize};

use crate::chat::{Role, Turn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Search,
    General,
}

pub trait IntentClassifier: Send + Sync {
    /// Classify the latest user message given the immediately preceding
    /// turn (if any). Best effort — misclassifications degrade to a
    /// general-chat reply or an empty-filter search, never an error.
    fn classify(&self, latest_message: &str, previous_turn: Option<&Turn>) -> Intent;
}

/// Single-word search cues, matched against whole tokens so that e.g.
/// "cr" never fires inside "create".
const KEYWORD_TOKENS: &[&str] = &[
    "bhk",
    "flat",
    "flats",
    "apartment",
    "apartments",
    "property",
    "properties",
    "house",
    "home",
    "cr",
    "crore",
    "crores",
    "lakh",
    "lakhs",
    "under",
    "between",
    "above",
    "over",
    "below",
    "budget",
    "possession",
];

/// Multi-word search cues, matched by substring on the lowercased message.
const KEYWORD_PHRASES: &[&str] = &["ready to move", "under construction"];

/// Keyword-based classifier seeded with the dataset's city vocabulary.
pub struct KeywordIntentClassifier {
    city_names: Vec<String>,
}

impl KeywordIntentClassifier {
    pub fn new(known_cities: &[String]) -> Self {
        Self {
            city_names: known_cities.iter().map(|c| c.to_lowercase()).collect(),
        }
    }
}

impl IntentClassifier for KeywordIntentClassifier {
    fn classify(&self, latest_message: &str, previous_turn: Option<&Turn>) -> Intent {
        let lower = latest_message.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        let keyword_hit = tokens
            .iter()
            .any(|t| KEYWORD_TOKENS.contains(t))
            || KEYWORD_PHRASES.iter().any(|p| lower.contains(p))
            || self.city_names.iter().any(|c| lower.contains(c.as_str()));

        if keyword_hit {
            return Intent::Search;
        }

        // A short follow-up right after search results ("what about cheaper
        // ones") is itself a refinement even without a keyword hit.
        let follows_results = previous_turn
            .map(|t| {
                t.role == Role::Assistant
                    && t.cards.as_ref().map(|c| !c.is_empty()).unwrap_or(false)
            })
            .unwrap_or(false);

        if follows_results {
            Intent::Search
        } else {
            Intent::General
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::PropertyCard;

    fn classifier() -> KeywordIntentClassifier {
        KeywordIntentClassifier::new(&["Pune".to_string(), "Mumbai".to_string()])
    }

    fn assistant_turn_with_cards() -> Turn {
        let mut turn = Turn::assistant("Here are some options.".to_string());
        turn.cards = Some(vec![PropertyCard::default()]);
        turn
    }

    #[test]
    fn test_bhk_query_is_search() {
        assert_eq!(classifier().classify("2 BHK in Pune", None), Intent::Search);
    }

    #[test]
    fn test_budget_query_is_search() {
        assert_eq!(classifier().classify("under 1.2 Cr", None), Intent::Search);
    }

    #[test]
    fn test_city_name_alone_is_search() {
        assert_eq!(classifier().classify("anything in mumbai?", None), Intent::Search);
    }

    #[test]
    fn test_greeting_is_general() {
        assert_eq!(classifier().classify("hello, who are you?", None), Intent::General);
    }

    #[test]
    fn test_cr_does_not_fire_inside_words() {
        assert_eq!(
            classifier().classify("can you create a poem?", None),
            Intent::General
        );
    }

    #[test]
    fn test_keywordless_followup_after_results_is_search() {
        let prev = assistant_turn_with_cards();
        assert_eq!(
            classifier().classify("what about cheaper ones", Some(&prev)),
            Intent::Search
        );
    }

    #[test]
    fn test_keywordless_followup_without_results_is_general() {
        let prev = Turn::assistant("Hello! How can I help?".to_string());
        assert_eq!(
            classifier().classify("tell me a joke", Some(&prev)),
            Intent::General
        );
    }
}
