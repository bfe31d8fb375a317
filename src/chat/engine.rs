//! Per-turn orchestration.
//!
//! One turn flows Received → Classified → (Resolving → Searching →
//! Summarizing) or (GeneralResponding) → Appended. Turns are processed
//! strictly one at a time per conversation: the resolver reads the
//! previous filters from the transcript tail, which must stay stable for
//! the duration of the turn. The shared property store is read-only and
//! may back any number of conversations.

use std::sync::Arc;

use crate::chat::{
    ConversationState, PropertyCard, Turn, DATASET_UNAVAILABLE_MESSAGE, GENERAL_CHAT_PROMPT,
    GENERAL_FALLBACK_MESSAGE,
};
use crate::config::AssistantConfig;
use crate::dataset::PropertyStore;
use crate::intent::{Intent, IntentClassifier, KeywordIntentClassifier};
use crate::llm::NluProvider;
use crate::resolver::FilterResolver;
use crate::search::apply_filters;
use crate::summary::Summarizer;

pub struct ChatEngine {
    store: Option<Arc<PropertyStore>>,
    provider: Arc<dyn NluProvider>,
    classifier: Box<dyn IntentClassifier>,
    resolver: FilterResolver,
    summarizer: Summarizer,
    config: AssistantConfig,
}

impl ChatEngine {
    /// `store` is `None` when the dataset failed to load at bootstrap; the
    /// engine then answers search turns with a clear apology instead of
    /// silently empty results, while general chat keeps working.
    pub fn new(
        store: Option<Arc<PropertyStore>>,
        provider: Arc<dyn NluProvider>,
        config: AssistantConfig,
    ) -> Self {
        let known_cities: Vec<String> = store
            .as_ref()
            .map(|s| s.known_cities().to_vec())
            .unwrap_or_default();

        let classifier = Box::new(KeywordIntentClassifier::new(&known_cities));
        let resolver = FilterResolver::new(provider.clone(), known_cities);
        let summarizer = Summarizer::new(provider.clone(), config.summary_sample);

        Self {
            store,
            provider,
            classifier,
            resolver,
            summarizer,
            config,
        }
    }

    /// Swap the intent heuristic for a different classifier.
    pub fn with_classifier(mut self, classifier: Box<dyn IntentClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Process one user message: append it to the transcript, produce the
    /// assistant turn, append that too, and return a copy of it. Infallible
    /// by design — every collaborator failure has a defined fallback and
    /// the user never sees a raw error.
    pub async fn process_message(&self, state: &mut ConversationState, content: &str) -> Turn {
        // 1. Classify against the turn preceding this message, then append.
        let intent = self.classifier.classify(content, state.last_turn());
        state.push(Turn::user(content.to_string()));
        tracing::info!(conversation = %state.id, intent = ?intent, "Turn classified");

        // 2. Route to handler.
        let reply = match intent {
            Intent::Search => self.handle_search(state, content).await,
            Intent::General => self.handle_general(state).await,
        };

        // 3. Append the assistant turn.
        state.push(reply.clone());
        reply
    }

    async fn handle_search(&self, state: &ConversationState, content: &str) -> Turn {
        let store = match &self.store {
            Some(store) => store,
            None => {
                tracing::warn!("Search turn with no dataset available");
                return Turn::assistant(DATASET_UNAVAILABLE_MESSAGE.to_string());
            }
        };

        // Resolving: previous filters come from the transcript tail.
        let previous = state.last_filters();
        let resolved = self.resolver.resolve(state.turns(), &previous).await;
        tracing::info!(filters = ?resolved, "Filters resolved");

        // Searching: fixed-order predicates, dataset row order preserved.
        let results = apply_filters(&resolved, store);
        tracing::debug!(matched = results.len(), "Search applied");

        // Summarizing: bounded sample, count never surfaced.
        let summary = self.summarizer.summarize(content, &results).await;

        let cards: Vec<PropertyCard> = results
            .iter()
            .take(self.config.max_cards)
            .map(|r| PropertyCard::from(*r))
            .collect();

        let mut turn = Turn::assistant(summary);
        turn.filters = Some(resolved);
        turn.cards = Some(cards);
        turn
    }

    async fn handle_general(&self, state: &ConversationState) -> Turn {
        let window = self.config.history_window;
        let start = state.turns().len().saturating_sub(window);
        let history: String = state.turns()[start..]
            .iter()
            .map(|t| format!("{}: {}", t.role.as_str(), t.content))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!("{}\n\nConversation:\n{}", GENERAL_CHAT_PROMPT, history);

        let content = match self.provider.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "General chat generation failed, using fallback");
                GENERAL_FALLBACK_MESSAGE.to_string()
            }
        };
        Turn::assistant(content)
    }
}
