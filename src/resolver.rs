//! Conversational filter resolver.
//!
//! Each turn, the full transcript plus the last applied filters are sent
//! to the NLU collaborator, which is asked to call `find_properties` with
//! a complete filter set. The resolver merges whatever comes back over the
//! previous filters, so missing fields always carry forward. When the call
//! fails in any way, a regex pass over the latest user message takes its
//! place. Resolution never returns an error — a failure only degrades
//! extraction quality.

use std::sync::Arc;

use crate::chat::{Role, Turn};
use crate::filters::{FilterSet, FilterUpdate};
use crate::llm::{extraction_schema, NluProvider};
use crate::normalize::regex_extract;

const EXTRACTION_RULES: &str = r#"You are an expert at parsing real estate queries.
Analyze the latest user query in the context of the conversation history and the last applied filters.
Your goal is to call the `find_properties` function with the most accurate set of filters.

Rules for Budget:
- "between X and Y Cr" -> budget_min_cr: X, budget_max_cr: Y
- "over X Cr" or "above X Cr" -> budget_min_cr: X, budget_max_cr: None
- "under Y Cr" or "below Y Cr" -> budget_min_cr: None, budget_max_cr: Y
- "X Lakhs" -> convert to Crores (e.g. 80 Lakhs is 0.8 Cr)
- If a previous budget exists and a new one is given, use the new one.

Return a COMPLETE set of filters: carry forward any previously applied
filter the latest message does not change."#;

pub struct FilterResolver {
    provider: Arc<dyn NluProvider>,
    known_cities: Vec<String>,
}

impl FilterResolver {
    /// `known_cities` seeds the regex fallback's city vocabulary, usually
    /// `PropertyStore::known_cities()`.
    pub fn new(provider: Arc<dyn NluProvider>, known_cities: Vec<String>) -> Self {
        Self {
            provider,
            known_cities,
        }
    }

    /// Resolve the current filter set from the transcript. Infallible:
    /// collaborator errors are recovered locally via the regex fallback.
    pub async fn resolve(&self, transcript: &[Turn], previous: &FilterSet) -> FilterSet {
        let prompt = build_extraction_prompt(transcript, previous);
        let schema = extraction_schema();

        match self.provider.extract(&prompt, &schema).await {
            Ok(args) => {
                let update = FilterUpdate::from_args(&args);
                tracing::info!(update = ?update, "Structured filter extraction succeeded");
                previous.merge(&update)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Filter extraction failed, using regex fallback");
                let latest = latest_user_message(transcript);
                let update = regex_extract(latest, &self.known_cities);
                tracing::debug!(update = ?update, "Regex fallback extraction");
                previous.merge(&update)
            }
        }
    }
}

/// Role-tagged serialization of the transcript, stable conversation order.
fn serialize_transcript(transcript: &[Turn]) -> String {
    transcript
        .iter()
        .map(|t| format!("{}: {}", t.role.as_str(), t.content))
        .collect::<Vec<_>>()
        .join("\n")
}

fn latest_user_message(transcript: &[Turn]) -> &str {
    transcript
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
        .unwrap_or("")
}

fn build_extraction_prompt(transcript: &[Turn], previous: &FilterSet) -> String {
    let last_filters =
        serde_json::to_string(previous).unwrap_or_else(|_| "{}".to_string());
    format!(
        "{}\n\n**Last Applied Filters:** {}\n**Conversation History:**\n{}\n\nBased on the LATEST user message, update the filters and call the `find_properties` function.",
        EXTRACTION_RULES,
        last_filters,
        serialize_transcript(transcript)
    )
}
