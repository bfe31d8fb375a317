//! Grounded result summaries.
//!
//! The model sees only a small sample of the result set and is explicitly
//! forbidden from stating a total count — the dataset's count is too noisy
//! to surface. Both fixed fallback texts respect the same rule.

use std::sync::Arc;

use crate::dataset::PropertyRecord;
use crate::llm::NluProvider;

pub const NO_MATCHES_MESSAGE: &str =
    "Unfortunately, no properties matched your search criteria. Please try adjusting your filters.";

pub const SUMMARY_FALLBACK_MESSAGE: &str =
    "Here are the properties I found based on your search.";

pub struct Summarizer {
    provider: Arc<dyn NluProvider>,
    sample_size: usize,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn NluProvider>, sample_size: usize) -> Self {
        Self {
            provider,
            sample_size,
        }
    }

    /// Summarize a result set. Infallible: an empty set short-circuits to
    /// the fixed no-matches text without consulting the collaborator, and
    /// a collaborator failure yields the fixed generic sentence.
    pub async fn summarize(&self, user_query: &str, results: &[&PropertyRecord]) -> String {
        if results.is_empty() {
            return NO_MATCHES_MESSAGE.to_string();
        }

        let sample: Vec<&PropertyRecord> =
            results.iter().take(self.sample_size).copied().collect();
        let prompt = build_summary_prompt(user_query, &sample);

        match self.provider.generate(&prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Summary generation failed, using fallback text");
                SUMMARY_FALLBACK_MESSAGE.to_string()
            }
        }
    }
}

fn build_summary_prompt(user_query: &str, sample: &[&PropertyRecord]) -> String {
    let sample_json = serde_json::to_string(sample).unwrap_or_else(|_| "[]".to_string());
    format!(
        r#"You are a helpful real estate assistant. A user asked: "{}"
I found some relevant properties in the database. Here is a sample:
{}

Please write a 2-3 sentence summary of these findings.

**CRITICAL RULE:** Do NOT mention the total number of properties found (e.g., "I found 18 properties").
Instead, just describe the results you see. Start with something like "Based on your query, I found several properties that might interest you.""#,
        user_query, sample_json
    )
}
